//! Dialogue moves as supplied by the surrounding application.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::locus::Locus;
use crate::participant::Participant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveKind {
    Assert,
    Why,
    Grounds,
    Retract,
    Concede,
    Close,
}

impl MoveKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assert => "ASSERT",
            Self::Why => "WHY",
            Self::Grounds => "GROUNDS",
            Self::Retract => "RETRACT",
            Self::Concede => "CONCEDE",
            Self::Close => "CLOSE",
        }
    }

    /// WHY and GROUNDS address an existing locus; the rest open or close one.
    #[must_use]
    pub fn is_reply(self) -> bool {
        matches!(self, Self::Why | Self::Grounds)
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How moves are grouped into design pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopingStrategy {
    /// One Proponent/Opponent pair for the whole dialogue.
    #[default]
    Legacy,
    /// One pair per `(targetType, targetId)`; untargeted moves share a pair.
    PerTarget,
}

/// Free-form move payload. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovePayload {
    pub text: Option<String>,
    pub note: Option<String>,
    pub brief: Option<String>,
    pub expression: Option<String>,
    /// Pin the locus: the asserted locus for ASSERT, the addressed locus for
    /// WHY and GROUNDS, the daimon's context for RETRACT and CONCEDE.
    pub locus_path: Option<Locus>,
    /// Pin the child segment a WHY or GROUNDS opens.
    pub child_suffix: Option<String>,
    pub additive: bool,
    pub ends_with_daimon: bool,
    pub ramification: Option<Vec<String>>,
    pub cq_id: Option<String>,
    pub scheme_key: Option<String>,
    /// Override the role derived from actor order.
    pub role: Option<Participant>,
}

impl MovePayload {
    /// First non-blank of text, note, brief, expression.
    #[must_use]
    pub fn expression_text(&self) -> Option<&str> {
        [&self.text, &self.note, &self.brief, &self.expression]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

/// What a move is about, e.g. `("claim", "c1")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub target_type: String,
    pub target_id: String,
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target_type, self.target_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueMove {
    pub id: String,
    pub kind: MoveKind,
    pub actor_id: String,
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub payload: MovePayload,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl DialogueMove {
    pub fn new(id: impl Into<String>, kind: MoveKind, actor_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            actor_id: actor_id.into(),
            target_type: None,
            target_id: None,
            payload: MovePayload::default(),
            created_at: None,
        }
    }

    pub fn targeting(mut self, target_type: impl Into<String>, target_id: impl Into<String>) -> Self {
        self.target_type = Some(target_type.into());
        self.target_id = Some(target_id.into());
        self
    }

    pub fn with_payload(mut self, payload: MovePayload) -> Self {
        self.payload = payload;
        self
    }

    /// Both target fields, when present and non-blank.
    #[must_use]
    pub fn target(&self) -> Option<TargetRef> {
        let target_type = self.target_type.as_deref().map(str::trim)?;
        let target_id = self.target_id.as_deref().map(str::trim)?;
        if target_type.is_empty() || target_id.is_empty() {
            return None;
        }
        Some(TargetRef {
            target_type: target_type.to_string(),
            target_id: target_id.to_string(),
        })
    }

    /// The act expression: payload text if any, else the move kind.
    #[must_use]
    pub fn expression(&self) -> String {
        self.payload
            .expression_text()
            .map_or_else(|| self.kind.as_str().to_string(), str::to_string)
    }
}
