//! Argument and attack construction requests.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentProposal {
    #[serde(default)]
    pub conclusion_id: String,
    #[serde(default)]
    pub premise_ids: Vec<String>,
}

impl ArgumentProposal {
    pub fn new<I, S>(conclusion_id: impl Into<String>, premise_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            conclusion_id: conclusion_id.into(),
            premise_ids: premise_ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttackType {
    Rebuts,
    Undercuts,
    Undermines,
}

impl AttackType {
    /// The only scope each attack type may aim at.
    #[must_use]
    pub fn required_scope(self) -> TargetScope {
        match self {
            Self::Rebuts => TargetScope::Conclusion,
            Self::Undercuts => TargetScope::Inference,
            Self::Undermines => TargetScope::Premise,
        }
    }
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rebuts => "REBUTS",
            Self::Undercuts => "UNDERCUTS",
            Self::Undermines => "UNDERMINES",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetScope {
    Conclusion,
    Inference,
    Premise,
}

impl fmt::Display for TargetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Conclusion => "conclusion",
            Self::Inference => "inference",
            Self::Premise => "premise",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackProposal {
    pub attack_type: AttackType,
    pub target_scope: TargetScope,
    pub from_argument_id: String,
    #[serde(default)]
    pub to_argument_id: Option<String>,
    #[serde(default)]
    pub target_claim_id: Option<String>,
    #[serde(default)]
    pub target_premise_id: Option<String>,
    /// Critical question the attack answers, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cq_key: Option<String>,
}

impl AttackProposal {
    pub fn new(
        attack_type: AttackType,
        target_scope: TargetScope,
        from_argument_id: impl Into<String>,
    ) -> Self {
        Self {
            attack_type,
            target_scope,
            from_argument_id: from_argument_id.into(),
            to_argument_id: None,
            target_claim_id: None,
            target_premise_id: None,
            cq_key: None,
        }
    }
}
