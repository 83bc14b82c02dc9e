//! Interaction request and result shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{ActId, DesignId};
use crate::locus::Locus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceStatus {
    /// Both sides may still play; an unexplored additive choice remains.
    Ongoing,
    Convergent,
    Divergent,
    /// Fuel ran out or the caller cancelled. Re-steppable.
    Stuck,
}

impl TraceStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ongoing => "ONGOING",
            Self::Convergent => "CONVERGENT",
            Self::Divergent => "DIVERGENT",
            Self::Stuck => "STUCK",
        }
    }

    /// Higher ranks dominate when sub-interactions are combined.
    #[must_use]
    pub fn severity(self) -> u8 {
        match self {
            Self::Convergent => 0,
            Self::Ongoing => 1,
            Self::Stuck => 2,
            Self::Divergent => 3,
        }
    }
}

impl fmt::Display for TraceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One matched step. `neg_act_id` is absent when a daimon closed the
/// interaction without a counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracePair {
    pub pos_act_id: ActId,
    pub neg_act_id: Option<ActId>,
    pub locus_path: Locus,
    pub ts: u64,
}

/// Which side's additive choice is authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    #[serde(rename = "neutral")]
    Neutral,
    #[serde(rename = "focus-P")]
    FocusP,
    #[serde(rename = "focus-O")]
    FocusO,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionMode {
    #[default]
    Assoc,
    Partial,
    Spiritual,
    Split,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    pub pos_design_id: DesignId,
    pub neg_design_id: DesignId,
    #[serde(default)]
    pub phase: Option<Phase>,
    #[serde(default)]
    pub composition_mode: Option<CompositionMode>,
    #[serde(default)]
    pub max_pairs: Option<usize>,
}

impl StepRequest {
    #[must_use]
    pub fn new(pos_design_id: DesignId, neg_design_id: DesignId) -> Self {
        Self {
            pos_design_id,
            neg_design_id,
            phase: None,
            composition_mode: None,
            max_pairs: None,
        }
    }
}

/// A context where one design's reactions to alternative opponent branches
/// differ beyond fresh-name renaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniformityViolation {
    pub design_id: DesignId,
    pub context: Locus,
    pub branches: (Locus, Locus),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub status: TraceStatus,
    pub pairs: Vec<TracePair>,
    pub decisive_indices: Vec<usize>,
    /// Alternatives offered but not taken.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unexplored: Vec<Locus>,
    /// Candidates dropped because they would break path legality.
    #[serde(default)]
    pub rejected_candidates: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_uniform: Vec<UniformityViolation>,
}
