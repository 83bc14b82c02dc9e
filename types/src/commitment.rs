use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

/// Facts are positive items; rules are negative items whose label encodes
/// `premises -> conclusion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasePolarity {
    Pos,
    Neg,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentItem {
    pub label: String,
    pub base_polarity: BasePolarity,
    /// Suspended items take no part in chaining.
    #[serde(default = "default_true")]
    pub entitled: bool,
}

impl CommitmentItem {
    pub fn fact(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            base_polarity: BasePolarity::Pos,
            entitled: true,
        }
    }

    pub fn rule(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            base_polarity: BasePolarity::Neg,
            entitled: true,
        }
    }

    #[must_use]
    pub fn suspended(mut self) -> Self {
        self.entitled = false;
        self
    }
}
