use std::fmt;

use serde::{Deserialize, Serialize};

/// The role a design plays in a dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Participant {
    #[serde(alias = "P")]
    Proponent,
    #[serde(alias = "O")]
    Opponent,
}

impl Participant {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Proponent => Self::Opponent,
            Self::Opponent => Self::Proponent,
        }
    }

    #[must_use]
    pub fn short(self) -> &'static str {
        match self {
            Self::Proponent => "P",
            Self::Opponent => "O",
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}
