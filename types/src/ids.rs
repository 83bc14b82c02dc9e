use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignId(u64);

impl DesignId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("act id '{0}' is not of the form <design>:<seq>")]
pub struct ActIdParseError(String);

/// Identifies one act: the design that owns it and its position in that
/// design's append log. Serialized as `"<design>:<seq>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActId {
    design: DesignId,
    seq: u32,
}

impl ActId {
    #[must_use]
    pub fn new(design: DesignId, seq: u32) -> Self {
        Self { design, seq }
    }

    #[must_use]
    pub fn design(self) -> DesignId {
        self.design
    }

    #[must_use]
    pub fn seq(self) -> u32 {
        self.seq
    }
}

impl fmt::Display for ActId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.design, self.seq)
    }
}

impl FromStr for ActId {
    type Err = ActIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ActIdParseError(s.to_string());
        let (design, seq) = s.split_once(':').ok_or_else(err)?;
        let design = design.parse::<u64>().map_err(|_| err())?;
        let seq = seq.parse::<u32>().map_err(|_| err())?;
        Ok(Self::new(DesignId::new(design), seq))
    }
}

impl TryFrom<String> for ActId {
    type Error = ActIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActId> for String {
    fn from(value: ActId) -> Self {
        value.to_string()
    }
}
