//! Tree addresses.
//!
//! A [`Locus`] is a dot-separated path such as `0`, `0.3` or `0.3.1`. The
//! first segment names the root of the implicit game tree; every further
//! segment descends one level. A child locus is always its parent's path
//! plus exactly one segment, which is what the parsing constructors enforce.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ROOT_SEGMENT: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocusParseError {
    #[error("locus path must not be empty")]
    Empty,
    #[error("locus segment {index} is empty in '{path}'")]
    EmptySegment { path: String, index: usize },
    #[error("locus segment '{segment}' contains characters outside [A-Za-z0-9_-]")]
    InvalidSegment { segment: String },
}

/// A position in the implicit infinite tree of addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locus {
    segments: Vec<String>,
}

impl Locus {
    /// The canonical root `0`.
    #[must_use]
    pub fn root() -> Self {
        Self {
            segments: vec![ROOT_SEGMENT.to_string()],
        }
    }

    pub fn parse(path: &str) -> Result<Self, LocusParseError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(LocusParseError::Empty);
        }
        let mut segments = Vec::new();
        for (index, raw) in path.split('.').enumerate() {
            if raw.is_empty() {
                return Err(LocusParseError::EmptySegment {
                    path: path.to_string(),
                    index,
                });
            }
            validate_segment(raw)?;
            segments.push(raw.to_string());
        }
        Ok(Self { segments })
    }

    /// Extend this locus by one segment.
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, LocusParseError> {
        let segment = segment.into();
        if segment.is_empty() {
            return Err(LocusParseError::EmptySegment {
                path: format!("{self}."),
                index: self.segments.len(),
            });
        }
        validate_segment(&segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Self { segments })
    }

    /// Extend by a numeric segment. Numeric segments are always valid.
    #[must_use]
    pub fn child_index(&self, index: u32) -> Self {
        let mut segments = self.segments.clone();
        segments.push(index.to_string());
        Self { segments }
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// Number of segments below the root segment.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn last_segment(&self) -> &str {
        self.segments.last().map_or(ROOT_SEGMENT, String::as_str)
    }

    /// True when `self` lies on the path from the root to `other` (inclusive).
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    #[must_use]
    pub fn is_strict_ancestor_of(&self, other: &Self) -> bool {
        self.segments.len() < other.segments.len() && self.is_prefix_of(other)
    }

    /// The segments of `self` below `base`, or `None` when `base` is not a prefix.
    #[must_use]
    pub fn relative_to(&self, base: &Self) -> Option<&[String]> {
        base.is_prefix_of(self)
            .then(|| &self.segments[base.segments.len()..])
    }

    /// Move this locus from under `from` to under `to` (delocation).
    #[must_use]
    pub fn rebase(&self, from: &Self, to: &Self) -> Option<Self> {
        let tail = self.relative_to(from)?;
        let mut segments = to.segments.clone();
        segments.extend(tail.iter().cloned());
        Some(Self { segments })
    }
}

fn validate_segment(segment: &str) -> Result<(), LocusParseError> {
    if segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(LocusParseError::InvalidSegment {
            segment: segment.to_string(),
        })
    }
}

impl Default for Locus {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for Locus {
    type Err = LocusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locus {
    type Error = LocusParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Locus {
    type Error = LocusParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Locus> for String {
    fn from(value: Locus) -> Self {
        value.to_string()
    }
}
