//! Value types for the dialectic engine.
//!
//! This crate contains pure data with no IO and minimal dependencies:
//! tree addresses, acts, dialogue moves, interaction traces and the
//! construction requests checked by the guards. Every layer above builds on
//! these shapes.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod act;
mod argument;
mod commitment;
mod ids;
mod locus;
mod moves;
mod participant;
mod trace;

pub use act::{Act, DaimonAct, Polarity, ProperAct, Provenance, TraceStep};
pub use argument::{ArgumentProposal, AttackProposal, AttackType, TargetScope};
pub use commitment::{BasePolarity, CommitmentItem};
pub use ids::{ActId, ActIdParseError, DesignId};
pub use locus::{Locus, LocusParseError};
pub use moves::{DialogueMove, MoveKind, MovePayload, ScopingStrategy, TargetRef};
pub use participant::Participant;
pub use trace::{
    CompositionMode, Phase, StepRequest, StepResponse, TracePair, TraceStatus, UniformityViolation,
};

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// NonEmpty String Types
// ============================================================================

/// A string guaranteed to be non-empty (after trimming).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("label must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
