//! Acts: the atomic moves recorded in a design.
//!
//! An act is either a *proper* act (polarity, locus, ramification) or the
//! terminal *daimon*. The two shapes are separate variants so that a daimon
//! never carries a polarity and a proper act never lacks one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::locus::Locus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Positive => '+',
            Self::Negative => '-',
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Critical-question provenance carried by challenge and reply acts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cq_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_key: Option<String>,
}

impl Provenance {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cq_id.is_none() && self.scheme_key.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProperAct {
    polarity: Polarity,
    locus: Locus,
    #[serde(default)]
    ramification: Vec<String>,
    #[serde(default)]
    expression: String,
    #[serde(default)]
    additive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    justified_by_locus: Option<Locus>,
    #[serde(default, skip_serializing_if = "Provenance::is_empty")]
    provenance: Provenance,
}

impl ProperAct {
    #[must_use]
    pub fn new(polarity: Polarity, locus: Locus) -> Self {
        Self {
            polarity,
            locus,
            ramification: Vec::new(),
            expression: String::new(),
            additive: false,
            justified_by_locus: None,
            provenance: Provenance::default(),
        }
    }

    /// Set the opened child segments. Order is kept, repeats are dropped.
    pub fn with_ramification<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ramification.clear();
        for segment in segments {
            let segment = segment.into();
            if !self.ramification.contains(&segment) {
                self.ramification.push(segment);
            }
        }
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    pub fn with_additive(mut self, additive: bool) -> Self {
        self.additive = additive;
        self
    }

    pub fn with_justification(mut self, locus: Option<Locus>) -> Self {
        self.justified_by_locus = locus;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// The same act seen from the other side of the interaction.
    #[must_use]
    pub fn dual(&self) -> Self {
        let mut dual = self.clone();
        dual.polarity = self.polarity.flip();
        dual.justified_by_locus = match dual.polarity {
            Polarity::Positive => self.locus.parent(),
            Polarity::Negative => None,
        };
        dual
    }

    /// Move the act from under `from` to under `to`.
    #[must_use]
    pub fn relocated(&self, from: &Locus, to: &Locus) -> Option<Self> {
        let mut moved = self.clone();
        moved.locus = self.locus.rebase(from, to)?;
        moved.justified_by_locus = match &self.justified_by_locus {
            Some(locus) => Some(locus.rebase(from, to)?),
            None => None,
        };
        Some(moved)
    }

    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    #[must_use]
    pub fn locus(&self) -> &Locus {
        &self.locus
    }

    #[must_use]
    pub fn ramification(&self) -> &[String] {
        &self.ramification
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    #[must_use]
    pub fn is_additive(&self) -> bool {
        self.additive
    }

    #[must_use]
    pub fn justified_by(&self) -> Option<&Locus> {
        self.justified_by_locus.as_ref()
    }

    #[must_use]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

/// The terminal act. `at` records the context locus the daimon closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaimonAct {
    pub at: Locus,
    #[serde(default)]
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum Act {
    Proper(ProperAct),
    Daimon(DaimonAct),
}

impl Act {
    #[must_use]
    pub fn daimon(at: Locus) -> Self {
        Self::Daimon(DaimonAct {
            at,
            expression: String::new(),
        })
    }

    #[must_use]
    pub fn polarity(&self) -> Option<Polarity> {
        match self {
            Self::Proper(act) => Some(act.polarity),
            Self::Daimon(_) => None,
        }
    }

    /// The proper act's locus, or the context a daimon closes.
    #[must_use]
    pub fn locus(&self) -> &Locus {
        match self {
            Self::Proper(act) => &act.locus,
            Self::Daimon(act) => &act.at,
        }
    }

    #[must_use]
    pub fn is_daimon(&self) -> bool {
        matches!(self, Self::Daimon(_))
    }

    #[must_use]
    pub fn as_proper(&self) -> Option<&ProperAct> {
        match self {
            Self::Proper(act) => Some(act),
            Self::Daimon(_) => None,
        }
    }

    #[must_use]
    pub fn step(&self) -> TraceStep {
        TraceStep {
            polarity: self.polarity(),
            locus_path: self.locus().clone(),
        }
    }
}

impl From<ProperAct> for Act {
    fn from(act: ProperAct) -> Self {
        Self::Proper(act)
    }
}

impl fmt::Display for Act {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proper(act) => write!(f, "{}{}", act.polarity, act.locus),
            Self::Daimon(act) => write!(f, "†@{}", act.at),
        }
    }
}

/// The shape of one act as seen by the uniformity checker: polarity (absent
/// for a daimon) and locus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceStep {
    pub polarity: Option<Polarity>,
    pub locus_path: Locus,
}

impl TraceStep {
    #[must_use]
    pub fn proper(polarity: Polarity, locus: Locus) -> Self {
        Self {
            polarity: Some(polarity),
            locus_path: locus,
        }
    }
}
