//! Path legality: alternation, linearity and justification.
//!
//! A path is the ordered list of acts lying on one root-to-node branch. The
//! checker never repairs a path; any violation rejects the act that was
//! about to extend it.

use std::collections::HashMap;

use thiserror::Error;

use dialectic_types::{Act, Locus, Polarity};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathViolation {
    #[error("alternation: {polarity}{locus} follows an act of the same polarity")]
    Alternation { locus: Locus, polarity: Polarity },
    #[error("alternation: daimon at {at} is not the last act of the path")]
    DaimonNotLast { at: Locus },
    #[error("linearity: locus {locus} is visited twice")]
    Linearity { locus: Locus },
    #[error("negative jump: {polarity}{locus} has no justifying {expected} act at {missing}")]
    NegativeJump {
        locus: Locus,
        polarity: Polarity,
        missing: Locus,
        expected: Polarity,
    },
}

impl PathViolation {
    /// Short machine-readable reason.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Alternation { .. } => "ALTERNATION",
            Self::DaimonNotLast { .. } => "DAIMON_NOT_LAST",
            Self::Linearity { .. } => "LINEARITY",
            Self::NegativeJump { .. } => "NEGATIVE_JUMP",
        }
    }
}

/// Check that `path` is a legal ludics path below `base`.
///
/// Positive acts whose parent lies at or above `base` are initial. Any other
/// positive act at `u.v` must be preceded by a negative act at `u`. Negative
/// acts answer whatever the counterpart opened and need no justification
/// here.
pub fn check_path<'a, I>(base: &Locus, path: I) -> Result<(), PathViolation>
where
    I: IntoIterator<Item = &'a Act>,
{
    let mut previous: Option<Polarity> = None;
    let mut closed_at: Option<&Locus> = None;
    // Locus -> polarity of the act already played there. Linearity makes this unique.
    let mut played: HashMap<&Locus, Polarity> = HashMap::new();

    for act in path {
        if let Some(at) = closed_at {
            return Err(PathViolation::DaimonNotLast { at: at.clone() });
        }
        let proper = match act {
            Act::Daimon(daimon) => {
                closed_at = Some(&daimon.at);
                continue;
            }
            Act::Proper(proper) => proper,
        };

        let polarity = proper.polarity();
        let locus = proper.locus();
        if previous == Some(polarity) {
            return Err(PathViolation::Alternation {
                locus: locus.clone(),
                polarity,
            });
        }
        previous = Some(polarity);

        if played.contains_key(locus) {
            return Err(PathViolation::Linearity {
                locus: locus.clone(),
            });
        }

        if polarity == Polarity::Positive
            && let Some(missing) = unjustified_parent(base, locus, &played)
        {
            return Err(PathViolation::NegativeJump {
                locus: locus.clone(),
                polarity,
                missing,
                expected: Polarity::Negative,
            });
        }
        played.insert(locus, polarity);
    }
    Ok(())
}

#[must_use]
pub fn is_legal<'a, I>(base: &Locus, path: I) -> bool
where
    I: IntoIterator<Item = &'a Act>,
{
    check_path(base, path).is_ok()
}

/// The parent of a positive act, when it is below `base` and holds no
/// earlier negative act.
fn unjustified_parent(
    base: &Locus,
    locus: &Locus,
    played: &HashMap<&Locus, Polarity>,
) -> Option<Locus> {
    let parent = locus.parent()?;
    if parent.is_prefix_of(base) || played.get(&parent) == Some(&Polarity::Negative) {
        return None;
    }
    Some(parent)
}
