//! Preflight for a pair of designs about to interact.

use std::borrow::Cow;
use std::collections::BTreeSet;

use tracing::debug;

use dialectic_core::Design;
use dialectic_types::{CompositionMode, Locus, Polarity};

use crate::stepper::StepError;

/// A pair of designs ready to be stepped.
#[derive(Debug)]
pub struct Composition<'a> {
    pub pos: &'a Design,
    /// The negative design, delocated onto `pos`'s root in spiritual mode.
    pub neg: Cow<'a, Design>,
    /// Subtrees left out of the interaction.
    pub mask: BTreeSet<Locus>,
    /// One entry per independent run. `None` is the whole interaction; split
    /// mode restricts each run to one top-level branch of `pos`.
    pub runs: Vec<Option<Locus>>,
}

impl Composition<'_> {
    #[must_use]
    pub fn is_masked(&self, locus: &Locus) -> bool {
        self.mask.iter().any(|m| m.is_prefix_of(locus))
    }
}

/// Loci where both designs hold a proper act of the same polarity.
#[must_use]
pub fn collisions(pos: &Design, neg: &Design) -> Vec<Locus> {
    let mut found = BTreeSet::new();
    for rec in pos.acts() {
        if let Some(proper) = rec.act.as_proper()
            && let Some((_, other)) = neg.proper_at(proper.locus())
            && other.polarity() == proper.polarity()
        {
            found.insert(proper.locus().clone());
        }
    }
    found.into_iter().collect()
}

pub fn prepare<'a>(
    pos: &'a Design,
    neg: &'a Design,
    mode: CompositionMode,
) -> Result<Composition<'a>, StepError> {
    if pos.id() == neg.id() {
        return Err(StepError::SameDesign(pos.id()));
    }
    let neg = if pos.root() == neg.root() {
        Cow::Borrowed(neg)
    } else if mode == CompositionMode::Spiritual {
        debug!(from = %neg.root(), to = %pos.root(), "Delocating negative design");
        Cow::Owned(
            neg.relocated(neg.id(), pos.root())
                .map_err(StepError::Relocation)?,
        )
    } else {
        return Err(StepError::RootMismatch {
            pos_root: pos.root().clone(),
            neg_root: neg.root().clone(),
        });
    };

    let clashes = collisions(pos, &neg);
    let mask = match mode {
        CompositionMode::Assoc | CompositionMode::Split if !clashes.is_empty() => {
            return Err(StepError::CompositionCollision { loci: clashes });
        }
        CompositionMode::Partial | CompositionMode::Spiritual => {
            clashes.into_iter().collect::<BTreeSet<_>>()
        }
        CompositionMode::Assoc | CompositionMode::Split => BTreeSet::new(),
    };

    let runs = if mode == CompositionMode::Split {
        let branches: Vec<Option<Locus>> = pos
            .children_with(pos.root(), Polarity::Positive)
            .map(|(_, proper)| Some(proper.locus().clone()))
            .collect();
        if branches.is_empty() { vec![None] } else { branches }
    } else {
        vec![None]
    };

    Ok(Composition {
        pos,
        neg,
        mask,
        runs,
    })
}
