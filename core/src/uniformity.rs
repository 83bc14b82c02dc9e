//! Alpha-equivalence of traces under fresh-name renaming.
//!
//! The segment directly below `base` is the fresh name an opponent picked
//! when choosing a branch. Two traces are alpha-equivalent when they agree
//! once those names are replaced by placeholders numbered in first-seen
//! order.

use std::collections::HashMap;

use dialectic_types::{Locus, Polarity, TraceStep};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// The n-th distinct fresh name seen directly under the base.
    Fresh(usize),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalStep {
    pub polarity: Option<Polarity>,
    pub segments: Vec<Segment>,
}

/// Rename the segment under `base` in every step. Loci outside `base` keep
/// their names.
#[must_use]
pub fn canonicalize(steps: &[TraceStep], base: &Locus) -> Vec<CanonicalStep> {
    let mut fresh: HashMap<&str, usize> = HashMap::new();
    steps
        .iter()
        .map(|step| {
            let locus = &step.locus_path;
            let segments = match locus.relative_to(base) {
                Some([head, tail @ ..]) => {
                    let next = fresh.len();
                    let slot = *fresh.entry(head.as_str()).or_insert(next);
                    let mut segments: Vec<Segment> = base
                        .segments()
                        .iter()
                        .cloned()
                        .map(Segment::Named)
                        .collect();
                    segments.push(Segment::Fresh(slot));
                    segments.extend(tail.iter().cloned().map(Segment::Named));
                    segments
                }
                _ => locus.segments().iter().cloned().map(Segment::Named).collect(),
            };
            CanonicalStep {
                polarity: step.polarity,
                segments,
            }
        })
        .collect()
}

/// True when `a` and `b` have the same length, polarity sequence and loci
/// after renaming fresh names under `base`.
#[must_use]
pub fn alpha_equivalent(a: &[TraceStep], b: &[TraceStep], base: &Locus) -> bool {
    a.len() == b.len() && canonicalize(a, base) == canonicalize(b, base)
}
