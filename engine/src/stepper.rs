//! Interaction stepper.
//!
//! The positive design moves first from the shared root. The side to move
//! looks at its open contexts, latest first: a context is a locus where it
//! holds a negative act that has already been paired. There it either plays
//! a daimon (convergence) or picks a positive child the other side answers
//! with a negative act at the same locus. The turn then passes to the other
//! side, whose new context is that locus.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;
use tracing::{debug, info};

use dialectic_core::{AppendError, Design, RecordedAct, alpha_equivalent, check_path};
use dialectic_types::{
    Act, ActId, CompositionMode, DesignId, Locus, Participant, Phase, Polarity, StepRequest,
    StepResponse, TracePair, TraceStatus, TraceStep, UniformityViolation,
};

use crate::composition::{self, Composition};

pub const DEFAULT_MAX_PAIRS: usize = 256;
pub const DEFAULT_CANCEL_CHECK_INTERVAL: usize = 32;

/// Malformed step requests. Divergence and running out of fuel are
/// outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("configuration error: unknown design {0}")]
    UnknownDesign(DesignId),
    #[error("configuration error: design {0} cannot interact with itself")]
    SameDesign(DesignId),
    #[error("configuration error: positive root {pos_root} differs from negative root {neg_root}")]
    RootMismatch { pos_root: Locus, neg_root: Locus },
    #[error("configuration error: designs collide at {}", join_loci(.loci))]
    CompositionCollision { loci: Vec<Locus> },
    #[error("configuration error: cannot delocate negative design: {0}")]
    Relocation(#[source] AppendError),
}

fn join_loci(loci: &[Locus]) -> String {
    loci.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepperSettings {
    pub max_pairs: usize,
    pub phase: Phase,
    pub composition: CompositionMode,
    /// Pairs between cancellation checks; zero disables them.
    pub cancel_check_interval: usize,
}

impl Default for StepperSettings {
    fn default() -> Self {
        Self {
            max_pairs: DEFAULT_MAX_PAIRS,
            phase: Phase::Neutral,
            composition: CompositionMode::Assoc,
            cancel_check_interval: DEFAULT_CANCEL_CHECK_INTERVAL,
        }
    }
}

impl StepperSettings {
    /// These settings with the request's explicit choices applied.
    #[must_use]
    pub fn for_request(&self, request: &StepRequest) -> Self {
        Self {
            max_pairs: request.max_pairs.unwrap_or(self.max_pairs),
            phase: request.phase.unwrap_or(self.phase),
            composition: request.composition_mode.unwrap_or(self.composition),
            cancel_check_interval: self.cancel_check_interval,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Stepper {
    settings: StepperSettings,
}

impl Stepper {
    #[must_use]
    pub fn new(settings: StepperSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &StepperSettings {
        &self.settings
    }

    pub fn step(&self, pos: &Design, neg: &Design) -> Result<StepResponse, StepError> {
        self.step_with_cancel(pos, neg, &mut || false)
    }

    /// Like [`Stepper::step`], but `cancel` is polled every
    /// `cancel_check_interval` pairs. A cancelled run reports `STUCK`.
    pub fn step_with_cancel(
        &self,
        pos: &Design,
        neg: &Design,
        cancel: &mut dyn FnMut() -> bool,
    ) -> Result<StepResponse, StepError> {
        let composition = composition::prepare(pos, neg, self.settings.composition)?;
        let mut response = StepResponse {
            status: TraceStatus::Convergent,
            pairs: Vec::new(),
            decisive_indices: Vec::new(),
            unexplored: Vec::new(),
            rejected_candidates: 0,
            non_uniform: Vec::new(),
        };

        for branch in &composition.runs {
            let offset = response.pairs.len();
            let fuel = self.settings.max_pairs.saturating_sub(offset);
            let outcome = Interaction::new(&composition, branch.as_ref(), self.settings.phase, offset)
                .run(fuel, self.settings.cancel_check_interval, cancel);
            if outcome.status.severity() > response.status.severity() {
                response.status = outcome.status;
            }
            response.pairs.extend(outcome.pairs);
            response.decisive_indices.extend(outcome.decisive);
            response.unexplored.extend(outcome.unexplored);
            response.rejected_candidates += outcome.rejected;
            if outcome.status == TraceStatus::Stuck {
                break;
            }
        }
        response.non_uniform = uniformity_report([composition.pos, &*composition.neg]);

        info!(
            pos = %pos.id(),
            neg = %neg.id(),
            status = %response.status,
            pairs = response.pairs.len(),
            "Stepped interaction"
        );
        Ok(response)
    }
}

enum Choice {
    Daimon {
        pos: ActId,
        neg: Option<ActId>,
        at: Locus,
    },
    Move {
        /// Index into the mover's context list.
        context: usize,
        pos: ActId,
        neg: ActId,
        locus: Locus,
        additive: bool,
        others: Vec<Locus>,
    },
    Diverged,
    Exhausted,
}

struct Outcome {
    status: TraceStatus,
    pairs: Vec<TracePair>,
    decisive: Vec<usize>,
    unexplored: Vec<Locus>,
    rejected: usize,
}

struct Interaction<'c> {
    /// [positive, negative]
    sides: [&'c Design; 2],
    mask: &'c BTreeSet<Locus>,
    /// Only this top-level branch may be opened from the root.
    branch: Option<&'c Locus>,
    /// Side whose design order ranks the options; `None` is the mover.
    focus: Option<usize>,
    /// Pairs produced by earlier runs of the same request.
    offset: usize,
    contexts: [Vec<Locus>; 2],
    played: HashSet<ActId>,
    /// Acts of each side that entered the trace, in play order.
    seen: [Vec<ActId>; 2],
    pairs: Vec<TracePair>,
    unexplored: Vec<Locus>,
    rejected: usize,
}

impl<'c> Interaction<'c> {
    fn new(
        composition: &'c Composition<'_>,
        branch: Option<&'c Locus>,
        phase: Phase,
        offset: usize,
    ) -> Self {
        let sides = [composition.pos, &*composition.neg];
        Self {
            sides,
            mask: &composition.mask,
            branch,
            focus: focus_side(sides, phase),
            offset,
            contexts: [vec![composition.pos.root().clone()], Vec::new()],
            played: HashSet::new(),
            seen: [Vec::new(), Vec::new()],
            pairs: Vec::new(),
            unexplored: Vec::new(),
            rejected: 0,
        }
    }

    fn run(mut self, fuel: usize, check_every: usize, cancel: &mut dyn FnMut() -> bool) -> Outcome {
        let mut active = 0;
        loop {
            let global = self.offset + self.pairs.len();
            if check_every > 0 && global > 0 && global % check_every == 0 && cancel() {
                debug!(pairs = global, "Interaction cancelled");
                return self.finish(TraceStatus::Stuck);
            }

            match self.choose(active) {
                Choice::Exhausted => {
                    let status = if self.unexplored.is_empty() {
                        TraceStatus::Divergent
                    } else {
                        TraceStatus::Ongoing
                    };
                    return self.finish(status);
                }
                Choice::Diverged => return self.finish(TraceStatus::Divergent),
                Choice::Daimon { .. } | Choice::Move { .. } if self.pairs.len() >= fuel => {
                    debug!(pairs = global, "Out of fuel");
                    return self.finish(TraceStatus::Stuck);
                }
                Choice::Daimon { pos, neg, at } => {
                    self.push(pos, neg, at);
                    return self.finish(TraceStatus::Convergent);
                }
                Choice::Move {
                    context,
                    pos,
                    neg,
                    locus,
                    additive,
                    others,
                } => {
                    if additive {
                        self.contexts[active].remove(context);
                        self.unexplored.extend(others);
                    }
                    let other = 1 - active;
                    self.played.insert(pos);
                    self.seen[active].push(pos);
                    self.seen[other].push(neg);
                    self.contexts[other].push(locus.clone());
                    self.push(pos, Some(neg), locus);
                    active = other;
                }
            }
        }
    }

    fn choose(&mut self, side: usize) -> Choice {
        let own = self.sides[side];
        let other = self.sides[1 - side];
        let mut index = self.contexts[side].len();
        while index > 0 {
            index -= 1;
            let context = self.contexts[side][index].clone();
            if let Some(daimon) = own.daimon_at(&context) {
                return Choice::Daimon {
                    pos: daimon.id,
                    neg: other.daimon_at(&context).map(|rec| rec.id),
                    at: context,
                };
            }

            let options: Vec<&RecordedAct> = own
                .children_with(&context, Polarity::Positive)
                .map(|(rec, _)| rec)
                .filter(|rec| self.is_open(&context, rec))
                .collect();
            if options.is_empty() {
                self.contexts[side].remove(index);
                continue;
            }

            let mut matched: Vec<(&RecordedAct, ActId)> = options
                .into_iter()
                .filter_map(|rec| {
                    other
                        .proper_at(rec.act.locus())
                        .filter(|(_, proper)| proper.polarity() == Polarity::Negative)
                        .map(|(counter, _)| (rec, counter.id))
                })
                .collect();
            if matched.is_empty() {
                debug!(context = %context, "No counter-act for any option");
                return Choice::Diverged;
            }
            let ranking = self.sides[self.focus.unwrap_or(side)];
            matched.sort_by_key(|(rec, _)| {
                ranking
                    .proper_at(rec.act.locus())
                    .map_or(u32::MAX, |(ranked, _)| ranked.id.seq())
            });

            let mut legal = Vec::with_capacity(matched.len());
            for (rec, counter) in matched {
                if self.is_legal(side, &rec.act) {
                    legal.push((rec, counter));
                } else {
                    self.rejected += 1;
                }
            }
            let Some(((first, counter), rest)) = legal.split_first() else {
                return Choice::Diverged;
            };
            let additive = own
                .proper_at(&context)
                .is_some_and(|(_, proper)| proper.is_additive());
            return Choice::Move {
                context: index,
                pos: first.id,
                neg: *counter,
                locus: first.act.locus().clone(),
                additive,
                others: rest.iter().map(|(rec, _)| rec.act.locus().clone()).collect(),
            };
        }
        Choice::Exhausted
    }

    fn is_open(&self, context: &Locus, rec: &RecordedAct) -> bool {
        let locus = rec.act.locus();
        if self.played.contains(&rec.id) || self.mask.iter().any(|m| m.is_prefix_of(locus)) {
            return false;
        }
        match self.branch {
            Some(branch) if context == self.sides[0].root() => locus == branch,
            _ => true,
        }
    }

    /// Check `act` against what the side has already played on its branch.
    fn is_legal(&self, side: usize, act: &Act) -> bool {
        let design = self.sides[side];
        let locus = act.locus();
        let mut view: Vec<&Act> = self.seen[side]
            .iter()
            .filter_map(|id| design.get(*id))
            .map(|rec| &rec.act)
            .filter(|played| played.locus().is_prefix_of(locus))
            .collect();
        view.push(act);
        match check_path(design.root(), view) {
            Ok(()) => true,
            Err(violation) => {
                debug!(design = %design.id(), %violation, "Rejected candidate");
                false
            }
        }
    }

    fn push(&mut self, pos: ActId, neg: Option<ActId>, locus: Locus) {
        let ts = self.offset + self.pairs.len();
        debug!(ts, locus = %locus, "Paired acts");
        self.pairs.push(TracePair {
            pos_act_id: pos,
            neg_act_id: neg,
            locus_path: locus,
            ts: ts as u64,
        });
    }

    fn finish(self, status: TraceStatus) -> Outcome {
        let last = (self.offset + self.pairs.len()).checked_sub(1);
        let decisive = match status {
            TraceStatus::Convergent | TraceStatus::Divergent if !self.pairs.is_empty() => {
                last.into_iter().collect()
            }
            _ => Vec::new(),
        };
        Outcome {
            status,
            pairs: self.pairs,
            decisive,
            unexplored: self.unexplored,
            rejected: self.rejected,
        }
    }
}

/// Which side's design order decides between alternatives. With ambiguous
/// participants the positive design stands for P.
fn focus_side(sides: [&Design; 2], phase: Phase) -> Option<usize> {
    let wanted = match phase {
        Phase::Neutral => return None,
        Phase::FocusP => Participant::Proponent,
        Phase::FocusO => Participant::Opponent,
    };
    let holds = |side: usize| sides[side].participant() == wanted;
    Some(match (holds(0), holds(1)) {
        (true, false) => 0,
        (false, true) => 1,
        _ if wanted == Participant::Proponent => 0,
        _ => 1,
    })
}

/// Additive contexts where a design reacts differently, up to renaming of
/// the branch names, under two of its negative branches.
fn uniformity_report(designs: [&Design; 2]) -> Vec<UniformityViolation> {
    let mut violations = Vec::new();
    for design in designs {
        for rec in design.acts() {
            let Some(proper) = rec.act.as_proper().filter(|p| p.is_additive()) else {
                continue;
            };
            let context = proper.locus();
            let branches: Vec<&Locus> = design
                .children_with(context, Polarity::Negative)
                .map(|(_, child)| child.locus())
                .collect();
            let Some((first, rest)) = branches.split_first() else {
                continue;
            };
            let reaction = |branch: &Locus| -> Vec<TraceStep> {
                design.subtree(branch).map(|r| r.act.step()).collect()
            };
            let baseline = reaction(*first);
            for other in rest {
                if !alpha_equivalent(&baseline, &reaction(*other), context) {
                    violations.push(UniformityViolation {
                        design_id: design.id(),
                        context: context.clone(),
                        branches: ((*first).clone(), (*other).clone()),
                    });
                }
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{StepError, Stepper, StepperSettings};
    use dialectic_core::Design;
    use dialectic_types::{
        Act, ActId, CompositionMode, DesignId, Locus, Participant, Phase, Polarity, ProperAct,
        StepRequest, StepResponse, TraceStatus,
    };

    fn locus(path: &str) -> Locus {
        Locus::parse(path).expect("test fixture locus")
    }

    /// Acts written as `+0.1`, `-0.1.1`, `+0.1*` (additive) or `†0.1`.
    fn design(id: u64, participant: Participant, acts: &[&str]) -> Design {
        let mut d = Design::new(DesignId::new(id), participant, Locus::root());
        for text in acts {
            let act = if let Some(at) = text.strip_prefix('†') {
                Act::daimon(locus(at))
            } else {
                let (sign, rest) = text.split_at(1);
                let polarity = if sign == "+" {
                    Polarity::Positive
                } else {
                    Polarity::Negative
                };
                let (path, additive) = match rest.strip_suffix('*') {
                    Some(path) => (path, true),
                    None => (rest, false),
                };
                ProperAct::new(polarity, locus(path))
                    .with_additive(additive)
                    .into()
            };
            d.append(act, None).expect("test fixture act");
        }
        d
    }

    fn p(acts: &[&str]) -> Design {
        design(1, Participant::Proponent, acts)
    }

    fn o(acts: &[&str]) -> Design {
        design(2, Participant::Opponent, acts)
    }

    fn stepper(settings: StepperSettings) -> Stepper {
        Stepper::new(settings)
    }

    fn loci(response: &StepResponse) -> Vec<String> {
        response
            .pairs
            .iter()
            .map(|pair| pair.locus_path.to_string())
            .collect()
    }

    #[test]
    fn matching_daimons_converge() {
        let pos = p(&["+0.1", "†0.1"]);
        let neg = o(&["-0.1", "†0.1"]);
        let response = Stepper::default().step(&pos, &neg).expect("step");
        assert_eq!(response.status, TraceStatus::Convergent);
        assert_eq!(loci(&response), ["0.1", "0.1"]);
        assert_eq!(response.decisive_indices, [1]);
        let last = &response.pairs[1];
        assert_eq!(last.pos_act_id, ActId::new(DesignId::new(2), 1));
        assert_eq!(last.neg_act_id, Some(ActId::new(DesignId::new(1), 1)));
        assert_eq!(last.ts, 1);
    }

    #[test]
    fn a_lone_daimon_converges_without_a_partner() {
        let pos = p(&["†0"]);
        let neg = o(&[]);
        let response = Stepper::default().step(&pos, &neg).expect("step");
        assert_eq!(response.status, TraceStatus::Convergent);
        assert_eq!(response.pairs.len(), 1);
        assert_eq!(response.pairs[0].neg_act_id, None);
    }

    #[test]
    fn unanswered_option_diverges() {
        let pos = p(&["+0.1"]);
        let neg = o(&["-0.1", "+0.1.1"]);
        let response = Stepper::default().step(&pos, &neg).expect("step");
        assert_eq!(response.status, TraceStatus::Divergent);
        assert_eq!(response.pairs.len(), 1);
        assert_eq!(response.decisive_indices, [0]);
    }

    #[test]
    fn silence_without_daimon_diverges() {
        let pos = p(&["+0.1", "-0.1.1", "+0.1.1.1"]);
        let neg = o(&["-0.1", "+0.1.1", "-0.1.1.1"]);
        let response = Stepper::default().step(&pos, &neg).expect("step");
        assert_eq!(response.status, TraceStatus::Divergent);
        assert_eq!(loci(&response), ["0.1", "0.1.1", "0.1.1.1"]);
        assert_eq!(response.decisive_indices, [2]);
        assert_eq!(response.rejected_candidates, 0);
    }

    #[test]
    fn additive_choice_leaves_siblings_unexplored() {
        let pos = p(&["+0.1*", "-0.1.1", "-0.1.2"]);
        let neg = o(&["-0.1*", "+0.1.1", "+0.1.2"]);
        let response = Stepper::default().step(&pos, &neg).expect("step");
        assert_eq!(response.status, TraceStatus::Ongoing);
        assert_eq!(loci(&response), ["0.1", "0.1.1"]);
        assert_eq!(response.unexplored, [locus("0.1.2")]);
        assert!(response.decisive_indices.is_empty());
        assert!(response.non_uniform.is_empty());
    }

    #[test]
    fn phase_decides_whose_order_ranks_branches() {
        // the proponent recorded the branches in the opposite order
        let pos = p(&["+0.1*", "-0.1.2", "-0.1.1"]);
        let neg = o(&["-0.1*", "+0.1.1", "+0.1.2"]);
        let chosen = |phase| {
            let settings = StepperSettings {
                phase,
                ..StepperSettings::default()
            };
            let response = stepper(settings).step(&pos, &neg).expect("step");
            response.pairs[1].locus_path.to_string()
        };
        assert_eq!(chosen(Phase::Neutral), "0.1.1");
        assert_eq!(chosen(Phase::FocusO), "0.1.1");
        assert_eq!(chosen(Phase::FocusP), "0.1.2");
    }

    #[test]
    fn fuel_exhaustion_is_stuck_and_resumable() {
        let pos = p(&["+0.1", "†0.1"]);
        let neg = o(&["-0.1", "†0.1"]);
        let short = StepperSettings {
            max_pairs: 1,
            ..StepperSettings::default()
        };
        let response = stepper(short).step(&pos, &neg).expect("step");
        assert_eq!(response.status, TraceStatus::Stuck);
        assert_eq!(response.pairs.len(), 1);
        assert!(response.decisive_indices.is_empty());

        let request = StepRequest {
            max_pairs: Some(8),
            ..StepRequest::new(pos.id(), neg.id())
        };
        let retry = stepper(short.for_request(&request));
        assert_eq!(retry.step(&pos, &neg).expect("step").status, TraceStatus::Convergent);
    }

    #[test]
    fn cancellation_is_polled_between_pairs() {
        let pos = p(&["+0.1", "-0.1.1", "+0.1.1.1", "-0.1.1.1.1", "†0.1.1.1.1"]);
        let neg = o(&["-0.1", "+0.1.1", "-0.1.1.1", "+0.1.1.1.1", "†0.1.1.1.1"]);
        let settings = StepperSettings {
            cancel_check_interval: 2,
            ..StepperSettings::default()
        };
        let polls = Cell::new(0);
        let response = stepper(settings)
            .step_with_cancel(&pos, &neg, &mut || {
                polls.set(polls.get() + 1);
                polls.get() == 2
            })
            .expect("step");
        assert_eq!(response.status, TraceStatus::Stuck);
        assert_eq!(response.pairs.len(), 4);
        assert_eq!(polls.get(), 2);

        let uncancelled = stepper(settings).step(&pos, &neg).expect("step");
        assert_eq!(uncancelled.status, TraceStatus::Convergent);
        assert_eq!(uncancelled.pairs.len(), 5);
    }

    #[test]
    fn collisions_are_rejected_or_masked() {
        let pos = p(&["+0.1", "+0.2"]);
        let neg = o(&["-0.1", "†0.1", "+0.2"]);
        let err = Stepper::default().step(&pos, &neg).expect_err("collision");
        assert!(matches!(err, StepError::CompositionCollision { .. }));

        let partial = StepperSettings {
            composition: CompositionMode::Partial,
            ..StepperSettings::default()
        };
        let response = stepper(partial).step(&pos, &neg).expect("step");
        assert_eq!(response.status, TraceStatus::Convergent);
        assert_eq!(loci(&response), ["0.1", "0.1"]);
    }

    #[test]
    fn split_runs_each_branch_and_keeps_the_worst_verdict() {
        let pos = p(&["+0.1", "+0.2"]);
        let neg = o(&["-0.1", "†0.1", "-0.2"]);

        let assoc = Stepper::default().step(&pos, &neg).expect("step");
        assert_eq!(assoc.status, TraceStatus::Convergent);
        assert_eq!(assoc.pairs.len(), 2);

        let split = StepperSettings {
            composition: CompositionMode::Split,
            ..StepperSettings::default()
        };
        let response = stepper(split).step(&pos, &neg).expect("step");
        assert_eq!(response.status, TraceStatus::Divergent);
        assert_eq!(loci(&response), ["0.1", "0.1", "0.2"]);
        assert_eq!(response.decisive_indices, [1, 2]);
        let ts: Vec<u64> = response.pairs.iter().map(|pair| pair.ts).collect();
        assert_eq!(ts, [0, 1, 2]);
    }

    #[test]
    fn reports_non_uniform_reactions() {
        let pos = p(&["+0.1*", "-0.1.1", "+0.1.1.1", "-0.1.2"]);
        let neg = o(&["-0.1*", "+0.1.1", "-0.1.1.1", "+0.1.2"]);
        let response = Stepper::default().step(&pos, &neg).expect("step");
        assert_eq!(response.non_uniform.len(), 1);
        let violation = &response.non_uniform[0];
        assert_eq!(violation.design_id, DesignId::new(1));
        assert_eq!(violation.context, locus("0.1"));
        assert_eq!(violation.branches, (locus("0.1.1"), locus("0.1.2")));

        let uniform = p(&["+0.1*", "-0.1.1", "+0.1.1.1", "-0.1.2", "+0.1.2.1"]);
        let response = Stepper::default().step(&uniform, &neg).expect("step");
        assert!(response.non_uniform.is_empty());
    }

    #[test]
    fn request_overrides_only_what_it_names() {
        let base = StepperSettings::default();
        let request = StepRequest {
            phase: Some(Phase::FocusO),
            ..StepRequest::new(DesignId::new(1), DesignId::new(2))
        };
        let merged = base.for_request(&request);
        assert_eq!(merged.phase, Phase::FocusO);
        assert_eq!(merged.max_pairs, base.max_pairs);
        assert_eq!(merged.composition, CompositionMode::Assoc);
    }
}
