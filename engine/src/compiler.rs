//! Move-to-design compiler.
//!
//! Moves are consumed in arrival order. Each scope owns a Proponent and an
//! Opponent design. An act by one actor is recorded with positive polarity in
//! that actor's design and mirrored with negative polarity in the
//! counterpart, so each design alternates along its own branches and the
//! stepper can pair `+ξ` with `-ξ`. Daimons are mirrored as daimons.
//!
//! A move that cannot be placed is rejected and compilation carries on with
//! the next one.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use dialectic_core::{AppendError, Design};
use dialectic_types::{
    Act, DaimonAct, DesignId, DialogueMove, Locus, LocusParseError, MoveKind, Participant,
    Polarity, ProperAct, Provenance, ScopingStrategy, TargetRef,
};

use crate::events::{CompileEvent, EventSink};
use crate::scope::{ScopeState, ScopeSummary};

/// Ramification used when a move does not name its own.
const DEFAULT_RAMIFICATION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("dangling reference: {kind} move {move_id} addresses {locus}, which holds no act")]
    DanglingReference {
        move_id: String,
        kind: MoveKind,
        locus: Locus,
    },
    #[error("dangling reference: {kind} move {move_id} has nothing to reply to")]
    NothingToAddress { move_id: String, kind: MoveKind },
    #[error("illegal act: {kind} move {move_id}: {source}")]
    IllegalAct {
        move_id: String,
        kind: MoveKind,
        #[source]
        source: AppendError,
    },
    #[error("invalid locus in {kind} move {move_id}: {source}")]
    InvalidLocus {
        move_id: String,
        kind: MoveKind,
        #[source]
        source: LocusParseError,
    },
}

impl CompileError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DanglingReference { .. } | Self::NothingToAddress { .. } => "DANGLING_REFERENCE",
            Self::IllegalAct { .. } => "ILLEGAL_ACT",
            Self::InvalidLocus { .. } => "INVALID_LOCUS",
        }
    }

    #[must_use]
    pub fn move_id(&self) -> &str {
        match self {
            Self::DanglingReference { move_id, .. }
            | Self::NothingToAddress { move_id, .. }
            | Self::IllegalAct { move_id, .. }
            | Self::InvalidLocus { move_id, .. } => move_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedMove {
    pub move_id: String,
    pub kind: MoveKind,
    pub code: &'static str,
    pub reason: String,
    #[serde(skip)]
    pub error: CompileError,
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub scoping: ScopingStrategy,
    pub root: Locus,
    /// Id of the first design created; later designs count up from here.
    pub first_design_id: u64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            scoping: ScopingStrategy::Legacy,
            root: Locus::root(),
            first_design_id: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Ordered by id.
    pub designs: Vec<Design>,
    pub scopes: Vec<ScopeSummary>,
    pub rejected: Vec<RejectedMove>,
}

impl CompileOutput {
    #[must_use]
    pub fn design(&self, id: DesignId) -> Option<&Design> {
        self.designs.iter().find(|d| d.id() == id)
    }
}

#[derive(Debug, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    #[must_use]
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile into fresh designs, reporting events to `sink`.
    pub fn compile(&self, moves: &[DialogueMove], sink: &mut dyn EventSink) -> CompileOutput {
        let mut run = Run {
            options: &self.options,
            scopes: BTreeMap::new(),
            order: Vec::new(),
            next_id: self.options.first_design_id,
            sink,
        };
        let mut rejected = Vec::new();

        for m in moves {
            if let Err(error) = run.apply(m) {
                warn!(move_id = %m.id, kind = %m.kind, "{error}");
                run.sink.emit(CompileEvent::MoveRejected {
                    move_id: m.id.clone(),
                    kind: m.kind,
                    reason: error.to_string(),
                });
                rejected.push(RejectedMove {
                    move_id: m.id.clone(),
                    kind: m.kind,
                    code: error.code(),
                    reason: error.to_string(),
                    error,
                });
            }
        }

        let Run { mut scopes, order, .. } = run;
        let mut designs = Vec::new();
        let mut summaries = Vec::new();
        for key in order {
            if let Some(scope) = scopes.remove(&key) {
                summaries.push(scope.summary());
                let (proponent, opponent) = scope.into_designs();
                designs.push(proponent);
                designs.push(opponent);
            }
        }
        designs.sort_by_key(Design::id);
        info!(
            moves = moves.len(),
            scopes = summaries.len(),
            designs = designs.len(),
            rejected = rejected.len(),
            "Compiled dialogue"
        );
        CompileOutput {
            designs,
            scopes: summaries,
            rejected,
        }
    }
}

type ScopeKey = Option<TargetRef>;

struct Run<'a> {
    options: &'a CompileOptions,
    scopes: BTreeMap<ScopeKey, ScopeState>,
    /// Scope keys in creation order.
    order: Vec<ScopeKey>,
    next_id: u64,
    sink: &'a mut dyn EventSink,
}

impl Run<'_> {
    fn apply(&mut self, m: &DialogueMove) -> Result<(), CompileError> {
        let target = m.target();
        let key = match self.options.scoping {
            ScopingStrategy::Legacy => None,
            ScopingStrategy::PerTarget => target.clone(),
        };
        let Self {
            options,
            scopes,
            order,
            next_id,
            sink,
        } = self;
        let scope = scopes.entry(key).or_insert_with_key(|key| {
            let ids = (DesignId::new(*next_id), DesignId::new(*next_id + 1));
            *next_id += 2;
            let scope = ScopeState::new(key.clone(), ids, &options.root);
            debug!(scope = %scope.label(), "Opened scope");
            sink.emit(CompileEvent::ScopeOpened {
                label: scope.label(),
                proponent: ids.0,
                opponent: ids.1,
            });
            order.push(key.clone());
            scope
        });
        let sink: &mut dyn EventSink = &mut **sink;
        let role = scope.admit(&m.actor_id, target.as_ref(), m.payload.role);

        if scope.is_closed() && m.kind != MoveKind::Close {
            return Err(illegal(
                m,
                AppendError::Closed {
                    design: scope.proponent.id(),
                },
            ));
        }

        match m.kind {
            MoveKind::Assert => {
                let locus = match &m.payload.locus_path {
                    Some(locus) => locus.clone(),
                    None => {
                        let root = scope.root().clone();
                        scope.fresh_child(&root)
                    }
                };
                let ramification = m
                    .payload
                    .ramification
                    .clone()
                    .unwrap_or_else(|| vec![DEFAULT_RAMIFICATION.to_string()]);
                let act = ProperAct::new(Polarity::Positive, locus.clone())
                    .with_ramification(ramification)
                    .with_expression(m.expression())
                    .with_additive(m.payload.additive)
                    .with_justification(locus.parent().filter(|p| p != scope.root()));
                record_proper(scope, sink, m, role, act)?;
                scope.claim(&locus);
                scope.open(target.as_ref(), &locus);
                if m.payload.ends_with_daimon {
                    record_daimon(scope, sink, m, &locus)?;
                }
            }
            MoveKind::Why | MoveKind::Grounds => {
                let anchor = match &m.payload.locus_path {
                    Some(locus) => locus.clone(),
                    None => scope
                        .anchor(target.as_ref())
                        .cloned()
                        .ok_or_else(|| CompileError::NothingToAddress {
                            move_id: m.id.clone(),
                            kind: m.kind,
                        })?,
                };
                if !scope.has_act_at(&anchor) {
                    return Err(CompileError::DanglingReference {
                        move_id: m.id.clone(),
                        kind: m.kind,
                        locus: anchor,
                    });
                }
                let locus = match &m.payload.child_suffix {
                    Some(suffix) => anchor.child(suffix.trim()).map_err(|source| {
                        CompileError::InvalidLocus {
                            move_id: m.id.clone(),
                            kind: m.kind,
                            source,
                        }
                    })?,
                    None => scope.fresh_child(&anchor),
                };
                let mut act = ProperAct::new(Polarity::Positive, locus.clone())
                    .with_expression(m.expression())
                    .with_additive(m.payload.additive)
                    .with_justification(Some(anchor))
                    .with_provenance(Provenance {
                        cq_id: m.payload.cq_id.clone(),
                        scheme_key: m.payload.scheme_key.clone(),
                    });
                if let Some(ramification) = &m.payload.ramification {
                    act = act.with_ramification(ramification.iter().cloned());
                } else if m.kind == MoveKind::Why {
                    act = act.with_ramification([DEFAULT_RAMIFICATION]);
                }
                record_proper(scope, sink, m, role, act)?;
                scope.claim(&locus);
                // alternative GROUNDS for one WHY stay siblings
                if m.kind == MoveKind::Why {
                    scope.open(target.as_ref(), &locus);
                } else {
                    scope.touch(target.as_ref(), &locus);
                }
                if m.kind == MoveKind::Grounds && m.payload.ends_with_daimon {
                    record_daimon(scope, sink, m, &locus)?;
                }
            }
            MoveKind::Retract | MoveKind::Concede => {
                let context = m
                    .payload
                    .locus_path
                    .clone()
                    .or_else(|| scope.context(target.as_ref()).cloned())
                    .unwrap_or_else(|| scope.root().clone());
                record_daimon(scope, sink, m, &context)?;
            }
            MoveKind::Close => {
                if !scope.close() {
                    return Err(illegal(
                        m,
                        AppendError::Closed {
                            design: scope.proponent.id(),
                        },
                    ));
                }
                for design in [scope.proponent.id(), scope.opponent.id()] {
                    sink.emit(CompileEvent::DesignClosed { design });
                }
            }
        }
        Ok(())
    }
}

fn illegal(m: &DialogueMove, source: AppendError) -> CompileError {
    CompileError::IllegalAct {
        move_id: m.id.clone(),
        kind: m.kind,
        source,
    }
}

/// Append `act` to the actor's design and its dual to the counterpart. Both
/// appends are checked before either happens.
fn record_proper(
    scope: &mut ScopeState,
    sink: &mut dyn EventSink,
    m: &DialogueMove,
    role: Participant,
    act: ProperAct,
) -> Result<(), CompileError> {
    let mirror = Act::Proper(act.dual());
    let act = Act::Proper(act);
    let (own, other) = scope.designs_mut(role);
    own.check_append(&act).map_err(|e| illegal(m, e))?;
    other.check_append(&mirror).map_err(|e| illegal(m, e))?;
    for (design, act) in [(own, act), (other, mirror)] {
        emit_append(design, sink, m, act)?;
    }
    Ok(())
}

fn record_daimon(
    scope: &mut ScopeState,
    sink: &mut dyn EventSink,
    m: &DialogueMove,
    context: &Locus,
) -> Result<(), CompileError> {
    let daimon = Act::Daimon(DaimonAct {
        at: context.clone(),
        expression: m.expression(),
    });
    scope
        .proponent
        .check_append(&daimon)
        .map_err(|e| illegal(m, e))?;
    scope
        .opponent
        .check_append(&daimon)
        .map_err(|e| illegal(m, e))?;
    emit_append(&mut scope.proponent, sink, m, daimon.clone())?;
    emit_append(&mut scope.opponent, sink, m, daimon)?;
    Ok(())
}

fn emit_append(
    design: &mut Design,
    sink: &mut dyn EventSink,
    m: &DialogueMove,
    act: Act,
) -> Result<(), CompileError> {
    let locus = act.locus().clone();
    let act_id = design
        .append(act, Some(m.id.clone()))
        .map_err(|e| illegal(m, e))?;
    sink.emit(CompileEvent::ActAppended {
        design: design.id(),
        act_id,
        locus,
        move_id: m.id.clone(),
    });
    Ok(())
}
