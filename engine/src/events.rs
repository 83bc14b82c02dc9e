//! Compilation events.
//!
//! The compiler never publishes anything itself. It reports what happened
//! to an injected [`EventSink`]; callers decide whether to collect, forward
//! or drop the events.

use serde::Serialize;

use dialectic_types::{ActId, DesignId, Locus, MoveKind};

/// Something the compiler did. Closed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum CompileEvent {
    /// A new Proponent/Opponent design pair was created for a scope.
    #[serde(rename_all = "camelCase")]
    ScopeOpened {
        label: String,
        proponent: DesignId,
        opponent: DesignId,
    },
    #[serde(rename_all = "camelCase")]
    ActAppended {
        design: DesignId,
        act_id: ActId,
        locus: Locus,
        move_id: String,
    },
    #[serde(rename_all = "camelCase")]
    MoveRejected {
        move_id: String,
        kind: MoveKind,
        reason: String,
    },
    DesignClosed { design: DesignId },
}

impl CompileEvent {
    /// One-line description for logs.
    #[must_use]
    pub fn format(&self) -> String {
        match self {
            Self::ScopeOpened {
                label,
                proponent,
                opponent,
            } => format!("scope '{label}' opened (P={proponent}, O={opponent})"),
            Self::ActAppended {
                design,
                act_id,
                locus,
                move_id,
            } => format!("move {move_id}: act {act_id} at {locus} in design {design}"),
            Self::MoveRejected {
                move_id,
                kind,
                reason,
            } => format!("move {move_id} ({kind}) rejected: {reason}"),
            Self::DesignClosed { design } => format!("design {design} closed"),
        }
    }
}

/// Receives events as they happen.
pub trait EventSink {
    fn emit(&mut self, event: CompileEvent);
}

impl EventSink for Vec<CompileEvent> {
    fn emit(&mut self, event: CompileEvent) {
        self.push(event);
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: CompileEvent) {}
}

/// Queue of pending events, drained by the caller.
#[derive(Debug, Default)]
pub struct EventLog {
    pending: Vec<CompileEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all pending events, leaving the log empty.
    pub fn take(&mut self) -> Vec<CompileEvent> {
        std::mem::take(&mut self.pending)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: CompileEvent) {
        self.pending.push(event);
    }
}
