//! Dialectic engine: compiles dialogue moves into designs, steps designs
//! against each other and fronts the pure algorithms of `dialectic-core`.
//!
//! [`Engine`] is the library surface. It owns the compiled designs, the
//! registered arguments and the per-participant commitment stores; every
//! call is synchronous and deterministic.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use dialectic_core::{
    AfError, AfRequest, ApplyOutcome, ArgumentationFramework, CommitmentError, CommitmentStores,
    DEFAULT_MAX_PREFERRED_NODES, Design, DesignSnapshot, Interaction, Labelling,
    PowersetEnumerator, ValidationError, validate_argument, validate_attack,
};
use dialectic_types::{
    ArgumentProposal, AttackProposal, CommitmentItem, DesignId, DialogueMove, ScopingStrategy,
    StepRequest, StepResponse,
};

mod compiler;
mod composition;
mod events;
mod scope;
mod stepper;
mod store;

pub use compiler::{CompileError, CompileOptions, CompileOutput, Compiler, RejectedMove};
pub use composition::{Composition, collisions};
pub use events::{CompileEvent, EventLog, EventSink, NullSink};
pub use scope::{LEGACY_SCOPE_LABEL, ScopeActors, ScopeSummary};
pub use stepper::{
    DEFAULT_CANCEL_CHECK_INTERVAL, DEFAULT_MAX_PAIRS, StepError, Stepper, StepperSettings,
};
pub use store::DesignStore;

// ============================================================================
// EngineSettings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub scoping: ScopingStrategy,
    pub stepper: StepperSettings,
    /// Largest AF the powerset enumerator accepts.
    pub max_preferred_nodes: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            scoping: ScopingStrategy::Legacy,
            stepper: StepperSettings::default(),
            max_preferred_nodes: DEFAULT_MAX_PREFERRED_NODES,
        }
    }
}

// ============================================================================
// CompileReport
// ============================================================================

/// Everything a compile call produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileReport {
    pub designs: Vec<DesignSnapshot>,
    pub scopes: Vec<ScopeSummary>,
    pub rejected: Vec<RejectedMove>,
    pub events: Vec<CompileEvent>,
}

// ============================================================================
// Engine
// ============================================================================

#[derive(Debug, Default)]
pub struct Engine {
    settings: EngineSettings,
    designs: DesignStore,
    arguments: BTreeMap<String, ArgumentProposal>,
    commitments: CommitmentStores,
}

impl Engine {
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[must_use]
    pub fn designs(&self) -> &DesignStore {
        &self.designs
    }

    pub fn design(&self, id: DesignId) -> Result<&Design, StepError> {
        self.designs.get(id)
    }

    /// Add a design built elsewhere, e.g. restored from a snapshot.
    pub fn insert_design(&mut self, design: Design) -> Option<Design> {
        self.designs.insert(design)
    }

    // ------------------------------------------------------------------------
    // Dialogue
    // ------------------------------------------------------------------------

    /// Compile a move feed into fresh designs. Designs from an earlier
    /// compile are dropped.
    pub fn compile(&mut self, moves: &[DialogueMove]) -> CompileReport {
        let compiler = Compiler::new(CompileOptions {
            scoping: self.settings.scoping,
            ..CompileOptions::default()
        });
        let mut log = EventLog::new();
        let output = compiler.compile(moves, &mut log);
        let report = CompileReport {
            designs: output.designs.iter().map(Design::snapshot).collect(),
            scopes: output.scopes,
            rejected: output.rejected,
            events: log.take(),
        };
        self.designs.replace_all(output.designs);
        report
    }

    pub fn step(&self, request: &StepRequest) -> Result<StepResponse, StepError> {
        self.step_with_cancel(request, &mut || false)
    }

    pub fn step_with_cancel(
        &self,
        request: &StepRequest,
        cancel: &mut dyn FnMut() -> bool,
    ) -> Result<StepResponse, StepError> {
        let pos = self.designs.get(request.pos_design_id)?;
        let neg = self.designs.get(request.neg_design_id)?;
        Stepper::new(self.settings.stepper.for_request(request)).step_with_cancel(pos, neg, cancel)
    }

    // ------------------------------------------------------------------------
    // Acceptability
    // ------------------------------------------------------------------------

    pub fn solve_grounded(&self, request: &AfRequest) -> Result<Labelling, AfError> {
        Ok(ArgumentationFramework::from_request(request)?.grounded_labels())
    }

    pub fn solve_preferred(&self, request: &AfRequest) -> Result<Labelling, AfError> {
        ArgumentationFramework::from_request(request)?.preferred_labels(&self.enumerator())
    }

    pub fn preferred_extensions(
        &self,
        request: &AfRequest,
    ) -> Result<Vec<BTreeSet<String>>, AfError> {
        ArgumentationFramework::from_request(request)?.preferred_extensions(&self.enumerator())
    }

    fn enumerator(&self) -> PowersetEnumerator {
        PowersetEnumerator::new(self.settings.max_preferred_nodes)
    }

    // ------------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------------

    /// Validate and remember an argument so attacks can refer to it.
    pub fn register_argument(
        &mut self,
        id: impl Into<String>,
        argument: ArgumentProposal,
    ) -> Result<(), ValidationError> {
        validate_argument(&argument)?;
        self.arguments.insert(id.into(), argument);
        Ok(())
    }

    pub fn validate_argument(&self, argument: &ArgumentProposal) -> Result<(), ValidationError> {
        validate_argument(argument)
    }

    /// Validate an attack against the registered arguments.
    pub fn validate_attack(&self, attack: &AttackProposal) -> Result<(), ValidationError> {
        let target = attack
            .to_argument_id
            .as_deref()
            .and_then(|id| self.arguments.get(id.trim()));
        validate_attack(attack, target)
    }

    // ------------------------------------------------------------------------
    // Commitments
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn commitments(&self) -> &CommitmentStores {
        &self.commitments
    }

    pub fn apply_to_cs(
        &mut self,
        owner: &str,
        items: impl IntoIterator<Item = CommitmentItem>,
    ) -> Result<ApplyOutcome, CommitmentError> {
        self.commitments.apply_to(owner, items)
    }

    #[must_use]
    pub fn interact_ce(&self, owner: &str) -> Interaction {
        self.commitments.interact(owner)
    }

    /// Remove items from one store. Returns how many were present.
    pub fn erase<'a>(&mut self, owner: &str, labels: impl IntoIterator<Item = &'a str>) -> usize {
        self.commitments
            .store_mut(owner)
            .map_or(0, |store| store.erase(labels))
    }

    pub fn set_entitlement(&mut self, owner: &str, label: &str, entitled: bool) -> bool {
        self.commitments
            .store_mut(owner)
            .is_some_and(|store| store.set_entitlement(label, entitled))
    }
}
