//! Algorithms of the dialectic engine.
//!
//! Everything here is synchronous and pure over its inputs: path legality,
//! the design arena that enforces it, alpha-equivalence of traces, the
//! per-participant commitment reasoner, Dung semantics and the
//! argument/attack guards.

pub mod af;
pub mod commitments;
pub mod design;
pub mod guards;
pub mod legality;
pub mod uniformity;

pub use af::{
    AfError, AfRequest, ArgumentationFramework, DEFAULT_MAX_PREFERRED_NODES, ExtensionEnumerator,
    Label, Labelling, PowersetEnumerator,
};
pub use commitments::{
    ApplyOutcome, CommitmentError, CommitmentStore, CommitmentStores, Contradiction, Interaction,
};
pub use design::{AppendError, Design, DesignSnapshot, RecordedAct};
pub use guards::{ValidationError, validate_argument, validate_attack};
pub use legality::{PathViolation, check_path, is_legal};
pub use uniformity::{alpha_equivalent, canonicalize};
