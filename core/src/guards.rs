//! Construction guards for arguments and attacks.
//!
//! Pure validation. Every rejection names the rule it broke and nothing is
//! coerced: a blank identifier counts as missing.

use std::collections::HashSet;

use thiserror::Error;

use dialectic_types::{ArgumentProposal, AttackProposal, AttackType, TargetScope};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("argument.conclusion_required: conclusion must not be empty")]
    EmptyConclusion,
    #[error("argument.premises_required: an argument needs at least one premise")]
    NoPremises,
    #[error("argument.premise_blank: premise {index} is empty")]
    BlankPremise { index: usize },
    #[error("argument.conclusion_in_premises: '{conclusion}' is both conclusion and premise")]
    ConclusionAmongPremises { conclusion: String },
    #[error("argument.duplicate_premise: '{premise}' is listed more than once")]
    DuplicatePremise { premise: String },
    #[error("attack.source_required: fromArgumentId must not be empty")]
    MissingSource,
    #[error(
        "attack.scope_mismatch: {attack_type} must target the {expected} scope, not the {actual} scope"
    )]
    ScopeMismatch {
        attack_type: AttackType,
        expected: TargetScope,
        actual: TargetScope,
    },
    #[error("attack.target_argument_required: {attack_type} needs toArgumentId")]
    MissingTargetArgument { attack_type: AttackType },
    #[error("attack.target_claim_required: REBUTS needs targetClaimId")]
    MissingTargetClaim,
    #[error("attack.target_premise_required: UNDERMINES needs targetPremiseId")]
    MissingTargetPremise,
    #[error("attack.target_argument_unknown: argument '{argument}' is not available")]
    UnknownTargetArgument { argument: String },
    #[error("attack.premise_not_in_target: '{premise}' is not a premise of argument '{argument}'")]
    PremiseNotInTarget { premise: String, argument: String },
}

impl ValidationError {
    /// The rule identifier that prefixes the message.
    #[must_use]
    pub fn rule(&self) -> &'static str {
        match self {
            Self::EmptyConclusion => "argument.conclusion_required",
            Self::NoPremises => "argument.premises_required",
            Self::BlankPremise { .. } => "argument.premise_blank",
            Self::ConclusionAmongPremises { .. } => "argument.conclusion_in_premises",
            Self::DuplicatePremise { .. } => "argument.duplicate_premise",
            Self::MissingSource => "attack.source_required",
            Self::ScopeMismatch { .. } => "attack.scope_mismatch",
            Self::MissingTargetArgument { .. } => "attack.target_argument_required",
            Self::MissingTargetClaim => "attack.target_claim_required",
            Self::MissingTargetPremise => "attack.target_premise_required",
            Self::UnknownTargetArgument { .. } => "attack.target_argument_unknown",
            Self::PremiseNotInTarget { .. } => "attack.premise_not_in_target",
        }
    }
}

pub fn validate_argument(argument: &ArgumentProposal) -> Result<(), ValidationError> {
    let conclusion = argument.conclusion_id.trim();
    if conclusion.is_empty() {
        return Err(ValidationError::EmptyConclusion);
    }
    if argument.premise_ids.is_empty() {
        return Err(ValidationError::NoPremises);
    }
    let mut seen = HashSet::new();
    for (index, premise) in argument.premise_ids.iter().enumerate() {
        let premise = premise.trim();
        if premise.is_empty() {
            return Err(ValidationError::BlankPremise { index });
        }
        if premise == conclusion {
            return Err(ValidationError::ConclusionAmongPremises {
                conclusion: conclusion.to_string(),
            });
        }
        if !seen.insert(premise) {
            return Err(ValidationError::DuplicatePremise {
                premise: premise.to_string(),
            });
        }
    }
    Ok(())
}

/// Validate an attack. `target` is the argument named by `toArgumentId`, if
/// the caller could resolve it; it is only consulted for UNDERMINES.
pub fn validate_attack(
    attack: &AttackProposal,
    target: Option<&ArgumentProposal>,
) -> Result<(), ValidationError> {
    if attack.from_argument_id.trim().is_empty() {
        return Err(ValidationError::MissingSource);
    }
    let expected = attack.attack_type.required_scope();
    if attack.target_scope != expected {
        return Err(ValidationError::ScopeMismatch {
            attack_type: attack.attack_type,
            expected,
            actual: attack.target_scope,
        });
    }

    match attack.attack_type {
        AttackType::Undercuts => {
            present(attack.to_argument_id.as_deref()).ok_or(
                ValidationError::MissingTargetArgument {
                    attack_type: attack.attack_type,
                },
            )?;
        }
        AttackType::Rebuts => {
            present(attack.target_claim_id.as_deref()).ok_or(ValidationError::MissingTargetClaim)?;
        }
        AttackType::Undermines => {
            let premise = present(attack.target_premise_id.as_deref())
                .ok_or(ValidationError::MissingTargetPremise)?;
            let argument = present(attack.to_argument_id.as_deref()).ok_or(
                ValidationError::MissingTargetArgument {
                    attack_type: attack.attack_type,
                },
            )?;
            let target = target.ok_or_else(|| ValidationError::UnknownTargetArgument {
                argument: argument.to_string(),
            })?;
            if !target.premise_ids.iter().any(|p| p.trim() == premise) {
                return Err(ValidationError::PremiseNotInTarget {
                    premise: premise.to_string(),
                    argument: argument.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
