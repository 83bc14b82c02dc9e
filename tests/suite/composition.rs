//! Composition modes over hand-built designs.

use dialectic_engine::{Engine, StepError, collisions};
use dialectic_types::{CompositionMode, DesignId, Participant, StepRequest, TraceStatus};

use crate::common::{design, locus};

fn engine_with(pos: &[&str], neg: &[&str]) -> Engine {
    let mut engine = Engine::default();
    engine.insert_design(design(1, Participant::Proponent, pos));
    engine.insert_design(design(2, Participant::Opponent, neg));
    engine
}

fn request(mode: CompositionMode) -> StepRequest {
    StepRequest {
        composition_mode: Some(mode),
        ..StepRequest::new(DesignId::new(1), DesignId::new(2))
    }
}

#[test]
fn colliding_positive_acts_only_pass_masking_modes() {
    let engine = engine_with(&["+0.1", "+0.2"], &["-0.1", "†0.1", "+0.2"]);
    let pos = engine.design(DesignId::new(1)).expect("pos");
    let neg = engine.design(DesignId::new(2)).expect("neg");
    assert_eq!(collisions(pos, neg), [locus("0.2")]);

    for mode in [CompositionMode::Assoc, CompositionMode::Split] {
        let err = engine.step(&request(mode)).expect_err("collision");
        assert!(matches!(err, StepError::CompositionCollision { .. }), "{mode:?}");
        assert!(err.to_string().contains("0.2"));
    }
    for mode in [CompositionMode::Partial, CompositionMode::Spiritual] {
        let response = engine.step(&request(mode)).expect("masked");
        assert_eq!(response.status, TraceStatus::Convergent, "{mode:?}");
    }
}

#[test]
fn stepping_a_design_against_itself_is_refused() {
    let engine = engine_with(&["+0.1"], &["-0.1"]);
    let err = engine
        .step(&StepRequest::new(DesignId::new(1), DesignId::new(1)))
        .expect_err("same design");
    assert_eq!(err, StepError::SameDesign(DesignId::new(1)));
    assert!(err.to_string().starts_with("configuration error"));
}

#[test]
fn unknown_design_is_a_configuration_error() {
    let engine = engine_with(&["+0.1"], &["-0.1"]);
    let err = engine
        .step(&StepRequest::new(DesignId::new(1), DesignId::new(9)))
        .expect_err("unknown");
    assert_eq!(err, StepError::UnknownDesign(DesignId::new(9)));
}

#[test]
fn split_reports_the_worst_branch() {
    let engine = engine_with(&["+0.1", "+0.2"], &["-0.1", "†0.1", "-0.2"]);
    let response = engine.step(&request(CompositionMode::Split)).expect("split");
    assert_eq!(response.status, TraceStatus::Divergent);
    assert_eq!(response.decisive_indices, [1, 2]);
}
