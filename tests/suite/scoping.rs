//! Legacy and per-target scoping of one move feed.

use dialectic_engine::{Engine, EngineSettings, LEGACY_SCOPE_LABEL};
use dialectic_types::{DialogueMove, MoveKind, ScopingStrategy, StepRequest, TraceStatus};

fn feed() -> Vec<DialogueMove> {
    vec![
        DialogueMove::new("m1", MoveKind::Assert, "alice").targeting("claim", "c1"),
        DialogueMove::new("m2", MoveKind::Assert, "bob").targeting("claim", "c2"),
        DialogueMove::new("m3", MoveKind::Why, "bob").targeting("claim", "c1"),
    ]
}

fn engine(scoping: ScopingStrategy) -> Engine {
    Engine::new(EngineSettings {
        scoping,
        ..EngineSettings::default()
    })
}

#[test]
fn legacy_scoping_keeps_one_pair_of_designs() {
    let mut engine = engine(ScopingStrategy::Legacy);
    let report = engine.compile(&feed());
    assert_eq!(report.designs.len(), 2);
    assert_eq!(report.scopes.len(), 1);
    assert_eq!(report.scopes[0].label, LEGACY_SCOPE_LABEL);
    assert_eq!(report.scopes[0].move_count, 3);
    assert_eq!(report.scopes[0].target_types, ["claim"]);
}

#[test]
fn per_target_scopes_are_stepped_independently() {
    let mut engine = engine(ScopingStrategy::PerTarget);
    let report = engine.compile(&feed());
    assert!(report.rejected.is_empty(), "{:?}", report.rejected);
    assert_eq!(report.designs.len(), 4);
    assert_eq!(engine.designs().len(), 4);

    let c1 = report
        .scopes
        .iter()
        .find(|scope| scope.label == "claim:c1")
        .expect("c1 scope");
    assert_eq!(c1.actors.proponent.as_deref(), Some("alice"));
    let response = engine
        .step(&StepRequest::new(c1.proponent_design, c1.opponent_design))
        .expect("step");
    assert_eq!(response.status, TraceStatus::Divergent);
    assert_eq!(response.pairs.len(), 2);

    let c2 = report
        .scopes
        .iter()
        .find(|scope| scope.label == "claim:c2")
        .expect("c2 scope");
    assert_eq!(c2.actors.proponent.as_deref(), Some("bob"));
    assert!(c2.actors.opponent.is_empty());
}

#[test]
fn report_uses_wire_names() {
    let mut engine = engine(ScopingStrategy::PerTarget);
    let report = engine.compile(&feed());
    assert!(!report.events.is_empty());
    let json = serde_json::to_value(&report).expect("serialize");
    assert!(json["designs"].is_array());
    assert_eq!(json["scopes"][0]["moveCount"], 2);
}
