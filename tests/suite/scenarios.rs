//! End-to-end walks through the engine facade.

use std::collections::BTreeSet;

use dialectic_core::Label;
use dialectic_engine::Engine;
use dialectic_types::{
    AttackProposal, AttackType, DesignId, MoveKind, Participant, StepRequest, TargetScope,
    TraceStatus,
};

use crate::common::{af, design, locus, offer_dialogue, said};

fn shape(engine: &Engine, id: u64) -> Vec<String> {
    engine
        .design(DesignId::new(id))
        .expect("compiled design")
        .acts()
        .iter()
        .map(|r| r.act.locus().to_string())
        .collect()
}

#[test]
fn additive_offer_compiles_to_sibling_branches() {
    let mut engine = Engine::default();
    let report = engine.compile(&offer_dialogue());
    assert!(report.rejected.is_empty(), "{:?}", report.rejected);

    let proponent = engine.design(DesignId::new(1)).expect("proponent");
    assert_eq!(proponent.participant(), Participant::Proponent);
    assert_eq!(shape(&engine, 1), ["0.1", "0.1.1", "0.1.2"]);
    let (_, offer) = proponent.proper_at(&locus("0.1")).expect("offer");
    assert!(offer.is_additive());
    let children: Vec<String> = proponent
        .children_of(&locus("0.1"))
        .map(|(_, child)| child.locus().to_string())
        .collect();
    assert_eq!(children, ["0.1.1", "0.1.2"]);

    let response = engine
        .step(&StepRequest::new(DesignId::new(1), DesignId::new(2)))
        .expect("step");
    assert_eq!(response.status, TraceStatus::Ongoing);
    assert_eq!(response.unexplored, [locus("0.1.2")]);
}

#[test]
fn one_sided_attack_is_grounded() {
    let labels = Engine::default()
        .solve_grounded(&af(&["a", "b"], &[("a", "b")]))
        .expect("labels");
    assert_eq!(labels["a"], Label::In);
    assert_eq!(labels["b"], Label::Out);
}

#[test]
fn mutual_attack_is_undecided_with_two_preferred_extensions() {
    let engine = Engine::default();
    let request = af(&["a", "b"], &[("a", "b"), ("b", "a")]);
    let labels = engine.solve_grounded(&request).expect("labels");
    assert_eq!(labels["a"], Label::Undec);
    assert_eq!(labels["b"], Label::Undec);

    let extensions: BTreeSet<BTreeSet<String>> = engine
        .preferred_extensions(&request)
        .expect("preferred")
        .into_iter()
        .collect();
    let expected: BTreeSet<BTreeSet<String>> = [
        BTreeSet::from(["a".to_string()]),
        BTreeSet::from(["b".to_string()]),
    ]
    .into_iter()
    .collect();
    assert_eq!(extensions, expected);
}

#[test]
fn daimons_at_the_same_locus_converge() {
    let mut engine = Engine::default();
    engine.insert_design(design(10, Participant::Proponent, &["+0.1", "†0.1"]));
    engine.insert_design(design(11, Participant::Opponent, &["-0.1", "†0.1"]));
    let response = engine
        .step(&StepRequest::new(DesignId::new(10), DesignId::new(11)))
        .expect("step");
    assert_eq!(response.status, TraceStatus::Convergent);
    assert_eq!(response.decisive_indices, [1]);
}

#[test]
fn concession_in_a_dialogue_converges() {
    let mut engine = Engine::default();
    let report = engine.compile(&[
        said("m1", MoveKind::Assert, "alice", "Tax cuts help"),
        said("m2", MoveKind::Why, "bob", "Why?"),
        said("m3", MoveKind::Grounds, "alice", "Study X"),
        said("m4", MoveKind::Concede, "bob", "Fair"),
    ]);
    assert!(report.rejected.is_empty(), "{:?}", report.rejected);
    let response = engine
        .step(&StepRequest::new(DesignId::new(1), DesignId::new(2)))
        .expect("step");
    assert_eq!(response.status, TraceStatus::Convergent);
    let last = response.pairs.last().expect("pairs");
    assert_eq!(last.locus_path, locus("0.1.1.1"));
}

#[test]
fn undercut_aimed_at_conclusion_names_the_scope_mismatch() {
    let mut attack = AttackProposal::new(AttackType::Undercuts, TargetScope::Conclusion, "arg2");
    attack.to_argument_id = Some("arg1".into());
    let err = Engine::default()
        .validate_attack(&attack)
        .expect_err("wrong scope");
    assert_eq!(err.rule(), "attack.scope_mismatch");
    let message = err.to_string();
    assert!(message.contains("inference"), "{message}");
    assert!(message.contains("conclusion"), "{message}");
}
