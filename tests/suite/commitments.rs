//! Commitment stores through the engine facade.

use dialectic_engine::Engine;
use dialectic_types::CommitmentItem;

fn items(json: &str) -> Vec<CommitmentItem> {
    serde_json::from_str(json).expect("fixture items")
}

#[test]
fn wire_items_chain_and_report_clashes() {
    let mut engine = Engine::default();
    let outcome = engine
        .apply_to_cs(
            "alice",
            items(
                r#"[
                    {"label": "congestion_high", "basePolarity": "pos"},
                    {"label": "traffic_good", "basePolarity": "pos"},
                    {"label": "congestion_high -> not traffic_good", "basePolarity": "neg"},
                    {"label": "traffic_good => commute_ok", "basePolarity": "neg", "entitled": false}
                ]"#,
            ),
        )
        .expect("labels");
    assert_eq!(outcome.added.len(), 4);

    let result = engine.interact_ce("alice");
    assert_eq!(result.derived_facts, ["not traffic_good"]);
    assert_eq!(result.contradictions.len(), 1);

    assert!(engine.set_entitlement("alice", "traffic_good => commute_ok", true));
    assert_eq!(
        engine.interact_ce("alice").derived_facts,
        ["not traffic_good", "commute_ok"]
    );
}

#[test]
fn opposing_participants_do_not_contradict_each_other() {
    let mut engine = Engine::default();
    engine
        .apply_to_cs("alice", [CommitmentItem::fact("rain")])
        .expect("labels");
    engine
        .apply_to_cs("bob", [CommitmentItem::fact("not rain")])
        .expect("labels");
    assert!(engine.interact_ce("alice").contradictions.is_empty());
    assert!(engine.interact_ce("bob").contradictions.is_empty());
    assert_eq!(engine.commitments().store("bob").map(|s| s.len()), Some(1));
}

#[test]
fn reapplying_is_harmless_and_erase_retracts() {
    let mut engine = Engine::default();
    let batch = [CommitmentItem::fact("A"), CommitmentItem::rule("A -> B")];
    engine.apply_to_cs("alice", batch.clone()).expect("labels");
    let again = engine.apply_to_cs("alice", batch).expect("labels");
    assert!(again.added.is_empty());
    assert_eq!(again.duplicates.len(), 2);
    assert_eq!(engine.interact_ce("alice").derived_facts, ["B"]);

    assert_eq!(engine.erase("alice", ["A"]), 1);
    assert!(engine.interact_ce("alice").derived_facts.is_empty());
    assert_eq!(engine.erase("nobody", ["A"]), 0);
}
