//! Property checks over generated move feeds and frameworks.

use std::collections::BTreeSet;

use proptest::collection::vec;
use proptest::prelude::{Just, Strategy, any, prop_assert, prop_assert_eq, proptest};
use proptest::sample::select;

use dialectic_core::{ArgumentationFramework, Design, Label, PowersetEnumerator};
use dialectic_engine::{Engine, EngineSettings};
use dialectic_types::{CompositionMode, DialogueMove, MoveKind, ScopingStrategy, StepRequest};

fn arb_move() -> impl Strategy<Value = (MoveKind, &'static str, Option<&'static str>)> {
    (
        select(vec![
            MoveKind::Assert,
            MoveKind::Assert,
            MoveKind::Why,
            MoveKind::Grounds,
            MoveKind::Retract,
            MoveKind::Concede,
            MoveKind::Close,
        ]),
        select(vec!["alice", "bob", "carol"]),
        select(vec![None, Some("c1"), Some("c2")]),
    )
}

fn arb_feed() -> impl Strategy<Value = Vec<DialogueMove>> {
    vec(arb_move(), 0..16).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(idx, (kind, actor, target))| {
                let m = DialogueMove::new(format!("m{idx}"), kind, actor);
                match target {
                    Some(id) => m.targeting("claim", id),
                    None => m,
                }
            })
            .collect()
    })
}

fn arb_scoping() -> impl Strategy<Value = ScopingStrategy> {
    any::<bool>().prop_map(|per_target| {
        if per_target {
            ScopingStrategy::PerTarget
        } else {
            ScopingStrategy::Legacy
        }
    })
}

fn arb_af() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..=6).prop_flat_map(|n| (Just(n), vec((0..n, 0..n), 0..12)))
}

fn framework(n: usize, attacks: &[(usize, usize)]) -> ArgumentationFramework {
    let name = |i: usize| format!("n{i}");
    ArgumentationFramework::new(
        (0..n).map(name),
        attacks.iter().map(|&(a, b)| (name(a), name(b))),
    )
    .expect("attacks only name known nodes")
}

proptest! {
    #[test]
    fn compiling_is_deterministic_and_replayable(feed in arb_feed(), scoping in arb_scoping()) {
        let settings = EngineSettings { scoping, ..EngineSettings::default() };
        let first = Engine::new(settings).compile(&feed);
        let second = Engine::new(settings).compile(&feed);
        prop_assert_eq!(&first.designs, &second.designs);
        prop_assert_eq!(first.rejected.len(), second.rejected.len());

        for snapshot in &first.designs {
            let replayed = Design::from_snapshot(snapshot.clone());
            prop_assert!(replayed.is_ok(), "{:?}", replayed.err());
            if let Ok(design) = replayed {
                prop_assert_eq!(&design.snapshot(), snapshot);
            }
        }
    }

    #[test]
    fn stepping_compiled_scopes_terminates_within_fuel(feed in arb_feed(), scoping in arb_scoping()) {
        let mut engine = Engine::new(EngineSettings { scoping, ..EngineSettings::default() });
        let report = engine.compile(&feed);
        for scope in &report.scopes {
            let request = StepRequest {
                composition_mode: Some(CompositionMode::Partial),
                max_pairs: Some(32),
                ..StepRequest::new(scope.proponent_design, scope.opponent_design)
            };
            let response = engine.step(&request);
            prop_assert!(response.is_ok(), "{:?}", response.err());
            if let Ok(response) = response {
                prop_assert!(response.pairs.len() <= 32);
                prop_assert!(response.decisive_indices.iter().all(|&i| i < response.pairs.len()));
                prop_assert!(response.pairs.windows(2).all(|w| w[0].ts < w[1].ts));
            }
        }
    }

    #[test]
    fn grounded_labelling_is_complete((n, attacks) in arb_af()) {
        let af = framework(n, &attacks);
        let labels = af.grounded();
        for node in 0..n {
            let attackers = af.attackers_of(node);
            let expected = if attackers.iter().all(|&a| labels[a] == Label::Out) {
                Label::In
            } else if attackers.iter().any(|&a| labels[a] == Label::In) {
                Label::Out
            } else {
                Label::Undec
            };
            prop_assert_eq!(labels[node], expected, "node {}", node);
        }
    }

    #[test]
    fn preferred_extensions_are_admissible_and_contain_grounded((n, attacks) in arb_af()) {
        let af = framework(n, &attacks);
        let grounded = af.grounded_extension();
        let extensions = af
            .preferred_extensions(&PowersetEnumerator::new(6))
            .expect("small framework");
        prop_assert!(!extensions.is_empty());
        for extension in &extensions {
            prop_assert!(af.is_admissible(extension));
            prop_assert!(grounded.is_subset(extension));
        }
        let distinct: BTreeSet<_> = extensions.iter().collect();
        prop_assert_eq!(distinct.len(), extensions.len());
    }
}
