//! Shared fixtures for the integration suite.

#![allow(dead_code)]

use dialectic_core::{AfRequest, Design};
use dialectic_types::{
    Act, DesignId, DialogueMove, Locus, MoveKind, MovePayload, Participant, Polarity, ProperAct,
};

pub fn locus(path: &str) -> Locus {
    Locus::parse(path).expect("fixture locus")
}

pub fn said(id: &str, kind: MoveKind, actor: &str, text: &str) -> DialogueMove {
    DialogueMove::new(id, kind, actor).with_payload(MovePayload {
        text: Some(text.into()),
        ..MovePayload::default()
    })
}

/// A GROUNDS move addressing `at`.
pub fn grounds_at(id: &str, actor: &str, at: &str, text: &str) -> DialogueMove {
    DialogueMove::new(id, MoveKind::Grounds, actor).with_payload(MovePayload {
        text: Some(text.into()),
        locus_path: Some(locus(at)),
        ..MovePayload::default()
    })
}

/// An additive offer answered by two alternative grounds.
pub fn offer_dialogue() -> Vec<DialogueMove> {
    vec![
        DialogueMove::new("m1", MoveKind::Assert, "alice").with_payload(MovePayload {
            text: Some("Offer".into()),
            additive: true,
            ..MovePayload::default()
        }),
        grounds_at("m2", "bob", "0.1", "book"),
        grounds_at("m3", "bob", "0.1", "surprise"),
    ]
}

/// Acts written as `+0.1`, `-0.1.1`, `+0.1*` (additive) or `†0.1`.
pub fn design(id: u64, participant: Participant, acts: &[&str]) -> Design {
    let mut d = Design::new(DesignId::new(id), participant, Locus::root());
    for text in acts {
        let act = if let Some(at) = text.strip_prefix('†') {
            Act::daimon(locus(at))
        } else {
            let (sign, rest) = text.split_at(1);
            let polarity = if sign == "+" {
                Polarity::Positive
            } else {
                Polarity::Negative
            };
            let (path, additive) = match rest.strip_suffix('*') {
                Some(path) => (path, true),
                None => (rest, false),
            };
            ProperAct::new(polarity, locus(path))
                .with_additive(additive)
                .into()
        };
        d.append(act, None).expect("fixture act");
    }
    d
}

pub fn af(nodes: &[&str], attacks: &[(&str, &str)]) -> AfRequest {
    AfRequest {
        nodes: nodes.iter().map(ToString::to_string).collect(),
        attacks: attacks
            .iter()
            .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
            .collect(),
    }
}
