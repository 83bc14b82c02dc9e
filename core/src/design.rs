//! Designs: one participant's append-only act log.
//!
//! Acts live in an arena (`acts`) and are addressed by position. Two side
//! indexes give O(1) lookup by locus and by parent locus. Legality is
//! checked at append time on the branch from the root to the new act; a
//! recorded act is never changed afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use dialectic_types::{Act, ActId, DesignId, Locus, Participant, Polarity, ProperAct};

use crate::legality::{PathViolation, check_path};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppendError {
    #[error("design {design} is closed")]
    Closed { design: DesignId },
    #[error("locus {locus} lies outside design root {root}")]
    OutsideRoot { locus: Locus, root: Locus },
    #[error(transparent)]
    Illegal(#[from] PathViolation),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAct {
    pub id: ActId,
    pub act: Act,
    /// The dialogue move that produced the act, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_id: Option<String>,
}

/// Serializable form of a design: its header and the act log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSnapshot {
    pub id: DesignId,
    pub participant: Participant,
    #[serde(default)]
    pub root: Locus,
    #[serde(default)]
    pub closed: bool,
    pub acts: Vec<RecordedAct>,
}

#[derive(Debug, Clone)]
pub struct Design {
    id: DesignId,
    participant: Participant,
    root: Locus,
    acts: Vec<RecordedAct>,
    by_locus: HashMap<Locus, Vec<usize>>,
    children: HashMap<Locus, Vec<usize>>,
    closed: bool,
}

impl Design {
    #[must_use]
    pub fn new(id: DesignId, participant: Participant, root: Locus) -> Self {
        Self {
            id,
            participant,
            root,
            acts: Vec::new(),
            by_locus: HashMap::new(),
            children: HashMap::new(),
            closed: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> DesignId {
        self.id
    }

    #[must_use]
    pub fn participant(&self) -> Participant {
        self.participant
    }

    #[must_use]
    pub fn root(&self) -> &Locus {
        &self.root
    }

    #[must_use]
    pub fn acts(&self) -> &[RecordedAct] {
        &self.acts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.acts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.acts.is_empty()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    #[must_use]
    pub fn get(&self, id: ActId) -> Option<&RecordedAct> {
        if id.design() != self.id {
            return None;
        }
        self.acts.get(id.seq() as usize)
    }

    /// Acts recorded at `locus` (a daimon is recorded at the context it closes).
    pub fn at_locus<'a>(&'a self, locus: &Locus) -> impl Iterator<Item = &'a RecordedAct> + 'a {
        self.by_locus
            .get(locus)
            .into_iter()
            .flatten()
            .map(|&idx| &self.acts[idx])
    }

    /// The proper act at `locus`, if any. Linearity allows at most one.
    #[must_use]
    pub fn proper_at(&self, locus: &Locus) -> Option<(&RecordedAct, &ProperAct)> {
        self.at_locus(locus)
            .find_map(|rec| rec.act.as_proper().map(|proper| (rec, proper)))
    }

    #[must_use]
    pub fn daimon_at(&self, locus: &Locus) -> Option<&RecordedAct> {
        self.at_locus(locus).find(|rec| rec.act.is_daimon())
    }

    #[must_use]
    pub fn has_act_at(&self, locus: &Locus) -> bool {
        self.proper_at(locus).is_some()
    }

    /// Proper acts whose locus is an immediate child of `parent`, in append order.
    pub fn children_of<'a>(
        &'a self,
        parent: &Locus,
    ) -> impl Iterator<Item = (&'a RecordedAct, &'a ProperAct)> + 'a {
        self.children
            .get(parent)
            .into_iter()
            .flatten()
            .filter_map(|&idx| {
                let rec = &self.acts[idx];
                rec.act.as_proper().map(|proper| (rec, proper))
            })
    }

    /// Child acts of `parent` with the given polarity.
    pub fn children_with<'a>(
        &'a self,
        parent: &Locus,
        polarity: Polarity,
    ) -> impl Iterator<Item = (&'a RecordedAct, &'a ProperAct)> + 'a {
        self.children_of(parent)
            .filter(move |(_, proper)| proper.polarity() == polarity)
    }

    /// Acts on the branch from the root down to `locus`, in append order.
    /// Daimons count when the context they close is on that branch.
    #[must_use]
    pub fn branch_to(&self, locus: &Locus) -> Vec<&Act> {
        self.acts
            .iter()
            .map(|rec| &rec.act)
            .filter(|act| act.locus().is_prefix_of(locus))
            .collect()
    }

    /// Acts strictly inside the subtree rooted at `locus` (including it).
    pub fn subtree<'a>(&'a self, locus: &'a Locus) -> impl Iterator<Item = &'a RecordedAct> + 'a {
        self.acts
            .iter()
            .filter(move |rec| locus.is_prefix_of(rec.act.locus()))
    }

    /// Validate `act` against the current log without recording it.
    pub fn check_append(&self, act: &Act) -> Result<(), AppendError> {
        if self.closed {
            return Err(AppendError::Closed { design: self.id });
        }
        let locus = act.locus();
        if !self.root.is_prefix_of(locus) {
            return Err(AppendError::OutsideRoot {
                locus: locus.clone(),
                root: self.root.clone(),
            });
        }
        let mut branch = self.branch_to(locus);
        branch.push(act);
        check_path(&self.root, branch)?;
        Ok(())
    }

    pub fn append(&mut self, act: Act, move_id: Option<String>) -> Result<ActId, AppendError> {
        self.check_append(&act)?;
        let idx = self.acts.len();
        let id = ActId::new(self.id, idx as u32);
        let locus = act.locus().clone();
        if !act.is_daimon()
            && let Some(parent) = locus.parent()
        {
            self.children.entry(parent).or_default().push(idx);
        }
        debug!(design = %self.id, act = %act, "Appended act");
        self.by_locus.entry(locus).or_default().push(idx);
        self.acts.push(RecordedAct { id, act, move_id });
        Ok(id)
    }

    #[must_use]
    pub fn snapshot(&self) -> DesignSnapshot {
        DesignSnapshot {
            id: self.id,
            participant: self.participant,
            root: self.root.clone(),
            closed: self.closed,
            acts: self.acts.clone(),
        }
    }

    /// Rebuild a design by replaying the snapshot's acts through
    /// [`Design::append`]. Act ids are reassigned from the snapshot's design id.
    pub fn from_snapshot(snapshot: DesignSnapshot) -> Result<Self, AppendError> {
        let mut design = Self::new(snapshot.id, snapshot.participant, snapshot.root);
        for rec in snapshot.acts {
            design.append(rec.act, rec.move_id)?;
        }
        design.closed = snapshot.closed;
        Ok(design)
    }

    /// A copy of this design moved under `root`, renumbered as `id`.
    pub fn relocated(&self, id: DesignId, root: &Locus) -> Result<Self, AppendError> {
        let mut moved = Self::new(id, self.participant, root.clone());
        for rec in &self.acts {
            let act = match &rec.act {
                Act::Proper(proper) => proper
                    .relocated(&self.root, root)
                    .map(Act::Proper)
                    .ok_or_else(|| AppendError::OutsideRoot {
                        locus: proper.locus().clone(),
                        root: self.root.clone(),
                    })?,
                Act::Daimon(daimon) => {
                    let at = daimon
                        .at
                        .rebase(&self.root, root)
                        .ok_or_else(|| AppendError::OutsideRoot {
                            locus: daimon.at.clone(),
                            root: self.root.clone(),
                        })?;
                    Act::daimon(at)
                }
            };
            moved.append(act, rec.move_id.clone())?;
        }
        moved.closed = self.closed;
        Ok(moved)
    }
}
