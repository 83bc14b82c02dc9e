//! Per-scope compilation state: role assignment, anchors and fresh indices.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use dialectic_core::Design;
use dialectic_types::{DesignId, Locus, Participant, TargetRef};

pub const LEGACY_SCOPE_LABEL: &str = "legacy";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeActors {
    pub proponent: Option<String>,
    pub opponent: Vec<String>,
    pub all: Vec<String>,
}

/// What a caller sees about one compiled scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    pub label: String,
    pub target: Option<TargetRef>,
    pub move_count: usize,
    pub actors: ScopeActors,
    pub target_types: Vec<String>,
    pub proponent_design: DesignId,
    pub opponent_design: DesignId,
}

#[derive(Debug)]
pub(crate) struct ScopeState {
    pub(crate) target: Option<TargetRef>,
    pub(crate) proponent: Design,
    pub(crate) opponent: Design,
    actors: ScopeActors,
    target_types: BTreeSet<String>,
    move_count: usize,
    /// Locus a WHY or GROUNDS on each target replies to.
    anchors: HashMap<TargetRef, Locus>,
    /// Reply locus for moves without an anchored target.
    reply: Option<Locus>,
    /// Latest locus touched per target.
    latest: HashMap<TargetRef, Locus>,
    /// Latest locus touched by any move in the scope.
    cursor: Option<Locus>,
    /// Highest sibling index taken by an accepted act under each parent.
    next_index: HashMap<Locus, u32>,
}

impl ScopeState {
    pub(crate) fn new(target: Option<TargetRef>, ids: (DesignId, DesignId), root: &Locus) -> Self {
        Self {
            target,
            proponent: Design::new(ids.0, Participant::Proponent, root.clone()),
            opponent: Design::new(ids.1, Participant::Opponent, root.clone()),
            actors: ScopeActors::default(),
            target_types: BTreeSet::new(),
            move_count: 0,
            anchors: HashMap::new(),
            reply: None,
            latest: HashMap::new(),
            cursor: None,
            next_index: HashMap::new(),
        }
    }

    pub(crate) fn label(&self) -> String {
        self.target
            .as_ref()
            .map_or_else(|| LEGACY_SCOPE_LABEL.to_string(), ToString::to_string)
    }

    pub(crate) fn root(&self) -> &Locus {
        self.proponent.root()
    }

    /// Count the move and decide the actor's role. The first actor seen is
    /// the Proponent unless a move says otherwise.
    pub(crate) fn admit(
        &mut self,
        actor: &str,
        target: Option<&TargetRef>,
        role: Option<Participant>,
    ) -> Participant {
        self.move_count += 1;
        if let Some(target) = target {
            self.target_types.insert(target.target_type.clone());
        }
        if !self.actors.all.iter().any(|a| a == actor) {
            self.actors.all.push(actor.to_string());
        }
        let role = role.unwrap_or_else(|| match &self.actors.proponent {
            None => Participant::Proponent,
            Some(p) if p == actor => Participant::Proponent,
            Some(_) => Participant::Opponent,
        });
        match role {
            Participant::Proponent => {
                if self.actors.proponent.is_none() {
                    self.actors.proponent = Some(actor.to_string());
                }
            }
            Participant::Opponent => {
                if !self.actors.opponent.iter().any(|a| a == actor) {
                    self.actors.opponent.push(actor.to_string());
                }
            }
        }
        role
    }

    /// (actor's design, counterpart design)
    pub(crate) fn designs_mut(&mut self, role: Participant) -> (&mut Design, &mut Design) {
        match role {
            Participant::Proponent => (&mut self.proponent, &mut self.opponent),
            Participant::Opponent => (&mut self.opponent, &mut self.proponent),
        }
    }

    pub(crate) fn has_act_at(&self, locus: &Locus) -> bool {
        self.proponent.has_act_at(locus) || self.opponent.has_act_at(locus)
    }

    /// Where a reply lands when the move does not pin a locus.
    pub(crate) fn anchor(&self, target: Option<&TargetRef>) -> Option<&Locus> {
        target
            .and_then(|t| self.anchors.get(t))
            .or(self.reply.as_ref())
    }

    /// Where a daimon lands when the move does not pin a locus.
    pub(crate) fn context(&self, target: Option<&TargetRef>) -> Option<&Locus> {
        target
            .and_then(|t| self.latest.get(t))
            .or(self.cursor.as_ref())
    }

    /// Make `locus` the reply anchor for `target`. Later replies open
    /// children under it.
    pub(crate) fn open(&mut self, target: Option<&TargetRef>, locus: &Locus) {
        if let Some(target) = target {
            self.anchors.insert(target.clone(), locus.clone());
        }
        self.reply = Some(locus.clone());
        self.touch(target, locus);
    }

    /// Record `locus` as the latest one played without moving the anchor.
    pub(crate) fn touch(&mut self, target: Option<&TargetRef>, locus: &Locus) {
        if let Some(target) = target {
            self.latest.insert(target.clone(), locus.clone());
        }
        self.cursor = Some(locus.clone());
    }

    /// Lowest unused numeric child of `parent` above every index already
    /// claimed there. Nothing is reserved until [`Self::claim`].
    pub(crate) fn fresh_child(&self, parent: &Locus) -> Locus {
        let mut index = self.next_index.get(parent).copied().unwrap_or(0);
        loop {
            index += 1;
            let candidate = parent.child_index(index);
            if !self.has_act_at(&candidate) {
                return candidate;
            }
        }
    }

    /// Mark a numeric child as taken so it is never offered again.
    pub(crate) fn claim(&mut self, locus: &Locus) {
        let (Some(parent), Ok(index)) = (locus.parent(), locus.last_segment().parse::<u32>())
        else {
            return;
        };
        let counter = self.next_index.entry(parent).or_insert(0);
        *counter = (*counter).max(index);
    }

    pub(crate) fn close(&mut self) -> bool {
        let was_open = !self.proponent.is_closed() || !self.opponent.is_closed();
        self.proponent.close();
        self.opponent.close();
        was_open
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.proponent.is_closed() && self.opponent.is_closed()
    }

    pub(crate) fn summary(&self) -> ScopeSummary {
        ScopeSummary {
            label: self.label(),
            target: self.target.clone(),
            move_count: self.move_count,
            actors: self.actors.clone(),
            target_types: self.target_types.iter().cloned().collect(),
            proponent_design: self.proponent.id(),
            opponent_design: self.opponent.id(),
        }
    }

    pub(crate) fn into_designs(self) -> (Design, Design) {
        (self.proponent, self.opponent)
    }
}
