//! Dung argumentation frameworks: grounded and preferred labellings.
//!
//! Preferred extensions are enumerated by brute force over the powerset of
//! nodes, which is exponential in the node count. The enumerator sits behind
//! [`ExtensionEnumerator`] and refuses frameworks above its node cap, so a
//! labelling-based solver can replace it without touching callers.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Masks are `u64`, so no enumerator can go beyond this.
pub const MASK_LIMIT: usize = 63;

pub const DEFAULT_MAX_PREFERRED_NODES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AfError {
    #[error("attack references unknown argument '{0}'")]
    UnknownNode(String),
    #[error("framework has {nodes} arguments; the preferred enumerator is capped at {limit}")]
    TooLarge { nodes: usize, limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    In,
    Out,
    Undec,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::In => "IN",
            Self::Out => "OUT",
            Self::Undec => "UNDEC",
        })
    }
}

pub type Labelling = BTreeMap<String, Label>;

/// Wire shape of a solve request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfRequest {
    pub nodes: Vec<String>,
    #[serde(default)]
    pub attacks: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct ArgumentationFramework {
    nodes: Vec<String>,
    /// attackers[b] = nodes attacking b, deduplicated.
    attackers: Vec<Vec<usize>>,
    attack_count: usize,
}

impl ArgumentationFramework {
    /// Build from node names and `(attacker, target)` pairs. Repeated nodes
    /// and attacks collapse; an attack on an unknown node is an error.
    pub fn new<N, A>(nodes: N, attacks: A) -> Result<Self, AfError>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        A: IntoIterator<Item = (String, String)>,
    {
        let mut names = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for node in nodes {
            let node = node.into();
            if !index.contains_key(&node) {
                index.insert(node.clone(), names.len());
                names.push(node);
            }
        }

        let mut edges = BTreeSet::new();
        for (from, to) in attacks {
            let attacker = *index.get(&from).ok_or(AfError::UnknownNode(from))?;
            let target = *index.get(&to).ok_or(AfError::UnknownNode(to))?;
            edges.insert((attacker, target));
        }

        let mut attackers = vec![Vec::new(); names.len()];
        for &(attacker, target) in &edges {
            attackers[target].push(attacker);
        }
        Ok(Self {
            nodes: names,
            attackers,
            attack_count: edges.len(),
        })
    }

    pub fn from_request(request: &AfRequest) -> Result<Self, AfError> {
        Self::new(request.nodes.iter().cloned(), request.attacks.iter().cloned())
    }

    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    #[must_use]
    pub fn attack_count(&self) -> usize {
        self.attack_count
    }

    #[must_use]
    pub fn attackers_of(&self, node: usize) -> &[usize] {
        &self.attackers[node]
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n == name)
    }

    /// Least fixpoint: IN when every attacker is OUT, OUT when some attacker is IN.
    #[must_use]
    pub fn grounded(&self) -> Vec<Label> {
        let mut labels = vec![Label::Undec; self.nodes.len()];
        let mut rounds = 0;
        loop {
            rounds += 1;
            let mut changed = false;
            for node in 0..self.nodes.len() {
                if labels[node] != Label::Undec {
                    continue;
                }
                let attackers = &self.attackers[node];
                if attackers.iter().all(|&a| labels[a] == Label::Out) {
                    labels[node] = Label::In;
                    changed = true;
                } else if attackers.iter().any(|&a| labels[a] == Label::In) {
                    labels[node] = Label::Out;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        debug!(nodes = self.nodes.len(), rounds, "Grounded labelling converged");
        labels
    }

    #[must_use]
    pub fn grounded_labels(&self) -> Labelling {
        self.named(&self.grounded())
    }

    #[must_use]
    pub fn grounded_extension(&self) -> BTreeSet<String> {
        self.grounded()
            .iter()
            .zip(&self.nodes)
            .filter(|(label, _)| **label == Label::In)
            .map(|(_, name)| name.clone())
            .collect()
    }

    #[must_use]
    pub fn is_conflict_free(&self, set: &BTreeSet<String>) -> bool {
        self.members(set)
            .is_some_and(|members| members.iter().all(|&b| {
                self.attackers[b].iter().all(|a| !members.contains(a))
            }))
    }

    /// Conflict-free, and every member is defended by some member.
    #[must_use]
    pub fn is_admissible(&self, set: &BTreeSet<String>) -> bool {
        let Some(members) = self.members(set) else {
            return false;
        };
        self.is_conflict_free(set)
            && members.iter().all(|&b| {
                self.attackers[b].iter().all(|&a| {
                    self.attackers[a].iter().any(|c| members.contains(c))
                })
            })
    }

    pub fn preferred_extensions(
        &self,
        enumerator: &dyn ExtensionEnumerator,
    ) -> Result<Vec<BTreeSet<String>>, AfError> {
        let extensions = enumerator.preferred(self)?;
        Ok(extensions
            .into_iter()
            .map(|members| members.into_iter().map(|i| self.nodes[i].clone()).collect())
            .collect())
    }

    /// IN when in every preferred extension, OUT when in none, else UNDEC.
    pub fn preferred_labels(
        &self,
        enumerator: &dyn ExtensionEnumerator,
    ) -> Result<Labelling, AfError> {
        let extensions = enumerator.preferred(self)?;
        let labels = (0..self.nodes.len())
            .map(|node| {
                let hits = extensions.iter().filter(|ext| ext.contains(&node)).count();
                if hits == extensions.len() {
                    Label::In
                } else if hits == 0 {
                    Label::Out
                } else {
                    Label::Undec
                }
            })
            .collect::<Vec<_>>();
        Ok(self.named(&labels))
    }

    fn named(&self, labels: &[Label]) -> Labelling {
        self.nodes.iter().cloned().zip(labels.iter().copied()).collect()
    }

    fn members(&self, set: &BTreeSet<String>) -> Option<Vec<usize>> {
        set.iter().map(|name| self.position(name)).collect()
    }
}

/// Enumerates preferred extensions as sorted node positions.
pub trait ExtensionEnumerator {
    fn preferred(&self, af: &ArgumentationFramework) -> Result<Vec<BTreeSet<usize>>, AfError>;
}

/// Powerset reference enumerator.
#[derive(Debug, Clone, Copy)]
pub struct PowersetEnumerator {
    max_nodes: usize,
}

impl PowersetEnumerator {
    #[must_use]
    pub fn new(max_nodes: usize) -> Self {
        Self {
            max_nodes: max_nodes.min(MASK_LIMIT),
        }
    }

    #[must_use]
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }
}

impl Default for PowersetEnumerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PREFERRED_NODES)
    }
}

impl ExtensionEnumerator for PowersetEnumerator {
    fn preferred(&self, af: &ArgumentationFramework) -> Result<Vec<BTreeSet<usize>>, AfError> {
        let n = af.nodes.len();
        if n > self.max_nodes {
            return Err(AfError::TooLarge {
                nodes: n,
                limit: self.max_nodes,
            });
        }
        let attackers: Vec<u64> = af
            .attackers
            .iter()
            .map(|list| list.iter().fold(0u64, |mask, &a| mask | (1 << a)))
            .collect();

        let admissible = |set: u64| -> bool {
            (0..n).filter(|b| set & (1 << b) != 0).all(|b| {
                attackers[b] & set == 0
                    && af.attackers[b]
                        .iter()
                        .all(|&a| attackers[a] & set != 0)
            })
        };

        let mut found: Vec<u64> = (0..(1u64 << n)).filter(|&set| admissible(set)).collect();
        found.sort_by_key(|set| Reverse(set.count_ones()));
        let mut maximal: Vec<u64> = Vec::new();
        for set in found {
            if maximal.iter().all(|&kept| kept & set != set) {
                maximal.push(set);
            }
        }
        maximal.sort_unstable();
        debug!(nodes = n, extensions = maximal.len(), "Preferred extensions enumerated");

        Ok(maximal
            .into_iter()
            .map(|set| (0..n).filter(|b| set & (1 << b) != 0).collect())
            .collect())
    }
}
