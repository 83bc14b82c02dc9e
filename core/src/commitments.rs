//! Commitment stores and their forward-chaining reasoner.
//!
//! Each participant owns one store of facts and rules. Rules are written in
//! their label as `premise & premise -> conclusion`; any literal may be
//! negated with `not`, `¬`, `~` or `!`. Chaining saturates the store,
//! derived facts are reported but never written back.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use dialectic_types::{BasePolarity, CommitmentItem, NonEmptyString};

const NEGATION_WORDS: [&str; 2] = ["not ", "it is not the case that "];
const NEGATION_SIGNS: [char; 3] = ['¬', '~', '!'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitmentError {
    #[error("commitment label must not be empty")]
    EmptyLabel,
}

/// A possibly negated atom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    atom: String,
    negated: bool,
}

impl Literal {
    /// Parse `text`, stripping any stack of negation markers.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut rest = normalize(text);
        let mut negated = false;
        loop {
            let word = NEGATION_WORDS.iter().find(|word| {
                rest.get(..word.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(word))
            });
            if let Some(word) = word {
                rest = rest[word.len()..].trim_start().to_string();
            } else if let Some(sign) = NEGATION_SIGNS.iter().find(|s| rest.starts_with(**s)) {
                rest = rest[sign.len_utf8()..].trim_start().to_string();
            } else {
                break;
            }
            negated = !negated;
        }
        if rest.is_empty() {
            return None;
        }
        Some(Self {
            atom: rest,
            negated,
        })
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            atom: self.atom.clone(),
            negated: !self.negated,
        }
    }

    #[must_use]
    pub fn atom(&self) -> &str {
        &self.atom
    }

    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "not {}", self.atom)
        } else {
            f.write_str(&self.atom)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    premises: Vec<Literal>,
    conclusion: Literal,
}

impl Rule {
    /// Parse `A & B -> C` (`=>` and `,` are accepted too).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let (body, head) = label.split_once("->").or_else(|| label.split_once("=>"))?;
        let conclusion = Literal::parse(head)?;
        if head.contains(['&', ',']) {
            return None;
        }
        let premises = body
            .split(['&', ','])
            .map(Literal::parse)
            .collect::<Option<Vec<_>>>()?;
        if premises.is_empty() {
            return None;
        }
        Some(Self {
            premises,
            conclusion,
        })
    }

    #[must_use]
    pub fn premises(&self) -> &[Literal] {
        &self.premises
    }

    #[must_use]
    pub fn conclusion(&self) -> &Literal {
        &self.conclusion
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredItem {
    label: NonEmptyString,
    polarity: BasePolarity,
    entitled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub added: Vec<String>,
    pub duplicates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contradiction {
    pub a: String,
    pub b: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub derived_facts: Vec<String>,
    pub contradictions: Vec<Contradiction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub malformed_rules: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CommitmentStore {
    items: Vec<StoredItem>,
    index: HashMap<String, usize>,
}

impl CommitmentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(&normalize(label))
    }

    /// Add items; a label already present is reported as a duplicate and
    /// left as it was. Nothing is added if any label is blank.
    pub fn apply<I>(&mut self, items: I) -> Result<ApplyOutcome, CommitmentError>
    where
        I: IntoIterator<Item = CommitmentItem>,
    {
        let staged = items
            .into_iter()
            .map(|item| {
                NonEmptyString::new(normalize(&item.label))
                    .map(|label| StoredItem {
                        label,
                        polarity: item.base_polarity,
                        entitled: item.entitled,
                    })
                    .map_err(|_| CommitmentError::EmptyLabel)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut outcome = ApplyOutcome::default();
        for item in staged {
            let key = item.label.as_str().to_string();
            if self.index.contains_key(&key) {
                outcome.duplicates.push(key);
                continue;
            }
            self.index.insert(key.clone(), self.items.len());
            self.items.push(item);
            outcome.added.push(key);
        }
        Ok(outcome)
    }

    /// Remove items by label. Returns how many were present.
    pub fn erase<'a, I>(&mut self, labels: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let doomed: HashSet<String> = labels.into_iter().map(normalize).collect();
        let before = self.items.len();
        self.items
            .retain(|item| !doomed.contains(item.label.as_str()));
        self.reindex();
        before - self.items.len()
    }

    /// Suspend or restore an item. Returns false when the label is unknown.
    pub fn set_entitlement(&mut self, label: &str, entitled: bool) -> bool {
        match self.index.get(&normalize(label)) {
            Some(&idx) => {
                self.items[idx].entitled = entitled;
                true
            }
            None => false,
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.label.as_str().to_string(), idx))
            .collect();
    }

    /// Saturate the entitled facts under the entitled rules and report what
    /// was derived and which literals clash.
    #[must_use]
    pub fn interact(&self) -> Interaction {
        let mut result = Interaction::default();
        let mut known: Vec<Literal> = Vec::new();
        let mut seen: HashSet<Literal> = HashSet::new();
        let mut rules: Vec<Rule> = Vec::new();

        for item in self.items.iter().filter(|item| item.entitled) {
            match item.polarity {
                BasePolarity::Pos => {
                    if let Some(literal) = Literal::parse(&item.label)
                        && seen.insert(literal.clone())
                    {
                        known.push(literal);
                    }
                }
                BasePolarity::Neg => match Rule::parse(&item.label) {
                    Some(rule) => rules.push(rule),
                    None => {
                        warn!(label = %item.label, "Malformed commitment rule");
                        result.malformed_rules.push(item.label.to_string());
                    }
                },
            }
        }

        let mut fired = vec![false; rules.len()];
        loop {
            let mut changed = false;
            for (idx, rule) in rules.iter().enumerate() {
                if fired[idx] || !rule.premises.iter().all(|p| seen.contains(p)) {
                    continue;
                }
                fired[idx] = true;
                if seen.insert(rule.conclusion.clone()) {
                    debug!(fact = %rule.conclusion, "Derived commitment");
                    known.push(rule.conclusion.clone());
                    result.derived_facts.push(rule.conclusion.to_string());
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        for literal in known.iter().filter(|l| !l.negated) {
            if seen.contains(&literal.negate()) {
                result.contradictions.push(Contradiction {
                    a: literal.to_string(),
                    b: literal.negate().to_string(),
                });
            }
        }
        result
    }
}

/// Stores keyed by participant. Contradictions are only ever looked for
/// inside one store.
#[derive(Debug, Clone, Default)]
pub struct CommitmentStores {
    stores: BTreeMap<String, CommitmentStore>,
}

impl CommitmentStores {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_to<I>(&mut self, owner: &str, items: I) -> Result<ApplyOutcome, CommitmentError>
    where
        I: IntoIterator<Item = CommitmentItem>,
    {
        self.stores.entry(owner.to_string()).or_default().apply(items)
    }

    #[must_use]
    pub fn store(&self, owner: &str) -> Option<&CommitmentStore> {
        self.stores.get(owner)
    }

    pub fn store_mut(&mut self, owner: &str) -> Option<&mut CommitmentStore> {
        self.stores.get_mut(owner)
    }

    /// Chain over one participant's store. Unknown owners have nothing to derive.
    #[must_use]
    pub fn interact(&self, owner: &str) -> Interaction {
        self.stores
            .get(owner)
            .map(CommitmentStore::interact)
            .unwrap_or_default()
    }
}

/// Trim and collapse internal whitespace.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
