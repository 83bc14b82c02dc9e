//! Registry of compiled designs, addressed by id.

use std::collections::BTreeMap;

use dialectic_core::Design;
use dialectic_types::DesignId;

use crate::stepper::StepError;

#[derive(Debug, Default)]
pub struct DesignStore {
    designs: BTreeMap<DesignId, Design>,
}

impl DesignStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a design, returning the one it displaced.
    pub fn insert(&mut self, design: Design) -> Option<Design> {
        self.designs.insert(design.id(), design)
    }

    /// Drop every design and take ownership of `designs` instead.
    pub fn replace_all(&mut self, designs: impl IntoIterator<Item = Design>) {
        self.designs = designs.into_iter().map(|d| (d.id(), d)).collect();
    }

    pub fn get(&self, id: DesignId) -> Result<&Design, StepError> {
        self.designs.get(&id).ok_or(StepError::UnknownDesign(id))
    }

    #[must_use]
    pub fn contains(&self, id: DesignId) -> bool {
        self.designs.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = DesignId> + '_ {
        self.designs.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Design> {
        self.designs.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.designs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }
}
