//! Studio composer - the garments selected for the current styling session

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Category, GarmentId, GarmentRecord};

/// How garments are combined in the studio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionPolicy {
    /// One garment per category; placing into an occupied slot replaces it
    Slot,
    /// Any number of garments; insertion order is the layering order
    #[default]
    Ordered,
}

/// Current studio composition.
///
/// `items()` is always the layering order handed to generation: index 0 is
/// the base (innermost) layer, later entries are outer layers.
#[derive(Debug, Clone)]
pub struct StudioComposer {
    policy: CompositionPolicy,
    items: Vec<GarmentRecord>,
}

impl StudioComposer {
    pub fn new(policy: CompositionPolicy) -> Self {
        Self {
            policy,
            items: Vec::new(),
        }
    }

    pub fn policy(&self) -> CompositionPolicy {
        self.policy
    }

    /// Add a garment according to the active policy
    pub fn add(&mut self, record: GarmentRecord) {
        match self.policy {
            CompositionPolicy::Slot => self.place(record),
            CompositionPolicy::Ordered => self.append(record),
        }
    }

    /// Put `record` into its category slot, replacing any occupant in place
    pub fn place(&mut self, record: GarmentRecord) {
        self.items.retain(|r| r.id != record.id);
        match self.items.iter().position(|r| r.category == record.category) {
            Some(index) => {
                debug!(
                    category = %record.category,
                    replaced = %self.items[index].id,
                    id = %record.id,
                    "Replaced slot occupant"
                );
                self.items[index] = record;
            }
            None => self.items.push(record),
        }
    }

    fn append(&mut self, record: GarmentRecord) {
        if !self.contains(&record.id) {
            self.items.push(record);
        }
    }

    /// Remove whichever entry holds `id`
    pub fn remove(&mut self, id: &GarmentId) -> Option<GarmentRecord> {
        let index = self.items.iter().position(|r| &r.id == id)?;
        Some(self.items.remove(index))
    }

    /// Remove `record` if present, otherwise add it. Returns whether the
    /// record is in the composition afterwards.
    pub fn toggle(&mut self, record: GarmentRecord) -> bool {
        if self.remove(&record.id).is_some() {
            false
        } else {
            self.add(record);
            true
        }
    }

    /// Replace the whole composition at once
    pub fn set_all(&mut self, records: Vec<GarmentRecord>) {
        self.items.clear();
        for record in records {
            self.add(record);
        }
        debug!(count = self.items.len(), policy = ?self.policy, "Studio composition replaced");
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Garments in layering order
    pub fn items(&self) -> &[GarmentRecord] {
        &self.items
    }

    /// Occupant of a category slot
    pub fn occupant(&self, category: Category) -> Option<&GarmentRecord> {
        self.items.iter().find(|r| r.category == category)
    }

    /// Garments in the fixed slot rendering order
    pub fn slots(&self) -> Vec<&GarmentRecord> {
        let mut slots: Vec<&GarmentRecord> = self.items.iter().collect();
        slots.sort_by_key(|r| r.category.slot_rank());
        slots
    }

    pub fn contains(&self, id: &GarmentId) -> bool {
        self.items.iter().any(|r| &r.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for StudioComposer {
    fn default() -> Self {
        Self::new(CompositionPolicy::default())
    }
}
