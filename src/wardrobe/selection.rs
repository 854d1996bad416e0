//! Selection mode - transient multi-select over the wardrobe used to bulk
//! promote garments into the studio

use std::collections::HashSet;
use tracing::{debug, info};

use super::store::GarmentStore;
use crate::model::GarmentId;
use crate::studio::StudioComposer;

/// Multi-select state machine (`INACTIVE` / `ACTIVE`)
#[derive(Debug, Default)]
pub struct SelectionMode {
    active: bool,
    selected: HashSet<GarmentId>,
}

impl SelectionMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn selected(&self) -> &HashSet<GarmentId> {
        &self.selected
    }

    pub fn is_selected(&self, id: &GarmentId) -> bool {
        self.selected.contains(id)
    }

    /// Flip the mode; every transition starts from an empty selection
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.selected.clear();
        debug!(active = self.active, "Selection mode toggled");
        self.active
    }

    /// Set-toggle `id` while active. Returns whether the id is now selected.
    pub fn toggle_item(&mut self, id: &GarmentId) -> bool {
        if !self.active {
            return false;
        }

        if !self.selected.remove(id) {
            self.selected.insert(id.clone());
            true
        } else {
            false
        }
    }

    /// Drop an id that no longer exists in the store
    pub fn forget(&mut self, id: &GarmentId) {
        self.selected.remove(id);
    }

    /// Replace the studio composition with the selected garments.
    ///
    /// Garments are pushed in store iteration order, not click order. With
    /// nothing selected (or nothing resolvable) this is a no-op that keeps
    /// the mode active and leaves the composer untouched. Returns the number
    /// of garments committed.
    pub fn commit(&mut self, store: &GarmentStore, composer: &mut StudioComposer) -> usize {
        if !self.active || self.selected.is_empty() {
            return 0;
        }

        let records = store.resolve(&self.selected);
        if records.is_empty() {
            return 0;
        }

        let count = records.len();
        composer.set_all(records);
        self.active = false;
        self.selected.clear();

        info!(count = count, "Committed selection to studio");
        count
    }
}
