//! Garment store - the session's source of truth for owned garments

use std::collections::HashSet;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::model::{Category, GarmentId, GarmentRecord};

/// Insertion-ordered collection of garments keyed by id
#[derive(Debug, Default)]
pub struct GarmentStore {
    records: Vec<GarmentRecord>,
}

impl GarmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. The id must not already be present.
    pub fn add(&mut self, record: GarmentRecord) -> Result<()> {
        if self.contains(&record.id) {
            return Err(AppError::DuplicateGarment(record.id.to_string()));
        }

        debug!(id = %record.id, category = %record.category, "Added garment");
        self.records.push(record);
        Ok(())
    }

    /// Remove a record by id; absent ids are ignored
    pub fn remove(&mut self, id: &GarmentId) -> Option<GarmentRecord> {
        let index = self.records.iter().position(|r| &r.id == id)?;
        let removed = self.records.remove(index);
        debug!(id = %id, "Removed garment");
        Some(removed)
    }

    pub fn get(&self, id: &GarmentId) -> Option<&GarmentRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &GarmentId) -> bool {
        self.get(id).is_some()
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &GarmentRecord> {
        self.records.iter()
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &GarmentRecord> {
        self.records.iter().filter(move |r| r.category == category)
    }

    /// Records whose ids are in `ids`, in store iteration order
    pub fn resolve(&self, ids: &HashSet<GarmentId>) -> Vec<GarmentRecord> {
        self.records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
