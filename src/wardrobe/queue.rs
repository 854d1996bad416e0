//! FIFO queue of uploads waiting for the user's category decision

use std::collections::VecDeque;
use tracing::{debug, info};

use super::store::GarmentStore;
use crate::error::Result;
use crate::image::EncodedImage;
use crate::model::{Category, Classification, GarmentId, GarmentRecord};

/// A normalized image awaiting category assignment
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpload {
    pub image: EncodedImage,
    pub source_name: Option<String>,
    /// Classifier's guess, if classification ran
    pub suggestion: Option<Classification>,
    /// Whether background isolation succeeded for this image
    pub isolated: bool,
}

impl PendingUpload {
    pub fn new(image: EncodedImage) -> Self {
        Self {
            image,
            source_name: None,
            suggestion: None,
            isolated: false,
        }
    }
}

/// Categorization queue
#[derive(Debug, Default)]
pub struct CategorizationQueue {
    pending: VecDeque<PendingUpload>,
}

impl CategorizationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append uploads to the tail, keeping submission order
    pub fn enqueue(&mut self, uploads: Vec<PendingUpload>) {
        let added = uploads.len();
        self.pending.extend(uploads);
        debug!(added = added, pending = self.pending.len(), "Uploads queued for categorization");
    }

    /// The upload whose category decision must be surfaced next
    pub fn head(&self) -> Option<&PendingUpload> {
        self.pending.front()
    }

    /// Assign `category` to the head upload and move it into `store`.
    ///
    /// Returns `Ok(None)` when the queue is empty.
    pub fn confirm(
        &mut self,
        category: Category,
        store: &mut GarmentStore,
    ) -> Result<Option<GarmentId>> {
        let Some(upload) = self.pending.pop_front() else {
            return Ok(None);
        };

        let description = upload.suggestion.as_ref().map(|s| s.description.clone());
        let record = GarmentRecord::captured(&upload.image, category, description);
        let id = record.id.clone();

        if let Err(e) = store.add(record) {
            // Keep the upload so the decision can be retried
            self.pending.push_front(upload);
            return Err(e);
        }

        info!(id = %id, category = %category, remaining = self.pending.len(), "Confirmed garment");
        Ok(Some(id))
    }

    /// Drop the head upload without creating a garment
    pub fn discard(&mut self) -> Option<PendingUpload> {
        let discarded = self.pending.pop_front();
        if discarded.is_some() {
            debug!(remaining = self.pending.len(), "Discarded pending upload");
        }
        discarded
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingUpload> {
        self.pending.iter()
    }
}
