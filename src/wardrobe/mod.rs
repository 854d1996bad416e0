//! Wardrobe module - categorization queue, garment store, selection mode
//! and the upload pipeline feeding them

pub mod queue;
pub mod selection;
pub mod store;
pub mod upload;

pub use queue::{CategorizationQueue, PendingUpload};
pub use selection::SelectionMode;
pub use store::GarmentStore;
pub use upload::{UploadFailure, UploadPipeline, UploadPolicy, UploadReport};
