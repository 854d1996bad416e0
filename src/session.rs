//! Session store - owns every piece of wardrobe and studio state for one
//! running session, exposes typed mutations and publishes change events

use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::image::{normalize, EncodedImage, ImageWriter, RawUpload};
use crate::model::{CatalogItem, Category, GarmentId, GarmentRecord, UserProfile};
use crate::state::{ProcessingState, ProcessingTracker};
use crate::studio::{GenerationMode, GenerationOrchestrator, GenerationOutput, StudioComposer};
use crate::service::StylingService;
use crate::wardrobe::{CategorizationQueue, GarmentStore, PendingUpload, SelectionMode, UploadPipeline};

const EVENT_CAPACITY: usize = 64;

const WARDROBE_STATUS: &str = "Analyzing and categorizing items...";
const PROFILE_STATUS: &str = "Generating your 3D avatar face...";
const STUDIO_UPLOAD_DESCRIPTION: &str = "Uploaded for styling";

/// Change notifications for observers of the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    UploadsQueued { count: usize },
    UploadDiscarded,
    GarmentAdded(GarmentId),
    GarmentRemoved(GarmentId),
    StudioChanged { count: usize },
    SelectionChanged { active: bool, selected: usize },
    ProfileUpdated,
    Generated,
    Notice(String),
}

/// All state of one styling session
pub struct Session {
    settings: Settings,
    service: Arc<dyn StylingService>,
    processing: Arc<ProcessingTracker>,
    pipeline: UploadPipeline,
    orchestrator: GenerationOrchestrator,
    queue: Mutex<CategorizationQueue>,
    store: RwLock<GarmentStore>,
    composer: RwLock<StudioComposer>,
    selection: Mutex<SelectionMode>,
    profile: RwLock<UserProfile>,
    notice: Mutex<Option<String>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(settings: Settings, service: Arc<dyn StylingService>) -> Self {
        let processing = Arc::new(ProcessingTracker::new());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            pipeline: UploadPipeline::new(service.clone(), &settings.upload),
            orchestrator: GenerationOrchestrator::new(service.clone(), processing.clone()),
            composer: RwLock::new(StudioComposer::new(settings.studio.policy)),
            queue: Mutex::new(CategorizationQueue::new()),
            store: RwLock::new(GarmentStore::new()),
            selection: Mutex::new(SelectionMode::new()),
            profile: RwLock::new(UserProfile::default()),
            notice: Mutex::new(None),
            settings,
            service,
            processing,
            events,
        }
    }

    /// Subscribe to change events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Observe the global processing state
    pub fn watch_processing(&self) -> watch::Receiver<ProcessingState> {
        self.processing.subscribe()
    }

    pub fn processing_state(&self) -> ProcessingState {
        self.processing.current()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Record `err` as the current notice and hand it back for propagation
    fn surface(&self, err: AppError) -> AppError {
        let message = err.user_message();
        *self.notice.lock() = Some(message.clone());
        self.emit(SessionEvent::Notice(message));
        err
    }

    fn studio_changed(&self) {
        let count = self.composer.read().len();
        self.emit(SessionEvent::StudioChanged { count });
    }

    fn selection_changed(&self) {
        let (active, selected) = {
            let selection = self.selection.lock();
            (selection.is_active(), selection.selected().len())
        };
        self.emit(SessionEvent::SelectionChanged { active, selected });
    }

    // --- Notices ---

    /// Current user-visible notice
    pub fn notice(&self) -> Option<String> {
        self.notice.lock().clone()
    }

    pub fn dismiss_notice(&self) {
        *self.notice.lock() = None;
        self.orchestrator.dismiss_error();
    }

    // --- Wardrobe uploads ---

    /// Ingest garment photos into the categorization queue.
    ///
    /// Returns the number of uploads queued. Files that fail to read are
    /// reported through the notice; the rest still reach the queue.
    pub async fn upload_garments(&self, uploads: Vec<RawUpload>) -> Result<usize> {
        if uploads.is_empty() {
            return Ok(0);
        }

        let report = {
            let guard = self.processing.begin(WARDROBE_STATUS).map_err(|e| self.surface(e))?;
            self.pipeline.process(uploads, &guard).await
        };
        let report = report.map_err(|e| self.surface(e))?;

        if let Some(summary) = report.failure_summary() {
            *self.notice.lock() = Some(summary.clone());
            self.emit(SessionEvent::Notice(summary));
        }

        let count = report.pending.len();
        if count > 0 {
            self.queue.lock().enqueue(report.pending);
            self.emit(SessionEvent::UploadsQueued { count });
        }
        Ok(count)
    }

    /// Upload waiting for a category decision, if any
    pub fn pending_decision(&self) -> Option<PendingUpload> {
        self.queue.lock().head().cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.lock().len()
    }

    /// Assign a category to the pending head upload
    pub fn confirm_pending(&self, category: Category) -> Result<Option<GarmentId>> {
        let confirmed = {
            let mut queue = self.queue.lock();
            let mut store = self.store.write();
            queue.confirm(category, &mut store)
        };
        let confirmed = confirmed.map_err(|e| self.surface(e))?;

        if let Some(id) = &confirmed {
            self.emit(SessionEvent::GarmentAdded(id.clone()));
        }
        Ok(confirmed)
    }

    /// Accept the classifier's suggestion for the pending head upload
    pub fn accept_suggestion(&self) -> Result<Option<GarmentId>> {
        let category = match self.queue.lock().head() {
            Some(head) => head
                .suggestion
                .as_ref()
                .map(|s| s.category)
                .unwrap_or(Category::Accessory),
            None => return Ok(None),
        };
        self.confirm_pending(category)
    }

    /// Drop the pending head upload
    pub fn discard_pending(&self) -> bool {
        let discarded = self.queue.lock().discard().is_some();
        if discarded {
            self.emit(SessionEvent::UploadDiscarded);
        }
        discarded
    }

    // --- Garment store ---

    pub fn add_garment(&self, record: GarmentRecord) -> Result<GarmentId> {
        let id = record.id.clone();
        self.store.write().add(record).map_err(|e| self.surface(e))?;
        self.emit(SessionEvent::GarmentAdded(id.clone()));
        Ok(id)
    }

    /// Import a catalog item as an owned garment
    pub fn import_from_catalog(&self, item: &CatalogItem) -> Result<GarmentId> {
        let record = item.import();
        info!(catalog_id = %item.id, id = %record.id, "Importing catalog item");
        self.add_garment(record)
    }

    /// Remove a garment from the wardrobe; the studio keeps its own copy
    pub fn remove_garment(&self, id: &GarmentId) -> Option<GarmentRecord> {
        let removed = self.store.write().remove(id)?;
        self.selection.lock().forget(id);
        self.emit(SessionEvent::GarmentRemoved(id.clone()));
        Some(removed)
    }

    pub fn garment(&self, id: &GarmentId) -> Option<GarmentRecord> {
        self.store.read().get(id).cloned()
    }

    /// Wardrobe contents in store order
    pub fn garments(&self) -> Vec<GarmentRecord> {
        self.store.read().iter().cloned().collect()
    }

    // --- Studio ---

    /// Studio contents in layering order
    pub fn studio_items(&self) -> Vec<GarmentRecord> {
        self.composer.read().items().to_vec()
    }

    /// Add a wardrobe garment to the studio. Returns false for unknown ids.
    pub fn add_to_studio(&self, id: &GarmentId) -> bool {
        let Some(record) = self.garment(id) else {
            return false;
        };
        self.composer.write().add(record);
        self.studio_changed();
        true
    }

    /// Quick-pick toggle of a wardrobe garment. Returns whether the garment
    /// is in the studio afterwards, or `None` for unknown ids.
    pub fn toggle_in_studio(&self, id: &GarmentId) -> Option<bool> {
        let record = self.garment(id)?;
        let present = self.composer.write().toggle(record);
        self.studio_changed();
        Some(present)
    }

    pub fn remove_from_studio(&self, id: &GarmentId) -> bool {
        let removed = self.composer.write().remove(id).is_some();
        if removed {
            self.studio_changed();
        }
        removed
    }

    pub fn clear_studio(&self) {
        self.composer.write().clear();
        self.studio_changed();
    }

    /// Add photos straight to the studio without categorizing them
    pub async fn upload_to_studio(&self, uploads: Vec<RawUpload>) -> Result<usize> {
        let outcomes = join_all(uploads.into_iter().map(|upload| async move {
            let name = upload.name().to_string();
            (name, normalize(upload).await)
        }))
        .await;

        let mut records = Vec::new();
        let mut failed = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(image) => records.push(GarmentRecord::captured(
                    &image,
                    Category::Top,
                    Some(STUDIO_UPLOAD_DESCRIPTION.to_string()),
                )),
                Err(e) => {
                    warn!(upload = %name, error = %e, "Studio upload failed");
                    failed.push(format!("{} ({})", name, e));
                }
            }
        }

        let count = records.len();
        {
            let mut composer = self.composer.write();
            for record in records {
                composer.add(record);
            }
        }
        if count > 0 {
            self.studio_changed();
        }

        if !failed.is_empty() {
            let message = format!("Failed to process some items: {}", failed.join(", "));
            *self.notice.lock() = Some(message.clone());
            self.emit(SessionEvent::Notice(message));
        }
        Ok(count)
    }

    // --- Selection mode ---

    pub fn toggle_selection_mode(&self) -> bool {
        let active = self.selection.lock().toggle();
        self.selection_changed();
        active
    }

    pub fn toggle_selected(&self, id: &GarmentId) -> bool {
        let selected = self.selection.lock().toggle_item(id);
        self.selection_changed();
        selected
    }

    pub fn selection_active(&self) -> bool {
        self.selection.lock().is_active()
    }

    /// Push the selected garments into the studio
    pub fn commit_selection(&self) -> usize {
        let committed = {
            let mut selection = self.selection.lock();
            let store = self.store.read();
            let mut composer = self.composer.write();
            selection.commit(&store, &mut composer)
        };

        if committed > 0 {
            self.selection_changed();
            self.studio_changed();
        }
        committed
    }

    // --- Profile ---

    pub fn profile(&self) -> UserProfile {
        self.profile.read().clone()
    }

    /// Turn a selfie into the stylized face used for avatar generations
    pub async fn create_profile_avatar(&self, selfie: RawUpload) -> Result<EncodedImage> {
        let result = {
            let _guard = self.processing.begin(PROFILE_STATUS).map_err(|e| self.surface(e))?;
            match normalize(selfie).await {
                Ok(face) => self.service.create_avatar(&face).await,
                Err(e) => Err(e),
            }
        };

        let avatar = result.map_err(|e| self.surface(e))?;
        self.profile.write().avatar_image = Some(avatar.clone());
        info!("Profile avatar updated");
        self.emit(SessionEvent::ProfileUpdated);
        Ok(avatar)
    }

    // --- Generation ---

    /// Generate a styled image from the current studio composition
    pub async fn generate(&self, mode: GenerationMode) -> Result<EncodedImage> {
        let items = self.studio_items();
        let reference = if mode.uses_identity_reference() {
            self.profile.read().avatar_image.clone()
        } else {
            None
        };

        debug!(mode = %mode, items = items.len(), "Generate requested");

        let image = self
            .orchestrator
            .generate(&items, mode, reference)
            .await
            .map_err(|e| self.surface(e))?;

        *self.notice.lock() = None;
        self.emit(SessionEvent::Generated);
        Ok(image)
    }

    pub fn generation_output(&self) -> GenerationOutput {
        self.orchestrator.output()
    }

    pub fn generated_image(&self) -> Option<EncodedImage> {
        self.orchestrator.last_image()
    }

    /// Write the last generated image to the output directory
    pub async fn save_generated(&self) -> Result<Option<PathBuf>> {
        let Some(image) = self.generated_image() else {
            return Ok(None);
        };
        let writer = ImageWriter::new(&self.settings.output.dir);
        let path = writer.save(&image).await.map_err(|e| self.surface(e))?;
        Ok(Some(path))
    }
}
