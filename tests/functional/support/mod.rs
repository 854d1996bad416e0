//! Test doubles shared by the functional tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use wardrobe_studio::config::Settings;
use wardrobe_studio::error::{AppError, Result};
use wardrobe_studio::image::{EncodedImage, RawUpload};
use wardrobe_studio::model::{Category, Classification};
use wardrobe_studio::service::{ComposeRequest, StylingService};
use wardrobe_studio::studio::CompositionPolicy;
use wardrobe_studio::wardrobe::UploadPolicy;

pub const RESULT_PAYLOAD: &str = "UkVTVUxU";

/// How the mock answers classification calls
#[derive(Debug, Clone)]
pub enum ClassifyBehavior {
    Answer(Category, &'static str),
    Malformed,
    Unconfigured,
}

/// Scriptable in-memory styling service
pub struct MockService {
    pub classify_calls: AtomicUsize,
    pub isolate_calls: AtomicUsize,
    pub compose_calls: AtomicUsize,
    pub avatar_calls: AtomicUsize,
    classify: Mutex<ClassifyBehavior>,
    failing_isolation: Mutex<HashSet<String>>,
    unconfigured_isolation: Mutex<bool>,
    compose_failure: Mutex<Option<String>>,
    compose_delay: Mutex<Option<Duration>>,
    last_compose: Mutex<Option<ComposeRequest>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            classify_calls: AtomicUsize::new(0),
            isolate_calls: AtomicUsize::new(0),
            compose_calls: AtomicUsize::new(0),
            avatar_calls: AtomicUsize::new(0),
            classify: Mutex::new(ClassifyBehavior::Answer(Category::Top, "White cotton tee")),
            failing_isolation: Mutex::new(HashSet::new()),
            unconfigured_isolation: Mutex::new(false),
            compose_failure: Mutex::new(None),
            compose_delay: Mutex::new(None),
            last_compose: Mutex::new(None),
        }
    }

    pub fn classify_with(&self, behavior: ClassifyBehavior) {
        *self.classify.lock() = behavior;
    }

    /// Make isolation fail for images carrying `payload`
    pub fn fail_isolation_for(&self, payload: &str) {
        self.failing_isolation.lock().insert(payload.to_string());
    }

    pub fn unconfigure_isolation(&self) {
        *self.unconfigured_isolation.lock() = true;
    }

    pub fn fail_compose(&self, message: Option<&str>) {
        *self.compose_failure.lock() = message.map(String::from);
    }

    pub fn delay_compose(&self, delay: Duration) {
        *self.compose_delay.lock() = Some(delay);
    }

    pub fn last_compose(&self) -> Option<ComposeRequest> {
        self.last_compose.lock().clone()
    }

    pub fn compose_count(&self) -> usize {
        self.compose_calls.load(Ordering::SeqCst)
    }
}

/// Payload the mock returns for an isolated version of `payload`
pub fn isolated(payload: &str) -> String {
    format!("{}ISO", payload)
}

#[async_trait]
impl StylingService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify(&self, _image: &EncodedImage) -> Result<Classification> {
        self.classify_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.classify.lock().clone();
        match behavior {
            ClassifyBehavior::Answer(category, description) => Ok(Classification {
                category,
                description: description.to_string(),
            }),
            ClassifyBehavior::Malformed => Err(AppError::ClassificationParse(
                "expected value at line 1 column 1".to_string(),
            )),
            ClassifyBehavior::Unconfigured => {
                Err(AppError::Configuration("no api key".to_string()))
            }
        }
    }

    async fn isolate_subject(&self, image: &EncodedImage) -> Result<EncodedImage> {
        self.isolate_calls.fetch_add(1, Ordering::SeqCst);
        if *self.unconfigured_isolation.lock() {
            return Err(AppError::Configuration("no api key".to_string()));
        }
        if self.failing_isolation.lock().contains(image.payload()) {
            return Err(AppError::BackgroundIsolation("model refused".to_string()));
        }
        Ok(EncodedImage::new(isolated(image.payload()), "image/png"))
    }

    async fn compose(&self, request: ComposeRequest) -> Result<EncodedImage> {
        self.compose_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_compose.lock() = Some(request);

        let delay = *self.compose_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.compose_failure.lock().clone();
        match failure {
            Some(message) => Err(AppError::GenerationService(message)),
            None => Ok(EncodedImage::new(RESULT_PAYLOAD, "image/png")),
        }
    }

    async fn create_avatar(&self, _face: &EncodedImage) -> Result<EncodedImage> {
        self.avatar_calls.fetch_add(1, Ordering::SeqCst);
        Ok(EncodedImage::new("RkFDRQ==", "image/png"))
    }
}

pub fn settings(upload: UploadPolicy, studio: CompositionPolicy) -> Settings {
    let mut settings = Settings::default();
    settings.upload.policy = upload;
    settings.studio.policy = studio;
    settings
}

/// In-memory upload whose encoded payload is `payload`
pub fn upload_with_payload(name: &str, payload: &str) -> RawUpload {
    let bytes = EncodedImage::new(payload, "image/png")
        .decode()
        .expect("test payloads are valid base64");
    RawUpload::from_bytes(name, bytes, Some("image/png".to_string()))
}
