//! Upload pipeline - normalization, background isolation and classification
//! of a batch of garment uploads

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::queue::PendingUpload;
use crate::config::UploadConfig;
use crate::error::{AppError, Result};
use crate::image::{normalize, RawUpload};
use crate::service::{classify_or_default, isolate_or_original, StylingService};
use crate::state::ProcessingGuard;

/// How a batch of uploads is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPolicy {
    /// One file at a time with per-file progress text
    #[default]
    Sequential,
    /// All files concurrently, joined on completion
    FanOut,
}

/// A file that could not be ingested
#[derive(Debug)]
pub struct UploadFailure {
    pub name: String,
    pub error: AppError,
}

/// Outcome of processing a batch, in submission order
#[derive(Debug, Default)]
pub struct UploadReport {
    pub pending: Vec<PendingUpload>,
    pub failures: Vec<UploadFailure>,
}

impl UploadReport {
    /// Summary line for a user-visible notice, if anything failed
    pub fn failure_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let details: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("{} ({})", f.name, f.error))
            .collect();
        Some(format!("Failed to process some items: {}", details.join(", ")))
    }
}

/// Ingestion pipeline for garment uploads
pub struct UploadPipeline {
    service: Arc<dyn StylingService>,
    policy: UploadPolicy,
    isolate_background: bool,
    auto_classify: bool,
}

impl UploadPipeline {
    pub fn new(service: Arc<dyn StylingService>, config: &UploadConfig) -> Self {
        Self {
            service,
            policy: config.policy,
            isolate_background: config.isolate_background,
            auto_classify: config.auto_classify,
        }
    }

    /// Process a batch of uploads.
    ///
    /// Unreadable files are reported in [`UploadReport::failures`] without
    /// stopping the rest of the batch; only a configuration error aborts it.
    pub async fn process(
        &self,
        uploads: Vec<RawUpload>,
        progress: &ProcessingGuard<'_>,
    ) -> Result<UploadReport> {
        let total = uploads.len();
        let mut report = UploadReport::default();

        match self.policy {
            UploadPolicy::Sequential => {
                for (index, upload) in uploads.into_iter().enumerate() {
                    progress.set_message(format!("{} garment {}/{}...", self.verb(), index + 1, total));
                    let name = upload.name().to_string();
                    let outcome = self.process_one(upload).await;
                    Self::record(&mut report, name, outcome)?;
                }
            }
            UploadPolicy::FanOut => {
                let outcomes = join_all(uploads.into_iter().map(|upload| async move {
                    let name = upload.name().to_string();
                    (name, self.process_one(upload).await)
                }))
                .await;

                for (name, outcome) in outcomes {
                    Self::record(&mut report, name, outcome)?;
                }
            }
        }

        info!(
            policy = ?self.policy,
            total = total,
            queued = report.pending.len(),
            failed = report.failures.len(),
            "Upload batch processed"
        );

        Ok(report)
    }

    fn verb(&self) -> &'static str {
        if self.isolate_background {
            "Isolating"
        } else if self.auto_classify {
            "Analyzing"
        } else {
            "Reading"
        }
    }

    fn record(
        report: &mut UploadReport,
        name: String,
        outcome: Result<PendingUpload>,
    ) -> Result<()> {
        match outcome {
            Ok(pending) => report.pending.push(pending),
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                warn!(upload = %name, error = %e, "Upload failed");
                report.failures.push(UploadFailure { name, error: e });
            }
        }
        Ok(())
    }

    async fn process_one(&self, upload: RawUpload) -> Result<PendingUpload> {
        let name = upload.name().to_string();
        let image = normalize(upload).await?;

        let (image, isolated) = if self.isolate_background {
            isolate_or_original(self.service.as_ref(), image).await?
        } else {
            (image, false)
        };

        let suggestion = if self.auto_classify {
            Some(classify_or_default(self.service.as_ref(), &image).await?)
        } else {
            None
        };

        Ok(PendingUpload {
            image,
            source_name: Some(name),
            suggestion,
            isolated,
        })
    }
}
