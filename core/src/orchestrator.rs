//! End-to-end analysis orchestration. Each request moves strictly forward:
//! received, extracted, generated, validated, then a terminal status. Every
//! terminal the state machine reaches performs exactly one persistence write
//! and one log line; input precondition violations surface before the state
//! machine starts and are never persisted.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use dicom_object::{FileDicomObject, InMemDicomObject};
use log::{error, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{InputError, ModelError, RadscribeError, Result};
use crate::extraction::{extract_safe_metadata, SafeMetadata};
use crate::guardrail::{validate_report, GuardrailVerdict};
use crate::pixel::{render_preview, NormalizedImage};
use crate::report::{generate_report, GeneratedReport, Report, RetryPolicy, VisionModel};
use crate::storage::ReportStore;

/// Upload size ceiling enforced before any processing
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Terminal status of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Completed,
    NeedsHumanReview,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::NeedsHumanReview => "needs_human_review",
            AnalysisStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result returned to the caller once a request reaches a terminal status
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub record_id: i64,
    pub status: AnalysisStatus,
    pub metadata: SafeMetadata,
    pub report: Report,
    /// Base64 JPEG preview of the analyzed frame
    pub image_base64: String,
    /// Present only for `needs_human_review`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub latency_ms: u64,
    pub model_version: String,
}

/// Parses a DICOM byte stream, accepting both the standard 128-byte
/// preamble layout and a bare stream starting at the DICM marker.
pub fn read_dataset(bytes: &[u8]) -> std::result::Result<FileDicomObject<InMemDicomObject>, InputError> {
    let offset = if bytes.len() >= 132 && &bytes[128..132] == b"DICM" {
        128
    } else if bytes.len() >= 4 && &bytes[..4] == b"DICM" {
        0
    } else {
        return Err(InputError::UnreadableDataset(
            "missing DICM marker".to_string(),
        ));
    };
    dicom_object::from_reader(std::io::Cursor::new(&bytes[offset..])).map_err(Into::into)
}

fn extract_stage(dcm: &InMemDicomObject) -> Result<(SafeMetadata, NormalizedImage)> {
    let metadata = extract_safe_metadata(dcm);
    let image = render_preview(dcm)?;
    Ok((metadata, image))
}

/// Composes the analysis pipeline over injected collaborators.
///
/// Construct once at startup and share; there is no hidden global state,
/// and requests are independent of each other.
pub struct Analyzer {
    model: Arc<dyn VisionModel>,
    store: Arc<ReportStore>,
    retry: RetryPolicy,
}

impl Analyzer {
    pub fn new(model: Arc<dyn VisionModel>, store: Arc<ReportStore>) -> Self {
        Self {
            model,
            store,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Analyzes a submitted DICOM byte buffer.
    ///
    /// Preconditions (size ceiling, parsable dataset, pixel data present)
    /// fail fast with a classified `InputError` before any processing and
    /// without a persistence write.
    pub async fn analyze(&self, bytes: Vec<u8>) -> Result<AnalysisOutcome> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        info!(
            "[{}] analysis request received ({} bytes)",
            request_id,
            bytes.len()
        );

        if bytes.len() > MAX_FILE_BYTES {
            let err = InputError::FileTooLarge {
                actual: bytes.len(),
                limit: MAX_FILE_BYTES,
            };
            warn!(
                "[{}] rejected after {} ms: {}",
                request_id,
                started.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }

        self.run(request_id, started, move || {
            let obj = read_dataset(&bytes)?;
            extract_stage(&obj)
        })
        .await
    }

    /// Analyzes an already-parsed dataset. Same pipeline as `analyze`,
    /// minus the byte-level preconditions.
    pub async fn analyze_dataset(&self, dcm: InMemDicomObject) -> Result<AnalysisOutcome> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        info!("[{}] analysis request received (parsed dataset)", request_id);
        self.run(request_id, started, move || extract_stage(&dcm)).await
    }

    async fn run<F>(&self, request_id: Uuid, started: Instant, extract: F) -> Result<AnalysisOutcome>
    where
        F: FnOnce() -> Result<(SafeMetadata, NormalizedImage)> + Send + 'static,
    {
        // Extraction and normalization are CPU-bound; keep them off the
        // request task.
        let extracted = tokio::task::spawn_blocking(extract)
            .await
            .map_err(|e| RadscribeError::Internal(e.to_string()))?;

        let (metadata, image) = match extracted {
            Ok(pair) => pair,
            Err(e) => {
                warn!(
                    "[{}] extraction failed after {} ms: {}",
                    request_id,
                    started.elapsed().as_millis(),
                    e
                );
                return Err(e);
            }
        };
        info!(
            "[{}] extracted {} attributes and a {}x{} preview",
            request_id,
            metadata.len(),
            image.width,
            image.height
        );

        let generated = match generate_report(
            self.model.as_ref(),
            &metadata,
            &image.base64,
            None,
            &self.retry,
        )
        .await
        {
            Ok(g) => g,
            Err(e) => return self.fail(request_id, started, &metadata, e),
        };

        let (status, generated, warning) = match validate_report(&generated.report) {
            GuardrailVerdict::Accepted => (AnalysisStatus::Completed, generated, None),
            GuardrailVerdict::Rejected { reason } => {
                warn!(
                    "[{}] guardrail rejected report ({}), regenerating once",
                    request_id, reason
                );
                let retried = match generate_report(
                    self.model.as_ref(),
                    &metadata,
                    &image.base64,
                    Some(&reason),
                    &self.retry,
                )
                .await
                {
                    Ok(g) => g,
                    Err(e) => return self.fail(request_id, started, &metadata, e),
                };
                match validate_report(&retried.report) {
                    GuardrailVerdict::Accepted => (AnalysisStatus::Completed, retried, None),
                    GuardrailVerdict::Rejected { reason } => (
                        AnalysisStatus::NeedsHumanReview,
                        retried,
                        Some(format!("Guardrail validation failed after retry: {}", reason)),
                    ),
                }
            }
        };

        let GeneratedReport {
            report,
            latency_ms,
            model_version,
        } = generated;

        let record_id = self
            .store
            .save(status, &metadata, Some(&report), latency_ms, &model_version)?;
        info!(
            "[{}] terminal status {} after {} ms (record {})",
            request_id,
            status,
            started.elapsed().as_millis(),
            record_id
        );

        Ok(AnalysisOutcome {
            record_id,
            status,
            metadata,
            report,
            image_base64: image.base64,
            warning,
            latency_ms,
            model_version,
        })
    }

    /// Terminal `failed`: one persistence write, one log line, then the
    /// error propagates to the caller.
    fn fail(
        &self,
        request_id: Uuid,
        started: Instant,
        metadata: &SafeMetadata,
        err: ModelError,
    ) -> Result<AnalysisOutcome> {
        let elapsed = started.elapsed().as_millis() as u64;
        if let Err(store_err) = self
            .store
            .save(AnalysisStatus::Failed, metadata, None, elapsed, "")
        {
            error!(
                "[{}] failed-record write also failed: {}",
                request_id, store_err
            );
        }
        error!("[{}] analysis failed after {} ms: {}", request_id, elapsed, err);
        Err(err.into())
    }
}
