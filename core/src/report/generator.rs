use std::time::{Duration, Instant};

use log::warn;

use super::model::VisionModel;
use super::prompt::build_prompt;
use super::Report;
use crate::error::ModelError;
use crate::extraction::SafeMetadata;

/// Retry policy for transient model failures: a fixed attempt budget with
/// the backoff delay doubling each attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based)
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// A generated report plus its provenance
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub report: Report,
    /// Latency of the final (successful) attempt only, not the sum of
    /// retried attempts
    pub latency_ms: u64,
    pub model_version: String,
}

/// Calls the vision model with the de-identified metadata and preview image,
/// retrying transient failures with exponential backoff.
///
/// `reinforcement` is set only on the guardrail-driven regeneration pass and
/// embeds the rejection reason into the prompt.
///
/// # Errors
///
/// Transient failures (rate limit, 5xx, timeout) are retried up to the
/// policy's attempt budget and surfaced only on exhaustion; any other
/// failure propagates immediately.
pub async fn generate_report<M: VisionModel + ?Sized>(
    model: &M,
    metadata: &SafeMetadata,
    image_base64: &str,
    reinforcement: Option<&str>,
    policy: &RetryPolicy,
) -> Result<GeneratedReport, ModelError> {
    let prompt = build_prompt(metadata, reinforcement);

    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let start = Instant::now();
        match model.complete(&prompt, image_base64).await {
            Ok(response) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                let report = parse_report(&response.content)?;
                return Ok(GeneratedReport {
                    report,
                    latency_ms,
                    model_version: response.model,
                });
            }
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_after_attempt(attempt);
                warn!(
                    "model call attempt {}/{} failed ({}), retrying in {:?}",
                    attempt, policy.max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Parses model content into a report, tolerating a ```json fence around
/// the object.
pub fn parse_report(content: &str) -> Result<Report, ModelError> {
    serde_json::from_str(extract_json_block(content))
        .map_err(|e| ModelError::Malformed(e.to_string()))
}

/// Locates the JSON object inside the model content: a fenced block if one
/// exists, otherwise the outermost brace span, otherwise the trimmed text.
fn extract_json_block(content: &str) -> &str {
    if let Some(start) = content.find("```json") {
        let rest = &content[start + 7..];
        if let Some(end) = rest.find("```") {
            return rest[..end].trim();
        }
    }
    match (content.find('{'), content.rfind('}')) {
        (Some(open), Some(close)) if close > open => &content[open..=close],
        _ => content.trim(),
    }
}
