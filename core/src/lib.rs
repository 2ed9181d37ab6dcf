pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod guardrail;
pub mod orchestrator;
pub mod pixel;
pub mod report;
pub mod storage;

pub use config::AppConfig;
pub use error::{InputError, ModelError, RadscribeError, Result};
pub use extraction::{extract_safe_metadata, SafeMetadata};
pub use guardrail::{validate_report, GuardrailVerdict};
pub use orchestrator::{AnalysisOutcome, AnalysisStatus, Analyzer, MAX_FILE_BYTES};
pub use report::{GroqClient, Report, RetryPolicy, VisionModel};
pub use storage::{ReportRecord, ReportStore};
