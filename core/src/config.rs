use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default OpenAI-compatible endpoint for the vision model
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default vision model identifier
pub const DEFAULT_MODEL: &str = "llama-3.2-11b-vision-preview";

/// Default per-call timeout on the model request
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default base delay for the exponential retry backoff
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Default SQLite database path for report records
pub const DEFAULT_DB_PATH: &str = "reports.db";

/// Runtime configuration, read once at startup and injected into the
/// analyzer's collaborators. There are no hidden globals; everything that
/// touches the environment goes through `from_env`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API key for the model endpoint (GROQ_API_KEY)
    pub api_key: String,

    /// Base URL of the OpenAI-compatible endpoint (RADSCRIBE_BASE_URL)
    pub base_url: String,

    /// Vision model identifier (RADSCRIBE_MODEL)
    pub model: String,

    /// Per-call timeout on model requests (RADSCRIBE_TIMEOUT_SECS)
    pub request_timeout: Duration,

    /// Base delay for retry backoff (RADSCRIBE_RETRY_BASE_DELAY_MS)
    pub retry_base_delay: Duration,

    /// Path to the report database (RADSCRIBE_DB_PATH)
    pub db_path: PathBuf,
}

impl AppConfig {
    /// Reads configuration from the environment, applying documented
    /// defaults for everything but the API key.
    ///
    /// # Errors
    ///
    /// Returns an error message if GROQ_API_KEY is absent or empty.
    pub fn from_env() -> std::result::Result<Self, String> {
        let api_key = env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| "GROQ_API_KEY is not set".to_string())?;

        Ok(Self {
            api_key,
            base_url: env::var("RADSCRIBE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: env::var("RADSCRIBE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            request_timeout: Duration::from_secs(
                env_u64("RADSCRIBE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            ),
            retry_base_delay: Duration::from_millis(env_u64(
                "RADSCRIBE_RETRY_BASE_DELAY_MS",
                DEFAULT_RETRY_BASE_DELAY_MS,
            )),
            db_path: env::var("RADSCRIBE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH)),
        })
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
