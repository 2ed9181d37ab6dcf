use thiserror::Error;

/// Result type for radscribe operations
pub type Result<T> = std::result::Result<T, RadscribeError>;

/// Top-level error type for the analysis pipeline
#[derive(Error, Debug)]
pub enum RadscribeError {
    /// Problem with the submitted file; processing was not attempted
    #[error("{0}")]
    Input(#[from] InputError),

    /// Model call failed after the retry budget, or fatally on first contact
    #[error("model request failed: {0}")]
    Model(#[from] ModelError),

    /// Preview image could not be encoded
    #[error("image encoding failed: {0}")]
    Encoding(#[from] image::ImageError),

    /// Report store failure
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Background task failure
    #[error("internal error: {0}")]
    Internal(String),
}

/// Client-facing input errors, surfaced before any processing begins
#[derive(Error, Debug)]
pub enum InputError {
    /// File exceeds the upload size ceiling
    #[error("file is {actual} bytes, exceeding the {limit} byte limit")]
    FileTooLarge { actual: usize, limit: usize },

    /// Byte stream could not be parsed as a DICOM dataset
    #[error("failed to parse DICOM dataset: {0}")]
    UnreadableDataset(String),

    /// Dataset carries no pixel data element
    #[error("dataset contains no pixel data")]
    MissingPixelData,

    /// Pixel data is present but in a layout this pipeline does not decode
    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),
}

/// Model endpoint failures, split by retry eligibility
#[derive(Error, Debug)]
pub enum ModelError {
    /// Endpoint returned 429
    #[error("rate limited by model endpoint")]
    RateLimited,

    /// Endpoint returned a 5xx status
    #[error("model endpoint returned server error {status}")]
    Server { status: u16 },

    /// The per-call deadline elapsed
    #[error("model request timed out")]
    Timeout,

    /// Response arrived but its content could not be parsed into a report
    #[error("malformed model response: {0}")]
    Malformed(String),

    /// Anything else: connection refused, 4xx other than 429, bad payload
    #[error("model request failed: {0}")]
    Other(String),
}

impl ModelError {
    /// Whether this failure is eligible for retry with backoff.
    ///
    /// Rate limiting, server-side errors, and timeouts are transient;
    /// everything else propagates immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ModelError::RateLimited | ModelError::Server { .. } | ModelError::Timeout
        )
    }

    /// Classifies a transport-level failure from the HTTP client.
    ///
    /// Timeouts are recognized both from the typed signal and from the word
    /// "timeout" anywhere in the error description (case-insensitive).
    pub fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ModelError::Timeout;
        }
        let description = e.to_string();
        if description.to_lowercase().contains("timeout") {
            ModelError::Timeout
        } else {
            ModelError::Other(description)
        }
    }
}

// Convert dicom-object read errors into input errors
impl From<dicom_object::ReadError> for InputError {
    fn from(e: dicom_object::ReadError) -> Self {
        InputError::UnreadableDataset(format!("{}", e))
    }
}
