use thiserror::Error;

/// Failures of a single person lookup.
///
/// Geocoding problems never show up here; the location resolver recovers
/// from those itself.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("query rejected by strict validation: {0}")]
    Validation(String),

    #[error("failed to decode API response: {0}")]
    Decode(String),

    #[error("failed to serialize lookup output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LookupError {
    /// Whether the request never left the process.
    pub fn is_local(&self) -> bool {
        matches!(self, LookupError::Validation(_) | LookupError::Serialize(_))
    }
}
