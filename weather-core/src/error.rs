use thiserror::Error;

/// Why a single weather lookup failed. Every variant ends that lookup; nothing is retried.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("weather API key is not set")]
    MissingApiKey,

    #[error("failed to build request: {0}")]
    Request(String),

    #[error("failed to send request: {0}")]
    Network(#[source] reqwest::Error),

    #[error("weather API returned an error: {status}")]
    Provider { status: reqwest::StatusCode },

    #[error("failed to read response: {0}")]
    Read(#[source] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Could not find weather information for city: {city}")]
    NotFound { city: String },
}
