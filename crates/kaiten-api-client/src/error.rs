//! Error types for the Kaiten API client.
//!
//! `ApiError` covers everything that can go wrong while executing a request.
//! `ConfigError` covers building the client from settings or the environment.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Upstream answered with a non-success status other than 429.
    #[error("HTTP error {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Upstream kept answering 429 after the retry ceiling was reached.
    #[error("Rate limit exceeded after {attempts} attempts: {body}")]
    RateLimitExceeded { attempts: u32, body: String },

    /// The request never produced a response (connect, DNS, timeout, ...).
    #[error("Network error: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse response as JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("API client is closed")]
    Closed,
}

impl ApiError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            ApiError::RateLimitExceeded { .. } => Some(StatusCode::TOO_MANY_REQUESTS.as_u16()),
            ApiError::Network { source } => source.status().map(|s| s.as_u16()),
            ApiError::InvalidJson { .. } | ApiError::Closed => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(source: reqwest::Error) -> Self {
        ApiError::Network { source }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("Token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
