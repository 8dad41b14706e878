use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("API key is missing or empty")]
    MissingApiKey,
    #[error("API key must not contain whitespace")]
    InvalidApiKey,
    #[error("search URL not found in configuration")]
    MissingSearchUrl,
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Errors raised while talking to arXiv
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("received empty content from {0}")]
    EmptyBody(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("failed to save {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while turning a PDF into text
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF could not be read: {0}")]
    Unreadable(String),
    #[error("PDF has no extractable text layer")]
    NoText,
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the completion endpoint
#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("refusing to summarize empty text")]
    EmptyInput,
    #[error("API rejected the credentials (HTTP {0})")]
    Unauthorized(u16),
    #[error("API rate limit exceeded")]
    RateLimited,
    #[error("API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed API response: {0}")]
    MalformedResponse(String),
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Top-level error for a digest run or a single paper
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("summarization failed: {0}")]
    Summarization(#[from] SummarizationError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DigestError {
    /// Name of the pipeline stage the error came from
    pub fn stage(&self) -> &'static str {
        match self {
            DigestError::Config(_) => "config",
            DigestError::Fetch(_) => "fetch",
            DigestError::Extraction(_) => "extraction",
            DigestError::Summarization(_) => "summarization",
            DigestError::Io { .. } => "persist",
        }
    }
}
