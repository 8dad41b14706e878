pub mod arxiv;
pub mod config;
pub mod error;
pub mod pdf;
pub mod pipeline;
pub mod summarizer;

use reqwest::Client;
use std::time::Duration;

pub use arxiv::{ArxivClient, PaperReference};
pub use config::Config;
pub use error::{ConfigError, DigestError, ExtractionError, FetchError, SummarizationError};
pub use pdf::ExtractedText;
pub use pipeline::{Pipeline, RunReport};
pub use summarizer::{Summarizer, Summary};

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the fetcher and the summarizer. Every request is bounded by `timeout`.
pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(30)))
        .user_agent(USER_AGENT)
        .build()
}
