use log::debug;
use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const API_KEY_FILE: &str = "api.txt";
pub const SEARCH_URL_FILE: &str = "url.json";

pub const DEFAULT_API_BASE: &str = "https://api.siliconflow.cn/v1";
pub const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-V3";

/// Layout of `url.json`
#[derive(Debug, Deserialize)]
struct SearchFile {
    #[serde(default)]
    url: String,
}

/// Settings for one digest run. Built once at startup, then only borrowed.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub search_url: Url,
    pub api_base: Url,
    pub model: String,
    /// Only papers submitted within this many days are kept
    pub days: u32,
    pub pages: usize,
    pub page_size: usize,
    pub download_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub output_dir: PathBuf,
    pub request_timeout: Duration,
    pub max_input_chars: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Maximum number of papers in flight at once
    pub concurrency: usize,
}

impl Config {
    /// Build a config from an API key and search URL, with defaults for everything else
    pub fn new(api_key: &str, search_url: &str) -> Result<Self, ConfigError> {
        if search_url.trim().is_empty() {
            return Err(ConfigError::MissingSearchUrl);
        }
        let config = Self {
            api_key: api_key.trim().to_string(),
            search_url: parse_http_url(search_url.trim())?,
            api_base: parse_http_url(DEFAULT_API_BASE)?,
            model: DEFAULT_MODEL.to_string(),
            days: 7,
            pages: 2,
            page_size: 50,
            download_dir: PathBuf::from("data/downloaded_pdfs"),
            processed_dir: PathBuf::from("data/summarized_pdfs"),
            output_dir: PathBuf::from("summary"),
            request_timeout: Duration::from_secs(120),
            max_input_chars: 60_000,
            max_tokens: 1024,
            temperature: 0.3,
            concurrency: 1,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load `api.txt` and `url.json` from a config directory
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let api_key = read_api_key(&config_dir.join(API_KEY_FILE))?;
        let search_url = read_search_url(&config_dir.join(SEARCH_URL_FILE))?;
        debug!("Loaded configuration from {:?}", config_dir);
        Self::new(&api_key, &search_url)
    }

    /// Check every invariant the pipeline relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.api_key.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidApiKey);
        }
        check_http(&self.search_url)?;
        check_http(&self.api_base)?;
        if self.pages == 0 {
            return Err(ConfigError::Zero("pages"));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Zero("page_size"));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Zero("concurrency"));
        }
        if self.max_input_chars == 0 {
            return Err(ConfigError::Zero("max_input_chars"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Zero("request_timeout"));
        }
        Ok(())
    }

    /// Replace the completion endpoint base, e.g. `https://api.openai.com/v1`
    pub fn set_api_base(&mut self, api_base: &str) -> Result<(), ConfigError> {
        self.api_base = parse_http_url(api_base.trim())?;
        Ok(())
    }

    /// Full URL of the chat completion endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.as_str().trim_end_matches('/'))
    }
}

/// Read the API key from the first line of a plain text file
pub fn read_api_key(path: &Path) -> Result<String, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let key = content.lines().next().unwrap_or("").trim();
    if key.is_empty() {
        return Err(ConfigError::MissingApiKey);
    }
    Ok(key.to_string())
}

/// Read the advanced search URL from a JSON file of the form `{"url": "..."}`
pub fn read_search_url(path: &Path) -> Result<String, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: SearchFile = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let url = parsed.url.trim();
    if url.is_empty() {
        return Err(ConfigError::MissingSearchUrl);
    }
    Ok(url.to_string())
}

fn parse_http_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    check_http(&url)?;
    Ok(url)
}

fn check_http(url: &Url) -> Result<(), ConfigError> {
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: "expected an http(s) URL with a host".to_string(),
        });
    }
    Ok(())
}
