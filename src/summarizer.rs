use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::arxiv::PaperReference;
use crate::config::Config;
use crate::error::SummarizationError;
use crate::pdf::ExtractedText;

const SYSTEM_PROMPT: &str = "You are a research assistant who writes concise, faithful summaries \
of academic papers. Base every statement strictly on the text you are given.";

// Error bodies are echoed into logs, keep them short
const MAX_ERROR_BODY: usize = 500;

/// Chat completion request format
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// Chat completion response format
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Summary generated for one paper
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub paper_id: String,
    pub text: String,
}

/// Client for an OpenAI-compatible chat completion endpoint
#[derive(Clone)]
pub struct Summarizer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_input_chars: usize,
}

impl fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Summarizer")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Summarizer {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            endpoint: config.completions_url(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_input_chars: config.max_input_chars,
        }
    }

    /// Summarize the text of one paper with a single completion request
    pub async fn summarize(
        &self,
        paper: &PaperReference,
        text: &ExtractedText,
    ) -> Result<Summary, SummarizationError> {
        if text.is_empty() {
            return Err(SummarizationError::EmptyInput);
        }

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: build_prompt(paper, text, self.max_input_chars),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        info!("Requesting summary for {} from {}", paper.id, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(SummarizationError::Unauthorized(status.as_u16()));
            }
            StatusCode::TOO_MANY_REQUESTS => return Err(SummarizationError::RateLimited),
            s if !s.is_success() => {
                warn!("Completion API returned status {}", s);
                return Err(SummarizationError::Api {
                    status: s.as_u16(),
                    body: truncate_chars(&body, MAX_ERROR_BODY).to_string(),
                });
            }
            _ => {}
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| SummarizationError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(SummarizationError::MalformedResponse(
                "response contained no completion text".to_string(),
            ));
        }

        debug!("Received {} characters of summary for {}", content.len(), paper.id);
        Ok(Summary {
            paper_id: paper.id.clone(),
            text: content,
        })
    }
}

/// User prompt for one paper, with the text cut to `max_chars` characters
pub fn build_prompt(paper: &PaperReference, text: &ExtractedText, max_chars: usize) -> String {
    let body = truncate_chars(text.as_str(), max_chars);
    if body.len() < text.as_str().len() {
        debug!("Truncated text of {} to {} characters", paper.id, max_chars);
    }

    format!(
        "Summarize the following academic paper.\n\
         Title: {}\n\
         arXiv ID: {}\n\n\
         Structure the summary as:\n\
         1. Problem: what the paper sets out to solve.\n\
         2. Method: the approach and its key ideas.\n\
         3. Results: the main quantitative and qualitative findings.\n\
         4. Limitations: caveats stated in or evident from the text.\n\n\
         Paper text:\n{}",
        paper.title.as_deref().unwrap_or("(untitled)"),
        paper.id,
        body
    )
}

/// Longest prefix of `text` with at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
