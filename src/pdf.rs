use log::debug;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::ExtractionError;

/// Heading after which the bibliography starts; everything from it on is dropped
pub const REFERENCES_MARKER: &str = "References";

/// Plain text of one PDF, normalized for the summarizer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Normalize raw extractor output: single spaces, no bibliography
    pub fn from_raw(raw: &str) -> Self {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        let body = match collapsed.rfind(REFERENCES_MARKER) {
            Some(idx) => collapsed[..idx].trim_end().to_string(),
            None => collapsed,
        };
        Self(body)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract text from PDF bytes. An empty result means the PDF has no text layer.
pub fn extract_text_from_bytes(bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
    let raw = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
    let text = ExtractedText::from_raw(&raw);
    debug!("Extracted {} characters ({} raw)", text.char_count(), raw.len());
    Ok(text)
}

/// Extract text from a PDF file on disk
pub fn extract_text_from_path(path: &Path) -> Result<ExtractedText, ExtractionError> {
    let bytes = fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    extract_text_from_bytes(&bytes)
}

/// Run the extraction on the blocking pool. A panic inside the PDF library is
/// reported as an unreadable file.
pub async fn extract_text(bytes: Vec<u8>) -> Result<ExtractedText, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_text_from_bytes(&bytes))
        .await
        .map_err(|e| ExtractionError::Unreadable(format!("extraction task failed: {}", e)))?
}
