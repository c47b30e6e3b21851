//! Where document bytes come from, and how caller-supplied locations are vetted.

use crate::error::{AnalysisError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use wordscan_protocol::{AnalysisRequest, FieldErrors};

const DEFAULT_BLOCK_SIZE: usize = 8 * 1024;

/// A readable byte stream the pipeline consumes block by block.
///
/// Blocks carry no alignment guarantee: a line, or a multi-byte character, may span two of
/// them.
#[async_trait]
pub trait TextSource: Send {
    /// Human-readable origin used in logs and error messages
    fn location(&self) -> &str;

    /// Next block of bytes, `None` once the stream is exhausted.
    async fn next_block(&mut self) -> Result<Option<Bytes>>;
}

/// A document already held in memory (local files, tests).
#[derive(Debug, Clone)]
pub struct MemorySource {
    location: String,
    data: Bytes,
    block_size: usize,
}

impl MemorySource {
    pub fn new(location: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            location: location.into(),
            data: data.into(),
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    pub fn from_text(location: impl Into<String>, text: &str) -> Self {
        Self::new(location, Bytes::copy_from_slice(text.as_bytes()))
    }

    /// Hand the data out in blocks of at most `block_size` bytes.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }
}

#[async_trait]
impl TextSource for MemorySource {
    fn location(&self) -> &str {
        &self.location
    }

    async fn next_block(&mut self) -> Result<Option<Bytes>> {
        if self.data.is_empty() {
            return Ok(None);
        }
        let take = self.block_size.min(self.data.len());
        Ok(Some(self.data.split_to(take)))
    }
}

/// Drop whitespace and characters that are never legal unescaped in a URL.
pub fn sanitize_location(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !"<>\"{}|\\^`[]".contains(*c))
        .collect()
}

/// Sanitize and parse `raw`, accepting only absolute http(s) URLs with a host.
pub fn parse_location(raw: &str) -> Result<Url> {
    let cleaned = sanitize_location(raw);
    if cleaned.is_empty() {
        return Err(AnalysisError::invalid_source(raw, "Text URL is required"));
    }

    let url = Url::parse(&cleaned).map_err(|err| {
        AnalysisError::invalid_source(&cleaned, format!("Invalid URL format: {cleaned}: {err}"))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AnalysisError::invalid_source(
            &cleaned,
            format!(
                "Unsupported scheme: {} (only http/https allowed)",
                url.scheme()
            ),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(AnalysisError::invalid_source(
            &cleaned,
            format!("URL has no host: {cleaned}"),
        ));
    }
    Ok(url)
}

/// Request validation ahead of the pipeline; failures are reported per field.
pub fn validate_request(
    request: &AnalysisRequest,
) -> std::result::Result<(Url, Vec<String>), FieldErrors> {
    let mut errors = FieldErrors::new();

    let url = if request.text_url.trim().is_empty() {
        errors.insert("textUrl".to_string(), "Text URL is required".to_string());
        None
    } else {
        let lowered = request.text_url.trim().to_ascii_lowercase();
        if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
            errors.insert(
                "textUrl".to_string(),
                "URL must start with http:// or https://".to_string(),
            );
            None
        } else {
            match parse_location(&request.text_url) {
                Ok(url) => Some(url),
                Err(err) => {
                    errors.insert("textUrl".to_string(), err.to_string());
                    None
                }
            }
        }
    };

    if request.words.is_empty() {
        errors.insert(
            "words".to_string(),
            "Words list cannot be empty".to_string(),
        );
    } else if request.words.iter().any(|w| w.trim().is_empty()) {
        errors.insert("words".to_string(), "Words cannot be blank".to_string());
    }

    match url {
        Some(url) if errors.is_empty() => Ok((url, request.words.clone())),
        _ => Err(errors),
    }
}
