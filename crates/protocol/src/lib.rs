use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const API_MATCH_PATH: &str = "/text-analysis/match";
pub const API_HEALTH_PATH: &str = "/health";

/// Per-field validation messages, keyed by the request field name.
pub type FieldErrors = BTreeMap<String, String>;

/// "Analyze the text at `text_url` for `words`."
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub text_url: String,
    #[serde(default)]
    pub words: Vec<String>,
}

impl AnalysisRequest {
    pub fn new(text_url: impl Into<String>, words: Vec<String>) -> Self {
        Self {
            text_url: text_url.into(),
            words,
        }
    }
}

/// One occurrence of a word: the line it sits on and its absolute character offset.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub struct WordLocation {
    pub line_offset: usize,
    pub char_offset: usize,
}

impl WordLocation {
    #[must_use]
    pub const fn new(line_offset: usize, char_offset: usize) -> Self {
        Self {
            line_offset,
            char_offset,
        }
    }
}

/// All occurrences of one (lowercased) word, ascending by `char_offset`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WordMatch {
    pub word: String,
    pub locations: Vec<WordLocation>,
}

impl WordMatch {
    #[must_use]
    pub fn occurrences(&self) -> usize {
        self.locations.len()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    Success,
}

impl AnalysisStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub matches: Vec<WordMatch>,
    pub status: AnalysisStatus,
    pub processing_time_ms: u64,
}

impl AnalysisResponse {
    pub fn success(matches: Vec<WordMatch>, processing_time_ms: u64) -> Self {
        Self {
            matches,
            status: AnalysisStatus::Success,
            processing_time_ms,
        }
    }

    /// Looks up the entry for `word` (case-insensitive).
    pub fn word(&self, word: &str) -> Option<&WordMatch> {
        let needle = word.to_lowercase();
        self.matches
            .binary_search_by(|m| m.word.as_str().cmp(needle.as_str()))
            .ok()
            .map(|idx| &self.matches[idx])
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: FieldErrors,
    pub timestamp: DateTime<Utc>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            hint: None,
            field_errors: FieldErrors::new(),
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_field_errors(mut self, field_errors: FieldErrors) -> Self {
        self.field_errors = field_errors;
        self
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
