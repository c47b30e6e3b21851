use serde_json::{json, Value};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// The four failure classes a caller has to distinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidSource,
    SizeExceeded,
    ReadFailure,
    InternalFailure,
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Malformed location, unreachable host or non-OK status
    #[error("{message}")]
    InvalidSource { location: String, message: String },

    /// Declared or observed body size over the configured ceiling
    #[error("File size exceeds maximum allowed: {observed} bytes > {limit} bytes for URL: {location}")]
    SizeExceeded {
        location: String,
        limit: u64,
        observed: u64,
    },

    /// Transport failure or timeout while reading the document
    #[error("Unable to read from URL: {location}: {reason}")]
    ReadFailure { location: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal failure: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn invalid_source(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSource {
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn read_failure(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ReadFailure {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSource { .. } => ErrorKind::InvalidSource,
            Self::SizeExceeded { .. } => ErrorKind::SizeExceeded,
            Self::ReadFailure { .. } => ErrorKind::ReadFailure,
            Self::InvalidConfig(_) | Self::Internal(_) => ErrorKind::InternalFailure,
        }
    }

    /// Stable code for error envelopes
    pub const fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidSource => "INVALID_URL",
            ErrorKind::SizeExceeded => "FILE_SIZE_EXCEEDED",
            ErrorKind::ReadFailure => "READ_FAILURE",
            ErrorKind::InternalFailure => "INTERNAL_ERROR",
        }
    }

    /// Structured context for the caller (location, limit vs observed size)
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::InvalidSource { location, .. } | Self::ReadFailure { location, .. } => {
                Some(json!({ "location": location }))
            }
            Self::SizeExceeded {
                location,
                limit,
                observed,
            } => Some(json!({
                "location": location,
                "limitBytes": limit,
                "observedBytes": observed,
            })),
            Self::InvalidConfig(_) | Self::Internal(_) => None,
        }
    }
}

impl From<wordscan_search::SearchError> for AnalysisError {
    fn from(err: wordscan_search::SearchError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<wordscan_chunker::ChunkerError> for AnalysisError {
    fn from(err: wordscan_chunker::ChunkerError) -> Self {
        match err {
            wordscan_chunker::ChunkerError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            wordscan_chunker::ChunkerError::IoError(err) => Self::read_failure("input", err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_kind() {
        assert_eq!(
            AnalysisError::invalid_source("u", "bad").code(),
            "INVALID_URL"
        );
        assert_eq!(
            AnalysisError::read_failure("u", "reset").code(),
            "READ_FAILURE"
        );
        assert_eq!(AnalysisError::internal("boom").code(), "INTERNAL_ERROR");
        assert_eq!(
            AnalysisError::invalid_config("x").kind(),
            ErrorKind::InternalFailure
        );
    }

    #[test]
    fn size_exceeded_reports_limit_and_observed() {
        let err = AnalysisError::SizeExceeded {
            location: "http://h/doc.txt".to_string(),
            limit: 10,
            observed: 11,
        };
        assert_eq!(err.code(), "FILE_SIZE_EXCEEDED");
        let message = err.to_string();
        assert!(message.contains("11 bytes > 10 bytes"), "{message}");
        let details = err.details().unwrap();
        assert_eq!(details["limitBytes"], 10);
        assert_eq!(details["observedBytes"], 11);
    }
}
