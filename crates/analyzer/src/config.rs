use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use wordscan_chunker::ChunkerConfig;

pub const CONFIG_PATH_ENV: &str = "WORDSCAN_CONFIG";

const KIB: u64 = 1024;

/// Static settings for the analysis pipeline.
///
/// Sizes and durations stay human-readable strings (`"100MB"`, `"300s"`) so the TOML file
/// reads naturally; [`AnalysisConfig::limits`] parses them once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Lines per chunk
    pub chunk_size: usize,
    /// Lines repeated from the previous chunk
    pub chunk_overlap: usize,
    /// Matcher tasks allowed to run at once, process-wide
    pub thread_pool_size: usize,
    /// Matcher tasks allowed to wait for a worker, process-wide
    pub queue_capacity: usize,
    pub max_file_size: String,
    pub connect_timeout: String,
    pub request_timeout: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 50,
            thread_pool_size: 10,
            queue_capacity: 1024,
            max_file_size: "100MB".to_string(),
            connect_timeout: "30s".to_string(),
            request_timeout: "300s".to_string(),
        }
    }
}

/// Parsed fetch limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub max_file_size: u64,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl AnalysisConfig {
    /// Defaults, then the TOML file (if any), then `WORDSCAN_*` environment overrides.
    ///
    /// Not validated yet: callers may layer further overrides first.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok();
        let path = path.or(env_path.as_deref().map(Path::new));

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AnalysisError::invalid_config(format!("Failed to read {}: {err}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|err| {
            AnalysisError::invalid_config(format!("Invalid {}: {err}", path.display()))
        })
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = var("WORDSCAN_CHUNK_SIZE") {
            self.chunk_size = parse_count("WORDSCAN_CHUNK_SIZE", &v)?;
        }
        if let Some(v) = var("WORDSCAN_CHUNK_OVERLAP") {
            self.chunk_overlap = parse_count("WORDSCAN_CHUNK_OVERLAP", &v)?;
        }
        if let Some(v) = var("WORDSCAN_THREAD_POOL_SIZE") {
            self.thread_pool_size = parse_count("WORDSCAN_THREAD_POOL_SIZE", &v)?;
        }
        if let Some(v) = var("WORDSCAN_QUEUE_CAPACITY") {
            self.queue_capacity = parse_count("WORDSCAN_QUEUE_CAPACITY", &v)?;
        }
        if let Some(v) = var("WORDSCAN_MAX_FILE_SIZE") {
            self.max_file_size = v;
        }
        if let Some(v) = var("WORDSCAN_CONNECT_TIMEOUT") {
            self.connect_timeout = v;
        }
        if let Some(v) = var("WORDSCAN_REQUEST_TIMEOUT") {
            self.request_timeout = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.chunker_config()
            .validate()
            .map_err(AnalysisError::invalid_config)?;

        if self.thread_pool_size == 0 {
            return Err(AnalysisError::invalid_config(
                "thread_pool_size must be > 0",
            ));
        }
        if self.queue_capacity == 0 {
            return Err(AnalysisError::invalid_config("queue_capacity must be > 0"));
        }

        let limits = self.limits()?;
        if limits.max_file_size == 0 {
            return Err(AnalysisError::invalid_config("max_file_size must be > 0"));
        }
        Ok(())
    }

    #[must_use]
    pub const fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig::new(self.chunk_size, self.chunk_overlap)
    }

    pub fn limits(&self) -> Result<FetchLimits> {
        Ok(FetchLimits {
            max_file_size: parse_byte_size(&self.max_file_size).ok_or_else(|| {
                AnalysisError::invalid_config(format!(
                    "max_file_size: cannot parse '{}' (expected e.g. 512KB, 100MB, 1GB)",
                    self.max_file_size
                ))
            })?,
            connect_timeout: parse_duration(&self.connect_timeout).ok_or_else(|| {
                AnalysisError::invalid_config(format!(
                    "connect_timeout: cannot parse '{}' (expected e.g. 500ms, 30s, 5m)",
                    self.connect_timeout
                ))
            })?,
            request_timeout: parse_duration(&self.request_timeout).ok_or_else(|| {
                AnalysisError::invalid_config(format!(
                    "request_timeout: cannot parse '{}' (expected e.g. 500ms, 30s, 5m)",
                    self.request_timeout
                ))
            })?,
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|err| AnalysisError::internal(format!("Cannot render config: {err}")))
    }
}

fn parse_count(key: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>().map_err(|_| {
        AnalysisError::invalid_config(format!("{key}: expected a non-negative integer, got '{raw}'"))
    })
}

/// `"100MB"`, `"512 kb"`, `"1GB"`, `"4096"`; multiples of 1024.
pub fn parse_byte_size(raw: &str) -> Option<u64> {
    let lowered = raw.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return None;
    }

    let (value, multiplier) = if let Some(value) = lowered.strip_suffix("gb") {
        (value, KIB * KIB * KIB)
    } else if let Some(value) = lowered.strip_suffix("mb") {
        (value, KIB * KIB)
    } else if let Some(value) = lowered.strip_suffix("kb") {
        (value, KIB)
    } else if let Some(value) = lowered.strip_suffix('b') {
        (value, 1)
    } else {
        (lowered.as_str(), 1)
    };

    value.trim().parse::<u64>().ok()?.checked_mul(multiplier)
}

/// `"250ms"`, `"30s"`, `"5m"`, bare numbers are seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let lowered = raw.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return None;
    }

    if let Some(value) = lowered.strip_suffix("ms") {
        return value.trim().parse::<u64>().ok().map(Duration::from_millis);
    }
    if let Some(value) = lowered.strip_suffix('s') {
        return value.trim().parse::<u64>().ok().map(Duration::from_secs);
    }
    if let Some(value) = lowered.strip_suffix('m') {
        let mins = value.trim().parse::<u64>().ok()?;
        return mins.checked_mul(60).map(Duration::from_secs);
    }

    lowered.parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AnalysisConfig::default();
        config.validate().unwrap();
        let limits = config.limits().unwrap();
        assert_eq!(limits.max_file_size, 100 * 1024 * 1024);
        assert_eq!(limits.request_timeout, Duration::from_secs(300));
        assert_eq!(limits.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn parse_byte_size_handles_suffixes() {
        assert_eq!(parse_byte_size("100MB"), Some(100 * 1024 * 1024));
        assert_eq!(parse_byte_size(" 512 kb "), Some(512 * 1024));
        assert_eq!(parse_byte_size("1GB"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_byte_size("17B"), Some(17));
        assert_eq!(parse_byte_size("4096"), Some(4096));
        assert_eq!(parse_byte_size(""), None);
        assert_eq!(parse_byte_size("lots"), None);
        assert_eq!(parse_byte_size("-1MB"), None);
    }

    #[test]
    fn parse_duration_handles_suffixes() {
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("300s"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("7"), Some(Duration::from_secs(7)));
        assert_eq!(parse_duration("soon"), None);
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let config = AnalysisConfig {
            chunk_size: 10,
            chunk_overlap: 10,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_pool_or_queue_is_rejected() {
        for config in [
            AnalysisConfig {
                thread_pool_size: 0,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                queue_capacity: 0,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                max_file_size: "0KB".to_string(),
                ..AnalysisConfig::default()
            },
        ] {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn env_overrides_apply_on_top_of_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_size = 20\nchunk_overlap = 2\nmax_file_size = \"1MB\"").unwrap();

        let mut config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.chunk_size, 20);
        assert_eq!(config.thread_pool_size, 10);

        let env: HashMap<&str, &str> = [
            ("WORDSCAN_CHUNK_OVERLAP", "5"),
            ("WORDSCAN_REQUEST_TIMEOUT", " 10s "),
            ("WORDSCAN_THREAD_POOL_SIZE", ""),
        ]
        .into_iter()
        .collect();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.chunk_overlap, 5);
        assert_eq!(config.request_timeout, "10s");
        assert_eq!(config.thread_pool_size, 10);
        config.validate().unwrap();
    }

    #[test]
    fn malformed_env_value_is_reported() {
        let mut config = AnalysisConfig::default();
        let err = config
            .apply_env(|key| (key == "WORDSCAN_CHUNK_SIZE").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("WORDSCAN_CHUNK_SIZE"));
    }

    #[test]
    fn toml_round_trip_keeps_values() {
        let config = AnalysisConfig {
            chunk_size: 7,
            ..AnalysisConfig::default()
        };
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("chunk_size = 7"));
        let parsed: AnalysisConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
