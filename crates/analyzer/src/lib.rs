//! # wordscan analyzer
//!
//! The request-level pipeline: open a [`TextSource`], decode and chunk it while it streams,
//! match every chunk on a bounded [`WorkerPool`], then aggregate.
//!
//! ```text
//! HttpFetcher / MemorySource
//!     │ byte blocks
//!     ├──> LineDecoder ──> LineChunker
//!     │                        │ TextChunk (as soon as it fills)
//!     │                        └──> WorkerPool ──> find_matches (blocking thread)
//!     │                                                │ Vec<MatchRecord>
//!     └──────────────────────────────────────> aggregate ──> AnalysisResponse
//! ```
//!
//! Any failure (fetch, size limit, timeout, pool saturation, panicked matcher) aborts the
//! request; partial results are never returned.

mod analyzer;
mod config;
mod error;
mod fetch;
mod pool;
mod source;

pub use analyzer::Analyzer;
pub use config::{parse_byte_size, parse_duration, AnalysisConfig, FetchLimits, CONFIG_PATH_ENV};
pub use error::{AnalysisError, ErrorKind, Result};
pub use fetch::{HttpFetcher, HttpSource};
pub use pool::{PoolSnapshot, QueueSlot, WorkerPool, MAX_POOL_SIZE};
pub use source::{parse_location, sanitize_location, validate_request, MemorySource, TextSource};

pub use wordscan_protocol::{AnalysisRequest, AnalysisResponse, WordLocation, WordMatch};
