//! # wordscan chunker
//!
//! Splits a line-oriented text stream into bounded, overlapping windows that can be searched
//! independently and in parallel.
//!
//! Every emitted [`TextChunk`] knows where it came from:
//! - `start_line` / `end_line`: 0-indexed line numbers in the original document
//! - `global_offset`: absolute character position of the chunk's first character
//!
//! so that `global_offset + index_within_content` is always the true absolute position of a
//! character, including characters inside the overlap prefix.
//!
//! ## Architecture
//!
//! ```text
//! bytes (any block size)
//!     │
//!     ├──> LineDecoder: split on '\n', strip '\r', lossy UTF-8
//!     │
//!     └──> LineChunker: accumulate `chunk_size` lines
//!          ├─> prefix with the previous chunk's trailing `overlap` lines
//!          ├─> tag start/end line and absolute offset
//!          └─> emit TextChunk
//! ```
//!
//! ## Example
//!
//! ```rust
//! use wordscan_chunker::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::new(2, 1)).unwrap();
//! let chunks = chunker.chunk_str("one\ntwo\nthree\n");
//!
//! assert_eq!(chunks[0].content, "one\ntwo\n");
//! assert_eq!(chunks[1].content, "two\nthree\n");
//! assert_eq!(chunks[1].start_line, 1);
//! assert_eq!(chunks[1].global_offset, 4);
//! ```

mod chunker;
mod config;
mod decoder;
mod error;
mod types;

pub use chunker::{Chunker, ChunkingStats, LineChunker};
pub use config::ChunkerConfig;
pub use decoder::LineDecoder;
pub use error::{ChunkerError, Result};
pub use types::TextChunk;
