//! Word search over [`TextChunk`]s.
//!
//! [`WordSet`] compiles one case-insensitive matcher per distinct query word, [`find_matches`]
//! runs them over a single chunk, and [`aggregate`] folds the per-chunk results of a whole
//! document into sorted, deduplicated [`WordMatch`]es.

mod aggregate;
mod error;
mod matcher;
mod words;

pub use aggregate::aggregate;
pub use error::{Result, SearchError};
pub use matcher::{find_matches, MatchRecord};
pub use words::WordSet;

pub use wordscan_chunker::TextChunk;
pub use wordscan_protocol::{WordLocation, WordMatch};

/// Sequentially match every chunk and aggregate the results.
pub fn search_chunks(chunks: &[TextChunk], words: &WordSet) -> Vec<WordMatch> {
    aggregate(chunks.iter().map(|chunk| find_matches(chunk, words)))
}
