//! Merge per-chunk match lists into the final per-word report.

use crate::matcher::MatchRecord;
use std::collections::BTreeMap;
use wordscan_protocol::{WordLocation, WordMatch};

/// Group records by lowercased word, keep one location per absolute offset, and order both
/// the words and each word's locations ascending.
///
/// Overlapping chunks report the same occurrence more than once; the absolute offset is the
/// identity that survives across chunk boundaries, so it is the dedup key. Batch order does
/// not influence the result.
pub fn aggregate<I>(batches: I) -> Vec<WordMatch>
where
    I: IntoIterator<Item = Vec<MatchRecord>>,
{
    let mut batch_count = 0usize;
    let mut by_word: BTreeMap<String, BTreeMap<usize, usize>> = BTreeMap::new();

    for batch in batches {
        batch_count += 1;
        for record in batch {
            by_word
                .entry(record.word.to_lowercase())
                .or_default()
                .entry(record.global_char_offset)
                .or_insert(record.line_number);
        }
    }
    log::info!("Aggregating results from {batch_count} chunks");

    let matches: Vec<WordMatch> = by_word
        .into_iter()
        .filter(|(_, locations)| !locations.is_empty())
        .map(|(word, locations)| {
            log::debug!("Word '{word}' found {} times", locations.len());
            WordMatch {
                word,
                locations: locations
                    .into_iter()
                    .map(|(offset, line)| WordLocation::new(line, offset))
                    .collect(),
            }
        })
        .collect();

    log::info!(
        "Aggregation complete. Found matches for {} words",
        matches.len()
    );
    matches
}
