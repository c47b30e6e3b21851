use crate::words::WordSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use wordscan_chunker::TextChunk;

/// One occurrence of a query word inside a chunk
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRecord {
    pub word: String,
    pub line_number: usize,
    pub char_position_in_line: usize,
    pub global_char_offset: usize,
}

/// Find every bounded, case-insensitive occurrence of `words` in `chunk`.
///
/// Pure: depends only on its arguments, so chunks can be matched concurrently. The order of
/// the returned records carries no meaning.
pub fn find_matches(chunk: &TextChunk, words: &WordSet) -> Vec<MatchRecord> {
    let mut results = Vec::new();
    if words.is_empty() {
        return results;
    }

    log::debug!(
        "Processing chunk from line {} to {}",
        chunk.start_line,
        chunk.end_line
    );

    let mut line_offset = chunk.global_offset;
    for (line_number, line) in chunk.lines() {
        let ascii = line.is_ascii();
        for (word, regex) in words.patterns() {
            for start in bounded_matches(regex, line) {
                let char_position_in_line = if ascii {
                    start
                } else {
                    line[..start].chars().count()
                };
                results.push(MatchRecord {
                    word: word.to_string(),
                    line_number,
                    char_position_in_line,
                    global_char_offset: line_offset + char_position_in_line,
                });
            }
        }
        let line_chars = if ascii {
            line.len()
        } else {
            line.chars().count()
        };
        line_offset += line_chars + 1;
    }

    log::debug!("Found {} matches in chunk", results.len());
    results
}

/// Byte offsets of matches not touching another alphanumeric character on either side.
fn bounded_matches(regex: &Regex, line: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut at = 0;
    while at <= line.len() {
        let Some(m) = regex.find_at(line, at) else {
            break;
        };
        if is_word_boundary(line, m.start(), m.end()) {
            starts.push(m.start());
            at = m.end();
        } else {
            // A rejected candidate may still hide a bounded one starting inside it.
            at = m.start() + line[m.start()..].chars().next().map_or(1, char::len_utf8);
        }
    }
    starts
}

fn is_word_boundary(line: &str, start: usize, end: usize) -> bool {
    let before = line[..start].chars().next_back();
    let after = line[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(content: &str, start_line: usize, global_offset: usize) -> TextChunk {
        let lines = content.lines().count();
        TextChunk::new(
            content.to_string(),
            start_line,
            start_line + lines.saturating_sub(1),
            global_offset,
        )
    }

    fn offsets(records: &[MatchRecord]) -> Vec<(usize, usize, usize)> {
        let mut out: Vec<_> = records
            .iter()
            .map(|r| {
                (
                    r.line_number,
                    r.char_position_in_line,
                    r.global_char_offset,
                )
            })
            .collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn matches_only_standalone_words() {
        let words = WordSet::new(["cat"]).unwrap();
        let records = find_matches(&chunk("concatenate cats Cat CAT.\n", 0, 0), &words);
        assert_eq!(offsets(&records), vec![(0, 17, 17), (0, 21, 21)]);
        assert!(records.iter().all(|r| r.word == "cat"));
    }

    #[test]
    fn positions_are_relative_to_chunk_origin() {
        let words = WordSet::new(["cat"]).unwrap();
        let records = find_matches(&chunk("A CAT ran.\nCategory five.\n", 1, 13), &words);
        assert_eq!(offsets(&records), vec![(1, 2, 15)]);
    }

    #[test]
    fn punctuation_and_underscore_are_boundaries() {
        let words = WordSet::new(["cat"]).unwrap();
        let records = find_matches(&chunk("(cat) cat_x 'cat' cat9\n", 0, 0), &words);
        assert_eq!(
            offsets(&records)
                .into_iter()
                .map(|(_, pos, _)| pos)
                .collect::<Vec<_>>(),
            vec![1, 6, 13]
        );
    }

    #[test]
    fn rejected_candidate_does_not_hide_following_match() {
        let words = WordSet::new(["aa"]).unwrap();
        let records = find_matches(&chunk("aaa aa\n", 0, 0), &words);
        assert_eq!(offsets(&records), vec![(0, 4, 4)]);
    }

    #[test]
    fn non_ascii_lines_use_character_positions() {
        let words = WordSet::new(["café"]).unwrap();
        let records = find_matches(&chunk("ü CAFÉ\nx café\n", 0, 100), &words);
        assert_eq!(offsets(&records), vec![(0, 2, 102), (1, 2, 109)]);
    }

    #[test]
    fn accented_letters_count_as_alphanumeric() {
        let words = WordSet::new(["caf"]).unwrap();
        assert!(find_matches(&chunk("café\n", 0, 0), &words).is_empty());
    }

    #[test]
    fn empty_word_set_yields_nothing() {
        let words = WordSet::new(Vec::<String>::new()).unwrap();
        assert!(find_matches(&chunk("cat\n", 0, 0), &words).is_empty());
    }

    #[test]
    fn several_words_on_several_lines() {
        let words = WordSet::new(["red", "blue"]).unwrap();
        let records = find_matches(&chunk("red fish\nblue fish red\n", 4, 40), &words);

        let mut found: Vec<_> = records
            .iter()
            .map(|r| (r.word.as_str(), r.line_number, r.global_char_offset))
            .collect();
        found.sort_unstable();
        assert_eq!(
            found,
            vec![("blue", 5, 49), ("red", 4, 40), ("red", 5, 59)]
        );
    }
}
