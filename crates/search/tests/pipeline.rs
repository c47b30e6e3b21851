use pretty_assertions::assert_eq;
use proptest::prelude::*;
use wordscan_chunker::{Chunker, ChunkerConfig};
use wordscan_search::{aggregate, find_matches, search_chunks, WordLocation, WordMatch, WordSet};

fn run(text: &str, size: usize, overlap: usize, words: &[&str]) -> Vec<WordMatch> {
    let chunker = Chunker::new(ChunkerConfig::new(size, overlap)).expect("valid config");
    let words = WordSet::new(words).expect("valid words");
    search_chunks(&chunker.chunk_str(text), &words)
}

#[test]
fn three_line_scenario() {
    let text = "The cat sat.\nA CAT ran.\nCategory five.\n";
    let matches = run(text, 2, 1, &["cat"]);

    assert_eq!(
        matches,
        vec![WordMatch {
            word: "cat".to_string(),
            locations: vec![WordLocation::new(0, 4), WordLocation::new(1, 15)],
        }]
    );
    assert_eq!(&text[15..18], "CAT");
}

#[test]
fn boundary_matching_ignores_substrings() {
    let matches = run("concatenate cats cat\nCAT Cats CONCAT\n", 1, 0, &["cat"]);
    assert_eq!(
        matches[0].locations,
        vec![WordLocation::new(0, 17), WordLocation::new(1, 21)]
    );
}

#[test]
fn empty_document_or_word_list_is_empty() {
    assert!(run("", 3, 1, &["cat"]).is_empty());
    assert!(run("cat cat\n", 3, 1, &[]).is_empty());
}

#[test]
fn words_without_occurrences_are_omitted() {
    let matches = run("one two\n", 4, 0, &["two", "three"]);
    let words: Vec<_> = matches.iter().map(|m| m.word.as_str()).collect();
    assert_eq!(words, vec!["two"]);
}

#[test]
fn reversed_chunk_order_gives_identical_report() {
    let text = "b a\nc b a\na\nb\nc c\n";
    let chunker = Chunker::new(ChunkerConfig::new(2, 1)).unwrap();
    let words = WordSet::new(["a", "b", "c"]).unwrap();
    let chunks = chunker.chunk_str(text);

    let forward = aggregate(chunks.iter().map(|c| find_matches(c, &words)));
    let backward = aggregate(chunks.iter().rev().map(|c| find_matches(c, &words)));
    assert_eq!(forward, backward);
    assert_eq!(
        serde_json::to_string(&forward).unwrap(),
        serde_json::to_string(&backward).unwrap()
    );
}

proptest! {
    #[test]
    fn overlap_never_changes_the_answer(
        lines in prop::collection::vec("(cat|dog|Cat|DOG|category|hotdog| |\\.){0,8}", 0..30),
        size in 1usize..6,
        overlap_seed in 0usize..6,
    ) {
        let overlap = overlap_seed % size;
        let mut text = lines.join("\n");
        text.push('\n');

        let baseline = run(&text, size, 0, &["cat", "dog"]);
        let overlapped = run(&text, size, overlap, &["cat", "dog"]);
        prop_assert_eq!(&baseline, &overlapped);

        for m in &baseline {
            let offsets: Vec<_> = m.locations.iter().map(|l| l.char_offset).collect();
            let mut sorted = offsets.clone();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(offsets, sorted);
        }
    }

    #[test]
    fn reported_offsets_point_at_the_word(
        lines in prop::collection::vec("(cat|Cat|x|é| ){0,6}", 1..20),
        size in 1usize..5,
    ) {
        let text = format!("{}\n", lines.join("\n"));
        let chars: Vec<char> = text.chars().collect();
        for m in run(&text, size, size - 1, &["cat"]) {
            for loc in m.locations {
                let found: String = chars[loc.char_offset..loc.char_offset + 3].iter().collect();
                prop_assert_eq!(found.to_lowercase(), "cat");
                let line_start = chars[..loc.char_offset].iter().filter(|&&c| c == '\n').count();
                prop_assert_eq!(line_start, loc.line_offset);
            }
        }
    }
}
