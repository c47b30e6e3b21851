use proptest::prelude::*;
use wordscan_chunker::{Chunker, ChunkerConfig, TextChunk};

fn chunk(lines: &[String], size: usize, overlap: usize) -> Vec<TextChunk> {
    let chunker = Chunker::new(ChunkerConfig::new(size, overlap)).expect("valid config");
    let mut text = lines.join("\n");
    if !lines.is_empty() {
        text.push('\n');
    }
    chunker.chunk_str(&text)
}

fn geometry() -> impl Strategy<Value = (usize, usize)> {
    (1usize..8).prop_flat_map(|size| (Just(size), 0..size))
}

#[test]
fn documented_scenario_chunks() {
    let lines: Vec<String> = ["The cat sat.", "A CAT ran.", "Category five."]
        .iter()
        .map(ToString::to_string)
        .collect();
    let chunks = chunk(&lines, 2, 1);

    assert_eq!(chunks.len(), 2);
    assert_eq!((chunks[0].start_line, chunks[0].end_line), (0, 1));
    assert_eq!((chunks[1].start_line, chunks[1].end_line), (1, 2));
    assert_eq!(chunks[1].global_offset, "The cat sat.\n".chars().count());
}

#[test]
fn line_chunker_emits_as_lines_arrive() {
    let chunker = Chunker::new(ChunkerConfig::new(3, 1)).unwrap();
    let mut streaming = chunker.line_chunker();

    assert!(streaming.push_line("a").is_none());
    assert!(streaming.push_line("b").is_none());
    let first = streaming.push_line("c").expect("full window");
    assert_eq!(first.content, "a\nb\nc\n");

    assert!(streaming.push_line("d").is_none());
    let last = streaming.finish().expect("tail");
    assert_eq!(last.content, "c\nd\n");
    assert_eq!(last.start_line, 2);
    assert!(streaming.finish().is_none());
}

proptest! {
    #[test]
    fn every_line_is_covered_at_its_line_number(
        lines in prop::collection::vec("[a-zA-Z é]{0,12}", 0..40),
        (size, overlap) in geometry(),
    ) {
        let chunks = chunk(&lines, size, overlap);
        if lines.is_empty() {
            prop_assert!(chunks.is_empty());
        }

        for (number, expected) in lines.iter().enumerate() {
            let found = chunks.iter().any(|c| {
                c.lines().any(|(n, text)| n == number && text == expected.as_str())
            });
            prop_assert!(found, "line {} missing", number);
        }

        for c in &chunks {
            prop_assert!(c.end_line < lines.len());
            prop_assert_eq!(c.lines().count(), c.line_count());
        }
    }

    #[test]
    fn global_offset_plus_local_index_is_absolute_position(
        lines in prop::collection::vec("[a-z0-9 ü]{0,10}", 1..30),
        (size, overlap) in geometry(),
    ) {
        let mut document: Vec<char> = Vec::new();
        for line in &lines {
            document.extend(line.chars());
            document.push('\n');
        }

        let chunks = chunk(&lines, size, overlap);
        let mut covered = vec![false; document.len()];
        for c in &chunks {
            for (idx, ch) in c.content.chars().enumerate() {
                let absolute = c.global_offset + idx;
                prop_assert_eq!(document[absolute], ch);
                covered[absolute] = true;
            }
        }
        prop_assert!(covered.iter().all(|&seen| seen));
    }

    #[test]
    fn overlap_repeats_exactly_the_previous_tail(
        lines in prop::collection::vec("[a-z]{1,6}", 1..30),
        (size, overlap) in geometry(),
    ) {
        let chunks = chunk(&lines, size, overlap);
        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            prop_assert_eq!(next.start_line, prev.end_line + 1 - overlap);
        }
    }
}
