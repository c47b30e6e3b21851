use serde::{Deserialize, Serialize};

/// A window of the original document, possibly prefixed with lines of its predecessor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextChunk {
    /// Overlap lines followed by newly read lines, each terminated by `\n`
    pub content: String,

    /// Line number of the first line in `content` (0-indexed)
    pub start_line: usize,

    /// Line number of the last line in `content` (0-indexed, inclusive)
    pub end_line: usize,

    /// Absolute character offset of `content`'s first character
    pub global_offset: usize,
}

impl TextChunk {
    /// Create a new chunk
    #[must_use]
    pub const fn new(
        content: String,
        start_line: usize,
        end_line: usize,
        global_offset: usize,
    ) -> Self {
        Self {
            content,
            start_line,
            end_line,
            global_offset,
        }
    }

    /// Get the number of lines in this chunk
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Iterate `(line_number, line_text)` pairs, newline stripped
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.content
            .strip_suffix('\n')
            .unwrap_or(&self.content)
            .split('\n')
            .enumerate()
            .map(move |(idx, line)| (self.start_line + idx, line))
    }

    /// Number of characters in `content`
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}
