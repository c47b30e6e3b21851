use crate::config::ChunkerConfig;
use crate::decoder::LineDecoder;
use crate::error::{ChunkerError, Result};
use crate::types::TextChunk;
use std::io::BufRead;

/// Main chunker interface for processing whole inputs
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting invalid window geometry
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    /// Start an incremental chunker with this configuration
    #[must_use]
    pub fn line_chunker(&self) -> LineChunker {
        LineChunker {
            config: self.config,
            pending: Vec::new(),
            pending_chars: 0,
            overlap: Vec::new(),
            overlap_chars: 0,
            next_offset: 0,
            lines_read: 0,
            chunk_start_line: 0,
            stats: ChunkingStats::default(),
        }
    }

    /// Chunk text held in memory
    #[must_use]
    pub fn chunk_str(&self, text: &str) -> Vec<TextChunk> {
        let mut decoder = LineDecoder::new();
        let mut chunker = self.line_chunker();
        let mut chunks = Vec::new();

        for line in decoder.push(text.as_bytes()) {
            chunks.extend(chunker.push_line(line));
        }
        chunks.extend(decoder.finish().and_then(|line| chunker.push_line(line)));
        chunks.extend(chunker.finish());
        chunks
    }

    /// Chunk everything a reader yields
    pub fn chunk_reader<R: BufRead>(&self, mut reader: R) -> Result<Vec<TextChunk>> {
        let mut decoder = LineDecoder::new();
        let mut chunker = self.line_chunker();
        let mut chunks = Vec::new();

        loop {
            let block = reader.fill_buf()?;
            if block.is_empty() {
                break;
            }
            let consumed = block.len();
            for line in decoder.push(block) {
                chunks.extend(chunker.push_line(line));
            }
            reader.consume(consumed);
        }
        chunks.extend(decoder.finish().and_then(|line| chunker.push_line(line)));
        chunks.extend(chunker.finish());

        log::debug!("{}", chunker.stats());
        Ok(chunks)
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Get statistics about already produced chunks
    #[must_use]
    pub fn get_stats(chunks: &[TextChunk]) -> ChunkingStats {
        ChunkingStats {
            total_chunks: chunks.len(),
            document_lines: chunks.last().map_or(0, |c| c.end_line + 1),
            emitted_lines: chunks.iter().map(TextChunk::line_count).sum(),
            document_chars: chunks
                .last()
                .map_or(0, |c| c.global_offset + c.char_len()),
        }
    }
}

/// Incremental chunk builder; feed lines in document order, collect chunks as they fill.
///
/// State is local to one stream: the accumulation buffer, the overlap buffer carried over
/// from the previous chunk, the absolute offset of the next unread line and the line
/// counter. Lines must not contain `\n`.
#[derive(Debug)]
pub struct LineChunker {
    config: ChunkerConfig,
    pending: Vec<String>,
    pending_chars: usize,
    overlap: Vec<String>,
    overlap_chars: usize,
    next_offset: usize,
    lines_read: usize,
    chunk_start_line: usize,
    stats: ChunkingStats,
}

impl LineChunker {
    /// Append one line; returns a chunk once `chunk_size` new lines have accumulated.
    pub fn push_line(&mut self, line: impl Into<String>) -> Option<TextChunk> {
        let line = line.into();
        self.pending_chars += line.chars().count() + 1;
        self.pending.push(line);
        self.lines_read += 1;

        if self.pending.len() >= self.config.chunk_size {
            Some(self.emit())
        } else {
            None
        }
    }

    /// Flush whatever is still buffered at end of stream.
    pub fn finish(&mut self) -> Option<TextChunk> {
        if self.pending.is_empty() && self.overlap.is_empty() {
            return None;
        }
        let chunk = self.emit();
        self.overlap.clear();
        self.overlap_chars = 0;
        Some(chunk)
    }

    /// Counters for everything emitted so far
    #[must_use]
    pub const fn stats(&self) -> &ChunkingStats {
        &self.stats
    }

    fn emit(&mut self) -> TextChunk {
        let mut content = String::with_capacity(
            self.overlap.iter().chain(&self.pending).map(|l| l.len() + 1).sum(),
        );
        for line in self.overlap.iter().chain(&self.pending) {
            content.push_str(line);
            content.push('\n');
        }

        // The overlap prefix was already counted when its lines were first read.
        let chunk = TextChunk::new(
            content,
            self.chunk_start_line,
            self.lines_read.saturating_sub(1),
            self.next_offset - self.overlap_chars,
        );
        self.next_offset += self.pending_chars;

        if !self.pending.is_empty() {
            let keep = self.config.overlap.min(self.pending.len());
            let tail = self.pending.split_off(self.pending.len() - keep);
            self.overlap_chars = tail.iter().map(|l| l.chars().count() + 1).sum();
            self.overlap = tail;
        }
        self.chunk_start_line = self.lines_read - self.overlap.len();
        self.pending.clear();
        self.pending_chars = 0;

        self.stats.total_chunks += 1;
        self.stats.document_lines = self.lines_read;
        self.stats.emitted_lines += chunk.line_count();
        self.stats.document_chars = self.next_offset;

        chunk
    }
}

/// Statistics about chunking results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    /// Distinct lines of the source document
    pub document_lines: usize,
    /// Lines across all chunks, overlap counted every time it is repeated
    pub emitted_lines: usize,
    pub document_chars: usize,
}

impl ChunkingStats {
    /// Lines emitted more than once because of overlap
    #[must_use]
    pub const fn duplicated_lines(&self) -> usize {
        self.emitted_lines.saturating_sub(self.document_lines)
    }
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} | Lines: {} | Repeated: {} | Chars: {}",
            self.total_chunks,
            self.document_lines,
            self.duplicated_lines(),
            self.document_chars
        )
    }
}
