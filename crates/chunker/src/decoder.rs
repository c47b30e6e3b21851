/// Turns arbitrarily split byte blocks into complete lines.
///
/// Lines end at `\n`; a single trailing `\r` is dropped so CRLF documents produce the same
/// lines as LF ones. Invalid UTF-8 is replaced with U+FFFD rather than failing the stream.
#[derive(Debug, Default)]
pub struct LineDecoder {
    partial: Vec<u8>,
    bytes_seen: u64,
}

impl LineDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one block; returns every line completed by it.
    pub fn push(&mut self, block: &[u8]) -> Vec<String> {
        self.bytes_seen += block.len() as u64;

        let mut lines = Vec::new();
        let mut rest = block;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            if self.partial.is_empty() {
                lines.push(decode_line(head));
            } else {
                self.partial.extend_from_slice(head);
                lines.push(decode_line(&self.partial));
                self.partial.clear();
            }
            rest = &tail[1..];
        }
        self.partial.extend_from_slice(rest);

        lines
    }

    /// Flush the unterminated last line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            return None;
        }
        let line = decode_line(&self.partial);
        self.partial.clear();
        Some(line)
    }

    /// Total bytes pushed so far
    #[must_use]
    pub const fn bytes_seen(&self) -> u64 {
        self.bytes_seen
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
