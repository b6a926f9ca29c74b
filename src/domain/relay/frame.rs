//! Line reassembly over arbitrary network reads.
//!
//! Upstream reads never line up with event boundaries, so each read is
//! appended to a retained tail and only newline-terminated lines leave the
//! decoder. Multi-byte characters split across reads are held back as raw
//! bytes until the rest of the sequence arrives.

/// Incremental UTF-8 line decoder for one relay invocation
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Unterminated tail of the last read
    buffer: String,
    /// Leading bytes of a character whose remaining bytes have not arrived
    incomplete_utf8: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one read and return every line it completed, in order, without
    /// the trailing `\n`.
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<String> {
        self.push_bytes(chunk);

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };

        let tail = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, tail);

        complete[..last_newline]
            .split('\n')
            .map(str::to_owned)
            .collect()
    }

    /// Text retained for the next read
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// End of input. Whatever is still buffered has no line terminator and is
    /// dropped; the number of dropped bytes is returned.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buffer.len() + self.incomplete_utf8.len();
        self.buffer.clear();
        self.incomplete_utf8.clear();
        dropped
    }

    fn push_bytes(&mut self, chunk: &[u8]) {
        let joined;
        let mut rest: &[u8] = if self.incomplete_utf8.is_empty() {
            chunk
        } else {
            let mut bytes = std::mem::take(&mut self.incomplete_utf8);
            bytes.extend_from_slice(chunk);
            joined = bytes;
            &joined
        };

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    return;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    self.buffer.push_str(&String::from_utf8_lossy(valid));

                    match e.error_len() {
                        Some(invalid_len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[invalid_len..];
                        }
                        None => {
                            self.incomplete_utf8 = after.to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }
}
