//! Turning read chunks into buffer writes.

use crate::output::TerminalBuffer;

/// Sequences that, at the very start of a chunk, mean "redraw from scratch".
const LEADING_CLEAR: [&str; 4] = ["\x1b[2J", "\x1b[3J", "\x1b[H", "\x1b[1;1H"];

/// Apply one decoded chunk of shell output to `buffer`.
///
/// A chunk opening with clear-screen or cursor-home sequences (in any
/// combination) wipes the grid before the remainder is written, so full
/// screen redraws such as `clear` start on an empty buffer. An escape
/// held back from the previous chunk is joined to this one first.
pub fn process_output(buffer: &mut TerminalBuffer, chunk: &str) {
    let mut joined = buffer.take_pending_escape();
    joined.push_str(chunk);
    let mut rest = joined.as_str();
    let mut cleared = false;

    while let Some(stripped) = LEADING_CLEAR.iter().find_map(|p| rest.strip_prefix(p)) {
        rest = stripped;
        cleared = true;
    }

    if cleared {
        buffer.clear_screen();
    }
    if !rest.is_empty() {
        buffer.write(rest);
    }
}

/// Incremental UTF-8 decoder.
///
/// Reads are cut at arbitrary byte offsets; a multi-byte character split
/// across two chunks is held back until its tail arrives. Invalid bytes
/// become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes`, returning every complete character seen so far.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);

        let mut out = String::with_capacity(input.len());
        let mut rest = input.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Truncated sequence at the end of the chunk
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush held-back bytes at end of stream.
    pub fn finish(&mut self) -> String {
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }

    /// Number of bytes waiting for the rest of their character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
