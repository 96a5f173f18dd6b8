//! Submitted-command history with a read cursor.

use std::collections::VecDeque;

/// Default number of retained commands.
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Bounded history of submitted lines.
///
/// The cursor ranges over `0..=len`; `len` is the fresh input line.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    max_size: usize,
    cursor: usize,
}

impl CommandHistory {
    /// Create a history holding at most `max_size` entries (minimum one).
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size: max_size.max(1),
            cursor: 0,
        }
    }

    /// Record a submitted line.
    ///
    /// Blank lines and repeats of the newest entry are ignored. Returns
    /// whether the line was stored.
    pub fn add_command(&mut self, text: &str) -> bool {
        let line = text.trim();
        if line.is_empty() || self.entries.back().map(String::as_str) == Some(line) {
            return false;
        }

        self.entries.push_back(line.to_string());
        if self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len();
        true
    }

    /// Step back towards older entries.
    ///
    /// Returns `None` only when the history is empty; at the oldest entry it
    /// keeps returning that entry.
    pub fn get_previous(&mut self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        self.entries.get(self.cursor).cloned()
    }

    /// Step forward towards newer entries.
    ///
    /// Past the newest entry this returns an empty string (the blank
    /// prompt), never `None`.
    pub fn get_next(&mut self) -> String {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            self.entries[self.cursor].clone()
        } else {
            self.cursor = self.entries.len();
            String::new()
        }
    }

    /// Move the cursor back to the fresh input line.
    pub fn reset_cursor(&mut self) {
        self.cursor = self.entries.len();
    }

    /// All entries, oldest first.
    pub fn get_all_history(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}
