//! Bounded scrollback grid of styled cells.

use std::collections::VecDeque;

use super::ansi::{AnsiEvent, AnsiInterpreter, ControlSignal};
use super::style::{Style, StyledCell};

/// Number of blank cells a tab expands to.
pub const TAB_WIDTH: usize = 4;

/// Terminal buffer holding `capacity_rows` rows of at most `capacity_cols`
/// cells each.
///
/// Rows live in a ring: a line feed on the last row drops the oldest row
/// and appends an empty one, so memory stays bounded no matter how much
/// output arrives.
#[derive(Debug, Clone)]
pub struct TerminalBuffer {
    rows: VecDeque<Vec<StyledCell>>,
    capacity_rows: usize,
    capacity_cols: usize,
    cursor_row: usize,
    cursor_col: usize,
    pending_style: Style,
    /// Unterminated escape from the previous write.
    pending_escape: String,
}

impl TerminalBuffer {
    /// Create an empty buffer. Zero dimensions are raised to one.
    pub fn new(capacity_rows: usize, capacity_cols: usize) -> Self {
        let capacity_rows = capacity_rows.max(1);
        let capacity_cols = capacity_cols.max(1);
        Self {
            rows: empty_grid(capacity_rows),
            capacity_rows,
            capacity_cols,
            cursor_row: 0,
            cursor_col: 0,
            pending_style: Style::default(),
            pending_escape: String::new(),
        }
    }

    /// Interpret `text` and apply it at the cursor.
    ///
    /// An escape sequence cut off at the end of `text` is held back and
    /// completed by the next write.
    pub fn write(&mut self, text: &str) {
        let mut input = self.take_pending_escape();
        input.push_str(text);
        if let Some(at) = AnsiInterpreter::incomplete_tail(&input) {
            self.pending_escape = input.split_off(at);
        }
        self.apply(&input);
    }

    /// Apply a held-back escape as literal text. Used at end of stream.
    pub fn flush_pending_escape(&mut self) {
        let tail = self.take_pending_escape();
        if !tail.is_empty() {
            self.apply(&tail);
        }
    }

    /// Remove and return the held-back escape, if any.
    pub fn take_pending_escape(&mut self) -> String {
        std::mem::take(&mut self.pending_escape)
    }

    fn apply(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let (events, style) = AnsiInterpreter::parse_with_style(text, self.pending_style);

        for event in events {
            match event {
                AnsiEvent::Text(segment) => {
                    self.pending_style = segment.style;
                    for c in segment.text.chars() {
                        self.write_char(c);
                    }
                }
                AnsiEvent::Control(ControlSignal::ClearScreen) => self.clear_screen(),
                AnsiEvent::Control(ControlSignal::ClearLine) => self.clear_line(),
                AnsiEvent::Control(ControlSignal::CursorHome) => self.cursor_home(),
                AnsiEvent::Control(
                    ControlSignal::ResetAll
                    | ControlSignal::ResetColor
                    | ControlSignal::ResetBgColor
                    | ControlSignal::Bold,
                ) => {}
            }
        }

        self.pending_style = style;
    }

    /// Apply a single character in the pending style.
    pub fn write_char(&mut self, c: char) {
        match c {
            '\n' => self.new_line(),
            '\r' => self.cursor_col = 0,
            '\t' => {
                for _ in 0..TAB_WIDTH {
                    self.put(' ');
                }
            }
            _ => self.put(c),
        }
    }

    fn put(&mut self, c: char) {
        let cell = StyledCell::new(c, self.pending_style);
        let col = self.cursor_col;
        let row = &mut self.rows[self.cursor_row];

        if row.len() < col {
            row.resize(col, StyledCell::blank());
        }
        if col < row.len() {
            row[col] = cell;
        } else {
            row.push(cell);
        }

        self.cursor_col += 1;
        if self.cursor_col >= self.capacity_cols {
            self.new_line();
        }
    }

    /// Move to the start of the next row, scrolling when on the last row.
    pub fn new_line(&mut self) {
        self.cursor_col = 0;
        if self.cursor_row + 1 < self.capacity_rows {
            self.cursor_row += 1;
        } else {
            self.rows.pop_front();
            self.rows.push_back(Vec::new());
            self.cursor_row = self.capacity_rows - 1;
        }
    }

    /// Discard every row and home the cursor.
    pub fn clear_screen(&mut self) {
        self.rows = empty_grid(self.capacity_rows);
        self.cursor_row = 0;
        self.cursor_col = 0;
    }

    /// Erase from the cursor to the end of the current row.
    pub fn clear_line(&mut self) {
        let col = self.cursor_col;
        self.rows[self.cursor_row].truncate(col);
    }

    /// Move the cursor to the top-left cell.
    pub fn cursor_home(&mut self) {
        self.cursor_row = 0;
        self.cursor_col = 0;
    }

    /// Copy of every row, oldest first.
    pub fn all_rows(&self) -> Vec<Vec<StyledCell>> {
        self.rows.iter().cloned().collect()
    }

    /// The last `n` rows ending at the cursor or the last written row,
    /// whichever is lower.
    pub fn visible_rows(&self, n: usize) -> Vec<Vec<StyledCell>> {
        let bottom = self.last_content_row().map_or(self.cursor_row, |last| {
            last.max(self.cursor_row)
        });
        let start = (bottom + 1).saturating_sub(n);
        self.rows.range(start..=bottom).cloned().collect()
    }

    /// Text of the buffer with styling dropped.
    ///
    /// Rows are joined with `\n`; empty rows after the last written row are
    /// omitted.
    pub fn plain_text(&self) -> String {
        let Some(last) = self.last_content_row() else {
            return String::new();
        };

        self.rows
            .range(..=last)
            .map(|row| row.iter().map(|cell| cell.character).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text of a single row, if it exists.
    pub fn row_text(&self, row: usize) -> Option<String> {
        self.rows
            .get(row)
            .map(|cells| cells.iter().map(|cell| cell.character).collect())
    }

    fn last_content_row(&self) -> Option<usize> {
        self.rows.iter().rposition(|row| !row.is_empty())
    }

    /// Cursor position as `(row, col)`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    /// Buffer dimensions as `(rows, cols)`.
    pub fn capacity(&self) -> (usize, usize) {
        (self.capacity_rows, self.capacity_cols)
    }

    /// Number of rows currently held.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rendition applied to the next written character.
    pub fn pending_style(&self) -> Style {
        self.pending_style
    }

    /// Whether nothing has been written since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.last_content_row().is_none()
    }
}

fn empty_grid(rows: usize) -> VecDeque<Vec<StyledCell>> {
    (0..rows).map(|_| Vec::new()).collect()
}
