//! Key sequences sent to a shell outside of line input.

/// Single-byte control characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlChar {
    /// Ctrl+C.
    Interrupt,
    /// Ctrl+D.
    Eof,
    /// Ctrl+L, asks most shells to redraw.
    FormFeed,
    /// Ctrl+Z.
    Suspend,
    /// Esc.
    Escape,
}

impl ControlChar {
    /// The byte written to the channel.
    pub fn as_byte(self) -> u8 {
        match self {
            ControlChar::Interrupt => 0x03,
            ControlChar::Eof => 0x04,
            ControlChar::FormFeed => 0x0c,
            ControlChar::Suspend => 0x1a,
            ControlChar::Escape => 0x1b,
        }
    }

    /// Map a `Ctrl+<letter>` chord to its control character, if known.
    pub fn from_ctrl_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'c' => Some(ControlChar::Interrupt),
            'd' => Some(ControlChar::Eof),
            'l' => Some(ControlChar::FormFeed),
            'z' => Some(ControlChar::Suspend),
            _ => None,
        }
    }
}

impl From<ControlChar> for u8 {
    fn from(c: ControlChar) -> Self {
        c.as_byte()
    }
}

/// Cursor keys in normal (non-application) mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowKey {
    Up,
    Down,
    Right,
    Left,
}

impl ArrowKey {
    /// CSI sequence for the key.
    pub fn sequence(self) -> &'static [u8] {
        match self {
            ArrowKey::Up => b"\x1b[A",
            ArrowKey::Down => b"\x1b[B",
            ArrowKey::Right => b"\x1b[C",
            ArrowKey::Left => b"\x1b[D",
        }
    }
}
