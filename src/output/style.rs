//! Colors, text style and grid cells.

use serde::Serialize;

/// One of the sixteen fixed terminal colors addressable through basic SGR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

const STANDARD: [Color; 8] = [
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::White,
];

const BRIGHT: [Color; 8] = [
    Color::BrightBlack,
    Color::BrightRed,
    Color::BrightGreen,
    Color::BrightYellow,
    Color::BrightBlue,
    Color::BrightMagenta,
    Color::BrightCyan,
    Color::BrightWhite,
];

impl Color {
    /// Standard palette entry for `index` (SGR 30–37 / 40–47 minus the base).
    pub fn standard(index: u16) -> Option<Color> {
        STANDARD.get(usize::from(index)).copied()
    }

    /// Bright palette entry for `index` (SGR 90–97 / 100–107 minus the base).
    pub fn bright(index: u16) -> Option<Color> {
        BRIGHT.get(usize::from(index)).copied()
    }

    /// Whether this color comes from the bright palette.
    pub fn is_bright(&self) -> bool {
        BRIGHT.contains(self)
    }

    /// RGB value used when rendering this color.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Black => (0, 0, 0),
            Color::Red => (205, 49, 49),
            Color::Green => (13, 188, 121),
            Color::Yellow => (229, 229, 16),
            Color::Blue => (36, 114, 200),
            Color::Magenta => (188, 63, 188),
            Color::Cyan => (17, 168, 205),
            Color::White => (229, 229, 229),
            Color::BrightBlack => (102, 102, 102),
            Color::BrightRed => (241, 76, 76),
            Color::BrightGreen => (35, 209, 139),
            Color::BrightYellow => (245, 245, 67),
            Color::BrightBlue => (59, 142, 234),
            Color::BrightMagenta => (214, 112, 214),
            Color::BrightCyan => (41, 184, 219),
            Color::BrightWhite => (255, 255, 255),
        }
    }
}

/// Graphic rendition state shared by segments and cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Style {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
}

impl Style {
    /// Whether this is the terminal's default rendition.
    pub fn is_plain(&self) -> bool {
        *self == Style::default()
    }
}

/// A single character cell in the terminal grid.
///
/// Cells are values: writing to a position replaces the whole cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyledCell {
    pub character: char,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
}

impl StyledCell {
    /// Create a cell carrying `character` in `style`.
    pub fn new(character: char, style: Style) -> Self {
        Self {
            character,
            foreground: style.foreground,
            background: style.background,
            bold: style.bold,
        }
    }

    /// An unstyled space, used to pad rows.
    pub fn blank() -> Self {
        Self::new(' ', Style::default())
    }

    /// The rendition of this cell.
    pub fn style(&self) -> Style {
        Style {
            foreground: self.foreground,
            background: self.background,
            bold: self.bold,
        }
    }
}

impl Default for StyledCell {
    fn default() -> Self {
        Self::blank()
    }
}
