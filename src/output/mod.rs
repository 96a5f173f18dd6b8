//! Output processing.
//!
//! This module turns raw shell output into a renderable grid:
//! - ANSI escape interpretation and stripping
//! - A bounded scrollback buffer of styled cells
//!
//! # Example
//!
//! ```
//! use shell_term::output::{AnsiInterpreter, TerminalBuffer};
//!
//! // Strip ANSI codes from raw output
//! let clean = AnsiInterpreter::strip_ansi("\x1b[31mRed text\x1b[0m");
//! assert_eq!(clean, "Red text");
//!
//! // Feed output into a scrollback grid
//! let mut buffer = TerminalBuffer::new(500, 80);
//! buffer.write("Hello\r\nWorld");
//! assert_eq!(buffer.plain_text(), "Hello\nWorld");
//! ```

mod ansi;
mod buffer;
mod style;

pub use ansi::{AnsiEvent, AnsiInterpreter, ControlSignal, TextSegment};
pub use buffer::{TerminalBuffer, TAB_WIDTH};
pub use style::{Color, Style, StyledCell};
