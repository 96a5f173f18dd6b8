//! Line-editing helpers for the input side of a terminal.

mod complete;
mod history;

pub use complete::{AutoComplete, COMMON_PATHS, DEFAULT_COMMANDS};
pub use history::{CommandHistory, DEFAULT_HISTORY_SIZE};
