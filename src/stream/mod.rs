//! Streaming a remote shell into a terminal buffer.
//!
//! [`ShellStreamController`] opens an interactive channel on a pooled
//! transport session, polls it for output, and feeds the output through
//! the ANSI interpreter into a [`TerminalBuffer`](crate::output::TerminalBuffer).
//! When the channel ends it reopens it on the same session, or falls back
//! to `Disconnected` once the session itself is gone.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shell_term::pty::LocalConnector;
//! use shell_term::session::{SessionKey, SessionRegistry};
//! use shell_term::stream::{ShellStreamController, StreamConfig};
//!
//! # async fn run() -> shell_term::Result<()> {
//! let registry = Arc::new(SessionRegistry::new());
//! let controller = ShellStreamController::new(
//!     SessionKey::server("local"),
//!     registry,
//!     Arc::new(LocalConnector::new("/bin/sh")),
//!     StreamConfig::default(),
//! );
//!
//! controller.connect().await?;
//! controller.send_line("echo hello").await?;
//! println!("{}", controller.plain_text()?);
//! controller.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod controller;
mod keys;
mod output;

pub use controller::{ReconnectOutcome, ShellStreamController, StreamConfig};
pub use keys::{ArrowKey, ControlChar};
pub use output::{process_output, Utf8Decoder};
