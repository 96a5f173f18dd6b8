//! # shell-term
//!
//! Terminal engine over an interactive remote shell.
//!
//! This crate turns the raw, possibly interrupted byte stream of a remote
//! shell into a styled, scrollable character grid, and manages the
//! connect, disconnect and reconnect lifecycle of the transport session
//! underneath it.
//!
//! ## Features
//!
//! - **ANSI interpretation**: SGR colors and bold, clear-screen, clear-line
//!   and cursor-home; everything else is passed through or dropped
//! - **Scrollback grid**: bounded ring of styled rows with cursor state
//! - **Session pool**: one registry for server and per-navigation keys,
//!   with idle and liveness eviction
//! - **Stream controller**: polling read loop plus a two-level reconnect
//!   (session, then channel) guarded against concurrent attempts
//! - **Line editing helpers**: command history and prefix completion
//! - **Local transport**: portable-pty backed shells for running without
//!   a remote host
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use shell_term::{LocalConnector, SessionKey, SessionRegistry, ShellStreamController, StreamConfig};
//!
//! #[tokio::main]
//! async fn main() -> shell_term::Result<()> {
//!     // Initialize logging
//!     shell_term::logging::try_init().ok();
//!
//!     // The registry is shared by every controller
//!     let registry = Arc::new(SessionRegistry::new());
//!
//!     let controller = ShellStreamController::new(
//!         SessionKey::server("local"),
//!         Arc::clone(&registry),
//!         Arc::new(LocalConnector::new("/bin/sh")),
//!         StreamConfig::default(),
//!     );
//!
//!     controller.connect().await?;
//!     controller.send_line("ls").await?;
//!     println!("{}", controller.plain_text()?);
//!
//!     controller.shutdown().await?;
//!     registry.clear()?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod input;
pub mod logging;
pub mod output;
pub mod pty;
pub mod session;
pub mod stream;

// Re-export commonly used types
pub use error::{Result, ShellTermError};
pub use execution::{Command, CommandRunner, ExecutionResult};
pub use input::{AutoComplete, CommandHistory};
pub use output::{AnsiInterpreter, Color, StyledCell, TerminalBuffer, TextSegment};
pub use pty::{LocalConnector, LocalTransport, PtySize};
pub use session::{
    Channel, ChannelState, SessionConnector, SessionId, SessionKey, SessionRegistry,
    TransportSession,
};
pub use stream::{ControlChar, ReconnectOutcome, ShellStreamController, StreamConfig};
