//! Command execution helper.
//!
//! The engine treats command execution as a black box behind
//! [`CommandRunner`]; this module adds deadline handling on top of it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use shell_term::execution::{execute_with_timeout, Command, CommandRunner};
//! use shell_term::pty::LocalTransport;
//!
//! # async fn run() -> shell_term::Result<()> {
//! let runner: Arc<dyn CommandRunner> = Arc::new(LocalTransport::new());
//! let cmd = Command::new("uname -a").timeout(Duration::from_secs(5));
//! let result = execute_with_timeout(runner, cmd).await?;
//! println!("Output: {}", result.output_trimmed());
//! # Ok(())
//! # }
//! ```

mod command;
mod executor;
mod result;

pub use command::Command;
pub use executor::{execute, execute_with_timeout, CommandRunner, DEFAULT_TIMEOUT};
pub use result::ExecutionResult;
