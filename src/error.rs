//! Error types for shell-term.

use thiserror::Error;

/// Main error type for shell-term operations.
#[derive(Error, Debug)]
pub enum ShellTermError {
    /// Transport session could not be (re)established.
    #[error("transport error: {0}")]
    Transport(String),

    /// Interactive channel open/read/write failure.
    #[error("channel error: {0}")]
    Channel(String),

    /// Operation attempted while no channel is connected.
    #[error("not connected")]
    NotConnected,

    /// Command execution timeout.
    #[error("command execution timeout")]
    Timeout,

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// Text that does not name a pool key.
    #[error("invalid session key: {0}")]
    InvalidSessionKey(String),

    /// Invalid state transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: crate::session::ChannelState,
        to: crate::session::ChannelState,
    },

    /// PTY-related error.
    #[error("PTY error: {0}")]
    Pty(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

/// Convenience Result type for shell-term operations.
pub type Result<T> = std::result::Result<T, ShellTermError>;
