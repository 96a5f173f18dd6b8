//! Capabilities consumed from the transport layer.
//!
//! The engine never authenticates or sees credentials. It receives an open
//! [`TransportSession`], opens [`Channel`]s on it, and asks a
//! [`SessionConnector`] for a fresh session when the old one drops.
//!
//! Connecting, opening a channel, writing and closing may block; the engine
//! runs those on the blocking pool. The status queries (`is_connected`,
//! `readable_byte_count`, `exit_code`) and `read_chunk` are called straight
//! from async tasks and must return without waiting on the network.

use std::sync::Arc;

use crate::pty::PtySize;
use crate::Result;

/// Shared handle to a transport session.
pub type SharedSession = Arc<dyn TransportSession>;

/// Shared handle to an interactive channel.
pub type SharedChannel = Arc<dyn Channel>;

/// An authenticated connection able to host interactive channels.
pub trait TransportSession: Send + Sync {
    /// Whether the underlying connection is still up. Must not block.
    fn is_connected(&self) -> bool;

    /// Open a shell channel with a pseudo-terminal of `size`. May block.
    fn open_interactive_channel(&self, size: PtySize) -> Result<SharedChannel>;

    /// Close the connection. May block. Closing twice is not an error.
    fn close(&self) -> Result<()>;
}

/// Bidirectional byte stream to one remote shell.
pub trait Channel: Send + Sync {
    /// Whether the remote end is still attached. Must not block.
    fn is_connected(&self) -> bool;

    /// Bytes that can be read without blocking. Must not block.
    fn readable_byte_count(&self) -> usize;

    /// Read at most `max_bytes` already-available bytes. Must not wait for
    /// more data.
    fn read_chunk(&self, max_bytes: usize) -> Result<Vec<u8>>;

    /// Write `bytes` to the shell's input. May block.
    fn write_bytes(&self, bytes: &[u8]) -> Result<()>;

    /// Exit status of the remote shell, once it has exited. Must not block.
    fn exit_code(&self) -> Option<i32>;

    /// Close the channel. May block. Closing twice is not an error.
    fn close(&self) -> Result<()>;
}

/// Source of freshly authenticated sessions, supplied by the caller.
pub trait SessionConnector: Send + Sync {
    /// Establish a new transport session. May block.
    fn connect(&self) -> Result<SharedSession>;
}

impl<F> SessionConnector for F
where
    F: Fn() -> Result<SharedSession> + Send + Sync,
{
    fn connect(&self) -> Result<SharedSession> {
        self()
    }
}
