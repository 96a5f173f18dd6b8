//! Pseudo-terminal plumbing.
//!
//! [`PtySize`] is the terminal geometry requested when a channel opens.
//! The local transport runs shells on this machine through portable-pty,
//! which covers both Unix PTY and Windows ConPTY.

mod local;
mod pump;

pub use local::{default_shell, LocalChannel, LocalConnector, LocalTransport};
pub use pump::{spawn_pump, Inbox, READ_BUFFER_SIZE};

/// Size of a PTY in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtySize {
    /// Number of rows (height).
    pub rows: u16,
    /// Number of columns (width).
    pub cols: u16,
}

impl PtySize {
    /// Create a new PtySize with the given dimensions.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for PtySize {
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pty_size_default() {
        let size = PtySize::default();
        assert_eq!(size.rows, 24);
        assert_eq!(size.cols, 80);
    }

    #[test]
    fn test_pty_size_new() {
        let size = PtySize::new(40, 120);
        assert_eq!(size.rows, 40);
        assert_eq!(size.cols, 120);
    }

    #[test]
    fn test_pty_size_equality() {
        let size1 = PtySize::new(24, 80);
        let size2 = PtySize::default();
        assert_eq!(size1, size2);

        let size3 = PtySize::new(30, 100);
        assert_ne!(size1, size3);
    }
}
