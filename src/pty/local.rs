//! Local transport backed by portable-pty.
//!
//! Spawns shells on this machine so the engine can run without a remote
//! host. Each interactive channel is one shell process in its own PTY.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use portable_pty::{native_pty_system, CommandBuilder, PtyPair, PtySize as NativePtySize};
use tracing::{debug, info};

use super::pump::{spawn_pump, Inbox};
use super::PtySize;
use crate::error::ShellTermError;
use crate::execution::{Command, CommandRunner, ExecutionResult};
use crate::session::{Channel, SessionConnector, SharedChannel, SharedSession, TransportSession};
use crate::Result;

/// Get the default shell for the current platform.
pub fn default_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
    #[cfg(windows)]
    {
        "powershell.exe".to_string()
    }
}

fn open_pair(size: PtySize) -> Result<PtyPair> {
    let native_size = NativePtySize {
        rows: size.rows,
        cols: size.cols,
        pixel_width: 0,
        pixel_height: 0,
    };

    native_pty_system()
        .openpty(native_size)
        .map_err(|e| ShellTermError::Pty(e.to_string()))
}

/// A "session" on the local machine.
///
/// It is connected from creation until [`close`](TransportSession::close).
pub struct LocalTransport {
    shell: String,
    connected: AtomicBool,
}

impl LocalTransport {
    /// Transport using [`default_shell`].
    pub fn new() -> Self {
        Self::with_shell(default_shell())
    }

    /// Transport spawning `shell` for every channel.
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            connected: AtomicBool::new(true),
        }
    }

    /// Shell command used for channels.
    pub fn shell(&self) -> &str {
        &self.shell
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ShellTermError::Transport("local session closed".into()))
        }
    }
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportSession for LocalTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn open_interactive_channel(&self, size: PtySize) -> Result<SharedChannel> {
        self.ensure_connected()?;

        let pair = open_pair(size)?;
        let child = pair
            .slave
            .spawn_command(CommandBuilder::new(&self.shell))
            .map_err(|e| ShellTermError::Channel(e.to_string()))?;
        // The reader only sees EOF once every slave handle is gone
        drop(pair.slave);

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| ShellTermError::Pty(e.to_string()))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| ShellTermError::Pty(e.to_string()))?;

        let inbox = Inbox::new();
        spawn_pump(reader, Arc::clone(&inbox))?;

        info!(
            "Opened local channel: {} ({}x{}, pid {:?})",
            self.shell,
            size.rows,
            size.cols,
            child.process_id()
        );

        Ok(Arc::new(LocalChannel {
            inbox,
            closed: AtomicBool::new(false),
            writer: Mutex::new(writer),
            child: Mutex::new(child),
            _master: Mutex::new(pair.master),
        }))
    }

    fn close(&self) -> Result<()> {
        if self.connected.swap(false, Ordering::SeqCst) {
            debug!("Local session closed");
        }
        Ok(())
    }
}

impl CommandRunner for LocalTransport {
    /// Run `shell -c <command>` in a fresh PTY, killing it at the deadline.
    fn run(&self, command: &Command) -> Result<ExecutionResult> {
        self.ensure_connected()?;

        let start = Instant::now();
        let deadline = command.effective_timeout();

        let pair = open_pair(PtySize::default())?;
        let mut cmd = CommandBuilder::new(&self.shell);
        #[cfg(unix)]
        cmd.arg("-c");
        #[cfg(windows)]
        cmd.arg("-Command");
        cmd.arg(&command.command_line);

        let mut child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| ShellTermError::ExecutionFailed(e.to_string()))?;
        drop(pair.slave);

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| ShellTermError::Pty(e.to_string()))?;
        let inbox = Inbox::new();
        let pump = spawn_pump(reader, Arc::clone(&inbox))?;

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if start.elapsed() > deadline {
                let _ = child.kill();
                return Err(ShellTermError::Timeout);
            }
            std::thread::sleep(Duration::from_millis(10));
        };

        // Drain whatever the child wrote before exiting
        drop(pair.master);
        let _ = pump.join();

        let raw = inbox.take(usize::MAX);
        Ok(ExecutionResult::from_raw(raw, start.elapsed()).with_exit_code(exit_code_of(&status)))
    }
}

fn exit_code_of(status: &portable_pty::ExitStatus) -> i32 {
    if status.success() {
        0
    } else {
        i32::try_from(status.exit_code()).unwrap_or(i32::MAX)
    }
}

/// One local shell process behind a PTY.
pub struct LocalChannel {
    inbox: Arc<Inbox>,
    closed: AtomicBool,
    writer: Mutex<Box<dyn Write + Send>>,
    child: Mutex<Box<dyn portable_pty::Child + Send + Sync>>,
    _master: Mutex<Box<dyn portable_pty::MasterPty + Send>>,
}

impl Channel for LocalChannel {
    fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::SeqCst) && !self.inbox.is_eof()
    }

    fn readable_byte_count(&self) -> usize {
        self.inbox.len()
    }

    fn read_chunk(&self, max_bytes: usize) -> Result<Vec<u8>> {
        Ok(self.inbox.take(max_bytes))
    }

    fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if !self.is_connected() {
            return Err(ShellTermError::NotConnected);
        }
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ShellTermError::LockPoisoned)?;
        writer.write_all(bytes)?;
        writer.flush()?;
        Ok(())
    }

    fn exit_code(&self) -> Option<i32> {
        let mut child = self.child.lock().ok()?;
        child
            .try_wait()
            .ok()
            .flatten()
            .map(|status| exit_code_of(&status))
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut child = self
            .child
            .lock()
            .map_err(|_| ShellTermError::LockPoisoned)?;
        if let Ok(None) = child.try_wait() {
            // Already-exited children make kill fail; that is fine
            let _ = child.kill();
        }
        debug!("Local channel closed");
        Ok(())
    }
}

/// Connector handing out fresh [`LocalTransport`]s.
pub struct LocalConnector {
    shell: String,
}

impl LocalConnector {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl SessionConnector for LocalConnector {
    fn connect(&self) -> Result<SharedSession> {
        Ok(Arc::new(LocalTransport::with_shell(self.shell.clone())))
    }
}
