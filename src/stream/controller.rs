//! Shell stream controller.
//!
//! Owns one interactive channel at a time, pumps its output into a
//! [`TerminalBuffer`], and recovers from dropped channels and sessions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::output::{process_output, Utf8Decoder};
use crate::error::ShellTermError;
use crate::input::{CommandHistory, DEFAULT_HISTORY_SIZE};
use crate::output::{StyledCell, TerminalBuffer};
use crate::pty::PtySize;
use crate::session::{
    ChannelState, SessionConnector, SessionKey, SessionRegistry, SharedChannel, SharedSession,
};
use crate::Result;

/// Tunables for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// PTY geometry requested when opening a channel.
    pub pty_size: PtySize,
    /// Scrollback rows kept by the terminal buffer.
    pub buffer_rows: usize,
    /// Columns per buffer row.
    pub buffer_cols: usize,
    /// Largest single read from the channel.
    pub chunk_size: usize,
    /// Sleep between polls when no bytes are available.
    pub poll_interval: Duration,
    /// Commands remembered by the history.
    pub history_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            pty_size: PtySize::default(),
            buffer_rows: 500,
            buffer_cols: 80,
            chunk_size: 4096,
            poll_interval: Duration::from_millis(20),
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

/// Result of a connect or reconnect request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectOutcome {
    /// A channel is open and streaming.
    Connected,
    /// Another reconnection was already running; this request was ignored.
    AlreadyInProgress,
}

/// The open channel and the means to stop its reader.
struct Link {
    channel: SharedChannel,
    cancel: CancellationToken,
    reader: JoinHandle<()>,
}

/// Clears the reconnection flag when dropped.
struct ReconnectGuard<'a>(&'a AtomicBool);

impl<'a> ReconnectGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ReconnectGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Inner {
    key: SessionKey,
    registry: Arc<SessionRegistry>,
    connector: Arc<dyn SessionConnector>,
    config: StreamConfig,
    session: Mutex<Option<SharedSession>>,
    link: Mutex<Option<Link>>,
    buffer: Arc<Mutex<TerminalBuffer>>,
    history: Mutex<CommandHistory>,
    state: watch::Sender<ChannelState>,
    last_error: Mutex<Option<String>>,
    reconnecting: AtomicBool,
    closed: AtomicBool,
}

/// Streams one remote shell into a terminal buffer.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct ShellStreamController {
    inner: Arc<Inner>,
}

impl ShellStreamController {
    /// Create a disconnected controller for the session pooled under `key`.
    ///
    /// `connector` is used whenever the pooled session is missing or down.
    pub fn new(
        key: SessionKey,
        registry: Arc<SessionRegistry>,
        connector: Arc<dyn SessionConnector>,
        config: StreamConfig,
    ) -> Self {
        let (state, _) = watch::channel(ChannelState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                key,
                registry,
                connector,
                config,
                session: Mutex::new(None),
                link: Mutex::new(None),
                buffer: Arc::new(Mutex::new(TerminalBuffer::new(
                    config.buffer_rows,
                    config.buffer_cols,
                ))),
                history: Mutex::new(CommandHistory::new(config.history_size)),
                state,
                last_error: Mutex::new(None),
                reconnecting: AtomicBool::new(false),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Open a streaming channel, establishing the session first if needed.
    pub async fn connect(&self) -> Result<ReconnectOutcome> {
        self.reconnect().await
    }

    /// Re-establish the channel, and the session when it is down.
    ///
    /// Only one reconnection runs at a time; a request made while one is in
    /// flight returns [`ReconnectOutcome::AlreadyInProgress`] without doing
    /// anything.
    pub async fn reconnect(&self) -> Result<ReconnectOutcome> {
        let Some(_guard) = ReconnectGuard::acquire(&self.inner.reconnecting) else {
            debug!("Reconnect for {} already in progress, ignoring", self.inner.key);
            return Ok(ReconnectOutcome::AlreadyInProgress);
        };

        self.inner.establish().await?;
        Ok(ReconnectOutcome::Connected)
    }

    /// Submit a command line.
    ///
    /// Blank input is ignored. The line is recorded in history even when it
    /// cannot be sent; if the channel is not streaming a reconnect is
    /// attempted and the line is dropped.
    pub async fn send_line(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        self.inner.with_history(|history| {
            history.add_command(text);
        })?;

        if !self.state().is_streaming() {
            debug!("Not streaming, dropping line and reconnecting");
            if let Err(e) = self.reconnect().await {
                warn!("Reconnect after dropped line failed: {}", e);
            }
            return Ok(());
        }

        let mut bytes = Vec::with_capacity(text.len() + 1);
        bytes.extend_from_slice(text.as_bytes());
        bytes.push(b'\n');
        self.inner.write(bytes).await
    }

    /// Write `bytes` verbatim, bypassing history.
    pub async fn send_raw_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.inner.write(bytes.to_vec()).await
    }

    /// Write a single control byte such as Ctrl+C.
    pub async fn send_control_char(&self, code: impl Into<u8>) -> Result<()> {
        self.inner.write(vec![code.into()]).await
    }

    /// Current channel state.
    pub fn state(&self) -> ChannelState {
        *self.inner.state.borrow()
    }

    /// Receiver notified on every state change.
    pub fn subscribe_state(&self) -> watch::Receiver<ChannelState> {
        self.inner.state.subscribe()
    }

    /// Message of the most recent connection failure, cleared on success.
    pub fn last_error(&self) -> Option<String> {
        self.inner
            .last_error
            .lock()
            .ok()
            .and_then(|error| error.clone())
    }

    /// Key of the pooled session this controller uses.
    pub fn key(&self) -> &SessionKey {
        &self.inner.key
    }

    /// Shared handle to the terminal buffer.
    pub fn buffer(&self) -> Arc<Mutex<TerminalBuffer>> {
        Arc::clone(&self.inner.buffer)
    }

    /// Buffer contents with styling dropped.
    pub fn plain_text(&self) -> Result<String> {
        self.inner.with_buffer(|buffer| buffer.plain_text())
    }

    /// Every buffer row, oldest first.
    pub fn all_rows(&self) -> Result<Vec<Vec<StyledCell>>> {
        self.inner.with_buffer(|buffer| buffer.all_rows())
    }

    /// The last `n` rows up to the cursor.
    pub fn visible_rows(&self, n: usize) -> Result<Vec<Vec<StyledCell>>> {
        self.inner.with_buffer(|buffer| buffer.visible_rows(n))
    }

    /// Older history entry, for the up arrow.
    pub fn history_previous(&self) -> Result<Option<String>> {
        self.inner.with_history(|history| history.get_previous())
    }

    /// Newer history entry, or an empty line past the newest.
    pub fn history_next(&self) -> Result<String> {
        self.inner.with_history(|history| history.get_next())
    }

    /// All recorded commands, oldest first.
    pub fn history(&self) -> Result<Vec<String>> {
        self.inner.with_history(|history| history.get_all_history())
    }

    /// Stop the reader and close the channel.
    ///
    /// The pooled session stays open for other controllers. A controller
    /// cannot be reconnected after shutdown.
    pub async fn shutdown(&self) -> Result<()> {
        self.inner.closed.store(true, Ordering::SeqCst);

        let link = self
            .inner
            .link
            .lock()
            .map_err(|_| ShellTermError::LockPoisoned)?
            .take();

        if let Some(link) = link {
            link.cancel.cancel();
            close_channel(link.channel).await;
            if let Err(e) = link.reader.await {
                debug!("Reader task ended abnormally: {}", e);
            }
        }

        self.inner.set_state(ChannelState::Disconnected)?;
        info!("Stream for {} shut down", self.inner.key);
        Ok(())
    }
}

impl Inner {
    /// Bring up session and channel. Caller holds the reconnection guard.
    async fn establish(self: &Arc<Self>) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ShellTermError::NotConnected);
        }

        self.drop_link().await?;

        let session = match self.live_session()? {
            Some(session) => session,
            None => self.connect_session().await?,
        };

        self.open_channel(session).await
    }

    /// The pooled or held session, if it is still connected.
    fn live_session(&self) -> Result<Option<SharedSession>> {
        if let Some(session) = self.registry.get(&self.key)? {
            self.hold_session(Arc::clone(&session))?;
            return Ok(Some(session));
        }

        let held = self
            .session
            .lock()
            .map_err(|_| ShellTermError::LockPoisoned)?
            .clone();
        Ok(held.filter(|session| session.is_connected()))
    }

    fn hold_session(&self, session: SharedSession) -> Result<()> {
        *self
            .session
            .lock()
            .map_err(|_| ShellTermError::LockPoisoned)? = Some(session);
        Ok(())
    }

    async fn connect_session(&self) -> Result<SharedSession> {
        self.set_state(ChannelState::ConnectingSession)?;
        info!("Connecting session for {}", self.key);

        let connector = Arc::clone(&self.connector);
        let session = match tokio::task::spawn_blocking(move || connector.connect()).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => return Err(self.fail(e)),
            Err(e) => return Err(self.fail(ShellTermError::Transport(e.to_string()))),
        };

        match self.registry.put(self.key.clone(), Arc::clone(&session)) {
            Ok(true) => {}
            Ok(false) => {
                return Err(self.fail(ShellTermError::Transport(
                    "session not connected".into(),
                )))
            }
            Err(e) => return Err(self.fail(e)),
        }
        self.hold_session(Arc::clone(&session))?;
        Ok(session)
    }

    async fn open_channel(self: &Arc<Self>, session: SharedSession) -> Result<()> {
        self.set_state(ChannelState::ConnectingChannel)?;
        debug!("Opening channel for {}", self.key);

        let size = self.config.pty_size;
        let channel =
            match tokio::task::spawn_blocking(move || session.open_interactive_channel(size)).await {
                Ok(Ok(channel)) => channel,
                Ok(Err(e)) => return Err(self.fail(e)),
                Err(e) => return Err(self.fail(ShellTermError::Channel(e.to_string()))),
            };

        if let Err(e) = self.set_state(ChannelState::Streaming) {
            close_channel(channel).await;
            return Err(e);
        }

        // Checked under the link lock so shutdown cannot miss this channel
        let rejected = {
            let mut link = self.link.lock().map_err(|_| ShellTermError::LockPoisoned)?;
            if self.closed.load(Ordering::SeqCst) {
                Some(channel)
            } else {
                let cancel = CancellationToken::new();
                let reader = spawn_reader(Arc::clone(self), Arc::clone(&channel), cancel.clone());
                *link = Some(Link {
                    channel,
                    cancel,
                    reader,
                });
                None
            }
        };

        if let Some(channel) = rejected {
            close_channel(channel).await;
            let _ = self.set_state(ChannelState::Disconnected);
            return Err(ShellTermError::NotConnected);
        }

        if let Ok(mut error) = self.last_error.lock() {
            *error = None;
        }
        info!("Streaming {}", self.key);
        Ok(())
    }

    /// Channel ended while streaming.
    async fn handle_end_of_stream(self: &Arc<Self>, cancel: &CancellationToken) {
        let Some(_guard) = ReconnectGuard::acquire(&self.reconnecting) else {
            debug!("End of stream during reconnect, leaving it to the reconnect");
            return;
        };

        // A reconnect that finished meanwhile has already replaced this channel
        if cancel.is_cancelled() || self.closed.load(Ordering::SeqCst) {
            return;
        }

        // The old reader is the caller; only forget the link here
        let old = self.link.lock().ok().and_then(|mut link| link.take());
        if let Some(old) = old {
            close_channel(old.channel).await;
        }

        let session = self
            .session
            .lock()
            .ok()
            .and_then(|held| held.clone())
            .filter(|session| session.is_connected());

        match session {
            Some(session) => {
                info!("Channel for {} closed, session still up; reopening", self.key);
                if self.set_state(ChannelState::Reconnecting).is_err() {
                    return;
                }
                if let Err(e) = self.open_channel(session).await {
                    warn!("Reopening channel for {} failed: {}", self.key, e);
                }
            }
            None => {
                let _ = self.fail(ShellTermError::Transport("connection closed".into()));
            }
        }
    }

    /// Cancel the current reader and close its channel, if any.
    async fn drop_link(&self) -> Result<()> {
        let link = self
            .link
            .lock()
            .map_err(|_| ShellTermError::LockPoisoned)?
            .take();

        if let Some(link) = link {
            link.cancel.cancel();
            close_channel(link.channel).await;
        }
        Ok(())
    }

    fn current_channel(&self) -> Result<Option<SharedChannel>> {
        let link = self.link.lock().map_err(|_| ShellTermError::LockPoisoned)?;
        Ok(link.as_ref().map(|link| Arc::clone(&link.channel)))
    }

    /// Write to the open channel; silently does nothing without one.
    async fn write(&self, bytes: Vec<u8>) -> Result<()> {
        let Some(channel) = self.current_channel()? else {
            trace!("Send ignored, no channel");
            return Ok(());
        };
        if !channel.is_connected() {
            trace!("Send ignored, channel not connected");
            return Ok(());
        }

        match tokio::task::spawn_blocking(move || channel.write_bytes(&bytes)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(ShellTermError::NotConnected)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(ShellTermError::Channel(e.to_string())),
        }
    }

    fn set_state(&self, target: ChannelState) -> Result<()> {
        let mut result = Ok(());
        self.state.send_if_modified(|current| {
            if *current == target {
                return false;
            }
            let from = *current;
            match current.transition_to(target) {
                Ok(()) => {
                    debug!("{}: {:?} -> {:?}", self.key, from, target);
                    true
                }
                Err(e) => {
                    result = Err(e);
                    false
                }
            }
        });
        result
    }

    /// Record `error`, drop to `Disconnected`, and hand the error back.
    fn fail(&self, error: ShellTermError) -> ShellTermError {
        warn!("{}: {}", self.key, error);
        if let Ok(mut last) = self.last_error.lock() {
            *last = Some(error.to_string());
        }
        let _ = self.set_state(ChannelState::Disconnected);
        error
    }

    fn with_buffer<T>(&self, f: impl FnOnce(&TerminalBuffer) -> T) -> Result<T> {
        let buffer = self
            .buffer
            .lock()
            .map_err(|_| ShellTermError::LockPoisoned)?;
        Ok(f(&buffer))
    }

    fn with_history<T>(&self, f: impl FnOnce(&mut CommandHistory) -> T) -> Result<T> {
        let mut history = self
            .history
            .lock()
            .map_err(|_| ShellTermError::LockPoisoned)?;
        Ok(f(&mut history))
    }
}

/// Close `channel` on the blocking pool, logging instead of failing.
async fn close_channel(channel: SharedChannel) {
    match tokio::task::spawn_blocking(move || channel.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!("Channel close failed: {}", e),
        Err(e) => debug!("Channel close task failed: {}", e),
    }
}

/// Start the polling read loop for `channel`.
fn spawn_reader(
    inner: Arc<Inner>,
    channel: SharedChannel,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let chunk_size = inner.config.chunk_size.max(1);
        let poll_interval = inner.config.poll_interval;
        let mut decoder = Utf8Decoder::new();

        loop {
            if cancel.is_cancelled() {
                return;
            }

            let available = channel.readable_byte_count();
            if available > 0 {
                match channel.read_chunk(available.min(chunk_size)) {
                    Ok(bytes) => {
                        trace!("Read {} bytes", bytes.len());
                        let text = decoder.decode(&bytes);
                        if !apply_output(&inner, &text) {
                            return;
                        }
                        continue;
                    }
                    Err(e) => {
                        warn!("Read from {} failed: {}", inner.key, e);
                        break;
                    }
                }
            }

            if !channel.is_connected() {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }

        if cancel.is_cancelled() {
            return;
        }

        let tail = decoder.finish();
        apply_output(&inner, &tail);
        if let Ok(mut buffer) = inner.buffer.lock() {
            buffer.flush_pending_escape();
        }

        match channel.exit_code() {
            Some(code) => debug!("Shell for {} exited with {}", inner.key, code),
            None => debug!("End of stream for {}", inner.key),
        }
        inner.handle_end_of_stream(&cancel).await;
    })
}

/// Feed decoded text to the buffer. Returns false if the buffer is unusable.
fn apply_output(inner: &Inner, text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    match inner.buffer.lock() {
        Ok(mut buffer) => {
            process_output(&mut buffer, text);
            true
        }
        Err(_) => {
            warn!("Terminal buffer lock poisoned, stopping reader");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Color;
    use crate::session::{Channel, TransportSession};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct ScriptedChannel {
        output: Mutex<VecDeque<u8>>,
        written: Mutex<Vec<u8>>,
        closed: AtomicBool,
    }

    impl ScriptedChannel {
        fn feed(&self, bytes: &[u8]) {
            self.output.lock().unwrap().extend(bytes);
        }
    }

    impl Channel for ScriptedChannel {
        fn is_connected(&self) -> bool {
            !self.closed.load(Ordering::SeqCst)
        }

        fn readable_byte_count(&self) -> usize {
            self.output.lock().unwrap().len()
        }

        fn read_chunk(&self, max_bytes: usize) -> Result<Vec<u8>> {
            let mut output = self.output.lock().unwrap();
            let n = max_bytes.min(output.len());
            Ok(output.drain(..n).collect())
        }

        fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
            self.written.lock().unwrap().extend_from_slice(bytes);
            Ok(())
        }

        fn exit_code(&self) -> Option<i32> {
            None
        }

        fn close(&self) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ScriptedSession {
        connected: AtomicBool,
        opens: AtomicUsize,
        channels: Mutex<Vec<Arc<ScriptedChannel>>>,
    }

    impl ScriptedSession {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                connected: AtomicBool::new(true),
                opens: AtomicUsize::new(0),
                channels: Mutex::new(Vec::new()),
            })
        }

        fn channel(&self, index: usize) -> Arc<ScriptedChannel> {
            Arc::clone(&self.channels.lock().unwrap()[index])
        }
    }

    impl TransportSession for ScriptedSession {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        fn open_interactive_channel(&self, _size: PtySize) -> Result<SharedChannel> {
            if !self.is_connected() {
                return Err(ShellTermError::Channel("session down".into()));
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            let channel = Arc::new(ScriptedChannel::default());
            self.channels.lock().unwrap().push(Arc::clone(&channel));
            Ok(channel as SharedChannel)
        }

        fn close(&self) -> Result<()> {
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        }
    }

    fn controller_for(session: Arc<ScriptedSession>) -> ShellStreamController {
        let connector = move || -> Result<SharedSession> { Ok(session.clone() as SharedSession) };
        let config = StreamConfig {
            poll_interval: Duration::from_millis(5),
            ..StreamConfig::default()
        };
        ShellStreamController::new(
            SessionKey::server("test"),
            Arc::new(SessionRegistry::new()),
            Arc::new(connector),
            config,
        )
    }

    async fn wait_for(mut check: impl FnMut() -> bool) {
        for _ in 0..200 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[test]
    fn test_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let guard = ReconnectGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(ReconnectGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(ReconnectGuard::acquire(&flag).is_some());
    }

    #[tokio::test]
    async fn test_connect_streams_output() {
        let session = ScriptedSession::new();
        let controller = controller_for(Arc::clone(&session));

        let outcome = controller.connect().await.unwrap();
        assert_eq!(outcome, ReconnectOutcome::Connected);
        assert_eq!(controller.state(), ChannelState::Streaming);
        assert!(controller.last_error().is_none());

        session.channel(0).feed(b"\x1b[32m$\x1b[0m ready\r\n");
        wait_for(|| controller.plain_text().unwrap() == "$ ready").await;

        controller.shutdown().await.unwrap();
        assert_eq!(controller.state(), ChannelState::Disconnected);
        assert!(!session.channel(0).is_connected());
    }

    #[tokio::test]
    async fn test_send_line_records_history_and_writes() {
        let session = ScriptedSession::new();
        let controller = controller_for(Arc::clone(&session));
        controller.connect().await.unwrap();

        controller.send_line("ls -la").await.unwrap();
        controller.send_line("   ").await.unwrap();
        controller.send_control_char(crate::stream::ControlChar::Interrupt).await.unwrap();

        assert_eq!(*session.channel(0).written.lock().unwrap(), b"ls -la\n\x03");
        assert_eq!(controller.history().unwrap(), vec!["ls -la"]);
        assert_eq!(controller.history_previous().unwrap().as_deref(), Some("ls -la"));
        assert_eq!(controller.history_next().unwrap(), "");

        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_sends_without_channel_are_noops() {
        let controller = controller_for(ScriptedSession::new());
        controller.send_raw_bytes(b"abc").await.unwrap();
        controller.send_control_char(0x03u8).await.unwrap();
        assert_eq!(controller.state(), ChannelState::Disconnected);
    }

    #[tokio::test]
    async fn test_shutdown_is_final() {
        let session = ScriptedSession::new();
        let controller = controller_for(Arc::clone(&session));
        controller.connect().await.unwrap();
        controller.shutdown().await.unwrap();

        let result = controller.connect().await;
        assert!(matches!(result, Err(ShellTermError::NotConnected)));
        assert_eq!(session.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_channel_failure_surfaces_error() {
        let session = ScriptedSession::new();
        session.connected.store(false, Ordering::SeqCst);

        // Connector keeps handing out the dead session
        let controller = controller_for(Arc::clone(&session));
        let result = controller.connect().await;

        assert!(matches!(result, Err(ShellTermError::Transport(_))));
        assert_eq!(controller.state(), ChannelState::Disconnected);
        assert!(controller
            .last_error()
            .unwrap()
            .contains("session not connected"));
        assert_eq!(session.opens.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_escape_split_across_reads() {
        let session = ScriptedSession::new();
        let controller = controller_for(Arc::clone(&session));
        controller.connect().await.unwrap();

        let channel = session.channel(0);
        channel.feed(b"a\x1b[");
        wait_for(|| channel.readable_byte_count() == 0).await;
        wait_for(|| controller.plain_text().unwrap() == "a").await;

        channel.feed(b"32mb");
        wait_for(|| controller.plain_text().unwrap() == "ab").await;
        let rows = controller.all_rows().unwrap();
        assert_eq!(rows[0][1].foreground, Some(Color::Green));

        controller.shutdown().await.unwrap();
    }
}
