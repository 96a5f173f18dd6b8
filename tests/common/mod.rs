//! In-memory transport used by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shell_term::session::{SharedChannel, SharedSession};
use shell_term::{Channel, PtySize, Result, SessionConnector, ShellTermError, TransportSession};

/// Channel whose output is fed by the test.
#[derive(Default)]
pub struct MockChannel {
    output: Mutex<VecDeque<u8>>,
    written: Mutex<Vec<u8>>,
    ended: AtomicBool,
    closed: AtomicBool,
}

impl MockChannel {
    /// Queue bytes as if the remote shell printed them.
    pub fn feed(&self, bytes: &[u8]) {
        self.output.lock().unwrap().extend(bytes);
    }

    /// Simulate the remote shell exiting.
    pub fn end(&self) {
        self.ended.store(true, Ordering::SeqCst);
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Channel for MockChannel {
    fn is_connected(&self) -> bool {
        !self.ended.load(Ordering::SeqCst) && !self.closed.load(Ordering::SeqCst)
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
        if !self.is_connected() {
            return Err(ShellTermError::NotConnected);
        }
        self.written.lock().unwrap().extend_from_slice(bytes);
        Ok(())
    }

    fn exit_code(&self) -> Option<i32> {
        self.ended.load(Ordering::SeqCst).then_some(0)
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Session counting channel opens, with an optional blocking delay.
pub struct MockSession {
    connected: AtomicBool,
    open_delay: Mutex<Duration>,
    opens: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    channels: Mutex<Vec<Arc<MockChannel>>>,
}

impl MockSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            connected: AtomicBool::new(true),
            open_delay: Mutex::new(Duration::ZERO),
            opens: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            channels: Mutex::new(Vec::new()),
        })
    }

    /// Make every later channel open block for `delay`.
    pub fn set_open_delay(&self, delay: Duration) {
        *self.open_delay.lock().unwrap() = delay;
    }

    /// Simulate the transport dropping.
    pub fn drop_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Highest number of opens seen running at the same time.
    pub fn max_concurrent_opens(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn channel(&self, index: usize) -> Arc<MockChannel> {
        Arc::clone(&self.channels.lock().unwrap()[index])
    }

    pub fn latest_channel(&self) -> Arc<MockChannel> {
        let channels = self.channels.lock().unwrap();
        Arc::clone(channels.last().expect("no channel opened"))
    }
}

impl TransportSession for MockSession {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn open_interactive_channel(&self, _size: PtySize) -> Result<SharedChannel> {
        if !self.is_connected() {
            return Err(ShellTermError::Channel("session is down".into()));
        }

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        self.opens.fetch_add(1, Ordering::SeqCst);

        let delay = *self.open_delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let channel = Arc::new(MockChannel::default());
        self.channels.lock().unwrap().push(Arc::clone(&channel));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(channel as SharedChannel)
    }

    fn close(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Connector handing out a fresh [`MockSession`] per call.
#[derive(Default)]
pub struct MockConnector {
    sessions: Mutex<Vec<Arc<MockSession>>>,
    fail: AtomicBool,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make later connects fail.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn connects(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn session(&self, index: usize) -> Arc<MockSession> {
        Arc::clone(&self.sessions.lock().unwrap()[index])
    }

    pub fn latest_session(&self) -> Arc<MockSession> {
        let sessions = self.sessions.lock().unwrap();
        Arc::clone(sessions.last().expect("never connected"))
    }
}

impl SessionConnector for MockConnector {
    fn connect(&self) -> Result<SharedSession> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ShellTermError::Transport("authentication failed".into()));
        }
        let session = MockSession::new();
        self.sessions.lock().unwrap().push(Arc::clone(&session));
        Ok(session as SharedSession)
    }
}

/// Poll `check` until it holds, panicking after two seconds.
pub async fn wait_until(mut check: impl FnMut() -> bool) {
    for _ in 0..400 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within timeout");
}
