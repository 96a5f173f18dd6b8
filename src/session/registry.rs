//! Pool of live transport sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{SessionKey, SharedSession};
use crate::error::ShellTermError;
use crate::Result;

/// Default idle time after which a pooled session is evicted.
pub const DEFAULT_MAX_IDLE: Duration = Duration::from_secs(300);

/// Coarse process lifecycle points at which the pool is maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Process start.
    Start,
    /// Host moved to the background.
    Background,
    /// Host returned to the foreground.
    Foreground,
    /// Process teardown.
    Teardown,
}

/// A pooled session and when it was last handed out.
struct PooledSession {
    session: SharedSession,
    last_used_at: Instant,
}

impl PooledSession {
    fn new(session: SharedSession) -> Self {
        Self {
            session,
            last_used_at: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_used_at = Instant::now();
    }

    fn is_stale(&self, max_idle: Duration) -> bool {
        self.last_used_at.elapsed() > max_idle || !self.session.is_connected()
    }
}

/// Thread-safe registry of transport sessions.
///
/// One registry serves both key kinds of [`SessionKey`]; entries of either
/// kind follow the same idle and liveness rules.
pub struct SessionRegistry {
    entries: Mutex<HashMap<SessionKey, PooledSession>>,
    max_idle: Duration,
}

impl SessionRegistry {
    /// Create an empty registry with [`DEFAULT_MAX_IDLE`].
    pub fn new() -> Self {
        Self::with_max_idle(DEFAULT_MAX_IDLE)
    }

    /// Create an empty registry evicting sessions idle for `max_idle`.
    pub fn with_max_idle(max_idle: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_idle,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionKey, PooledSession>>> {
        self.entries
            .lock()
            .map_err(|_| ShellTermError::LockPoisoned)
    }

    /// Look up a live session, refreshing its idle timer.
    ///
    /// A disconnected or idle-expired entry is evicted and `None` returned.
    pub fn get(&self, key: &SessionKey) -> Result<Option<SharedSession>> {
        let mut entries = self.lock()?;

        match entries.get_mut(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_stale(self.max_idle) => {
                entry.touch();
                return Ok(Some(Arc::clone(&entry.session)));
            }
            Some(_) => {}
        }

        let evicted = entries.remove(key);
        drop(entries);

        if let Some(entry) = evicted {
            debug!("Evicting stale session {}", key);
            close_quietly(key, &entry.session);
        }
        Ok(None)
    }

    /// Pool `session` under `key`.
    ///
    /// A session that is not connected is rejected and `false` returned.
    /// A different session previously held under `key` is closed.
    pub fn put(&self, key: SessionKey, session: SharedSession) -> Result<bool> {
        if !session.is_connected() {
            warn!("Rejecting disconnected session for {}", key);
            return Ok(false);
        }

        let replaced = {
            let mut entries = self.lock()?;
            entries.insert(key.clone(), PooledSession::new(Arc::clone(&session)))
        };

        if let Some(old) = replaced {
            if !same_session(&old.session, &session) {
                debug!("Replacing pooled session for {}", key);
                close_quietly(&key, &old.session);
            }
        }
        Ok(true)
    }

    /// Remove and close the session under `key`.
    ///
    /// Returns whether an entry existed.
    pub fn remove(&self, key: &SessionKey) -> Result<bool> {
        let removed = self.lock()?.remove(key);
        match removed {
            Some(entry) => {
                close_quietly(key, &entry.session);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Evict every idle-expired or disconnected entry.
    ///
    /// Returns the number of sessions removed.
    pub fn sweep(&self) -> Result<usize> {
        let evicted: Vec<(SessionKey, PooledSession)> = {
            let mut entries = self.lock()?;
            let stale: Vec<SessionKey> = entries
                .iter()
                .filter(|(_, entry)| entry.is_stale(self.max_idle))
                .map(|(key, _)| key.clone())
                .collect();
            stale
                .into_iter()
                .filter_map(|key| entries.remove(&key).map(|entry| (key, entry)))
                .collect()
        };

        for (key, entry) in &evicted {
            close_quietly(key, &entry.session);
        }
        if !evicted.is_empty() {
            debug!("Swept {} stale session(s)", evicted.len());
        }
        Ok(evicted.len())
    }

    /// Close and remove every session.
    ///
    /// Returns the number of sessions removed.
    pub fn clear(&self) -> Result<usize> {
        let drained: Vec<(SessionKey, PooledSession)> = self.lock()?.drain().collect();
        for (key, entry) in &drained {
            close_quietly(key, &entry.session);
        }
        Ok(drained.len())
    }

    /// Run the maintenance step for a lifecycle event.
    ///
    /// Start and background/foreground transitions sweep; teardown clears.
    pub fn on_lifecycle(&self, event: LifecycleEvent) -> Result<usize> {
        match event {
            LifecycleEvent::Start | LifecycleEvent::Background | LifecycleEvent::Foreground => {
                self.sweep()
            }
            LifecycleEvent::Teardown => self.clear(),
        }
    }

    /// Check if a key is pooled, without refreshing or evicting it.
    pub fn contains(&self, key: &SessionKey) -> Result<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    /// List pooled keys.
    pub fn keys(&self) -> Result<Vec<SessionKey>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    /// Get the number of pooled sessions.
    pub fn count(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Configured idle limit.
    pub fn max_idle(&self) -> Duration {
        self.max_idle
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn same_session(a: &SharedSession, b: &SharedSession) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const u8,
        Arc::as_ptr(b) as *const u8,
    )
}

fn close_quietly(key: &SessionKey, session: &SharedSession) {
    if !session.is_connected() {
        return;
    }
    if let Err(e) = session.close() {
        debug!("Ignoring close error for {}: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pty::PtySize;
    use crate::session::SharedChannel;
    use crate::session::TransportSession;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSession {
        down: AtomicBool,
        closes: AtomicUsize,
    }

    impl FakeSession {
        fn live() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn dead() -> Arc<Self> {
            let session = Self::default();
            session.down.store(true, Ordering::SeqCst);
            Arc::new(session)
        }
    }

    impl TransportSession for FakeSession {
        fn is_connected(&self) -> bool {
            !self.down.load(Ordering::SeqCst)
        }

        fn open_interactive_channel(&self, _size: PtySize) -> Result<SharedChannel> {
            Err(ShellTermError::Channel("unsupported".into()))
        }

        fn close(&self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            self.down.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn key(name: &str) -> SessionKey {
        SessionKey::server(name)
    }

    #[test]
    fn test_put_and_get() {
        let registry = SessionRegistry::new();
        let session = FakeSession::live();

        assert!(registry.put(key("a"), session.clone()).unwrap());
        assert!(registry.get(&key("a")).unwrap().is_some());
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_put_disconnected_is_rejected() {
        let registry = SessionRegistry::new();
        assert!(!registry.put(key("a"), FakeSession::dead()).unwrap());
        assert!(registry.get(&key("a")).unwrap().is_none());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_get_nonexistent() {
        let registry = SessionRegistry::new();
        assert!(registry.get(&SessionKey::new_token()).unwrap().is_none());
    }

    #[test]
    fn test_get_evicts_disconnected() {
        let registry = SessionRegistry::new();
        let session = FakeSession::live();
        registry.put(key("a"), session.clone()).unwrap();

        session.down.store(true, Ordering::SeqCst);
        assert!(registry.get(&key("a")).unwrap().is_none());
        assert!(!registry.contains(&key("a")).unwrap());
        // Already down, so no close attempt
        assert_eq!(session.closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_get_evicts_idle_and_closes() {
        let registry = SessionRegistry::with_max_idle(Duration::from_millis(20));
        let session = FakeSession::live();
        registry.put(key("a"), session.clone()).unwrap();

        std::thread::sleep(Duration::from_millis(50));
        assert!(registry.get(&key("a")).unwrap().is_none());
        assert_eq!(session.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_get_refreshes_idle_timer() {
        let registry = SessionRegistry::with_max_idle(Duration::from_millis(200));
        registry.put(key("a"), FakeSession::live()).unwrap();

        for _ in 0..3 {
            std::thread::sleep(Duration::from_millis(100));
            assert!(registry.get(&key("a")).unwrap().is_some());
        }
    }

    #[test]
    fn test_remove_closes_once() {
        let registry = SessionRegistry::new();
        let session = FakeSession::live();
        registry.put(key("a"), session.clone()).unwrap();

        assert!(registry.remove(&key("a")).unwrap());
        assert!(!registry.remove(&key("a")).unwrap());
        assert_eq!(session.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_tolerates_closed_transport() {
        let registry = SessionRegistry::new();
        let session = FakeSession::live();
        registry.put(key("a"), session.clone()).unwrap();
        session.close().unwrap();

        assert!(registry.remove(&key("a")).unwrap());
        assert_eq!(session.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_put_replacing_closes_previous() {
        let registry = SessionRegistry::new();
        let first = FakeSession::live();
        let second = FakeSession::live();
        registry.put(key("a"), first.clone()).unwrap();
        registry.put(key("a"), second.clone()).unwrap();
        registry.put(key("a"), second.clone()).unwrap();

        assert_eq!(first.closes.load(Ordering::SeqCst), 1);
        assert_eq!(second.closes.load(Ordering::SeqCst), 0);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_sweep_removes_only_stale() {
        let registry = SessionRegistry::new();
        let live = FakeSession::live();
        let dropped = FakeSession::live();
        registry.put(key("live"), live).unwrap();
        registry.put(SessionKey::new_token(), dropped.clone()).unwrap();
        dropped.down.store(true, Ordering::SeqCst);

        assert_eq!(registry.on_lifecycle(LifecycleEvent::Foreground).unwrap(), 1);
        assert_eq!(registry.keys().unwrap(), vec![key("live")]);
    }

    #[test]
    fn test_clear_closes_all() {
        let registry = SessionRegistry::new();
        let sessions: Vec<_> = (0..3).map(|_| FakeSession::live()).collect();
        for (i, session) in sessions.iter().enumerate() {
            registry.put(key(&i.to_string()), session.clone()).unwrap();
        }

        assert_eq!(registry.on_lifecycle(LifecycleEvent::Teardown).unwrap(), 3);
        assert_eq!(registry.count(), 0);
        assert!(sessions
            .iter()
            .all(|s| s.closes.load(Ordering::SeqCst) == 1));
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let registry = Arc::new(SessionRegistry::new());
        let mut handles = vec![];

        for i in 0..50 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                let key = SessionKey::server(format!("host-{}", i));
                registry.put(key.clone(), FakeSession::live()).unwrap();
                assert!(registry.get(&key).unwrap().is_some());
                if i % 2 == 0 {
                    registry.remove(&key).unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.count(), 25);
    }
}
