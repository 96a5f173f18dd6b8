//! Pool keys: logical server names and generated session tokens.
//!
//! Keys have a text form so they can be named on the command line:
//! `server:<name>` (or a bare name) and `sess-<hex>`.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ShellTermError;

const SERVER_PREFIX: &str = "server:";
const TOKEN_PREFIX: &str = "sess-";

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Token for a short-lived session opened for a single screen.
///
/// Unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn generate() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:08x}", TOKEN_PREFIX, self.0)
    }
}

/// Key under which a transport session is pooled.
///
/// Long-lived connections are keyed by the logical server they reach;
/// short-lived ones are keyed by a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Server(String),
    Token(SessionId),
}

impl SessionKey {
    pub fn server(name: impl Into<String>) -> Self {
        Self::Server(name.into())
    }

    /// Key for a freshly generated token.
    pub fn new_token() -> Self {
        Self::Token(SessionId::generate())
    }

    pub fn is_token(&self) -> bool {
        matches!(self, Self::Token(_))
    }
}

impl From<SessionId> for SessionKey {
    fn from(id: SessionId) -> Self {
        Self::Token(id)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(name) => write!(f, "{}{}", SERVER_PREFIX, name),
            Self::Token(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl FromStr for SessionKey {
    type Err = ShellTermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ShellTermError::InvalidSessionKey(s.to_string());

        if let Some(name) = s.strip_prefix(SERVER_PREFIX) {
            if name.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::server(name));
        }

        if let Some(hex) = s.strip_prefix(TOKEN_PREFIX) {
            return u64::from_str_radix(hex, 16)
                .map(|value| Self::Token(SessionId::from_raw(value)))
                .map_err(|_| invalid());
        }

        // Bare names are servers; anything else with a scheme is not a key
        if s.is_empty() || s.contains(':') || s.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        Ok(Self::server(s))
    }
}
