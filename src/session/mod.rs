//! Session management module.
//!
//! This module provides the transport-facing side of the engine:
//! session keys, the channel state machine, the capabilities consumed from
//! the transport layer, and the pool of live sessions.

mod id;
mod registry;
mod state;
mod transport;

pub use id::{SessionId, SessionKey};
pub use registry::{LifecycleEvent, SessionRegistry, DEFAULT_MAX_IDLE};
pub use state::ChannelState;
pub use transport::{Channel, SessionConnector, SharedChannel, SharedSession, TransportSession};
