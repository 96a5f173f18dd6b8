//! Interactive channel state machine.

/// Lifecycle state of the channel owned by a stream controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// No channel; the caller must connect or reconnect.
    #[default]
    Disconnected,
    /// Re-establishing the transport session.
    ConnectingSession,
    /// Opening an interactive channel on a live session.
    ConnectingChannel,
    /// Read loop active.
    Streaming,
    /// Channel ended while the session stayed up; about to reopen it.
    Reconnecting,
}

impl ChannelState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Disconnected -> ConnectingSession | ConnectingChannel
    /// - ConnectingSession -> ConnectingChannel
    /// - ConnectingChannel -> Streaming
    /// - Streaming -> Reconnecting | ConnectingSession | ConnectingChannel
    /// - Reconnecting -> ConnectingSession | ConnectingChannel
    /// - any state other than Disconnected -> Disconnected
    pub fn can_transition_to(&self, target: ChannelState) -> bool {
        use ChannelState::*;
        matches!(
            (*self, target),
            (Disconnected, ConnectingSession)
                | (Disconnected, ConnectingChannel)
                | (ConnectingSession, ConnectingChannel)
                | (ConnectingChannel, Streaming)
                | (Streaming, Reconnecting)
                | (Streaming, ConnectingSession)
                | (Streaming, ConnectingChannel)
                | (Reconnecting, ConnectingSession)
                | (Reconnecting, ConnectingChannel)
                | (ConnectingSession, Disconnected)
                | (ConnectingChannel, Disconnected)
                | (Streaming, Disconnected)
                | (Reconnecting, Disconnected)
        )
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: ChannelState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::ShellTermError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if input can be written to the channel.
    pub fn is_streaming(&self) -> bool {
        matches!(self, ChannelState::Streaming)
    }

    /// Check if a connection attempt is under way.
    pub fn is_connecting(&self) -> bool {
        matches!(
            self,
            ChannelState::ConnectingSession
                | ChannelState::ConnectingChannel
                | ChannelState::Reconnecting
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_connect_path() {
        let mut state = ChannelState::Disconnected;
        assert!(state.transition_to(ChannelState::ConnectingSession).is_ok());
        assert!(state.transition_to(ChannelState::ConnectingChannel).is_ok());
        assert!(state.transition_to(ChannelState::Streaming).is_ok());
        assert_eq!(state, ChannelState::Streaming);
    }

    #[test]
    fn test_channel_reconnect_path() {
        let mut state = ChannelState::Streaming;
        assert!(state.transition_to(ChannelState::Reconnecting).is_ok());
        assert!(state.transition_to(ChannelState::ConnectingChannel).is_ok());
        assert!(state.transition_to(ChannelState::Streaming).is_ok());
    }

    #[test]
    fn test_failure_returns_to_disconnected() {
        for from in [
            ChannelState::ConnectingSession,
            ChannelState::ConnectingChannel,
            ChannelState::Streaming,
            ChannelState::Reconnecting,
        ] {
            let mut state = from;
            assert!(state.transition_to(ChannelState::Disconnected).is_ok());
        }
    }

    #[test]
    fn test_invalid_skip_to_streaming() {
        let mut state = ChannelState::Disconnected;
        assert!(state.transition_to(ChannelState::Streaming).is_err());
        // State should remain unchanged
        assert_eq!(state, ChannelState::Disconnected);

        let mut state = ChannelState::ConnectingSession;
        assert!(state.transition_to(ChannelState::Streaming).is_err());
    }

    #[test]
    fn test_disconnected_self_transition_rejected() {
        let mut state = ChannelState::Disconnected;
        assert!(state.transition_to(ChannelState::Disconnected).is_err());
        assert!(state.transition_to(ChannelState::Reconnecting).is_err());
    }

    #[test]
    fn test_predicates() {
        assert!(ChannelState::Streaming.is_streaming());
        assert!(!ChannelState::Reconnecting.is_streaming());
        assert!(ChannelState::Reconnecting.is_connecting());
        assert!(ChannelState::ConnectingSession.is_connecting());
        assert!(!ChannelState::Disconnected.is_connecting());
        assert_eq!(ChannelState::default(), ChannelState::Disconnected);
    }
}
