//! Broker connection lifecycle
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> Subscribing -> Ready
//!                    ^  |                                     |
//!                    +--+ (failure: broker client retries)    |
//!                    ^----------------------------------------+ (drop)
//! any running state -> Stopping -> Stopped
//! ```

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Subscribing,
    Ready,
    Stopping,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Start,
    ConnectionSuccess,
    ConnectionFailure,
    SubscribeRequested,
    SubscribeAcknowledged,
    StopRequested,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal lifecycle transition: {event:?} in state {state:?}")]
pub struct LifecycleError {
    pub state: ConnectionState,
    pub event: LifecycleEvent,
}

/// Connection state machine
#[derive(Debug)]
pub struct Lifecycle {
    state: ConnectionState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::Ready
    }

    /// Apply an event, returning the new state
    pub fn apply(&mut self, event: LifecycleEvent) -> Result<ConnectionState, LifecycleError> {
        use ConnectionState as S;
        use LifecycleEvent as E;

        let next = match (self.state, event) {
            (S::Disconnected, E::Start) => S::Connecting,
            (S::Connecting, E::ConnectionSuccess) => S::Connected,
            (S::Connecting, E::ConnectionFailure) => S::Connecting,
            (S::Connected, E::SubscribeRequested) => S::Subscribing,
            (S::Subscribing, E::SubscribeAcknowledged) => S::Ready,
            (S::Connected | S::Subscribing | S::Ready, E::ConnectionFailure) => S::Connecting,
            (
                S::Disconnected | S::Connecting | S::Connected | S::Subscribing | S::Ready,
                E::StopRequested,
            ) => S::Stopping,
            (S::Stopping, E::ConnectionFailure) => S::Stopping,
            (S::Stopping, E::Stopped) => S::Stopped,
            (state, event) => return Err(LifecycleError { state, event }),
        };

        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, ?event, "Lifecycle transition");
        }
        self.state = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionState as S;
    use LifecycleEvent as E;

    fn drive(events: &[LifecycleEvent]) -> Lifecycle {
        let mut lifecycle = Lifecycle::new();
        for event in events {
            lifecycle.apply(*event).unwrap();
        }
        lifecycle
    }

    #[test]
    fn test_happy_path() {
        let mut lifecycle = drive(&[
            E::Start,
            E::ConnectionSuccess,
            E::SubscribeRequested,
            E::SubscribeAcknowledged,
        ]);
        assert!(lifecycle.is_ready());

        assert_eq!(lifecycle.apply(E::StopRequested), Ok(S::Stopping));
        assert_eq!(lifecycle.apply(E::Stopped), Ok(S::Stopped));
    }

    #[test]
    fn test_failure_while_connecting_keeps_retrying() {
        let lifecycle = drive(&[E::Start, E::ConnectionFailure, E::ConnectionFailure]);
        assert_eq!(lifecycle.state(), S::Connecting);
    }

    #[test]
    fn test_drop_while_ready_resubscribes() {
        let lifecycle = drive(&[
            E::Start,
            E::ConnectionSuccess,
            E::SubscribeRequested,
            E::SubscribeAcknowledged,
            E::ConnectionFailure,
            E::ConnectionSuccess,
            E::SubscribeRequested,
            E::SubscribeAcknowledged,
        ]);
        assert!(lifecycle.is_ready());
    }

    #[test]
    fn test_illegal_transitions() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(
            lifecycle.apply(E::ConnectionSuccess),
            Err(LifecycleError {
                state: S::Disconnected,
                event: E::ConnectionSuccess
            })
        );

        let mut lifecycle = drive(&[E::Start]);
        assert!(lifecycle.apply(E::SubscribeAcknowledged).is_err());
        assert_eq!(lifecycle.state(), S::Connecting);

        let mut stopped = drive(&[E::Start, E::StopRequested, E::Stopped]);
        assert!(stopped.apply(E::Start).is_err());
        assert!(stopped.apply(E::StopRequested).is_err());
    }
}
