//! The once-only readiness transition.

use spindle_core::ConfigurationError;
use std::fmt;

/// Where the worker is relative to readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadinessState {
    /// Connected, no `ready` event handled yet.
    #[default]
    Connected,
    /// The ready round is running.
    ReadyPending,
    /// Ready hooks have run and the timer is armed.
    Ready,
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReadinessState::Connected => "connected",
            ReadinessState::ReadyPending => "ready_pending",
            ReadinessState::Ready => "ready",
        })
    }
}

/// Guards the `Connected -> Ready` transition.
///
/// Owned by the worker and only touched from the event loop.
#[derive(Debug, Default)]
pub struct Readiness {
    state: ReadinessState,
}

impl Readiness {
    /// Start in [`ReadinessState::Connected`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ReadinessState {
        self.state
    }

    /// Whether the transition has completed.
    pub fn is_ready(&self) -> bool {
        self.state == ReadinessState::Ready
    }

    /// Enter [`ReadinessState::ReadyPending`].
    ///
    /// Fails, leaving the state unchanged, unless the worker is still
    /// [`ReadinessState::Connected`].
    pub fn begin(&mut self) -> Result<(), ConfigurationError> {
        if self.state != ReadinessState::Connected {
            return Err(ConfigurationError::AlreadyReady);
        }
        self.state = ReadinessState::ReadyPending;
        Ok(())
    }

    /// Enter [`ReadinessState::Ready`].
    pub fn complete(&mut self) {
        debug_assert_eq!(self.state, ReadinessState::ReadyPending);
        self.state = ReadinessState::Ready;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_happens_once() {
        let mut readiness = Readiness::new();
        readiness.begin().unwrap();
        assert_eq!(readiness.state(), ReadinessState::ReadyPending);
        assert_eq!(readiness.begin(), Err(ConfigurationError::AlreadyReady));

        readiness.complete();
        assert!(readiness.is_ready());
        assert_eq!(readiness.begin(), Err(ConfigurationError::AlreadyReady));
        assert_eq!(readiness.state(), ReadinessState::Ready);
    }
}
