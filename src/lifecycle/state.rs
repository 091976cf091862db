//! Server lifecycle state machine.
//!
//! ```text
//! NotStarted → Running → Stopping → Stopped
//! ```
//!
//! There is no way back to `Running`; a new listen session needs a new server.

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    NotStarted = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl From<u8> for LifecycleState {
    fn from(val: u8) -> Self {
        match val {
            1 => LifecycleState::Running,
            2 => LifecycleState::Stopping,
            3 => LifecycleState::Stopped,
            _ => LifecycleState::NotStarted,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifecycleState::NotStarted => "not-started",
            LifecycleState::Running => "running",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Atomic holder for a [`LifecycleState`].
#[derive(Debug)]
pub struct AtomicLifecycle(AtomicU8);

impl AtomicLifecycle {
    pub fn new(state: LifecycleState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> LifecycleState {
        self.0.load(Ordering::SeqCst).into()
    }

    pub fn store(&self, state: LifecycleState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Move from `from` to `to`; fails with the actual state otherwise.
    pub fn transition(&self, from: LifecycleState, to: LifecycleState) -> Result<(), LifecycleState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(LifecycleState::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_only_from_expected_state() {
        let state = AtomicLifecycle::new(LifecycleState::NotStarted);
        assert_eq!(
            state.transition(LifecycleState::Running, LifecycleState::Stopping),
            Err(LifecycleState::NotStarted)
        );
        state
            .transition(LifecycleState::NotStarted, LifecycleState::Running)
            .unwrap();
        assert_eq!(state.load(), LifecycleState::Running);
    }

    #[test]
    fn unknown_byte_maps_to_not_started() {
        assert_eq!(LifecycleState::from(42), LifecycleState::NotStarted);
        assert_eq!(LifecycleState::Stopping.to_string(), "stopping");
    }
}
