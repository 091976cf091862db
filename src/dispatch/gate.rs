//! Binary wake signal shared between threads.
//!
//! # Responsibilities
//! - Park a thread until another thread has something for it
//! - Remember a signal sent while nobody was waiting
//! - Release every waiter, for good, on shutdown

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct GateState {
    /// Set by `signal`, cleared by the waiter that consumes it.
    signaled: bool,
    /// Set once by `release_all`; waits return immediately afterwards.
    released: bool,
}

/// Why a wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// A signal was consumed.
    Signaled,
    /// The gate was released for shutdown.
    Released,
    /// `wait_timeout` ran out.
    TimedOut,
}

/// A latched, auto-clearing wake flag.
///
/// `signal` sets the flag and wakes one waiter. The woken waiter clears the
/// flag, so repeated signals before anyone waits collapse into one wake.
/// Callers re-check their own condition (queue length, listener state) after
/// every wake.
#[derive(Debug, Default)]
pub struct Gate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the flag and wake one waiter.
    pub fn signal(&self) {
        let mut state = self.lock();
        state.signaled = true;
        drop(state);
        self.cond.notify_one();
    }

    /// Permanently open the gate and wake every waiter.
    pub fn release_all(&self) {
        let mut state = self.lock();
        state.released = true;
        drop(state);
        self.cond.notify_all();
    }

    /// Whether `release_all` has been called.
    pub fn is_released(&self) -> bool {
        self.lock().released
    }

    /// Block until signaled or released, clearing the signal on the way out.
    pub fn wait(&self) -> Wake {
        let guard = self.lock();
        let mut state = self
            .cond
            .wait_while(guard, |s| !s.signaled && !s.released)
            .unwrap_or_else(PoisonError::into_inner);
        Self::consume(&mut state)
    }

    /// Like [`Gate::wait`], giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Wake {
        let guard = self.lock();
        let (mut state, result) = self
            .cond
            .wait_timeout_while(guard, timeout, |s| !s.signaled && !s.released)
            .unwrap_or_else(PoisonError::into_inner);
        if result.timed_out() && !state.signaled && !state.released {
            return Wake::TimedOut;
        }
        Self::consume(&mut state)
    }

    fn consume(state: &mut GateState) -> Wake {
        if state.signaled {
            state.signaled = false;
            Wake::Signaled
        } else {
            Wake::Released
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn signal_before_wait_is_not_lost() {
        let gate = Gate::new();
        gate.signal();
        assert_eq!(gate.wait(), Wake::Signaled);
    }

    #[test]
    fn waiter_clears_the_flag() {
        let gate = Gate::new();
        gate.signal();
        gate.signal();
        assert_eq!(gate.wait(), Wake::Signaled);
        assert_eq!(gate.wait_timeout(Duration::from_millis(20)), Wake::TimedOut);
    }

    #[test]
    fn signal_wakes_a_parked_thread() {
        let gate = Arc::new(Gate::new());
        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.wait())
        };
        thread::sleep(Duration::from_millis(20));
        gate.signal();
        assert_eq!(waiter.join().unwrap(), Wake::Signaled);
    }

    #[test]
    fn release_frees_every_waiter_and_stays_open() {
        let gate = Arc::new(Gate::new());
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || gate.wait())
            })
            .collect();
        thread::sleep(Duration::from_millis(20));
        gate.release_all();
        for w in waiters {
            assert_eq!(w.join().unwrap(), Wake::Released);
        }

        assert!(gate.is_released());
        let start = Instant::now();
        assert_eq!(gate.wait(), Wake::Released);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
