//! Stop flag shared by the polling thread, the keyboard monitor and the
//! Ctrl+C handler.
//!
//! The flag lives inside the mutex the waiters park on, so a trigger can
//! never slip between a waiter's check and its wait. Waits are deadline
//! based to fit the poller's fixed tick schedule.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct ShutdownSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every waiter; later calls are no-ops
    pub fn trigger(&self) {
        *self.lock() = true;
        self.wake.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        *self.lock()
    }

    /// Block until `deadline` or a trigger; returns whether triggered
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let mut stopped = self.lock();
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            stopped = match self.wake.wait_timeout(stopped, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        true
    }

    /// [`wait_until`](Self::wait_until) relative to now
    pub fn wait(&self, duration: Duration) -> bool {
        self.wait_until(Instant::now() + duration)
    }

    // Poison is ignored: the guarded bool is always valid
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
