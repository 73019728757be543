//! Cooperative cancellation for background activities.
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// A cheaply-clonable, one-shot stop flag that sleeping threads can wait on.
///
/// Create one instance with [`ShutdownSignal::new`] and clone it into every
/// activity; [`trigger`](Self::trigger) wakes all of them at once.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    /// Create a signal in the "running" state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown and wake every waiter.
    pub fn trigger(&self) {
        let (flag, condvar) = &*self.inner;
        let mut stopped = flag
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *stopped = true;
        drop(stopped);
        condvar.notify_all();
    }

    /// Returns `true` once [`Self::trigger`] has been called.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self
            .inner
            .0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Block until shutdown is requested.
    pub fn wait(&self) {
        let (flag, condvar) = &*self.inner;
        let mut stopped = flag
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        while !*stopped {
            stopped = condvar
                .wait(stopped)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
        drop(stopped);
    }

    /// Sleep for up to `timeout`, returning early (with `true`) if shutdown
    /// is requested.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };
        let (flag, condvar) = &*self.inner;
        let mut stopped = flag
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            stopped = condvar
                .wait_timeout(stopped, deadline - now)
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .0;
        }
        *stopped
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_signal_is_not_triggered() {
        assert!(!ShutdownSignal::new().is_triggered());
    }

    #[test]
    fn clone_sees_trigger() {
        let signal = ShutdownSignal::new();
        let cloned = signal.clone();
        signal.trigger();
        assert!(cloned.is_triggered());
    }

    #[test]
    fn wait_timeout_expires_without_trigger() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn trigger_wakes_sleeping_thread_early() {
        let signal = ShutdownSignal::new();
        let sleeper = signal.clone();
        let start = Instant::now();
        let handle = std::thread::spawn(move || sleeper.wait_timeout(Duration::from_secs(30)));
        std::thread::sleep(Duration::from_millis(20));
        signal.trigger();
        assert!(handle.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn wait_returns_after_trigger() {
        let signal = ShutdownSignal::new();
        let waiter = signal.clone();
        let handle = std::thread::spawn(move || waiter.wait());
        signal.trigger();
        handle.join().unwrap();
    }

    #[test]
    fn unrepresentable_timeout_waits_for_trigger() {
        let signal = ShutdownSignal::new();
        let sleeper = signal.clone();
        let handle =
            std::thread::spawn(move || sleeper.wait_timeout(Duration::from_secs(u64::MAX)));
        std::thread::sleep(Duration::from_millis(20));
        signal.trigger();
        assert!(handle.join().unwrap());
    }
}
