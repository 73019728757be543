//! Mutual exclusion between push and pull transfers.
use std::sync::{Arc, Mutex, MutexGuard};

/// A cheaply-clonable lock shared by every activity that runs a transfer.
///
/// Only the client invocation is held under the gate. Waiters are served in
/// whatever order the OS wakes them; an in-flight transfer is never
/// cancelled.
#[derive(Debug, Clone, Default)]
pub struct SyncGate {
    lock: Arc<Mutex<()>>,
}

impl SyncGate {
    /// Create an unlocked gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the gate is free and hold it until the guard drops.
    ///
    /// A transfer that panicked while holding the gate does not poison it.
    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        self.lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_lock() {
        let gate = SyncGate::new();
        let other = gate.clone();
        let guard = gate.acquire();
        assert!(other.lock.try_lock().is_err());
        drop(guard);
        assert!(other.lock.try_lock().is_ok());
    }

    #[test]
    fn survives_poisoning() {
        let gate = SyncGate::new();
        let poisoner = gate.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.acquire();
            panic!("transfer blew up");
        })
        .join();
        drop(gate.acquire());
    }
}
