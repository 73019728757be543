//! Single-slot debounce timer with "replace pending" semantics.
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct State {
    deadline: Option<Instant>,
    stopped: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    condvar: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cheaply-clonable handle that (re)arms a [`Debouncer`].
#[derive(Debug, Clone)]
pub struct DebounceHandle {
    shared: Arc<Shared>,
    delay: Duration,
}

impl DebounceHandle {
    /// Arm the timer `delay` from now, replacing any pending deadline. A
    /// delay too large to represent leaves the timer untouched.
    pub fn trigger(&self) {
        let Some(deadline) = Instant::now().checked_add(self.delay) else {
            tracing::warn!("debounce delay {:?} out of range, change ignored", self.delay);
            return;
        };
        let mut state = self.shared.lock();
        if state.stopped {
            return;
        }
        state.deadline = Some(deadline);
        drop(state);
        self.shared.condvar.notify_one();
    }
}

/// Runs an action once the trigger has been quiet for `delay`.
///
/// A worker thread owns the single pending deadline. Each trigger replaces
/// it, so a burst of triggers closer together than `delay` fires the action
/// once. Triggers arriving while the action runs arm the next firing.
/// Stopping discards a pending deadline and joins the worker.
#[derive(Debug)]
pub struct Debouncer {
    handle: DebounceHandle,
    worker: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Start the worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn<F>(delay: Duration, action: F) -> std::io::Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("dotdav-debounce".to_string())
            .spawn(move || run_worker(&worker_shared, &action))?;
        Ok(Self {
            handle: DebounceHandle { shared, delay },
            worker: Some(worker),
        })
    }

    /// A handle for arming the timer from other threads.
    #[must_use]
    pub fn handle(&self) -> DebounceHandle {
        self.handle.clone()
    }

    /// Arm the timer, replacing any pending deadline.
    pub fn trigger(&self) {
        self.handle.trigger();
    }

    /// Whether a firing is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.handle.shared.lock().deadline.is_some()
    }

    /// Discard any pending firing, wait for a running action to finish, and
    /// join the worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let mut state = self.handle.shared.lock();
        state.stopped = true;
        state.deadline = None;
        drop(state);
        self.handle.shared.condvar.notify_all();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("debounce worker panicked");
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(shared: &Shared, action: &dyn Fn()) {
    let mut state = shared.lock();
    loop {
        if state.stopped {
            return;
        }
        match state.deadline {
            None => {
                state = shared
                    .condvar
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    state.deadline = None;
                    drop(state);
                    action();
                    state = shared.lock();
                } else {
                    state = shared
                        .condvar
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
    }
}
