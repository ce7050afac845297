use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Non-blocking try-lock used to keep at most one execution of a recurring
/// job in flight. Excess attempts are dropped, never queued.
#[derive(Debug, Default)]
pub struct Guard {
    locked: AtomicBool,
}

impl Guard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the guard iff it is currently free.
    pub fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    pub fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }

    /// Runs `task` as an independent tokio task if the guard is free,
    /// releasing the guard when the task completes. Returns false without
    /// running anything when an execution is already in flight.
    pub fn spawn<F>(self: &Arc<Self>, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.try_lock() {
            return false;
        }
        let guard = Arc::clone(self);
        tokio::spawn(async move {
            task.await;
            guard.unlock();
        });
        true
    }
}
