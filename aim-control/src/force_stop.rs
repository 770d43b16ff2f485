use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation token.
///
/// Whoever schedules the controller keeps a clone and calls
/// [`stop`](Self::stop); the controller checks it at the top of every phase.
#[derive(Debug, Clone, Default)]
pub struct ForceStop {
    flag: Arc<AtomicBool>,
}

impl ForceStop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
