use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A shared flag for cooperative cancellation.
///
/// Clones observe the same flag. Long-running work (training loops, detection
/// tasks) polls `is_cancelled()` at its natural boundaries and bails out once
/// any holder has called `cancel()`.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the flag. Every clone sees it on its next check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
