//! Cooperative cancellation for asynchronous render pipelines.
//!
//! Work that cannot be aborted (a renderer running on the blocking pool, an
//! in-flight rasterization) checks the token after each suspension point and
//! drops its result once the token has been cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token, and every clone of it, as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
