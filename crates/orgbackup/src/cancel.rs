//! Cooperative cancellation for a backup session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Token for cancelling a running backup session.
///
/// Clones share the same flag, so the CLI's signal handler can hold one
/// clone while the orchestrator checks another between units and before
/// every retry sleep.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Checks if cancellation was requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
