//! Search debounce control
//!
//! Delays a search until the user stops typing. Only one timer is pending at a
//! time: scheduling again aborts the previous timer, so a burst of keystrokes
//! produces exactly one invocation carrying the last term. Dropping the
//! debouncer aborts whatever is still pending.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Search debounce controller for rate-limiting search requests
#[derive(Debug)]
pub struct SearchDebouncer {
    /// Quiet period required before a scheduled search runs
    pub debounce_delay: Duration,

    pending: Option<PendingSearch>,
}

#[derive(Debug)]
struct PendingSearch {
    query: String,
    scheduled_at: Instant,
    handle: JoinHandle<()>,
}

impl SearchDebouncer {
    /// Create new search debouncer without delay (runs on the next tick)
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    /// Create new search debouncer with custom delay
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            debounce_delay: delay,
            pending: None,
        }
    }

    /// Schedule `operation(query)` after the debounce delay, replacing any
    /// timer that has not fired yet.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&mut self, query: String, operation: F)
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel_pending();

        let delay = self.debounce_delay;
        let term = query.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            log::trace!("Debounce elapsed for '{}'", term);
            operation(term).await;
        });

        self.pending = Some(PendingSearch {
            query,
            scheduled_at: Instant::now(),
            handle,
        });
    }

    /// Abort the pending timer, if any
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            if !pending.handle.is_finished() {
                log::trace!("Cancelling debounced search for '{}'", pending.query);
            }
            pending.handle.abort();
        }
    }

    /// Check if there's a scheduled search that hasn't fired yet
    pub fn has_pending_search(&self) -> bool {
        self.pending
            .as_ref()
            .map_or(false, |pending| !pending.handle.is_finished())
    }

    /// Term of the most recently scheduled search while it is still pending
    pub fn pending_term(&self) -> Option<&str> {
        self.pending
            .as_ref()
            .filter(|pending| !pending.handle.is_finished())
            .map(|pending| pending.query.as_str())
    }

    /// Get remaining time until the pending search fires
    pub fn time_until_ready(&self) -> Option<Duration> {
        let pending = self.pending.as_ref()?;
        let elapsed = pending.scheduled_at.elapsed();
        Some(self.debounce_delay.saturating_sub(elapsed))
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
