use futures::FutureExt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Notify;

/// Counts successful recomputes since the last rank reassignment.
///
/// Crossing the threshold wakes the maintenance loop early.
#[derive(Debug)]
pub struct AggregationEvents {
    count: AtomicU64,
    threshold: u64,
    notify: Notify,
}

impl AggregationEvents {
    /// A threshold of 0 disables early wake-ups.
    pub fn new(threshold: u64) -> Self {
        Self {
            count: AtomicU64::new(0),
            threshold,
            notify: Notify::new(),
        }
    }

    pub fn record(&self) -> u64 {
        let count = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        if self.threshold > 0 && count >= self.threshold {
            self.notify.notify_one();
        }
        count
    }

    pub fn pending(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    /// Reset the counter, returning how many events it held
    pub fn take(&self) -> u64 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Put back events taken by a run that did not complete
    pub fn restore(&self, count: u64) {
        if count > 0 {
            self.count.fetch_add(count, Ordering::AcqRel);
        }
    }

    pub fn threshold_reached(&self) -> bool {
        self.threshold > 0 && self.pending() >= self.threshold
    }

    pub async fn notified(&self) {
        self.notify.notified().await
    }

    /// Drop a wake-up stored while nobody was waiting
    pub fn discard_wakeup(&self) {
        let _ = self.notify.notified().now_or_never();
    }
}
