use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct CachedMean {
    value: f64,
    computed_at: Instant,
}

/// Cached global prior mean `m` with a time-based refresh policy
#[derive(Debug)]
pub struct PriorMeanCache {
    ttl: Duration,
    default_mean: f64,
    state: RwLock<Option<CachedMean>>,
}

impl PriorMeanCache {
    pub fn new(ttl: Duration, default_mean: f64) -> Self {
        Self {
            ttl,
            default_mean,
            state: RwLock::new(None),
        }
    }

    /// Cached value if it is still fresh
    pub async fn fresh(&self) -> Option<f64> {
        let state = self.state.read().await;
        state
            .filter(|cached| cached.computed_at.elapsed() < self.ttl)
            .map(|cached| cached.value)
    }

    /// Last stored value regardless of age, or the default before the first refresh
    pub async fn current(&self) -> f64 {
        self.state
            .read()
            .await
            .map(|cached| cached.value)
            .unwrap_or(self.default_mean)
    }

    /// Store a newly computed mean; `None` (nothing rated) stores the default.
    ///
    /// Returns the previous and the stored value.
    pub async fn store(&self, computed: Option<f64>) -> (Option<f64>, f64) {
        let value = computed.unwrap_or(self.default_mean);
        let mut state = self.state.write().await;
        let previous = state.map(|cached| cached.value);
        *state = Some(CachedMean {
            value,
            computed_at: Instant::now(),
        });
        (previous, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_at_the_default() {
        let cache = PriorMeanCache::new(Duration::from_secs(60), 5.5);
        assert_eq!(cache.fresh().await, None);
        assert_eq!(cache.current().await, 5.5);
    }

    #[tokio::test]
    async fn stores_and_reports_previous_value() {
        let cache = PriorMeanCache::new(Duration::from_secs(60), 5.5);

        let (previous, stored) = cache.store(Some(7.25)).await;
        assert_eq!(previous, None);
        assert_eq!(stored, 7.25);
        assert_eq!(cache.fresh().await, Some(7.25));

        let (previous, stored) = cache.store(None).await;
        assert_eq!(previous, Some(7.25));
        assert_eq!(stored, 5.5);
    }

    #[tokio::test]
    async fn expires_after_ttl() {
        let cache = PriorMeanCache::new(Duration::ZERO, 5.5);
        cache.store(Some(8.0)).await;

        assert_eq!(cache.fresh().await, None);
        assert_eq!(cache.current().await, 8.0);
    }
}
