//! Fitted curve storage

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use mixopt_common::{FittedCurve, HillCurve};
use parking_lot::Mutex;

use super::StoreError;

/// Trait for fitted curve storage backends
#[async_trait]
pub trait CurveStore: Send + Sync {
    /// Insert or replace the curve for its channel
    async fn put(&self, curve: FittedCurve) -> Result<(), StoreError>;

    /// Insert or replace several curves; either all are stored or none
    async fn put_all(&self, curves: Vec<FittedCurve>) -> Result<(), StoreError>;

    /// Get the curve for a channel
    async fn get(&self, channel: &str) -> Option<FittedCurve>;

    /// All stored curves, sorted by channel
    async fn all(&self) -> Vec<FittedCurve>;

    /// Remove the curve for a channel
    async fn remove(&self, channel: &str) -> Result<FittedCurve, StoreError>;

    /// Number of stored curves
    async fn count(&self) -> usize;

    /// Curve parameters keyed by channel, as the optimizer consumes them
    async fn curve_map(&self) -> HashMap<String, HillCurve> {
        self.all()
            .await
            .into_iter()
            .map(|fitted| (fitted.channel, fitted.curve))
            .collect()
    }
}

/// In-memory curve store with a channel cap
///
/// Writers serialize on `writes` so the cap check and the insert see the
/// same channel count; reads go straight to the map.
pub struct InMemoryCurveStore {
    curves: DashMap<String, FittedCurve>,
    writes: Mutex<()>,
    max_curves: usize,
}

impl InMemoryCurveStore {
    pub fn new(max_curves: usize) -> Self {
        Self {
            curves: DashMap::new(),
            writes: Mutex::new(()),
            max_curves,
        }
    }

    /// Channels in `channels` that are not stored yet
    fn new_channels<'a>(&self, channels: impl Iterator<Item = &'a str>) -> usize {
        let mut seen = std::collections::HashSet::new();
        channels
            .filter(|c| seen.insert(*c) && !self.curves.contains_key(*c))
            .count()
    }
}

impl Default for InMemoryCurveStore {
    fn default() -> Self {
        Self::new(crate::MAX_STORED_CURVES)
    }
}

#[async_trait]
impl CurveStore for InMemoryCurveStore {
    async fn put(&self, curve: FittedCurve) -> Result<(), StoreError> {
        self.put_all(vec![curve]).await
    }

    async fn put_all(&self, curves: Vec<FittedCurve>) -> Result<(), StoreError> {
        let _guard = self.writes.lock();

        // Refits of a known channel never count against the cap
        let added = self.new_channels(curves.iter().map(|c| c.channel.as_str()));
        if self.curves.len() + added > self.max_curves {
            return Err(StoreError::CapacityExceeded(self.max_curves));
        }
        for curve in curves {
            self.curves.insert(curve.channel.clone(), curve);
        }
        Ok(())
    }

    async fn get(&self, channel: &str) -> Option<FittedCurve> {
        self.curves.get(channel).map(|c| c.clone())
    }

    async fn all(&self) -> Vec<FittedCurve> {
        let mut curves: Vec<FittedCurve> = self.curves.iter().map(|c| c.value().clone()).collect();
        curves.sort_by(|a, b| a.channel.cmp(&b.channel));
        curves
    }

    async fn remove(&self, channel: &str) -> Result<FittedCurve, StoreError> {
        let _guard = self.writes.lock();
        self.curves
            .remove(channel)
            .map(|(_, curve)| curve)
            .ok_or_else(|| StoreError::NotFound(channel.to_string()))
    }

    async fn count(&self) -> usize {
        self.curves.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixopt_common::FitDiagnostics;
    use std::sync::Arc;

    fn fitted(channel: &str, alpha: f64) -> FittedCurve {
        FittedCurve {
            channel: channel.to_string(),
            curve: HillCurve::new(alpha, 1_000.0, 1.0).unwrap(),
            fit: FitDiagnostics {
                r_squared: 0.99,
                rmse: 1.0,
                iterations: 10,
                converged: true,
                final_loss: 1e-6,
                observations: 8,
            },
        }
    }

    #[tokio::test]
    async fn test_put_get_replace() {
        let store = InMemoryCurveStore::new(4);
        store.put(fitted("search", 100.0)).await.unwrap();
        store.put(fitted("search", 200.0)).await.unwrap();

        assert_eq!(store.count().await, 1);
        assert_eq!(store.get("search").await.unwrap().curve.alpha, 200.0);
        assert!(store.get("tv").await.is_none());
    }

    #[tokio::test]
    async fn test_capacity() {
        let store = InMemoryCurveStore::new(2);
        store.put(fitted("a", 1.0)).await.unwrap();
        store.put(fitted("b", 1.0)).await.unwrap();

        assert!(matches!(
            store.put(fitted("c", 1.0)).await,
            Err(StoreError::CapacityExceeded(2))
        ));
        // Replacing an existing channel is still allowed
        assert!(store.put(fitted("a", 2.0)).await.is_ok());
    }

    #[tokio::test]
    async fn test_put_all_is_all_or_nothing() {
        let store = InMemoryCurveStore::new(2);
        store.put(fitted("a", 1.0)).await.unwrap();

        let result = store.put_all(vec![fitted("b", 1.0), fitted("c", 1.0)]).await;
        assert!(matches!(result, Err(StoreError::CapacityExceeded(2))));
        assert_eq!(store.count().await, 1);
        assert!(store.get("b").await.is_none());

        // A refit plus one new channel fits exactly
        store.put_all(vec![fitted("a", 5.0), fitted("b", 1.0)]).await.unwrap();
        assert_eq!(store.count().await, 2);
        assert_eq!(store.get("a").await.unwrap().curve.alpha, 5.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_respect_capacity() {
        let store = Arc::new(InMemoryCurveStore::new(5));

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.put(fitted(&format!("ch{}", i), 1.0)).await })
            })
            .collect();

        let mut stored = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                stored += 1;
            }
        }

        assert_eq!(stored, 5);
        assert_eq!(store.count().await, 5);
    }

    #[tokio::test]
    async fn test_all_sorted_and_remove() {
        let store = InMemoryCurveStore::default();
        for name in ["social", "display", "search"] {
            store.put(fitted(name, 10.0)).await.unwrap();
        }

        let names: Vec<String> = store.all().await.into_iter().map(|c| c.channel).collect();
        assert_eq!(names, vec!["display", "search", "social"]);

        let removed = store.remove("display").await.unwrap();
        assert_eq!(removed.channel, "display");
        assert!(matches!(
            store.remove("display").await,
            Err(StoreError::NotFound(_))
        ));

        let map = store.curve_map().await;
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("search"));
    }
}
