// Lock-free metric counters keyed by name.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Counter {
    call_count: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_call_count(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }
}

pub trait MetricRegistry: Send + Sync {
    fn get_or_create_metric(&self, name: &str) -> Arc<Counter>;

    fn get_metric(&self, name: &str) -> Option<Arc<Counter>>;
}

#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counters: RwLock<HashMap<String, Arc<Counter>>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call counts sorted by metric name.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let mut counts: Vec<_> = self
            .counters
            .read()
            .iter()
            .map(|(name, counter)| (name.clone(), counter.call_count()))
            .collect();
        counts.sort();
        counts
    }

    pub fn call_count(&self, name: &str) -> u64 {
        self.get_metric(name)
            .map(|counter| counter.call_count())
            .unwrap_or(0)
    }
}

impl MetricRegistry for InMemoryMetrics {
    fn get_or_create_metric(&self, name: &str) -> Arc<Counter> {
        if let Some(counter) = self.counters.read().get(name) {
            return Arc::clone(counter);
        }

        let mut counters = self.counters.write();
        Arc::clone(
            counters
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Counter::new())),
        )
    }

    fn get_metric(&self, name: &str) -> Option<Arc<Counter>> {
        self.counters.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_get_or_create_returns_same_counter() {
        let metrics = InMemoryMetrics::new();
        metrics.get_or_create_metric("Logging/lines").increment_call_count();
        metrics.get_or_create_metric("Logging/lines").increment_call_count();

        assert_eq!(metrics.call_count("Logging/lines"), 2);
        assert_eq!(metrics.call_count("Logging/lines/info"), 0);
        assert!(metrics.get_metric("Logging/lines/info").is_none());
    }

    #[test]
    fn test_concurrent_increments() {
        let metrics = Arc::new(InMemoryMetrics::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.get_or_create_metric("Logging/lines").increment_call_count();
                    }
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().is_ok());
        }

        assert_eq!(metrics.call_count("Logging/lines"), 8000);
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let metrics = InMemoryMetrics::new();
        metrics.get_or_create_metric("b").increment_call_count();
        metrics.get_or_create_metric("a").increment_call_count();

        assert_eq!(
            metrics.snapshot(),
            vec![("a".to_string(), 1), ("b".to_string(), 1)]
        );
    }
}
