use crate::domain::LogRecord;
use parking_lot::Mutex;
use std::cmp::{Ordering as CmpOrdering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sink for forwarded log records.
pub trait LogAggregator: Send + Sync {
    fn add(&self, record: LogRecord, priority: Option<f64>);
}

#[derive(Debug)]
struct Sample {
    priority: f64,
    seq: u64,
    record: LogRecord,
}

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for Sample {}

impl PartialOrd for Sample {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sample {
    // Lower priority first, then newer first, so the heap top is the sample
    // to evict.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Bounded store of forwarded records keyed by sampling priority.
///
/// Holds at most `capacity` records. Once full, a new record replaces the
/// lowest-priority stored record only when its own priority is strictly
/// higher; otherwise it is dropped. Records without a priority rank as 0.
#[derive(Debug)]
pub struct PriorityLogAggregator {
    capacity: usize,
    samples: Mutex<BinaryHeap<Reverse<Sample>>>,
    seen: AtomicU64,
    next_seq: AtomicU64,
}

impl PriorityLogAggregator {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: Mutex::new(BinaryHeap::with_capacity(capacity.min(1024))),
            seen: AtomicU64::new(0),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records offered since creation, stored or not.
    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns the stored records in arrival order.
    pub fn drain(&self) -> Vec<LogRecord> {
        let mut samples: Vec<Sample> = self
            .samples
            .lock()
            .drain()
            .map(|Reverse(sample)| sample)
            .collect();
        samples.sort_by_key(|sample| sample.seq);
        samples.into_iter().map(|sample| sample.record).collect()
    }
}

impl LogAggregator for PriorityLogAggregator {
    fn add(&self, record: LogRecord, priority: Option<f64>) {
        self.seen.fetch_add(1, Ordering::Relaxed);
        if self.capacity == 0 {
            return;
        }

        let sample = Sample {
            priority: priority.unwrap_or(0.0),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            record,
        };

        let mut samples = self.samples.lock();
        if samples.len() < self.capacity {
            samples.push(Reverse(sample));
            return;
        }

        let evict = samples
            .peek()
            .is_some_and(|Reverse(lowest)| sample.priority > lowest.priority);
        if evict {
            samples.pop();
            samples.push(Reverse(sample));
        } else {
            tracing::debug!(
                capacity = self.capacity,
                "Log aggregator full; dropping forwarded record"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str) -> LogRecord {
        LogRecord::new().with("message", message)
    }

    #[test]
    fn test_stores_until_capacity() {
        let aggregator = PriorityLogAggregator::new(2);
        aggregator.add(record("a"), None);
        aggregator.add(record("b"), None);
        aggregator.add(record("c"), None);

        assert_eq!(aggregator.seen(), 3);
        let drained = aggregator.drain();
        let messages: Vec<_> = drained.iter().filter_map(LogRecord::message).collect();
        assert_eq!(messages, vec!["a", "b"]);
        assert!(aggregator.is_empty());
    }

    #[test]
    fn test_higher_priority_displaces_lowest() {
        let aggregator = PriorityLogAggregator::new(2);
        aggregator.add(record("low"), Some(0.1));
        aggregator.add(record("mid"), Some(0.5));
        aggregator.add(record("high"), Some(0.9));
        aggregator.add(record("lower"), Some(0.05));

        let drained = aggregator.drain();
        let messages: Vec<_> = drained.iter().filter_map(LogRecord::message).collect();
        assert_eq!(messages, vec!["mid", "high"]);
    }

    #[test]
    fn test_zero_capacity_drops_everything() {
        let aggregator = PriorityLogAggregator::new(0);
        aggregator.add(record("a"), Some(1.0));
        assert_eq!(aggregator.seen(), 1);
        assert!(aggregator.is_empty());
    }
}
