use std::cell::RefCell;
use std::marker::PhantomData;
use uuid::Uuid;

thread_local! {
    static SEGMENTS: RefCell<Vec<Segment>> = const { RefCell::new(Vec::new()) };
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    pub priority: Option<f64>,
}

/// A unit of traced work; the innermost one supplies `trace.id`/`span.id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub trace_id: String,
    pub span_id: String,
    pub transaction: Transaction,
}

impl Segment {
    pub fn new(
        trace_id: impl Into<String>,
        span_id: impl Into<String>,
        priority: Option<f64>,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            transaction: Transaction { priority },
        }
    }

    /// A child of the current segment, or the root of a new trace.
    pub fn generate(priority: Option<f64>) -> Self {
        let trace_id = current()
            .map(|parent| parent.trace_id)
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        let span_id = Uuid::new_v4().simple().to_string()[..16].to_string();
        Self::new(trace_id, span_id, priority)
    }

    /// Makes this segment the innermost one on the current thread until the
    /// guard drops.
    pub fn enter(self) -> SegmentGuard {
        SEGMENTS.with(|segments| segments.borrow_mut().push(self));
        SegmentGuard {
            _not_send: PhantomData,
        }
    }
}

/// Pops its segment on drop. Bound to the thread that entered it.
#[must_use = "the segment is exited when the guard is dropped"]
pub struct SegmentGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for SegmentGuard {
    fn drop(&mut self) {
        SEGMENTS.with(|segments| {
            segments.borrow_mut().pop();
        });
    }
}

pub fn current() -> Option<Segment> {
    SEGMENTS.with(|segments| segments.borrow().last().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_exit() {
        assert!(current().is_none());
        {
            let _guard = Segment::new("t1", "s1", Some(1.5)).enter();
            let segment = current().unwrap();
            assert_eq!(segment.trace_id, "t1");
            assert_eq!(segment.transaction.priority, Some(1.5));
        }
        assert!(current().is_none());
    }

    #[test]
    fn test_nested_segments_share_trace_id() {
        let _root = Segment::generate(None).enter();
        let root = current().unwrap();
        assert_eq!(root.trace_id.len(), 32);
        assert_eq!(root.span_id.len(), 16);

        {
            let _child = Segment::generate(None).enter();
            let child = current().unwrap();
            assert_eq!(child.trace_id, root.trace_id);
            assert_ne!(child.span_id, root.span_id);
        }

        assert_eq!(current().unwrap().span_id, root.span_id);
    }

    #[test]
    fn test_segments_are_thread_local() {
        let _guard = Segment::new("t1", "s1", None).enter();
        let other = std::thread::spawn(current).join().unwrap();
        assert!(other.is_none());
    }
}
