//! The monitoring agent as seen by the enricher.
//!
//! The enricher never owns agent state. It talks to the agent through the
//! narrow `Agent` trait: linking metadata, the shared configuration, metric
//! counters, the forwarding aggregator and the instrumentation shim.
//!
//! Two implementations ship with the crate:
//! - `StubAgent`: the inactive agent. It has no shim, which tells the
//!   integrations to degrade to plain pass-through formatting.
//! - `LocalAgent`: an in-process agent with in-memory metrics, a bounded
//!   priority aggregator and a thread-local trace context.

pub mod aggregator;
pub mod local;
pub mod metrics;
pub mod stub;
pub mod trace;

pub use aggregator::{LogAggregator, PriorityLogAggregator};
pub use local::LocalAgent;
pub use metrics::{Counter, InMemoryMetrics, MetricRegistry};
pub use stub::StubAgent;
pub use trace::{Segment, SegmentGuard, Transaction};

use crate::app::config::SharedConfig;
use crate::domain::LinkingMetadata;

/// Instrumentation hooks exposed by an active agent.
#[cfg_attr(test, mockall::automock)]
pub trait Shim: Send + Sync {
    /// Whether the agent already wrapped the named host entry point.
    fn is_wrapped(&self, entry_point: &str) -> bool;

    /// The innermost active segment on the calling thread.
    fn active_segment(&self) -> Option<Segment>;
}

pub trait Agent: Send + Sync {
    /// `None` for the stub agent.
    fn shim(&self) -> Option<&dyn Shim>;

    /// Fresh linking metadata. With `link_program_context` the identifiers
    /// of the active trace, if any, are included.
    fn linking_metadata(&self, link_program_context: bool) -> LinkingMetadata;

    fn config(&self) -> &SharedConfig;

    fn metrics(&self) -> &dyn MetricRegistry;

    /// The forwarding aggregator, when the agent has one.
    fn logs(&self) -> Option<&dyn LogAggregator>;

    fn is_active(&self) -> bool {
        self.shim().is_some()
    }

    /// Sampling priority of the active transaction.
    fn active_priority(&self) -> Option<f64> {
        self.shim()
            .and_then(Shim::active_segment)
            .and_then(|segment| segment.transaction.priority)
    }
}
