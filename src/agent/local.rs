use super::trace::{self, Segment, SegmentGuard};
use super::{Agent, InMemoryMetrics, LogAggregator, MetricRegistry, PriorityLogAggregator, Shim};
use crate::app::config::{EnrichmentConfig, SharedConfig};
use crate::domain::LinkingMetadata;
use crate::domain::linking_metadata::{
    ENTITY_GUID, ENTITY_NAME, ENTITY_TYPE, HOSTNAME, SPAN_ID, TRACE_ID,
};
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Default)]
struct LocalShim {
    wrapped: RwLock<HashSet<String>>,
}

impl Shim for LocalShim {
    fn is_wrapped(&self, entry_point: &str) -> bool {
        self.wrapped.read().contains(entry_point)
    }

    fn active_segment(&self) -> Option<Segment> {
        trace::current()
    }
}

/// In-process agent backed by the crate's own configuration.
///
/// Entity identity and hostname come from `EnrichmentConfig`; trace
/// identifiers come from the segment active on the calling thread.
#[derive(Debug)]
pub struct LocalAgent {
    config: SharedConfig,
    hostname: String,
    metrics: InMemoryMetrics,
    logs: PriorityLogAggregator,
    shim: LocalShim,
}

impl LocalAgent {
    pub fn new(config: EnrichmentConfig) -> Self {
        let hostname = config.resolved_hostname();
        let capacity = config.application_logging.forwarding.max_samples_stored;
        Self {
            config: SharedConfig::new(config),
            hostname,
            metrics: InMemoryMetrics::new(),
            logs: PriorityLogAggregator::new(capacity),
            shim: LocalShim::default(),
        }
    }

    pub fn in_memory_metrics(&self) -> &InMemoryMetrics {
        &self.metrics
    }

    pub fn aggregator(&self) -> &PriorityLogAggregator {
        &self.logs
    }

    /// Marks a host entry point as already instrumented by the agent.
    pub fn wrap(&self, entry_point: &str) {
        self.shim.wrapped.write().insert(entry_point.to_string());
    }

    /// Opens a segment on the current thread with generated ids.
    pub fn start_segment(&self, priority: Option<f64>) -> SegmentGuard {
        Segment::generate(priority).enter()
    }
}

impl Agent for LocalAgent {
    fn shim(&self) -> Option<&dyn Shim> {
        Some(&self.shim)
    }

    fn linking_metadata(&self, link_program_context: bool) -> LinkingMetadata {
        let mut metadata = self.config.read(|config| {
            LinkingMetadata::new()
                .with(ENTITY_NAME, config.primary_app_name())
                .with(ENTITY_TYPE, config.entity_type.as_str())
                .with(ENTITY_GUID, config.entity_guid.clone().unwrap_or_default())
        });
        metadata = metadata.with(HOSTNAME, self.hostname.as_str());

        if link_program_context && let Some(segment) = trace::current() {
            metadata = metadata
                .with(TRACE_ID, segment.trace_id)
                .with(SPAN_ID, segment.span_id);
        }

        metadata
    }

    fn config(&self) -> &SharedConfig {
        &self.config
    }

    fn metrics(&self) -> &dyn MetricRegistry {
        &self.metrics
    }

    fn logs(&self) -> Option<&dyn LogAggregator> {
        Some(&self.logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> LocalAgent {
        LocalAgent::new(EnrichmentConfig {
            app_name: vec!["app".to_string(), "secondary".to_string()],
            entity_guid: Some("g1".to_string()),
            hostname: Some("h1".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_metadata_outside_trace() {
        let metadata = agent().linking_metadata(true);
        assert_eq!(metadata.get(ENTITY_NAME), Some("app"));
        assert_eq!(metadata.get(ENTITY_TYPE), Some("SERVICE"));
        assert_eq!(metadata.get(ENTITY_GUID), Some("g1"));
        assert_eq!(metadata.get(HOSTNAME), Some("h1"));
        assert!(!metadata.contains_key(TRACE_ID));
        assert!(!metadata.contains_key(SPAN_ID));
    }

    #[test]
    fn test_metadata_inside_trace() {
        let agent = agent();
        let _guard = Segment::new("t1", "s1", Some(0.7)).enter();

        let metadata = agent.linking_metadata(true);
        assert_eq!(metadata.get(TRACE_ID), Some("t1"));
        assert_eq!(metadata.get(SPAN_ID), Some("s1"));
        assert_eq!(agent.active_priority(), Some(0.7));

        let without_context = agent.linking_metadata(false);
        assert!(!without_context.contains_key(TRACE_ID));
    }

    #[test]
    fn test_wrap_marks_entry_point() {
        let agent = agent();
        let shim = agent.shim().unwrap();
        assert!(!shim.is_wrapped("format_chain::create_logger"));
        agent.wrap("format_chain::create_logger");
        assert!(shim.is_wrapped("format_chain::create_logger"));
    }

    #[test]
    fn test_aggregator_capacity_follows_config() {
        let mut config = EnrichmentConfig::default();
        config.application_logging.forwarding.max_samples_stored = 3;
        let agent = LocalAgent::new(config);
        assert_eq!(agent.aggregator().capacity(), 3);
        assert!(agent.is_active());
    }
}
