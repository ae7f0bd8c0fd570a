use super::{Agent, InMemoryMetrics, LogAggregator, MetricRegistry, Shim};
use crate::app::config::{EnrichmentConfig, SharedConfig};
use crate::domain::LinkingMetadata;

/// The agent API when no agent is running.
///
/// It has no shim; every integration detects that and formats records
/// without enrichment.
#[derive(Debug, Default)]
pub struct StubAgent {
    config: SharedConfig,
    metrics: InMemoryMetrics,
}

impl StubAgent {
    pub fn new() -> Self {
        Self::with_config(EnrichmentConfig::default())
    }

    pub fn with_config(config: EnrichmentConfig) -> Self {
        Self {
            config: SharedConfig::new(config),
            metrics: InMemoryMetrics::new(),
        }
    }
}

impl Agent for StubAgent {
    fn shim(&self) -> Option<&dyn Shim> {
        None
    }

    fn linking_metadata(&self, _link_program_context: bool) -> LinkingMetadata {
        LinkingMetadata::new()
    }

    fn config(&self) -> &SharedConfig {
        &self.config
    }

    fn metrics(&self) -> &dyn MetricRegistry {
        &self.metrics
    }

    fn logs(&self) -> Option<&dyn LogAggregator> {
        None
    }
}
