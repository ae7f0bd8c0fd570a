use crate::agent::Agent;
use crate::app::config::EnrichmentConfig;
use std::fmt;

/// What the enricher does to one record. Derived per record, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrichmentMode {
    /// No record rewrite: the agent is inactive, or application logging is
    /// on with neither forwarding nor local decorating selected.
    Disabled,
    /// Application logging is off; add linking metadata only.
    LogEnricher,
    /// Append the `NR-LINKING` blob to the message.
    LocalDecorating,
    /// Enrich and submit to the agent's log aggregator.
    Forwarding,
}

impl EnrichmentMode {
    /// Forwarding wins over local decorating. Forwarding also requires the
    /// agent to expose an aggregator.
    pub fn from_config(
        config: &EnrichmentConfig,
        agent_active: bool,
        has_aggregator: bool,
    ) -> Self {
        if !agent_active {
            EnrichmentMode::Disabled
        } else if config.is_forwarding_enabled() && has_aggregator {
            EnrichmentMode::Forwarding
        } else if config.is_local_decorating_enabled() {
            EnrichmentMode::LocalDecorating
        } else if config.is_log_enricher() {
            EnrichmentMode::LogEnricher
        } else {
            EnrichmentMode::Disabled
        }
    }

    pub fn for_agent(agent: &dyn Agent) -> Self {
        agent.config().read(|config| {
            Self::from_config(config, agent.is_active(), agent.logs().is_some())
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentMode::Disabled => "disabled",
            EnrichmentMode::LogEnricher => "log_enricher",
            EnrichmentMode::LocalDecorating => "local_decorating",
            EnrichmentMode::Forwarding => "forwarding",
        }
    }

    /// Whether structured enrichment (error, timestamp, metadata) runs.
    pub fn rewrites_fields(&self) -> bool {
        matches!(self, EnrichmentMode::LogEnricher | EnrichmentMode::Forwarding)
    }
}

impl fmt::Display for EnrichmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
