use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Environment error: {0}")]
    EnvError(String),
}

pub const DEFAULT_MAX_SAMPLES_STORED: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggle {
    pub enabled: bool,
}

impl FeatureToggle {
    pub fn on() -> Self {
        Self { enabled: true }
    }

    pub fn off() -> Self {
        Self { enabled: false }
    }
}

impl Default for FeatureToggle {
    fn default() -> Self {
        Self::off()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardingConfig {
    pub enabled: bool,
    pub max_samples_stored: usize,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_samples_stored: DEFAULT_MAX_SAMPLES_STORED,
        }
    }
}

/// The `application_logging.*` section of the agent configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationLoggingConfig {
    pub enabled: bool,
    pub metrics: FeatureToggle,
    pub forwarding: ForwardingConfig,
    pub local_decorating: FeatureToggle,
}

impl Default for ApplicationLoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            metrics: FeatureToggle::on(),
            forwarding: ForwardingConfig::default(),
            local_decorating: FeatureToggle::off(),
        }
    }
}

/// Process-wide configuration snapshot read by the enricher on every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub app_name: Vec<String>,
    pub entity_guid: Option<String>,
    pub entity_type: String,
    pub hostname: Option<String>,
    pub application_logging: ApplicationLoggingConfig,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            app_name: vec!["log-enricher".to_string()],
            entity_guid: None,
            entity_type: "SERVICE".to_string(),
            hostname: None,
            application_logging: ApplicationLoggingConfig::default(),
        }
    }
}

impl EnrichmentConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EnrichmentConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Defaults, then the optional file, then `LOG_ENRICHER_*` variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("LOG_ENRICHER_CONFIG_FILE").map(Into::into));

        let mut config = match file {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)?;
                toml::from_str(&contents)?
            }
            None => EnrichmentConfig::default(),
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = EnrichmentConfig::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(names) = std::env::var("LOG_ENRICHER_APP_NAME") {
            self.app_name = names
                .split(';')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        load_env_string_opt("LOG_ENRICHER_ENTITY_GUID", &mut self.entity_guid);
        load_env_string_opt("LOG_ENRICHER_HOSTNAME", &mut self.hostname);

        let logging = &mut self.application_logging;
        load_env_var("LOG_ENRICHER_APPLICATION_LOGGING_ENABLED", &mut logging.enabled)?;
        load_env_var("LOG_ENRICHER_METRICS_ENABLED", &mut logging.metrics.enabled)?;
        load_env_var(
            "LOG_ENRICHER_FORWARDING_ENABLED",
            &mut logging.forwarding.enabled,
        )?;
        load_env_var(
            "LOG_ENRICHER_FORWARDING_MAX_SAMPLES_STORED",
            &mut logging.forwarding.max_samples_stored,
        )?;
        load_env_var(
            "LOG_ENRICHER_LOCAL_DECORATING_ENABLED",
            &mut logging.local_decorating.enabled,
        )?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.iter().all(|name| name.trim().is_empty()) {
            return Err(ConfigError::InvalidConfig(
                "At least one application name must be configured".to_string(),
            ));
        }

        if self.entity_type.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Entity type must not be empty".to_string(),
            ));
        }

        let logging = &self.application_logging;
        if logging.forwarding.enabled && logging.forwarding.max_samples_stored == 0 {
            return Err(ConfigError::InvalidConfig(
                "Forwarding max_samples_stored must be greater than 0".to_string(),
            ));
        }

        if logging.forwarding.enabled && logging.local_decorating.enabled {
            tracing::warn!(
                "Both log forwarding and local decorating are enabled; forwarding takes precedence"
            );
        }

        Ok(())
    }

    pub fn primary_app_name(&self) -> &str {
        self.app_name.first().map(String::as_str).unwrap_or("")
    }

    /// Configured hostname, falling back to the machine's hostname.
    pub fn resolved_hostname(&self) -> String {
        self.hostname.clone().unwrap_or_else(|| {
            hostname::get()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown".to_string())
        })
    }

    pub fn is_log_enricher(&self) -> bool {
        !self.application_logging.enabled
    }

    pub fn is_metrics_enabled(&self) -> bool {
        self.application_logging.enabled && self.application_logging.metrics.enabled
    }

    pub fn is_forwarding_enabled(&self) -> bool {
        self.application_logging.enabled && self.application_logging.forwarding.enabled
    }

    pub fn is_local_decorating_enabled(&self) -> bool {
        self.application_logging.enabled && self.application_logging.local_decorating.enabled
    }
}

/// Shared handle over the live configuration.
///
/// Readers take a snapshot per record. The only writer inside the crate is
/// the auto-instrumentation collision rule.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<EnrichmentConfig>>,
}

impl SharedConfig {
    pub fn new(config: EnrichmentConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn snapshot(&self) -> EnrichmentConfig {
        self.inner.read().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&EnrichmentConfig) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn update(&self, f: impl FnOnce(&mut EnrichmentConfig)) {
        f(&mut self.inner.write());
    }

    pub fn disable_application_logging(&self) {
        self.inner.write().application_logging.enabled = false;
    }
}

impl From<EnrichmentConfig> for SharedConfig {
    fn from(config: EnrichmentConfig) -> Self {
        Self::new(config)
    }
}

/// Helper function to load and parse an environment variable.
/// Returns Ok(()) if the variable doesn't exist (keeps default).
fn load_env_var<T>(name: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(value) = std::env::var(name) {
        *target = value
            .trim()
            .parse()
            .map_err(|e| ConfigError::EnvError(format!("Invalid {name}: {e}")))?;
    }
    Ok(())
}

/// Helper function to load an optional string environment variable.
fn load_env_string_opt(name: &str, target: &mut Option<String>) {
    if let Ok(value) = std::env::var(name) {
        *target = Some(value);
    }
}
