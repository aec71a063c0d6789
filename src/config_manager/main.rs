use serde::{Deserialize, Serialize};
use crate::config_manager::analytics::AnalyticsConfig;
use crate::config_manager::monitor::MonitorConfig;
use crate::config_manager::providers::ProvidersConfig;
use crate::config_manager::system::SystemConfig;

/// Main configuration for the proxy, loaded from YAML or JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "system_config")]
    #[serde(default)]
    pub system_config: SystemConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl Config {
    /// Load configuration from a YAML or JSON file.
    /// `${VAR}` placeholders are resolved from the environment.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        use crate::config_manager::utils::{read_config_file, validate_config};
        let value = read_config_file(path)?;
        validate_config(&value)
    }

    /// DeepL key used by the quota monitor; falls back to the provider key.
    pub fn monitor_deepl_key(&self) -> Option<&str> {
        non_empty(&self.monitor.deepl_api_key)
            .or_else(|| non_empty(&self.providers.deepl.api_key))
    }
}

/// Empty strings mean "not configured" once env substitution has run
pub fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
