use serde::{Deserialize, Serialize};

/// Where translation analytics events are posted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Events go to `{base_url}/api/analytics`
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_enabled() -> bool {
    true
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

impl AnalyticsConfig {
    pub fn endpoint(&self) -> String {
        format!("{}/api/analytics", self.base_url.trim_end_matches('/'))
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_base_url(),
        }
    }
}
