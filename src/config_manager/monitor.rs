use serde::{Deserialize, Serialize};

/// DeepL quota monitor and alert mail settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Key whose usage is watched; empty means the DeepL provider key
    #[serde(rename = "deepl_api_key")]
    #[serde(default)]
    pub deepl_api_key: String,

    #[serde(default = "default_high_threshold")]
    pub high_threshold: f64,

    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,

    /// Bearer token expected on `/api/cron-monitor`
    #[serde(default)]
    pub cron_secret: String,

    /// Run the check in-process every N seconds
    #[serde(default)]
    pub interval_secs: Option<u64>,

    #[serde(default)]
    pub smtp: SmtpConfig,
}

fn default_high_threshold() -> f64 {
    0.85
}

fn default_critical_threshold() -> f64 {
    0.95
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            deepl_api_key: String::new(),
            high_threshold: default_high_threshold(),
            critical_threshold: default_critical_threshold(),
            cron_secret: String::new(),
            interval_secs: None,
            smtp: SmtpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_relay")]
    pub relay: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Sender address; defaults to `username`
    #[serde(default)]
    pub from: String,

    #[serde(default)]
    pub to: String,
}

fn default_relay() -> String {
    "smtp.gmail.com".to_string()
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            relay: default_relay(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
            to: String::new(),
        }
    }
}
