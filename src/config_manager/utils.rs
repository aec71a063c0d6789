use std::fs;
use std::path::Path;
use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::config_manager::main::Config;

/// Read a YAML or JSON configuration file with environment variable substitution
pub fn read_config_file(config_path: &str) -> Result<Value> {
    if !Path::new(config_path).exists() {
        anyhow::bail!("Configuration file not found: {}", config_path);
    }

    let content = load_text_file(config_path)?;
    if content.trim().is_empty() {
        anyhow::bail!("Configuration file is empty: {}", config_path);
    }

    let content = substitute_env_vars(&content, |name| std::env::var(name).ok())?;

    let path_lower = config_path.to_lowercase();
    let value: Value = if path_lower.ends_with(".json") {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(value)
}

/// Replace `${VAR_NAME}` with the value returned by `lookup`.
/// Unset variables become empty strings so the setting reads as unconfigured.
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let replaced = pattern.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        match lookup(var_name) {
            Some(value) => value,
            None => {
                debug!("Config variable {} is not set", var_name);
                String::new()
            }
        }
    });
    Ok(replaced.into_owned())
}

/// Validate configuration data against the Config model
pub fn validate_config(config_data: &Value) -> Result<Config> {
    let config: Config = serde_json::from_value(config_data.clone())?;
    Ok(config)
}

fn load_text_file(file_path: &str) -> Result<String> {
    let mut buffer = fs::read(file_path)?;
    // Remove BOM if present
    if buffer.starts_with(&[0xEF, 0xBB, 0xBF]) {
        buffer.drain(0..3);
    }
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::interface::ServiceKind;

    #[test]
    fn substitutes_known_and_blanks_unknown_variables() {
        let out = substitute_env_vars("key: ${SET_ONE}\nother: \"${NOT_SET}\"", |name| {
            (name == "SET_ONE").then(|| "abc:fx".to_string())
        })
        .unwrap();
        assert_eq!(out, "key: abc:fx\nother: \"\"");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let value: Value = serde_yaml::from_str("system_config:\n  port: 8080\n").unwrap();
        let config = validate_config(&value).unwrap();
        assert_eq!(config.system_config.port, 8080);
        assert_eq!(config.system_config.host, "0.0.0.0");
        assert_eq!(
            config.providers.chain,
            vec![ServiceKind::Deepl, ServiceKind::Groq, ServiceKind::HuggingFace]
        );
        assert_eq!(config.providers.huggingface.request_interval_ms, 1000);
        assert_eq!(config.monitor.high_threshold, 0.85);
        assert_eq!(config.monitor.critical_threshold, 0.95);
        assert_eq!(config.analytics.endpoint(), "http://localhost:3000/api/analytics");
    }

    #[test]
    fn chain_accepts_single_provider() {
        let value: Value = serde_yaml::from_str("providers:\n  chain: [deepl]\n").unwrap();
        let config = validate_config(&value).unwrap();
        assert_eq!(config.providers.chain, vec![ServiceKind::Deepl]);
    }

    #[test]
    fn monitor_key_falls_back_to_provider_key() {
        let mut config = Config::default();
        assert_eq!(config.monitor_deepl_key(), None);
        config.providers.deepl.api_key = "provider-key".to_string();
        assert_eq!(config.monitor_deepl_key(), Some("provider-key"));
        config.monitor.deepl_api_key = "monitor-key".to_string();
        assert_eq!(config.monitor_deepl_key(), Some("monitor-key"));
    }
}
