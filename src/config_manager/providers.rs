use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::translate::interface::ServiceKind;

/// Translation providers and the order in which they are tried
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Fallback order. A single entry gives a plain DeepL proxy.
    #[serde(default = "default_chain")]
    pub chain: Vec<ServiceKind>,

    #[serde(default)]
    pub deepl: DeepLConfig,

    #[serde(default)]
    pub groq: GroqConfig,

    #[serde(default)]
    pub huggingface: HuggingFaceConfig,
}

fn default_chain() -> Vec<ServiceKind> {
    vec![ServiceKind::Deepl, ServiceKind::Groq, ServiceKind::HuggingFace]
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            chain: default_chain(),
            deepl: DeepLConfig::default(),
            groq: GroqConfig::default(),
            huggingface: HuggingFaceConfig::default(),
        }
    }
}

/// Configuration for the DeepL API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepLConfig {
    /// Used when a request carries no `apiKey`
    #[serde(rename = "api_key")]
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_deepl_free_url")]
    pub free_api_url: String,

    #[serde(default = "default_deepl_pro_url")]
    pub pro_api_url: String,
}

fn default_deepl_free_url() -> String {
    "https://api-free.deepl.com".to_string()
}

fn default_deepl_pro_url() -> String {
    "https://api.deepl.com".to_string()
}

impl Default for DeepLConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            free_api_url: default_deepl_free_url(),
            pro_api_url: default_deepl_pro_url(),
        }
    }
}

/// Configuration for Groq chat completions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    #[serde(rename = "api_key")]
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_groq_base_url")]
    pub base_url: String,

    #[serde(default = "default_groq_model")]
    pub model: String,

    #[serde(default = "default_groq_temperature")]
    pub temperature: f32,

    #[serde(default = "default_groq_max_tokens")]
    pub max_tokens: u32,
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_groq_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_groq_temperature() -> f32 {
    0.1
}

fn default_groq_max_tokens() -> u32 {
    2000
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_groq_base_url(),
            model: default_groq_model(),
            temperature: default_groq_temperature(),
            max_tokens: default_groq_max_tokens(),
        }
    }
}

/// Configuration for the Hugging Face inference API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_hf_base_url")]
    pub base_url: String,

    /// Minimum spacing between two calls of the same batch
    #[serde(default = "default_hf_request_interval_ms")]
    pub request_interval_ms: u64,
}

fn default_hf_base_url() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_hf_request_interval_ms() -> u64 {
    1000
}

impl HuggingFaceConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: default_hf_base_url(),
            request_interval_ms: default_hf_request_interval_ms(),
        }
    }
}
