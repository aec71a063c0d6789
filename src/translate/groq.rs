use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::ProviderError;
use super::interface::{Credentials, ProviderOutput, ServiceKind, TranslationProvider};
use crate::config_manager::{non_empty, GroqConfig};

/// Separator the model is asked to put between translations
pub const SEGMENT_DELIMITER: &str = "|||";

const SYSTEM_PROMPT: &str = "You are a professional translator. Return only the translations separated by \"|||\" without numbering or extra text.";

/// Groq LLM used as a translator through its OpenAI compatible chat API
pub struct GroqProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl GroqProvider {
    pub fn new(client: Client, config: &GroqConfig) -> Self {
        info!(
            "Initialized Groq provider: model={}, base_url={}",
            config.model, config.base_url
        );
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: non_empty(&config.api_key).map(|s| s.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// English name of a language code, for the prompt
pub fn language_name(code: Option<&str>, fallback: &'static str) -> &'static str {
    match code.map(|c| c.to_lowercase()).as_deref() {
        Some("en") => "English",
        Some("es") => "Spanish",
        Some("fr") => "French",
        Some("it") => "Italian",
        Some("de") => "German",
        Some("pt") => "Portuguese",
        _ => fallback,
    }
}

/// Numbered, newline separated inputs under a short instruction
pub fn build_prompt(texts: &[String], source_name: &str, target_name: &str) -> String {
    let numbered = texts
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}. {}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Translate the following texts from {} to {}.\nReturn ONLY the translations separated by \"{}\" in the same order:\n\n{}",
        source_name, target_name, SEGMENT_DELIMITER, numbered
    )
}

pub fn split_segments(content: &str) -> Vec<String> {
    content
        .split(SEGMENT_DELIMITER)
        .map(|segment| segment.trim().to_string())
        .collect()
}

#[async_trait]
impl TranslationProvider for GroqProvider {
    fn service(&self) -> ServiceKind {
        ServiceKind::Groq
    }

    async fn translate(
        &self,
        texts: &[String],
        source_lang: Option<&str>,
        target_lang: &str,
        _credentials: &Credentials,
    ) -> Result<ProviderOutput, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials(ServiceKind::Groq))?;

        let prompt = build_prompt(
            texts,
            language_name(source_lang, "Italian"),
            language_name(Some(target_lang), "English"),
        );

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited(ServiceKind::Groq));
            }
            return Err(ProviderError::ProviderHttp {
                service: ServiceKind::Groq,
                status: status.as_u16(),
            });
        }

        let data: ChatResponse = response.json().await?;
        let content = data
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse {
                service: ServiceKind::Groq,
                reason: "no choices in completion".to_string(),
            })?;

        let segments = split_segments(&content);
        if segments.len() != texts.len() {
            warn!(
                "Groq returned {} segments for {} texts, keeping originals",
                segments.len(),
                texts.len()
            );
            return Ok(ProviderOutput::Partial {
                texts: texts.to_vec(),
                reason: format!(
                    "expected {} segments, got {}",
                    texts.len(),
                    segments.len()
                ),
            });
        }

        Ok(ProviderOutput::Complete(segments))
    }
}
