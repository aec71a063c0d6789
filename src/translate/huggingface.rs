use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::ProviderError;
use super::interface::{Credentials, ProviderOutput, ServiceKind, TranslationProvider};
use super::throttle::Throttle;
use crate::config_manager::{non_empty, HuggingFaceConfig};

pub const DEFAULT_MODEL: &str = "Helsinki-NLP/opus-mt-it-en";

/// Hugging Face inference API with Helsinki-NLP opus-mt models.
/// Texts are sent one at a time, spaced by `request_interval`.
pub struct HuggingFaceProvider {
    client: Client,
    base_url: String,
    token: Option<String>,
    request_interval: Duration,
}

impl HuggingFaceProvider {
    pub fn new(client: Client, config: &HuggingFaceConfig) -> Self {
        info!(
            "Initialized Hugging Face provider: base_url={}, interval={:?}",
            config.base_url,
            config.request_interval()
        );
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: non_empty(&config.token).map(|s| s.to_string()),
            request_interval: config.request_interval(),
        }
    }

    async fn translate_one(
        &self,
        token: &str,
        model: &str,
        text: &str,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/{}", self.base_url, model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({
                "inputs": text,
                "options": { "wait_for_model": true }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited(ServiceKind::HuggingFace));
            }
            return Err(ProviderError::ProviderHttp {
                service: ServiceKind::HuggingFace,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        match extract_translation(&body) {
            Some(translated) => Ok(translated),
            None => {
                warn!("Hugging Face returned no translation_text, keeping original");
                Ok(text.to_string())
            }
        }
    }
}

/// Model for a language pair; unknown pairs use the Italian to English model
pub fn model_for(source_lang: Option<&str>, target_lang: &str) -> &'static str {
    let source = source_lang.and_then(non_empty).unwrap_or("it").to_lowercase();
    let target = target_lang.trim().to_lowercase();
    match (source.as_str(), target.as_str()) {
        ("it", "en") => "Helsinki-NLP/opus-mt-it-en",
        ("it", "es") => "Helsinki-NLP/opus-mt-it-es",
        ("it", "fr") => "Helsinki-NLP/opus-mt-it-fr",
        _ => DEFAULT_MODEL,
    }
}

/// `[{"translation_text": "..."}]` -> the first translation
fn extract_translation(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get(0)?
        .get("translation_text")?
        .as_str()
        .map(|s| s.to_string())
}

#[async_trait]
impl TranslationProvider for HuggingFaceProvider {
    fn service(&self) -> ServiceKind {
        ServiceKind::HuggingFace
    }

    async fn translate(
        &self,
        texts: &[String],
        source_lang: Option<&str>,
        target_lang: &str,
        _credentials: &Credentials,
    ) -> Result<ProviderOutput, ProviderError> {
        let token = self
            .token
            .as_deref()
            .ok_or(ProviderError::MissingCredentials(ServiceKind::HuggingFace))?;

        let model = model_for(source_lang, target_lang);
        debug!("Hugging Face model: {}", model);

        let results = each_spaced(texts, self.request_interval, |text| {
            self.translate_one(token, model, text)
        })
        .await?;

        Ok(ProviderOutput::Complete(results))
    }
}

/// Run `call` on each text in order, at most once per `interval`.
/// Stops at the first failure.
async fn each_spaced<'a, F, Fut>(
    texts: &'a [String],
    interval: Duration,
    mut call: F,
) -> Result<Vec<String>, ProviderError>
where
    F: FnMut(&'a str) -> Fut,
    Fut: Future<Output = Result<String, ProviderError>>,
{
    let mut throttle = Throttle::new(interval);
    let mut results = Vec::with_capacity(texts.len());
    for text in texts {
        throttle.ready().await;
        results.push(call(text).await?);
    }
    Ok(results)
}
