use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::ProviderError;
use super::interface::{Credentials, ProviderOutput, ServiceKind, TranslationProvider};
use crate::config_manager::{non_empty, DeepLConfig};

/// Keys of the free plan carry this suffix and must use the free endpoint
pub const FREE_KEY_SUFFIX: &str = ":fx";

/// DeepL API client, used both for translation and for quota checks
pub struct DeepLProvider {
    client: Client,
    free_api_url: String,
    pro_api_url: String,
    default_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    text: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

/// Character usage for the current billing period, as reported by `/v2/usage`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeepLUsage {
    pub character_count: u64,
    pub character_limit: u64,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl DeepLProvider {
    pub fn new(client: Client, config: &DeepLConfig) -> Self {
        info!("Initialized DeepL provider");
        Self {
            client,
            free_api_url: config.free_api_url.trim_end_matches('/').to_string(),
            pro_api_url: config.pro_api_url.trim_end_matches('/').to_string(),
            default_api_key: non_empty(&config.api_key).map(|s| s.to_string()),
        }
    }

    /// Free-plan keys go to the free host, everything else to the pro host
    pub fn base_url_for(&self, api_key: &str) -> &str {
        if api_key.ends_with(FREE_KEY_SUFFIX) {
            &self.free_api_url
        } else {
            &self.pro_api_url
        }
    }

    /// Fetch character usage for `api_key`
    pub async fn usage(&self, api_key: &str) -> Result<DeepLUsage, ProviderError> {
        let url = format!("{}/v2/usage", self.base_url_for(api_key));
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("DeepL-Auth-Key {}", api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        Ok(response.json::<DeepLUsage>().await?)
    }

    fn resolve_key<'a>(&'a self, credentials: &'a Credentials) -> Option<&'a str> {
        credentials
            .deepl_api_key
            .as_deref()
            .and_then(non_empty)
            .or(self.default_api_key.as_deref())
    }
}

fn status_error(status: StatusCode) -> ProviderError {
    match status.as_u16() {
        403 => ProviderError::InvalidCredentials(ServiceKind::Deepl),
        456 => ProviderError::QuotaExceeded(ServiceKind::Deepl),
        code => ProviderError::ProviderHttp {
            service: ServiceKind::Deepl,
            status: code,
        },
    }
}

#[async_trait]
impl TranslationProvider for DeepLProvider {
    fn service(&self) -> ServiceKind {
        ServiceKind::Deepl
    }

    async fn translate(
        &self,
        texts: &[String],
        source_lang: Option<&str>,
        target_lang: &str,
        credentials: &Credentials,
    ) -> Result<ProviderOutput, ProviderError> {
        let api_key = self
            .resolve_key(credentials)
            .ok_or(ProviderError::MissingCredentials(ServiceKind::Deepl))?;

        // No source_lang lets DeepL detect the language itself
        let body = TranslateBody {
            text: texts,
            source_lang: source_lang.and_then(non_empty).map(|s| s.to_uppercase()),
            target_lang: target_lang.to_uppercase(),
        };

        let url = format!("{}/v2/translate", self.base_url_for(api_key));
        debug!("DeepL request: {} texts -> {}", texts.len(), body.target_lang);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("DeepL-Auth-Key {}", api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let data: TranslateResponse = response.json().await?;
        if data.translations.len() != texts.len() {
            return Err(ProviderError::MalformedResponse {
                service: ServiceKind::Deepl,
                reason: format!(
                    "expected {} translations, got {}",
                    texts.len(),
                    data.translations.len()
                ),
            });
        }

        Ok(ProviderOutput::Complete(
            data.translations.into_iter().map(|t| t.text).collect(),
        ))
    }
}
