use std::sync::Arc;
use anyhow::Result;
use reqwest::Client;
use tracing::{info, warn};

use super::deepl::DeepLProvider;
use super::groq::GroqProvider;
use super::huggingface::HuggingFaceProvider;
use super::interface::{ServiceKind, TranslationProvider};
use crate::config_manager::{non_empty, ProvidersConfig};

/// Factory for creating translation providers
pub struct TranslationProviderFactory;

impl TranslationProviderFactory {
    /// Build the fallback chain in the configured order.
    ///
    /// # Arguments
    /// * `config` - Provider settings and chain order
    /// * `client` - HTTP client shared by every provider
    pub fn create_chain(
        config: &ProvidersConfig,
        client: Client,
    ) -> Result<Vec<Arc<dyn TranslationProvider>>> {
        if config.chain.is_empty() {
            anyhow::bail!("providers.chain must name at least one provider");
        }

        let mut chain: Vec<Arc<dyn TranslationProvider>> = Vec::with_capacity(config.chain.len());
        for (index, kind) in config.chain.iter().enumerate() {
            if config.chain[..index].contains(kind) {
                anyhow::bail!("Provider {} appears twice in providers.chain", kind);
            }
            chain.push(Self::create_provider(*kind, config, client.clone()));
        }

        info!(
            "Translation chain: {}",
            config
                .chain
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Ok(chain)
    }

    pub fn create_provider(
        kind: ServiceKind,
        config: &ProvidersConfig,
        client: Client,
    ) -> Arc<dyn TranslationProvider> {
        match kind {
            ServiceKind::Deepl => Arc::new(DeepLProvider::new(client, &config.deepl)),
            ServiceKind::Groq => {
                if non_empty(&config.groq.api_key).is_none() {
                    warn!("Groq API key not configured, Groq attempts will fail");
                }
                Arc::new(GroqProvider::new(client, &config.groq))
            }
            ServiceKind::HuggingFace => {
                if non_empty(&config.huggingface.token).is_none() {
                    warn!("Hugging Face token not configured, Hugging Face attempts will fail");
                }
                Arc::new(HuggingFaceProvider::new(client, &config.huggingface))
            }
        }
    }
}
