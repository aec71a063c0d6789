/// Translate interface shared by the coordinator and every provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ProviderError;

/// Translation backends, in their wire spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    #[serde(rename = "deepl")]
    Deepl,
    #[serde(rename = "groq")]
    Groq,
    #[serde(rename = "huggingface")]
    HuggingFace,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Deepl => "deepl",
            ServiceKind::Groq => "groq",
            ServiceKind::HuggingFace => "huggingface",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text to translate: a single string or an ordered batch.
/// The result always comes back in the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextPayload {
    Single(String),
    Batch(Vec<String>),
}

impl TextPayload {
    pub fn len(&self) -> usize {
        match self {
            TextPayload::Single(_) => 1,
            TextPayload::Batch(texts) => texts.len(),
        }
    }

    /// An empty string or an empty batch carries nothing to translate
    pub fn is_empty(&self) -> bool {
        match self {
            TextPayload::Single(text) => text.is_empty(),
            TextPayload::Batch(texts) => texts.is_empty(),
        }
    }

    pub fn to_vec(&self) -> Vec<String> {
        match self {
            TextPayload::Single(text) => vec![text.clone()],
            TextPayload::Batch(texts) => texts.clone(),
        }
    }

    /// Rebuild a payload of this payload's shape from translated texts
    pub fn with_shape(&self, translated: Vec<String>) -> TextPayload {
        match self {
            TextPayload::Single(_) => {
                TextPayload::Single(translated.into_iter().next().unwrap_or_default())
            }
            TextPayload::Batch(_) => TextPayload::Batch(translated),
        }
    }
}

/// Provider-specific auth material supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub deepl_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub text: TextPayload,
    pub source_lang: Option<String>,
    pub target_lang: String,
    pub credentials: Credentials,
}

/// What a provider produced for a batch
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutput {
    Complete(Vec<String>),
    /// The provider answered but the answer could not be mapped back onto the
    /// inputs; `texts` holds the untranslated originals.
    Partial { texts: Vec<String>, reason: String },
}

impl ProviderOutput {
    pub fn texts(&self) -> &[String] {
        match self {
            ProviderOutput::Complete(texts) => texts,
            ProviderOutput::Partial { texts, .. } => texts,
        }
    }

    pub fn into_texts(self) -> Vec<String> {
        match self {
            ProviderOutput::Complete(texts) => texts,
            ProviderOutput::Partial { texts, .. } => texts,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, ProviderOutput::Partial { .. })
    }
}

/// Response body of a successful translation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translated_text: TextPayload,
    /// Provider that served the request
    pub service: ServiceKind,
    pub success: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}

/// One step of the fallback chain, kept for logging
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAttempt {
    pub provider: ServiceKind,
    pub error: Option<String>,
}

/// A translation backend
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    fn service(&self) -> ServiceKind;

    /// Translate `texts`, returning exactly one string per input in input order
    async fn translate(
        &self,
        texts: &[String],
        source_lang: Option<&str>,
        target_lang: &str,
        credentials: &Credentials,
    ) -> Result<ProviderOutput, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_deserializes_both_shapes() {
        let single: TextPayload = serde_json::from_str(r#""ciao""#).unwrap();
        assert_eq!(single, TextPayload::Single("ciao".to_string()));
        let batch: TextPayload = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(batch, TextPayload::Batch(vec!["a".to_string(), "b".to_string()]));
        assert!(serde_json::from_str::<TextPayload>("42").is_err());
    }

    #[test]
    fn with_shape_mirrors_the_input() {
        let single = TextPayload::Single("ciao".to_string());
        assert_eq!(
            single.with_shape(vec!["hello".to_string()]),
            TextPayload::Single("hello".to_string())
        );

        let batch = TextPayload::Batch(vec!["uno".to_string(), "due".to_string()]);
        let shaped = batch.with_shape(vec!["one".to_string(), "two".to_string()]);
        assert_eq!(shaped, TextPayload::Batch(vec!["one".to_string(), "two".to_string()]));
    }

    #[test]
    fn emptiness() {
        assert!(TextPayload::Single(String::new()).is_empty());
        assert!(TextPayload::Batch(vec![]).is_empty());
        assert!(!TextPayload::Batch(vec![String::new()]).is_empty());
    }

    #[test]
    fn result_serializes_partial_only_when_set() {
        let result = TranslationResult {
            translated_text: TextPayload::Single("hello".to_string()),
            service: ServiceKind::HuggingFace,
            success: true,
            partial: false,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"translatedText": "hello", "service": "huggingface", "success": true})
        );
    }
}
