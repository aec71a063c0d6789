use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::error::{ProviderError, TranslateError, MISSING_FIELDS};
use super::interface::{
    ProviderAttempt, ProviderOutput, ServiceKind, TranslationProvider, TranslationRequest,
    TranslationResult,
};
use crate::analytics::AnalyticsSink;

/// Runs a request through the providers in order until one succeeds
pub struct FallbackCoordinator {
    providers: Vec<Arc<dyn TranslationProvider>>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl FallbackCoordinator {
    pub fn new(
        providers: Vec<Arc<dyn TranslationProvider>>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self { providers, analytics }
    }

    pub fn services(&self) -> Vec<ServiceKind> {
        self.providers.iter().map(|p| p.service()).collect()
    }

    pub async fn translate(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResult, TranslateError> {
        validate(&request)?;

        let texts = request.text.to_vec();
        let text_count = texts.len();
        info!(
            "Starting translation: {} -> {}, {} texts",
            request.source_lang.as_deref().unwrap_or("auto"),
            request.target_lang,
            text_count
        );

        let mut attempts: Vec<ProviderAttempt> = Vec::with_capacity(self.providers.len());
        let mut previous: Option<ServiceKind> = None;

        for (index, provider) in self.providers.iter().enumerate() {
            let service = provider.service();
            if let Some(from) = previous {
                self.analytics
                    .record("api_fallback", json!({ "from": from, "to": service }))
                    .await;
            }
            previous = Some(service);

            info!("Attempt {}: {}", index + 1, service);
            let outcome = provider
                .translate(
                    &texts,
                    request.source_lang.as_deref(),
                    &request.target_lang,
                    &request.credentials,
                )
                .await
                .and_then(|output| {
                    if output.texts().len() == text_count {
                        Ok(output)
                    } else {
                        Err(ProviderError::MalformedResponse {
                            service,
                            reason: format!(
                                "expected {} texts, got {}",
                                text_count,
                                output.texts().len()
                            ),
                        })
                    }
                });

            match outcome {
                Ok(output) => {
                    let partial = output.is_partial();
                    if let ProviderOutput::Partial { reason, .. } = &output {
                        warn!("{} returned the original texts untranslated: {}", service, reason);
                        self.analytics
                            .record(
                                "partial_translation",
                                json!({ "service": service, "textCount": text_count }),
                            )
                            .await;
                    } else {
                        info!("{}: translation completed", service);
                    }

                    self.analytics
                        .record(
                            "translation_completed",
                            json!({
                                "service": service,
                                "textCount": text_count,
                                "targetLang": request.target_lang,
                            }),
                        )
                        .await;

                    return Ok(TranslationResult {
                        translated_text: request.text.with_shape(output.into_texts()),
                        service,
                        success: true,
                        partial,
                    });
                }
                Err(e) => {
                    warn!("{} failed: {}", service, e);
                    attempts.push(ProviderAttempt {
                        provider: service,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let last_error = attempts
            .last()
            .and_then(|attempt| attempt.error.clone())
            .unwrap_or_else(|| "no translation providers configured".to_string());
        error!("All translation services failed. Last error: {}", last_error);

        self.analytics
            .record(
                "error",
                json!({ "stage": "all_services_failed", "textCount": text_count }),
            )
            .await;

        Err(TranslateError::AllProvidersExhausted { last_error, attempts })
    }
}

/// `text` and `targetLang` must both be present and non-empty
pub fn validate(request: &TranslationRequest) -> Result<(), TranslateError> {
    if request.text.is_empty() || request.target_lang.trim().is_empty() {
        return Err(TranslateError::InvalidRequest(MISSING_FIELDS.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::interface::{Credentials, TextPayload};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<(String, Value)>>,
    }

    impl RecordingSink {
        fn names(&self) -> Vec<String> {
            self.events.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
        }
    }

    #[async_trait]
    impl AnalyticsSink for RecordingSink {
        async fn record(&self, event: &str, data: Value) {
            self.events.lock().unwrap().push((event.to_string(), data));
        }
    }

    enum Behaviour {
        Uppercase,
        Partial,
        Short,
        Fail(u16),
    }

    struct FakeProvider {
        service: ServiceKind,
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(service: ServiceKind, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                service,
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationProvider for FakeProvider {
        fn service(&self) -> ServiceKind {
            self.service
        }

        async fn translate(
            &self,
            texts: &[String],
            _source_lang: Option<&str>,
            _target_lang: &str,
            _credentials: &Credentials,
        ) -> Result<ProviderOutput, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Uppercase => Ok(ProviderOutput::Complete(
                    texts.iter().map(|t| t.to_uppercase()).collect(),
                )),
                Behaviour::Partial => Ok(ProviderOutput::Partial {
                    texts: texts.to_vec(),
                    reason: "segment mismatch".to_string(),
                }),
                Behaviour::Short => Ok(ProviderOutput::Complete(vec![])),
                Behaviour::Fail(456) => Err(ProviderError::QuotaExceeded(self.service)),
                Behaviour::Fail(status) => Err(ProviderError::ProviderHttp {
                    service: self.service,
                    status,
                }),
            }
        }
    }

    fn request(text: TextPayload, target: &str) -> TranslationRequest {
        TranslationRequest {
            text,
            source_lang: Some("it".to_string()),
            target_lang: target.to_string(),
            credentials: Credentials::default(),
        }
    }

    fn batch(values: &[&str]) -> TextPayload {
        TextPayload::Batch(values.iter().map(|s| s.to_string()).collect())
    }

    fn coordinator(
        providers: &[Arc<FakeProvider>],
        sink: &Arc<RecordingSink>,
    ) -> FallbackCoordinator {
        let providers = providers
            .iter()
            .map(|p| p.clone() as Arc<dyn TranslationProvider>)
            .collect();
        FallbackCoordinator::new(providers, sink.clone())
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let deepl = FakeProvider::new(ServiceKind::Deepl, Behaviour::Uppercase);
        let groq = FakeProvider::new(ServiceKind::Groq, Behaviour::Uppercase);
        let hf = FakeProvider::new(ServiceKind::HuggingFace, Behaviour::Uppercase);
        let sink = Arc::new(RecordingSink::default());

        let result = coordinator(&[deepl.clone(), groq.clone(), hf.clone()], &sink)
            .translate(request(TextPayload::Single("ciao".to_string()), "en"))
            .await
            .unwrap();

        assert_eq!(result.service, ServiceKind::Deepl);
        assert_eq!(result.translated_text, TextPayload::Single("CIAO".to_string()));
        assert!(result.success);
        assert!(!result.partial);
        assert_eq!((deepl.calls(), groq.calls(), hf.calls()), (1, 0, 0));

        let events = sink.events.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "translation_completed");
        assert_eq!(
            events[0].1,
            json!({"service": "deepl", "textCount": 1, "targetLang": "en"})
        );
    }

    #[tokio::test]
    async fn quota_exceeded_falls_back_to_groq() {
        let deepl = FakeProvider::new(ServiceKind::Deepl, Behaviour::Fail(456));
        let groq = FakeProvider::new(ServiceKind::Groq, Behaviour::Uppercase);
        let hf = FakeProvider::new(ServiceKind::HuggingFace, Behaviour::Uppercase);
        let sink = Arc::new(RecordingSink::default());

        let result = coordinator(&[deepl.clone(), groq.clone(), hf.clone()], &sink)
            .translate(request(batch(&["uno", "due"]), "en"))
            .await
            .unwrap();

        assert_eq!(result.service, ServiceKind::Groq);
        assert_eq!(result.translated_text, batch(&["UNO", "DUE"]));
        assert_eq!((deepl.calls(), groq.calls(), hf.calls()), (1, 1, 0));
        assert_eq!(sink.names(), vec!["api_fallback", "translation_completed"]);
        assert_eq!(
            sink.events.lock().unwrap()[0].1,
            json!({"from": "deepl", "to": "groq"})
        );
    }

    #[tokio::test]
    async fn all_failures_exhaust_with_last_error() {
        let deepl = FakeProvider::new(ServiceKind::Deepl, Behaviour::Fail(403));
        let groq = FakeProvider::new(ServiceKind::Groq, Behaviour::Fail(500));
        let hf = FakeProvider::new(ServiceKind::HuggingFace, Behaviour::Fail(503));
        let sink = Arc::new(RecordingSink::default());

        let err = coordinator(&[deepl, groq, hf], &sink)
            .translate(request(batch(&["uno", "due"]), "en"))
            .await
            .unwrap_err();

        match err {
            TranslateError::AllProvidersExhausted { last_error, attempts } => {
                assert_eq!(last_error, "huggingface HTTP 503");
                let order: Vec<ServiceKind> = attempts.iter().map(|a| a.provider).collect();
                assert_eq!(
                    order,
                    vec![ServiceKind::Deepl, ServiceKind::Groq, ServiceKind::HuggingFace]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(sink.names(), vec!["api_fallback", "api_fallback", "error"]);
        let events = sink.events.lock().unwrap().clone();
        assert_eq!(events[1].1, json!({"from": "groq", "to": "huggingface"}));
        assert_eq!(events[2].1, json!({"stage": "all_services_failed", "textCount": 2}));
    }

    #[tokio::test]
    async fn partial_groq_output_still_counts_as_groq_success() {
        let deepl = FakeProvider::new(ServiceKind::Deepl, Behaviour::Fail(456));
        let groq = FakeProvider::new(ServiceKind::Groq, Behaviour::Partial);
        let hf = FakeProvider::new(ServiceKind::HuggingFace, Behaviour::Uppercase);
        let sink = Arc::new(RecordingSink::default());

        let result = coordinator(&[deepl, groq, hf.clone()], &sink)
            .translate(request(batch(&["uno", "due"]), "en"))
            .await
            .unwrap();

        // Reported as a Groq success although nothing was translated
        assert_eq!(result.service, ServiceKind::Groq);
        assert!(result.success);
        assert!(result.partial);
        assert_eq!(result.translated_text, batch(&["uno", "due"]));
        assert_eq!(hf.calls(), 0);
        assert_eq!(
            sink.names(),
            vec!["api_fallback", "partial_translation", "translation_completed"]
        );
    }

    #[tokio::test]
    async fn wrong_output_length_moves_to_next_provider() {
        let deepl = FakeProvider::new(ServiceKind::Deepl, Behaviour::Short);
        let groq = FakeProvider::new(ServiceKind::Groq, Behaviour::Uppercase);
        let sink = Arc::new(RecordingSink::default());

        let result = coordinator(&[deepl, groq], &sink)
            .translate(request(batch(&["uno"]), "en"))
            .await
            .unwrap();
        assert_eq!(result.service, ServiceKind::Groq);
    }

    #[tokio::test]
    async fn invalid_requests_never_reach_a_provider() {
        let deepl = FakeProvider::new(ServiceKind::Deepl, Behaviour::Uppercase);
        let sink = Arc::new(RecordingSink::default());
        let coordinator = coordinator(&[deepl.clone()], &sink);

        let err = coordinator
            .translate(request(TextPayload::Single("ciao".to_string()), " "))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::InvalidRequest(_)));

        let err = coordinator
            .translate(request(batch(&[]), "en"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::InvalidRequest(_)));

        assert_eq!(deepl.calls(), 0);
        assert!(sink.names().is_empty());
    }

    #[tokio::test]
    async fn single_provider_chain_emits_no_fallback_events() {
        let deepl = FakeProvider::new(ServiceKind::Deepl, Behaviour::Fail(500));
        let sink = Arc::new(RecordingSink::default());

        let err = coordinator(&[deepl], &sink)
            .translate(request(TextPayload::Single("ciao".to_string()), "en"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::AllProvidersExhausted { .. }));
        assert_eq!(sink.names(), vec!["error"]);
    }
}
