use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Anonymous usage event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Destination for analytics events. Recording never fails the caller.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: &str, data: Value);
}

/// Posts events as JSON to an analytics endpoint
pub struct HttpAnalyticsSink {
    client: Client,
    endpoint: String,
}

impl HttpAnalyticsSink {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl AnalyticsSink for HttpAnalyticsSink {
    /// Sends in the background; the caller never waits on the endpoint
    async fn record(&self, event: &str, data: Value) {
        let body = AnalyticsEvent {
            event: event.to_string(),
            data,
        };
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        tokio::spawn(async move {
            match client.post(&endpoint).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Analytics event sent: {}", body.event);
                }
                Ok(response) => {
                    warn!(
                        "Analytics endpoint answered {} for {}",
                        response.status(),
                        body.event
                    );
                }
                Err(e) => {
                    warn!("Analytics logging failed: {}", e);
                }
            }
        });
    }
}

/// Used when analytics are disabled
pub struct NoopAnalytics;

#[async_trait]
impl AnalyticsSink for NoopAnalytics {
    async fn record(&self, _event: &str, _data: Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn wait_for_requests(server: &MockServer, count: usize) {
        for _ in 0..100 {
            let received = server.received_requests().await.unwrap_or_default();
            if received.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("analytics endpoint never received {} requests", count);
    }

    #[tokio::test]
    async fn posts_event_and_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analytics"))
            .and(body_json(json!({"event": "api_fallback", "data": {"from": "deepl", "to": "groq"}})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = HttpAnalyticsSink::new(Client::new(), format!("{}/api/analytics", server.uri()));
        sink.record("api_fallback", json!({"from": "deepl", "to": "groq"})).await;
        wait_for_requests(&server, 1).await;
    }

    #[tokio::test]
    async fn record_returns_before_a_slow_endpoint_answers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let sink = HttpAnalyticsSink::new(Client::new(), format!("{}/api/analytics", server.uri()));
        let started = std::time::Instant::now();
        sink.record("translation_completed", json!({"service": "deepl"})).await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = HttpAnalyticsSink::new(Client::new(), format!("{}/api/analytics", server.uri()));
        sink.record("error", json!({})).await;
        wait_for_requests(&server, 1).await;

        // Nothing listens on port 9 locally
        let unreachable = HttpAnalyticsSink::new(Client::new(), "http://127.0.0.1:9/api/analytics".to_string());
        unreachable.record("error", json!({})).await;
    }
}
