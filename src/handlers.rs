use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analytics::AnalyticsEvent;
use crate::config_manager::non_empty;
use crate::state::AppState;
use crate::translate::error::MISSING_FIELDS;
use crate::translate::{Credentials, TextPayload, TranslateError, TranslationRequest};

/// Headers attached to every `/api/translate` response
pub fn cors_headers() -> [(HeaderName, &'static str); 3] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    ]
}

/// Body of `POST /api/translate`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatePayload {
    #[serde(default)]
    pub text: Option<TextPayload>,
    #[serde(default)]
    pub source_lang: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl TranslatePayload {
    pub fn into_request(self) -> Result<TranslationRequest, TranslateError> {
        match (self.text, self.target_lang) {
            (Some(text), Some(target_lang)) => Ok(TranslationRequest {
                text,
                source_lang: self.source_lang,
                target_lang,
                credentials: Credentials {
                    deepl_api_key: self.api_key,
                },
            }),
            _ => Err(TranslateError::InvalidRequest(MISSING_FIELDS.to_string())),
        }
    }
}

pub async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslatePayload>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("translate", %request_id);

    async move {
        let payload = match payload {
            Ok(Json(payload)) => payload,
            Err(rejection) => {
                warn!("Rejected translate body: {}", rejection.body_text());
                return translate_error(TranslateError::InvalidRequest(rejection.body_text()));
            }
        };

        let text_count = payload.text.as_ref().map(|t| t.len()).unwrap_or(1);
        let result = match payload.into_request() {
            Ok(request) => state.coordinator.translate(request).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(result) => (StatusCode::OK, cors_headers(), Json(result)).into_response(),
            Err(e) => {
                if matches!(e, TranslateError::AllProvidersExhausted { .. }) {
                    state
                        .analytics
                        .record(
                            "error",
                            json!({ "message": e.to_string(), "textCount": text_count }),
                        )
                        .await;
                }
                translate_error(e)
            }
        }
    }
    .instrument(span)
    .await
}

fn translate_error(e: TranslateError) -> Response {
    match e {
        TranslateError::InvalidRequest(message) => (
            StatusCode::BAD_REQUEST,
            cors_headers(),
            Json(json!({ "error": message })),
        )
            .into_response(),
        e @ TranslateError::AllProvidersExhausted { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            cors_headers(),
            Json(json!({
                "error": e.to_string(),
                "service": "none",
                "success": false
            })),
        )
            .into_response(),
    }
}

/// CORS preflight for `/api/translate`
pub async fn translate_preflight() -> Response {
    (StatusCode::OK, cors_headers()).into_response()
}

pub async fn translate_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        cors_headers(),
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Translation proxy is running",
        "providers": state.coordinator.services(),
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// Receives analytics events; they are logged, not stored
pub async fn record_analytics(Json(event): Json<AnalyticsEvent>) -> Json<Value> {
    info!(event = %event.event, data = %event.data, "Analytics event");
    Json(json!({ "success": true }))
}

pub async fn monitor(State(state): State<AppState>) -> Response {
    match state.monitor.run().await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => {
            error!("Usage monitoring failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}

/// Scheduler entry point, guarded by `Authorization: Bearer <cron_secret>`
pub async fn cron_monitor(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !is_authorized(&headers, &state.config.monitor.cron_secret) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response();
    }

    match state.monitor.run().await {
        Ok(outcome) => Json(json!({
            "success": true,
            "timestamp": Utc::now().to_rfc3339(),
            "monitoring": outcome
        }))
        .into_response(),
        Err(e) => {
            error!("Cron monitoring failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// An unset secret rejects everything
fn is_authorized(headers: &HeaderMap, secret: &str) -> bool {
    let Some(secret) = non_empty(secret) else {
        return false;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {}", secret))
        .unwrap_or(false)
}
