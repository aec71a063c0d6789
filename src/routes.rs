use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    // `/api/translate` answers OPTIONS and writes its CORS headers itself
    let translate = Router::new().route(
        "/api/translate",
        post(handlers::translate)
            .options(handlers::translate_preflight)
            .fallback(handlers::translate_method_not_allowed),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api = Router::new()
        // Health check
        .route("/", get(handlers::health_check))
        .route("/api/analytics", post(handlers::record_analytics))
        // DeepL quota monitoring
        .route(
            "/api/monitor",
            get(handlers::monitor).fallback(handlers::method_not_allowed),
        )
        .route("/api/cron-monitor", get(handlers::cron_monitor))
        .layer(cors);

    translate.merge(api)
}

/// Full application with request tracing
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
