use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
};
use imdg_database::health_check as store_health_check;
use serde_json::{json, Value};

use crate::pages::SCRIPT_JS;
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let store = state.analyzer.store();

    let store_status = match store_health_check(store).await {
        Ok(_) => json!({"status": "healthy", "message": "Accessible"}),
        Err(e) => json!({"status": "unhealthy", "message": format!("{:#}", e)}),
    };
    let status = if store_status["status"] == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(json!({
        "status": status,
        "service": "imdg-msds-analyzer",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "vector_store": store_status,
        },
        "collections": store.len().await.ok(),
        "collection_capacity": store.capacity(),
        "sessions": state.sessions.session_count().await,
        "extractor": state.analyzer.extractor_name(),
        "model": state.analyzer.model_name(),
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub async fn static_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        SCRIPT_JS,
    )
}
