use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers::*, AppState};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
        .route("/process-msds", post(process_msds))
        .route("/analyze-msds", post(analyze_msds))
        .route("/save_n_examine_doc", post(save_n_examine_doc))
        .route("/process-document", post(process_document))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/static/script.js", get(static_script))
}
