//! Retrieval flow: store the document's chunks, then analyze them.

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use imdg_utils::{ImdgError, ImdgResult};
use serde_json::json;

use crate::handlers::upload::read_pdf_upload;
use crate::middleware::SessionContext;
use crate::AppState;

pub async fn process_msds(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    match store_upload(&state, &ctx, multipart).await {
        Ok(_) => Json(json!({ "Response": "MSDS processing success" })).into_response(),
        Err(ImdgError::MissingUpload) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "Response": "Tolong upload file PDF" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn store_upload(
    state: &AppState,
    ctx: &SessionContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> ImdgResult<usize> {
    let upload = match read_pdf_upload(multipart, state.config.server.max_request_size).await {
        Ok(upload) => upload,
        Err(e) => {
            state.metrics.documents_rejected.inc();
            return Err(e);
        }
    };

    let user_id = ctx.user_id();
    let path = state
        .analyzer
        .uploads()
        .save(user_id, &upload.file_name, &upload.bytes)
        .await?;

    let chunks = state.analyzer.process_document(&path, user_id).await?;
    state.metrics.documents_processed.inc();
    Ok(chunks)
}

pub async fn analyze_msds(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> ImdgResult<Json<serde_json::Value>> {
    match state.analyzer.analyze(ctx.user_id()).await {
        Ok(response) => {
            state.metrics.analyses_completed.inc();
            Ok(Json(json!({ "Response": response })))
        }
        Err(e) => {
            if matches!(e, ImdgError::ExternalService { .. }) {
                state.metrics.llm_failures.inc();
            }
            Err(e)
        }
    }
}
