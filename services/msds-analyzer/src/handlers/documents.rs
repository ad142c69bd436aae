//! Text-cache flow: examine an upload, then summarize and analyze it.

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    response::Json,
    Extension,
};
use imdg_utils::{ImdgError, ImdgResult};
use serde_json::{json, Value};

use crate::handlers::upload::read_pdf_upload;
use crate::middleware::SessionContext;
use crate::AppState;

pub const EXAMINE_SUCCESS: &str =
    "Dokumen MSDS berhasil diunggah dan diperiksa. Klik tombol Analisis untuk melanjutkan.";

pub async fn save_n_examine_doc(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ImdgResult<Json<Value>> {
    let result = examine(&state, &ctx, multipart).await;
    match &result {
        Ok(()) => state.metrics.documents_processed.inc(),
        Err(ImdgError::ContentRejected { .. })
        | Err(ImdgError::Validation { .. })
        | Err(ImdgError::MissingUpload) => state.metrics.documents_rejected.inc(),
        Err(_) => {}
    }
    result?;

    Ok(Json(json!({ "result": EXAMINE_SUCCESS })))
}

async fn examine(
    state: &AppState,
    ctx: &SessionContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> ImdgResult<()> {
    let upload = read_pdf_upload(multipart, state.config.server.max_request_size).await?;

    let user_id = ctx.user_id();
    let path = state
        .analyzer
        .uploads()
        .save(user_id, &upload.file_name, &upload.bytes)
        .await?;

    state.analyzer.examine_document(&path, user_id).await?;
    Ok(())
}

pub async fn process_document(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> ImdgResult<Json<Value>> {
    match state.analyzer.process_cached_document(ctx.user_id()).await {
        Ok(result) => {
            state.metrics.analyses_completed.inc();
            Ok(Json(json!({ "result": result })))
        }
        Err(e) => {
            if matches!(e, ImdgError::ExternalService { .. }) {
                state.metrics.llm_failures.inc();
            }
            Err(e)
        }
    }
}
