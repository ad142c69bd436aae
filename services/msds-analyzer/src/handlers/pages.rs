use axum::{
    extract::State,
    response::{Html, Redirect},
    Extension, Form,
};
use imdg_utils::{ImdgError, ImdgResult};
use serde::Deserialize;

use crate::middleware::SessionContext;
use crate::AppState;

pub async fn index(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> ImdgResult<Html<String>> {
    tracing::debug!(user_id = %ctx.user_id(), "Serving upload page");
    let html = state
        .pages
        .index(ctx.session.username.as_deref())
        .map_err(|e| ImdgError::internal(format!("{:#}", e)))?;
    Ok(Html(html))
}

pub async fn login_page(State(state): State<AppState>) -> ImdgResult<Html<String>> {
    let html = state
        .pages
        .login()
        .map_err(|e| ImdgError::internal(format!("{:#}", e)))?;
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login_submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Form(form): Form<LoginForm>,
) -> Redirect {
    match state.users.authenticate(&form.username, &form.password) {
        Some(user) => {
            state.sessions.login(&ctx.token, &user.username).await;
            tracing::info!(user_id = %ctx.user_id(), username = %user.username, "Login successful");
            Redirect::to("/")
        }
        None => {
            tracing::warn!(username = %form.username, "Invalid username or password");
            Redirect::to("/login")
        }
    }
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Redirect {
    state.sessions.logout(&ctx.token).await;
    tracing::info!(user_id = %ctx.user_id(), "Logged out");
    Redirect::to("/login")
}
