use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use imdg_utils::ImdgError;

use crate::middleware::session::{is_stateless, SessionContext};
use crate::AppState;

fn is_public(path: &str) -> bool {
    path == "/login" || is_stateless(path)
}

/// Requires a logged-in session when `auth.require_login` is set.
/// Page requests are redirected to the login form, API calls get 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.auth.require_login || is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let authenticated = request
        .extensions()
        .get::<SessionContext>()
        .map(|ctx| ctx.session.is_authenticated())
        .unwrap_or(false);

    if authenticated {
        return next.run(request).await;
    }

    if request.method() == Method::GET {
        Redirect::to("/login").into_response()
    } else {
        ImdgError::authentication("Login required").into_response()
    }
}
