use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use imdg_models::Session;

use crate::session::SessionToken;
use crate::AppState;

/// Session of the current request, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: SessionToken,
    pub session: Session,
}

impl SessionContext {
    pub fn user_id(&self) -> uuid::Uuid {
        self.session.id
    }
}

/// Paths served without touching the session table.
pub(crate) fn is_stateless(path: &str) -> bool {
    matches!(path, "/health" | "/metrics") || path.starts_with("/static/")
}

/// Attaches a session to every non-stateless request, creating one (and its
/// cookie) when the request carries no known session token.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_stateless(request.uri().path()) {
        return next.run(request).await;
    }

    let cookie_name = state.config.auth.cookie_name.as_str();
    let presented = read_cookie(request.headers(), cookie_name);

    let (token, session, created) = state.sessions.resolve(presented.as_deref()).await;
    request.extensions_mut().insert(SessionContext {
        token: token.clone(),
        session,
    });

    let mut response = next.run(request).await;

    if created {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, token);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; imdg_session=abc"));
        headers.append(header::COOKIE, HeaderValue::from_static("other=1"));

        assert_eq!(read_cookie(&headers, "imdg_session").as_deref(), Some("abc"));
        assert_eq!(read_cookie(&headers, "other").as_deref(), Some("1"));
        assert!(read_cookie(&headers, "missing").is_none());
    }

    #[test]
    fn test_health_metrics_and_assets_are_stateless() {
        assert!(is_stateless("/health"));
        assert!(is_stateless("/metrics"));
        assert!(is_stateless("/static/style.css"));
        assert!(!is_stateless("/login"));
        assert!(!is_stateless("/"));
        assert!(!is_stateless("/healthz"));
    }
}
