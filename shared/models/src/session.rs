use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Browser session.
///
/// `id` is the anonymous per-session UUID that keys the user's collection,
/// upload folder and text cache. It survives login and logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            username: None,
            created_at: Utc::now(),
        }
    }

    pub fn auth_state(&self) -> AuthState {
        match self.username {
            Some(_) => AuthState::Authenticated,
            None => AuthState::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_state() == AuthState::Authenticated
    }

    pub fn login(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
    }

    pub fn logout(&mut self) {
        self.username = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_logout_keeps_uuid() {
        let mut session = Session::new();
        let id = session.id;
        assert_eq!(session.auth_state(), AuthState::Anonymous);

        session.login("user");
        assert_eq!(session.auth_state(), AuthState::Authenticated);
        assert_eq!(session.username.as_deref(), Some("user"));

        session.logout();
        assert_eq!(session.auth_state(), AuthState::Anonymous);
        assert_eq!(session.id, id);
    }

    #[test]
    fn test_new_sessions_get_distinct_ids() {
        assert_ne!(Session::new().id, Session::new().id);
    }
}
