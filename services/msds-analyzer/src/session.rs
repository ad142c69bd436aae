//! Server-side sessions and the login user table.
//!
//! The browser only holds an opaque random token in an `HttpOnly` cookie; the
//! session UUID and login state live here.

use chrono::{DateTime, Duration, Utc};
use imdg_models::{Session, User};
use imdg_utils::{validate_model, ImdgResult, UserCredentials};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub type SessionToken = String;

pub const DEFAULT_IDLE_HOURS: i64 = 24;

struct SessionEntry {
    session: Session,
    last_access: DateTime<Utc>,
}

/// In-memory sessions keyed by cookie token. Sessions idle for longer than
/// the configured timeout are dropped.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, SessionEntry>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(Duration::hours(DEFAULT_IDLE_HOURS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    fn is_live(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        entry.last_access > now - self.idle_timeout
    }

    pub async fn create(&self) -> (SessionToken, Session) {
        let token = Uuid::new_v4().to_string();
        let session = Session::new();
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| self.is_live(entry, now));
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::debug!(expired, "Dropped idle sessions");
        }
        sessions.insert(
            token.clone(),
            SessionEntry {
                session: session.clone(),
                last_access: now,
            },
        );
        drop(sessions);

        tracing::info!(user_id = %session.id, "Assigned new session UUID");
        (token, session)
    }

    /// Live session for `token`; refreshes its idle timer.
    pub async fn get(&self, token: &str) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(token) {
            if self.is_live(entry, now) {
                entry.last_access = now;
                return Some(entry.session.clone());
            }
            sessions.remove(token);
        }
        None
    }

    /// Existing session for `token`, or a fresh one. The flag is true when a
    /// new session was created.
    pub async fn resolve(&self, token: Option<&str>) -> (SessionToken, Session, bool) {
        if let Some(token) = token {
            if let Some(session) = self.get(token).await {
                return (token.to_string(), session, false);
            }
        }
        let (token, session) = self.create().await;
        (token, session, true)
    }

    pub async fn login(&self, token: &str, username: &str) -> bool {
        match self.sessions.write().await.get_mut(token) {
            Some(entry) => {
                entry.session.login(username);
                entry.last_access = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn logout(&self, token: &str) {
        if let Some(entry) = self.sessions.write().await.get_mut(token) {
            entry.session.logout();
        }
    }

    /// Drops idle sessions; returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| self.is_live(entry, now));
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Fixed set of accounts, hashed at startup.
#[derive(Debug, Clone)]
pub struct UserTable {
    users: Vec<User>,
}

impl UserTable {
    pub fn from_credentials(credentials: &[UserCredentials]) -> ImdgResult<Self> {
        let users = credentials
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let user = User::new(i as u32 + 1, c.username.clone(), &c.password);
                validate_model(&user)?;
                Ok(user)
            })
            .collect::<ImdgResult<Vec<_>>>()?;
        Ok(Self { users })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Checks every account so timing does not reveal which usernames exist.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        let mut found = None;
        for user in &self.users {
            let password_ok = user.check_password(password);
            if user.username == username && password_ok && found.is_none() {
                found = Some(user);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Vec<UserCredentials> {
        vec![
            UserCredentials {
                username: "user".to_string(),
                password: "password".to_string(),
            },
            UserCredentials {
                username: "surveyor".to_string(),
                password: "s3cret".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_resolve_reuses_known_token() {
        let store = SessionStore::new();
        let (token, session, created) = store.resolve(None).await;
        assert!(created);

        let (same_token, same_session, created) = store.resolve(Some(&token)).await;
        assert!(!created);
        assert_eq!(same_token, token);
        assert_eq!(same_session.id, session.id);
    }

    #[tokio::test]
    async fn test_unknown_token_gets_new_session() {
        let store = SessionStore::new();
        let (_, first, _) = store.resolve(None).await;
        let (token, second, created) = store.resolve(Some("forged-token")).await;

        assert!(created);
        assert_ne!(token, "forged-token");
        assert_ne!(first.id, second.id);
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_login_logout_keeps_uuid() {
        let store = SessionStore::new();
        let (token, session) = store.create().await;

        assert!(store.login(&token, "user").await);
        let logged_in = store.get(&token).await.unwrap();
        assert!(logged_in.is_authenticated());
        assert_eq!(logged_in.id, session.id);

        store.logout(&token).await;
        let logged_out = store.get(&token).await.unwrap();
        assert!(!logged_out.is_authenticated());
        assert_eq!(logged_out.id, session.id);

        assert!(!store.login("missing", "user").await);
    }

    async fn backdate(store: &SessionStore, token: &str, by: Duration) {
        let mut sessions = store.sessions.write().await;
        let entry = sessions.get_mut(token).unwrap();
        entry.last_access = entry.last_access - by;
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::with_idle_timeout(Duration::hours(1));
        let (stale, _) = store.create().await;
        let (fresh, _) = store.create().await;
        backdate(&store, &stale, Duration::hours(2)).await;

        assert!(store.get(&stale).await.is_none());
        assert!(store.get(&fresh).await.is_some());
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_creating_session_prunes_idle_ones() {
        let store = SessionStore::with_idle_timeout(Duration::hours(1));
        for _ in 0..5 {
            let (token, _) = store.create().await;
            backdate(&store, &token, Duration::hours(3)).await;
        }
        assert_eq!(store.session_count().await, 5);

        store.create().await;
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_cleanup_expired_counts_removed() {
        let store = SessionStore::with_idle_timeout(Duration::hours(1));
        let (stale, _) = store.create().await;
        store.create().await;
        backdate(&store, &stale, Duration::hours(2)).await;

        assert_eq!(store.cleanup_expired().await, 1);
        assert_eq!(store.cleanup_expired().await, 0);
    }

    #[tokio::test]
    async fn test_activity_keeps_session_alive() {
        let store = SessionStore::with_idle_timeout(Duration::hours(1));
        let (token, session) = store.create().await;

        // Two 40 minute gaps, each shorter than the timeout.
        backdate(&store, &token, Duration::minutes(40)).await;
        assert!(store.get(&token).await.is_some());
        backdate(&store, &token, Duration::minutes(40)).await;

        let (same, resolved, created) = store.resolve(Some(&token)).await;
        assert!(!created);
        assert_eq!(same, token);
        assert_eq!(resolved.id, session.id);
    }

    #[test]
    fn test_authenticate() {
        let users = UserTable::from_credentials(&credentials()).unwrap();
        assert_eq!(users.len(), 2);

        assert_eq!(users.authenticate("user", "password").unwrap().id, 1);
        assert_eq!(users.authenticate("surveyor", "s3cret").unwrap().id, 2);
        assert!(users.authenticate("user", "s3cret").is_none());
        assert!(users.authenticate("nobody", "password").is_none());
    }

    #[test]
    fn test_invalid_username_rejected() {
        let creds = vec![UserCredentials {
            username: String::new(),
            password: "x".to_string(),
        }];
        assert!(UserTable::from_credentials(&creds).is_err());
    }
}
