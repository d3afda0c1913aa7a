use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token expired")]
    RefreshTokenExpired,
}

/// Freshly issued tokens. Only their digests are kept by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires
    pub expires_in: u64,
}

#[derive(Debug, Clone)]
struct Session {
    user_id: Uuid,
    access_digest: String,
    access_expires_at: DateTime<Utc>,
    refresh_digest: String,
    refresh_expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Sessions {
    by_id: HashMap<Uuid, Session>,
    by_access: HashMap<String, Uuid>,
    by_refresh: HashMap<String, Uuid>,
}

impl Sessions {
    fn insert(&mut self, id: Uuid, session: Session) {
        self.by_access.insert(session.access_digest.clone(), id);
        self.by_refresh.insert(session.refresh_digest.clone(), id);
        self.by_id.insert(id, session);
    }

    fn remove(&mut self, id: &Uuid) -> Option<Session> {
        let session = self.by_id.remove(id)?;
        self.by_access.remove(&session.access_digest);
        self.by_refresh.remove(&session.refresh_digest);
        Some(session)
    }
}

/// Opaque bearer sessions with rotating refresh tokens.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<Sessions>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

pub fn digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn generate_token() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

// Keeps `now + ttl` far from overflowing
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

fn ttl(seconds: u64) -> Duration {
    Duration::seconds(seconds.min(MAX_TTL_SECS) as i64)
}

impl SessionStore {
    pub fn new(access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            access_ttl: ttl(access_ttl_secs),
            refresh_ttl: ttl(refresh_ttl_secs),
        }
    }

    fn new_session(&self, user_id: Uuid) -> (Session, IssuedTokens) {
        let now = Utc::now();
        let access_token = generate_token();
        let refresh_token = generate_token();

        let session = Session {
            user_id,
            access_digest: digest(&access_token),
            access_expires_at: now + self.access_ttl,
            refresh_digest: digest(&refresh_token),
            refresh_expires_at: now + self.refresh_ttl,
        };
        let tokens = IssuedTokens {
            access_token,
            refresh_token,
            expires_in: self.access_ttl.num_seconds().max(0) as u64,
        };
        (session, tokens)
    }

    pub async fn issue(&self, user_id: Uuid) -> IssuedTokens {
        let (session, tokens) = self.new_session(user_id);
        self.sessions.write().await.insert(Uuid::new_v4(), session);
        debug!("Issued session for user {}", user_id);
        tokens
    }

    /// Returns the user of a valid, unexpired access token.
    pub async fn authenticate(&self, access_token: &str) -> Option<Uuid> {
        let sessions = self.sessions.read().await;
        let id = sessions.by_access.get(&digest(access_token))?;
        let session = sessions.by_id.get(id)?;

        if session.access_expires_at <= Utc::now() {
            debug!("Access token of user {} expired", session.user_id);
            return None;
        }
        Some(session.user_id)
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// The old pair is invalidated, a refresh token can be used once.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(Uuid, IssuedTokens), SessionError> {
        let mut sessions = self.sessions.write().await;
        let id = *sessions
            .by_refresh
            .get(&digest(refresh_token))
            .ok_or(SessionError::InvalidRefreshToken)?;
        let old = sessions
            .remove(&id)
            .ok_or(SessionError::InvalidRefreshToken)?;

        if old.refresh_expires_at <= Utc::now() {
            return Err(SessionError::RefreshTokenExpired);
        }

        let (session, tokens) = self.new_session(old.user_id);
        sessions.insert(id, session);
        debug!("Rotated session tokens of user {}", old.user_id);

        Ok((old.user_id, tokens))
    }

    /// Ends the session owning the given access or refresh token.
    pub async fn revoke(&self, token: &str) -> bool {
        let token_digest = digest(token);
        let mut sessions = self.sessions.write().await;
        let id = sessions
            .by_access
            .get(&token_digest)
            .or_else(|| sessions.by_refresh.get(&token_digest))
            .copied();

        match id {
            Some(id) => sessions.remove(&id).is_some(),
            None => false,
        }
    }

    /// Ends every session of a user, returning how many were open.
    pub async fn revoke_user(&self, user_id: &Uuid) -> usize {
        let mut sessions = self.sessions.write().await;
        let ids: Vec<Uuid> = sessions
            .by_id
            .iter()
            .filter(|(_, s)| s.user_id == *user_id)
            .map(|(id, _)| *id)
            .collect();

        for id in &ids {
            sessions.remove(id);
        }
        ids.len()
    }

    /// Drops sessions whose refresh token expired.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let expired: Vec<Uuid> = sessions
            .by_id
            .iter()
            .filter(|(_, s)| s.refresh_expires_at <= now)
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            sessions.remove(id);
        }
        expired.len()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_sha256_hex() {
        assert_eq!(
            digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_issue_and_authenticate() {
        let store = SessionStore::new(60, 3600);
        let user = Uuid::new_v4();
        let tokens = store.issue(user).await;

        assert_eq!(tokens.expires_in, 60);
        assert_ne!(tokens.access_token, tokens.refresh_token);
        assert_eq!(store.authenticate(&tokens.access_token).await, Some(user));
        assert_eq!(store.authenticate(&tokens.refresh_token).await, None);
        assert_eq!(store.authenticate("garbage").await, None);
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let store = SessionStore::new(60, 3600);
        let user = Uuid::new_v4();
        let first = store.issue(user).await;

        let (refreshed_user, second) = store.refresh(&first.refresh_token).await.unwrap();
        assert_eq!(refreshed_user, user);
        assert_eq!(store.authenticate(&second.access_token).await, Some(user));
        assert_eq!(store.authenticate(&first.access_token).await, None);

        assert_eq!(
            store.refresh(&first.refresh_token).await.unwrap_err(),
            SessionError::InvalidRefreshToken
        );
        assert_eq!(store.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_expired_tokens() {
        let store = SessionStore::new(0, 0);
        let tokens = store.issue(Uuid::new_v4()).await;

        assert_eq!(store.authenticate(&tokens.access_token).await, None);
        assert_eq!(
            store.refresh(&tokens.refresh_token).await.unwrap_err(),
            SessionError::RefreshTokenExpired
        );
        assert_eq!(store.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_revoke() {
        let store = SessionStore::new(60, 3600);
        let user = Uuid::new_v4();
        let a = store.issue(user).await;
        let b = store.issue(user).await;
        let other = store.issue(Uuid::new_v4()).await;

        assert!(store.revoke(&a.refresh_token).await);
        assert!(!store.revoke(&a.access_token).await);
        assert_eq!(store.authenticate(&a.access_token).await, None);
        assert_eq!(store.authenticate(&b.access_token).await, Some(user));

        assert_eq!(store.revoke_user(&user).await, 1);
        assert_eq!(store.authenticate(&b.access_token).await, None);
        assert!(store.authenticate(&other.access_token).await.is_some());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = SessionStore::new(0, 0);
        store.issue(Uuid::new_v4()).await;
        store.issue(Uuid::new_v4()).await;
        assert_eq!(store.purge_expired().await, 2);
        assert_eq!(store.active_count().await, 0);
    }
}
