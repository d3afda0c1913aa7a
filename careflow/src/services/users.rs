use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const MIN_PASSWORD_LENGTH: usize = 8;

const DUMMY_PASSWORD: &str = "careflow-unknown-account";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is suspended")]
    AccountSuspended,

    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least 8 characters long")]
    WeakPassword,

    #[error("First and last name are required")]
    MissingName,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// In-memory account directory. Passwords are kept as bcrypt hashes only.
#[derive(Debug)]
pub struct UserDirectory {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    hash_cost: u32,
    /// Verified against for unknown emails so both paths run bcrypt
    dummy_hash: OnceCell<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String, UserError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| UserError::Hashing(e.to_string()))?
        .map_err(|e| UserError::Hashing(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

impl UserDirectory {
    pub fn new(hash_cost: u32) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            hash_cost,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Validates and stores a new account. The role is taken as given,
    /// callers check that it exists.
    pub async fn create(&self, new_user: NewUser) -> Result<UserRecord, UserError> {
        let email = normalize_email(&new_user.email);
        if !is_valid_email(&email) {
            return Err(UserError::InvalidEmail(new_user.email));
        }
        if new_user.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(UserError::WeakPassword);
        }
        let first_name = new_user.first_name.trim().to_string();
        let last_name = new_user.last_name.trim().to_string();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(UserError::MissingName);
        }

        if self.find_by_email(&email).await.is_some() {
            return Err(UserError::EmailTaken(email));
        }

        let password_hash = hash_password(new_user.password, self.hash_cost).await?;

        let record = UserRecord {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash,
            first_name,
            last_name,
            role: new_user.role,
            is_active: true,
            created_at: Utc::now(),
        };

        let mut users = self.users.write().await;
        // Re-check, another request may have registered the email while hashing
        if users.values().any(|u| u.email == email) {
            return Err(UserError::EmailTaken(email));
        }
        users.insert(record.id, record.clone());
        info!("Created user {} with role {}", record.email, record.role);

        Ok(record)
    }

    /// Returns the account for valid credentials of an active user.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, UserError> {
        let Some(user) = self.find_by_email(email).await else {
            debug!("Login attempt for unknown email {}", email);
            if let Ok(hash) = self
                .dummy_hash
                .get_or_try_init(|| hash_password(DUMMY_PASSWORD.to_string(), self.hash_cost))
                .await
            {
                verify_password(password.to_string(), hash.clone()).await;
            }
            return Err(UserError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await {
            debug!("Wrong password for {}", user.email);
            return Err(UserError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(UserError::AccountSuspended);
        }

        Ok(user)
    }

    pub async fn get(&self, id: &Uuid) -> Option<UserRecord> {
        self.users.read().await.get(id).cloned()
    }

    pub async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let email = normalize_email(email);
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    /// All accounts, oldest first.
    pub async fn list(&self) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.email.cmp(&b.email))
        });
        users
    }

    pub async fn set_role(&self, id: &Uuid, role: &str) -> Result<UserRecord, UserError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(UserError::NotFound(*id))?;
        user.role = role.to_string();
        Ok(user.clone())
    }

    pub async fn set_active(&self, id: &Uuid, is_active: bool) -> Result<UserRecord, UserError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(UserError::NotFound(*id))?;
        user.is_active = is_active;
        Ok(user.clone())
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            role: "doctor".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_verify() {
        let directory = UserDirectory::new(4);
        let user = directory
            .create(new_user(" Grace@Example.com ", "correct horse"))
            .await
            .unwrap();
        assert_eq!(user.email, "grace@example.com");
        assert_ne!(user.password_hash, "correct horse");
        assert!(user.is_active);

        let verified = directory
            .verify_credentials("GRACE@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(verified.id, user.id);

        assert_eq!(
            directory
                .verify_credentials("grace@example.com", "wrong horse")
                .await
                .unwrap_err(),
            UserError::InvalidCredentials
        );
        assert_eq!(
            directory
                .verify_credentials("nobody@example.com", "correct horse")
                .await
                .unwrap_err(),
            UserError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_unknown_email_still_runs_bcrypt() {
        let directory = UserDirectory::new(4);
        assert!(directory.dummy_hash.get().is_none());

        assert_eq!(
            directory
                .verify_credentials("ghost@example.com", "whatever123")
                .await
                .unwrap_err(),
            UserError::InvalidCredentials
        );

        let hash = directory.dummy_hash.get().unwrap();
        assert!(bcrypt::verify(DUMMY_PASSWORD, hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let directory = UserDirectory::new(4);

        assert!(matches!(
            directory.create(new_user("not-an-email", "long enough")).await,
            Err(UserError::InvalidEmail(_))
        ));
        assert_eq!(
            directory
                .create(new_user("a@example.com", "short"))
                .await
                .unwrap_err(),
            UserError::WeakPassword
        );

        let mut nameless = new_user("b@example.com", "long enough");
        nameless.last_name = "  ".to_string();
        assert_eq!(
            directory.create(nameless).await.unwrap_err(),
            UserError::MissingName
        );

        directory
            .create(new_user("c@example.com", "long enough"))
            .await
            .unwrap();
        assert_eq!(
            directory
                .create(new_user("C@example.com", "long enough"))
                .await
                .unwrap_err(),
            UserError::EmailTaken("c@example.com".to_string())
        );
        assert_eq!(directory.count().await, 1);
    }

    #[tokio::test]
    async fn test_suspended_user_cannot_login() {
        let directory = UserDirectory::new(4);
        let user = directory
            .create(new_user("d@example.com", "long enough"))
            .await
            .unwrap();

        directory.set_active(&user.id, false).await.unwrap();
        assert_eq!(
            directory
                .verify_credentials("d@example.com", "long enough")
                .await
                .unwrap_err(),
            UserError::AccountSuspended
        );

        directory.set_active(&user.id, true).await.unwrap();
        assert!(directory
            .verify_credentials("d@example.com", "long enough")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_set_role_of_unknown_user() {
        let directory = UserDirectory::new(4);
        let id = Uuid::new_v4();
        assert_eq!(
            directory.set_role(&id, "nurse").await.unwrap_err(),
            UserError::NotFound(id)
        );
    }
}
