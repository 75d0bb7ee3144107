use crate::persistence::PersistenceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

/// The signed-in user. Its `id` becomes the owner of remote hatims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account already exists for {0}")]
    EmailTaken(String),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for AuthError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(value.into())
    }
}

/// Email/password authentication with a single current session.
pub trait AuthProvider: Send + Sync {
    /// Registers an account without signing in.
    fn sign_up(&self, email: &str, password: &str) -> Result<SessionUser, AuthError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, AuthError>;
    fn sign_out(&self) -> Result<(), AuthError>;
    fn current_user(&self) -> Option<SessionUser>;
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AuthError::InvalidEmail(email));
    }
    Ok(email)
}

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteAuthProvider;

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::{AuthError, AuthProvider, MIN_PASSWORD_LEN, SessionUser, normalize_email};
    use parking_lot::Mutex;
    use rusqlite::{Connection, OptionalExtension, params};
    use sha2::{Digest, Sha256};
    use std::fmt::Write;
    use std::path::Path;
    use tracing::{info, warn};
    use uuid::Uuid;

    pub struct SqliteAuthProvider {
        connection: Mutex<Connection>,
        current: Mutex<Option<SessionUser>>,
    }

    impl SqliteAuthProvider {
        pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
            Self::with_connection(Connection::open(path)?)
        }

        pub fn in_memory() -> Result<Self, AuthError> {
            Self::with_connection(Connection::open_in_memory()?)
        }

        fn with_connection(connection: Connection) -> Result<Self, AuthError> {
            connection.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    email TEXT NOT NULL UNIQUE,
                    password_salt TEXT NOT NULL,
                    password_hash TEXT NOT NULL
                );
                "#,
            )?;
            Ok(Self {
                connection: Mutex::new(connection),
                current: Mutex::new(None),
            })
        }
    }

    fn hash_password(salt: &str, password: &str) -> String {
        let digest = Sha256::new()
            .chain_update(salt.as_bytes())
            .chain_update(password.as_bytes())
            .finalize();
        digest.iter().fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
    }

    impl AuthProvider for SqliteAuthProvider {
        fn sign_up(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
            let email = normalize_email(email)?;
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(AuthError::WeakPassword {
                    min: MIN_PASSWORD_LEN,
                });
            }

            let conn = self.connection.lock();
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM users WHERE email = ?1",
                    params![email],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Err(AuthError::EmailTaken(email));
            }

            let user = SessionUser {
                id: Uuid::new_v4().to_string(),
                email,
            };
            let salt = Uuid::new_v4().simple().to_string();
            conn.execute(
                "INSERT INTO users (id, email, password_salt, password_hash) VALUES (?1, ?2, ?3, ?4)",
                params![user.id, user.email, salt, hash_password(&salt, password)],
            )?;
            info!(user_id = %user.id, "registered user");
            Ok(user)
        }

        fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
            let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
            let record: Option<(String, String, String)> = {
                let conn = self.connection.lock();
                conn.query_row(
                    "SELECT id, password_salt, password_hash FROM users WHERE email = ?1",
                    params![email],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?
            };

            let Some((id, salt, expected)) = record else {
                warn!("sign-in attempt for unknown account");
                return Err(AuthError::InvalidCredentials);
            };
            if hash_password(&salt, password) != expected {
                warn!(user_id = %id, "sign-in attempt with wrong password");
                return Err(AuthError::InvalidCredentials);
            }

            let user = SessionUser { id, email };
            *self.current.lock() = Some(user.clone());
            info!(user_id = %user.id, "signed in");
            Ok(user)
        }

        fn sign_out(&self) -> Result<(), AuthError> {
            if let Some(user) = self.current.lock().take() {
                info!(user_id = %user.id, "signed out");
            }
            Ok(())
        }

        fn current_user(&self) -> Option<SessionUser> {
            self.current.lock().clone()
        }
    }
}
