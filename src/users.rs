//! Users and Sessions
//!
//! The user list is static (a JSON file, or a built-in demo list). Logging in
//! is permissive: any listed user with a non-empty password gets
//! a session token. Sessions live in memory only.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

/// A person who can log in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Please select a user")]
    MissingUser,

    #[error("Please enter a password")]
    MissingPassword,

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Invalid or expired session")]
    InvalidSession,

    #[error("Failed to read user list {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse user list {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// The static list of users
#[derive(Debug, Clone)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// Built-in demo accounts
    pub fn demo() -> Self {
        Self::new(vec![
            User::new("1", "Alice Johnson"),
            User::new("2", "Bob Smith"),
            User::new("3", "Carol Davis"),
        ])
    }

    /// Load a JSON array of users; a missing file falls back to the demo list
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        if !path.exists() {
            tracing::info!(path = ?path, "User list not found, using demo users");
            return Ok(Self::demo());
        }

        let content = std::fs::read_to_string(path).map_err(|e| AuthError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let users: Vec<User> = serde_json::from_str(&content).map_err(|e| AuthError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        tracing::info!(path = ?path, count = users.len(), "Loaded user list");
        Ok(Self::new(users))
    }

    pub fn all(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::demo()
    }
}

/// An active login
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
}

/// In-memory session registry
pub struct SessionManager {
    directory: UserDirectory,
    sessions: RwLock<HashMap<String, Session>>,
    /// Sessions older than this are rejected; None keeps them until logout
    ttl: Option<Duration>,
}

impl SessionManager {
    pub fn new(directory: UserDirectory, ttl: Option<Duration>) -> Self {
        Self {
            directory,
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    /// Log a user in
    pub async fn login(&self, user_id: &str, password: &str) -> Result<Session, AuthError> {
        if user_id.trim().is_empty() {
            return Err(AuthError::MissingUser);
        }
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        let user = self
            .directory
            .get(user_id.trim())
            .cloned()
            .ok_or_else(|| AuthError::UnknownUser(user_id.to_string()))?;

        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            user,
            created_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !self.is_expired(s));
        let swept = before - sessions.len();
        if swept > 0 {
            tracing::debug!(swept, "Dropped expired sessions");
        }
        sessions.insert(session.token.clone(), session.clone());
        drop(sessions);

        tracing::info!(user_id = %session.user.id, "User logged in");
        Ok(session)
    }

    /// End a session; returns false if the token was unknown
    pub async fn logout(&self, token: &str) -> bool {
        match self.sessions.write().await.remove(token) {
            Some(session) => {
                tracing::info!(user_id = %session.user.id, "User logged out");
                true
            }
            None => false,
        }
    }

    /// Resolve a token to its user
    ///
    /// An expired session is removed on lookup.
    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        {
            let sessions = self.sessions.read().await;
            let session = sessions.get(token).ok_or(AuthError::InvalidSession)?;
            if !self.is_expired(session) {
                return Ok(session.user.clone());
            }
        }

        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get(token) {
            if self.is_expired(session) {
                tracing::info!(user_id = %session.user.id, "Session expired");
                sessions.remove(token);
            }
        }
        Err(AuthError::InvalidSession)
    }

    /// Number of live sessions
    pub async fn active_sessions(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| !self.is_expired(s))
            .count()
    }

    fn is_expired(&self, session: &Session) -> bool {
        self.ttl
            .is_some_and(|ttl| Utc::now() - session.created_at > ttl)
    }
}
