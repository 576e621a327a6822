//! Persistence for user records.
//!
//! The store behaves like a document collection keyed by a unique `username`:
//! lookups, inserts that reject duplicates, and atomic find-and-modify
//! operations that hand back the affected record.

mod memory;
mod postgres;

use accounts_shared::SafeUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

/// A stored user, credentials included. Convert to [`SafeUser`] before it
/// leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
    pub biography: Option<String>,
}

impl From<UserRecord> for SafeUser {
    fn from(record: UserRecord) -> Self {
        SafeUser {
            id: record.id,
            username: record.username,
            date_joined: record.date_joined,
            biography: record.biography,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// Fields to overwrite; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub password_hash: Option<String>,
    pub biography: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.password_hash.is_none() && self.biography.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error(transparent)]
    Database(sqlx::Error),

    /// The backend could not be reached at all.
    #[error("{0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateKey(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user with exactly this username.
    async fn find_one(&self, username: &str) -> StoreResult<Option<UserRecord>>;

    /// Insert a new user, assigning its id. Fails with
    /// [`StoreError::DuplicateKey`] if the username is taken.
    async fn insert(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// Apply `patch` to the matching user and return the updated record.
    async fn find_one_and_update(
        &self,
        username: &str,
        patch: UserPatch,
    ) -> StoreResult<Option<UserRecord>>;

    /// Remove the matching user and return what was removed.
    async fn find_one_and_delete(&self, username: &str) -> StoreResult<Option<UserRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failures_map_to_unavailable() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(err.to_string(), sqlx::Error::PoolTimedOut.to_string());
    }

    #[test]
    fn other_failures_stay_database_errors() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }
}
