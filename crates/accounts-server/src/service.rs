use std::sync::Arc;

use accounts_shared::{api::UserCredentials, SafeUser};
use chrono::{DateTime, SubsecRound, Utc};

use crate::auth::{dummy_hash, hash_password, verify_password};
use crate::error::{UserError, UserResult};
use crate::store::{NewUser, StoreError, UserPatch, UserStore};

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub date_joined: Option<DateTime<Utc>>,
}

/// Partial update. The username is the lookup key and cannot be changed here.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub password: Option<String>,
    pub biography: Option<String>,
}

/// User operations over a [`UserStore`]. Every operation returns either the
/// sanitized user or a [`UserError`]; store faults are translated here.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    /// Verified against on lookup misses so they cost as much as a wrong password.
    dummy_hash: Option<Arc<str>>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            dummy_hash: dummy_hash().map(Arc::from),
        }
    }

    pub async fn create(&self, input: CreateUser) -> UserResult<SafeUser> {
        if input.username.trim().is_empty() {
            return Err(UserError::Validation("Username is required".to_string()));
        }
        if input.password.is_empty() {
            return Err(UserError::Validation("Password is required".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        // Postgres keeps microseconds; truncate so the value round-trips.
        let date_joined = input.date_joined.unwrap_or_else(Utc::now).trunc_subsecs(6);

        let record = self
            .store
            .insert(NewUser {
                username: input.username,
                password_hash,
                date_joined,
            })
            .await
            .map_err(|err| match err {
                StoreError::DuplicateKey(_) => UserError::UsernameTaken,
                err => store_failure(err, "Failed to create user"),
            })?;

        tracing::info!(user_id = %record.id, username = %record.username, "User created");
        Ok(record.into())
    }

    pub async fn fetch_by_username(&self, username: &str) -> UserResult<SafeUser> {
        self.store
            .find_one(username)
            .await
            .map_err(|err| store_failure(err, "Failed to retrieve user"))?
            .map(SafeUser::from)
            .ok_or(UserError::NotFound)
    }

    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn authenticate(&self, credentials: UserCredentials) -> UserResult<SafeUser> {
        let record = self
            .store
            .find_one(&credentials.username)
            .await
            .map_err(|err| store_failure(err, "Failed to authenticate user"))?;

        let Some(record) = record else {
            if let Some(hash) = &self.dummy_hash {
                let _ = verify_password(&credentials.password, hash);
            }
            return Err(UserError::InvalidCredentials);
        };

        match verify_password(&credentials.password, &record.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(username = %record.username, "Password mismatch");
                return Err(UserError::InvalidCredentials);
            }
            Err(err) => {
                tracing::error!(
                    username = %record.username,
                    error = %err,
                    "Stored password hash is unreadable"
                );
                return Err(UserError::InvalidCredentials);
            }
        }

        Ok(record.into())
    }

    pub async fn delete_by_username(&self, username: &str) -> UserResult<SafeUser> {
        let record = self
            .store
            .find_one_and_delete(username)
            .await
            .map_err(|err| store_failure(err, "Failed to delete user"))?
            .ok_or(UserError::NotFound)?;

        tracing::info!(user_id = %record.id, username = %record.username, "User deleted");
        Ok(record.into())
    }

    pub async fn update(&self, username: &str, updates: UpdateUser) -> UserResult<SafeUser> {
        let password_hash = updates
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;

        let patch = UserPatch {
            password_hash,
            biography: updates.biography,
        };

        let record = self
            .store
            .find_one_and_update(username, patch)
            .await
            .map_err(|err| store_failure(err, "Failed to update user"))?
            .ok_or(UserError::NotFound)?;

        tracing::info!(user_id = %record.id, username = %record.username, "User updated");
        Ok(record.into())
    }
}

fn store_failure(err: StoreError, fallback: &str) -> UserError {
    tracing::error!(error = %err, "User store operation failed");

    let message = err.to_string();
    if message.trim().is_empty() {
        UserError::Store(fallback.to_string())
    } else {
        UserError::Store(message)
    }
}
