use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewUser, StoreError, StoreResult, UserPatch, UserRecord, UserStore};

/// Users held in process memory, keyed by username. Used when no database is
/// configured and in tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_one(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }

    async fn insert(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.username) {
            return Err(StoreError::DuplicateKey(format!(
                "username \"{}\" already exists",
                user.username
            )));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            date_joined: user.date_joined,
            biography: None,
        };
        users.insert(record.username.clone(), record.clone());

        tracing::debug!(user_id = %record.id, username = %record.username, "Inserted user");
        Ok(record)
    }

    async fn find_one_and_update(
        &self,
        username: &str,
        patch: UserPatch,
    ) -> StoreResult<Option<UserRecord>> {
        let mut users = self.users.write().await;

        let Some(record) = users.get_mut(username) else {
            return Ok(None);
        };

        if let Some(password_hash) = patch.password_hash {
            record.password_hash = password_hash;
        }
        if let Some(biography) = patch.biography {
            record.biography = Some(biography);
        }

        Ok(Some(record.clone()))
    }

    async fn find_one_and_delete(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let mut users = self.users.write().await;
        Ok(users.remove(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            date_joined: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_rejects_duplicates() {
        let store = InMemoryUserStore::new();

        let first = store.insert(new_user("alex")).await.unwrap();
        assert_eq!(first.username, "alex");

        let second = store.insert(new_user("alex")).await;
        assert!(matches!(second, Err(StoreError::DuplicateKey(_))));

        assert_eq!(store.len().await, 1);
        let kept = store.find_one("alex").await.unwrap().unwrap();
        assert_eq!(kept.id, first.id);
    }

    #[tokio::test]
    async fn lookups_are_case_sensitive() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("Alex")).await.unwrap();

        assert!(store.find_one("alex").await.unwrap().is_none());
        assert!(store.find_one("Alex").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_only_touches_patched_fields() {
        let store = InMemoryUserStore::new();
        let created = store.insert(new_user("alex")).await.unwrap();

        let patch = UserPatch {
            biography: Some("hi".to_string()),
            ..Default::default()
        };
        let updated = store
            .find_one_and_update("alex", patch)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.biography.as_deref(), Some("hi"));
        assert_eq!(updated.password_hash, created.password_hash);
        assert_eq!(updated.date_joined, created.date_joined);
        assert_eq!(updated.id, created.id);
    }

    #[tokio::test]
    async fn missing_user_yields_none() {
        let store = InMemoryUserStore::new();

        assert!(store
            .find_one_and_update("ghost", UserPatch::default())
            .await
            .unwrap()
            .is_none());
        assert!(store.find_one_and_delete("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_returns_removed_record() {
        let store = InMemoryUserStore::new();
        let created = store.insert(new_user("alex")).await.unwrap();

        let deleted = store.find_one_and_delete("alex").await.unwrap().unwrap();
        assert_eq!(deleted, created);
        assert!(store.is_empty().await);
    }
}
