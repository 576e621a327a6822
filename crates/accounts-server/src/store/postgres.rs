use async_trait::async_trait;
use tracing::instrument;

use super::{NewUser, StoreResult, UserPatch, UserRecord, UserStore};
use crate::db::DbPool;

/// Users stored in the `users` table. The unique index on `username` is
/// what serializes competing inserts.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self))]
    async fn find_one(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, date_joined, biography FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, user: NewUser) -> StoreResult<UserRecord> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, password_hash, date_joined)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, date_joined, biography
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.date_joined)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %record.id, "User inserted");
        Ok(record)
    }

    #[instrument(skip(self, patch))]
    async fn find_one_and_update(
        &self,
        username: &str,
        patch: UserPatch,
    ) -> StoreResult<Option<UserRecord>> {
        if patch.is_empty() {
            return self.find_one(username).await;
        }

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
            SET password_hash = COALESCE($2, password_hash),
                biography = COALESCE($3, biography)
            WHERE username = $1
            RETURNING id, username, password_hash, date_joined, biography
            "#,
        )
        .bind(username)
        .bind(patch.password_hash)
        .bind(patch.biography)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[instrument(skip(self))]
    async fn find_one_and_delete(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            DELETE FROM users
            WHERE username = $1
            RETURNING id, username, password_hash, date_joined, biography
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
