//! User subscription preference repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::UserSubscriptionPreference;
use domain::services::cleanup::PreferenceStore;
use domain::StoreError;

use crate::entities::PreferenceEntity;
use crate::metrics::QueryTimer;
use crate::repositories::map_sqlx_err;

/// Repository for subscription-preference database operations.
#[derive(Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    /// Creates a new PreferenceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    async fn list_all(&self) -> Result<Vec<UserSubscriptionPreference>, StoreError> {
        let timer = QueryTimer::new("list_all_preferences");
        let result = sqlx::query_as::<_, PreferenceEntity>(
            r#"
            SELECT id, user_id, subscription_id, created_at
            FROM user_subscription_preferences
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(map_sqlx_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let timer = QueryTimer::new("delete_preference");
        let result = sqlx::query(
            r#"
            DELETE FROM user_subscription_preferences
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ()).map_err(map_sqlx_err)
    }
}

#[cfg(test)]
mod tests {
    // PreferenceRepository tests require a database connection and are
    // covered by integration tests.
}
