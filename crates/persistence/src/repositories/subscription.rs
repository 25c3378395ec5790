//! Meeting subscription repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{MeetingSubscription, User};
use domain::services::batch::SubscriptionStore;
use domain::StoreError;

use crate::entities::{SubscriptionEntity, UserEntity};
use crate::metrics::QueryTimer;
use crate::repositories::map_sqlx_err;

/// Repository for subscription-related database operations.
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    /// Creates a new SubscriptionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionRepository {
    async fn list_active(&self) -> Result<Vec<MeetingSubscription>, StoreError> {
        let timer = QueryTimer::new("list_active_subscriptions");
        let result = sqlx::query_as::<_, SubscriptionEntity>(
            r#"
            SELECT id, title, frequency, weekday, time_of_day, group_size, is_active, created_at, updated_at
            FROM meeting_subscriptions
            WHERE is_active = true
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

    async fn find(&self, id: Uuid) -> Result<Option<MeetingSubscription>, StoreError> {
        let timer = QueryTimer::new("find_subscription_by_id");
        let result = sqlx::query_as::<_, SubscriptionEntity>(
            r#"
            SELECT id, title, frequency, weekday, time_of_day, group_size, is_active, created_at, updated_at
            FROM meeting_subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_sqlx_err)?.map(Into::into))
    }

    async fn subscribers(&self, subscription_id: Uuid) -> Result<Vec<User>, StoreError> {
        let timer = QueryTimer::new("list_subscription_subscribers");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT u.id, u.email, u.full_name, u.photo_url, u.is_active, u.created_at, u.updated_at
            FROM users u
            JOIN user_subscription_preferences p ON p.user_id = u.id
            WHERE p.subscription_id = $1 AND u.is_active = true
            ORDER BY u.email
            "#,
        )
        .bind(subscription_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(map_sqlx_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    // SubscriptionRepository tests require a database connection and are
    // covered by integration tests.
}
