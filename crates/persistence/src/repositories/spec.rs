//! Meeting spec repository for database operations.
//!
//! The meeting_specs table carries a uniqueness constraint on
//! (subscription_id, week_start); `create` surfaces a violation as
//! `StoreError::Conflict`, which is the idempotency boundary the weekly
//! batch relies on.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::MeetingSpec;
use domain::services::batch::SpecStore;
use domain::StoreError;

use crate::entities::SpecEntity;
use crate::metrics::QueryTimer;
use crate::repositories::map_sqlx_err;

/// Repository for meeting-spec database operations.
#[derive(Clone)]
pub struct SpecRepository {
    pool: PgPool,
}

impl SpecRepository {
    /// Creates a new SpecRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpecStore for SpecRepository {
    async fn find(
        &self,
        subscription_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<Option<MeetingSpec>, StoreError> {
        let timer = QueryTimer::new("find_spec");
        let result = sqlx::query_as::<_, SpecEntity>(
            r#"
            SELECT id, subscription_id, week_start, meeting_at, created_at
            FROM meeting_specs
            WHERE subscription_id = $1 AND week_start = $2
            "#,
        )
        .bind(subscription_id)
        .bind(week_start)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_sqlx_err)?.map(Into::into))
    }

    async fn create(
        &self,
        subscription_id: Uuid,
        week_start: NaiveDate,
        meeting_at: DateTime<Utc>,
    ) -> Result<MeetingSpec, StoreError> {
        let timer = QueryTimer::new("create_spec");
        let result = sqlx::query_as::<_, SpecEntity>(
            r#"
            INSERT INTO meeting_specs (subscription_id, week_start, meeting_at)
            VALUES ($1, $2, $3)
            RETURNING id, subscription_id, week_start, meeting_at, created_at
            "#,
        )
        .bind(subscription_id)
        .bind(week_start)
        .bind(meeting_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map(Into::into).map_err(map_sqlx_err)
    }

    async fn list_for_week(&self, week_start: NaiveDate) -> Result<Vec<MeetingSpec>, StoreError> {
        let timer = QueryTimer::new("list_specs_for_week");
        let result = sqlx::query_as::<_, SpecEntity>(
            r#"
            SELECT id, subscription_id, week_start, meeting_at, created_at
            FROM meeting_specs
            WHERE week_start = $1
            ORDER BY meeting_at
            "#,
        )
        .bind(week_start)
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
    // SpecRepository tests require a database connection and are covered
    // by integration tests.
}
