//! Meeting request repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::User;
use domain::services::batch::RequestStore;
use domain::StoreError;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;
use crate::repositories::map_sqlx_err;

/// Repository resolving opt-in requests to participant pools.
#[derive(Clone)]
pub struct MeetingRequestRepository {
    pool: PgPool,
}

impl MeetingRequestRepository {
    /// Creates a new MeetingRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestStore for MeetingRequestRepository {
    async fn requesters_for(&self, spec_id: Uuid) -> Result<Vec<User>, StoreError> {
        let timer = QueryTimer::new("list_requesters_for_spec");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT u.id, u.email, u.full_name, u.photo_url, u.is_active, u.created_at, u.updated_at
            FROM users u
            JOIN meeting_requests r ON r.user_id = u.id
            WHERE r.meeting_spec_id = $1 AND u.is_active = true
            ORDER BY r.requested_at
            "#,
        )
        .bind(spec_id)
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
    // MeetingRequestRepository tests require a database connection and are
    // covered by integration tests.
}
