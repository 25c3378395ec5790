//! Meeting repository for database operations.
//!
//! Persists matched groups (one meeting + N participants per group, each
//! group in its own transaction) and answers the pair-history query the
//! matching engine biases on.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use domain::models::{User, UserPair};
use domain::services::batch::{MeetingStore, PairHistoryStore};
use domain::StoreError;

use crate::entities::{GroupMemberEntity, MeetingEntity, PairRowEntity};
use crate::metrics::QueryTimer;
use crate::repositories::map_sqlx_err;

/// Repository for meeting-related database operations.
#[derive(Clone)]
pub struct MeetingRepository {
    pool: PgPool,
}

impl MeetingRepository {
    /// Creates a new MeetingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create one meeting with its participants atomically.
    async fn save_group(&self, spec_id: Uuid, group: &[User]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let meeting = sqlx::query_as::<_, MeetingEntity>(
            r#"
            INSERT INTO meetings (meeting_spec_id)
            VALUES ($1)
            RETURNING id, meeting_spec_id, created_at
            "#,
        )
        .bind(spec_id)
        .fetch_one(&mut *tx)
        .await?;

        for member in group {
            sqlx::query(
                r#"
                INSERT INTO meeting_participants (meeting_id, user_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(meeting.id)
            .bind(member.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }
}

#[async_trait]
impl MeetingStore for MeetingRepository {
    async fn save_groups(&self, spec_id: Uuid, groups: &[Vec<User>]) -> Result<(), StoreError> {
        let timer = QueryTimer::new("save_meeting_groups");
        for group in groups {
            self.save_group(spec_id, group)
                .await
                .map_err(map_sqlx_err)?;
        }
        timer.record();
        Ok(())
    }

    async fn exists_for_spec(&self, spec_id: Uuid) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("meetings_exist_for_spec");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM meetings WHERE meeting_spec_id = $1)
            "#,
        )
        .bind(spec_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map_err(map_sqlx_err)
    }

    async fn groups_for_spec(&self, spec_id: Uuid) -> Result<Vec<Vec<User>>, StoreError> {
        let timer = QueryTimer::new("list_groups_for_spec");
        let rows = sqlx::query_as::<_, GroupMemberEntity>(
            r#"
            SELECT
                m.id as meeting_id,
                u.id, u.email, u.full_name, u.photo_url, u.is_active, u.created_at, u.updated_at
            FROM meetings m
            JOIN meeting_participants mp ON mp.meeting_id = m.id
            JOIN users u ON u.id = mp.user_id
            WHERE m.meeting_spec_id = $1
            ORDER BY m.created_at, m.id, mp.id
            "#,
        )
        .bind(spec_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        let mut groups: Vec<Vec<User>> = Vec::new();
        let mut current_meeting: Option<Uuid> = None;
        for row in rows.map_err(map_sqlx_err)? {
            if current_meeting != Some(row.meeting_id) {
                current_meeting = Some(row.meeting_id);
                groups.push(Vec::new());
            }
            if let Some(group) = groups.last_mut() {
                group.push(row.into());
            }
        }
        Ok(groups)
    }
}

#[async_trait]
impl PairHistoryStore for MeetingRepository {
    async fn pairs_within_window(
        &self,
        subscription_id: Uuid,
        window_weeks: u32,
        reference: DateTime<Utc>,
    ) -> Result<HashSet<UserPair>, StoreError> {
        let since = reference - Duration::weeks(i64::from(window_weeks));
        let timer = QueryTimer::new("pairs_within_window");
        let rows = sqlx::query_as::<_, PairRowEntity>(
            r#"
            SELECT a.user_id AS user_a, b.user_id AS user_b
            FROM meetings m
            JOIN meeting_specs s ON s.id = m.meeting_spec_id
            JOIN meeting_participants a ON a.meeting_id = m.id
            JOIN meeting_participants b ON b.meeting_id = m.id AND a.user_id < b.user_id
            WHERE s.subscription_id = $1
              AND s.meeting_at >= $2
              AND s.meeting_at <= $3
            "#,
        )
        .bind(subscription_id)
        .bind(since)
        .bind(reference)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(rows
            .map_err(map_sqlx_err)?
            .into_iter()
            .map(|row| UserPair::new(row.user_a, row.user_b))
            .collect())
    }
}
