//! Meeting spec entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the meeting_specs table.
#[derive(Debug, Clone, FromRow)]
pub struct SpecEntity {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub week_start: NaiveDate,
    pub meeting_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<SpecEntity> for domain::models::MeetingSpec {
    fn from(entity: SpecEntity) -> Self {
        Self {
            id: entity.id,
            subscription_id: entity.subscription_id,
            week_start: entity.week_start,
            meeting_at: entity.meeting_at,
            created_at: entity.created_at,
        }
    }
}
