//! Meeting subscription entity (database row mapping).
//!
//! Recurrence fields are stored as the administrator entered them; the
//! domain parses them per run so a malformed rule fails only its own
//! subscription.

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the meeting_subscriptions table.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub title: String,
    pub frequency: String,
    pub weekday: String,
    pub time_of_day: NaiveTime,
    pub group_size: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionEntity> for domain::models::MeetingSubscription {
    fn from(entity: SubscriptionEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            frequency: entity.frequency,
            weekday: entity.weekday,
            time_of_day: entity.time_of_day,
            group_size: entity.group_size,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
