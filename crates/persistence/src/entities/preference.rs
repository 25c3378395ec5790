//! User subscription preference entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the user_subscription_preferences table.
#[derive(Debug, Clone, FromRow)]
pub struct PreferenceEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subscription_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<PreferenceEntity> for domain::models::UserSubscriptionPreference {
    fn from(entity: PreferenceEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            subscription_id: entity.subscription_id,
            created_at: entity.created_at,
        }
    }
}
