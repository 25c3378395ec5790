//! Meeting entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the meetings table.
#[derive(Debug, Clone, FromRow)]
pub struct MeetingEntity {
    pub id: Uuid,
    pub meeting_spec_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<MeetingEntity> for domain::models::Meeting {
    fn from(entity: MeetingEntity) -> Self {
        Self {
            id: entity.id,
            meeting_spec_id: entity.meeting_spec_id,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the meeting_participants table.
#[derive(Debug, Clone, FromRow)]
pub struct MeetingParticipantEntity {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub user_id: Uuid,
}

impl From<MeetingParticipantEntity> for domain::models::MeetingParticipant {
    fn from(entity: MeetingParticipantEntity) -> Self {
        Self {
            id: entity.id,
            meeting_id: entity.meeting_id,
            user_id: entity.user_id,
        }
    }
}

/// Joined row: one participant of a persisted meeting with user fields.
#[derive(Debug, Clone, FromRow)]
pub struct GroupMemberEntity {
    pub meeting_id: Uuid,
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub photo_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupMemberEntity> for domain::models::User {
    fn from(entity: GroupMemberEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            full_name: entity.full_name,
            photo_url: entity.photo_url,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// One unordered user pair from the pair-history query.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct PairRowEntity {
    pub user_a: Uuid,
    pub user_b: Uuid,
}
