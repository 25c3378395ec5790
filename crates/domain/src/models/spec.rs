//! Meeting spec domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One dated instance of a subscription: "this subscription's meeting for
/// this week".
///
/// At most one spec exists per (subscription, week_start); the spec store
/// enforces this with a uniqueness constraint. A spec is immutable once
/// created within its week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MeetingSpec {
    pub id: Uuid,
    pub subscription_id: Uuid,
    /// Monday of the ISO week this spec belongs to.
    pub week_start: NaiveDate,
    /// Concrete meeting date-time within the week, UTC.
    pub meeting_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
