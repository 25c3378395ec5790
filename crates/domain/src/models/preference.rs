//! User subscription preference domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's standing opt-in preference for a subscription.
///
/// Created by the opt-in flow; the cleanup task removes preferences whose
/// subscription or user is gone or inactive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserSubscriptionPreference {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subscription_id: Uuid,
    pub created_at: DateTime<Utc>,
}
