//! Meeting, participant and pairing domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::User;

/// A persisted meeting: one matched group for one spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Meeting {
    pub id: Uuid,
    pub meeting_spec_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A user's membership in a persisted meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MeetingParticipant {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub user_id: Uuid,
}

/// A user's opt-in to a specific meeting spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MeetingRequest {
    pub id: Uuid,
    pub meeting_spec_id: Uuid,
    pub user_id: Uuid,
    pub requested_at: DateTime<Utc>,
}

/// An unordered pair of users.
///
/// Construction normalizes the order so `(a, b)` and `(b, a)` compare and
/// hash identically; pair history sets rely on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserPair(Uuid, Uuid);

impl UserPair {
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn first(&self) -> Uuid {
        self.0
    }

    pub fn second(&self) -> Uuid {
        self.1
    }
}

/// Result of one matching run: full-size groups plus the users that could
/// not be placed. Transient; persisted downstream as meetings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    pub groups: Vec<Vec<User>>,
    pub unmatched: Vec<User>,
}

impl MatchOutcome {
    /// Total number of users placed into groups.
    pub fn matched_users(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_user_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(UserPair::new(a, b), UserPair::new(b, a));
    }

    #[test]
    fn test_user_pair_hashes_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut set = HashSet::new();
        set.insert(UserPair::new(a, b));
        assert!(set.contains(&UserPair::new(b, a)));
    }

    #[test]
    fn test_user_pair_self_pair() {
        let a = Uuid::new_v4();
        let pair = UserPair::new(a, a);
        assert_eq!(pair.first(), a);
        assert_eq!(pair.second(), a);
    }

    #[test]
    fn test_user_pair_components_sorted() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let pair = UserPair::new(a, b);
        assert!(pair.first() <= pair.second());
    }
}
