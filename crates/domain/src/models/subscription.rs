//! Meeting subscription domain models.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;

/// How often a subscription produces meeting specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            _ => Err(format!("Unsupported frequency: {}", s)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring rule defining when and for whom meetings are generated.
///
/// The recurrence fields are stored as the administrator entered them;
/// [`RecurrenceRule::for_subscription`] parses them, so a malformed rule
/// fails that single subscription rather than the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MeetingSubscription {
    pub id: Uuid,
    pub title: String,
    /// Recurrence frequency, e.g. "weekly".
    pub frequency: String,
    /// Meeting day, e.g. "tuesday".
    pub weekday: String,
    /// Meeting time of day, UTC.
    pub time_of_day: NaiveTime,
    /// Target group size (at least 2).
    pub group_size: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parsed form of a subscription's recurrence fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub weekday: Weekday,
    pub time_of_day: NaiveTime,
}

impl RecurrenceRule {
    /// Parse a subscription's recurrence fields.
    pub fn for_subscription(subscription: &MeetingSubscription) -> Result<Self, DomainError> {
        let frequency = subscription
            .frequency
            .parse::<Frequency>()
            .map_err(DomainError::Configuration)?;
        let weekday = subscription
            .weekday
            .parse::<Weekday>()
            .map_err(|_| DomainError::Configuration(format!(
                "Invalid weekday: {}",
                subscription.weekday
            )))?;
        Ok(Self {
            frequency,
            weekday,
            time_of_day: subscription.time_of_day,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn subscription(frequency: &str, weekday: &str) -> MeetingSubscription {
        MeetingSubscription {
            id: Uuid::new_v4(),
            title: "Coffee Chats".to_string(),
            frequency: frequency.to_string(),
            weekday: weekday.to_string(),
            time_of_day: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            group_size: 2,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_frequency_round_trip() {
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!(Frequency::Weekly.to_string(), "weekly");
    }

    #[test]
    fn test_frequency_case_insensitive() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
    }

    #[test]
    fn test_frequency_unsupported() {
        let err = "daily".parse::<Frequency>().unwrap_err();
        assert_eq!(err, "Unsupported frequency: daily");
    }

    #[test]
    fn test_rule_parses_valid_subscription() {
        let rule = RecurrenceRule::for_subscription(&subscription("weekly", "tuesday")).unwrap();
        assert_eq!(rule.frequency, Frequency::Weekly);
        assert_eq!(rule.weekday, Weekday::Tue);
        assert_eq!(rule.time_of_day, NaiveTime::from_hms_opt(11, 0, 0).unwrap());
    }

    #[test]
    fn test_rule_rejects_bad_frequency() {
        let err = RecurrenceRule::for_subscription(&subscription("monthly", "tuesday")).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }

    #[test]
    fn test_rule_rejects_bad_weekday() {
        let err = RecurrenceRule::for_subscription(&subscription("weekly", "someday")).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }

    #[test]
    fn test_rule_accepts_short_weekday_names() {
        let rule = RecurrenceRule::for_subscription(&subscription("weekly", "thu")).unwrap();
        assert_eq!(rule.weekday, Weekday::Thu);
    }
}
