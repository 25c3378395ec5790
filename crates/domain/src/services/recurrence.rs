//! Recurrence resolution for meeting subscriptions.
//!
//! Computes the canonical week start for a reference date and the concrete
//! meeting date-time a subscription's recurrence rule implies within that
//! week. Both are pure functions; the weekly batch threads an explicit
//! reference date through them so runs are deterministic under test.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};

use crate::error::DomainError;
use crate::models::subscription::{MeetingSubscription, RecurrenceRule};

/// Monday of the ISO week containing `reference`.
pub fn week_start_for(reference: NaiveDate) -> NaiveDate {
    let offset = reference.weekday().num_days_from_monday();
    reference - chrono::Duration::days(i64::from(offset))
}

/// The concrete meeting date-time within the week starting at `week_start`
/// implied by the rule's weekday and time-of-day. UTC.
pub fn meeting_datetime(rule: &RecurrenceRule, week_start: NaiveDate) -> DateTime<Utc> {
    let day = week_start
        .checked_add_days(Days::new(u64::from(rule.weekday.num_days_from_monday())))
        .unwrap_or(week_start);
    Utc.from_utc_datetime(&day.and_time(rule.time_of_day))
}

/// Parse a subscription's recurrence rule and compute its meeting
/// date-time for the week starting at `week_start`.
///
/// A malformed or unsupported rule yields `DomainError::Configuration`;
/// the caller logs and skips that subscription without aborting the batch.
pub fn resolve_meeting_datetime(
    subscription: &MeetingSubscription,
    week_start: NaiveDate,
) -> Result<DateTime<Utc>, DomainError> {
    let rule = RecurrenceRule::for_subscription(subscription)?;
    Ok(meeting_datetime(&rule, week_start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Weekday};
    use uuid::Uuid;

    fn subscription(weekday: &str, time: NaiveTime) -> MeetingSubscription {
        MeetingSubscription {
            id: Uuid::new_v4(),
            title: "Coffee Chats".to_string(),
            frequency: "weekly".to_string(),
            weekday: weekday.to_string(),
            time_of_day: time,
            group_size: 2,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_is_monday_for_every_weekday() {
        // 2026-08-03 is a Monday.
        let monday = date(2026, 8, 3);
        for offset in 0..7 {
            let reference = monday + chrono::Duration::days(offset);
            let start = week_start_for(reference);
            assert_eq!(start, monday, "offset {}", offset);
            assert_eq!(start.weekday(), Weekday::Mon);
        }
    }

    #[test]
    fn test_week_start_crosses_month_boundary() {
        // 2026-08-01 is a Saturday; its week started in July.
        assert_eq!(week_start_for(date(2026, 8, 1)), date(2026, 7, 27));
    }

    #[test]
    fn test_week_start_crosses_year_boundary() {
        // 2027-01-01 is a Friday; its week started in December 2026.
        assert_eq!(week_start_for(date(2027, 1, 1)), date(2026, 12, 28));
    }

    #[test]
    fn test_meeting_datetime_lands_on_rule_weekday() {
        let time = NaiveTime::from_hms_opt(11, 30, 0).unwrap();
        let rule = RecurrenceRule::for_subscription(&subscription("thursday", time)).unwrap();
        let at = meeting_datetime(&rule, date(2026, 8, 3));
        assert_eq!(at.date_naive(), date(2026, 8, 6));
        assert_eq!(at.time(), time);
    }

    #[test]
    fn test_meeting_datetime_within_week() {
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let week_start = date(2026, 8, 3);
        for weekday in ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"] {
            let rule = RecurrenceRule::for_subscription(&subscription(weekday, time)).unwrap();
            let at = meeting_datetime(&rule, week_start);
            assert!(at.date_naive() >= week_start);
            assert!(at.date_naive() < week_start + chrono::Duration::days(7));
        }
    }

    #[test]
    fn test_resolve_meeting_datetime_valid() {
        let time = NaiveTime::from_hms_opt(15, 0, 0).unwrap();
        let at = resolve_meeting_datetime(&subscription("monday", time), date(2026, 8, 3)).unwrap();
        assert_eq!(at.date_naive(), date(2026, 8, 3));
        assert_eq!(at.time(), time);
    }

    #[test]
    fn test_resolve_meeting_datetime_bad_rule() {
        let time = NaiveTime::from_hms_opt(15, 0, 0).unwrap();
        let mut sub = subscription("monday", time);
        sub.frequency = "fortnightly".to_string();
        let err = resolve_meeting_datetime(&sub, date(2026, 8, 3)).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }
}
