//! Notification dispatcher backed by the email service.
//!
//! Renders the weekly opt-in, match confirmation and unmatched emails and
//! sends one message per recipient. Partial failures are reported as a
//! single dispatch error carrying the failure count; the batch logs it and
//! moves on.

use async_trait::async_trait;
use tracing::warn;

use domain::models::{MeetingSpec, MeetingSubscription, User};
use domain::services::batch::NotificationDispatcher;
use domain::DispatchError;

use crate::services::email::{EmailMessage, EmailService};

/// Dispatcher sending batch notifications through the email service.
#[derive(Clone)]
pub struct EmailNotifier {
    email: EmailService,
}

impl EmailNotifier {
    pub fn new(email: EmailService) -> Self {
        Self { email }
    }

    async fn send_all(&self, kind: &str, messages: Vec<EmailMessage>) -> Result<(), DispatchError> {
        let total = messages.len();
        let mut failed = 0;
        for message in messages {
            if let Err(err) = self.email.send(message).await {
                warn!(kind = kind, error = %err, "Email send failed");
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(DispatchError(format!(
                "{} of {} {} emails failed",
                failed, total, kind
            )));
        }
        Ok(())
    }
}

fn meeting_time(spec: &MeetingSpec) -> String {
    spec.meeting_at.format("%A %B %e, %H:%M UTC").to_string()
}

/// Weekly opt-in invitation for one subscriber.
fn opt_in_message(
    spec: &MeetingSpec,
    subscription: &MeetingSubscription,
    user: &User,
    base_url: &str,
) -> EmailMessage {
    let body_text = format!(
        "Hi {name},\n\n\
         {title} is happening again this week, on {time}.\n\n\
         Want to meet someone new? Opt in here:\n\n\
         {url}/subscriptions/{subscription_id}/opt-in\n\n\
         If you skip this week, no meeting will be scheduled for you.\n\n\
         The Mixer Team",
        name = user.full_name,
        title = subscription.title,
        time = meeting_time(spec),
        url = base_url,
        subscription_id = subscription.id,
    );
    EmailMessage {
        to: user.email.clone(),
        to_name: Some(user.full_name.clone()),
        subject: format!("Opt in to {} this week", subscription.title),
        body_text,
    }
}

/// Match confirmation for one member of one group.
fn confirmation_message(
    spec: &MeetingSpec,
    subscription: &MeetingSubscription,
    member: &User,
    others: &[&User],
) -> EmailMessage {
    let partner_lines = others
        .iter()
        .map(|u| format!("  - {} <{}>", u.full_name, u.email))
        .collect::<Vec<_>>()
        .join("\n");
    let body_text = format!(
        "Hi {name},\n\n\
         You're matched for {title} on {time}. Say hello to:\n\n\
         {partners}\n\n\
         Find a spot that works for everyone and enjoy!\n\n\
         The Mixer Team",
        name = member.full_name,
        title = subscription.title,
        time = meeting_time(spec),
        partners = partner_lines,
    );
    EmailMessage {
        to: member.email.clone(),
        to_name: Some(member.full_name.clone()),
        subject: format!("Your {} match this week", subscription.title),
        body_text,
    }
}

/// Notice for a user who could not be placed this week.
fn unmatched_message(
    spec: &MeetingSpec,
    subscription: &MeetingSubscription,
    user: &User,
) -> EmailMessage {
    let body_text = format!(
        "Hi {name},\n\n\
         We couldn't place you in a {title} group for the week of {week}. \
         The pool didn't divide evenly this time; you'll be first in line \
         next week.\n\n\
         The Mixer Team",
        name = user.full_name,
        title = subscription.title,
        week = spec.week_start.format("%B %e"),
    );
    EmailMessage {
        to: user.email.clone(),
        to_name: Some(user.full_name.clone()),
        subject: format!("No {} match this week", subscription.title),
        body_text,
    }
}

#[async_trait]
impl NotificationDispatcher for EmailNotifier {
    async fn send_opt_in(
        &self,
        spec: &MeetingSpec,
        subscription: &MeetingSubscription,
        users: &[User],
    ) -> Result<(), DispatchError> {
        let base_url = self.email.base_url().to_string();
        let messages = users
            .iter()
            .map(|user| opt_in_message(spec, subscription, user, &base_url))
            .collect();
        self.send_all("opt-in", messages).await
    }

    async fn send_confirmations(
        &self,
        spec: &MeetingSpec,
        subscription: &MeetingSubscription,
        groups: &[Vec<User>],
    ) -> Result<(), DispatchError> {
        let mut messages = Vec::new();
        for group in groups {
            for member in group {
                let others: Vec<&User> = group.iter().filter(|u| u.id != member.id).collect();
                messages.push(confirmation_message(spec, subscription, member, &others));
            }
        }
        self.send_all("confirmation", messages).await
    }

    async fn send_unmatched(
        &self,
        spec: &MeetingSpec,
        subscription: &MeetingSubscription,
        users: &[User],
    ) -> Result<(), DispatchError> {
        let messages = users
            .iter()
            .map(|user| unmatched_message(spec, subscription, user))
            .collect();
        self.send_all("unmatched", messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmailConfig;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use uuid::Uuid;

    fn spec() -> MeetingSpec {
        MeetingSpec {
            id: Uuid::new_v4(),
            subscription_id: Uuid::new_v4(),
            week_start: NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
            meeting_at: Utc.with_ymd_and_hms(2026, 8, 4, 11, 0, 0).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn subscription() -> MeetingSubscription {
        MeetingSubscription {
            id: Uuid::new_v4(),
            title: "Coffee Chats".to_string(),
            frequency: "weekly".to_string(),
            weekday: "tuesday".to_string(),
            time_of_day: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            group_size: 2,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(name: &str, email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: name.to_string(),
            photo_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_opt_in_message_contents() {
        let subscription = subscription();
        let message = opt_in_message(
            &spec(),
            &subscription,
            &user("Alice", "alice@example.com"),
            "https://mixer.example.com",
        );
        assert_eq!(message.to, "alice@example.com");
        assert!(message.subject.contains("Coffee Chats"));
        assert!(message.body_text.contains("Tuesday August  4, 11:00 UTC"));
        assert!(message
            .body_text
            .contains(&format!("subscriptions/{}/opt-in", subscription.id)));
    }

    #[test]
    fn test_confirmation_message_lists_partners() {
        let alice = user("Alice", "alice@example.com");
        let bob = user("Bob", "bob@example.com");
        let message = confirmation_message(&spec(), &subscription(), &alice, &[&bob]);
        assert_eq!(message.to, "alice@example.com");
        assert!(message.body_text.contains("Bob <bob@example.com>"));
        assert!(!message.body_text.contains("alice@example.com"));
    }

    #[test]
    fn test_unmatched_message_contents() {
        let message = unmatched_message(&spec(), &subscription(), &user("Carol", "carol@example.com"));
        assert_eq!(message.to, "carol@example.com");
        assert!(message.subject.contains("No Coffee Chats match"));
        assert!(message.body_text.contains("week of August  3"));
    }

    #[tokio::test]
    async fn test_send_confirmations_one_message_per_member() {
        // Console provider counts as success for every member.
        let notifier = EmailNotifier::new(EmailService::new(EmailConfig {
            enabled: true,
            provider: "console".to_string(),
            ..Default::default()
        }));

        let groups = vec![
            vec![user("A", "a@example.com"), user("B", "b@example.com")],
            vec![user("C", "c@example.com"), user("D", "d@example.com")],
        ];
        let result = notifier
            .send_confirmations(&spec(), &subscription(), &groups)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_provider_reports_dispatch_error() {
        let notifier = EmailNotifier::new(EmailService::new(EmailConfig {
            enabled: true,
            provider: "pigeon".to_string(),
            ..Default::default()
        }));

        let err = notifier
            .send_unmatched(&spec(), &subscription(), &[user("A", "a@example.com")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("1 of 1 unmatched emails failed"));
    }
}
