//! Weekly batch orchestration.
//!
//! For every active subscription, ensure exactly one spec exists for the
//! current week; for every current-week spec whose meeting time has
//! arrived, run the matching engine once and persist results exactly once.
//! Every operation is idempotent and re-entrant: existing specs are not
//! recreated and already-matched specs are not re-matched, so the external
//! scheduler can safely re-invoke the whole batch.
//!
//! Failures are isolated per subscription/spec: a bad item is logged and
//! skipped, the rest of the batch continues.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{BatchError, DispatchError, DomainError, StoreError};
use crate::models::{MeetingSpec, MeetingSubscription, User, UserPair};
use crate::services::matching::generate_meetings;
use crate::services::recurrence::{resolve_meeting_datetime, week_start_for};

/// Read access to meeting subscriptions.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn list_active(&self) -> Result<Vec<MeetingSubscription>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<MeetingSubscription>, StoreError>;

    /// Active users holding an opt-in preference for the subscription.
    async fn subscribers(&self, subscription_id: Uuid) -> Result<Vec<User>, StoreError>;
}

/// Persistence boundary for weekly meeting specs.
///
/// `create` must be atomic with respect to concurrent writers; a
/// uniqueness violation on (subscription, week_start) surfaces as
/// `StoreError::Conflict`, which the orchestrator treats as "already
/// exists".
#[async_trait]
pub trait SpecStore: Send + Sync {
    async fn find(
        &self,
        subscription_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<Option<MeetingSpec>, StoreError>;

    async fn create(
        &self,
        subscription_id: Uuid,
        week_start: NaiveDate,
        meeting_at: DateTime<Utc>,
    ) -> Result<MeetingSpec, StoreError>;

    async fn list_for_week(&self, week_start: NaiveDate) -> Result<Vec<MeetingSpec>, StoreError>;
}

/// Resolves the pool of users who opted in to a spec.
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn requesters_for(&self, spec_id: Uuid) -> Result<Vec<User>, StoreError>;
}

/// Supplies prior pairings within a lookback window, scoped to one
/// subscription. An empty result means no history.
#[async_trait]
pub trait PairHistoryStore: Send + Sync {
    async fn pairs_within_window(
        &self,
        subscription_id: Uuid,
        window_weeks: u32,
        reference: DateTime<Utc>,
    ) -> Result<HashSet<UserPair>, StoreError>;
}

/// Durable record of matched groups.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// Create one meeting plus one participant per member for every group,
    /// atomically per group.
    async fn save_groups(&self, spec_id: Uuid, groups: &[Vec<User>]) -> Result<(), StoreError>;

    async fn exists_for_spec(&self, spec_id: Uuid) -> Result<bool, StoreError>;

    async fn groups_for_spec(&self, spec_id: Uuid) -> Result<Vec<Vec<User>>, StoreError>;
}

/// Outbound notification boundary. Dispatch failures never abort a batch;
/// they are logged and the item continues.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send_opt_in(
        &self,
        spec: &MeetingSpec,
        subscription: &MeetingSubscription,
        users: &[User],
    ) -> Result<(), DispatchError>;

    async fn send_confirmations(
        &self,
        spec: &MeetingSpec,
        subscription: &MeetingSubscription,
        groups: &[Vec<User>],
    ) -> Result<(), DispatchError>;

    async fn send_unmatched(
        &self,
        spec: &MeetingSpec,
        subscription: &MeetingSubscription,
        users: &[User],
    ) -> Result<(), DispatchError>;
}

/// Outcome counts for one spec-generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SpecGenerationSummary {
    pub created: usize,
    pub existing: usize,
    pub skipped: usize,
}

/// Outcome counts for one matching run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MatchRunSummary {
    pub specs_matched: usize,
    /// Specs whose meetings were already persisted.
    pub specs_already_matched: usize,
    /// Specs whose meeting time has not arrived yet.
    pub specs_pending: usize,
    pub specs_failed: usize,
    pub groups: usize,
    pub matched_users: usize,
    pub unmatched_users: usize,
}

/// Outcome counts for one opt-in email run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OptInSummary {
    pub specs: usize,
    pub recipients: usize,
    pub failures: usize,
}

/// Outcome counts for one match-email run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MatchEmailSummary {
    pub specs: usize,
    pub groups: usize,
    pub failures: usize,
}

struct SpecMatchCounts {
    groups: usize,
    matched_users: usize,
    unmatched_users: usize,
}

enum SpecResolution {
    Created,
    Existing,
}

/// The weekly batch orchestrator.
///
/// Holds the collaborator seams as trait objects; the reference time
/// enters through each operation's parameter so runs are deterministic
/// under test.
pub struct WeeklyBatch {
    subscriptions: Arc<dyn SubscriptionStore>,
    specs: Arc<dyn SpecStore>,
    requests: Arc<dyn RequestStore>,
    history: Arc<dyn PairHistoryStore>,
    meetings: Arc<dyn MeetingStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    lookback_weeks: u32,
}

impl WeeklyBatch {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        specs: Arc<dyn SpecStore>,
        requests: Arc<dyn RequestStore>,
        history: Arc<dyn PairHistoryStore>,
        meetings: Arc<dyn MeetingStore>,
        notifier: Arc<dyn NotificationDispatcher>,
        lookback_weeks: u32,
    ) -> Self {
        Self {
            subscriptions,
            specs,
            requests,
            history,
            meetings,
            notifier,
            lookback_weeks,
        }
    }

    /// Ensure exactly one spec exists for the current week per active
    /// subscription. Safe to re-run within the same week.
    pub async fn generate_specs(
        &self,
        reference: DateTime<Utc>,
    ) -> Result<SpecGenerationSummary, StoreError> {
        let week_start = week_start_for(reference.date_naive());
        let subscriptions = self.subscriptions.list_active().await?;
        info!(
            week_start = %week_start,
            subscriptions = subscriptions.len(),
            "Generating meeting specs"
        );

        let mut summary = SpecGenerationSummary::default();
        for subscription in subscriptions {
            match self.generate_spec_for(&subscription, week_start).await {
                Ok(SpecResolution::Created) => summary.created += 1,
                Ok(SpecResolution::Existing) => summary.existing += 1,
                Err(err) => {
                    warn!(
                        subscription_id = %subscription.id,
                        error = %err,
                        "Skipping subscription"
                    );
                    summary.skipped += 1;
                }
            }
        }

        info!(
            created = summary.created,
            existing = summary.existing,
            skipped = summary.skipped,
            "Spec generation finished"
        );
        Ok(summary)
    }

    async fn generate_spec_for(
        &self,
        subscription: &MeetingSubscription,
        week_start: NaiveDate,
    ) -> Result<SpecResolution, BatchError> {
        if self.specs.find(subscription.id, week_start).await?.is_some() {
            return Ok(SpecResolution::Existing);
        }

        let meeting_at = resolve_meeting_datetime(subscription, week_start)?;
        match self
            .specs
            .create(subscription.id, week_start, meeting_at)
            .await
        {
            Ok(spec) => {
                info!(
                    subscription_id = %subscription.id,
                    spec_id = %spec.id,
                    meeting_at = %spec.meeting_at,
                    "Created meeting spec"
                );
                Ok(SpecResolution::Created)
            }
            // A concurrent invocation won the insert race.
            Err(StoreError::Conflict(_)) => Ok(SpecResolution::Existing),
            Err(err) => Err(err.into()),
        }
    }

    /// Match every current-week spec whose meeting time has arrived,
    /// persist the groups and dispatch result emails. Specs with persisted
    /// meetings are skipped, so re-running is safe.
    pub async fn match_specs(&self, reference: DateTime<Utc>) -> Result<MatchRunSummary, StoreError> {
        let week_start = week_start_for(reference.date_naive());
        let specs = self.specs.list_for_week(week_start).await?;
        info!(week_start = %week_start, specs = specs.len(), "Matching current-week specs");

        let mut summary = MatchRunSummary::default();
        for spec in specs {
            if spec.meeting_at > reference {
                summary.specs_pending += 1;
                continue;
            }
            match self.match_spec(&spec, reference).await {
                Ok(Some(counts)) => {
                    summary.specs_matched += 1;
                    summary.groups += counts.groups;
                    summary.matched_users += counts.matched_users;
                    summary.unmatched_users += counts.unmatched_users;
                }
                Ok(None) => summary.specs_already_matched += 1,
                Err(err) => {
                    warn!(spec_id = %spec.id, error = %err, "Skipping spec");
                    summary.specs_failed += 1;
                }
            }
        }

        info!(
            matched = summary.specs_matched,
            already_matched = summary.specs_already_matched,
            pending = summary.specs_pending,
            failed = summary.specs_failed,
            groups = summary.groups,
            unmatched_users = summary.unmatched_users,
            "Matching run finished"
        );
        Ok(summary)
    }

    async fn match_spec(
        &self,
        spec: &MeetingSpec,
        reference: DateTime<Utc>,
    ) -> Result<Option<SpecMatchCounts>, BatchError> {
        if self.meetings.exists_for_spec(spec.id).await? {
            info!(spec_id = %spec.id, "Meetings already persisted, skipping");
            return Ok(None);
        }

        let subscription = self.subscription_for(spec).await?;
        let users = self.requests.requesters_for(spec.id).await?;
        let prev_pairs = self
            .history
            .pairs_within_window(spec.subscription_id, self.lookback_weeks, reference)
            .await?;
        let group_size = usize::try_from(subscription.group_size).map_err(|_| {
            DomainError::Configuration(format!(
                "Invalid group size {} on subscription {}",
                subscription.group_size, subscription.id
            ))
        })?;

        let outcome = generate_meetings(users, &prev_pairs, group_size)?;
        self.meetings.save_groups(spec.id, &outcome.groups).await?;

        if !outcome.groups.is_empty() {
            if let Err(err) = self
                .notifier
                .send_confirmations(spec, &subscription, &outcome.groups)
                .await
            {
                warn!(spec_id = %spec.id, error = %err, "Confirmation emails failed");
            }
        }
        if !outcome.unmatched.is_empty() {
            if let Err(err) = self
                .notifier
                .send_unmatched(spec, &subscription, &outcome.unmatched)
                .await
            {
                warn!(spec_id = %spec.id, error = %err, "Unmatched emails failed");
            }
        }

        info!(
            spec_id = %spec.id,
            groups = outcome.groups.len(),
            matched_users = outcome.matched_users(),
            unmatched_users = outcome.unmatched.len(),
            "Matched spec"
        );
        Ok(Some(SpecMatchCounts {
            groups: outcome.groups.len(),
            matched_users: outcome.matched_users(),
            unmatched_users: outcome.unmatched.len(),
        }))
    }

    /// Send the weekly opt-in email for every current-week spec.
    pub async fn send_opt_in_emails(
        &self,
        reference: DateTime<Utc>,
    ) -> Result<OptInSummary, StoreError> {
        let week_start = week_start_for(reference.date_naive());
        let specs = self.specs.list_for_week(week_start).await?;

        let mut summary = OptInSummary::default();
        for spec in specs {
            match self.opt_in_for_spec(&spec).await {
                Ok(recipients) => {
                    summary.specs += 1;
                    summary.recipients += recipients;
                }
                Err(err) => {
                    warn!(spec_id = %spec.id, error = %err, "Opt-in emails failed");
                    summary.failures += 1;
                }
            }
        }

        info!(
            specs = summary.specs,
            recipients = summary.recipients,
            failures = summary.failures,
            "Opt-in email run finished"
        );
        Ok(summary)
    }

    async fn opt_in_for_spec(&self, spec: &MeetingSpec) -> Result<usize, BatchError> {
        let subscription = self.subscription_for(spec).await?;
        let recipients = self.subscriptions.subscribers(spec.subscription_id).await?;
        if recipients.is_empty() {
            return Ok(0);
        }
        self.notifier
            .send_opt_in(spec, &subscription, &recipients)
            .await?;
        Ok(recipients.len())
    }

    async fn subscription_for(&self, spec: &MeetingSpec) -> Result<MeetingSubscription, BatchError> {
        Ok(self
            .subscriptions
            .find(spec.subscription_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!(
                    "Subscription {} referenced by spec {}",
                    spec.subscription_id, spec.id
                ))
            })?)
    }

    /// Re-send confirmation emails from the persisted meetings of every
    /// current-week spec. Recovery path for a match run whose dispatch
    /// failed.
    pub async fn send_match_emails(
        &self,
        reference: DateTime<Utc>,
    ) -> Result<MatchEmailSummary, StoreError> {
        let week_start = week_start_for(reference.date_naive());
        let specs = self.specs.list_for_week(week_start).await?;

        let mut summary = MatchEmailSummary::default();
        for spec in specs {
            match self.match_emails_for_spec(&spec).await {
                Ok(groups) => {
                    if groups > 0 {
                        summary.specs += 1;
                        summary.groups += groups;
                    }
                }
                Err(err) => {
                    warn!(spec_id = %spec.id, error = %err, "Match emails failed");
                    summary.failures += 1;
                }
            }
        }

        info!(
            specs = summary.specs,
            groups = summary.groups,
            failures = summary.failures,
            "Match email run finished"
        );
        Ok(summary)
    }

    async fn match_emails_for_spec(&self, spec: &MeetingSpec) -> Result<usize, BatchError> {
        let groups = self.meetings.groups_for_spec(spec.id).await?;
        if groups.is_empty() {
            return Ok(0);
        }
        let subscription = self.subscription_for(spec).await?;
        self.notifier
            .send_confirmations(spec, &subscription, &groups)
            .await?;
        Ok(groups.len())
    }
}
