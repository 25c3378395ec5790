//! Stale subscription-preference cleanup.
//!
//! A preference is valid while its subscription and its user both exist
//! and are active; anything else is deleted. Deletions are isolated per
//! preference so one storage failure does not stop the sweep.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::UserSubscriptionPreference;
use crate::services::batch::SubscriptionStore;
use crate::services::directory::UserStore;

use async_trait::async_trait;

/// Storage boundary for user subscription preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<UserSubscriptionPreference>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Outcome counts for one cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CleanupSummary {
    pub deleted: usize,
    pub retained: usize,
    pub failures: usize,
}

/// Whether a preference still points at a live subscription and user.
pub fn is_valid_preference(
    preference: &UserSubscriptionPreference,
    active_subscriptions: &HashSet<Uuid>,
    active_users: &HashSet<Uuid>,
) -> bool {
    active_subscriptions.contains(&preference.subscription_id)
        && active_users.contains(&preference.user_id)
}

/// Sweeps invalid preferences out of the store.
pub struct PreferenceCleanup {
    preferences: Arc<dyn PreferenceStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    users: Arc<dyn UserStore>,
}

impl PreferenceCleanup {
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            preferences,
            subscriptions,
            users,
        }
    }

    pub async fn run(&self) -> Result<CleanupSummary, StoreError> {
        let active_subscriptions: HashSet<Uuid> = self
            .subscriptions
            .list_active()
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        let active_users: HashSet<Uuid> = self
            .users
            .list_all()
            .await?
            .into_iter()
            .filter(|u| u.is_active)
            .map(|u| u.id)
            .collect();

        let mut summary = CleanupSummary::default();
        for preference in self.preferences.list_all().await? {
            if is_valid_preference(&preference, &active_subscriptions, &active_users) {
                summary.retained += 1;
                continue;
            }
            match self.preferences.delete(preference.id).await {
                Ok(()) => {
                    info!(
                        preference_id = %preference.id,
                        user_id = %preference.user_id,
                        subscription_id = %preference.subscription_id,
                        "Deleted stale subscription preference"
                    );
                    summary.deleted += 1;
                }
                Err(err) => {
                    warn!(preference_id = %preference.id, error = %err, "Deletion failed");
                    summary.failures += 1;
                }
            }
        }

        info!(
            deleted = summary.deleted,
            retained = summary.retained,
            failures = summary.failures,
            "Preference cleanup finished"
        );
        Ok(summary)
    }
}
