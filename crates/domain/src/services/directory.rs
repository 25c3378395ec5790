//! Employee directory synchronisation.
//!
//! Pulls the employee feed from the directory collaborator and reconciles
//! it with the user store: new employees are inserted, existing ones
//! updated by email, and users missing from the feed are deactivated.
//! Rows with invalid email addresses are skipped with a warning.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::User;

/// Errors from the employee directory feed.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid directory payload: {0}")]
    InvalidPayload(String),
}

/// One employee record as delivered by the directory feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DirectoryEmployee {
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// External employee directory collaborator.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn fetch(&self) -> Result<Vec<DirectoryEmployee>, DirectoryError>;
}

/// Write access to synced users.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;

    /// Insert or update (by email) a user from a directory record,
    /// reactivating it if previously deactivated.
    async fn upsert(&self, employee: &DirectoryEmployee) -> Result<User, StoreError>;

    async fn deactivate(&self, user_id: Uuid) -> Result<(), StoreError>;
}

/// Outcome counts for one directory sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncSummary {
    pub synced: usize,
    pub deactivated: usize,
    pub invalid: usize,
}

/// Reconciles the employee directory with the user store.
pub struct EmployeeSync {
    directory: Arc<dyn EmployeeDirectory>,
    users: Arc<dyn UserStore>,
}

impl EmployeeSync {
    pub fn new(directory: Arc<dyn EmployeeDirectory>, users: Arc<dyn UserStore>) -> Self {
        Self { directory, users }
    }

    /// Run one sync pass. Safe to re-invoke; syncing twice is a no-op for
    /// an unchanged feed.
    pub async fn run(&self) -> Result<SyncSummary, StoreError> {
        let employees = self
            .directory
            .fetch()
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        info!(employees = employees.len(), "Syncing employee directory");

        let mut summary = SyncSummary::default();
        let mut seen: HashSet<String> = HashSet::new();

        for employee in &employees {
            if shared::validation::validate_email(&employee.email).is_err() {
                warn!(email = %employee.email, "Skipping employee with invalid email");
                summary.invalid += 1;
                continue;
            }
            match self.users.upsert(employee).await {
                Ok(user) => {
                    seen.insert(user.email.to_lowercase());
                    summary.synced += 1;
                }
                Err(err) => {
                    warn!(email = %employee.email, error = %err, "Skipping employee");
                    summary.invalid += 1;
                }
            }
        }

        // Anyone active but absent from the feed has left.
        for user in self.users.list_all().await? {
            if user.is_active && !seen.contains(&user.email.to_lowercase()) {
                match self.users.deactivate(user.id).await {
                    Ok(()) => {
                        info!(user_id = %user.id, email = %user.email, "Deactivated user");
                        summary.deactivated += 1;
                    }
                    Err(err) => {
                        warn!(user_id = %user.id, error = %err, "Deactivation failed");
                    }
                }
            }
        }

        info!(
            synced = summary.synced,
            deactivated = summary.deactivated,
            invalid = summary.invalid,
            "Directory sync finished"
        );
        Ok(summary)
    }
}
