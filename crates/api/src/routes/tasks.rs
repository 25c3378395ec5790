//! Scheduler-facing task trigger endpoints.
//!
//! Each endpoint is parameterless and idempotent: the external scheduler
//! may invoke it repeatedly and the underlying batch skips work that is
//! already done. Wall-clock time enters the system here and is threaded
//! explicitly through the orchestrator.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use domain::services::batch::{
    MatchEmailSummary, MatchRunSummary, OptInSummary, SpecGenerationSummary,
};
use domain::services::cleanup::CleanupSummary;
use domain::services::directory::SyncSummary;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{
    record_groups_matched, record_specs_created, record_users_unmatched,
};

/// Coarse task result: a status flag plus the run's summary counts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskResponse<T: Serialize> {
    pub status: &'static str,
    pub summary: T,
}

impl<T: Serialize> TaskResponse<T> {
    fn ok(summary: T) -> Json<Self> {
        Json(Self {
            status: "ok",
            summary,
        })
    }
}

/// GET /api/v1/tasks/generate-meeting-specs
///
/// Creates the current week's spec for every active subscription that
/// does not have one yet.
pub async fn generate_meeting_specs(
    State(state): State<AppState>,
) -> Result<Json<TaskResponse<SpecGenerationSummary>>, ApiError> {
    let summary = state.batch.generate_specs(Utc::now()).await?;
    record_specs_created(summary.created);
    info!(
        created = summary.created,
        existing = summary.existing,
        skipped = summary.skipped,
        "Spec generation task finished"
    );
    Ok(TaskResponse::ok(summary))
}

/// GET /api/v1/tasks/weekly-opt-in
///
/// Sends the weekly opt-in email to subscribers of every current-week
/// spec.
pub async fn weekly_opt_in(
    State(state): State<AppState>,
) -> Result<Json<TaskResponse<OptInSummary>>, ApiError> {
    let summary = state.batch.send_opt_in_emails(Utc::now()).await?;
    info!(
        specs = summary.specs,
        recipients = summary.recipients,
        "Opt-in email task finished"
    );
    Ok(TaskResponse::ok(summary))
}

/// GET /api/v1/tasks/sync-employees
///
/// Reconciles the user table with the employee directory feed.
pub async fn sync_employees(
    State(state): State<AppState>,
) -> Result<Json<TaskResponse<SyncSummary>>, ApiError> {
    if !state.config.directory.enabled {
        return Err(ApiError::ServiceUnavailable(
            "Employee directory sync is disabled".to_string(),
        ));
    }

    let summary = state.employee_sync.run().await?;
    info!(
        synced = summary.synced,
        deactivated = summary.deactivated,
        invalid = summary.invalid,
        "Employee sync task finished"
    );
    Ok(TaskResponse::ok(summary))
}

/// GET /api/v1/tasks/match-employees
///
/// Runs the matching engine for every current-week spec whose meeting
/// time has arrived, persists the groups and dispatches result emails.
pub async fn match_employees(
    State(state): State<AppState>,
) -> Result<Json<TaskResponse<MatchRunSummary>>, ApiError> {
    let summary = state.batch.match_specs(Utc::now()).await?;
    record_groups_matched(summary.groups);
    record_users_unmatched(summary.unmatched_users);
    info!(
        specs_matched = summary.specs_matched,
        groups = summary.groups,
        unmatched_users = summary.unmatched_users,
        "Matching task finished"
    );
    Ok(TaskResponse::ok(summary))
}

/// GET /api/v1/tasks/send-match-emails
///
/// Re-sends confirmation emails from the persisted meetings of the
/// current week.
pub async fn send_match_emails(
    State(state): State<AppState>,
) -> Result<Json<TaskResponse<MatchEmailSummary>>, ApiError> {
    let summary = state.batch.send_match_emails(Utc::now()).await?;
    info!(
        specs = summary.specs,
        groups = summary.groups,
        "Match email task finished"
    );
    Ok(TaskResponse::ok(summary))
}

/// GET /api/v1/tasks/clean-preferences
///
/// Deletes subscription preferences whose subscription or user is gone
/// or inactive.
pub async fn clean_preferences(
    State(state): State<AppState>,
) -> Result<Json<TaskResponse<CleanupSummary>>, ApiError> {
    let summary = state.preference_cleanup.run().await?;
    info!(
        deleted = summary.deleted,
        retained = summary.retained,
        "Preference cleanup task finished"
    );
    Ok(TaskResponse::ok(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_response_serialization() {
        let response = TaskResponse {
            status: "ok",
            summary: SpecGenerationSummary {
                created: 2,
                existing: 1,
                skipped: 0,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["summary"]["created"], 2);
        assert_eq!(json["summary"]["existing"], 1);
        assert_eq!(json["summary"]["skipped"], 0);
    }

    #[test]
    fn test_match_summary_serialization() {
        let response = TaskResponse {
            status: "ok",
            summary: MatchRunSummary {
                specs_matched: 1,
                specs_already_matched: 0,
                specs_pending: 2,
                specs_failed: 0,
                groups: 3,
                matched_users: 6,
                unmatched_users: 1,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["summary"]["groups"], 3);
        assert_eq!(json["summary"]["specs_pending"], 2);
        assert_eq!(json["summary"]["unmatched_users"], 1);
    }
}
