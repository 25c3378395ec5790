use axum::{middleware, routing::get, Router};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use domain::services::batch::WeeklyBatch;
use domain::services::cleanup::PreferenceCleanup;
use domain::services::directory::EmployeeSync;
use persistence::repositories::{
    MeetingRepository, MeetingRequestRepository, PreferenceRepository, SpecRepository,
    SubscriptionRepository, UserRepository,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{health, tasks};
use crate::services::{EmailNotifier, EmailService, HttpEmployeeDirectory};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub batch: Arc<WeeklyBatch>,
    pub employee_sync: Arc<EmployeeSync>,
    pub preference_cleanup: Arc<PreferenceCleanup>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let subscriptions = Arc::new(SubscriptionRepository::new(pool.clone()));
    let specs = Arc::new(SpecRepository::new(pool.clone()));
    let requests = Arc::new(MeetingRequestRepository::new(pool.clone()));
    let meetings = Arc::new(MeetingRepository::new(pool.clone()));
    let users = Arc::new(UserRepository::new(pool.clone()));
    let preferences = Arc::new(PreferenceRepository::new(pool.clone()));

    let email = EmailService::new(config.email.clone());
    let notifier = Arc::new(EmailNotifier::new(email));
    let directory = Arc::new(HttpEmployeeDirectory::new(config.directory.clone()));

    // The meeting repository doubles as the pair-history source: prior
    // pairings are derived from persisted meetings.
    let batch = Arc::new(WeeklyBatch::new(
        subscriptions.clone(),
        specs,
        requests,
        meetings.clone(),
        meetings,
        notifier,
        config.matching.lookback_weeks,
    ));
    let employee_sync = Arc::new(EmployeeSync::new(directory, users.clone()));
    let preference_cleanup = Arc::new(PreferenceCleanup::new(
        preferences,
        subscriptions,
        users,
    ));

    let state = AppState {
        pool,
        config: config.clone(),
        batch,
        employee_sync,
        preference_cleanup,
    };

    // Scheduler-facing task triggers; idempotent, parameterless.
    let task_routes = Router::new()
        .route(
            "/api/v1/tasks/generate-meeting-specs",
            get(tasks::generate_meeting_specs),
        )
        .route("/api/v1/tasks/weekly-opt-in", get(tasks::weekly_opt_in))
        .route("/api/v1/tasks/sync-employees", get(tasks::sync_employees))
        .route("/api/v1/tasks/match-employees", get(tasks::match_employees))
        .route(
            "/api/v1/tasks/send-match-emails",
            get(tasks::send_match_emails),
        )
        .route(
            "/api/v1/tasks/clean-preferences",
            get(tasks::clean_preferences),
        );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(task_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .with_state(state)
}
