//! Repository implementations of the domain collaborator traits.

pub mod meeting;
pub mod meeting_request;
pub mod preference;
pub mod spec;
pub mod subscription;
pub mod user;

pub use meeting::MeetingRepository;
pub use meeting_request::MeetingRequestRepository;
pub use preference::PreferenceRepository;
pub use spec::SpecRepository;
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;

use domain::StoreError;

/// Translate a sqlx error into the storage error the domain understands.
///
/// Unique violations become `Conflict` so the orchestrator can treat a
/// lost insert race as "already exists"; foreign-key violations become
/// `NotFound`.
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound("Row not found".to_string()),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => StoreError::Conflict(db_err.to_string()),
            Some("23503") => StoreError::NotFound(db_err.to_string()),
            _ => StoreError::Backend(db_err.to_string()),
        },
        other => StoreError::Backend(other.to_string()),
    }
}
