//! Domain services for Mixer.
//!
//! Services contain business logic that operates on domain models.

pub mod batch;
pub mod cleanup;
pub mod directory;
pub mod matching;
pub mod recurrence;

pub use batch::{
    MatchEmailSummary, MatchRunSummary, MeetingStore, NotificationDispatcher, OptInSummary,
    PairHistoryStore, RequestStore, SpecGenerationSummary, SpecStore, SubscriptionStore,
    WeeklyBatch,
};
pub use cleanup::{CleanupSummary, PreferenceCleanup, PreferenceStore};
pub use directory::{DirectoryEmployee, DirectoryError, EmployeeDirectory, EmployeeSync,
    SyncSummary, UserStore};
pub use matching::generate_meetings;
pub use recurrence::{meeting_datetime, resolve_meeting_datetime, week_start_for};
