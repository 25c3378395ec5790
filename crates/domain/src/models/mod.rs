//! Domain models for Mixer.

pub mod meeting;
pub mod preference;
pub mod spec;
pub mod subscription;
pub mod user;

pub use meeting::{MatchOutcome, Meeting, MeetingParticipant, MeetingRequest, UserPair};
pub use preference::UserSubscriptionPreference;
pub use spec::MeetingSpec;
pub use subscription::{Frequency, MeetingSubscription, RecurrenceRule};
pub use user::User;
