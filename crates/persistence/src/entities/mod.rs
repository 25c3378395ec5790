//! Entity definitions (database row mappings).

pub mod meeting;
pub mod preference;
pub mod spec;
pub mod subscription;
pub mod user;

pub use meeting::{GroupMemberEntity, MeetingEntity, MeetingParticipantEntity, PairRowEntity};
pub use preference::PreferenceEntity;
pub use spec::SpecEntity;
pub use subscription::SubscriptionEntity;
pub use user::UserEntity;
