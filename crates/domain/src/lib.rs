//! Domain layer for the Mixer backend.
//!
//! This crate contains:
//! - Domain models (User, MeetingSubscription, MeetingSpec, Meeting)
//! - The recurrence resolver and the matching engine
//! - The weekly batch orchestrator and its collaborator traits
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::{BatchError, DispatchError, DomainError, StoreError};
