//! Persistence layer for the Mixer backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations of the domain collaborator traits

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
