//! Persistence layer for the Vedomost attendance service.
//!
//! This crate contains:
//! - Database connection management
//! - SQL migrations (embedded by the API binary)
//! - Entity definitions (database row mappings)
//! - Repository implementations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
