//! Domain layer for the Vedomost attendance service.
//!
//! This crate contains:
//! - Domain models (Group, Profile, Student, Attendance) and request DTOs
//! - Access policy for the admin / tutor / starosta roles
//! - Attendance summaries used for exports

pub mod models;
pub mod services;
