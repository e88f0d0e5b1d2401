//! HTTP route handlers.

pub mod admin_users;
pub mod attendance;
pub mod auth;
pub mod frontend;
pub mod groups;
pub mod health;
pub mod students;
