//! Shared utilities for the Vedomost backend.
//!
//! This crate provides functionality used across the other crates:
//! - Session tokens (HS256 JWT)
//! - Password hashing with Argon2id
//! - Field validators for names, usernames and passwords

pub mod jwt;
pub mod password;
pub mod validation;
