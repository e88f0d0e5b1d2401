//! Domain services for Vedomost.

pub mod access;

pub use access::{AccessError, GroupScope};
