//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod attendance;
pub mod group;
pub mod profile;
pub mod student;

pub use attendance::{AttendanceEntity, AttendanceStatusDb};
pub use group::GroupEntity;
pub use profile::{CredentialsEntity, ProfileEntity, RoleDb, UserListEntity};
pub use student::StudentEntity;
