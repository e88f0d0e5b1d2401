//! Domain models for Vedomost.

pub mod attendance;
pub mod group;
pub mod profile;
pub mod student;
pub mod user;

pub use attendance::{Attendance, AttendanceStatus, ExportPolicy, StudentSummary};
pub use group::Group;
pub use profile::{Profile, Role, UserListItem};
pub use student::Student;
