//! Repository implementations for database operations.

pub mod attendance;
pub mod group;
pub mod student;
pub mod user;

pub use attendance::AttendanceRepository;
pub use group::GroupRepository;
pub use student::StudentRepository;
pub use user::{NewUser, UserRepository, UserUpdate};
