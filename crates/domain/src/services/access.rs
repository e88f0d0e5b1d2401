//! Role-based access policy.
//!
//! Admins manage everything. Tutors read every group and write nothing.
//! A starosta reads and marks attendance for their own group only.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Profile, Role};

/// Policy violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Access denied")]
    Denied,

    #[error("No group assigned to this profile")]
    NoGroupAssigned,
}

/// Groups a read request may cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupScope {
    All,
    Single(Uuid),
}

impl GroupScope {
    pub fn group_id(&self) -> Option<Uuid> {
        match self {
            GroupScope::All => None,
            GroupScope::Single(id) => Some(*id),
        }
    }
}

/// Resolves the groups `profile` may read when it asks for `requested`.
///
/// A starosta asking for no group gets their own; asking for another group
/// is denied.
pub fn read_scope(profile: &Profile, requested: Option<Uuid>) -> Result<GroupScope, AccessError> {
    if profile.role.sees_all_groups() {
        return Ok(requested.map_or(GroupScope::All, GroupScope::Single));
    }

    let own = profile.group_id.ok_or(AccessError::NoGroupAssigned)?;
    match requested {
        Some(group_id) if group_id != own => Err(AccessError::Denied),
        _ => Ok(GroupScope::Single(own)),
    }
}

/// Checks that `profile` may mark attendance in some group at all.
///
/// Runs before any lookup so a read-only role never learns whether a
/// student exists.
pub fn ensure_may_mark(profile: &Profile) -> Result<(), AccessError> {
    match profile.role {
        Role::Admin => Ok(()),
        Role::Starosta if profile.group_id.is_some() => Ok(()),
        Role::Starosta => Err(AccessError::NoGroupAssigned),
        Role::Tutor => Err(AccessError::Denied),
    }
}

/// Checks that `profile` may mark attendance in `group_id`.
pub fn ensure_can_mark(profile: &Profile, group_id: Uuid) -> Result<(), AccessError> {
    match profile.role {
        Role::Admin => Ok(()),
        Role::Starosta if profile.group_id == Some(group_id) => Ok(()),
        Role::Starosta if profile.group_id.is_none() => Err(AccessError::NoGroupAssigned),
        _ => Err(AccessError::Denied),
    }
}

pub fn ensure_admin(profile: &Profile) -> Result<(), AccessError> {
    if profile.is_admin() {
        Ok(())
    } else {
        Err(AccessError::Denied)
    }
}
