//! Profile models: the application-level user record and its role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Application role of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Tutor,
    Starosta,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Tutor => "tutor",
            Role::Starosta => "starosta",
        }
    }

    /// Returns true if this role manages groups, students and logins.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Returns true if a profile with this role must be bound to a group.
    pub fn requires_group(&self) -> bool {
        matches!(self, Role::Starosta)
    }

    /// Returns true if this role reads every group rather than its own.
    pub fn sees_all_groups(&self) -> bool {
        matches!(self, Role::Admin | Role::Tutor)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "tutor" => Ok(Role::Tutor),
            "starosta" => Ok(Role::Starosta),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One profile per authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Row of the admin user list: profile joined with login and group name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserListItem {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub group_id: Option<Uuid>,
    pub group_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
