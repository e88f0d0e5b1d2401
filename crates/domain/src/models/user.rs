//! Login and user-administration request models.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::profile::{Profile, Role};

/// Request payload for `POST /api/login`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub profile: Profile,
}

/// Request payload for creating a login with its profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateUserRequest {
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub username: String,
    #[validate(custom(function = "shared::validation::validate_password"))]
    pub password: String,
    #[validate(custom(function = "shared::validation::validate_name"))]
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub group_id: Option<Uuid>,
}

impl CreateUserRequest {
    /// A starosta without a group cannot mark anything.
    pub fn has_required_group(&self) -> bool {
        !self.role.requires_group() || self.group_id.is_some()
    }
}

/// Partial update of a user. Absent fields are left unchanged.
///
/// `group_id` is `None` when absent, `Some(None)` for an explicit `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_password"))]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_name"))]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_id: Option<Option<Uuid>>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.full_name.is_none()
            && self.role.is_none()
            && self.group_id.is_none()
    }

    /// Role and group after applying this patch to a profile.
    pub fn resulting_assignment(&self, current: &Profile) -> (Role, Option<Uuid>) {
        let role = self.role.unwrap_or(current.role);
        let group_id = match self.group_id {
            Some(group_id) => group_id,
            None => current.group_id,
        };
        (role, group_id)
    }
}

/// Maps a present field (including `null`) to `Some`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn starosta(group_id: Option<Uuid>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            full_name: "Староста".to_string(),
            role: Role::Starosta,
            group_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_user_validation() {
        let req = CreateUserRequest {
            username: "ivanov".to_string(),
            password: "secret1".to_string(),
            full_name: "Иванов Иван".to_string(),
            role: Role::Tutor,
            group_id: None,
        };
        assert!(req.validate().is_ok());
        assert!(req.has_required_group());

        let short = CreateUserRequest {
            password: "123".to_string(),
            ..req.clone()
        };
        assert!(short.validate().is_err());

        let bad_name = CreateUserRequest {
            username: "no spaces".to_string(),
            ..req
        };
        assert!(bad_name.validate().is_err());
    }

    #[test]
    fn test_starosta_requires_group() {
        let req = CreateUserRequest {
            username: "starosta1".to_string(),
            password: "secret1".to_string(),
            full_name: "Петров".to_string(),
            role: Role::Starosta,
            group_id: None,
        };
        assert!(!req.has_required_group());
        let with_group = CreateUserRequest {
            group_id: Some(Uuid::new_v4()),
            ..req
        };
        assert!(with_group.has_required_group());
    }

    #[test]
    fn test_update_group_id_absent_vs_null() {
        let absent: UpdateUserRequest = serde_json::from_str(r#"{"full_name":"A"}"#).unwrap();
        assert_eq!(absent.group_id, None);

        let cleared: UpdateUserRequest = serde_json::from_str(r#"{"group_id":null}"#).unwrap();
        assert_eq!(cleared.group_id, Some(None));

        let id = Uuid::new_v4();
        let set: UpdateUserRequest =
            serde_json::from_str(&format!(r#"{{"group_id":"{}"}}"#, id)).unwrap();
        assert_eq!(set.group_id, Some(Some(id)));
    }

    #[test]
    fn test_update_is_empty() {
        assert!(UpdateUserRequest::default().is_empty());
        let req: UpdateUserRequest = serde_json::from_str(r#"{"role":"tutor"}"#).unwrap();
        assert!(!req.is_empty());
    }

    #[test]
    fn test_resulting_assignment() {
        let group = Uuid::new_v4();
        let profile = starosta(Some(group));

        let keep = UpdateUserRequest::default();
        assert_eq!(keep.resulting_assignment(&profile), (Role::Starosta, Some(group)));

        let clear = UpdateUserRequest {
            group_id: Some(None),
            ..Default::default()
        };
        assert_eq!(clear.resulting_assignment(&profile), (Role::Starosta, None));

        let promote = UpdateUserRequest {
            role: Some(Role::Admin),
            group_id: Some(None),
            ..Default::default()
        };
        assert_eq!(promote.resulting_assignment(&profile), (Role::Admin, None));
    }

    #[test]
    fn test_update_validates_present_fields_only() {
        let req = UpdateUserRequest {
            password: Some("12".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        assert!(UpdateUserRequest::default().validate().is_ok());
    }
}
