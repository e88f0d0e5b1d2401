//! Student models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A student belongs to exactly one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    pub group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request payload for adding a student to a group.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateStudentRequest {
    #[validate(custom(function = "shared::validation::validate_name"))]
    pub full_name: String,
    pub group_id: Uuid,
}

/// Query parameters for listing students.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListStudentsQuery {
    pub group_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_student_validation() {
        let ok = CreateStudentRequest {
            full_name: "Петров Пётр".to_string(),
            group_id: Uuid::new_v4(),
        };
        assert!(ok.validate().is_ok());

        let blank = CreateStudentRequest {
            full_name: " ".to_string(),
            group_id: Uuid::new_v4(),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_create_student_requires_group_id() {
        let result: Result<CreateStudentRequest, _> =
            serde_json::from_str(r#"{"full_name": "Петров Пётр"}"#);
        assert!(result.is_err());
    }
}
