//! Attendance models, status values and per-student summaries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::student::Student;

/// Attendance status of a student on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Excused,
    Late,
    LeftEarly,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 5] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Excused,
        AttendanceStatus::Late,
        AttendanceStatus::LeftEarly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Excused => "excused",
            AttendanceStatus::Late => "late",
            AttendanceStatus::LeftEarly => "left_early",
        }
    }

    /// Late arrivals and early departures are partial presence.
    pub fn is_partial_presence(&self) -> bool {
        matches!(self, AttendanceStatus::Late | AttendanceStatus::LeftEarly)
    }

    /// Status as it appears in an export under `policy`.
    pub fn for_export(self, policy: ExportPolicy) -> AttendanceStatus {
        if policy.collapse_partial_presence && self.is_partial_presence() {
            AttendanceStatus::Present
        } else {
            self
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "excused" => Ok(AttendanceStatus::Excused),
            "late" => Ok(AttendanceStatus::Late),
            "left_early" => Ok(AttendanceStatus::LeftEarly),
            _ => Err(format!("Invalid attendance status: {}", s)),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One attendance record. At most one exists per `(student_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Attendance {
    pub id: i64,
    pub student_id: Uuid,
    pub group_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for marking a student on a date.
///
/// `comment` distinguishes "field absent" (keep the stored comment) from
/// "field present" (replace it; blank clears it).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpsertAttendanceRequest {
    pub student_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
}

impl UpsertAttendanceRequest {
    pub fn new(student_id: Uuid, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            student_id,
            date,
            status,
            comment: None,
            group_id: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// What the stored comment becomes.
    pub fn comment_update(&self) -> CommentUpdate {
        match &self.comment {
            None => CommentUpdate::Keep,
            Some(c) if c.trim().is_empty() => CommentUpdate::Clear,
            Some(c) => CommentUpdate::Set(c.trim().to_string()),
        }
    }
}

/// Effect of an upsert on the stored comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentUpdate {
    Keep,
    Clear,
    Set(String),
}

/// Query parameters for reading a day of attendance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceQuery {
    pub date: NaiveDate,
    pub group_id: Option<Uuid>,
}

/// Query parameters for the per-student summary over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryQuery {
    pub group_id: Uuid,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub collapse_partial: Option<bool>,
}

impl SummaryQuery {
    pub fn is_valid_range(&self) -> bool {
        self.from <= self.to
    }
}

/// How statuses are reported in exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPolicy {
    /// Count `late` and `left_early` as `present`.
    #[serde(default)]
    pub collapse_partial_presence: bool,
}

impl ExportPolicy {
    pub fn collapsing() -> Self {
        Self {
            collapse_partial_presence: true,
        }
    }
}

/// Per-student status counts over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StudentSummary {
    pub student_id: Uuid,
    pub full_name: String,
    pub counts: BTreeMap<AttendanceStatus, u32>,
    pub total: u32,
}

impl StudentSummary {
    pub fn count(&self, status: AttendanceStatus) -> u32 {
        self.counts.get(&status).copied().unwrap_or(0)
    }
}

/// Builds summaries for `students` from `records`, in student order.
///
/// Records of students not in the list are ignored. Students without records
/// get an empty summary.
pub fn summarize(
    students: &[Student],
    records: &[Attendance],
    policy: ExportPolicy,
) -> Vec<StudentSummary> {
    let mut by_student: BTreeMap<Uuid, BTreeMap<AttendanceStatus, u32>> = BTreeMap::new();
    for record in records {
        *by_student
            .entry(record.student_id)
            .or_default()
            .entry(record.status.for_export(policy))
            .or_insert(0) += 1;
    }

    students
        .iter()
        .map(|student| {
            let counts = by_student.remove(&student.id).unwrap_or_default();
            let total = counts.values().sum();
            StudentSummary {
                student_id: student.id,
                full_name: student.full_name.clone(),
                counts,
                total,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str, group_id: Uuid) -> Student {
        Student {
            id: Uuid::new_v4(),
            full_name: name.to_string(),
            group_id,
            created_at: Utc::now(),
        }
    }

    fn record(student: &Student, day: u32, status: AttendanceStatus) -> Attendance {
        Attendance {
            id: i64::from(day),
            student_id: student.id,
            group_id: student.group_id,
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            status,
            comment: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::LeftEarly).unwrap(),
            "\"left_early\""
        );
        for status in AttendanceStatus::ALL {
            assert_eq!(AttendanceStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(AttendanceStatus::from_str("sick").is_err());
    }

    #[test]
    fn test_for_export() {
        let keep = ExportPolicy::default();
        let collapse = ExportPolicy::collapsing();
        assert_eq!(AttendanceStatus::Late.for_export(keep), AttendanceStatus::Late);
        assert_eq!(AttendanceStatus::Late.for_export(collapse), AttendanceStatus::Present);
        assert_eq!(
            AttendanceStatus::LeftEarly.for_export(collapse),
            AttendanceStatus::Present
        );
        assert_eq!(AttendanceStatus::Excused.for_export(collapse), AttendanceStatus::Excused);
    }

    #[test]
    fn test_comment_update() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let base = UpsertAttendanceRequest::new(Uuid::new_v4(), date, AttendanceStatus::Late);
        assert_eq!(base.comment_update(), CommentUpdate::Keep);
        assert_eq!(base.clone().with_comment("  ").comment_update(), CommentUpdate::Clear);
        assert_eq!(
            base.with_comment(" bus ").comment_update(),
            CommentUpdate::Set("bus".to_string())
        );
    }

    #[test]
    fn test_upsert_request_comment_optional() {
        let req: UpsertAttendanceRequest = serde_json::from_str(
            r#"{"student_id":"6f1c1b2e-2a0b-4f43-9a55-7c1e0c3d9a01","date":"2024-01-10","status":"absent"}"#,
        )
        .unwrap();
        assert!(req.comment.is_none());
        assert!(req.group_id.is_none());
        assert_eq!(req.status, AttendanceStatus::Absent);
    }

    #[test]
    fn test_upsert_request_comment_too_long() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let req = UpsertAttendanceRequest::new(Uuid::new_v4(), date, AttendanceStatus::Absent)
            .with_comment("x".repeat(501));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_summarize_counts_and_order() {
        let group_id = Uuid::new_v4();
        let anna = student("Анна", group_id);
        let boris = student("Борис", group_id);
        let records = vec![
            record(&anna, 10, AttendanceStatus::Present),
            record(&anna, 11, AttendanceStatus::Late),
            record(&anna, 12, AttendanceStatus::LeftEarly),
            record(&boris, 10, AttendanceStatus::Absent),
        ];

        let distinct = summarize(&[anna.clone(), boris.clone()], &records, ExportPolicy::default());
        assert_eq!(distinct[0].student_id, anna.id);
        assert_eq!(distinct[0].count(AttendanceStatus::Present), 1);
        assert_eq!(distinct[0].count(AttendanceStatus::Late), 1);
        assert_eq!(distinct[0].total, 3);
        assert_eq!(distinct[1].count(AttendanceStatus::Absent), 1);

        let collapsed = summarize(&[anna, boris], &records, ExportPolicy::collapsing());
        assert_eq!(collapsed[0].count(AttendanceStatus::Present), 3);
        assert_eq!(collapsed[0].count(AttendanceStatus::Late), 0);
        assert_eq!(collapsed[0].total, 3);
    }

    #[test]
    fn test_summarize_student_without_records() {
        let lone = student("Вера", Uuid::new_v4());
        let summaries = summarize(std::slice::from_ref(&lone), &[], ExportPolicy::default());
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total, 0);
        assert!(summaries[0].counts.is_empty());
    }
}
