//! Typed API surface used by the store.

use async_trait::async_trait;
use chrono::NaiveDate;
use domain::models::attendance::{SummaryQuery, UpsertAttendanceRequest};
use domain::models::user::{CreateUserRequest, LoginRequest, LoginResponse, UpdateUserRequest};
use domain::models::{Attendance, Group, Profile, Student, StudentSummary, UserListItem};
use reqwest::Method;
use serde_json::json;
use uuid::Uuid;

use crate::error::ClientError;
use crate::http::{decode, ApiClient};

#[async_trait]
pub trait AttendanceApi: Send + Sync {
    /// Whether a session token is stored.
    fn has_session(&self) -> bool;

    /// Forgets the stored session token.
    fn clear_session(&self);

    /// Signs in and stores the issued token.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError>;

    async fn profile(&self) -> Result<Profile, ClientError>;

    async fn list_groups(&self) -> Result<Vec<Group>, ClientError>;
    async fn create_group(&self, name: &str) -> Result<Group, ClientError>;
    async fn delete_group(&self, group_id: Uuid) -> Result<(), ClientError>;

    async fn list_students(&self, group_id: Option<Uuid>) -> Result<Vec<Student>, ClientError>;
    async fn create_student(&self, full_name: &str, group_id: Uuid) -> Result<Student, ClientError>;
    async fn delete_student(&self, student_id: Uuid) -> Result<(), ClientError>;

    async fn list_attendance(
        &self,
        date: NaiveDate,
        group_id: Option<Uuid>,
    ) -> Result<Vec<Attendance>, ClientError>;
    async fn upsert_attendance(
        &self,
        request: &UpsertAttendanceRequest,
    ) -> Result<Attendance, ClientError>;
    async fn attendance_summary(
        &self,
        query: &SummaryQuery,
    ) -> Result<Vec<StudentSummary>, ClientError>;

    async fn list_users(&self) -> Result<Vec<UserListItem>, ClientError>;
    async fn create_user(&self, request: &CreateUserRequest) -> Result<Profile, ClientError>;
    async fn update_user(
        &self,
        user_id: Uuid,
        request: &UpdateUserRequest,
    ) -> Result<Profile, ClientError>;
    async fn delete_user(&self, user_id: Uuid) -> Result<(), ClientError>;
}

fn group_filter(group_id: Option<Uuid>) -> String {
    group_id.map(|id| format!("group_id={}", id)).unwrap_or_default()
}

#[async_trait]
impl AttendanceApi for ApiClient {
    fn has_session(&self) -> bool {
        self.has_token()
    }

    fn clear_session(&self) {
        self.clear_token();
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let response = self
            .request_anonymous(Method::POST, "/api/login", Some(&body))
            .await?;
        let login: LoginResponse = decode(response).await?;
        self.store_token(&login.token);
        Ok(login)
    }

    async fn profile(&self) -> Result<Profile, ClientError> {
        self.get_json("/api/profile").await
    }

    async fn list_groups(&self) -> Result<Vec<Group>, ClientError> {
        self.get_json("/api/groups").await
    }

    async fn create_group(&self, name: &str) -> Result<Group, ClientError> {
        self.post_json("/api/groups", &json!({ "name": name })).await
    }

    async fn delete_group(&self, group_id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/api/groups/{}", group_id)).await
    }

    async fn list_students(&self, group_id: Option<Uuid>) -> Result<Vec<Student>, ClientError> {
        self.get_json(&format!("/api/students?{}", group_filter(group_id)))
            .await
    }

    async fn create_student(&self, full_name: &str, group_id: Uuid) -> Result<Student, ClientError> {
        self.post_json(
            "/api/students",
            &json!({ "full_name": full_name, "group_id": group_id }),
        )
        .await
    }

    async fn delete_student(&self, student_id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/api/students/{}", student_id)).await
    }

    async fn list_attendance(
        &self,
        date: NaiveDate,
        group_id: Option<Uuid>,
    ) -> Result<Vec<Attendance>, ClientError> {
        let mut path = format!("/api/attendance?date={}", date);
        if let Some(group_id) = group_id {
            path.push_str(&format!("&group_id={}", group_id));
        }
        self.get_json(&path).await
    }

    async fn upsert_attendance(
        &self,
        request: &UpsertAttendanceRequest,
    ) -> Result<Attendance, ClientError> {
        self.post_json("/api/attendance", request).await
    }

    async fn attendance_summary(
        &self,
        query: &SummaryQuery,
    ) -> Result<Vec<StudentSummary>, ClientError> {
        let mut path = format!(
            "/api/attendance/summary?group_id={}&from={}&to={}",
            query.group_id, query.from, query.to
        );
        if let Some(collapse) = query.collapse_partial {
            path.push_str(&format!("&collapse_partial={}", collapse));
        }
        self.get_json(&path).await
    }

    async fn list_users(&self) -> Result<Vec<UserListItem>, ClientError> {
        self.get_json("/api/admin/users").await
    }

    async fn create_user(&self, request: &CreateUserRequest) -> Result<Profile, ClientError> {
        self.post_json("/api/admin/users", request).await
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        request: &UpdateUserRequest,
    ) -> Result<Profile, ClientError> {
        self.patch_json(&format!("/api/admin/users/{}", user_id), request)
            .await
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/api/admin/users/{}", user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{MemoryTokenStore, TokenStore};
    use domain::models::AttendanceStatus;
    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use chrono::Utc;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Arc;

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn profile_json(id: Uuid) -> Value {
        json!({
            "id": id,
            "full_name": "Admin",
            "role": "admin",
            "group_id": null,
            "created_at": Utc::now()
        })
    }

    #[tokio::test]
    async fn test_login_stores_token_then_profile_uses_it() {
        let id = Uuid::new_v4();
        let router = Router::new()
            .route(
                "/api/login",
                post(move |Json(body): Json<Value>| async move {
                    if body["password"] == "secret1" {
                        Ok(Json(json!({
                            "token": "issued",
                            "token_type": "Bearer",
                            "expires_in": 60,
                            "profile": profile_json(id)
                        })))
                    } else {
                        Err((
                            StatusCode::UNAUTHORIZED,
                            Json(json!({ "error": "unauthorized", "message": "Invalid username or password" })),
                        ))
                    }
                }),
            )
            .route(
                "/api/profile",
                get(move |headers: HeaderMap| async move {
                    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                        Some("Bearer issued") => Ok(Json(profile_json(id))),
                        _ => Err(StatusCode::UNAUTHORIZED),
                    }
                }),
            );
        let base = spawn_server(router).await;
        let tokens = Arc::new(MemoryTokenStore::new());
        let client = ApiClient::new(base, tokens.clone()).unwrap();

        let err = client.login("admin", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password");
        assert!(!client.has_session());

        let login = client.login(" admin ", "secret1").await.unwrap();
        assert_eq!(login.profile.id, id);
        assert_eq!(tokens.load().as_deref(), Some("issued"));

        let profile = client.profile().await.unwrap();
        assert_eq!(profile.id, id);
    }

    #[tokio::test]
    async fn test_list_attendance_sends_query() {
        let router = Router::new().route(
            "/api/attendance",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("date").map(String::as_str), Some("2024-01-10"));
                assert!(params.contains_key("group_id"));
                Json(json!([]))
            }),
        );
        let base = spawn_server(router).await;
        let client = ApiClient::new(base, Arc::new(MemoryTokenStore::with_token("t"))).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let records = client
            .list_attendance(date, Some(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_attendance_summary_sends_range_and_decodes_counts() {
        let group_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let router = Router::new().route(
            "/api/attendance/summary",
            get(move |Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("group_id"), Some(&group_id.to_string()));
                assert_eq!(params.get("from").map(String::as_str), Some("2024-01-01"));
                assert_eq!(params.get("to").map(String::as_str), Some("2024-01-31"));
                assert_eq!(params.get("collapse_partial").map(String::as_str), Some("true"));
                Json(json!([{
                    "student_id": student_id,
                    "full_name": "Ivanov Ivan",
                    "counts": { "present": 3, "left_early": 1, "absent": 2 },
                    "total": 6
                }]))
            }),
        );
        let base = spawn_server(router).await;
        let client = ApiClient::new(base, Arc::new(MemoryTokenStore::with_token("t"))).unwrap();

        let query = SummaryQuery {
            group_id,
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            collapse_partial: Some(true),
        };
        let summary = client.attendance_summary(&query).await.unwrap();

        assert_eq!(summary.len(), 1);
        let row = &summary[0];
        assert_eq!(row.student_id, student_id);
        assert_eq!(row.count(AttendanceStatus::Present), 3);
        assert_eq!(row.count(AttendanceStatus::LeftEarly), 1);
        assert_eq!(row.count(AttendanceStatus::Absent), 2);
        assert_eq!(row.count(AttendanceStatus::Late), 0);
        assert_eq!(row.total, 6);
    }

    #[tokio::test]
    async fn test_attendance_summary_omits_unset_collapse_flag() {
        let router = Router::new().route(
            "/api/attendance/summary",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert!(!params.contains_key("collapse_partial"));
                Json(json!([]))
            }),
        );
        let base = spawn_server(router).await;
        let client = ApiClient::new(base, Arc::new(MemoryTokenStore::with_token("t"))).unwrap();

        let query = SummaryQuery {
            group_id: Uuid::new_v4(),
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            collapse_partial: None,
        };
        assert!(client.attendance_summary(&query).await.unwrap().is_empty());
    }
}
