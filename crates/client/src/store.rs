//! Client state and the update/render cycle.
//!
//! Every action follows the same shape: set flags, render, await the
//! fetches, merge the results, clear the flags, render again. The renderer
//! always rebuilds from the whole state.
//!
//! The state sits behind a mutex that is never held across an await, so
//! concurrent actions interleave only at await points.

use chrono::NaiveDate;
use domain::models::attendance::UpsertAttendanceRequest;
use domain::models::user::{CreateUserRequest, UpdateUserRequest};
use domain::models::{
    Attendance, AttendanceStatus, Group, Profile, Role, Student, UserListItem,
};
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::AttendanceApi;
use crate::error::ClientError;

/// How long a loading phase may take before it is abandoned.
pub const DEFAULT_LOADING_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Journal,
    Groups,
    Settings,
}

impl Tab {
    /// Group and login management are admin screens.
    pub fn is_available_to(&self, role: Role) -> bool {
        match self {
            Tab::Journal => true,
            Tab::Groups | Tab::Settings => role.is_admin(),
        }
    }
}

/// What the renderer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Loading,
    App(Tab),
}

#[derive(Debug, Clone)]
pub struct ClientState {
    pub profile: Option<Profile>,
    pub groups: Vec<Group>,
    pub selected_group: Option<Uuid>,
    pub date: NaiveDate,
    pub students: Vec<Student>,
    pub attendance: Vec<Attendance>,
    pub users: Vec<UserListItem>,
    pub loading: bool,
    pub loading_step: Option<String>,
    pub tab: Tab,
    /// Students with a status edit in flight.
    pub updating: HashSet<Uuid>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// One journal line: a student and their record for the current date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRow {
    pub student_id: Uuid,
    pub full_name: String,
    pub status: Option<AttendanceStatus>,
    pub comment: Option<String>,
    pub updating: bool,
}

impl ClientState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            profile: None,
            groups: Vec::new(),
            selected_group: None,
            date,
            students: Vec::new(),
            attendance: Vec::new(),
            users: Vec::new(),
            loading: false,
            loading_step: None,
            tab: Tab::default(),
            updating: HashSet::new(),
            error: None,
            notice: None,
        }
    }

    pub fn view(&self) -> View {
        if self.loading {
            View::Loading
        } else if self.profile.is_none() {
            View::Login
        } else {
            View::App(self.tab)
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(|role| role.is_admin())
    }

    pub fn record_for(&self, student_id: Uuid) -> Option<&Attendance> {
        self.attendance.iter().find(|a| a.student_id == student_id)
    }

    /// Students joined with the day's records, in list order.
    pub fn journal(&self) -> Vec<JournalRow> {
        self.students
            .iter()
            .map(|student| {
                let record = self.record_for(student.id);
                JournalRow {
                    student_id: student.id,
                    full_name: student.full_name.clone(),
                    status: record.map(|r| r.status),
                    comment: record.and_then(|r| r.comment.clone()),
                    updating: self.updating.contains(&student.id),
                }
            })
            .collect()
    }

    /// Drops everything tied to the signed-in profile. The date survives.
    pub fn reset_session(&mut self) {
        *self = ClientState::new(self.date);
    }

    /// Replaces or inserts `record` in the loaded day.
    fn merge_record(&mut self, record: Attendance) {
        if record.date != self.date {
            return;
        }
        match self
            .attendance
            .iter_mut()
            .find(|a| a.student_id == record.student_id)
        {
            Some(existing) => *existing = record,
            None => self.attendance.push(record),
        }
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

/// Draws the whole state. Called after every change.
pub trait Renderer: Send + Sync {
    fn render(&self, state: &ClientState);
}

pub struct Store<A, R> {
    api: A,
    renderer: R,
    state: Mutex<ClientState>,
    loading_timeout: Duration,
}

impl<A: AttendanceApi, R: Renderer> Store<A, R> {
    pub fn new(api: A, renderer: R) -> Self {
        Self::with_state(api, renderer, ClientState::default())
    }

    pub fn with_state(api: A, renderer: R, state: ClientState) -> Self {
        Self {
            api,
            renderer,
            state: Mutex::new(state),
            loading_timeout: DEFAULT_LOADING_TIMEOUT,
        }
    }

    pub fn with_loading_timeout(mut self, timeout: Duration) -> Self {
        self.loading_timeout = timeout;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> ClientState {
        self.lock().clone()
    }

    pub fn journal(&self) -> Vec<JournalRow> {
        self.lock().journal()
    }

    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies `f` to the state and re-renders.
    fn update<T>(&self, f: impl FnOnce(&mut ClientState) -> T) -> T {
        let mut state = self.lock();
        let out = f(&mut state);
        self.renderer.render(&state);
        out
    }

    fn render(&self) {
        self.update(|_| ());
    }

    fn set_step(&self, step: &str) {
        self.update(|s| s.loading_step = Some(step.to_string()));
    }

    /// Records `err` for the toast layer. An expired session returns to the
    /// login view.
    fn fail(&self, err: ClientError) -> ClientError {
        warn!(error = %err, "Action failed");
        if err.is_session_expired() {
            self.api.clear_session();
            self.update(|s| {
                s.reset_session();
                s.error = Some(err.to_string());
            });
        } else {
            self.update(|s| s.error = Some(err.to_string()));
        }
        err
    }

    /// Runs `fut` as a loading phase raced against the loading timeout.
    async fn with_loading<T, F>(&self, step: &str, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.update(|s| {
            s.loading = true;
            s.loading_step = Some(step.to_string());
            s.error = None;
        });

        let result = match tokio::time::timeout(self.loading_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_ms = self.loading_timeout.as_millis() as u64,
                    "Loading timed out"
                );
                Err(ClientError::Timeout)
            }
        };

        self.update(|s| {
            s.loading = false;
            s.loading_step = None;
        });
        result.map_err(|e| self.fail(e))
    }

    /// Restores a session from a stored token.
    pub async fn init(&self) -> Result<(), ClientError> {
        if !self.api.has_session() {
            debug!("No stored session");
            self.render();
            return Ok(());
        }
        self.with_loading("Checking session", self.load_workspace())
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        if self.lock().loading {
            return Ok(());
        }

        self.with_loading("Signing in", async {
            let login = self.api.login(username, password).await?;
            info!(profile_id = %login.profile.id, role = %login.profile.role, "Signed in");
            self.load_workspace().await
        })
        .await
    }

    pub fn logout(&self) {
        self.api.clear_session();
        self.update(|s| s.reset_session());
    }

    /// Loads the profile, the groups it may see and the journal.
    async fn load_workspace(&self) -> Result<(), ClientError> {
        self.set_step("Loading profile");
        let profile = self.api.profile().await?;
        let role = profile.role;

        self.set_step("Loading groups");
        if role.sees_all_groups() {
            let groups = self.api.list_groups().await?;
            self.update(|s| {
                s.groups = groups;
                if let Some(selected) = s.selected_group {
                    if !s.groups.iter().any(|g| g.id == selected) {
                        s.selected_group = None;
                    }
                }
                s.profile = Some(profile);
            });
        } else {
            self.update(|s| {
                s.selected_group = profile.group_id;
                s.profile = Some(profile);
            });
        }

        self.load_journal().await
    }

    /// Reloads students and the day's records for the selected group.
    async fn load_journal(&self) -> Result<(), ClientError> {
        self.set_step("Loading journal");
        let (role, group_id, date) = {
            let state = self.lock();
            (state.role(), state.selected_group, state.date)
        };

        // A starosta without a group has nothing to show.
        if group_id.is_none() && !role.is_some_and(|r| r.sees_all_groups()) {
            self.update(|s| {
                s.students.clear();
                s.attendance.clear();
            });
            return Ok(());
        }

        let (students, attendance) = tokio::try_join!(
            self.api.list_students(group_id),
            self.api.list_attendance(date, group_id)
        )?;

        self.update(|s| {
            // Drop results for a group or date that changed meanwhile.
            if s.selected_group == group_id && s.date == date {
                s.students = students;
                s.attendance = attendance;
            }
        });
        Ok(())
    }

    pub async fn switch_tab(&self, tab: Tab) -> Result<(), ClientError> {
        let allowed = self
            .lock()
            .role()
            .is_some_and(|role| tab.is_available_to(role));
        if !allowed {
            return Ok(());
        }

        self.update(|s| s.tab = tab);
        if tab == Tab::Settings {
            self.load_users().await?;
        }
        Ok(())
    }

    pub async fn set_date(&self, date: NaiveDate) -> Result<(), ClientError> {
        self.update(|s| s.date = date);
        self.with_loading("Loading journal", self.load_journal())
            .await
    }

    /// Selects a group, or all students with `None`. A starosta stays on
    /// their own group.
    pub async fn select_group(&self, group_id: Option<Uuid>) -> Result<(), ClientError> {
        let changed = self.update(|s| match s.role() {
            Some(role) if role.sees_all_groups() => {
                s.selected_group = group_id;
                true
            }
            _ => false,
        });
        if !changed {
            return Ok(());
        }
        self.with_loading("Loading journal", self.load_journal())
            .await
    }

    /// Quick mark. Returns `Ok(false)` when an edit for this student is
    /// already in flight.
    pub async fn set_status(
        &self,
        student_id: Uuid,
        status: AttendanceStatus,
    ) -> Result<bool, ClientError> {
        self.mark(student_id, status, None).await
    }

    /// Saves status and comment together. A blank comment clears it.
    pub async fn save_details(
        &self,
        student_id: Uuid,
        status: AttendanceStatus,
        comment: &str,
    ) -> Result<bool, ClientError> {
        self.mark(student_id, status, Some(comment.to_string()))
            .await
    }

    async fn mark(
        &self,
        student_id: Uuid,
        status: AttendanceStatus,
        comment: Option<String>,
    ) -> Result<bool, ClientError> {
        let date = self.update(|s| {
            if !s.updating.insert(student_id) {
                return None;
            }
            s.error = None;
            Some(s.date)
        });
        let Some(date) = date else {
            debug!(student_id = %student_id, "Edit already in flight");
            return Ok(false);
        };

        let mut request = UpsertAttendanceRequest::new(student_id, date, status);
        request.comment = comment;
        let result = self.api.upsert_attendance(&request).await;

        match result {
            Ok(record) => {
                self.update(|s| {
                    s.updating.remove(&student_id);
                    s.merge_record(record);
                });
                Ok(true)
            }
            Err(err) => {
                self.lock().updating.remove(&student_id);
                Err(self.fail(err))
            }
        }
    }

    pub async fn create_group(&self, name: &str) -> Result<(), ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        self.with_loading("Creating group", async {
            let group = self.api.create_group(name).await?;
            let groups = self.api.list_groups().await?;
            self.update(|s| {
                s.groups = groups;
                s.notice = Some(format!("Group {} created", group.name));
            });
            Ok(())
        })
        .await
    }

    /// Deletes a group with its students and their attendance.
    pub async fn delete_group(&self, group_id: Uuid) -> Result<(), ClientError> {
        self.with_loading("Deleting group", async {
            self.api.delete_group(group_id).await?;
            self.update(|s| {
                if s.selected_group == Some(group_id) {
                    s.selected_group = None;
                }
                s.notice = Some("Group deleted".to_string());
            });
            self.load_workspace().await
        })
        .await
    }

    /// Adds a student to the selected group.
    pub async fn create_student(&self, full_name: &str) -> Result<(), ClientError> {
        let full_name = full_name.trim();
        let group_id = self.lock().selected_group;
        let Some(group_id) = group_id else {
            self.update(|s| s.error = Some("Select a group first".to_string()));
            return Ok(());
        };
        if full_name.is_empty() {
            return Ok(());
        }

        self.with_loading("Adding student", async {
            let student = self.api.create_student(full_name, group_id).await?;
            self.update(|s| s.notice = Some(format!("{} added", student.full_name)));
            self.load_journal().await
        })
        .await
    }

    pub async fn delete_student(&self, student_id: Uuid) -> Result<(), ClientError> {
        self.with_loading("Deleting student", async {
            self.api.delete_student(student_id).await?;
            self.update(|s| {
                s.students.retain(|st| st.id != student_id);
                s.attendance.retain(|a| a.student_id != student_id);
                s.notice = Some("Student deleted".to_string());
            });
            Ok(())
        })
        .await
    }

    async fn load_users(&self) -> Result<(), ClientError> {
        let users = self
            .api
            .list_users()
            .await
            .map_err(|e| self.fail(e))?;
        self.update(|s| s.users = users);
        Ok(())
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<(), ClientError> {
        self.with_loading("Creating user", async {
            let profile = self.api.create_user(request).await?;
            let users = self.api.list_users().await?;
            self.update(|s| {
                s.users = users;
                s.notice = Some(format!("User {} created", profile.full_name));
            });
            Ok(())
        })
        .await
    }

    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: &UpdateUserRequest,
    ) -> Result<(), ClientError> {
        self.with_loading("Saving user", async {
            let profile = self.api.update_user(user_id, request).await?;
            let users = self.api.list_users().await?;
            self.update(|s| {
                s.users = users;
                if s.profile.as_ref().is_some_and(|p| p.id == profile.id) {
                    s.profile = Some(profile);
                }
                s.notice = Some("User saved".to_string());
            });
            Ok(())
        })
        .await
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), ClientError> {
        self.with_loading("Deleting user", async {
            self.api.delete_user(user_id).await?;
            self.update(|s| {
                s.users.retain(|u| u.id != user_id);
                s.notice = Some("User deleted".to_string());
            });
            Ok(())
        })
        .await
    }

    /// Clears the toast texts.
    pub fn dismiss_messages(&self) {
        self.update(|s| {
            s.error = None;
            s.notice = None;
        });
    }
}
