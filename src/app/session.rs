use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::error::AppError;
use crate::app::models::LoginUser;
use crate::app::roles::Role;

/// Identity of the signed-in staff member. Persisted between launches so the
/// app can skip the login screen, exactly one session at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub user_type: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub staff_id: i64,
    #[serde(default)]
    pub staff_name: String,
    #[serde(default)]
    pub role: Role,
}

impl Session {
    pub fn from_login(user: &LoginUser) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            user_type: user.user_type.clone(),
            contact: user.contact.clone().unwrap_or_default(),
            staff_id: user.staff_id.unwrap_or(0),
            staff_name: user.staff_name.clone().unwrap_or_default(),
            role: Role::from_permission(user.permission.as_deref().unwrap_or("")),
        }
    }

    pub fn is_staff(&self) -> bool {
        self.user_type == "staff"
    }
}

/// File-backed session storage, injected through `AppState` so the paging
/// core and the commands can be tested against a throwaway path.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    current: Option<Session>,
}

pub fn session_path() -> PathBuf {
    if let Ok(path) = std::env::var("LINK_RESPONSE_SESSION_PATH") {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".link_response_session.json")
}

impl SessionStore {
    pub fn open_default() -> Self {
        Self::open(session_path())
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = read_session(&path);
        Self { path, current }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    /// Fails with ERR_AUTH when nobody is signed in; every remote operation
    /// except login/signup goes through this.
    pub fn require(&self, trace_id: &str) -> Result<&Session, AppError> {
        self.current
            .as_ref()
            .ok_or_else(|| AppError::auth("Not logged in", trace_id))
    }

    pub fn save(&mut self, session: Session, trace_id: &str) -> Result<(), AppError> {
        write_session(&self.path, &session, trace_id)?;
        self.current = Some(session);
        Ok(())
    }

    /// Applies a profile edit to the stored session without touching any
    /// other field.
    pub fn update_profile(
        &mut self,
        staff_name: &str,
        contact: &str,
        trace_id: &str,
    ) -> Result<(), AppError> {
        let mut session = self
            .require(trace_id)?
            .clone();
        session.staff_name = staff_name.to_string();
        session.contact = contact.to_string();
        self.save(session, trace_id)
    }

    pub fn logout(&mut self, trace_id: &str) -> Result<(), AppError> {
        self.current = None;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|err| {
                AppError::system(format!("Failed to clear session: {err}"), trace_id)
            })?;
        }
        Ok(())
    }
}

fn read_session(path: &Path) -> Option<Session> {
    let raw = fs::read_to_string(path).ok()?;
    // A corrupt session file is treated as "not logged in" rather than an
    // error; the user simply signs in again.
    serde_json::from_str(&raw).ok()
}

fn write_session(path: &Path, session: &Session, trace_id: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let payload = serde_json::to_string_pretty(session)
        .map_err(|err| AppError::system(format!("Failed to serialize session: {err}"), trace_id))?;
    fs::write(path, payload)
        .map_err(|err| AppError::system(format!("Failed to write session: {err}"), trace_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_session() -> Session {
        Session {
            user_id: 42,
            username: "jdoe".into(),
            email: "jdoe@example.com".into(),
            user_type: "staff".into(),
            contact: "0917-555-0000".into(),
            staff_id: 7,
            staff_name: "J. Doe".into(),
            role: Role::SosMonitor,
        }
    }

    #[test]
    fn save_load_round_trip() {
        let dir = TempDir::new().expect("tmp");
        let path = dir.path().join("session.json");

        let mut store = SessionStore::open(&path);
        assert!(!store.is_logged_in());

        store.save(sample_session(), "trace-1").expect("save");
        assert!(store.is_logged_in());

        let reopened = SessionStore::open(&path);
        assert_eq!(reopened.current(), Some(&sample_session()));
    }

    #[test]
    fn logout_removes_the_file() {
        let dir = TempDir::new().expect("tmp");
        let path = dir.path().join("session.json");

        let mut store = SessionStore::open(&path);
        store.save(sample_session(), "trace-2").expect("save");
        store.logout("trace-2").expect("logout");

        assert!(!store.is_logged_in());
        assert!(!path.exists());
        assert_eq!(store.require("trace-2").unwrap_err().code, "ERR_AUTH");
    }

    #[test]
    fn corrupt_file_reads_as_logged_out() {
        let dir = TempDir::new().expect("tmp");
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").expect("write");

        let store = SessionStore::open(&path);
        assert!(!store.is_logged_in());
    }

    #[test]
    fn profile_update_touches_only_name_and_contact() {
        let dir = TempDir::new().expect("tmp");
        let path = dir.path().join("session.json");

        let mut store = SessionStore::open(&path);
        store.save(sample_session(), "trace-3").expect("save");
        store
            .update_profile("Jay Doe", "0917-555-9999", "trace-3")
            .expect("update");

        let session = store.current().expect("session");
        assert_eq!(session.staff_name, "Jay Doe");
        assert_eq!(session.contact, "0917-555-9999");
        assert_eq!(session.user_id, 42);
        assert_eq!(session.role, Role::SosMonitor);
    }

    #[test]
    fn session_from_login_maps_permission() {
        let user = LoginUser {
            id: 1,
            username: "ops".into(),
            email: "ops@example.com".into(),
            user_type: "staff".into(),
            contact: None,
            status: None,
            staff_id: Some(3),
            staff_name: Some("Ops One".into()),
            permission: Some("logs-only".into()),
            added_by: None,
        };
        let session = Session::from_login(&user);
        assert_eq!(session.role, Role::LogsAccess);
        assert_eq!(session.staff_id, 3);
        assert!(session.is_staff());
    }
}
