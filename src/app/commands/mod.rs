use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use regex::Regex;
use serde::Serialize;
use tauri::{AppHandle, Emitter, State};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::api::accounts::{DeviceVerification, ProfileUpdate, RegisterPayload};
use crate::app::api::activities::ActivityPageFetcher;
use crate::app::api::client::LinkClient;
use crate::app::api::family::FamilyMemberInput;
use crate::app::api::paging::{ActivityPager, PageMerge};
use crate::app::api::sos::serial_from_qr;
use crate::app::config::{load_config, save_config, AppConfig};
use crate::app::diagnostics::{self, SessionSummary};
use crate::app::error::AppError;
use crate::app::models::{
    ActivityRow, BaseStation, CommandResponse, CustomerDevice, DeviceBoard, FamilyMember,
    LoginUser, SosAlert,
};
use crate::app::session::{Session, SessionStore};
use crate::app::state::AppState;


pub const ACTIVITIES_EVENT_NAME: &str = "activities://updated";

fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}

fn ensure_non_empty(value: &str, field: &str, trace_id: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(
            format!("{field} must not be empty"),
            trace_id,
        ));
    }
    Ok(())
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid regex")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9\-\s]{6,14}$").expect("valid regex"))
}

fn lock_sessions<'a>(
    state: &'a AppState,
    trace_id: &str,
) -> Result<std::sync::MutexGuard<'a, SessionStore>, AppError> {
    state
        .sessions
        .lock()
        .map_err(|_| AppError::system("Session store locked", trace_id))
}

fn lock_pagers<'a>(
    pagers: &'a Mutex<HashMap<String, ActivityPager>>,
    trace_id: &str,
) -> Result<std::sync::MutexGuard<'a, HashMap<String, ActivityPager>>, AppError> {
    pagers
        .lock()
        .map_err(|_| AppError::system("Pager registry locked", trace_id))
}

fn current_session(state: &AppState, trace_id: &str) -> Result<Session, AppError> {
    Ok(lock_sessions(state, trace_id)?.require(trace_id)?.clone())
}

fn require_capability(allowed: bool, what: &str, trace_id: &str) -> Result<(), AppError> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::auth(
            format!("Your role does not allow {what}"),
            trace_id,
        ))
    }
}

/* =====================================================
   Session & role views
   ===================================================== */

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionView {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub user_type: String,
    pub contact: String,
    pub staff_id: i64,
    pub staff_name: String,
    pub role: String,
    pub role_display_name: String,
    pub role_color: String,
    pub message: String,
}

fn session_view(session: &Session, message: impl Into<String>) -> SessionView {
    SessionView {
        user_id: session.user_id,
        username: session.username.clone(),
        email: session.email.clone(),
        user_type: session.user_type.clone(),
        contact: session.contact.clone(),
        staff_id: session.staff_id,
        staff_name: session.staff_name.clone(),
        role: session.role.as_permission().to_string(),
        role_display_name: session.role.display_name().to_string(),
        role_color: session.role.accent_color().to_string(),
        message: message.into(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoleInfo {
    pub role: String,
    pub display_name: String,
    pub color: String,
    pub description: String,
    pub can_assign_devices: bool,
    pub can_view_map: bool,
    pub can_acknowledge_sos: bool,
    pub can_view_history: bool,
    pub can_view_activities: bool,
    pub can_view_customers: bool,
}

/* =====================================================
   Login / logout
   ===================================================== */

pub fn validate_login_inputs(email: &str, password: &str, trace_id: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        return Err(AppError::validation("Email is required", trace_id));
    }
    if !email_regex().is_match(email.trim()) {
        return Err(AppError::validation("Enter a valid email", trace_id));
    }
    if password.trim().is_empty() {
        return Err(AppError::validation("Password is required", trace_id));
    }
    Ok(())
}

/// The mobile client is for field staff; admins and end users are pointed at
/// the web portal instead of being let in with the wrong surface.
pub fn ensure_staff_account(user: &LoginUser, trace_id: &str) -> Result<(), AppError> {
    if user.user_type != "staff" {
        return Err(AppError::auth(
            "Only staff members can login to the app. Please use the web portal.",
            trace_id,
        ));
    }
    Ok(())
}

pub async fn login_inner(
    client: &LinkClient,
    sessions: &Mutex<SessionStore>,
    email: &str,
    password: &str,
    trace_id: &str,
) -> Result<SessionView, AppError> {
    validate_login_inputs(email, password, trace_id)?;

    let (message, user) = client
        .login(email.trim(), password.trim())
        .await
        .map_err(|failure| failure.into_app_error(trace_id))?;
    ensure_staff_account(&user, trace_id)?;

    let session = Session::from_login(&user);
    let mut guard = sessions
        .lock()
        .map_err(|_| AppError::system("Session store locked", trace_id))?;
    guard.save(session.clone(), trace_id)?;
    info!(trace_id = %trace_id, user_id = session.user_id, "staff login");
    Ok(session_view(&session, message))
}

#[tauri::command]
pub async fn login(
    state: State<'_, AppState>,
    email: String,
    password: String,
) -> Result<CommandResponse<SessionView>, AppError> {
    let trace_id = new_trace_id();
    let client = state.client();
    let data = login_inner(&client, &state.sessions, &email, &password, &trace_id).await?;
    Ok(CommandResponse { trace_id, data })
}

#[tauri::command]
pub fn logout(state: State<'_, AppState>) -> Result<CommandResponse<bool>, AppError> {
    let trace_id = new_trace_id();
    lock_sessions(&state, &trace_id)?.logout(&trace_id)?;
    // Any accumulated list state belongs to the old identity.
    lock_pagers(&state.pagers, &trace_id)?.clear();
    info!(trace_id = %trace_id, "logged out");
    Ok(CommandResponse {
        trace_id,
        data: true,
    })
}

#[tauri::command]
pub fn session_info(
    state: State<'_, AppState>,
) -> Result<CommandResponse<Option<SessionView>>, AppError> {
    let trace_id = new_trace_id();
    let guard = lock_sessions(&state, &trace_id)?;
    let data = guard.current().map(|session| session_view(session, ""));
    Ok(CommandResponse { trace_id, data })
}

#[tauri::command]
pub fn role_info(state: State<'_, AppState>) -> Result<CommandResponse<RoleInfo>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    let role = session.role;
    Ok(CommandResponse {
        trace_id,
        data: RoleInfo {
            role: role.as_permission().to_string(),
            display_name: role.display_name().to_string(),
            color: role.accent_color().to_string(),
            description: role.description().to_string(),
            can_assign_devices: role.can_assign_devices(),
            can_view_map: role.can_view_map(),
            can_acknowledge_sos: role.can_acknowledge_sos(),
            can_view_history: role.can_view_history(),
            can_view_activities: role.can_view_activities(),
            can_view_customers: role.can_view_customers(),
        },
    })
}

/* =====================================================
   Activity log pagination
   ===================================================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerAction {
    Open,
    NextPage,
    ToggleFilter,
}

/// Snapshot of one list's pagination state, shipped to the webview after
/// every merge. `merge` tells the frontend how to treat the scroll position;
/// `appended_from` is the first new row index on appends.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActivityLogView {
    pub list_id: String,
    pub rows: Vec<ActivityRow>,
    pub merge: String,
    pub appended_from: usize,
    pub has_more: bool,
    pub filter_by_me: bool,
    pub page: u32,
    pub empty_hint: Option<String>,
}

fn snapshot_view(
    list_id: &str,
    pager: &ActivityPager,
    merge: &str,
    appended_from: usize,
    empty_hint: Option<String>,
) -> ActivityLogView {
    ActivityLogView {
        list_id: list_id.to_string(),
        rows: pager.rows(),
        merge: merge.to_string(),
        appended_from,
        has_more: pager.has_more(),
        filter_by_me: pager.filter_by_me(),
        page: pager.loaded_page(),
        empty_hint,
    }
}

pub async fn activities_inner(
    fetcher: &dyn ActivityPageFetcher,
    pagers: &Mutex<HashMap<String, ActivityPager>>,
    user_id: i64,
    list_id: &str,
    action: PagerAction,
    trace_id: &str,
) -> Result<ActivityLogView, AppError> {
    ensure_non_empty(list_id, "list_id", trace_id)?;

    let request = {
        let mut guard = lock_pagers(pagers, trace_id)?;
        let pager = guard.entry(list_id.to_string()).or_default();
        match action {
            PagerAction::Open => Some(pager.request_refresh()),
            PagerAction::NextPage => pager.request_next_page(),
            PagerAction::ToggleFilter => Some(pager.toggle_filter()),
        }
    };

    let Some(request) = request else {
        // Trigger dropped: a fetch is already in flight or the list is done.
        let mut guard = lock_pagers(pagers, trace_id)?;
        let pager = guard.entry(list_id.to_string()).or_default();
        return Ok(snapshot_view(list_id, pager, "noop", 0, None));
    };

    info!(
        trace_id = %trace_id,
        list_id = %list_id,
        page = request.page,
        filter_by_me = request.filter_by_me,
        "fetching activity page"
    );
    let outcome = fetcher.fetch_page(user_id, &request).await;

    let mut guard = lock_pagers(pagers, trace_id)?;
    let pager = guard.entry(list_id.to_string()).or_default();
    match outcome {
        Ok(page) => match pager.apply_success(&request, page) {
            Some(PageMerge::Replaced { .. }) => {
                Ok(snapshot_view(list_id, pager, "replaced", 0, None))
            }
            Some(PageMerge::Appended { start, .. }) => {
                Ok(snapshot_view(list_id, pager, "appended", start, None))
            }
            Some(PageMerge::Empty { hint }) => {
                Ok(snapshot_view(list_id, pager, "empty", 0, hint))
            }
            // The pager was reset while this page was in flight.
            None => Ok(snapshot_view(list_id, pager, "noop", 0, None)),
        },
        Err(failure) => {
            warn!(
                trace_id = %trace_id,
                list_id = %list_id,
                page = request.page,
                error = %failure,
                "activity page fetch failed"
            );
            pager.apply_failure(&request, &failure);
            Err(failure.into_app_error(trace_id))
        }
    }
}

fn emit_activities(app: &AppHandle, view: &ActivityLogView) {
    let _ = app.emit(ACTIVITIES_EVENT_NAME, view);
}

/// After a failed fetch the webview still needs a state to show; a first-page
/// failure leaves the pager empty, which renders as the empty state.
fn emit_failure_snapshot(app: &AppHandle, state: &AppState, list_id: &str, trace_id: &str) {
    if let Ok(guard) = lock_pagers(&state.pagers, trace_id) {
        if let Some(pager) = guard.get(list_id) {
            let merge = if pager.items().is_empty() {
                "empty"
            } else {
                "noop"
            };
            emit_activities(app, &snapshot_view(list_id, pager, merge, 0, None));
        }
    }
}

async fn run_activities_command(
    app: AppHandle,
    state: State<'_, AppState>,
    list_id: String,
    action: PagerAction,
) -> Result<CommandResponse<ActivityLogView>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    require_capability(
        session.role.can_view_activities(),
        "viewing the activity log",
        &trace_id,
    )?;

    let client = state.client();
    match activities_inner(
        client.as_ref(),
        &state.pagers,
        session.user_id,
        &list_id,
        action,
        &trace_id,
    )
    .await
    {
        Ok(view) => {
            emit_activities(&app, &view);
            Ok(CommandResponse {
                trace_id,
                data: view,
            })
        }
        Err(err) => {
            emit_failure_snapshot(&app, &state, &list_id, &trace_id);
            Err(err)
        }
    }
}

#[tauri::command]
pub async fn open_activity_log(
    app: AppHandle,
    state: State<'_, AppState>,
    list_id: String,
) -> Result<CommandResponse<ActivityLogView>, AppError> {
    run_activities_command(app, state, list_id, PagerAction::Open).await
}

#[tauri::command]
pub async fn load_more_activities(
    app: AppHandle,
    state: State<'_, AppState>,
    list_id: String,
) -> Result<CommandResponse<ActivityLogView>, AppError> {
    run_activities_command(app, state, list_id, PagerAction::NextPage).await
}

#[tauri::command]
pub async fn toggle_activity_filter(
    app: AppHandle,
    state: State<'_, AppState>,
    list_id: String,
) -> Result<CommandResponse<ActivityLogView>, AppError> {
    run_activities_command(app, state, list_id, PagerAction::ToggleFilter).await
}

/* =====================================================
   Customers, devices, assignments
   ===================================================== */

#[tauri::command]
pub async fn list_active_customers(
    state: State<'_, AppState>,
) -> Result<CommandResponse<Vec<CustomerDevice>>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    require_capability(session.role.can_view_map(), "viewing the map", &trace_id)?;

    let staff_id = (session.staff_id > 0).then_some(session.staff_id);
    let data = state
        .client()
        .active_customers(session.user_id, staff_id)
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    Ok(CommandResponse { trace_id, data })
}

#[tauri::command]
pub async fn get_device_board(
    state: State<'_, AppState>,
) -> Result<CommandResponse<DeviceBoard>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    require_capability(
        session.role.can_view_customers(),
        "managing customers",
        &trace_id,
    )?;

    let data = state
        .client()
        .device_board(session.staff_id)
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    Ok(CommandResponse { trace_id, data })
}

pub fn validate_assignment_inputs(
    serial_number: &str,
    assigned_name: &str,
    assigned_contact: &str,
    trace_id: &str,
) -> Result<(), AppError> {
    ensure_non_empty(serial_number, "serial_number", trace_id)?;
    if assigned_name.trim().is_empty() {
        return Err(AppError::validation("Customer name is required", trace_id));
    }
    if !phone_regex().is_match(assigned_contact.trim()) {
        return Err(AppError::validation("Invalid contact number", trace_id));
    }
    Ok(())
}

#[tauri::command]
pub async fn assign_device(
    state: State<'_, AppState>,
    serial_number: String,
    assigned_name: String,
    assigned_contact: String,
) -> Result<CommandResponse<String>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    require_capability(
        session.role.can_assign_devices(),
        "assigning devices",
        &trace_id,
    )?;
    validate_assignment_inputs(&serial_number, &assigned_name, &assigned_contact, &trace_id)?;

    let data = state
        .client()
        .assign_device(
            serial_number.trim(),
            assigned_name.trim(),
            assigned_contact.trim(),
            session.staff_id,
        )
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    info!(trace_id = %trace_id, serial = %serial_number, "device assigned");
    Ok(CommandResponse { trace_id, data })
}

#[tauri::command]
pub async fn end_assignment(
    state: State<'_, AppState>,
    assignment_id: i64,
) -> Result<CommandResponse<String>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    require_capability(
        session.role.can_assign_devices(),
        "ending assignments",
        &trace_id,
    )?;
    if assignment_id <= 0 {
        return Err(AppError::validation("Invalid assignment id", &trace_id));
    }

    let data = state
        .client()
        .end_assignment(assignment_id, session.staff_id)
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    info!(trace_id = %trace_id, assignment_id, "assignment ended");
    Ok(CommandResponse { trace_id, data })
}

/* =====================================================
   SOS
   ===================================================== */

#[tauri::command]
pub async fn list_resolved_sos(
    state: State<'_, AppState>,
) -> Result<CommandResponse<Vec<SosAlert>>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    require_capability(session.role.can_view_history(), "viewing history", &trace_id)?;

    let history = state
        .client()
        .resolved_sos_history(session.user_id)
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    info!(trace_id = %trace_id, count = history.count, "resolved SOS history loaded");
    Ok(CommandResponse {
        trace_id,
        data: history.alerts,
    })
}

pub fn resolution_note_for(username: &str) -> String {
    format!("Resolved via QR scan by {username}")
}

#[tauri::command]
pub async fn resolve_sos_by_qr(
    state: State<'_, AppState>,
    qr_text: String,
) -> Result<CommandResponse<String>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    require_capability(
        session.role.can_acknowledge_sos(),
        "resolving SOS alerts",
        &trace_id,
    )?;

    let serial = serial_from_qr(&qr_text).ok_or_else(|| {
        AppError::validation("QR code does not contain a transmitter serial", &trace_id)
    })?;

    let data = state
        .client()
        .resolve_sos_by_qr(
            &serial,
            session.staff_id,
            &resolution_note_for(&session.username),
        )
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    info!(trace_id = %trace_id, serial = %serial, "SOS resolved via QR");
    Ok(CommandResponse { trace_id, data })
}

/* =====================================================
   Accounts
   ===================================================== */

#[tauri::command]
pub async fn verify_device(
    state: State<'_, AppState>,
    device_id: String,
) -> Result<CommandResponse<DeviceVerificationView>, AppError> {
    let trace_id = new_trace_id();
    ensure_non_empty(&device_id, "device_id", &trace_id)?;

    let verification = state
        .client()
        .verify_device(device_id.trim())
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    Ok(CommandResponse {
        trace_id,
        data: DeviceVerificationView::from(&verification),
    })
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeviceVerificationView {
    pub status: String,
    pub message: String,
    pub allows_signup: bool,
}

impl From<&DeviceVerification> for DeviceVerificationView {
    fn from(verification: &DeviceVerification) -> Self {
        Self {
            status: verification.status.clone(),
            message: verification.message.clone(),
            allows_signup: verification.allows_signup(),
        }
    }
}

#[tauri::command]
pub async fn register_account(
    state: State<'_, AppState>,
    full_name: String,
    contact: String,
    email: String,
    password: String,
    device_id: String,
) -> Result<CommandResponse<String>, AppError> {
    let trace_id = new_trace_id();
    ensure_non_empty(&full_name, "full_name", &trace_id)?;
    validate_login_inputs(&email, &password, &trace_id)?;
    ensure_non_empty(&device_id, "device_id", &trace_id)?;

    let payload = RegisterPayload {
        full_name: full_name.trim().to_string(),
        contact: contact.trim().to_string(),
        email: email.trim().to_string(),
        password,
        device_id: device_id.trim().to_string(),
    };
    let data = state
        .client()
        .register(&payload)
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    Ok(CommandResponse { trace_id, data })
}

pub fn validate_password_change(
    old_password: &str,
    new_password: &str,
    confirm_password: &str,
    trace_id: &str,
) -> Result<(), AppError> {
    if old_password.trim().is_empty() {
        return Err(AppError::validation("Old password is required", trace_id));
    }
    if new_password.trim().is_empty() {
        return Err(AppError::validation("New password is required", trace_id));
    }
    if new_password.len() < 6 {
        return Err(AppError::validation(
            "Password must be at least 6 characters",
            trace_id,
        ));
    }
    if new_password != confirm_password {
        return Err(AppError::validation("Passwords do not match", trace_id));
    }
    Ok(())
}

#[tauri::command]
pub async fn change_password(
    state: State<'_, AppState>,
    old_password: String,
    new_password: String,
    confirm_password: String,
) -> Result<CommandResponse<String>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    validate_password_change(&old_password, &new_password, &confirm_password, &trace_id)?;

    let data = state
        .client()
        .change_password(
            session.user_id,
            &old_password,
            &new_password,
            &confirm_password,
        )
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    info!(trace_id = %trace_id, user_id = session.user_id, "password changed");
    Ok(CommandResponse { trace_id, data })
}

/// Reads a picked image and produces the base64 payload the API expects.
pub fn encode_profile_picture(path: &str, trace_id: &str) -> Result<String, AppError> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(AppError::validation(
            "Selected file is not an image",
            trace_id,
        ));
    }
    let bytes = std::fs::read(path)
        .map_err(|err| AppError::system(format!("Failed to read image: {err}"), trace_id))?;
    Ok(BASE64.encode(bytes))
}

#[tauri::command]
pub async fn update_profile(
    state: State<'_, AppState>,
    full_name: String,
    contact: String,
    picture_path: Option<String>,
) -> Result<CommandResponse<Option<String>>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    ensure_non_empty(&full_name, "full_name", &trace_id)?;

    let profile_picture = match picture_path
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
    {
        Some(path) => Some(encode_profile_picture(path, &trace_id)?),
        None => None,
    };

    let update = ProfileUpdate {
        user_id: session.user_id,
        full_name: full_name.trim().to_string(),
        contact: contact.trim().to_string(),
        profile_picture,
    };
    let saved_picture = state
        .client()
        .update_profile(&update)
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;

    lock_sessions(&state, &trace_id)?.update_profile(
        full_name.trim(),
        contact.trim(),
        &trace_id,
    )?;
    info!(trace_id = %trace_id, user_id = session.user_id, "profile updated");
    Ok(CommandResponse {
        trace_id,
        data: saved_picture,
    })
}

/* =====================================================
   Family members
   ===================================================== */

pub fn validate_family_member(input: &FamilyMemberInput, trace_id: &str) -> Result<(), AppError> {
    if input.full_name.trim().is_empty() {
        return Err(AppError::validation("Full name is required", trace_id));
    }
    if input.relationship.trim().is_empty() {
        return Err(AppError::validation("Relationship is required", trace_id));
    }
    if !phone_regex().is_match(input.contact_number.trim()) {
        return Err(AppError::validation("Invalid contact number", trace_id));
    }
    if !input.email.trim().is_empty() && !email_regex().is_match(input.email.trim()) {
        return Err(AppError::validation("Enter a valid email", trace_id));
    }
    Ok(())
}

fn family_member_input(
    full_name: String,
    relationship: String,
    contact_number: String,
    email: String,
    address: String,
) -> FamilyMemberInput {
    FamilyMemberInput {
        full_name: full_name.trim().to_string(),
        relationship: relationship.trim().to_string(),
        contact_number: contact_number.trim().to_string(),
        email: email.trim().to_string(),
        address: address.trim().to_string(),
    }
}

#[tauri::command]
pub async fn list_family_members(
    state: State<'_, AppState>,
) -> Result<CommandResponse<Vec<FamilyMember>>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    let data = state
        .client()
        .family_members(session.user_id)
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    Ok(CommandResponse { trace_id, data })
}

#[tauri::command]
pub async fn add_family_member(
    state: State<'_, AppState>,
    full_name: String,
    relationship: String,
    contact_number: String,
    email: String,
    address: String,
) -> Result<CommandResponse<String>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    let input = family_member_input(full_name, relationship, contact_number, email, address);
    validate_family_member(&input, &trace_id)?;

    let data = state
        .client()
        .add_family_member(session.user_id, &input)
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    Ok(CommandResponse { trace_id, data })
}

#[tauri::command]
pub async fn update_family_member(
    state: State<'_, AppState>,
    member_id: i64,
    full_name: String,
    relationship: String,
    contact_number: String,
    email: String,
    address: String,
) -> Result<CommandResponse<String>, AppError> {
    let trace_id = new_trace_id();
    let _session = current_session(&state, &trace_id)?;
    if member_id <= 0 {
        return Err(AppError::validation("Invalid member id", &trace_id));
    }
    let input = family_member_input(full_name, relationship, contact_number, email, address);
    validate_family_member(&input, &trace_id)?;

    let data = state
        .client()
        .update_family_member(member_id, &input)
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    Ok(CommandResponse { trace_id, data })
}

#[tauri::command]
pub async fn delete_family_member(
    state: State<'_, AppState>,
    member_id: i64,
) -> Result<CommandResponse<String>, AppError> {
    let trace_id = new_trace_id();
    let _session = current_session(&state, &trace_id)?;
    if member_id <= 0 {
        return Err(AppError::validation("Invalid member id", &trace_id));
    }
    let data = state
        .client()
        .delete_family_member(member_id)
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    Ok(CommandResponse { trace_id, data })
}

/* =====================================================
   Map
   ===================================================== */

#[tauri::command]
pub async fn get_base_stations(
    state: State<'_, AppState>,
) -> Result<CommandResponse<Vec<BaseStation>>, AppError> {
    let trace_id = new_trace_id();
    let session = current_session(&state, &trace_id)?;
    require_capability(session.role.can_view_map(), "viewing the map", &trace_id)?;

    let data = state
        .client()
        .base_stations()
        .await
        .map_err(|failure| failure.into_app_error(&trace_id))?;
    Ok(CommandResponse { trace_id, data })
}

/* =====================================================
   Config & diagnostics
   ===================================================== */

#[tauri::command]
pub fn get_config() -> Result<CommandResponse<AppConfig>, AppError> {
    let trace_id = new_trace_id();
    let data = load_config()?;
    Ok(CommandResponse { trace_id, data })
}

#[tauri::command]
pub fn save_app_config(
    state: State<'_, AppState>,
    config: AppConfig,
) -> Result<CommandResponse<AppConfig>, AppError> {
    let trace_id = new_trace_id();
    save_config(&config)?;
    state.rebuild_client(&config.api, &trace_id)?;
    info!(trace_id = %trace_id, base_url = %config.api.base_url, "config saved");
    Ok(CommandResponse {
        trace_id,
        data: config,
    })
}

#[tauri::command]
pub fn reset_config(state: State<'_, AppState>) -> Result<CommandResponse<AppConfig>, AppError> {
    let trace_id = new_trace_id();
    let config = AppConfig::default();
    save_config(&config)?;
    state.rebuild_client(&config.api, &trace_id)?;
    Ok(CommandResponse {
        trace_id,
        data: config,
    })
}

#[tauri::command]
pub async fn export_diagnostics_bundle(
    state: State<'_, AppState>,
    output_dir: Option<String>,
) -> Result<CommandResponse<String>, AppError> {
    let trace_id = new_trace_id();
    let summary = {
        let guard = lock_sessions(&state, &trace_id)?;
        match guard.current() {
            Some(session) => SessionSummary {
                logged_in: true,
                user_type: Some(session.user_type.clone()),
                role: Some(session.role.as_permission().to_string()),
            },
            None => SessionSummary {
                logged_in: false,
                user_type: None,
                role: None,
            },
        }
    };

    let client = state.client();
    let bundle =
        diagnostics::export_diagnostics_bundle(&client, summary, output_dir, &trace_id).await?;
    Ok(CommandResponse {
        trace_id,
        data: bundle.to_string_lossy().to_string(),
    })
}
