use std::sync::{Mutex, MutexGuard};

use irp_backend::config::BackendConfig;
use irp_backend::rest::RestBackend;
use irp_core::backend::memory::MemoryBackend;
use irp_core::backend::BackendService;
use irp_core::dashboard::{DashboardSnapshot, DashboardState};
use irp_core::demo::seed_demo_dataset;
use irp_core::domain::{IncidentStatus, SessionUser};
use irp_core::error::AppError;
use irp_core::export::incidents_to_csv;
use irp_core::filter::IncidentFilter;
use irp_core::intake::{
    submit_collision_report as core_submit_collision_report,
    submit_incident_report as core_submit_incident_report, AttachmentUpload, CollisionReportDraft,
    IncidentReportDraft, ReportKind, SubmissionReceipt,
};
use irp_core::session::SessionContext;

#[derive(Debug, serde::Serialize)]
pub struct BackendMode {
    /// True when no hosted backend is configured and the seeded in-memory backend is
    /// serving instead.
    pub demo: bool,
}

struct AppState {
    backend: Box<dyn BackendService>,
    dashboard: Mutex<DashboardState>,
    session: Mutex<SessionContext>,
    demo: bool,
}

fn lock_dashboard(state: &AppState) -> Result<MutexGuard<'_, DashboardState>, AppError> {
    state
        .dashboard
        .lock()
        .map_err(|_| AppError::new("STATE_POISONED", "Dashboard state lock poisoned"))
}

fn lock_session(state: &AppState) -> Result<MutexGuard<'_, SessionContext>, AppError> {
    state
        .session
        .lock()
        .map_err(|_| AppError::new("STATE_POISONED", "Session state lock poisoned"))
}

/// Build the one backend handle every command borrows. With no configuration present
/// the app runs against the seeded in-memory backend; a broken configuration is logged
/// and falls back the same way (failures stay scoped to the interaction, never fatal).
fn init_state() -> AppState {
    let (backend, demo): (Box<dyn BackendService>, bool) = match BackendConfig::from_env() {
        Ok(Some(config)) => (Box::new(RestBackend::new(config)), false),
        Ok(None) => {
            log::info!("No backend configured; running in demo mode");
            (Box::new(demo_backend()), true)
        }
        Err(e) => {
            log::error!("Invalid backend configuration, falling back to demo mode: {e}");
            (Box::new(demo_backend()), true)
        }
    };

    AppState {
        backend,
        dashboard: Mutex::new(DashboardState::new()),
        session: Mutex::new(SessionContext::new()),
        demo,
    }
}

fn demo_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    if let Err(e) = seed_demo_dataset(&backend) {
        log::error!("Failed to seed demo dataset: {e}");
    }
    backend
}

#[tauri::command]
fn backend_mode(state: tauri::State<'_, AppState>) -> BackendMode {
    BackendMode { demo: state.demo }
}

#[tauri::command]
fn refresh_dashboard(state: tauri::State<'_, AppState>) -> Result<DashboardSnapshot, AppError> {
    let mut dashboard = lock_dashboard(&state)?;
    dashboard.refresh(state.backend.as_ref());
    Ok(dashboard.snapshot())
}

#[tauri::command]
fn set_incident_filter(
    state: tauri::State<'_, AppState>,
    search_term: String,
    status: Option<IncidentStatus>,
) -> Result<DashboardSnapshot, AppError> {
    let mut dashboard = lock_dashboard(&state)?;
    dashboard.set_filter(IncidentFilter {
        search_term,
        status,
    });
    Ok(dashboard.snapshot())
}

#[tauri::command]
fn toggle_incident_status(
    state: tauri::State<'_, AppState>,
    id: i64,
) -> Result<Option<IncidentStatus>, AppError> {
    let mut dashboard = lock_dashboard(&state)?;
    Ok(dashboard.toggle_status(state.backend.as_ref(), id))
}

#[tauri::command]
fn export_incidents_csv(state: tauri::State<'_, AppState>) -> Result<String, AppError> {
    let dashboard = lock_dashboard(&state)?;
    incidents_to_csv(&dashboard.visible_incidents())
}

#[tauri::command]
fn report_kinds() -> Vec<ReportKind> {
    vec![ReportKind::Incident, ReportKind::Collision]
}

#[tauri::command]
fn submit_incident_report(
    state: tauri::State<'_, AppState>,
    draft: IncidentReportDraft,
    attachments: Vec<AttachmentUpload>,
) -> Result<SubmissionReceipt, AppError> {
    core_submit_incident_report(state.backend.as_ref(), &draft, &attachments)
}

#[tauri::command]
fn submit_collision_report(
    state: tauri::State<'_, AppState>,
    draft: CollisionReportDraft,
    attachments: Vec<AttachmentUpload>,
) -> Result<SubmissionReceipt, AppError> {
    core_submit_collision_report(state.backend.as_ref(), &draft, &attachments)
}

#[tauri::command]
fn current_user(state: tauri::State<'_, AppState>) -> Result<Option<SessionUser>, AppError> {
    let mut session = lock_session(&state)?;
    session.refresh(state.backend.as_ref())
}

#[tauri::command]
fn sign_out(state: tauri::State<'_, AppState>) -> Result<(), AppError> {
    let mut session = lock_session(&state)?;
    session.sign_out(state.backend.as_ref())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::init();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .manage(init_state())
        .invoke_handler(tauri::generate_handler![
            backend_mode,
            refresh_dashboard,
            set_incident_filter,
            toggle_incident_status,
            export_incidents_csv,
            report_kinds,
            submit_incident_report,
            submit_collision_report,
            current_user,
            sign_out
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application")
}
