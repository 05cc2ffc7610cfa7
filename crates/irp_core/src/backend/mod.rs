use serde_json::Value;

use crate::domain::{Incident, IncidentStatus, SessionUser};
use crate::error::AppError;

pub mod memory;

/// Table holding incident reports (the richer dashboard variant).
pub const INCIDENTS_TABLE: &str = "incidents";
/// Table holding collision reports.
pub const COLLISIONS_TABLE: &str = "colisiones";
/// Logical bucket for uploaded report evidence.
pub const REPORTS_BUCKET: &str = "incident-reports";

/// Capability surface of the hosted backend-as-a-service.
///
/// Everything non-trivial (row storage, file storage, sessions) is delegated through
/// this interface; the application holds no authoritative copy of any data. One handle
/// is constructed at startup and passed by reference to all collaborators, so tests can
/// substitute [`memory::MemoryBackend`] for the hosted service.
pub trait BackendService: Send + Sync {
    /// All incident columns, ordered by `reported_at` descending.
    fn list_incidents(&self) -> Result<Vec<Incident>, AppError>;

    /// Count-only read, with an optional status equality filter.
    fn count_incidents(&self, status: Option<IncidentStatus>) -> Result<i64, AppError>;

    /// Insert one record; returns the assigned id. Server-side defaults fill
    /// `reported_at` and `status` when absent from the row.
    fn insert_row(&self, table: &str, row: &Value) -> Result<i64, AppError>;

    /// Patch a record by id with a partial field set.
    fn update_row(&self, table: &str, id: i64, patch: &Value) -> Result<(), AppError>;

    /// Upload a named blob; it is referenced later only by this name.
    fn upload_object(&self, bucket: &str, name: &str, bytes: &[u8]) -> Result<(), AppError>;

    /// Current session user, if any.
    fn current_user(&self) -> Result<Option<SessionUser>, AppError>;

    fn sign_out(&self) -> Result<(), AppError>;
}
