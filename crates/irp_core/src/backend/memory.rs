use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::backend::{BackendService, INCIDENTS_TABLE};
use crate::domain::{Incident, IncidentStatus, SessionUser};
use crate::error::AppError;

/// In-memory stand-in for the hosted backend.
///
/// Mimics the service-side behavior the application relies on: id assignment,
/// `reported_at` stamping and the `Pendiente` status default for incident rows
/// (defaults apply only when the column is absent, like a column DEFAULT). Single
/// failures can be injected per write capability to exercise the partial-failure paths.
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    tables: BTreeMap<String, Vec<(i64, Value)>>,
    objects: BTreeMap<String, Vec<u8>>,
    user: Option<SessionUser>,
    fail_insert: Option<AppError>,
    fail_update: Option<AppError>,
    fail_upload: Option<AppError>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::new("BACKEND_STATE_POISONED", "Backend state lock poisoned"))
    }

    pub fn set_user(&self, user: Option<SessionUser>) -> Result<(), AppError> {
        self.lock()?.user = user;
        Ok(())
    }

    /// Make the next insert fail with `err`; subsequent inserts succeed again.
    pub fn fail_next_insert(&self, err: AppError) -> Result<(), AppError> {
        self.lock()?.fail_insert = Some(err);
        Ok(())
    }

    pub fn fail_next_update(&self, err: AppError) -> Result<(), AppError> {
        self.lock()?.fail_update = Some(err);
        Ok(())
    }

    pub fn fail_next_upload(&self, err: AppError) -> Result<(), AppError> {
        self.lock()?.fail_upload = Some(err);
        Ok(())
    }

    /// Raw rows of a table, for assertions on persisted state.
    pub fn rows(&self, table: &str) -> Result<Vec<Value>, AppError> {
        Ok(self
            .lock()?
            .tables
            .get(table)
            .map(|rows| rows.iter().map(|(_, v)| v.clone()).collect())
            .unwrap_or_default())
    }

    /// Stored object bytes, if the blob was uploaded.
    pub fn object(&self, bucket: &str, name: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.lock()?.objects.get(&format!("{bucket}/{name}")).cloned())
    }
}

fn now_rfc3339() -> Result<String, AppError> {
    OffsetDateTime::now_utc().format(&Rfc3339).map_err(|e| {
        AppError::new("BACKEND_TIME_FAILED", "Failed to format current time")
            .with_details(e.to_string())
    })
}

impl BackendService for MemoryBackend {
    fn list_incidents(&self) -> Result<Vec<Incident>, AppError> {
        let inner = self.lock()?;
        let mut out = Vec::new();
        for (_, row) in inner.tables.get(INCIDENTS_TABLE).into_iter().flatten() {
            let incident: Incident = serde_json::from_value(row.clone()).map_err(|e| {
                AppError::new("BACKEND_ROW_DECODE_FAILED", "Failed to decode incident row")
                    .with_details(e.to_string())
            })?;
            out.push(incident);
        }
        // RFC3339 UTC strings sort chronologically as text.
        out.sort_by(|a, b| b.reported_at.cmp(&a.reported_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    fn count_incidents(&self, status: Option<IncidentStatus>) -> Result<i64, AppError> {
        let inner = self.lock()?;
        let rows = inner.tables.get(INCIDENTS_TABLE);
        let count = rows
            .into_iter()
            .flatten()
            .filter(|(_, row)| match status {
                None => true,
                Some(s) => row.get("status").and_then(Value::as_str) == Some(s.as_str()),
            })
            .count();
        Ok(count as i64)
    }

    fn insert_row(&self, table: &str, row: &Value) -> Result<i64, AppError> {
        let mut inner = self.lock()?;
        if let Some(err) = inner.fail_insert.take() {
            return Err(err);
        }

        let mut stored = row.clone();
        let obj = stored.as_object_mut().ok_or_else(|| {
            AppError::new("BACKEND_ROW_INVALID", "Inserted row must be a JSON object")
        })?;

        let id = inner.next_id;
        inner.next_id += 1;
        obj.insert("id".to_string(), Value::from(id));
        if table == INCIDENTS_TABLE {
            if !obj.contains_key("reported_at") {
                obj.insert("reported_at".to_string(), Value::from(now_rfc3339()?));
            }
            if !obj.contains_key("status") {
                obj.insert(
                    "status".to_string(),
                    Value::from(IncidentStatus::Pendiente.as_str()),
                );
            }
        }

        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .push((id, stored));
        Ok(id)
    }

    fn update_row(&self, table: &str, id: i64, patch: &Value) -> Result<(), AppError> {
        let mut inner = self.lock()?;
        if let Some(err) = inner.fail_update.take() {
            return Err(err);
        }

        let patch_obj = patch.as_object().ok_or_else(|| {
            AppError::new("BACKEND_ROW_INVALID", "Update patch must be a JSON object")
        })?;

        let rows = inner.tables.get_mut(table).ok_or_else(|| {
            AppError::new("BACKEND_ROW_NOT_FOUND", "No such table")
                .with_details(format!("table={table}"))
        })?;
        let row = rows
            .iter_mut()
            .find(|(row_id, _)| *row_id == id)
            .map(|(_, v)| v)
            .ok_or_else(|| {
                AppError::new("BACKEND_ROW_NOT_FOUND", "No row with the given id")
                    .with_details(format!("table={table}; id={id}"))
            })?;

        if let Some(obj) = row.as_object_mut() {
            for (k, v) in patch_obj {
                obj.insert(k.clone(), v.clone());
            }
        }
        Ok(())
    }

    fn upload_object(&self, bucket: &str, name: &str, bytes: &[u8]) -> Result<(), AppError> {
        let mut inner = self.lock()?;
        if let Some(err) = inner.fail_upload.take() {
            return Err(err);
        }
        inner
            .objects
            .insert(format!("{bucket}/{name}"), bytes.to_vec());
        Ok(())
    }

    fn current_user(&self) -> Result<Option<SessionUser>, AppError> {
        Ok(self.lock()?.user.clone())
    }

    fn sign_out(&self) -> Result<(), AppError> {
        self.lock()?.user = None;
        Ok(())
    }
}
