use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::backend::{BackendService, COLLISIONS_TABLE, INCIDENTS_TABLE, REPORTS_BUCKET};
use crate::error::AppError;

/// The two intake variants offered by the report selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReportKind {
    Incident,
    Collision,
}

impl ReportKind {
    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Incident => "Incident",
            ReportKind::Collision => "Collision",
        }
    }
}

/// A file picked in a form, pending upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentUpload {
    /// Column patched with the storage key once the blob is uploaded.
    pub field_name: String,
    /// Original client-side file name; only its extension survives.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Full incident report field set (the richer form variant).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentReportDraft {
    pub incident_type_id: i64,
    pub description: String,
    pub fecha_incidente: String,
    pub tipo_incidente: String,
    pub probabilidad_pot: String,
    pub severidad_pot: String,
    pub criterio_sifp: String,
    pub nombre_colaborador: String,
    pub region_inc: i64,
    pub sucursal_inc: i64,
    pub proceso: i64,
    pub subproceso_inc: i64,
    pub sub_subproceso: String,
    pub dias_incapacidad: i64,
    pub mecanismo: String,
    pub otros: String,
    pub parte_afectada: String,
    pub dentro_fuera: bool,
    pub interno_imss: bool,
    pub resumen: String,
    pub conclusion: String,
    pub ko: String,
    pub registrable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollisionReportDraft {
    pub sucursal: String,
    pub subproceso: String,
    pub tipo_colision: String,
    pub fecha: String,
    pub dias_incapacidad: i64,
    pub atencion_imss: bool,
}

impl IncidentReportDraft {
    fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("tipo_incidente", &self.tipo_incidente),
            ("fecha_incidente", &self.fecha_incidente),
            ("nombre_colaborador", &self.nombre_colaborador),
            ("description", &self.description),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        missing
    }
}

impl CollisionReportDraft {
    fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("sucursal", &self.sucursal),
            ("subproceso", &self.subproceso),
            ("tipo_colision", &self.tipo_colision),
            ("fecha", &self.fecha),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        missing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredAttachment {
    pub field_name: String,
    pub object_name: String,
    /// Hex sha256 of the uploaded bytes, recorded for audit.
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentFailure {
    pub field_name: String,
    pub error: AppError,
}

/// Outcome of a submission whose structured insert succeeded. Attachment failures do
/// not roll the record back; the form resets only when [`Self::is_complete`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionReceipt {
    pub kind: ReportKind,
    pub record_id: i64,
    pub stored: Vec<StoredAttachment>,
    pub failed: Vec<AttachmentFailure>,
    /// Single human-readable message shown in the form.
    pub message: String,
}

impl SubmissionReceipt {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Storage key for an uploaded attachment: record id, column name, submission
/// timestamp, original extension.
pub fn storage_object_name(record_id: i64, field_name: &str, millis: i64, file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("{record_id}-{field_name}-{millis}.{ext}"),
        _ => format!("{record_id}-{field_name}-{millis}"),
    }
}

fn now_unix_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn validate_required(kind: ReportKind, missing: Vec<&'static str>) -> Result<(), AppError> {
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::new(
        "INTAKE_MISSING_FIELDS",
        format!("{} report is missing required fields", kind.label()),
    )
    .with_details(missing.join(", ")))
}

/// Phase 2 of a submission: for each present attachment independently, upload the blob
/// and patch the record with the storage key. A failure at either step leaves the
/// record without that reference and is reported; the other attachment is still tried.
fn store_attachments(
    backend: &dyn BackendService,
    table: &str,
    record_id: i64,
    attachments: &[AttachmentUpload],
) -> (Vec<StoredAttachment>, Vec<AttachmentFailure>) {
    let millis = now_unix_millis();
    let mut stored = Vec::new();
    let mut failed = Vec::new();

    for attachment in attachments {
        let object_name =
            storage_object_name(record_id, &attachment.field_name, millis, &attachment.file_name);

        let mut patch = Map::new();
        patch.insert(
            attachment.field_name.clone(),
            Value::from(object_name.clone()),
        );

        let result = backend
            .upload_object(REPORTS_BUCKET, &object_name, &attachment.bytes)
            .and_then(|()| backend.update_row(table, record_id, &Value::Object(patch)));

        match result {
            Ok(()) => {
                let sha256 = hex::encode(Sha256::digest(&attachment.bytes));
                stored.push(StoredAttachment {
                    field_name: attachment.field_name.clone(),
                    object_name,
                    sha256,
                });
            }
            Err(error) => {
                log::error!(
                    "Error storing attachment {} for record {record_id}: {error}",
                    attachment.field_name
                );
                failed.push(AttachmentFailure {
                    field_name: attachment.field_name.clone(),
                    error,
                });
            }
        }
    }

    (stored, failed)
}

fn build_receipt(
    kind: ReportKind,
    record_id: i64,
    stored: Vec<StoredAttachment>,
    failed: Vec<AttachmentFailure>,
) -> SubmissionReceipt {
    let message = if failed.is_empty() {
        format!("{} report submitted successfully!", kind.label())
    } else {
        failed
            .iter()
            .map(|f| f.error.user_message())
            .collect::<Vec<_>>()
            .join("; ")
    };

    SubmissionReceipt {
        kind,
        record_id,
        stored,
        failed,
        message,
    }
}

fn submit(
    backend: &dyn BackendService,
    kind: ReportKind,
    table: &str,
    row: serde_json::Value,
    attachments: &[AttachmentUpload],
) -> Result<SubmissionReceipt, AppError> {
    // Phase 1: insert the structured record. The server assigns id, reported_at and
    // the pending status default. No rollback happens if phase 2 fails.
    let record_id = backend.insert_row(table, &row)?;

    let (stored, failed) = store_attachments(backend, table, record_id, attachments);
    Ok(build_receipt(kind, record_id, stored, failed))
}

pub fn submit_incident_report(
    backend: &dyn BackendService,
    draft: &IncidentReportDraft,
    attachments: &[AttachmentUpload],
) -> Result<SubmissionReceipt, AppError> {
    validate_required(ReportKind::Incident, draft.missing_required_fields())?;
    let row = serde_json::to_value(draft).map_err(|e| {
        AppError::new("INTAKE_ENCODE_FAILED", "Failed to encode incident report")
            .with_details(e.to_string())
    })?;
    submit(backend, ReportKind::Incident, INCIDENTS_TABLE, row, attachments)
}

pub fn submit_collision_report(
    backend: &dyn BackendService,
    draft: &CollisionReportDraft,
    attachments: &[AttachmentUpload],
) -> Result<SubmissionReceipt, AppError> {
    validate_required(ReportKind::Collision, draft.missing_required_fields())?;
    let row = serde_json::to_value(draft).map_err(|e| {
        AppError::new("INTAKE_ENCODE_FAILED", "Failed to encode collision report")
            .with_details(e.to_string())
    })?;
    submit(backend, ReportKind::Collision, COLLISIONS_TABLE, row, attachments)
}
