use pretty_assertions::assert_eq;
use sha2::{Digest, Sha256};

use irp_core::backend::memory::MemoryBackend;
use irp_core::backend::{BackendService, COLLISIONS_TABLE, REPORTS_BUCKET};
use irp_core::error::AppError;
use irp_core::intake::{
    submit_collision_report, submit_incident_report, AttachmentUpload, CollisionReportDraft,
    IncidentReportDraft,
};

fn incident_draft() -> IncidentReportDraft {
    IncidentReportDraft {
        incident_type_id: 3,
        description: "Caída en rampa de carga".to_string(),
        fecha_incidente: "2026-02-10".to_string(),
        tipo_incidente: "Caída".to_string(),
        probabilidad_pot: "Media".to_string(),
        severidad_pot: "Alta".to_string(),
        criterio_sifp: "C2".to_string(),
        nombre_colaborador: "Ana Torres".to_string(),
        region_inc: 2,
        sucursal_inc: 114,
        proceso: 5,
        subproceso_inc: 12,
        sub_subproceso: "Recepción".to_string(),
        dias_incapacidad: 3,
        mecanismo: "Resbalón".to_string(),
        otros: String::new(),
        parte_afectada: "Tobillo".to_string(),
        dentro_fuera: true,
        interno_imss: false,
        resumen: "Resbalón por piso húmedo".to_string(),
        conclusion: "Señalizar zona".to_string(),
        ko: String::new(),
        registrable: true,
    }
}

fn collision_draft() -> CollisionReportDraft {
    CollisionReportDraft {
        sucursal: "Norte 4".to_string(),
        subproceso: "Reparto".to_string(),
        tipo_colision: "Alcance".to_string(),
        fecha: "2026-02-11".to_string(),
        dias_incapacidad: 0,
        atencion_imss: false,
    }
}

fn foto() -> AttachmentUpload {
    AttachmentUpload {
        field_name: "evidencia_foto_inc".to_string(),
        file_name: "rampa.jpg".to_string(),
        bytes: b"jpeg-bytes".to_vec(),
    }
}

fn doc() -> AttachmentUpload {
    AttachmentUpload {
        field_name: "evidencia_doc_inc".to_string(),
        file_name: "acta.pdf".to_string(),
        bytes: b"pdf-bytes".to_vec(),
    }
}

#[test]
fn submission_without_attachments_persists_one_clean_record() {
    let backend = MemoryBackend::new();
    let receipt = submit_incident_report(&backend, &incident_draft(), &[]).unwrap();

    assert!(receipt.is_complete());
    assert_eq!(receipt.message, "Incident report submitted successfully!");

    let incidents = backend.list_incidents().unwrap();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].id, receipt.record_id);
    assert_eq!(incidents[0].evidencia_foto_inc, None);
    assert_eq!(incidents[0].evidencia_doc_inc, None);
}

#[test]
fn stored_attachment_patches_the_record_and_uploads_the_blob() {
    let backend = MemoryBackend::new();
    let receipt = submit_incident_report(&backend, &incident_draft(), &[foto()]).unwrap();

    assert!(receipt.is_complete());
    assert_eq!(receipt.stored.len(), 1);
    let stored = &receipt.stored[0];
    assert!(stored
        .object_name
        .starts_with(&format!("{}-evidencia_foto_inc-", receipt.record_id)));
    assert!(stored.object_name.ends_with(".jpg"));
    assert_eq!(stored.sha256, hex::encode(Sha256::digest(b"jpeg-bytes")));

    let incidents = backend.list_incidents().unwrap();
    assert_eq!(
        incidents[0].evidencia_foto_inc.as_deref(),
        Some(stored.object_name.as_str())
    );
    assert_eq!(
        backend.object(REPORTS_BUCKET, &stored.object_name).unwrap(),
        Some(b"jpeg-bytes".to_vec())
    );
}

#[test]
fn failed_upload_leaves_the_record_without_that_reference() {
    let backend = MemoryBackend::new();
    backend
        .fail_next_upload(AppError::new("STORAGE_UPLOAD_FAILED", "bucket unavailable"))
        .unwrap();

    let receipt = submit_incident_report(&backend, &incident_draft(), &[foto()]).unwrap();
    assert!(!receipt.is_complete());
    assert_eq!(receipt.failed.len(), 1);
    assert!(receipt.message.starts_with("Error: bucket unavailable"));
    assert!(receipt.message.contains("STORAGE_UPLOAD_FAILED"));

    // Phase 1 is not rolled back.
    let incidents = backend.list_incidents().unwrap();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].nombre_colaborador, "Ana Torres");
    assert_eq!(incidents[0].evidencia_foto_inc, None);
}

#[test]
fn each_attachment_is_attempted_independently() {
    let backend = MemoryBackend::new();
    backend
        .fail_next_upload(AppError::new("STORAGE_UPLOAD_FAILED", "bucket unavailable"))
        .unwrap();

    let receipt = submit_incident_report(&backend, &incident_draft(), &[foto(), doc()]).unwrap();
    assert_eq!(receipt.failed.len(), 1);
    assert_eq!(receipt.failed[0].field_name, "evidencia_foto_inc");
    assert_eq!(receipt.stored.len(), 1);
    assert_eq!(receipt.stored[0].field_name, "evidencia_doc_inc");

    let incidents = backend.list_incidents().unwrap();
    assert_eq!(incidents[0].evidencia_foto_inc, None);
    assert!(incidents[0].evidencia_doc_inc.is_some());
}

#[test]
fn failed_insert_surfaces_the_error_and_persists_nothing() {
    let backend = MemoryBackend::new();
    backend
        .fail_next_insert(AppError::new("BACKEND_WRITE_FAILED", "row violates policy"))
        .unwrap();

    let err = submit_incident_report(&backend, &incident_draft(), &[foto()]).unwrap_err();
    assert_eq!(err.code, "BACKEND_WRITE_FAILED");
    assert!(backend.list_incidents().unwrap().is_empty());
}

#[test]
fn missing_required_fields_are_rejected_before_any_write() {
    let backend = MemoryBackend::new();
    let mut draft = incident_draft();
    draft.nombre_colaborador = "  ".to_string();

    let err = submit_incident_report(&backend, &draft, &[]).unwrap_err();
    assert_eq!(err.code, "INTAKE_MISSING_FIELDS");
    assert!(err.details.unwrap().contains("nombre_colaborador"));
    assert!(backend.list_incidents().unwrap().is_empty());
}

#[test]
fn collision_reports_land_in_their_own_table() {
    let backend = MemoryBackend::new();
    let report = AttachmentUpload {
        field_name: "report_file".to_string(),
        file_name: "parte.pdf".to_string(),
        bytes: b"pdf".to_vec(),
    };
    let receipt = submit_collision_report(&backend, &collision_draft(), &[report]).unwrap();
    assert!(receipt.is_complete());

    let rows = backend.rows(COLLISIONS_TABLE).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["tipo_colision"], "Alcance");
    let key = rows[0]["report_file"].as_str().unwrap();
    assert!(key.starts_with(&format!("{}-report_file-", receipt.record_id)));
    assert!(key.ends_with(".pdf"));

    // Collision reports never show up on the incident dashboard.
    assert!(backend.list_incidents().unwrap().is_empty());
}
