use pretty_assertions::assert_eq;

use irp_core::domain::{Incident, IncidentStatus};
use irp_core::filter::{filter_incidents, IncidentFilter};
use irp_core::stats::{average_response_time_hours, severity_rate};

fn incident(id: i64, nombre: &str, tipo: &str, description: &str, status: IncidentStatus) -> Incident {
    Incident {
        id,
        incident_type_id: 1,
        tipo_incidente: tipo.to_string(),
        description: description.to_string(),
        fecha_incidente: "2026-02-01".to_string(),
        nombre_colaborador: nombre.to_string(),
        region_inc: 1,
        sucursal_inc: 101,
        registrable: false,
        status,
        reported_at: "2026-02-01T08:00:00Z".to_string(),
        resolved_at: None,
        severity: None,
        evidencia_foto_inc: None,
        evidencia_doc_inc: None,
    }
}

#[test]
fn average_response_time_over_empty_resolved_subset_is_zero() {
    let incidents = vec![
        incident(1, "Ana", "Caída", "piso mojado", IncidentStatus::Pendiente),
        incident(2, "Luis", "Corte", "herramienta", IncidentStatus::Validado),
    ];
    let (avg, warnings) = average_response_time_hours(&incidents);
    assert_eq!(avg, 0.0);
    assert!(warnings.is_empty());
}

#[test]
fn average_response_time_is_the_mean_of_per_record_deltas_in_hours() {
    let mut a = incident(1, "Ana", "Caída", "d", IncidentStatus::Pendiente);
    a.resolved_at = Some("2026-02-01T10:00:00Z".to_string()); // 2h
    let mut b = incident(2, "Luis", "Corte", "d", IncidentStatus::Validado);
    b.resolved_at = Some("2026-02-01T12:00:00Z".to_string()); // 4h
    let unresolved = incident(3, "Carla", "Golpe", "d", IncidentStatus::Pendiente);

    let (avg, warnings) = average_response_time_hours(&[a, b, unresolved]);
    assert_eq!(avg, 3.0);
    assert!(warnings.is_empty());
}

#[test]
fn average_response_time_rounds_to_two_decimals() {
    let mut a = incident(1, "Ana", "Caída", "d", IncidentStatus::Pendiente);
    a.resolved_at = Some("2026-02-01T09:40:00Z".to_string()); // 100 minutes
    let (avg, _) = average_response_time_hours(&[a]);
    assert_eq!(avg, 1.67);
}

#[test]
fn unparseable_timestamps_are_skipped_with_a_warning() {
    let mut a = incident(1, "Ana", "Caída", "d", IncidentStatus::Pendiente);
    a.resolved_at = Some("not-a-timestamp".to_string());
    let mut b = incident(2, "Luis", "Corte", "d", IncidentStatus::Validado);
    b.resolved_at = Some("2026-02-01T09:00:00Z".to_string()); // 1h

    let (avg, warnings) = average_response_time_hours(&[a, b]);
    assert_eq!(avg, 1.0);
    assert!(warnings.iter().any(|w| w.code == "STATS_TS_PARSE_FAILED"));
}

#[test]
fn severity_rate_treats_missing_severity_as_zero() {
    let mut a = incident(1, "Ana", "Caída", "d", IncidentStatus::Pendiente);
    a.severity = Some(2.0);
    let b = incident(2, "Luis", "Corte", "d", IncidentStatus::Validado);
    let mut c = incident(3, "Carla", "Golpe", "d", IncidentStatus::Pendiente);
    c.severity = Some(4.0);

    assert_eq!(severity_rate(&[a, b, c]), 2.0);
    assert_eq!(severity_rate(&[]), 0.0);
}

#[test]
fn empty_filter_is_the_identity() {
    let incidents = vec![
        incident(1, "Ana", "Caída", "piso mojado", IncidentStatus::Pendiente),
        incident(2, "Luis", "Corte", "herramienta", IncidentStatus::Validado),
    ];
    let out = filter_incidents(&incidents, &IncidentFilter::default());
    assert_eq!(out, incidents);
}

#[test]
fn search_is_case_insensitive() {
    let incidents = vec![incident(1, "Ana", "Caída", "d", IncidentStatus::Pendiente)];
    let filter = IncidentFilter {
        search_term: "ana".to_string(),
        status: None,
    };
    assert_eq!(filter_incidents(&incidents, &filter).len(), 1);
}

#[test]
fn search_matches_any_of_the_three_text_fields() {
    let incidents = vec![
        incident(1, "Ana", "Caída", "escalera sin barandal", IncidentStatus::Pendiente),
        incident(2, "Luis", "Corte", "herramienta", IncidentStatus::Pendiente),
    ];
    let filter = IncidentFilter {
        search_term: "barandal".to_string(),
        status: None,
    };
    let out = filter_incidents(&incidents, &filter);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, 1);
}

#[test]
fn status_filter_keeps_exact_matches_only() {
    let incidents = vec![
        incident(1, "Ana", "Caída", "d", IncidentStatus::Pendiente),
        incident(2, "Luis", "Corte", "d", IncidentStatus::Validado),
    ];
    let filter = IncidentFilter {
        search_term: String::new(),
        status: Some(IncidentStatus::Validado),
    };
    let out = filter_incidents(&incidents, &filter);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, 2);
}
