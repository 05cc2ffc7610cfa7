use crate::domain::Incident;
use crate::error::AppError;

const HEADERS: [&str; 12] = [
    "id",
    "fecha_incidente",
    "nombre_colaborador",
    "tipo_incidente",
    "description",
    "region_inc",
    "sucursal_inc",
    "registrable",
    "status",
    "reported_at",
    "resolved_at",
    "severity",
];

/// Render the (already filtered) incident list as CSV with a stable column order.
/// Boolean and enum columns use the same display strings as the dashboard table.
pub fn incidents_to_csv(incidents: &[Incident]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(HEADERS).map_err(|e| {
        AppError::new("EXPORT_CSV_FAILED", "Failed to write CSV header").with_details(e.to_string())
    })?;

    for inc in incidents {
        let registrable = if inc.registrable {
            "Registrable"
        } else {
            "No Registrable"
        };
        let severity = inc.severity.map(|s| s.to_string()).unwrap_or_default();
        writer
            .write_record([
                inc.id.to_string().as_str(),
                &inc.fecha_incidente,
                &inc.nombre_colaborador,
                &inc.tipo_incidente,
                &inc.description,
                inc.region_inc.to_string().as_str(),
                inc.sucursal_inc.to_string().as_str(),
                registrable,
                inc.status.as_str(),
                &inc.reported_at,
                inc.resolved_at.as_deref().unwrap_or(""),
                &severity,
            ])
            .map_err(|e| {
                AppError::new("EXPORT_CSV_FAILED", "Failed to write CSV row")
                    .with_details(e.to_string())
            })?;
    }

    let bytes = writer.into_inner().map_err(|e| {
        AppError::new("EXPORT_CSV_FAILED", "Failed to flush CSV output")
            .with_details(e.to_string())
    })?;
    String::from_utf8(bytes).map_err(|e| {
        AppError::new("EXPORT_CSV_FAILED", "CSV output was not valid UTF-8")
            .with_details(e.to_string())
    })
}
