use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::backend::{BackendService, INCIDENTS_TABLE};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemoSeedSummary {
    pub inserted: usize,
}

/// Seed a deterministic demo dataset: mixed statuses, severities and resolution times
/// so every dashboard statistic is non-trivial. Used for offline mode and tests.
pub fn seed_demo_dataset(backend: &dyn BackendService) -> Result<DemoSeedSummary, AppError> {
    let nombres = ["Ana Torres", "Luis Mendoza", "Carla Ruiz", "Jorge Palma"];
    let tipos = ["Caída", "Corte", "Golpe", "Atrapamiento"];

    let mut inserted = 0usize;
    for i in 1..=12i64 {
        let nombre = nombres[(i as usize - 1) % nombres.len()];
        let tipo = tipos[(i as usize - 1) % tipos.len()];

        // Two incidents per day across a fixed window, reported at 08:00 and 14:00.
        let day = 1 + (i - 1) / 2;
        let hour = 8 + ((i - 1) % 2) * 6;
        let reported_at = format!("2026-02-{day:02}T{hour:02}:00:00Z");

        let status = if i % 3 == 0 { "Validado" } else { "Pendiente" };
        // Every other incident resolves later the same day, at most 9 hours after report.
        let resolved_at = if i % 2 == 0 {
            Some(format!("2026-02-{day:02}T{:02}:00:00Z", hour + i.min(9)))
        } else {
            None
        };
        let severity = match i % 4 {
            0 => None,
            n => Some(n as f64),
        };

        let mut row = json!({
            "incident_type_id": 1 + (i % 4),
            "tipo_incidente": tipo,
            "description": format!("Incidente de demostración {i}"),
            "fecha_incidente": format!("2026-02-{day:02}"),
            "nombre_colaborador": nombre,
            "region_inc": 1 + (i % 3),
            "sucursal_inc": 100 + i,
            "registrable": i % 2 == 0,
            "status": status,
            "reported_at": reported_at,
        });
        if let Some(obj) = row.as_object_mut() {
            if let Some(resolved_at) = resolved_at {
                obj.insert("resolved_at".to_string(), json!(resolved_at));
            }
            if let Some(severity) = severity {
                obj.insert("severity".to_string(), json!(severity));
            }
        }

        backend.insert_row(INCIDENTS_TABLE, &row)?;
        inserted += 1;
    }

    Ok(DemoSeedSummary { inserted })
}
