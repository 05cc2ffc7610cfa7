use serde::{Deserialize, Serialize};
use std::fmt;

/// Review lifecycle of an incident. Exactly one reversible edge exists between the two
/// states; new records start as `Pendiente` via the backend's column default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IncidentStatus {
    Pendiente,
    Validado,
}

impl IncidentStatus {
    pub fn toggled(self) -> Self {
        match self {
            IncidentStatus::Pendiente => IncidentStatus::Validado,
            IncidentStatus::Validado => IncidentStatus::Pendiente,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IncidentStatus::Pendiente => "Pendiente",
            IncidentStatus::Validado => "Validado",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incident row as consumed by the dashboard.
///
/// Notes:
/// - `reported_at` is server-assigned at insert; `resolved_at` stays null until the
///   incident is resolved and is never unset by this application.
/// - `severity` feeds only the aggregate statistic; missing values count as 0 there.
/// - The `evidencia_*` columns hold object-storage keys patched in after upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub id: i64,
    pub incident_type_id: i64,
    pub tipo_incidente: String,
    pub description: String,
    pub fecha_incidente: String,
    pub nombre_colaborador: String,
    pub region_inc: i64,
    pub sucursal_inc: i64,
    pub registrable: bool,
    pub status: IncidentStatus,
    pub reported_at: String,
    #[serde(default)]
    pub resolved_at: Option<String>,
    #[serde(default)]
    pub severity: Option<f64>,
    #[serde(default)]
    pub evidencia_foto_inc: Option<String>,
    #[serde(default)]
    pub evidencia_doc_inc: Option<String>,
}

/// Authenticated user reflected by the session context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationWarning {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
