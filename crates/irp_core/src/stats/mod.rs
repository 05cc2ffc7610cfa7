use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::backend::BackendService;
use crate::domain::{Incident, IncidentStatus, ValidationWarning};
use crate::error::AppError;

/// The four summary cards at the top of the dashboard.
///
/// Every statistic is always a number: empty denominators yield 0, never NaN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub total_incidents: i64,
    pub active_incidents: i64,
    pub average_response_time_hours: f64,
    pub severity_rate: f64,
}

impl Default for DashboardStats {
    fn default() -> Self {
        Self {
            total_incidents: 0,
            active_incidents: 0,
            average_response_time_hours: 0.0,
            severity_rate: 0.0,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn parse_ts(
    field: &str,
    value: &str,
    warnings: &mut Vec<ValidationWarning>,
) -> Option<OffsetDateTime> {
    match OffsetDateTime::parse(value, &Rfc3339) {
        Ok(dt) => Some(dt),
        Err(e) => {
            warnings.push(
                ValidationWarning::new(
                    "STATS_TS_PARSE_FAILED",
                    format!("Failed to parse {field} for response-time statistic"),
                )
                .with_details(format!("value={value}; err={e}")),
            );
            None
        }
    }
}

/// Mean of `(resolved_at - reported_at)` in hours over resolved incidents, rounded to
/// two decimals. Records with unparseable timestamps are skipped with a warning rather
/// than silently guessed; an empty resolved subset yields 0.
pub fn average_response_time_hours(incidents: &[Incident]) -> (f64, Vec<ValidationWarning>) {
    let mut warnings = Vec::new();
    let mut sum_hours = 0.0;
    let mut resolved = 0usize;

    for inc in incidents {
        let Some(resolved_at) = inc.resolved_at.as_deref() else {
            continue;
        };
        let (Some(reported), Some(resolved_ts)) = (
            parse_ts("reported_at", &inc.reported_at, &mut warnings),
            parse_ts("resolved_at", resolved_at, &mut warnings),
        ) else {
            continue;
        };
        let delta = resolved_ts - reported;
        sum_hours += delta.whole_seconds() as f64 / 3600.0;
        resolved += 1;
    }

    if resolved == 0 {
        return (0.0, warnings);
    }
    (round2(sum_hours / resolved as f64), warnings)
}

/// Mean severity across all records, treating a missing value as 0, rounded to two
/// decimals; 0 for an empty set.
pub fn severity_rate(incidents: &[Incident]) -> f64 {
    if incidents.is_empty() {
        return 0.0;
    }
    let sum: f64 = incidents.iter().map(|i| i.severity.unwrap_or(0.0)).sum();
    round2(sum / incidents.len() as f64)
}

/// Compute the four dashboard statistics the way the page does: the two counts through
/// count-only queries, the two means over an independent full fetch.
pub fn fetch_dashboard_stats(
    backend: &dyn BackendService,
) -> Result<(DashboardStats, Vec<ValidationWarning>), AppError> {
    let total_incidents = backend.count_incidents(None)?;
    let active_incidents = backend.count_incidents(Some(IncidentStatus::Pendiente))?;

    let incidents = backend.list_incidents()?;
    let (average_response_time_hours, warnings) = average_response_time_hours(&incidents);
    let severity_rate = severity_rate(&incidents);

    Ok((
        DashboardStats {
            total_incidents,
            active_incidents,
            average_response_time_hours,
            severity_rate,
        },
        warnings,
    ))
}
