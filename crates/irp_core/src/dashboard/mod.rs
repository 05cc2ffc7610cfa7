use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::backend::{BackendService, INCIDENTS_TABLE};
use crate::domain::{Incident, IncidentStatus, ValidationWarning};
use crate::filter::{filter_incidents, IncidentFilter};
use crate::stats::{fetch_dashboard_stats, DashboardStats};

/// What the dashboard page renders after a refresh or a filter change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub incidents: Vec<Incident>,
    pub warnings: Vec<ValidationWarning>,
}

/// Read cache behind the dashboard. The backend is the single source of truth; this
/// list is invalidated only by an explicit [`DashboardState::refresh`].
#[derive(Default)]
pub struct DashboardState {
    incidents: Vec<Incident>,
    stats: DashboardStats,
    warnings: Vec<ValidationWarning>,
    filter: IncidentFilter,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refetch the incident list and the four statistics. Fetch failures go to the
    /// diagnostic log and leave the stale data in place; returns whether both fetches
    /// succeeded.
    pub fn refresh(&mut self, backend: &dyn BackendService) -> bool {
        let mut refreshed = true;

        match backend.list_incidents() {
            Ok(incidents) => self.incidents = incidents,
            Err(e) => {
                log::error!("Error fetching incidents: {e}");
                refreshed = false;
            }
        }

        match fetch_dashboard_stats(backend) {
            Ok((stats, warnings)) => {
                self.stats = stats;
                self.warnings = warnings;
            }
            Err(e) => {
                log::error!("Error fetching incident stats: {e}");
                refreshed = false;
            }
        }

        refreshed
    }

    pub fn set_filter(&mut self, filter: IncidentFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> &IncidentFilter {
        &self.filter
    }

    /// The cached list with the current filter applied.
    pub fn visible_incidents(&self) -> Vec<Incident> {
        filter_incidents(&self.incidents, &self.filter)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            stats: self.stats.clone(),
            incidents: self.visible_incidents(),
            warnings: self.warnings.clone(),
        }
    }

    /// Flip the review status of one record: `Pendiente` <-> `Validado`.
    ///
    /// The update is scoped by id; on success the local copy is updated optimistically
    /// and the new status returned. On failure the local state is left unchanged and
    /// the error is only logged. Unknown ids return `None`.
    pub fn toggle_status(
        &mut self,
        backend: &dyn BackendService,
        id: i64,
    ) -> Option<IncidentStatus> {
        let current = self.incidents.iter().find(|i| i.id == id)?.status;
        let next = current.toggled();

        match backend.update_row(INCIDENTS_TABLE, id, &json!({ "status": next.as_str() })) {
            Ok(()) => {
                if let Some(incident) = self.incidents.iter_mut().find(|i| i.id == id) {
                    incident.status = next;
                }
                Some(next)
            }
            Err(e) => {
                log::error!("Error updating incident status: {e}");
                None
            }
        }
    }
}
