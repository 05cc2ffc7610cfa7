use serde::{Deserialize, Serialize};

use crate::domain::{Incident, IncidentStatus};

/// Search/filter controls above the incident table. Applied synchronously to the
/// in-memory list on every change; never triggers a refetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentFilter {
    pub search_term: String,
    pub status: Option<IncidentStatus>,
}

impl IncidentFilter {
    /// A record stays visible when the search term is a case-insensitive substring of
    /// the collaborator name, the incident type, or the description, AND the status
    /// filter is unset or matches exactly.
    pub fn matches(&self, incident: &Incident) -> bool {
        let term = self.search_term.to_lowercase();
        let text_match = term.is_empty()
            || incident.nombre_colaborador.to_lowercase().contains(&term)
            || incident.tipo_incidente.to_lowercase().contains(&term)
            || incident.description.to_lowercase().contains(&term);

        let status_match = match self.status {
            None => true,
            Some(status) => incident.status == status,
        };

        text_match && status_match
    }
}

pub fn filter_incidents(incidents: &[Incident], filter: &IncidentFilter) -> Vec<Incident> {
    incidents
        .iter()
        .filter(|inc| filter.matches(inc))
        .cloned()
        .collect()
}
