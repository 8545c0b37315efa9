use crate::store::types::{Classification, Incident, IncidentStatus};

/// Reopening criteria: closed without a definitive resolution and nobody
/// assigned. Both invocation paths reach this predicate through the shared
/// orchestrator, so the criteria cannot drift between them.
pub fn is_eligible(incident: &Incident) -> bool {
    incident.status == IncidentStatus::Closed
        && incident.classification == Some(Classification::Undetermined)
        && incident
            .owner
            .as_ref()
            .map_or(true, |owner| owner.is_unassigned())
}
