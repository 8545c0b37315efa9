use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::types::Incident;

/// Outcome of one reopen attempt.
#[derive(Debug)]
pub enum ReopenOutcome {
    /// The status transition succeeded. The audit comment may still have
    /// failed; that is a warning, not a reopen failure.
    Reopened { comment_error: Option<String> },
    /// The status update failed; the incident remains closed and no comment
    /// was attempted.
    UpdateFailed { error: String },
}

/// What the run did with one incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentAction {
    Reopened,
    Skipped,
    Error,
}

/// Per-incident entry of the run report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDetail {
    pub incident_number: i64,
    pub title: String,
    pub status: String,
    pub classification: String,
    pub reopened: bool,
    pub action: IncidentAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IncidentDetail {
    fn snapshot_classification(incident: &Incident) -> String {
        incident
            .classification
            .map(|c| c.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn skipped(incident: &Incident) -> Self {
        Self {
            incident_number: incident.number,
            title: incident.title.clone(),
            status: incident.status.as_str().to_string(),
            classification: Self::snapshot_classification(incident),
            reopened: false,
            action: IncidentAction::Skipped,
            warning: None,
            error: None,
        }
    }

    pub fn reopened(incident: &Incident, comment_error: Option<String>) -> Self {
        Self {
            incident_number: incident.number,
            title: incident.title.clone(),
            status: "Active".to_string(),
            classification: Self::snapshot_classification(incident),
            reopened: true,
            action: IncidentAction::Reopened,
            warning: comment_error.map(|e| format!("audit comment failed: {e}")),
            error: None,
        }
    }

    pub fn update_failed(incident: &Incident, error: String) -> Self {
        Self {
            incident_number: incident.number,
            title: incident.title.clone(),
            status: incident.status.as_str().to_string(),
            classification: Self::snapshot_classification(incident),
            reopened: false,
            action: IncidentAction::Error,
            warning: None,
            error: Some(error),
        }
    }
}

/// Aggregate result of one remediation run. Produced once per invocation,
/// returned and logged, never persisted.
#[derive(Debug)]
pub struct RunSummary {
    pub workspace: String,
    pub executed_at: DateTime<Utc>,
    /// Incidents visited by the scan (the early exit stops counting at the
    /// window cutoff).
    pub total_analyzed: usize,
    /// Confirmed successful reopens only.
    pub reopened: usize,
    /// Incidents whose status update failed.
    pub failed: usize,
    pub details: Vec<IncidentDetail>,
}
