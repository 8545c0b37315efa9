use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

use crate::server::AppState;
use crate::workflow;
use crate::workflow::types::{IncidentDetail, RunSummary};

/// Fixed criteria block echoed in every success response.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Criteria {
    pub status: &'static str,
    pub assignment: &'static str,
    pub classification: &'static str,
}

pub const CRITERIA: Criteria = Criteria {
    status: "Closed",
    assignment: "Unassigned",
    classification: "Undetermined",
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReopenResponse {
    pub success: bool,
    pub message: String,
    pub summary: SummaryBody,
    pub criteria: Criteria,
    pub incident_details: Vec<IncidentDetail>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBody {
    pub total_incidents_analyzed: usize,
    pub incidents_reopened: usize,
    pub execution_time: String,
    pub sentinel_workspace: String,
}

impl ReopenResponse {
    pub fn from_summary(summary: RunSummary) -> Self {
        let message = if summary.total_analyzed == 0 {
            "No closed incidents found in the lookback window".to_string()
        } else if summary.reopened == 0 {
            format!(
                "Analyzed {} incidents, none required reopening",
                summary.total_analyzed
            )
        } else {
            format!(
                "Reopened {} of {} incidents analyzed",
                summary.reopened, summary.total_analyzed
            )
        };

        Self {
            success: true,
            message,
            summary: SummaryBody {
                total_incidents_analyzed: summary.total_analyzed,
                incidents_reopened: summary.reopened,
                execution_time: summary
                    .executed_at
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
                sentinel_workspace: summary.workspace,
            },
            criteria: CRITERIA,
            incident_details: summary.details,
        }
    }
}

/// Request-triggered invocation. Partial success is always a 200 with
/// per-incident actions; only run-fatal errors produce a 500.
pub async fn handle_reopen(State(state): State<Arc<AppState>>) -> Response {
    // Configuration problems are reported before any network call.
    if let Err(e) = state.config.sentinel.validate() {
        tracing::error!(error = %e, "Rejecting request: incomplete configuration");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    match workflow::run::run_remediation(
        &state.store,
        &state.config.sentinel.workspace,
        state.config.sentinel.window_hours,
    )
    .await
    {
        Ok(summary) => (StatusCode::OK, Json(ReopenResponse::from_summary(summary))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Remediation run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": e.to_string(),
                    "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::store::types::{Classification, Incident, IncidentStatus, Severity};

    fn sample_summary() -> RunSummary {
        let incident = Incident {
            id: "/incidents/abc".to_string(),
            name: "abc".to_string(),
            number: 17,
            title: "Suspicious sign-in".to_string(),
            status: IncidentStatus::Closed,
            severity: Severity::High,
            classification: Some(Classification::Undetermined),
            owner: None,
            last_modified: Utc::now(),
        };
        RunSummary {
            workspace: "sentinel-prod".to_string(),
            executed_at: Utc::now(),
            total_analyzed: 2,
            reopened: 1,
            failed: 0,
            details: vec![
                IncidentDetail::reopened(&incident, None),
                IncidentDetail::skipped(&incident),
            ],
        }
    }

    #[test]
    fn success_response_uses_camel_case_wire_names() {
        let value =
            serde_json::to_value(ReopenResponse::from_summary(sample_summary())).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["summary"]["totalIncidentsAnalyzed"], 2);
        assert_eq!(value["summary"]["incidentsReopened"], 1);
        assert_eq!(value["summary"]["sentinelWorkspace"], "sentinel-prod");
        assert!(value["summary"]["executionTime"].is_string());

        let details = value["incidentDetails"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["incidentNumber"], 17);
        assert_eq!(details[0]["action"], "reopened");
        assert_eq!(details[0]["reopened"], true);
        assert_eq!(details[1]["action"], "skipped");
        // No warning key unless one was recorded.
        assert!(details[0].get("warning").is_none());
    }

    #[test]
    fn criteria_block_is_fixed() {
        let value = serde_json::to_value(CRITERIA).unwrap();
        assert_eq!(value["status"], "Closed");
        assert_eq!(value["assignment"], "Unassigned");
        assert_eq!(value["classification"], "Undetermined");
    }

    #[test]
    fn comment_warning_appears_on_the_detail() {
        let mut summary = sample_summary();
        summary.details = vec![IncidentDetail::reopened(
            &Incident {
                id: "/incidents/xyz".to_string(),
                name: "xyz".to_string(),
                number: 9,
                title: "Beaconing".to_string(),
                status: IncidentStatus::Closed,
                severity: Severity::Low,
                classification: Some(Classification::Undetermined),
                owner: None,
                last_modified: Utc::now(),
            },
            Some("store returned 502".to_string()),
        )];

        let value = serde_json::to_value(ReopenResponse::from_summary(summary)).unwrap();
        let detail = &value["incidentDetails"][0];
        assert_eq!(detail["reopened"], true);
        assert!(detail["warning"]
            .as_str()
            .unwrap()
            .contains("audit comment failed"));
    }
}
