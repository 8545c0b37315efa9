use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::store::IncidentStore;
use crate::workflow::eligibility::is_eligible;
use crate::workflow::reopen::reopen_incident;
use crate::workflow::types::{IncidentDetail, ReopenOutcome, RunSummary};

/// Convert a fractional-hour window into a cutoff instant, millisecond
/// precision so windows like 0.083 hours survive the conversion.
fn window_cutoff(started_at: DateTime<Utc>, window_hours: f64) -> DateTime<Utc> {
    started_at - Duration::milliseconds((window_hours * 3_600_000.0).round() as i64)
}

/// Drive one remediation run: authenticate, list, filter, remediate each
/// eligible incident, aggregate. Credential and listing failures abort the
/// run; everything after that is isolated per incident.
pub async fn run_remediation(
    store: &dyn IncidentStore,
    workspace: &str,
    window_hours: f64,
) -> Result<RunSummary> {
    let started_at = Utc::now();
    let cutoff = window_cutoff(started_at, window_hours);

    let token = store.acquire_token().await?;
    tracing::debug!("Acquired management API token");

    let incidents = store.list_closed_incidents(&token, cutoff).await?;
    tracing::info!(
        count = incidents.len(),
        window_hours,
        workspace,
        "Listed closed incidents in window"
    );

    let mut details = Vec::new();
    let mut reopened = 0usize;
    let mut failed = 0usize;
    let mut total = 0usize;

    for incident in &incidents {
        // The listing is ordered newest-modified first, so the first item at
        // or past the cutoff means everything after it is out of the window
        // too. Stopping here must select exactly what a full scan would.
        if incident.last_modified <= cutoff {
            tracing::debug!(
                incident = incident.number,
                "Reached the window cutoff, stopping the scan"
            );
            break;
        }
        total += 1;

        if !is_eligible(incident) {
            tracing::debug!(
                incident = incident.number,
                "Skipping: does not meet the reopening criteria"
            );
            details.push(IncidentDetail::skipped(incident));
            continue;
        }

        // One bad incident must never abort the batch.
        match reopen_incident(store, &token, incident).await {
            ReopenOutcome::Reopened { comment_error } => {
                reopened += 1;
                details.push(IncidentDetail::reopened(incident, comment_error));
            }
            ReopenOutcome::UpdateFailed { error } => {
                failed += 1;
                details.push(IncidentDetail::update_failed(incident, error));
            }
        }
    }

    let summary = RunSummary {
        workspace: workspace.to_string(),
        executed_at: started_at,
        total_analyzed: total,
        reopened,
        failed,
        details,
    };

    tracing::info!(
        total = summary.total_analyzed,
        reopened = summary.reopened,
        failed = summary.failed,
        "Remediation pass complete"
    );

    Ok(summary)
}
