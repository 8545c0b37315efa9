use chrono::Utc;

use crate::store::types::{Incident, IncidentPatch};
use crate::store::IncidentStore;
use crate::workflow::types::ReopenOutcome;

/// Identity stamped into audit comments.
pub const SERVICE_NAME: &str = "incident-reopener";

fn audit_comment() -> String {
    format!(
        "This incident was automatically reopened by {SERVICE_NAME} at {} UTC. \
         It had been closed as Undetermined with no owner assigned and requires triage.",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    )
}

/// Reopen one incident: apply the status transition, then post the audit
/// comment. The transition is the primary goal; the comment is best-effort
/// and never rolls back a successful reopen.
pub async fn reopen_incident(
    store: &dyn IncidentStore,
    token: &str,
    incident: &Incident,
) -> ReopenOutcome {
    let patch = IncidentPatch::reopen(incident);

    if let Err(e) = store.update_incident(token, &incident.name, &patch).await {
        tracing::error!(
            incident = incident.number,
            error = %e,
            "Failed to reopen incident"
        );
        return ReopenOutcome::UpdateFailed {
            error: e.to_string(),
        };
    }

    tracing::info!(
        incident = incident.number,
        title = %incident.title,
        "Incident reopened"
    );

    match store
        .add_comment(token, &incident.name, &audit_comment())
        .await
    {
        Ok(()) => ReopenOutcome::Reopened {
            comment_error: None,
        },
        Err(e) => {
            tracing::warn!(
                incident = incident.number,
                error = %e,
                "Incident reopened but the audit comment failed"
            );
            ReopenOutcome::Reopened {
                comment_error: Some(e.to_string()),
            }
        }
    }
}
