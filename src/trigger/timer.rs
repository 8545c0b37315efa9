use std::sync::Arc;
use std::time::Duration;

use crate::server::AppState;
use crate::workflow;

/// Schedule-triggered invocation: the same orchestrator the HTTP adapter
/// drives, fired on a fixed interval. The first pass runs immediately.
pub async fn run_schedule(state: Arc<AppState>) {
    let minutes = state.config.schedule.interval_minutes.max(1);
    let mut ticker = tokio::time::interval(Duration::from_secs(minutes * 60));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tracing::info!(interval_minutes = minutes, "Schedule trigger started");

    loop {
        ticker.tick().await;

        if let Err(e) = state.config.sentinel.validate() {
            tracing::error!(error = %e, "Skipping scheduled pass: incomplete configuration");
            continue;
        }

        match workflow::run::run_remediation(
            &state.store,
            &state.config.sentinel.workspace,
            state.config.sentinel.window_hours,
        )
        .await
        {
            Ok(summary) => {
                tracing::info!(
                    total = summary.total_analyzed,
                    reopened = summary.reopened,
                    failed = summary.failed,
                    "Scheduled remediation pass complete"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduled remediation pass failed");
            }
        }
    }
}
