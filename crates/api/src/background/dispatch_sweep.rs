//! Reconciliation sweep for stuck SUBMITTED requests.
//!
//! Intake-time auto-dispatch swallows errors, so a crash or transient
//! database failure can leave a request in SUBMITTED with no job and no
//! READY_TO_DISPATCH transition. This task periodically re-runs
//! auto-dispatch for such requests. Auto-dispatch itself is idempotent
//! (it skips requests that gained a job or moved on), so the sweep and a
//! late-finishing intake attempt cannot double-dispatch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dtg_db::repositories::ServiceRequestRepo;
use dtg_db::DbPool;
use dtg_events::EventBus;
use tokio_util::sync::CancellationToken;

use crate::engine::DispatchEngine;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default grace period before a SUBMITTED request counts as stuck.
/// Fresh requests are still inside their intake-time dispatch attempt.
const DEFAULT_GRACE_SECS: i64 = 120;

/// Max requests reconciled per cycle.
const SWEEP_BATCH: i64 = 50;

/// Run the dispatch reconciliation loop.
///
/// Grace period is tunable via the `DISPATCH_SWEEP_GRACE_SECS` env var
/// (default: 120). Runs until `cancel` is triggered.
pub async fn run(pool: DbPool, event_bus: Arc<EventBus>, cancel: CancellationToken) {
    let grace_secs: i64 = std::env::var("DISPATCH_SWEEP_GRACE_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_GRACE_SECS);

    tracing::info!(
        grace_secs,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Dispatch reconciliation sweep started"
    );

    let engine = DispatchEngine::new(pool.clone(), event_bus);
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Dispatch reconciliation sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::seconds(grace_secs);
                match ServiceRequestRepo::list_stuck_submitted(&pool, cutoff, SWEEP_BATCH).await {
                    Ok(stuck) => {
                        if !stuck.is_empty() {
                            tracing::info!(count = stuck.len(), "Reconciling stuck requests");
                        }
                        for request in stuck {
                            engine.auto_dispatch(request.id).await;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Dispatch sweep: query failed");
                    }
                }
            }
        }
    }
}
