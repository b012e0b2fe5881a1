//! Integration test for the dispatch reconciliation sweep.

mod common;

use std::sync::Arc;
use std::time::Duration;

use dtg_api::background::dispatch_sweep;
use dtg_events::EventBus;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

#[sqlx::test(migrations = "../db/migrations")]
async fn sweep_dispatches_stuck_submitted_request(pool: PgPool) {
    let (org_id, _token) = common::seed_operator(&pool).await;
    let property_id = common::seed_property(&pool, org_id).await;
    let vendor_id = common::seed_vendor(&pool, "Pipes R Us", &["Plumbing"]).await;

    // A request stuck in SUBMITTED well past the grace period, as if the
    // intake-time dispatch attempt died mid-flight.
    let request_id: i64 = sqlx::query_scalar(
        "INSERT INTO service_requests \
             (reference_number, organization_id, property_id, description, category, \
              status, created_at) \
         VALUES ('REQ-20260101-0042', $1, $2, 'stuck', 'PLUMBING', 'SUBMITTED', \
                 NOW() - INTERVAL '10 minutes') \
         RETURNING id",
    )
    .bind(org_id)
    .bind(property_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(dispatch_sweep::run(
        pool.clone(),
        Arc::new(EventBus::default()),
        cancel.clone(),
    ));

    // The sweep's first interval tick fires immediately; poll for the
    // reconciled outcome.
    let mut dispatched = false;
    for _ in 0..100 {
        let status: String =
            sqlx::query_scalar("SELECT status FROM service_requests WHERE id = $1")
                .bind(request_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        if status == "DISPATCHED" {
            dispatched = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(dispatched, "sweep should have dispatched the stuck request");

    let job_vendor: i64 =
        sqlx::query_scalar("SELECT vendor_id FROM jobs WHERE service_request_id = $1")
            .bind(request_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(job_vendor, vendor_id);

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
}
