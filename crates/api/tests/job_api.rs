//! HTTP-level integration tests for the vendor job lifecycle.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, patch_json, post_json};
use dtg_core::types::DbId;
use sqlx::PgPool;

/// Seed a dispatched request + job and a vendor user token.
///
/// Returns (request_id, job_id, vendor_token).
async fn seed_dispatched_job(pool: &PgPool) -> (DbId, DbId, String) {
    let (org_id, operator) = common::seed_operator(pool).await;
    let property_id = common::seed_property(pool, org_id).await;
    let vendor_id = common::seed_vendor(pool, "Pipes R Us", &["Plumbing"]).await;
    let vendor_token = common::seed_vendor_user(pool, vendor_id, "plumber@test.local").await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/requests",
        &operator,
        serde_json::json!({
            "property_id": property_id,
            "description": "Leaking tap",
            "category": "PLUMBING",
        }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "DISPATCHED");

    let request_id = json["data"]["id"].as_i64().unwrap();
    let job_id = json["data"]["job"]["id"].as_i64().unwrap();
    (request_id, job_id, vendor_token)
}

async fn request_status(pool: &PgPool, request_id: DbId) -> String {
    sqlx::query_scalar("SELECT status FROM service_requests WHERE id = $1")
        .bind(request_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn apply_action(pool: &PgPool, job_id: DbId, token: &str, action: &str) -> StatusCode {
    let response = patch_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/jobs/{job_id}"),
        token,
        serde_json::json!({"action": action}),
    )
    .await;
    response.status()
}

// ---------------------------------------------------------------------------
// Lifecycle flow
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn full_lifecycle_mirrors_request_status(pool: PgPool) {
    let (request_id, job_id, vendor) = seed_dispatched_job(&pool).await;

    // accept -> request ACCEPTED
    assert_eq!(apply_action(&pool, job_id, &vendor, "accept").await, StatusCode::OK);
    assert_eq!(request_status(&pool, request_id).await, "ACCEPTED");

    // enroute -> job milestone only, request unchanged
    assert_eq!(apply_action(&pool, job_id, &vendor, "enroute").await, StatusCode::OK);
    assert_eq!(request_status(&pool, request_id).await, "ACCEPTED");

    // arrive -> request IN_PROGRESS
    assert_eq!(apply_action(&pool, job_id, &vendor, "arrive").await, StatusCode::OK);
    assert_eq!(request_status(&pool, request_id).await, "IN_PROGRESS");

    // complete -> request COMPLETED with resolved_at stamped
    assert_eq!(apply_action(&pool, job_id, &vendor, "complete").await, StatusCode::OK);
    assert_eq!(request_status(&pool, request_id).await, "COMPLETED");

    let resolved_at: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT resolved_at FROM service_requests WHERE id = $1")
            .bind(request_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(resolved_at.is_some());

    // Every milestone is stamped on the job.
    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/jobs/{job_id}"),
        &vendor,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "COMPLETED");
    assert!(!json["data"]["accepted_at"].is_null());
    assert!(!json["data"]["en_route_at"].is_null());
    assert!(!json["data"]["arrived_at"].is_null());
    assert!(!json["data"]["completed_at"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn repeated_complete_is_idempotent(pool: PgPool) {
    let (request_id, job_id, vendor) = seed_dispatched_job(&pool).await;

    for action in ["accept", "arrive", "complete"] {
        assert_eq!(apply_action(&pool, job_id, &vendor, action).await, StatusCode::OK);
    }
    assert_eq!(request_status(&pool, request_id).await, "COMPLETED");

    let first_completed_at: chrono::DateTime<chrono::Utc> =
        sqlx::query_scalar("SELECT completed_at FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_one(&pool)
            .await
            .unwrap();

    // Completing again re-stamps the milestone and leaves the request
    // status alone (no invalid COMPLETED -> COMPLETED transition is
    // attempted).
    assert_eq!(apply_action(&pool, job_id, &vendor, "complete").await, StatusCode::OK);
    assert_eq!(request_status(&pool, request_id).await, "COMPLETED");

    let second_completed_at: chrono::DateTime<chrono::Utc> =
        sqlx::query_scalar("SELECT completed_at FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(second_completed_at >= first_completed_at);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn out_of_order_actions_rejected(pool: PgPool) {
    let (_request_id, job_id, vendor) = seed_dispatched_job(&pool).await;

    // complete before accept/arrive
    assert_eq!(
        apply_action(&pool, job_id, &vendor, "complete").await,
        StatusCode::BAD_REQUEST
    );
    // enroute before accept
    assert_eq!(
        apply_action(&pool, job_id, &vendor, "enroute").await,
        StatusCode::BAD_REQUEST
    );

    // No milestone was stamped by the rejected calls.
    let accepted_at: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT accepted_at FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(accepted_at.is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_action_rejected(pool: PgPool) {
    let (_request_id, job_id, vendor) = seed_dispatched_job(&pool).await;

    let response = patch_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/jobs/{job_id}"),
        &vendor,
        serde_json::json!({"action": "pause"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn completion_does_not_revive_cancelled_request(pool: PgPool) {
    let (request_id, job_id, vendor) = seed_dispatched_job(&pool).await;
    let admin = common::seed_admin(&pool).await;

    for action in ["accept", "arrive"] {
        assert_eq!(apply_action(&pool, job_id, &vendor, action).await, StatusCode::OK);
    }

    // Admin forces cancellation mid-job.
    let response = patch_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/requests/{request_id}"),
        &admin,
        serde_json::json!({"status": "CANCELLED"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The vendor's complete still succeeds (audit trail), but the request
    // stays CANCELLED.
    assert_eq!(apply_action(&pool, job_id, &vendor, "complete").await, StatusCode::OK);
    assert_eq!(request_status(&pool, request_id).await, "CANCELLED");
}

// ---------------------------------------------------------------------------
// Side-effect fields
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn details_update_without_action(pool: PgPool) {
    let (_request_id, job_id, vendor) = seed_dispatched_job(&pool).await;

    let response = patch_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/jobs/{job_id}"),
        &vendor,
        serde_json::json!({
            "vendor_notes": "Replaced the washer",
            "total_labour_hours": 1.5,
            "total_materials_cost": 12.80,
            "total_cost": 96.80,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["vendor_notes"], "Replaced the washer");
    assert_eq!(json["data"]["total_cost"], 96.80);
    // No lifecycle change happened.
    assert_eq!(json["data"]["status"], "OFFERED");
}

// ---------------------------------------------------------------------------
// Documentation appends
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn append_note_material_and_photo(pool: PgPool) {
    let (_request_id, job_id, vendor) = seed_dispatched_job(&pool).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/jobs/{job_id}"),
        &vendor,
        serde_json::json!({"type": "note", "body": "Tenant let us in at 9am"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/jobs/{job_id}"),
        &vendor,
        serde_json::json!({
            "type": "material",
            "description": "1/2in washer",
            "quantity": 2.0,
            "unit_cost": 0.90,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/jobs/{job_id}"),
        &vendor,
        serde_json::json!({
            "type": "photo",
            "url": "https://storage.test.local/jobs/1/after.jpg",
            "photo_type": "after",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // All three show up on the job detail.
    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/jobs/{job_id}"),
        &vendor,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["notes"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["materials"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["photos"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn other_vendor_cannot_act_on_job(pool: PgPool) {
    let (_request_id, job_id, _vendor) = seed_dispatched_job(&pool).await;

    let other_vendor = common::seed_vendor(&pool, "Other Plumbing", &["Plumbing"]).await;
    let other_token =
        common::seed_vendor_user(&pool, other_vendor, "other@test.local").await;

    assert_eq!(
        apply_action(&pool, job_id, &other_token, "accept").await,
        StatusCode::FORBIDDEN
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn operator_cannot_mutate_job(pool: PgPool) {
    let (_request_id, job_id, _vendor) = seed_dispatched_job(&pool).await;

    // Even an operator may not act on a job.
    let operator_user =
        common::seed_user(&pool, "operator2@test.local", "operator", None, None).await;
    let operator_token = common::token_for(operator_user, "operator", None, None);

    assert_eq!(
        apply_action(&pool, job_id, &operator_token, "accept").await,
        StatusCode::FORBIDDEN
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_can_act_on_any_job(pool: PgPool) {
    let (request_id, job_id, _vendor) = seed_dispatched_job(&pool).await;
    let admin = common::seed_admin(&pool).await;

    assert_eq!(apply_action(&pool, job_id, &admin, "accept").await, StatusCode::OK);
    assert_eq!(request_status(&pool, request_id).await, "ACCEPTED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn vendor_sees_only_their_jobs(pool: PgPool) {
    let (_request_id, job_id, vendor) = seed_dispatched_job(&pool).await;

    let other_vendor = common::seed_vendor(&pool, "Other Plumbing", &["Plumbing"]).await;
    let other_token =
        common::seed_vendor_user(&pool, other_vendor, "other@test.local").await;

    let response = get(common::build_test_app(pool.clone()), "/api/v1/jobs", &vendor).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["id"], job_id);

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/jobs",
        &other_token,
    )
    .await;
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Notification log endpoints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn notification_log_list_and_mark_read(pool: PgPool) {
    let (_org_id, _operator) = common::seed_operator(&pool).await;
    let user_id: i64 =
        sqlx::query_scalar("SELECT id FROM users WHERE role = 'operator' LIMIT 1")
            .fetch_one(&pool)
            .await
            .unwrap();
    sqlx::query(
        "INSERT INTO notifications (user_id, event_type, message) \
         VALUES ($1, 'job.completed', 'Work on service request REQ-1 is complete')",
    )
    .bind(user_id)
    .execute(&pool)
    .await
    .unwrap();

    let token = common::token_for(user_id, "operator", None, None);
    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications?unread_only=true",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["event_type"], "job.completed");
    assert_eq!(json["data"][0]["is_read"], false);
    let notification_id = json["data"][0]["id"].as_i64().unwrap();

    // Mark it read; the unread listing is then empty and a second
    // mark-read is a 404.
    let response = common::post_empty(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/notifications/{notification_id}/read"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications?unread_only=true",
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let response = common::post_empty(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/notifications/{notification_id}/read"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
