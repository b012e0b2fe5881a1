//! Handlers for the `/requests` resource.
//!
//! Operators create and verify requests scoped to their organization;
//! admins triage, dispatch, and drive status through the transition table.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use dtg_core::error::CoreError;
use dtg_core::reference::{generate_reference, REQUEST_PREFIX};
use dtg_core::request_status::{validate_transition, RequestStatus};
use dtg_core::roles::ROLE_ADMIN;
use dtg_core::types::DbId;
use dtg_core::urgency::Urgency;
use dtg_db::models::job::Job;
use dtg_db::models::service_request::{
    CreateServiceRequest, ServiceRequest, ServiceRequestListQuery, UpdateServiceRequest,
};
use dtg_db::repositories::{JobRepo, PropertyRepo, ServiceRequestRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::DispatchEngine;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireOperator};
use crate::response::DataResponse;
use crate::state::AppState;

/// Unique constraint on `service_requests.reference_number`.
const UQ_REFERENCE: &str = "uq_service_requests_reference";

/// A service request together with its job, if one exists.
#[derive(Debug, Serialize)]
pub struct ServiceRequestWithJob {
    #[serde(flatten)]
    pub request: ServiceRequest,
    pub job: Option<Job>,
}

// ---------------------------------------------------------------------------
// Create (with intake-time auto-dispatch)
// ---------------------------------------------------------------------------

/// POST /api/v1/requests
///
/// Create a service request and attempt auto-dispatch before responding.
/// Returns 201 with the request in its post-dispatch state, including
/// `job` when a vendor matched.
pub async fn create_request(
    operator: RequireOperator,
    State(state): State<AppState>,
    Json(input): Json<CreateServiceRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let organization_id = operator.organization_id()?;

    // The property must exist inside the caller's organization.
    PropertyRepo::find_by_id_for_org(&state.pool, input.property_id, organization_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Property",
            id: input.property_id,
        }))?;

    let urgency = match &input.urgency {
        Some(raw) => Urgency::parse(raw).map_err(AppError::Core)?,
        None => Urgency::default(),
    };

    // Random reference suffixes can collide on a busy day; retry once
    // before giving up.
    let mut request = None;
    for attempt in 0..2 {
        let reference = generate_reference(REQUEST_PREFIX, Utc::now().date_naive());
        match ServiceRequestRepo::create(
            &state.pool,
            organization_id,
            &reference,
            urgency.as_str(),
            &input,
        )
        .await
        {
            Ok(created) => {
                request = Some(created);
                break;
            }
            Err(e) if is_unique_violation(&e, UQ_REFERENCE) && attempt == 0 => {
                tracing::warn!(%reference, "Reference collision, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    }
    let request = request.ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Could not allocate a unique reference number".into(),
        ))
    })?;

    tracing::info!(
        request_id = request.id,
        reference = %request.reference_number,
        organization_id,
        category = %request.category,
        "Service request created",
    );

    // Synchronous by design: there is no durable background runner, so the
    // dispatch outcome must be settled before the response is sent.
    let engine = DispatchEngine::new(state.pool.clone(), state.event_bus.clone());
    let job = engine.auto_dispatch(request.id).await;

    // Reload for the post-dispatch status.
    let request = ServiceRequestRepo::find_by_id(&state.pool, request.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceRequest",
            id: request.id,
        }))?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ServiceRequestWithJob { request, job },
        }),
    ))
}

// ---------------------------------------------------------------------------
// List / Get
// ---------------------------------------------------------------------------

/// GET /api/v1/requests
///
/// List requests. Admin users see all requests; operators see only their
/// organization's. Supports `status`, `limit`, and `offset` query
/// parameters.
pub async fn list_requests(
    operator: RequireOperator,
    State(state): State<AppState>,
    Query(params): Query<ServiceRequestListQuery>,
) -> AppResult<impl IntoResponse> {
    let scope = if operator.0.role == ROLE_ADMIN {
        None
    } else {
        Some(operator.organization_id()?)
    };
    let requests = ServiceRequestRepo::list(&state.pool, scope, &params).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/requests/{id}
///
/// Get a single request with its job (if any). Operators can only see
/// requests in their own organization.
pub async fn get_request(
    operator: RequireOperator,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = find_scoped(&state, &operator, request_id).await?;
    let job = JobRepo::find_by_service_request(&state.pool, request_id).await?;
    Ok(Json(DataResponse {
        data: ServiceRequestWithJob { request, job },
    }))
}

// ---------------------------------------------------------------------------
// Admin update (status through the transition table)
// ---------------------------------------------------------------------------

/// PATCH /api/v1/requests/{id}
///
/// Admin-only update. A `status` change is validated against the
/// transition table and rejected with 422 when the edge is not allowed;
/// the remaining fields are ungated.
pub async fn update_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<UpdateServiceRequest>,
) -> AppResult<impl IntoResponse> {
    let request = ServiceRequestRepo::find_by_id(&state.pool, request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceRequest",
            id: request_id,
        }))?;

    // Validate the urgency value before writing anything.
    if let Some(raw) = &input.urgency {
        Urgency::parse(raw).map_err(AppError::Core)?;
    }

    // Status change first: reject before any field write so a failed
    // transition leaves the request untouched.
    if let Some(raw) = &input.status {
        let target = RequestStatus::parse(raw).map_err(AppError::Core)?;
        let current = request.status().map_err(AppError::Core)?;
        validate_transition(current, target).map_err(AppError::Core)?;

        ServiceRequestRepo::update_status(&state.pool, request_id, target).await?;
        tracing::info!(
            request_id,
            from = %current,
            to = %target,
            user_id = admin.user_id,
            "Request status changed",
        );
    }

    let updated = ServiceRequestRepo::update_fields(
        &state.pool,
        request_id,
        input.urgency.as_deref(),
        input.description.as_deref(),
        input.triage_summary.as_deref(),
        input.triage_urgency_score,
        input.triage_suggested_category.as_deref(),
    )
    .await?;

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Manual dispatch
// ---------------------------------------------------------------------------

/// Request body for `POST /api/v1/requests/{id}/dispatch`.
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub vendor_id: DbId,
}

/// POST /api/v1/requests/{id}/dispatch
///
/// Admin manually dispatches a request to a chosen vendor. Returns 201
/// with the created job, 404 for a missing request or vendor, 409 when a
/// job already exists, 400 when the request is cancelled.
pub async fn dispatch_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<DispatchRequest>,
) -> AppResult<impl IntoResponse> {
    let engine = DispatchEngine::new(state.pool.clone(), state.event_bus.clone());
    let job = engine
        .dispatch(request_id, input.vendor_id, admin.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}

// ---------------------------------------------------------------------------
// Operator verification
// ---------------------------------------------------------------------------

/// POST /api/v1/requests/{id}/verify
///
/// Operator confirms completed work. Reduces to the COMPLETED -> VERIFIED
/// edge of the transition table; any other current status is rejected the
/// same way an admin transition would be.
pub async fn verify_request(
    operator: RequireOperator,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = find_scoped(&state, &operator, request_id).await?;

    let current = request.status().map_err(AppError::Core)?;
    validate_transition(current, RequestStatus::Verified).map_err(AppError::Core)?;

    let updated =
        ServiceRequestRepo::update_status(&state.pool, request_id, RequestStatus::Verified)
            .await?;

    tracing::info!(
        request_id,
        user_id = operator.0.user_id,
        "Request verified by operator",
    );

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a request, scoped to the caller's organization unless admin.
///
/// Out-of-scope requests surface as NotFound rather than Forbidden so the
/// response does not leak other tenants' request ids.
async fn find_scoped(
    state: &AppState,
    operator: &RequireOperator,
    request_id: DbId,
) -> AppResult<ServiceRequest> {
    let found = if operator.0.role == ROLE_ADMIN {
        ServiceRequestRepo::find_by_id(&state.pool, request_id).await?
    } else {
        let organization_id = operator.organization_id()?;
        ServiceRequestRepo::find_by_id_for_org(&state.pool, request_id, organization_id).await?
    };
    found.ok_or(AppError::Core(CoreError::NotFound {
        entity: "ServiceRequest",
        id: request_id,
    }))
}
