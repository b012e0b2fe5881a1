//! Handlers for the `/jobs` resource: the vendor-facing job lifecycle.
//!
//! Only the assigned vendor (or an admin) may act on a job; operators
//! never mutate jobs directly. Each lifecycle action stamps its milestone
//! on the job and, for the externally visible milestones, mirrors a status
//! onto the parent service request.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dtg_core::error::CoreError;
use dtg_core::job_action::{validate_sequence, JobAction};
use dtg_core::request_status::{can_transition, RequestStatus};
use dtg_core::roles::ROLE_ADMIN;
use dtg_core::types::DbId;
use dtg_db::models::job::{
    CreateJobMaterial, CreateJobNote, CreateJobPhoto, Job, JobListQuery, JobMaterial, JobNote,
    JobPhoto, UpdateJob,
};
use dtg_db::repositories::{JobRepo, ServiceRequestRepo};
use dtg_events::bus::{EVENT_JOB_ACCEPTED, EVENT_JOB_ARRIVED, EVENT_JOB_COMPLETED};
use dtg_events::PlatformEvent;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireVendor;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a job by ID and verify the caller is its assigned vendor (or an
/// admin).
///
/// Returns `NotFound` if the job does not exist, `Forbidden` if the caller
/// is not the assigned vendor and is not an admin. `action` is used in the
/// error message (e.g. "view", "update").
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    job_id: DbId,
    auth: &AuthUser,
    action: &str,
) -> AppResult<Job> {
    let job = JobRepo::find_by_id(pool, job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))?;

    if auth.role != ROLE_ADMIN && auth.vendor_id != Some(job.vendor_id) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Cannot {action} a job assigned to another vendor"
        ))));
    }

    Ok(job)
}

// ---------------------------------------------------------------------------
// List / Get
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs
///
/// List jobs. Admin users see all jobs; vendor users see only jobs
/// assigned to their vendor. Supports `status`, `limit`, and `offset`
/// query parameters.
pub async fn list_jobs(
    RequireVendor(auth): RequireVendor,
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> AppResult<impl IntoResponse> {
    let scope = if auth.role == ROLE_ADMIN {
        None
    } else {
        Some(auth.vendor_id.ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Vendor account is not attached to a vendor".into(),
            ))
        })?)
    };
    let jobs = JobRepo::list(&state.pool, scope, &params).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// A job together with its documentation trail.
#[derive(Debug, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub notes: Vec<JobNote>,
    pub materials: Vec<JobMaterial>,
    pub photos: Vec<JobPhoto>,
}

/// GET /api/v1/jobs/{id}
///
/// Get a single job with its notes, materials, and photos.
pub async fn get_job(
    RequireVendor(auth): RequireVendor,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = find_and_authorize(&state.pool, job_id, &auth, "view").await?;

    let notes = JobRepo::list_notes(&state.pool, job_id).await?;
    let materials = JobRepo::list_materials(&state.pool, job_id).await?;
    let photos = JobRepo::list_photos(&state.pool, job_id).await?;

    Ok(Json(DataResponse {
        data: JobDetail {
            job,
            notes,
            materials,
            photos,
        },
    }))
}

// ---------------------------------------------------------------------------
// Lifecycle update
// ---------------------------------------------------------------------------

/// PATCH /api/v1/jobs/{id}
///
/// Apply a lifecycle action (`accept`, `enroute`, `arrive`, `complete`)
/// and/or update the free-form side-effect fields. Out-of-order actions
/// are rejected; repeating an action is idempotent (the milestone is
/// re-stamped, the parent request status is untouched when already at the
/// target).
pub async fn update_job(
    RequireVendor(auth): RequireVendor,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
    Json(input): Json<UpdateJob>,
) -> AppResult<impl IntoResponse> {
    let mut job = find_and_authorize(&state.pool, job_id, &auth, "update").await?;

    if let Some(raw) = &input.action {
        let action = JobAction::parse(raw).map_err(AppError::Core)?;
        validate_sequence(action, &job.milestones()).map_err(AppError::Core)?;

        job = JobRepo::apply_action(&state.pool, job_id, action).await?;
        tracing::info!(
            job_id,
            action = %action,
            user_id = auth.user_id,
            "Job action applied",
        );

        sync_request_status(&state, &job, action, auth.user_id).await?;
    }

    if input.vendor_notes.is_some()
        || input.total_labour_hours.is_some()
        || input.total_materials_cost.is_some()
        || input.total_cost.is_some()
    {
        job = JobRepo::update_details(&state.pool, job_id, &input).await?;
    }

    Ok(Json(DataResponse { data: job }))
}

/// Mirror a job action onto the parent service request.
///
/// Short-circuits when the request is already at the target status (the
/// idempotent-repeat case). When the transition table forbids the edge,
/// e.g. the admin cancelled the request while the vendor was working, the
/// sync is skipped with a warning rather than failing the action: the
/// job's own audit trail still records what the vendor did.
async fn sync_request_status(
    state: &AppState,
    job: &Job,
    action: JobAction,
    actor_user_id: DbId,
) -> AppResult<()> {
    let Some(target) = action.request_status_effect() else {
        return Ok(());
    };

    let request = ServiceRequestRepo::find_by_id(&state.pool, job.service_request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceRequest",
            id: job.service_request_id,
        }))?;
    let current = request.status().map_err(AppError::Core)?;

    if current == target {
        return Ok(());
    }

    if !can_transition(current, target) {
        tracing::warn!(
            job_id = job.id,
            request_id = request.id,
            from = %current,
            to = %target,
            "Skipping request status sync: transition not allowed",
        );
        return Ok(());
    }

    let applied = if target == RequestStatus::Completed {
        ServiceRequestRepo::mark_resolved_if(&state.pool, request.id, current).await?
    } else {
        ServiceRequestRepo::update_status_if(&state.pool, request.id, current, target).await?
    };

    if !applied {
        // A concurrent writer (admin or another action) moved the request
        // first; their transition stands.
        tracing::warn!(
            job_id = job.id,
            request_id = request.id,
            to = %target,
            "Request status sync lost a concurrent update",
        );
        return Ok(());
    }

    tracing::info!(
        request_id = request.id,
        from = %current,
        to = %target,
        "Request status synced from job action",
    );

    let event_type = match action {
        JobAction::Accept => EVENT_JOB_ACCEPTED,
        JobAction::Arrive => EVENT_JOB_ARRIVED,
        JobAction::Complete => EVENT_JOB_COMPLETED,
        JobAction::EnRoute => return Ok(()),
    };
    state.event_bus.publish(
        PlatformEvent::new(event_type)
            .with_source("job", job.id)
            .with_actor(actor_user_id)
            .with_payload(serde_json::json!({
                "job_id": job.id,
                "service_request_id": request.id,
                "organization_id": request.organization_id,
                "reference_number": request.reference_number,
            })),
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// Documentation appends
// ---------------------------------------------------------------------------

/// Body for `POST /api/v1/jobs/{id}`: one of the job's child records,
/// discriminated by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AppendJobChild {
    Note(CreateJobNote),
    Material(CreateJobMaterial),
    Photo(CreateJobPhoto),
}

/// POST /api/v1/jobs/{id}
///
/// Append a note, material line, or photo to a job. Returns 201 with the
/// created record.
pub async fn append_job_child(
    RequireVendor(auth): RequireVendor,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
    Json(input): Json<AppendJobChild>,
) -> AppResult<Response> {
    find_and_authorize(&state.pool, job_id, &auth, "document").await?;

    let response = match input {
        AppendJobChild::Note(note) => {
            note.validate()
                .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
            let created = JobRepo::add_note(&state.pool, job_id, auth.user_id, &note).await?;
            (StatusCode::CREATED, Json(DataResponse { data: created })).into_response()
        }
        AppendJobChild::Material(material) => {
            material
                .validate()
                .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
            let created = JobRepo::add_material(&state.pool, job_id, &material).await?;
            (StatusCode::CREATED, Json(DataResponse { data: created })).into_response()
        }
        AppendJobChild::Photo(photo) => {
            photo
                .validate()
                .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
            let created = JobRepo::add_photo(&state.pool, job_id, &photo).await?;
            (StatusCode::CREATED, Json(DataResponse { data: created })).into_response()
        }
    };

    Ok(response)
}
