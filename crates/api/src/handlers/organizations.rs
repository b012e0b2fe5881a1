//! Handlers for the `/organizations` resource (admin tenant onboarding).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dtg_core::error::CoreError;
use dtg_core::types::DbId;
use dtg_db::models::organization::{CreateOrganization, ORG_TYPE_OPERATOR, ORG_TYPE_VENDOR};
use dtg_db::repositories::OrganizationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/organizations
///
/// Register a tenant organization. `org_type` must be OPERATOR or VENDOR
/// and is immutable after creation. Returns 201.
pub async fn create_organization(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateOrganization>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }
    if input.org_type != ORG_TYPE_OPERATOR && input.org_type != ORG_TYPE_VENDOR {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid org_type '{}'. Must be {ORG_TYPE_OPERATOR} or {ORG_TYPE_VENDOR}",
            input.org_type
        ))));
    }

    let organization = OrganizationRepo::create(&state.pool, &input).await?;

    tracing::info!(
        organization_id = organization.id,
        org_type = %organization.org_type,
        user_id = admin.user_id,
        "Organization registered",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: organization }),
    ))
}

/// GET /api/v1/organizations
///
/// List all organizations.
pub async fn list_organizations(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let organizations = OrganizationRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: organizations,
    }))
}

/// GET /api/v1/organizations/{id}
///
/// Get a single organization.
pub async fn get_organization(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(organization_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let organization = OrganizationRepo::find_by_id(&state.pool, organization_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Organization",
            id: organization_id,
        }))?;
    Ok(Json(DataResponse { data: organization }))
}
