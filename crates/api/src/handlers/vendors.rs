//! Handlers for the `/vendors` resource (admin vendor management).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dtg_core::error::CoreError;
use dtg_core::types::DbId;
use dtg_db::models::vendor::{
    CreateCredential, CreateVendor, UpdateVendor, Vendor, VendorCredential, VendorSkill,
};
use dtg_db::repositories::VendorRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// A vendor together with its skills and credentials.
#[derive(Debug, Serialize)]
pub struct VendorDetail {
    #[serde(flatten)]
    pub vendor: Vendor,
    pub skills: Vec<VendorSkill>,
    pub credentials: Vec<VendorCredential>,
}

/// POST /api/v1/vendors
///
/// Register a vendor with its initial skill categories. Returns 201.
pub async fn create_vendor(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateVendor>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let vendor = VendorRepo::create(&state.pool, &input).await?;

    tracing::info!(
        vendor_id = vendor.id,
        company = %vendor.company_name,
        user_id = admin.user_id,
        "Vendor created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: vendor })))
}

/// GET /api/v1/vendors
///
/// List all vendors.
pub async fn list_vendors(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let vendors = VendorRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: vendors }))
}

/// GET /api/v1/vendors/{id}
///
/// Get a vendor with its skills and credentials.
pub async fn get_vendor(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let vendor = VendorRepo::find_by_id(&state.pool, vendor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vendor",
            id: vendor_id,
        }))?;

    let skills = VendorRepo::list_skills(&state.pool, vendor_id).await?;
    let credentials = VendorRepo::list_credentials(&state.pool, vendor_id).await?;

    Ok(Json(DataResponse {
        data: VendorDetail {
            vendor,
            skills,
            credentials,
        },
    }))
}

/// PATCH /api/v1/vendors/{id}
///
/// Update vendor contact fields or deactivate it (inactive vendors drop
/// out of auto-dispatch candidates).
pub async fn update_vendor(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
    Json(input): Json<UpdateVendor>,
) -> AppResult<impl IntoResponse> {
    // Existence check first so a missing vendor is 404, not 500.
    VendorRepo::find_by_id(&state.pool, vendor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vendor",
            id: vendor_id,
        }))?;

    let vendor = VendorRepo::update(&state.pool, vendor_id, &input).await?;
    Ok(Json(DataResponse { data: vendor }))
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// Body for `POST /api/v1/vendors/{id}/skills`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddSkill {
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
}

/// POST /api/v1/vendors/{id}/skills
///
/// Add a skill category. Idempotent per (vendor, category).
pub async fn add_skill(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
    Json(input): Json<AddSkill>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    VendorRepo::find_by_id(&state.pool, vendor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vendor",
            id: vendor_id,
        }))?;

    VendorRepo::add_skill(&state.pool, vendor_id, &input.category).await?;
    let skills = VendorRepo::list_skills(&state.pool, vendor_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: skills })))
}

/// DELETE /api/v1/vendors/{id}/skills/{category}
///
/// Remove a skill category. Returns 204, or 404 when the vendor does not
/// have that skill.
pub async fn remove_skill(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((vendor_id, category)): Path<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    let removed = VendorRepo::remove_skill(&state.pool, vendor_id, &category).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "VendorSkill",
            id: vendor_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// POST /api/v1/vendors/{id}/credentials
///
/// Add a credential record. Returns 201.
pub async fn add_credential(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
    Json(input): Json<CreateCredential>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    VendorRepo::find_by_id(&state.pool, vendor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vendor",
            id: vendor_id,
        }))?;

    let credential = VendorRepo::add_credential(&state.pool, vendor_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: credential })))
}

/// POST /api/v1/vendors/credentials/{id}/verify
///
/// Mark a credential verified. Returns 409 when it is already verified.
pub async fn verify_credential(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(credential_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let verified = VendorRepo::verify_credential(&state.pool, credential_id).await?;
    if !verified {
        return Err(AppError::Core(CoreError::Conflict(
            "Credential is already verified or does not exist".into(),
        )));
    }

    tracing::info!(credential_id, user_id = admin.user_id, "Credential verified");
    Ok(StatusCode::NO_CONTENT)
}
