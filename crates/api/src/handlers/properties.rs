//! Handlers for the `/properties` resource (operator property management).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dtg_core::error::CoreError;
use dtg_core::types::DbId;
use dtg_db::models::property::{CreateProperty, UpdateProperty};
use dtg_db::repositories::PropertyRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireOperator;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/properties
///
/// Create a property in the caller's organization. Returns 201.
pub async fn create_property(
    operator: RequireOperator,
    State(state): State<AppState>,
    Json(input): Json<CreateProperty>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let organization_id = operator.organization_id()?;
    let property = PropertyRepo::create(&state.pool, organization_id, &input).await?;

    tracing::info!(
        property_id = property.id,
        organization_id,
        user_id = operator.0.user_id,
        "Property created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: property })))
}

/// GET /api/v1/properties
///
/// List the caller's organization's properties.
pub async fn list_properties(
    operator: RequireOperator,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let organization_id = operator.organization_id()?;
    let properties = PropertyRepo::list_by_org(&state.pool, organization_id).await?;
    Ok(Json(DataResponse { data: properties }))
}

/// GET /api/v1/properties/{id}
///
/// Get a single property, scoped to the caller's organization.
pub async fn get_property(
    operator: RequireOperator,
    State(state): State<AppState>,
    Path(property_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let organization_id = operator.organization_id()?;
    let property = PropertyRepo::find_by_id_for_org(&state.pool, property_id, organization_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Property",
            id: property_id,
        }))?;
    Ok(Json(DataResponse { data: property }))
}

/// PATCH /api/v1/properties/{id}
///
/// Update a property's fields, scoped to the caller's organization.
pub async fn update_property(
    operator: RequireOperator,
    State(state): State<AppState>,
    Path(property_id): Path<DbId>,
    Json(input): Json<UpdateProperty>,
) -> AppResult<impl IntoResponse> {
    let organization_id = operator.organization_id()?;
    let property = PropertyRepo::update(&state.pool, property_id, organization_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Property",
            id: property_id,
        }))?;
    Ok(Json(DataResponse { data: property }))
}
