//! Handlers for the `/invoices` resource.
//!
//! Admins raise and manage invoices against completed requests; operators
//! can list their own organization's invoices.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dtg_core::error::CoreError;
use dtg_core::invoice_status;
use dtg_core::request_status::RequestStatus;
use dtg_core::roles::ROLE_ADMIN;
use dtg_core::types::DbId;
use dtg_db::models::invoice::{CreateInvoice, UpdateInvoice};
use dtg_db::repositories::{InvoiceRepo, JobRepo, ServiceRequestRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireOperator};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/invoices
///
/// Raise an invoice for a completed (or verified) request. The billed
/// vendor is taken from the request's job. Returns 201.
pub async fn create_invoice(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateInvoice>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let request = ServiceRequestRepo::find_by_id(&state.pool, input.service_request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceRequest",
            id: input.service_request_id,
        }))?;

    let status = request.status().map_err(AppError::Core)?;
    if status != RequestStatus::Completed && status != RequestStatus::Verified {
        return Err(AppError::Core(CoreError::InvalidState(format!(
            "Cannot invoice a request in status {status}; work must be completed first"
        ))));
    }

    let job = JobRepo::find_by_service_request(&state.pool, request.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::InvalidState(
                "Request has no job to invoice".into(),
            ))
        })?;

    let invoice =
        InvoiceRepo::create(&state.pool, request.organization_id, job.vendor_id, &input).await?;

    tracing::info!(
        invoice_id = invoice.id,
        request_id = request.id,
        vendor_id = job.vendor_id,
        user_id = admin.user_id,
        "Invoice created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: invoice })))
}

/// GET /api/v1/invoices
///
/// List invoices. Admin users see all; operators see their own
/// organization's.
pub async fn list_invoices(
    operator: RequireOperator,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let scope = if operator.0.role == ROLE_ADMIN {
        None
    } else {
        Some(operator.organization_id()?)
    };
    let invoices = InvoiceRepo::list(&state.pool, scope).await?;
    Ok(Json(DataResponse { data: invoices }))
}

/// GET /api/v1/invoices/{id}
///
/// Get a single invoice. Operators can only see invoices billed to their
/// organization.
pub async fn get_invoice(
    operator: RequireOperator,
    State(state): State<AppState>,
    Path(invoice_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let invoice = InvoiceRepo::find_by_id(&state.pool, invoice_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invoice",
            id: invoice_id,
        }))?;

    if operator.0.role != ROLE_ADMIN
        && operator.0.organization_id != Some(invoice.operator_organization_id)
    {
        // Same shape as a missing invoice so ids do not leak across tenants.
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Invoice",
            id: invoice_id,
        }));
    }

    Ok(Json(DataResponse { data: invoice }))
}

/// PATCH /api/v1/invoices/{id}
///
/// Update an invoice's status or amounts. The status value is validated
/// against the closed set.
pub async fn update_invoice(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(invoice_id): Path<DbId>,
    Json(input): Json<UpdateInvoice>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &input.status {
        invoice_status::validate_status(status)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    }

    InvoiceRepo::find_by_id(&state.pool, invoice_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invoice",
            id: invoice_id,
        }))?;

    let invoice = InvoiceRepo::update(&state.pool, invoice_id, &input).await?;
    Ok(Json(DataResponse { data: invoice }))
}
