//! Service-request entity models and DTOs.

use dtg_core::error::CoreError;
use dtg_core::request_status::RequestStatus;
use dtg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `service_requests` table.
///
/// `status` and `urgency` hold the canonical stored strings; use
/// [`ServiceRequest::status`] to get the parsed enum before applying any
/// transition rule.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceRequest {
    pub id: DbId,
    pub reference_number: String,
    pub organization_id: DbId,
    pub property_id: DbId,
    pub description: String,
    pub category: String,
    pub urgency: String,
    pub status: String,
    pub triage_summary: Option<String>,
    pub triage_urgency_score: Option<f64>,
    pub triage_suggested_category: Option<String>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ServiceRequest {
    /// Parse the stored status string into the closed enum.
    pub fn status(&self) -> Result<RequestStatus, CoreError> {
        RequestStatus::parse(&self.status)
    }
}

/// DTO for creating a request via `POST /api/v1/requests`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateServiceRequest {
    pub property_id: DbId,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    /// Defaults to MEDIUM when omitted.
    pub urgency: Option<String>,
}

/// DTO for the admin `PATCH /api/v1/requests/{id}` update.
///
/// `status` goes through the transition table; the other fields are
/// ungated.
#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequest {
    pub status: Option<String>,
    pub urgency: Option<String>,
    pub description: Option<String>,
    pub triage_summary: Option<String>,
    pub triage_urgency_score: Option<f64>,
    pub triage_suggested_category: Option<String>,
}

/// Query parameters for `GET /api/v1/requests`.
#[derive(Debug, Deserialize)]
pub struct ServiceRequestListQuery {
    /// Filter by stored status string (e.g. `READY_TO_DISPATCH`).
    pub status: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
