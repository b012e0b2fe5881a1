//! Invoice entity models and DTOs.

use dtg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `invoices` table.
///
/// `amount` is a flat total; labour and materials are not separately
/// modeled at invoice level.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub service_request_id: DbId,
    pub operator_organization_id: DbId,
    pub vendor_id: DbId,
    pub amount: f64,
    pub status: String,
    pub due_on: Option<chrono::NaiveDate>,
    pub issued_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an invoice via `POST /api/v1/invoices`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoice {
    pub service_request_id: DbId,
    #[validate(range(min = 0.0, message = "amount must not be negative"))]
    pub amount: f64,
    pub due_on: Option<chrono::NaiveDate>,
}

/// DTO for updating an invoice's status.
#[derive(Debug, Deserialize)]
pub struct UpdateInvoice {
    pub status: Option<String>,
    pub amount: Option<f64>,
    pub due_on: Option<chrono::NaiveDate>,
}
