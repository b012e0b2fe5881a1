//! Vendor entity models and DTOs.
//!
//! Vendors are the canonical assignable-work entity: a company with a set
//! of skill categories and credentials. Dispatch matching reads the
//! [`VendorCandidateRow`] projection (vendor + skills + open job count).

use dtg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `vendors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vendor {
    pub id: DbId,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `vendor_skills` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VendorSkill {
    pub id: DbId,
    pub vendor_id: DbId,
    pub category: String,
    pub created_at: Timestamp,
}

/// A row from the `vendor_credentials` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VendorCredential {
    pub id: DbId,
    pub vendor_id: DbId,
    pub credential_type: String,
    pub credential_number: String,
    pub expires_on: Option<chrono::NaiveDate>,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Dispatch-engine projection: an active vendor with its aggregated skill
/// list and count of open (uncompleted) jobs.
#[derive(Debug, Clone, FromRow)]
pub struct VendorCandidateRow {
    pub id: DbId,
    pub skills: Vec<String>,
    pub open_jobs: i64,
}

/// DTO for creating a vendor via `POST /api/v1/vendors`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVendor {
    #[validate(length(min = 1, message = "company_name must not be empty"))]
    pub company_name: String,
    pub contact_name: Option<String>,
    #[validate(email(message = "contact_email must be a valid email"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// Initial skill categories.
    #[serde(default)]
    pub skills: Vec<String>,
}

/// DTO for updating a vendor.
#[derive(Debug, Deserialize)]
pub struct UpdateVendor {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_active: Option<bool>,
}

/// DTO for adding a credential via `POST /api/v1/vendors/{id}/credentials`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCredential {
    #[validate(length(min = 1, message = "credential_type must not be empty"))]
    pub credential_type: String,
    #[validate(length(min = 1, message = "credential_number must not be empty"))]
    pub credential_number: String,
    pub expires_on: Option<chrono::NaiveDate>,
}
