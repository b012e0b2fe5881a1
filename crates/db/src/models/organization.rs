//! Organization entity models and DTOs.

use dtg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Organization type for property operators.
pub const ORG_TYPE_OPERATOR: &str = "OPERATOR";

/// Organization type for vendor companies.
pub const ORG_TYPE_VENDOR: &str = "VENDOR";

/// A row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: DbId,
    pub name: String,
    pub org_type: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a new organization.
#[derive(Debug, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub org_type: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}
