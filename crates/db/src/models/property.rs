//! Property entity models and DTOs.

use dtg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `properties` table. A property belongs to exactly one
/// organization for its lifetime.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Property {
    pub id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub address: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a property via `POST /api/v1/properties`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProperty {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "address is mandatory"))]
    pub address: String,
}

/// DTO for updating a property.
#[derive(Debug, Deserialize)]
pub struct UpdateProperty {
    pub name: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}
