//! User entity models and DTOs.

use dtg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
///
/// `password_hash` is intentionally excluded from serialization.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub organization_id: Option<DbId>,
    pub vendor_id: Option<DbId>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public view of a user returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub organization_id: Option<DbId>,
    pub vendor_id: Option<DbId>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            organization_id: user.organization_id,
            vendor_id: user.vendor_id,
        }
    }
}

/// DTO for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
