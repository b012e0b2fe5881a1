//! Repository for the `users` table.

use dtg_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "\
    id, email, password_hash, full_name, role, organization_id, vendor_id, \
    phone, is_active, created_at, updated_at";

/// Provides lookup operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Find an active user by email (login lookup).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND is_active = true");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Active users attached to a vendor (dispatch-offer recipients).
    pub async fn list_by_vendor(pool: &PgPool, vendor_id: DbId) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE vendor_id = $1 AND is_active = true \
             ORDER BY id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(vendor_id)
            .fetch_all(pool)
            .await
    }

    /// Active users attached to an organization (job-milestone recipients).
    pub async fn list_by_organization(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE organization_id = $1 AND is_active = true \
             ORDER BY id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }
}
