//! Repository for the `organizations` table.

use dtg_core::types::DbId;
use sqlx::PgPool;

use crate::models::organization::{CreateOrganization, Organization};

/// Column list for `organizations` queries.
const COLUMNS: &str = "\
    id, name, org_type, contact_email, contact_phone, is_active, created_at, updated_at";

/// Provides CRUD operations for organizations.
pub struct OrganizationRepo;

impl OrganizationRepo {
    /// Insert a new organization. `org_type` is immutable after creation;
    /// there is deliberately no update path for it.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrganization,
    ) -> Result<Organization, sqlx::Error> {
        let query = format!(
            "INSERT INTO organizations (name, org_type, contact_email, contact_phone) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(&input.name)
            .bind(&input.org_type)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .fetch_one(pool)
            .await
    }

    /// Find an organization by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all organizations, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations ORDER BY created_at DESC");
        sqlx::query_as::<_, Organization>(&query)
            .fetch_all(pool)
            .await
    }
}
