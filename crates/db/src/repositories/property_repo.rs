//! Repository for the `properties` table.

use dtg_core::types::DbId;
use sqlx::PgPool;

use crate::models::property::{CreateProperty, Property, UpdateProperty};

/// Column list for `properties` queries.
const COLUMNS: &str = "id, organization_id, name, address, is_active, created_at, updated_at";

/// Provides CRUD operations for properties.
pub struct PropertyRepo;

impl PropertyRepo {
    /// Insert a new property for an organization.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        input: &CreateProperty,
    ) -> Result<Property, sqlx::Error> {
        let query = format!(
            "INSERT INTO properties (organization_id, name, address) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(organization_id)
            .bind(&input.name)
            .bind(&input.address)
            .fetch_one(pool)
            .await
    }

    /// Find a property by ID scoped to an organization.
    pub async fn find_by_id_for_org(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM properties WHERE id = $1 AND organization_id = $2");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List an organization's properties.
    pub async fn list_by_org(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM properties \
             WHERE organization_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Patch property fields. Fields left `None` are unchanged.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
        input: &UpdateProperty,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!(
            "UPDATE properties SET \
                 name = COALESCE($3, name), \
                 address = COALESCE($4, address), \
                 is_active = COALESCE($5, is_active), \
                 updated_at = NOW() \
             WHERE id = $1 AND organization_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }
}
