//! Repository for the `vendors`, `vendor_skills`, and `vendor_credentials`
//! tables.

use dtg_core::types::DbId;
use sqlx::PgPool;

use crate::models::vendor::{
    CreateCredential, CreateVendor, UpdateVendor, Vendor, VendorCandidateRow, VendorCredential,
    VendorSkill,
};

/// Column list for `vendors` queries.
const COLUMNS: &str = "\
    id, company_name, contact_name, contact_email, contact_phone, \
    is_active, created_at, updated_at";

/// Provides CRUD operations for vendors.
pub struct VendorRepo;

impl VendorRepo {
    /// Insert a new vendor with its initial skills, in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateVendor) -> Result<Vendor, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO vendors (company_name, contact_name, contact_email, contact_phone) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let vendor = sqlx::query_as::<_, Vendor>(&query)
            .bind(&input.company_name)
            .bind(&input.contact_name)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .fetch_one(&mut *tx)
            .await?;

        for category in &input.skills {
            sqlx::query(
                "INSERT INTO vendor_skills (vendor_id, category) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(vendor.id)
            .bind(category)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(vendor)
    }

    /// Find a vendor by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Vendor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vendors WHERE id = $1");
        sqlx::query_as::<_, Vendor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all vendors, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Vendor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vendors ORDER BY created_at DESC");
        sqlx::query_as::<_, Vendor>(&query).fetch_all(pool).await
    }

    /// Patch vendor contact fields / active flag. Fields left `None` are
    /// unchanged.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVendor,
    ) -> Result<Vendor, sqlx::Error> {
        let query = format!(
            "UPDATE vendors SET \
                 company_name = COALESCE($2, company_name), \
                 contact_name = COALESCE($3, contact_name), \
                 contact_email = COALESCE($4, contact_email), \
                 contact_phone = COALESCE($5, contact_phone), \
                 is_active = COALESCE($6, is_active), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(id)
            .bind(&input.company_name)
            .bind(&input.contact_name)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Load active vendors with their skill list and open-job count, the
    /// candidate snapshot the dispatch engine selects from.
    ///
    /// The count is taken at read time; under concurrent dispatch it is a
    /// best-effort load signal, not a consistency guarantee.
    pub async fn list_active_candidates(
        pool: &PgPool,
    ) -> Result<Vec<VendorCandidateRow>, sqlx::Error> {
        sqlx::query_as::<_, VendorCandidateRow>(
            "SELECT v.id, \
                    COALESCE(array_agg(s.category) FILTER (WHERE s.category IS NOT NULL), ARRAY[]::TEXT[]) AS skills, \
                    (SELECT COUNT(*) FROM jobs j \
                      WHERE j.vendor_id = v.id AND j.completed_at IS NULL) AS open_jobs \
             FROM vendors v \
             LEFT JOIN vendor_skills s ON s.vendor_id = v.id \
             WHERE v.is_active = true \
             GROUP BY v.id \
             ORDER BY v.id",
        )
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Skills
    // -----------------------------------------------------------------------

    /// Add a skill category to a vendor. Idempotent per (vendor, category).
    pub async fn add_skill(
        pool: &PgPool,
        vendor_id: DbId,
        category: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO vendor_skills (vendor_id, category) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(vendor_id)
        .bind(category)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove a skill category from a vendor. Returns `true` if a row was
    /// deleted.
    pub async fn remove_skill(
        pool: &PgPool,
        vendor_id: DbId,
        category: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM vendor_skills WHERE vendor_id = $1 AND category = $2",
        )
        .bind(vendor_id)
        .bind(category)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a vendor's skills.
    pub async fn list_skills(
        pool: &PgPool,
        vendor_id: DbId,
    ) -> Result<Vec<VendorSkill>, sqlx::Error> {
        sqlx::query_as::<_, VendorSkill>(
            "SELECT id, vendor_id, category, created_at \
             FROM vendor_skills WHERE vendor_id = $1 ORDER BY category ASC",
        )
        .bind(vendor_id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Credentials
    // -----------------------------------------------------------------------

    /// Add a credential to a vendor.
    pub async fn add_credential(
        pool: &PgPool,
        vendor_id: DbId,
        input: &CreateCredential,
    ) -> Result<VendorCredential, sqlx::Error> {
        sqlx::query_as::<_, VendorCredential>(
            "INSERT INTO vendor_credentials \
                 (vendor_id, credential_type, credential_number, expires_on) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, vendor_id, credential_type, credential_number, \
                       expires_on, is_verified, created_at, updated_at",
        )
        .bind(vendor_id)
        .bind(&input.credential_type)
        .bind(&input.credential_number)
        .bind(input.expires_on)
        .fetch_one(pool)
        .await
    }

    /// Mark a credential verified. Returns `true` if the row was updated.
    pub async fn verify_credential(
        pool: &PgPool,
        credential_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE vendor_credentials \
             SET is_verified = true, updated_at = NOW() \
             WHERE id = $1 AND is_verified = false",
        )
        .bind(credential_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a vendor's credentials.
    pub async fn list_credentials(
        pool: &PgPool,
        vendor_id: DbId,
    ) -> Result<Vec<VendorCredential>, sqlx::Error> {
        sqlx::query_as::<_, VendorCredential>(
            "SELECT id, vendor_id, credential_type, credential_number, \
                    expires_on, is_verified, created_at, updated_at \
             FROM vendor_credentials WHERE vendor_id = $1 ORDER BY created_at ASC",
        )
        .bind(vendor_id)
        .fetch_all(pool)
        .await
    }
}
