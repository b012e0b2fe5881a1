//! Repository for the `invoices` table.

use dtg_core::types::DbId;
use sqlx::PgPool;

use crate::models::invoice::{CreateInvoice, Invoice, UpdateInvoice};

/// Column list for `invoices` queries.
const COLUMNS: &str = "\
    id, service_request_id, operator_organization_id, vendor_id, amount, \
    status, due_on, issued_at, created_at, updated_at";

/// Provides CRUD operations for invoices.
pub struct InvoiceRepo;

impl InvoiceRepo {
    /// Insert a new draft invoice.
    pub async fn create(
        pool: &PgPool,
        operator_organization_id: DbId,
        vendor_id: DbId,
        input: &CreateInvoice,
    ) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "INSERT INTO invoices \
                 (service_request_id, operator_organization_id, vendor_id, amount, due_on) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(input.service_request_id)
            .bind(operator_organization_id)
            .bind(vendor_id)
            .bind(input.amount)
            .bind(input.due_on)
            .fetch_one(pool)
            .await
    }

    /// Find an invoice by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List invoices, newest first. When `operator_organization_id` is
    /// `Some`, filters to that operator's invoices (operator view).
    pub async fn list(
        pool: &PgPool,
        operator_organization_id: Option<DbId>,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        match operator_organization_id {
            Some(org) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM invoices \
                     WHERE operator_organization_id = $1 \
                     ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, Invoice>(&query)
                    .bind(org)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query =
                    format!("SELECT {COLUMNS} FROM invoices ORDER BY created_at DESC");
                sqlx::query_as::<_, Invoice>(&query).fetch_all(pool).await
            }
        }
    }

    /// Patch invoice fields. Setting status to SENT stamps `issued_at` the
    /// first time. Fields left `None` are unchanged.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInvoice,
    ) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET \
                 status = COALESCE($2, status), \
                 amount = COALESCE($3, amount), \
                 due_on = COALESCE($4, due_on), \
                 issued_at = CASE \
                     WHEN $2 = 'SENT' AND issued_at IS NULL THEN NOW() \
                     ELSE issued_at \
                 END, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(&input.status)
            .bind(input.amount)
            .bind(input.due_on)
            .fetch_one(pool)
            .await
    }
}
