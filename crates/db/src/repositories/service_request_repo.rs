//! Repository for the `service_requests` table.

use dtg_core::request_status::RequestStatus;
use dtg_core::types::DbId;
use sqlx::PgPool;

use crate::models::service_request::{
    CreateServiceRequest, ServiceRequest, ServiceRequestListQuery,
};

/// Column list for `service_requests` queries.
const COLUMNS: &str = "\
    id, reference_number, organization_id, property_id, description, \
    category, urgency, status, triage_summary, triage_urgency_score, \
    triage_suggested_category, resolved_at, created_at, updated_at";

/// Maximum page size for request listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for request listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for service requests.
pub struct ServiceRequestRepo;

impl ServiceRequestRepo {
    /// Insert a new request in `SUBMITTED` status.
    ///
    /// The caller supplies a generated `reference_number`; on a reference
    /// collision the caller regenerates and retries (the column carries
    /// the `uq_service_requests_reference` unique index).
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        reference_number: &str,
        urgency: &str,
        input: &CreateServiceRequest,
    ) -> Result<ServiceRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO service_requests \
                 (reference_number, organization_id, property_id, description, category, urgency) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(reference_number)
            .bind(organization_id)
            .bind(input.property_id)
            .bind(&input.description)
            .bind(&input.category)
            .bind(urgency)
            .fetch_one(pool)
            .await
    }

    /// Find a request by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM service_requests WHERE id = $1");
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a request by ID scoped to an organization (operator view).
    pub async fn find_by_id_for_org(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM service_requests WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List requests with optional status filter and pagination.
    ///
    /// When `organization_id` is `Some`, filters to that organization's
    /// requests (operator view); when `None`, returns all (admin view).
    pub async fn list(
        pool: &PgPool,
        organization_id: Option<DbId>,
        params: &ServiceRequestListQuery,
    ) -> Result<Vec<ServiceRequest>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if organization_id.is_some() {
            conditions.push(format!("organization_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM service_requests \
             {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, ServiceRequest>(&query);
        if let Some(org) = organization_id {
            q = q.bind(org);
        }
        if let Some(status) = &params.status {
            q = q.bind(status);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Set the request status, returning the updated row.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: RequestStatus,
    ) -> Result<ServiceRequest, sqlx::Error> {
        let query = format!(
            "UPDATE service_requests \
             SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Set the request status only if it still has the expected current
    /// status. Returns `false` when another writer got there first.
    ///
    /// Used by the job lifecycle sync so a concurrent admin transition
    /// (e.g. forcing CANCELLED) is never silently overwritten.
    pub async fn update_status_if(
        pool: &PgPool,
        id: DbId,
        expected: RequestStatus,
        status: RequestStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE service_requests \
             SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(expected.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark the request resolved (status COMPLETED plus `resolved_at`),
    /// only if it still has the expected current status. Returns `false`
    /// when another writer got there first.
    pub async fn mark_resolved_if(
        pool: &PgPool,
        id: DbId,
        expected: RequestStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE service_requests \
             SET status = $2, resolved_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(RequestStatus::Completed.as_str())
        .bind(expected.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Patch non-status fields (urgency, description, triage fields).
    /// Fields left `None` are unchanged.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        urgency: Option<&str>,
        description: Option<&str>,
        triage_summary: Option<&str>,
        triage_urgency_score: Option<f64>,
        triage_suggested_category: Option<&str>,
    ) -> Result<ServiceRequest, sqlx::Error> {
        let query = format!(
            "UPDATE service_requests SET \
                 urgency = COALESCE($2, urgency), \
                 description = COALESCE($3, description), \
                 triage_summary = COALESCE($4, triage_summary), \
                 triage_urgency_score = COALESCE($5, triage_urgency_score), \
                 triage_suggested_category = COALESCE($6, triage_suggested_category), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(id)
            .bind(urgency)
            .bind(description)
            .bind(triage_summary)
            .bind(triage_urgency_score)
            .bind(triage_suggested_category)
            .fetch_one(pool)
            .await
    }

    /// Find SUBMITTED requests older than `cutoff` with no job.
    ///
    /// Feeds the reconciliation sweep: these are requests whose intake-time
    /// auto-dispatch never concluded (e.g. a crash mid-transaction).
    pub async fn list_stuck_submitted(
        pool: &PgPool,
        cutoff: dtg_core::types::Timestamp,
        limit: i64,
    ) -> Result<Vec<ServiceRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM service_requests r \
             WHERE r.status = $1 \
               AND r.created_at < $2 \
               AND NOT EXISTS (SELECT 1 FROM jobs j WHERE j.service_request_id = r.id) \
             ORDER BY r.created_at ASC \
             LIMIT $3"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(RequestStatus::Submitted.as_str())
            .bind(cutoff)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
