//! Repository for the `jobs` table and its child collections.
//!
//! Dispatch (job insert + parent request status) is a single transaction
//! here so the two writes can never be observed separately. Duplicate
//! dispatch attempts lose the race on `uq_jobs_service_request_id` and
//! surface as a unique violation for the API layer to classify.

use dtg_core::job_action::JobAction;
use dtg_core::job_status::JobStatus;
use dtg_core::request_status::RequestStatus;
use dtg_core::types::DbId;
use sqlx::PgPool;

use crate::models::job::{
    CreateJobMaterial, CreateJobNote, CreateJobPhoto, Job, JobListQuery, JobMaterial, JobNote,
    JobPhoto, UpdateJob,
};

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, service_request_id, vendor_id, organization_id, status, \
    accepted_at, en_route_at, arrived_at, completed_at, \
    vendor_notes, total_labour_hours, total_materials_cost, total_cost, \
    created_at, updated_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for dispatched jobs.
pub struct JobRepo;

impl JobRepo {
    /// Atomically create a job (status OFFERED) and advance the parent
    /// request to DISPATCHED.
    ///
    /// Exactly one of {job created + DISPATCHED} or {no job + unchanged
    /// request} holds afterwards; a partial write is never visible.
    pub async fn dispatch(
        pool: &PgPool,
        service_request_id: DbId,
        vendor_id: DbId,
        organization_id: DbId,
    ) -> Result<Job, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO jobs (service_request_id, vendor_id, organization_id, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(service_request_id)
            .bind(vendor_id)
            .bind(organization_id)
            .bind(JobStatus::Offered.as_str())
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE service_requests SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(service_request_id)
        .bind(RequestStatus::Dispatched.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(job)
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the (at most one) job for a service request.
    pub async fn find_by_service_request(
        pool: &PgPool,
        service_request_id: DbId,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE service_request_id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(service_request_id)
            .fetch_optional(pool)
            .await
    }

    /// List jobs with optional status filter and pagination.
    ///
    /// When `vendor_id` is `Some`, filters to that vendor's jobs; when
    /// `None`, returns all jobs (admin view).
    pub async fn list(
        pool: &PgPool,
        vendor_id: Option<DbId>,
        params: &JobListQuery,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if vendor_id.is_some() {
            conditions.push(format!("vendor_id = ${bind_idx}"));
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
            "SELECT {COLUMNS} FROM jobs \
             {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Job>(&query);
        if let Some(vid) = vendor_id {
            q = q.bind(vid);
        }
        if let Some(status) = &params.status {
            q = q.bind(status);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Stamp the milestone for `action` and set the resulting status.
    ///
    /// Repeating an action overwrites its timestamp with the later value;
    /// no milestone is ever cleared.
    pub async fn apply_action(
        pool: &PgPool,
        job_id: DbId,
        action: JobAction,
    ) -> Result<Job, sqlx::Error> {
        let column = match action {
            JobAction::Accept => "accepted_at",
            JobAction::EnRoute => "en_route_at",
            JobAction::Arrive => "arrived_at",
            JobAction::Complete => "completed_at",
        };
        let query = format!(
            "UPDATE jobs \
             SET {column} = NOW(), status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(action.resulting_status().as_str())
            .fetch_one(pool)
            .await
    }

    /// Patch the free-form side-effect fields (notes, totals). Fields left
    /// `None` are unchanged.
    pub async fn update_details(
        pool: &PgPool,
        job_id: DbId,
        input: &UpdateJob,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET \
                 vendor_notes = COALESCE($2, vendor_notes), \
                 total_labour_hours = COALESCE($3, total_labour_hours), \
                 total_materials_cost = COALESCE($4, total_materials_cost), \
                 total_cost = COALESCE($5, total_cost), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(&input.vendor_notes)
            .bind(input.total_labour_hours)
            .bind(input.total_materials_cost)
            .bind(input.total_cost)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Child collections
    // -----------------------------------------------------------------------

    /// Append a note to a job.
    pub async fn add_note(
        pool: &PgPool,
        job_id: DbId,
        author_user_id: DbId,
        input: &CreateJobNote,
    ) -> Result<JobNote, sqlx::Error> {
        sqlx::query_as::<_, JobNote>(
            "INSERT INTO job_notes (job_id, author_user_id, body) \
             VALUES ($1, $2, $3) \
             RETURNING id, job_id, author_user_id, body, created_at",
        )
        .bind(job_id)
        .bind(author_user_id)
        .bind(&input.body)
        .fetch_one(pool)
        .await
    }

    /// Append a material line to a job.
    pub async fn add_material(
        pool: &PgPool,
        job_id: DbId,
        input: &CreateJobMaterial,
    ) -> Result<JobMaterial, sqlx::Error> {
        sqlx::query_as::<_, JobMaterial>(
            "INSERT INTO job_materials (job_id, description, quantity, unit_cost) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, job_id, description, quantity, unit_cost, created_at",
        )
        .bind(job_id)
        .bind(&input.description)
        .bind(input.quantity)
        .bind(input.unit_cost)
        .fetch_one(pool)
        .await
    }

    /// Append a photo to a job.
    pub async fn add_photo(
        pool: &PgPool,
        job_id: DbId,
        input: &CreateJobPhoto,
    ) -> Result<JobPhoto, sqlx::Error> {
        sqlx::query_as::<_, JobPhoto>(
            "INSERT INTO job_photos (job_id, url, photo_type) \
             VALUES ($1, $2, COALESCE($3, 'after')) \
             RETURNING id, job_id, url, photo_type, created_at",
        )
        .bind(job_id)
        .bind(&input.url)
        .bind(&input.photo_type)
        .fetch_one(pool)
        .await
    }

    /// List a job's notes, oldest first.
    pub async fn list_notes(pool: &PgPool, job_id: DbId) -> Result<Vec<JobNote>, sqlx::Error> {
        sqlx::query_as::<_, JobNote>(
            "SELECT id, job_id, author_user_id, body, created_at \
             FROM job_notes WHERE job_id = $1 ORDER BY created_at ASC",
        )
        .bind(job_id)
        .fetch_all(pool)
        .await
    }

    /// List a job's material lines, oldest first.
    pub async fn list_materials(
        pool: &PgPool,
        job_id: DbId,
    ) -> Result<Vec<JobMaterial>, sqlx::Error> {
        sqlx::query_as::<_, JobMaterial>(
            "SELECT id, job_id, description, quantity, unit_cost, created_at \
             FROM job_materials WHERE job_id = $1 ORDER BY created_at ASC",
        )
        .bind(job_id)
        .fetch_all(pool)
        .await
    }

    /// List a job's photos, oldest first.
    pub async fn list_photos(pool: &PgPool, job_id: DbId) -> Result<Vec<JobPhoto>, sqlx::Error> {
        sqlx::query_as::<_, JobPhoto>(
            "SELECT id, job_id, url, photo_type, created_at \
             FROM job_photos WHERE job_id = $1 ORDER BY created_at ASC",
        )
        .bind(job_id)
        .fetch_all(pool)
        .await
    }
}
