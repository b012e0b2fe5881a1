//! Vendor dispatch engine.
//!
//! Two entry points share the same assignment semantics:
//!
//! - [`DispatchEngine::auto_dispatch`] runs synchronously right after
//!   request intake. It swallows every error (the creating request must
//!   not fail because matching did); a request it could not conclude stays
//!   SUBMITTED and is retried by the reconciliation sweep.
//! - [`DispatchEngine::dispatch`] is the admin's manual path with full
//!   precondition checking.
//!
//! Job creation and the request status advance commit in one transaction
//! ([`JobRepo::dispatch`]); the dispatch notification is published to the
//! event bus only after that commit and can never roll it back.

use std::sync::Arc;

use dtg_core::error::CoreError;
use dtg_core::matching::{select_vendor, VendorCandidate};
use dtg_core::request_status::RequestStatus;
use dtg_core::types::DbId;
use dtg_db::models::job::Job;
use dtg_db::repositories::{JobRepo, ServiceRequestRepo, VendorRepo};
use dtg_db::DbPool;
use dtg_events::bus::{EVENT_REQUEST_DISPATCHED, EVENT_REQUEST_READY};
use dtg_events::{EventBus, PlatformEvent};

use crate::error::{is_unique_violation, AppError, AppResult};

/// Unique constraint enforcing one job per service request.
const UQ_JOB_PER_REQUEST: &str = "uq_jobs_service_request_id";

/// Assigns vendors to service requests and keeps the request status
/// consistent with job existence.
pub struct DispatchEngine {
    pool: DbPool,
    event_bus: Arc<EventBus>,
}

impl DispatchEngine {
    /// Create an engine over the shared pool and event bus.
    pub fn new(pool: DbPool, event_bus: Arc<EventBus>) -> Self {
        Self { pool, event_bus }
    }

    /// Attempt automatic dispatch for a freshly submitted request.
    ///
    /// Never propagates errors: failures are logged and the request stays
    /// SUBMITTED for the reconciliation sweep to retry. Returns the created
    /// job when a vendor matched, for inclusion in the intake response.
    pub async fn auto_dispatch(&self, request_id: DbId) -> Option<Job> {
        match self.try_auto_dispatch(request_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    request_id,
                    error = %e,
                    "Auto-dispatch failed; request left for reconciliation sweep",
                );
                None
            }
        }
    }

    /// One auto-dispatch attempt. Exactly one of {job created + DISPATCHED}
    /// or {no job + READY_TO_DISPATCH} holds on success.
    async fn try_auto_dispatch(&self, request_id: DbId) -> AppResult<Option<Job>> {
        let request = ServiceRequestRepo::find_by_id(&self.pool, request_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "ServiceRequest",
                id: request_id,
            }))?;

        // Only SUBMITTED requests are auto-dispatched; anything else has
        // already been routed (possibly by a concurrent sweep run).
        if request.status()? != RequestStatus::Submitted {
            tracing::debug!(request_id, status = %request.status, "Skipping auto-dispatch");
            return Ok(None);
        }
        if JobRepo::find_by_service_request(&self.pool, request_id)
            .await?
            .is_some()
        {
            tracing::debug!(request_id, "Job already exists, skipping auto-dispatch");
            return Ok(None);
        }

        let candidates = self.load_candidates().await?;
        match select_vendor(&request.category, &candidates) {
            None => {
                ServiceRequestRepo::update_status(
                    &self.pool,
                    request_id,
                    RequestStatus::ReadyToDispatch,
                )
                .await?;

                tracing::info!(
                    request_id,
                    category = %request.category,
                    "No matching vendor; request queued for manual dispatch",
                );
                self.event_bus.publish(
                    PlatformEvent::new(EVENT_REQUEST_READY)
                        .with_source("service_request", request_id)
                        .with_payload(serde_json::json!({
                            "reference_number": request.reference_number,
                            "category": request.category,
                        })),
                );
                Ok(None)
            }
            Some(vendor_id) => {
                let job = match JobRepo::dispatch(
                    &self.pool,
                    request_id,
                    vendor_id,
                    request.organization_id,
                )
                .await
                {
                    Ok(job) => job,
                    Err(e) if is_unique_violation(&e, UQ_JOB_PER_REQUEST) => {
                        // A concurrent dispatcher won the race; the request
                        // is in good hands.
                        tracing::warn!(request_id, "Lost dispatch race, job already created");
                        return Ok(None);
                    }
                    Err(e) => return Err(e.into()),
                };

                tracing::info!(
                    request_id,
                    job_id = job.id,
                    vendor_id,
                    category = %request.category,
                    "Request auto-dispatched",
                );
                self.publish_dispatched(&job, &request.reference_number, None);
                Ok(Some(job))
            }
        }
    }

    /// Manual admin dispatch of a request to a chosen vendor.
    ///
    /// Preconditions: the request exists and is not CANCELLED, the vendor
    /// exists, and no job exists yet for the request. A concurrent
    /// duplicate loses on the unique constraint and surfaces as Conflict.
    pub async fn dispatch(
        &self,
        request_id: DbId,
        vendor_id: DbId,
        actor_user_id: DbId,
    ) -> AppResult<Job> {
        let request = ServiceRequestRepo::find_by_id(&self.pool, request_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "ServiceRequest",
                id: request_id,
            }))?;

        if request.status()? == RequestStatus::Cancelled {
            return Err(AppError::Core(CoreError::InvalidState(
                "Cannot dispatch a cancelled request".into(),
            )));
        }

        VendorRepo::find_by_id(&self.pool, vendor_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Vendor",
                id: vendor_id,
            }))?;

        if JobRepo::find_by_service_request(&self.pool, request_id)
            .await?
            .is_some()
        {
            return Err(AppError::Core(CoreError::Conflict(
                "A job already exists for this request".into(),
            )));
        }

        let job = JobRepo::dispatch(&self.pool, request_id, vendor_id, request.organization_id)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, UQ_JOB_PER_REQUEST) {
                    AppError::Core(CoreError::Conflict(
                        "A job already exists for this request".into(),
                    ))
                } else {
                    e.into()
                }
            })?;

        tracing::info!(
            request_id,
            job_id = job.id,
            vendor_id,
            actor_user_id,
            "Request manually dispatched",
        );
        self.publish_dispatched(&job, &request.reference_number, Some(actor_user_id));
        Ok(job)
    }

    /// Load the candidate snapshot: active vendors with skills and open-job
    /// counts. The counts race with concurrent dispatches; acceptable for a
    /// load-balancing heuristic.
    async fn load_candidates(&self) -> Result<Vec<VendorCandidate>, sqlx::Error> {
        let rows = VendorRepo::list_active_candidates(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|r| VendorCandidate {
                vendor_id: r.id,
                skills: r.skills,
                open_jobs: r.open_jobs,
            })
            .collect())
    }

    /// Fire-and-forget the dispatch notification event.
    fn publish_dispatched(&self, job: &Job, reference_number: &str, actor: Option<DbId>) {
        let mut event = PlatformEvent::new(EVENT_REQUEST_DISPATCHED)
            .with_source("service_request", job.service_request_id)
            .with_payload(serde_json::json!({
                "job_id": job.id,
                "vendor_id": job.vendor_id,
                "reference_number": reference_number,
            }));
        if let Some(user_id) = actor {
            event = event.with_actor(user_id);
        }
        self.event_bus.publish(event);
    }
}
