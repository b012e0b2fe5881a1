//! Event-to-notification routing engine.
//!
//! [`NotificationRouter`] consumes platform events and, for each event,
//! resolves the target users, writes an in-app notification row, and sends
//! best-effort email/SMS. Delivery failures are logged with the entity id,
//! event type, and channel (enough context for manual replay) and never
//! propagate: the transaction that produced the event has already
//! committed.

use dtg_core::roles::ROLE_ADMIN;
use dtg_core::types::DbId;
use dtg_db::models::notification::{CHANNEL_EMAIL, CHANNEL_IN_APP, CHANNEL_SMS};
use dtg_db::models::user::User;
use dtg_db::repositories::{NotificationRepo, UserRepo};
use dtg_db::DbPool;
use dtg_events::bus::{
    EVENT_JOB_ACCEPTED, EVENT_JOB_ARRIVED, EVENT_JOB_COMPLETED, EVENT_REQUEST_DISPATCHED,
    EVENT_REQUEST_READY,
};
use dtg_events::delivery::{EmailDelivery, SmsDelivery};
use dtg_events::PlatformEvent;
use tokio::sync::broadcast;

use crate::config::NotificationSettings;

/// Routes platform events to user notifications.
pub struct NotificationRouter {
    pool: DbPool,
    email: Option<EmailDelivery>,
    sms: Option<SmsDelivery>,
}

impl NotificationRouter {
    /// Create a new router. Channel transports are built once from the
    /// injected settings; unconfigured channels stay disabled for the
    /// process lifetime.
    pub fn new(pool: DbPool, settings: &NotificationSettings) -> Self {
        Self {
            pool,
            email: settings.email.clone().map(EmailDelivery::new),
            sms: settings.sms.clone().map(SmsDelivery::new),
        }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](dtg_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            entity_id = event.source_entity_id,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Route a single event to all affected users.
    async fn route_event(&self, event: &PlatformEvent) -> Result<(), sqlx::Error> {
        let targets = self.determine_targets(event).await?;
        if targets.is_empty() {
            return Ok(());
        }

        let message = summarize(event);
        for user in targets {
            self.deliver_to_user(&user, event, &message).await;
        }
        Ok(())
    }

    /// Determine which users should receive a notification for the event.
    ///
    /// - Dispatch offers go to the assigned vendor's users.
    /// - Job milestones go to the owning operator organization's users.
    /// - Manual-dispatch queue events go to all active admins.
    async fn determine_targets(&self, event: &PlatformEvent) -> Result<Vec<User>, sqlx::Error> {
        match event.event_type.as_str() {
            EVENT_REQUEST_DISPATCHED => match payload_id(event, "vendor_id") {
                Some(vendor_id) => UserRepo::list_by_vendor(&self.pool, vendor_id).await,
                None => Ok(vec![]),
            },
            EVENT_JOB_ACCEPTED | EVENT_JOB_ARRIVED | EVENT_JOB_COMPLETED => {
                match payload_id(event, "organization_id") {
                    Some(org_id) => UserRepo::list_by_organization(&self.pool, org_id).await,
                    None => Ok(vec![]),
                }
            }
            EVENT_REQUEST_READY => self.get_admin_users().await,
            _ => Ok(vec![]),
        }
    }

    /// Query all active users with the admin role.
    async fn get_admin_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, email, password_hash, full_name, role, organization_id, vendor_id, \
                    phone, is_active, created_at, updated_at \
             FROM users WHERE role = $1 AND is_active = true",
        )
        .bind(ROLE_ADMIN)
        .fetch_all(&self.pool)
        .await
    }

    /// Write the in-app row and push the configured outbound channels.
    async fn deliver_to_user(&self, user: &User, event: &PlatformEvent, message: &str) {
        if let Err(e) = NotificationRepo::create(
            &self.pool,
            user.id,
            &event.event_type,
            message,
            &event.payload,
            CHANNEL_IN_APP,
        )
        .await
        {
            tracing::error!(
                user_id = user.id,
                event_type = %event.event_type,
                entity_id = event.source_entity_id,
                channel = CHANNEL_IN_APP,
                error = %e,
                "Failed to persist notification"
            );
        }

        if let Some(email) = &self.email {
            let subject = format!("[DispatchToGo] {}", event.event_type);
            if let Err(e) = email.deliver(&user.email, &subject, message).await {
                tracing::warn!(
                    user_id = user.id,
                    event_type = %event.event_type,
                    entity_id = event.source_entity_id,
                    channel = CHANNEL_EMAIL,
                    error = %e,
                    "Email delivery failed"
                );
            }
        }

        if let (Some(sms), Some(phone)) = (&self.sms, &user.phone) {
            if let Err(e) = sms.deliver(phone, message).await {
                tracing::warn!(
                    user_id = user.id,
                    event_type = %event.event_type,
                    entity_id = event.source_entity_id,
                    channel = CHANNEL_SMS,
                    error = %e,
                    "SMS delivery failed"
                );
            }
        }
    }
}

/// Extract an id field from the event payload.
fn payload_id(event: &PlatformEvent, key: &str) -> Option<DbId> {
    event.payload.get(key).and_then(|v| v.as_i64())
}

/// Build the human-readable notification message for an event.
fn summarize(event: &PlatformEvent) -> String {
    let reference = event
        .payload
        .get("reference_number")
        .and_then(|v| v.as_str())
        .unwrap_or("(unknown)");

    match event.event_type.as_str() {
        EVENT_REQUEST_DISPATCHED => {
            format!("New job offer: service request {reference} has been assigned to you")
        }
        EVENT_REQUEST_READY => {
            format!("Service request {reference} has no matching vendor and needs manual dispatch")
        }
        EVENT_JOB_ACCEPTED => format!("Service request {reference} was accepted by the vendor"),
        EVENT_JOB_ARRIVED => format!("The vendor has arrived on site for request {reference}"),
        EVENT_JOB_COMPLETED => format!("Work on service request {reference} is complete"),
        other => format!("Update on service request {reference}: {other}"),
    }
}
