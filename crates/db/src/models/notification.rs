//! Notification entity models and DTOs.

use dtg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// In-app channel name.
pub const CHANNEL_IN_APP: &str = "in_app";

/// Email channel name.
pub const CHANNEL_EMAIL: &str = "email";

/// SMS channel name.
pub const CHANNEL_SMS: &str = "sms";

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub event_type: String,
    pub message: String,
    pub payload: serde_json::Value,
    pub channel: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Query parameters for `GET /api/v1/notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    /// When `true`, only unread notifications are returned.
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
