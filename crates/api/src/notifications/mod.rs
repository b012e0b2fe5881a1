//! Notification routing infrastructure.
//!
//! The [`NotificationRouter`] subscribes to the event bus and delivers
//! notifications to affected users: an in-app row always, plus email/SMS
//! when those channels are configured.

pub mod router;

pub use router::NotificationRouter;
