//! Outbound notification delivery channels.

pub mod email;
pub mod sms;

pub use email::{EmailConfig, EmailDelivery};
pub use sms::{SmsConfig, SmsDelivery};
