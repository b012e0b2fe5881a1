//! Platform event bus and outbound notification delivery.
//!
//! Status transitions publish [`PlatformEvent`]s to the in-process
//! [`EventBus`]; the API crate's notification router consumes them and
//! delivers through the channels in [`delivery`]. Delivery is best-effort
//! and never affects the transaction that produced the event.

pub mod bus;
pub mod delivery;

pub use bus::{EventBus, PlatformEvent};
