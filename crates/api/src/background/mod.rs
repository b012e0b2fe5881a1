//! Long-running background tasks spawned at startup.

pub mod dispatch_sweep;
