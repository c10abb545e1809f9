//! Background Tasks Module
//!
//! # Tasks
//! - Expiry cleanup: purges expired cache entries at the configured interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
