//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! One probe loop per ServicePool:
//!     Periodic tick
//!     → One concurrent TCP connect per replica (bounded timeout)
//!     → set_liveness on the replica
//!     → Transition events logged, health gauge updated
//! ```
//!
//! # Design Decisions
//! - A bare TCP connect is the sole health signal
//! - Probe outcomes never surface to clients; strategies just observe the
//!   flag on their next selection
//! - No faster retry and no backoff on failure: the next attempt happens
//!   on the next regular tick

pub mod probe;

pub use probe::{HealthProbe, ProbeError};
