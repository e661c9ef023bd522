//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup: load config → validate → build registry and probes → serve
//! Shutdown: SIGTERM/SIGINT → broadcast → probes stop, server drains
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Every long-running task subscribes to one broadcast channel

pub mod shutdown;

pub use shutdown::Shutdown;
