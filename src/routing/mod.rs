//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → registry.rs (ordered prefix lookup)
//!     → matcher.rs (evaluate prefix condition)
//!     → Return: matched ServicePool or None
//!
//! Registry construction (at startup):
//!     ServiceConfig[]
//!     → Build one pool per service
//!     → Sort entries longest-prefix-first
//!     → Freeze as immutable Registry
//! ```

pub mod matcher;
pub mod registry;

pub use registry::Registry;
