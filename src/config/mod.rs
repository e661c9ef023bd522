//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, all errors collected)
//!     → BalancerConfig (validated, immutable)
//!     → consumed once at startup by registry/probe construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the registry is built from it exactly
//!   once and changing it requires a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::BalancerConfig;
pub use schema::HealthCheckConfig;
pub use schema::ReplicaConfig;
pub use schema::ServiceConfig;
