//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → request.rs (attach request ID)
//!     → routing registry resolves the pool
//!     → strategy selects a live replica
//!     → hyper client forwards, response relayed verbatim
//! ```

pub mod request;
pub mod server;

pub use server::{HttpServer, ServerError};
