//! Prefix-routed HTTP load balancer.
//!
//! Incoming requests are matched to a service by path prefix; each service
//! owns an ordered pool of backend replicas, a balancing strategy, and a
//! background health probe that keeps the pool's liveness beliefs current.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Traffic management
pub mod balance;
pub mod health;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::BalancerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
