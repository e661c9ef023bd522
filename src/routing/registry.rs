//! Prefix-to-pool registry.
//!
//! # Responsibilities
//! - Hold one ServicePool per configured prefix
//! - Resolve a request path to a pool, or an explicit miss
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Entries ordered longest-prefix-first at build time, so resolution is
//!   deterministic when several prefixes match the same path; duplicate
//!   prefixes are rejected earlier by config validation
//! - Explicit None rather than a silent default pool

use std::sync::Arc;

use crate::balance::pool::{PoolError, ServicePool};
use crate::config::ServiceConfig;
use crate::routing::matcher::PrefixMatcher;

struct RouteEntry {
    matcher: PrefixMatcher,
    pool: Arc<ServicePool>,
}

/// Mapping from routing prefix to service pool.
pub struct Registry {
    entries: Vec<RouteEntry>,
}

impl Registry {
    /// Build the registry from configuration, one pool per service.
    pub fn from_config(services: &[ServiceConfig]) -> Result<Self, PoolError> {
        let mut entries = Vec::with_capacity(services.len());
        for service in services {
            entries.push(RouteEntry {
                matcher: PrefixMatcher::new(&service.prefix),
                pool: Arc::new(ServicePool::from_config(service)?),
            });
        }

        // Longest prefix wins; equal lengths keep configuration order
        // (the sort is stable).
        entries.sort_by(|a, b| b.matcher.prefix().len().cmp(&a.matcher.prefix().len()));

        Ok(Self { entries })
    }

    /// Resolve a request path to the pool with the longest matching prefix.
    pub fn resolve(&self, path: &str) -> Option<&Arc<ServicePool>> {
        self.entries
            .iter()
            .find(|entry| entry.matcher.matches(path))
            .map(|entry| &entry.pool)
    }

    /// All pools, for spawning one health probe per pool.
    pub fn pools(&self) -> impl Iterator<Item = &Arc<ServicePool>> {
        self.entries.iter().map(|entry| &entry.pool)
    }
}
