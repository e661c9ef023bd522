//! Service pool construction and selection.

use std::sync::Arc;

use crate::balance::replica::Replica;
use crate::balance::{BalancingStrategy, SelectError, Strategy};
use crate::config::ServiceConfig;

/// Error building a pool from configuration. Startup-fatal: a service
/// cannot exist without at least one well-formed replica.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("service '{service}' has no replicas")]
    EmptyService { service: String },

    #[error("service '{service}' replica address '{address}' is invalid")]
    InvalidAddress {
        service: String,
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// One service's ordered replica set bound to its balancing strategy.
///
/// The replica order is fixed at construction and defines the rotation
/// order. The health probe is handed the same ordered sequence.
#[derive(Debug)]
pub struct ServicePool {
    name: String,
    replicas: Vec<Arc<Replica>>,
    strategy: Strategy,
}

impl ServicePool {
    /// Build a pool from one service's configuration.
    pub fn from_config(service: &ServiceConfig) -> Result<Self, PoolError> {
        if service.replicas.is_empty() {
            return Err(PoolError::EmptyService {
                service: service.name.clone(),
            });
        }

        let mut replicas = Vec::with_capacity(service.replicas.len());
        for replica in &service.replicas {
            let addr = replica
                .address
                .parse()
                .map_err(|source| PoolError::InvalidAddress {
                    service: service.name.clone(),
                    address: replica.address.clone(),
                    source,
                })?;
            replicas.push(Arc::new(Replica::new(addr, replica.metadata.clone())));
        }

        let strategy = Strategy::from_name(&service.strategy);
        tracing::info!(
            service = %service.name,
            strategy = strategy.name(),
            replicas = replicas.len(),
            "service pool ready"
        );

        Ok(Self {
            name: service.name.clone(),
            replicas,
            strategy,
        })
    }

    /// Ask the pool's strategy for the next live replica.
    pub fn select(&self) -> Result<Arc<Replica>, SelectError> {
        self.strategy.next(&self.replicas)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered replica sequence shared with the health probe.
    pub fn replicas(&self) -> &[Arc<Replica>] {
        &self.replicas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReplicaConfig;

    fn config(name: &str, strategy: &str, addresses: &[&str]) -> ServiceConfig {
        ServiceConfig {
            name: name.to_string(),
            prefix: "/".to_string(),
            strategy: strategy.to_string(),
            replicas: addresses
                .iter()
                .map(|a| ReplicaConfig {
                    address: a.to_string(),
                    metadata: Default::default(),
                })
                .collect(),
        }
    }

    #[test]
    fn builds_pool_and_rotates() {
        let pool =
            ServicePool::from_config(&config("api", "RoundRobin", &["127.0.0.1:9001", "127.0.0.1:9002"]))
                .unwrap();

        assert_eq!(pool.name(), "api");
        assert_eq!(pool.replicas().len(), 2);

        let first = pool.select().unwrap().addr;
        let second = pool.select().unwrap().addr;
        assert_ne!(first, second);
    }

    #[test]
    fn empty_replica_list_is_fatal() {
        let err = ServicePool::from_config(&config("api", "RoundRobin", &[])).unwrap_err();
        assert!(matches!(err, PoolError::EmptyService { .. }));
    }

    #[test]
    fn malformed_address_is_fatal() {
        let err =
            ServicePool::from_config(&config("api", "RoundRobin", &["nine-thousand-and-one"]))
                .unwrap_err();
        assert!(matches!(err, PoolError::InvalidAddress { .. }));
    }
}
