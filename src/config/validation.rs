//! Configuration validation.
//!
//! Serde handles the syntactic layer; this module performs the semantic
//! checks that must hold before a registry can be built. All errors are
//! collected and reported together rather than failing on the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::BalancerConfig;

/// A single semantic configuration error.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// No services are configured, so no request could ever be routed.
    NoServices,
    /// A service has an empty replica list.
    EmptyReplicaList { service: String },
    /// A replica address does not parse as host:port.
    InvalidReplicaAddress { service: String, address: String },
    /// Two services share the same prefix; resolution would be ambiguous.
    DuplicatePrefix { prefix: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoServices => {
                write!(f, "at least one service must be configured")
            }
            ValidationError::EmptyReplicaList { service } => {
                write!(f, "service '{}' has no replicas", service)
            }
            ValidationError::InvalidReplicaAddress { service, address } => {
                write!(
                    f,
                    "service '{}' has an invalid replica address '{}'",
                    service, address
                )
            }
            ValidationError::DuplicatePrefix { prefix } => {
                write!(f, "prefix '{}' is configured more than once", prefix)
            }
        }
    }
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.services.is_empty() {
        errors.push(ValidationError::NoServices);
    }

    let mut prefixes = HashSet::new();
    for service in &config.services {
        if service.replicas.is_empty() {
            errors.push(ValidationError::EmptyReplicaList {
                service: service.name.clone(),
            });
        }

        for replica in &service.replicas {
            if replica.address.parse::<SocketAddr>().is_err() {
                errors.push(ValidationError::InvalidReplicaAddress {
                    service: service.name.clone(),
                    address: replica.address.clone(),
                });
            }
        }

        if !prefixes.insert(service.prefix.clone()) {
            errors.push(ValidationError::DuplicatePrefix {
                prefix: service.prefix.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
