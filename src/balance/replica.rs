//! Replica abstraction.
//!
//! # Responsibilities
//! - Represent a single backend endpoint
//! - Carry static metadata (capacity weight, etc.)
//! - Track liveness as written by the health probe

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

/// A single backend replica.
///
/// The liveness flag is written only by the health probe and read by the
/// selection strategies. An atomic swap returns the previous value so the
/// probe can detect a transition without a separate read.
#[derive(Debug)]
pub struct Replica {
    /// The address of the replica.
    pub addr: SocketAddr,
    /// Static string-keyed metadata from configuration.
    metadata: HashMap<String, String>,
    /// Current liveness belief.
    alive: AtomicBool,
}

impl Replica {
    /// Create a new replica.
    ///
    /// Replicas start alive; the first probe tick corrects the belief for
    /// endpoints that are actually unreachable.
    pub fn new(addr: SocketAddr, metadata: HashMap<String, String>) -> Self {
        Self {
            addr,
            metadata,
            alive: AtomicBool::new(true),
        }
    }

    /// Report the current liveness belief.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Set the liveness flag, returning the previous value.
    pub fn set_liveness(&self, alive: bool) -> bool {
        self.alive.swap(alive, Ordering::Relaxed)
    }

    /// Return the metadata value for `key`, or `default` if absent.
    pub fn metadata(&self, key: &str, default: &str) -> String {
        self.metadata
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Return the metadata value for `key` parsed as an integer, or
    /// `default` if the key is absent or the value does not parse.
    pub fn metadata_int(&self, key: &str, default: u32) -> u32 {
        self.metadata
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
