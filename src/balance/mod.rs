//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Prefix matched → ServicePool identified
//!     → Strategy.next(replicas):
//!         - round_robin.rs (rotate through live replicas)
//!         - weighted.rs (turn-based rotation bounded by weight)
//!     → Return live replica or SelectError
//! ```
//!
//! # Design Decisions
//! - The replica sequence is immutable after construction; only the
//!   liveness flag inside each replica mutates
//! - Strategy state is private to the strategy and serialized under one
//!   mutex per pool; the decision involves dependent reads and writes of
//!   the cursor and counters
//! - Strategies are an explicit enum built from the configured name, with
//!   RoundRobin as the fallback so a pool is never left without one

pub mod pool;
pub mod replica;
pub mod round_robin;
pub mod weighted;

use std::sync::Arc;

use self::replica::Replica;
use self::round_robin::RoundRobin;
use self::weighted::WeightedRoundRobin;

/// Selection failure.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// Every replica in the pool is currently believed dead.
    #[error("no available replicas")]
    NoAvailableReplicas,
}

/// The balancing abstraction every strategy implements.
///
/// `next` must be safe to call concurrently from many request handlers
/// against the same pool.
pub trait BalancingStrategy: Send + Sync {
    /// Choose the next live replica from an ordered pool.
    fn next(&self, pool: &[Arc<Replica>]) -> Result<Arc<Replica>, SelectError>;
}

/// The configured strategy of one service pool.
#[derive(Debug)]
pub enum Strategy {
    RoundRobin(RoundRobin),
    WeightedRoundRobin(WeightedRoundRobin),
}

impl Strategy {
    /// Resolve a strategy from its configured name, falling back to
    /// RoundRobin when the name is not recognized.
    pub fn from_name(name: &str) -> Self {
        match name {
            "RoundRobin" => Strategy::RoundRobin(RoundRobin::new()),
            "WeightedRoundRobin" => Strategy::WeightedRoundRobin(WeightedRoundRobin::new()),
            other => {
                tracing::warn!(
                    strategy = %other,
                    "unknown strategy name, falling back to RoundRobin"
                );
                Strategy::RoundRobin(RoundRobin::new())
            }
        }
    }

    /// The canonical name of the resolved strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::RoundRobin(_) => "RoundRobin",
            Strategy::WeightedRoundRobin(_) => "WeightedRoundRobin",
        }
    }
}

impl BalancingStrategy for Strategy {
    fn next(&self, pool: &[Arc<Replica>]) -> Result<Arc<Replica>, SelectError> {
        match self {
            Strategy::RoundRobin(s) => s.next(pool),
            Strategy::WeightedRoundRobin(s) => s.next(pool),
        }
    }
}
