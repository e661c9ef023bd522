//! Round-robin balancing strategy.

use std::sync::{Arc, Mutex};

use crate::balance::replica::Replica;
use crate::balance::{BalancingStrategy, SelectError};

/// Round-robin selector.
///
/// Holds a cursor into the pool, shared across all callers. The whole
/// decision runs under one lock: the cursor advance and the liveness check
/// must be observed together or two callers could select the same position.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: Mutex<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalancingStrategy for RoundRobin {
    fn next(&self, pool: &[Arc<Replica>]) -> Result<Arc<Replica>, SelectError> {
        if pool.is_empty() {
            return Err(SelectError::NoAvailableReplicas);
        }

        let mut cursor = self.cursor.lock().unwrap();
        for _ in 0..pool.len() {
            let candidate = &pool[*cursor];
            // Advance past dead candidates too, so the next call starts
            // from a fresh position.
            *cursor = (*cursor + 1) % pool.len();
            if candidate.is_alive() {
                return Ok(Arc::clone(candidate));
            }
        }

        Err(SelectError::NoAvailableReplicas)
    }
}
