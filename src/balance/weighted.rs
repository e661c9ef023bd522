//! Weighted round-robin balancing strategy.

use std::sync::{Arc, Mutex};

use crate::balance::replica::Replica;
use crate::balance::{BalancingStrategy, SelectError};

/// Weighted round-robin selector.
///
/// Like round robin, but each replica's "weight" metadata (default 1) is
/// the number of consecutive selections it receives before its turn passes
/// to the next replica in pool order. A replica with weight W behaves like
/// W copies of a weight-1 replica taking their turns back to back, not a
/// globally interleaved shuffle.
#[derive(Debug, Default)]
pub struct WeightedRoundRobin {
    state: Mutex<TurnState>,
}

/// Per-replica turn counters plus the cursor of the active turn.
///
/// The counters are sized to the pool on first use. The pool is immutable
/// after construction; feeding this strategy pools of different lengths
/// would reset the rotation.
#[derive(Debug, Default)]
struct TurnState {
    counts: Vec<u32>,
    cursor: usize,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalancingStrategy for WeightedRoundRobin {
    fn next(&self, pool: &[Arc<Replica>]) -> Result<Arc<Replica>, SelectError> {
        if pool.is_empty() {
            return Err(SelectError::NoAvailableReplicas);
        }

        let mut state = self.state.lock().unwrap();
        if state.counts.len() != pool.len() {
            state.counts = vec![0; pool.len()];
            state.cursor = 0;
        }

        let mut dead = 0;
        while dead < pool.len() {
            let cursor = state.cursor;
            let candidate = &pool[cursor];

            if !candidate.is_alive() {
                // A dead replica forfeits the rest of its turn.
                dead += 1;
                state.counts[cursor] = 0;
                state.cursor = (cursor + 1) % pool.len();
                continue;
            }

            let weight = candidate.metadata_int("weight", 1).max(1);
            if state.counts[cursor] < weight {
                // Still inside its turn: keep the cursor here.
                state.counts[cursor] += 1;
                return Ok(Arc::clone(candidate));
            }

            // Turn exhausted: rotate. This does not count as a scan step,
            // so a replica whose turn just ended is still eligible when
            // the cursor wraps back around within this call.
            state.counts[cursor] = 0;
            state.cursor = (cursor + 1) % pool.len();
        }

        Err(SelectError::NoAvailableReplicas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::tests::{pool_of, weighted_pool};

    #[test]
    fn weights_bound_each_turn() {
        let wrr = WeightedRoundRobin::new();
        let pool = weighted_pool(&[(9001, "1"), (9002, "3")]);

        // Weight W means exactly W consecutive selections per turn.
        let trace: Vec<_> = (0..8).map(|_| wrr.next(&pool).unwrap().addr).collect();
        let r1 = pool[0].addr;
        let r2 = pool[1].addr;
        assert_eq!(trace, vec![r1, r2, r2, r2, r1, r2, r2, r2]);
    }

    #[test]
    fn missing_or_unparsable_weight_defaults_to_one() {
        let wrr = WeightedRoundRobin::new();
        let pool = weighted_pool(&[(9001, "not-a-number"), (9002, "1")]);

        let trace: Vec<_> = (0..4).map(|_| wrr.next(&pool).unwrap().addr).collect();
        assert_eq!(trace, vec![pool[0].addr, pool[1].addr, pool[0].addr, pool[1].addr]);
    }

    #[test]
    fn dead_replica_forfeits_its_turn() {
        let wrr = WeightedRoundRobin::new();
        let pool = weighted_pool(&[(9001, "3"), (9002, "2")]);

        // First selection lands mid-turn on the heavy replica.
        assert_eq!(wrr.next(&pool).unwrap().addr, pool[0].addr);
        pool[0].set_liveness(false);

        // Its remaining selections are dropped; the turn moves on.
        assert_eq!(wrr.next(&pool).unwrap().addr, pool[1].addr);
        assert_eq!(wrr.next(&pool).unwrap().addr, pool[1].addr);

        // Once recovered it starts a full fresh turn.
        pool[0].set_liveness(true);
        let trace: Vec<_> = (0..3).map(|_| wrr.next(&pool).unwrap().addr).collect();
        assert_eq!(trace, vec![pool[0].addr, pool[0].addr, pool[0].addr]);
    }

    #[test]
    fn exhausted_turn_still_wraps_back_within_one_call() {
        let wrr = WeightedRoundRobin::new();
        let pool = weighted_pool(&[(9001, "1"), (9002, "1")]);
        pool[1].set_liveness(false);

        // The sole live replica is re-eligible immediately after its turn
        // ends, every call.
        for _ in 0..5 {
            assert_eq!(wrr.next(&pool).unwrap().addr, pool[0].addr);
        }
    }

    #[test]
    fn all_dead_fails() {
        let wrr = WeightedRoundRobin::new();
        let pool = pool_of(&[9001, 9002]);
        for replica in &pool {
            replica.set_liveness(false);
        }

        assert_eq!(wrr.next(&pool).unwrap_err(), SelectError::NoAvailableReplicas);
    }
}
