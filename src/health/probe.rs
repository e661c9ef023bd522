//! Active health probing.
//!
//! # Responsibilities
//! - Periodically test each replica's reachability
//! - Write the liveness flag the strategies read
//! - Log liveness transitions

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::{broadcast, Semaphore};
use tokio::time;

use crate::balance::replica::Replica;
use crate::config::HealthCheckConfig;
use crate::observability::metrics;

/// Error constructing a probe. Startup-fatal, like the pool errors.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("service '{service}' has no replicas to probe")]
    EmptyPool { service: String },
}

/// Background prober bound to one service pool's replica sequence.
///
/// A replica is considered reachable if a TCP connection to its address
/// opens within the configured timeout; no payload is exchanged. Probe
/// failures stay internal: they only flip the liveness flag and emit a
/// transition event, and the next attempt waits for the next regular tick.
#[derive(Debug)]
pub struct HealthProbe {
    service: String,
    replicas: Vec<Arc<Replica>>,
    interval: Duration,
    timeout: Duration,
    /// Caps outstanding probe tasks at the pool size. Ticks may overlap a
    /// slow probe; a replica whose probe is still in flight is skipped
    /// rather than queued.
    limiter: Arc<Semaphore>,
}

impl HealthProbe {
    /// Create a probe over a pool's ordered replica sequence.
    pub fn new(
        service: impl Into<String>,
        replicas: Vec<Arc<Replica>>,
        config: &HealthCheckConfig,
    ) -> Result<Self, ProbeError> {
        let service = service.into();
        if replicas.is_empty() {
            return Err(ProbeError::EmptyPool { service });
        }

        let limiter = Arc::new(Semaphore::new(replicas.len()));
        Ok(Self {
            service,
            replicas,
            interval: Duration::from_secs(config.interval_secs),
            timeout: Duration::from_secs(config.timeout_secs),
            limiter,
        })
    }

    /// Run the probe loop until the shutdown signal fires.
    ///
    /// The first tick completes immediately, so an unreachable replica is
    /// noticed at startup rather than one interval later.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            service = %self.service,
            interval_secs = self.interval.as_secs(),
            replicas = self.replicas.len(),
            "health probe starting"
        );

        let mut ticker = time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.probe_all();
                }
                _ = shutdown.recv() => {
                    tracing::info!(service = %self.service, "health probe stopping");
                    break;
                }
            }
        }
    }

    /// Dispatch one probe task per replica without awaiting completion, so
    /// one unreachable replica never delays probing the others.
    fn probe_all(&self) {
        for replica in &self.replicas {
            let Ok(permit) = Arc::clone(&self.limiter).try_acquire_owned() else {
                tracing::debug!(
                    service = %self.service,
                    addr = %replica.addr,
                    "previous probe still in flight, skipping this tick"
                );
                continue;
            };

            let service = self.service.clone();
            let replica = Arc::clone(replica);
            let timeout = self.timeout;
            tokio::spawn(async move {
                probe_replica(&service, &replica, timeout).await;
                drop(permit);
            });
        }
    }
}

async fn probe_replica(service: &str, replica: &Replica, timeout: Duration) {
    let reachable = matches!(
        time::timeout(timeout, TcpStream::connect(replica.addr)).await,
        Ok(Ok(_))
    );

    if reachable {
        let was_alive = replica.set_liveness(true);
        if !was_alive {
            tracing::info!(service = %service, addr = %replica.addr, "replica recovered");
        }
    } else {
        let was_alive = replica.set_liveness(false);
        if was_alive {
            tracing::warn!(service = %service, addr = %replica.addr, "replica unreachable");
        }
    }

    metrics::record_replica_health(&replica.addr.to_string(), reachable);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::tests::pool_of;

    fn config(interval_secs: u64) -> HealthCheckConfig {
        HealthCheckConfig {
            enabled: true,
            interval_secs,
            timeout_secs: 1,
        }
    }

    #[test]
    fn empty_pool_is_a_startup_error() {
        let err = HealthProbe::new("api", Vec::new(), &config(10)).unwrap_err();
        assert!(matches!(err, ProbeError::EmptyPool { .. }));
    }

    #[tokio::test]
    async fn probe_marks_unreachable_replica_dead() {
        // Nothing listens on this port; the connect is refused immediately.
        let pool = pool_of(&[1]);
        assert!(pool[0].is_alive());

        probe_replica("api", &pool[0], Duration::from_secs(1)).await;
        assert!(!pool[0].is_alive());
    }

    #[tokio::test]
    async fn probe_marks_reachable_replica_alive_again() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let replica = Replica::new(addr, Default::default());
        replica.set_liveness(false);

        probe_replica("api", &replica, Duration::from_secs(1)).await;
        assert!(replica.is_alive());
    }

    #[tokio::test]
    async fn run_exits_on_shutdown_signal() {
        let probe = HealthProbe::new("api", pool_of(&[1]), &config(3600)).unwrap();
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(probe.run(rx));
        tx.send(()).unwrap();

        time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("probe loop should stop on shutdown")
            .unwrap();
    }
}
