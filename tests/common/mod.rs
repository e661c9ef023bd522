//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use load_balancer::config::{
    BalancerConfig, HealthCheckConfig, ReplicaConfig, ServiceConfig,
};
use load_balancer::http::HttpServer;
use load_balancer::lifecycle::Shutdown;

/// Start a simple mock backend that returns a fixed body.
pub async fn start_mock_backend(addr: SocketAddr, response: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Build a single-service config routing `prefix` to the given replicas.
pub fn service_config(
    prefix: &str,
    strategy: &str,
    replica_addrs: &[SocketAddr],
    probe_interval_secs: Option<u64>,
) -> BalancerConfig {
    BalancerConfig {
        services: vec![ServiceConfig {
            name: "test-service".to_string(),
            prefix: prefix.to_string(),
            strategy: strategy.to_string(),
            replicas: replica_addrs
                .iter()
                .map(|addr| ReplicaConfig {
                    address: addr.to_string(),
                    metadata: Default::default(),
                })
                .collect(),
        }],
        health_check: HealthCheckConfig {
            enabled: probe_interval_secs.is_some(),
            interval_secs: probe_interval_secs.unwrap_or(10),
            timeout_secs: 1,
        },
        ..Default::default()
    }
}

/// Start the balancer on `proxy_addr` and hand back its shutdown handle.
pub async fn start_balancer(proxy_addr: SocketAddr, config: BalancerConfig) -> Shutdown {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind(proxy_addr).await.unwrap();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Give the server a moment to start accepting.
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown
}

/// A client that won't pick up proxy settings from the environment.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
