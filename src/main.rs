use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use load_balancer::config::loader::load_config;
use load_balancer::http::HttpServer;
use load_balancer::lifecycle::{shutdown, Shutdown};
use load_balancer::observability;

#[derive(Parser)]
#[command(name = "load-balancer", about = "Prefix-routed HTTP load balancer")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    observability::logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        services = config.services.len(),
        probe_interval_secs = config.health_check.interval_secs,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = HttpServer::new(config)?;

    let coordinator = Shutdown::new();
    let server_shutdown = coordinator.subscribe();
    tokio::spawn(async move {
        shutdown::wait_for_signal().await;
        coordinator.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
