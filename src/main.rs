use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};
use tokio::{
    signal,
    sync::{mpsc, watch},
    task::JoinSet,
};

mod backend;
mod config;
mod dispatcher;
mod error;
mod event;
mod providers;
mod reconcile;
mod record;
mod registry;
mod sentinel;

use backend::DnsBackend;
use config::{BackendConfig, Config};
use event::FailoverEvent;
use registry::BackendRegistry;
use sentinel::SentinelSubscriber;

#[derive(Parser)]
#[command(about = "Keep DNS records pointed at the current master of a sentinel-monitored group")]
struct Args {
    /// Path to the YAML configuration file
    #[clap(short, long, default_value = "config.yaml")]
    config: String,
}

/// Instantiate every configured backend. A bad entry is logged and skipped;
/// the daemon runs with whatever remains.
fn build_backends(registry: &BackendRegistry, config: &Config) -> Vec<Arc<dyn DnsBackend>> {
    let mut backends = Vec::new();
    for entry in &config.dns_providers {
        let backend_config = match BackendConfig::try_from(entry) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Skipping DNS provider {}: {e}", entry.name);
                continue;
            }
        };
        match registry.create(&backend_config.backend_type, &backend_config) {
            Ok(backend) => {
                info!(
                    "DNS provider {} initialized: domain={}",
                    backend_config.name, backend_config.domain
                );
                backends.push(backend);
            }
            Err(e) => error!("Skipping DNS provider {}: {e}", backend_config.name),
        }
    }
    backends
}

fn start(
    subscriber: Arc<SentinelSubscriber>,
    backends: Vec<Arc<dyn DnsBackend>>,
    shutdown: watch::Receiver<bool>,
) -> JoinSet<()> {
    let (tx, rx) = mpsc::channel::<FailoverEvent>(16);
    let mut pool = JoinSet::new();

    // Pull notifications off the sentinel stream and push failover events
    // into the channel
    {
        let subscriber = subscriber.clone();
        let shutdown = shutdown.clone();
        pool.spawn(async move {
            subscriber.run(tx, shutdown).await;
        });
    }

    // Probe sentinel liveness and re-establish the connection when it drops
    {
        let subscriber = subscriber.clone();
        let shutdown = shutdown.clone();
        pool.spawn(async move {
            subscriber.probe(shutdown).await;
        });
    }

    // Drain failover events and converge every backend, one event at a time
    pool.spawn(async move {
        dispatcher::run(rx, backends, shutdown).await;
    });

    pool
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    info!(
        "Configuration loaded: sentinel={} at {}, masters={:?}",
        config.sentinel.name, config.sentinel.host, config.sentinel.master_name
    );

    let mut registry = BackendRegistry::new();
    providers::register_builtin(&mut registry)?;
    info!("Registered backend types: {:?}", registry.types());
    let backends = build_backends(&registry, &config);
    if backends.is_empty() {
        warn!("No usable DNS providers configured, events will only be logged");
    }

    // Failing to reach the sentinel on the first attempt aborts startup;
    // later disconnects are recovered by the supervisor.
    let subscriber = Arc::new(SentinelSubscriber::connect(&config.sentinel).await?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut pool = start(subscriber, backends, shutdown_rx);

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {e}"),
    }
    shutdown_tx.send(true).ok();
    pool.shutdown().await;

    Ok(())
}
