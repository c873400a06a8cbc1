use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch};

use crate::backend::{Converge, DnsBackend};
use crate::error::Error;
use crate::event::FailoverEvent;

/// Per-backend result of one dispatched event.
pub struct Outcome {
    pub backend: String,
    pub result: Result<Converge, Error>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fan one failover event out to every configured backend, sequentially.
/// One backend's failure never prevents the others from being attempted,
/// and nothing is retried here.
pub async fn dispatch(event: &FailoverEvent, backends: &[Arc<dyn DnsBackend>]) -> Vec<Outcome> {
    debug!(
        "Dispatching event received at {}: {}",
        event.received_at, event.raw_payload
    );
    let mut outcomes = Vec::with_capacity(backends.len());
    for backend in backends {
        info!(
            "Converging backend [{}]: {} -> {}",
            backend.name(),
            event.group_name,
            event.new_address
        );
        let result = backend.converge(&event.group_name, &event.new_address).await;
        match &result {
            Ok(outcome) => info!("Backend [{}]: record {outcome}", backend.name()),
            Err(e) => error!("Backend [{}]: converge failed: {e}", backend.name()),
        }
        outcomes.push(Outcome {
            backend: backend.name().to_string(),
            result,
        });
    }
    outcomes
}

/// Drain the event channel, strictly one event at a time in arrival order.
pub async fn run(
    mut rx: mpsc::Receiver<FailoverEvent>,
    backends: Vec<Arc<dyn DnsBackend>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => break,

            event = rx.recv() => {
                let Some(event) = event else { break };
                let outcomes = dispatch(&event, &backends).await;
                let failed: Vec<&str> = outcomes
                    .iter()
                    .filter(|o| !o.is_success())
                    .map(|o| o.backend.as_str())
                    .collect();
                if !failed.is_empty() {
                    warn!(
                        "Backends failed for group {}: {}",
                        event.group_name,
                        failed.join(", ")
                    );
                }
            }
        }
    }
    info!("Dispatcher stopped");
}
