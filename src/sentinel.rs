use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use log::{debug, error, info, warn};
use redis::aio::{MultiplexedConnection, PubSub};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::sleep;

use crate::config::SentinelConfig;
use crate::error::Error;
use crate::event::{self, FailoverEvent};

/// Channels the sentinel broadcasts on. Only `+switch-master` drives DNS
/// changes; the rest are observed for diagnostics.
const CHANNELS: [&str; 5] = [
    "__sentinel__:hello",
    "+sentinel",
    "+switch-master",
    "+slave",
    "+reboot",
];
const CONVERT_PATTERN: &str = "*:convert-to-master";

const PROBE_INTERVAL: Duration = Duration::from_secs(5);
const RECONNECT_ATTEMPTS: u32 = 3;
const BACKOFF_START: Duration = Duration::from_secs(1);
const BACKOFF_CAP: Duration = Duration::from_secs(3);

/// Exponential backoff before reconnect attempt `attempt` (1-based):
/// 1s, 2s, then capped at 3s.
fn backoff(attempt: u32) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(16);
    (BACKOFF_START * factor).min(BACKOFF_CAP)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    Disconnected,
    Connected,
    Closing,
}

/// Owns the live connection to the sentinel's notification stream,
/// re-establishes it on failure and emits a liveness signal. The probe and
/// the forwarding path run as independent tasks so a stalled stream does not
/// block liveness detection; they share only the probe connection handle,
/// replaced under a lock held for the swap alone.
pub struct SentinelSubscriber {
    client: redis::Client,
    addr: String,
    probe_conn: Arc<Mutex<MultiplexedConnection>>,
}

impl SentinelSubscriber {
    /// Connect and PING once. Failing here is fatal to startup; once this
    /// returns Ok the supervisor recovers from later disconnects on its own.
    pub async fn connect(cfg: &SentinelConfig) -> Result<Self, Error> {
        let addr = cfg.primary_addr().to_string();
        let client = redis::Client::open(connection_info(&addr, cfg.password.clone())?)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("Connected to sentinel at {addr}");
        Ok(Self {
            client,
            addr,
            probe_conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Forward notifications until shutdown. Subscription loss triggers a
    /// bounded resubscribe cycle; when the bound is exhausted the supervisor
    /// waits one probe interval and starts the next cycle rather than
    /// spinning. Events broadcast while disconnected are lost.
    pub async fn run(&self, tx: mpsc::Sender<FailoverEvent>, mut shutdown: watch::Receiver<bool>) {
        let mut state = ConnState::Disconnected;
        info!("Listening for sentinel events");
        while state != ConnState::Closing {
            if *shutdown.borrow() {
                state = ConnState::Closing;
                continue;
            }

            match self.subscribe_with_backoff(&mut shutdown).await {
                Some(pubsub) => {
                    state = ConnState::Connected;
                    debug!("Sentinel subscription state: {state:?}");
                    state = self.forward(pubsub, &tx, &mut shutdown).await;
                }
                None if *shutdown.borrow() => state = ConnState::Closing,
                None => {
                    tokio::select! {
                        _ = shutdown.changed() => state = ConnState::Closing,
                        _ = sleep(PROBE_INTERVAL) => {}
                    }
                }
            }
        }
        info!("Sentinel subscriber stopped");
    }

    /// Steady state: pull messages off the stream and hand validated
    /// failover events to the dispatcher channel.
    async fn forward(
        &self,
        mut pubsub: PubSub,
        tx: &mpsc::Sender<FailoverEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> ConnState {
        let mut stream = pubsub.on_message();
        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => return ConnState::Closing,

                msg = stream.next() => {
                    let Some(msg) = msg else {
                        warn!("Sentinel subscription stream ended");
                        return ConnState::Disconnected;
                    };
                    let channel = msg.get_channel_name().to_string();
                    let payload: String = match msg.get_payload() {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!("Undecodable payload on {channel}: {e}");
                            continue;
                        }
                    };
                    if let Some(event) = event::parse(&channel, &payload) {
                        info!(
                            "Master switch: group={}, new address={}",
                            event.group_name, event.new_address
                        );
                        if tx.send(event).await.is_err() {
                            // Dispatcher is gone; nothing left to feed.
                            return ConnState::Closing;
                        }
                    }
                }
            }
        }
    }

    async fn subscribe_with_backoff(&self, shutdown: &mut watch::Receiver<bool>) -> Option<PubSub> {
        for attempt in 1..=RECONNECT_ATTEMPTS {
            match self.subscribe().await {
                Ok(pubsub) => {
                    if attempt > 1 {
                        info!("Sentinel subscription restored to {}", self.addr);
                    }
                    return Some(pubsub);
                }
                Err(e) => {
                    error!("Sentinel subscribe attempt {attempt}/{RECONNECT_ATTEMPTS} failed: {e}");
                }
            }
            if attempt < RECONNECT_ATTEMPTS {
                tokio::select! {
                    _ = shutdown.changed() => return None,
                    _ = sleep(backoff(attempt)) => {}
                }
            }
        }
        error!("Sentinel resubscribe attempts exhausted, retrying next cycle");
        None
    }

    async fn subscribe(&self) -> Result<PubSub, Error> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        for channel in CHANNELS {
            pubsub.subscribe(channel).await?;
        }
        pubsub.psubscribe(CONVERT_PATTERN).await?;
        Ok(pubsub)
    }

    /// Liveness probe, independent of notification forwarding: PING every
    /// five seconds, and on failure replace the shared handle after a
    /// bounded reconnect. The network calls happen outside the lock.
    pub async fn probe(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = sleep(PROBE_INTERVAL) => {}
            }

            let mut conn = self.probe_conn.lock().await.clone();
            let ping: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
            if let Err(e) = ping {
                warn!("Sentinel liveness probe failed: {e}");
                if let Some(fresh) = self.reconnect_with_backoff(&shutdown).await {
                    *self.probe_conn.lock().await = fresh;
                    info!("Sentinel connection re-established to {}", self.addr);
                }
            }
        }
        info!("Sentinel prober stopped");
    }

    async fn reconnect_with_backoff(
        &self,
        shutdown: &watch::Receiver<bool>,
    ) -> Option<MultiplexedConnection> {
        for attempt in 1..=RECONNECT_ATTEMPTS {
            if *shutdown.borrow() {
                return None;
            }
            match self.client.get_multiplexed_async_connection().await {
                Ok(conn) => return Some(conn),
                Err(e) => {
                    error!("Sentinel reconnect attempt {attempt}/{RECONNECT_ATTEMPTS} failed: {e}");
                }
            }
            if attempt < RECONNECT_ATTEMPTS {
                sleep(backoff(attempt)).await;
            }
        }
        error!("Sentinel reconnect attempts exhausted, next probe retries");
        None
    }
}

fn connection_info(addr: &str, password: Option<String>) -> Result<redis::ConnectionInfo, Error> {
    let (host, port) = match addr.rsplit_once(':') {
        Some((host, port)) => (
            host.to_string(),
            port.parse::<u16>()
                .map_err(|_| Error::Config(format!("invalid sentinel port in {addr}")))?,
        ),
        None => (addr.to_string(), 26379),
    };
    if host.is_empty() {
        return Err(Error::Config("sentinel host is empty".to_string()));
    }
    Ok(redis::ConnectionInfo {
        addr: redis::ConnectionAddr::Tcp(host, port),
        redis: redis::RedisConnectionInfo {
            password,
            ..Default::default()
        },
    })
}
