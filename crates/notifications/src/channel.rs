use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use rand::Rng;
use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::model::Notification;
use crate::store::NotificationStore;

/// Reconnect pacing for the realtime channel.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
}

impl BackoffPolicy {
    /// Delay before reconnect attempt `attempt`: doubling from `base`,
    /// capped at `max`, with ±50% jitter.
    fn delay(&self, attempt: u32) -> Duration {
        let exp = self
            .base
            .saturating_mul(2u32.saturating_pow(attempt.min(16)));
        let capped = exp.min(self.max);
        capped.mul_f64(rand::rng().random_range(0.5..1.5))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            max: Duration::from_secs(30),
        }
    }
}

/// Opens realtime connections to the notification service.
///
/// One live connection per mounted session: `connect` spawns the reader
/// task, [`ChannelHandle::shutdown`] tears it down. Events arriving after
/// shutdown are dropped with the socket, never queued.
pub struct RealtimeChannel {
    socket_url: String,
    backoff: BackoffPolicy,
}

/// Owner handle for a spawned channel task.
pub struct ChannelHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    /// Signals the task to stop and waits until the socket is dropped.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

impl RealtimeChannel {
    pub fn new(socket_url: String, backoff: BackoffPolicy) -> Self {
        Self {
            socket_url,
            backoff,
        }
    }

    /// Connects for `user_id` and delivers pushed records into `store`.
    ///
    /// The task joins the user's room right after each (re)connect and
    /// keeps reconnecting with backoff until shut down.
    pub fn connect(&self, user_id: String, store: Arc<NotificationStore>) -> ChannelHandle {
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(run(
            self.socket_url.clone(),
            user_id,
            store,
            self.backoff.clone(),
            rx,
        ));
        ChannelHandle { shutdown: tx, task }
    }
}

async fn run(
    socket_url: String,
    user_id: String,
    store: Arc<NotificationStore>,
    backoff: BackoffPolicy,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut attempt: u32 = 0;

    loop {
        if *shutdown.borrow() {
            return;
        }

        let connected = tokio::select! {
            res = connect_async(socket_url.as_str()) => res,
            _ = shutdown.changed() => return,
        };

        let ws = match connected {
            Ok((ws, _)) => ws,
            Err(e) => {
                let delay = backoff.delay(attempt);
                attempt = attempt.saturating_add(1);
                warn!(%e, ?delay, "Notification channel connect failed");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => continue,
                    _ = shutdown.changed() => return,
                }
            }
        };

        attempt = 0;
        info!(%user_id, "Notification channel connected");

        let (mut sender, mut receiver) = ws.split();

        let join = json!({ "type": "join-room", "data": user_id.as_str() });
        if let Err(e) = sender.send(Message::text(join.to_string())).await {
            warn!(%e, "Failed to join notification room");
            continue;
        }

        loop {
            let msg = tokio::select! {
                msg = receiver.next() => msg,
                _ = shutdown.changed() => return,
            };

            match msg {
                Some(Ok(Message::Text(text))) => handle_event(&store, text.as_str()),
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = sender.send(Message::Pong(data)).await {
                        warn!(%e, "Failed to answer ping");
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!(%e, "Notification channel read error");
                    break;
                }
                Some(Ok(_)) => {}
            }
        }

        let delay = backoff.delay(attempt);
        attempt = attempt.saturating_add(1);
        warn!(%user_id, ?delay, "Notification channel dropped; reconnecting");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => return,
        }
    }
}

fn handle_event(store: &NotificationStore, text: &str) {
    let parsed: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => return,
    };

    let msg_type = parsed.get("type").and_then(|t| t.as_str()).unwrap_or("");
    let data = parsed.get("data");

    match msg_type {
        "new-notification" => {
            let record: Notification = match data.map(|d| serde_json::from_value(d.clone())) {
                Some(Ok(n)) => n,
                _ => {
                    warn!("Malformed new-notification payload");
                    return;
                }
            };
            debug!(id = %record.id, title = %record.title, "New notification received");
            store.prepend(record);
        }
        _ => {
            debug!(msg_type, "Unknown channel event");
        }
    }
}
