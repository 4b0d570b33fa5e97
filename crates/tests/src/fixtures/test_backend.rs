use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

/// A running mock notification backend: the REST endpoints plus the
/// realtime WebSocket endpoint the client under test talks to.
pub struct TestBackend {
    pub addr: SocketAddr,
    pub base_url: String,
    pub socket_url: String,
    state: BackendState,
}

#[derive(Clone)]
struct BackendState {
    notifications: Arc<Mutex<Vec<Value>>>,
    mark_requests: Arc<Mutex<Vec<Value>>>,
    fetch_bearers: Arc<Mutex<Vec<String>>>,
    fail_mark_seen: Arc<AtomicBool>,
    joined_rooms: Arc<Mutex<Vec<String>>>,
    pushers: Arc<Mutex<Vec<(String, mpsc::UnboundedSender<String>)>>>,
    kick: broadcast::Sender<()>,
}

impl TestBackend {
    /// Spawn the mock backend on an ephemeral port.
    pub async fn spawn() -> Self {
        let (kick, _) = broadcast::channel(8);
        let state = BackendState {
            notifications: Arc::new(Mutex::new(Vec::new())),
            mark_requests: Arc::new(Mutex::new(Vec::new())),
            fetch_bearers: Arc::new(Mutex::new(Vec::new())),
            fail_mark_seen: Arc::new(AtomicBool::new(false)),
            joined_rooms: Arc::new(Mutex::new(Vec::new())),
            pushers: Arc::new(Mutex::new(Vec::new())),
            kick,
        };

        let app = Router::new()
            .route("/notifications/get/{user_id}", get(get_notifications))
            .route("/notifications/update", put(update_notifications))
            .route("/ws", get(ws_upgrade))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            base_url: format!("http://{addr}"),
            socket_url: format!("ws://{addr}/ws"),
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Replaces the list served by the fetch endpoint.
    pub fn set_notifications(&self, list: Vec<Value>) {
        *self.state.notifications.lock() = list;
    }

    /// Makes the mark-seen endpoint answer 500 (or 200 again).
    pub fn fail_mark_seen(&self, fail: bool) {
        self.state.fail_mark_seen.store(fail, Ordering::SeqCst);
    }

    /// Bodies of every mark-seen request received, failed ones included.
    pub fn mark_requests(&self) -> Vec<Value> {
        self.state.mark_requests.lock().clone()
    }

    /// Bearer tokens presented to the fetch endpoint.
    pub fn fetch_bearers(&self) -> Vec<String> {
        self.state.fetch_bearers.lock().clone()
    }

    /// Rooms joined over the WebSocket endpoint, in join order.
    pub fn joined_rooms(&self) -> Vec<String> {
        self.state.joined_rooms.lock().clone()
    }

    /// Pushes a `new-notification` event to every connection joined to
    /// `room`.
    pub fn push(&self, room: &str, record: Value) {
        let envelope = serde_json::json!({
            "type": "new-notification",
            "data": record,
        })
        .to_string();

        let mut pushers = self.state.pushers.lock();
        pushers.retain(|(joined, tx)| {
            if joined != room {
                return true;
            }
            tx.send(envelope.clone()).is_ok()
        });
    }

    /// Drops every open WebSocket connection server-side.
    pub fn kick_all(&self) {
        let _ = self.state.kick.send(());
    }
}

fn bearer_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

async fn get_notifications(
    State(state): State<BackendState>,
    Path(_user_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(bearer) = bearer_of(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    state.fetch_bearers.lock().push(bearer);

    let list = state.notifications.lock().clone();
    Json(list).into_response()
}

async fn update_notifications(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    if bearer_of(&headers).is_none() {
        return StatusCode::UNAUTHORIZED;
    }

    state.mark_requests.lock().push(body.clone());

    if state.fail_mark_seen.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    // Mirror the real backend: flip the stored records.
    if let Some(ids) = body.get("ids").and_then(|v| v.as_array()) {
        let ids: Vec<&str> = ids.iter().filter_map(|v| v.as_str()).collect();
        let mut list = state.notifications.lock();
        for record in list.iter_mut() {
            if let Some(id) = record.get("_id").and_then(|v| v.as_str()) {
                if ids.contains(&id) {
                    record["seen"] = Value::Bool(true);
                }
            }
        }
    }

    StatusCode::OK
}

async fn ws_upgrade(State(state): State<BackendState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: BackendState) {
    let (mut sender, mut receiver) = socket.split();
    let (push_tx, mut push_rx) = mpsc::unbounded_channel::<String>();
    let mut kick = state.kick.subscribe();

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let parsed: Value = match serde_json::from_str(text.as_str()) {
                        Ok(v) => v,
                        Err(_) => continue,
                    };
                    if parsed.get("type").and_then(|t| t.as_str()) == Some("join-room") {
                        if let Some(room) = parsed.get("data").and_then(|d| d.as_str()) {
                            // Pusher first: tests poll joined_rooms before
                            // pushing, so the sender must already be there.
                            state
                                .pushers
                                .lock()
                                .push((room.to_string(), push_tx.clone()));
                            state.joined_rooms.lock().push(room.to_string());
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(_)) => break,
                _ => {}
            },
            pushed = push_rx.recv() => {
                let Some(text) = pushed else { break };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            _ = kick.recv() => break,
        }
    }
}

/// Polls `cond` until it holds or `timeout` elapses.
pub async fn wait_until(cond: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
