pub mod relative_time;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use campaigner_config::Settings;
use campaigner_notifications::{
    BackoffPolicy, ChannelHandle, Notification, NotificationApi, NotificationPanel,
    NotificationStore, RealtimeChannel, SeenSync,
};
use campaigner_session::SessionStore;

/// Composition root of the dashboard: owns the notification store, the
/// realtime channel, the seen-state synchronizer and the panel state, all
/// scoped to the current session.
pub struct DashboardShell {
    session: Arc<SessionStore>,
    store: Arc<NotificationStore>,
    api: Arc<NotificationApi>,
    channel: RealtimeChannel,
    seen_sync: SeenSync,
    panel: Mutex<NotificationPanel>,
    sidebar_open: AtomicBool,
    active_channel: tokio::sync::Mutex<Option<ChannelHandle>>,
    /// Bumped on every activation and teardown; late async continuations
    /// compare against it and no-op when stale.
    epoch: AtomicU64,
}

impl DashboardShell {
    pub fn new(settings: &Settings, session: Arc<SessionStore>) -> Self {
        let store = Arc::new(NotificationStore::new());
        let api = Arc::new(NotificationApi::new(
            settings.api.base_url.clone(),
            Duration::from_secs(settings.api.request_timeout_secs),
        ));
        let channel = RealtimeChannel::new(
            settings.socket.url.clone(),
            BackoffPolicy {
                base: Duration::from_millis(settings.socket.reconnect_base_ms),
                max: Duration::from_millis(settings.socket.reconnect_max_ms),
            },
        );
        let seen_sync = SeenSync::new(api.clone(), store.clone(), session.clone());

        Self {
            session,
            store,
            api,
            channel,
            seen_sync,
            panel: Mutex::new(NotificationPanel::new()),
            sidebar_open: AtomicBool::new(settings.shell.sidebar_open),
            active_channel: tokio::sync::Mutex::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    /// Activates the dashboard for the current session: joins the user's
    /// notification room and runs the initial bulk load. Safe to call again
    /// after an identity change; the previous channel is torn down first.
    pub async fn activate(&self) {
        let Some(session) = self.session.current() else {
            debug!("No session; dashboard stays inactive");
            return;
        };

        self.teardown_channel().await;
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        // Fresh replica per identity; pushes landing from here on merge
        // into the bulk load below.
        self.store.clear();

        let handle = self
            .channel
            .connect(session.identity.user_id.clone(), self.store.clone());
        *self.active_channel.lock().await = Some(handle);

        match self.api.fetch(&session.identity.user_id, &session.token).await {
            Ok(records) => {
                // The fetch may resolve after a teardown or a newer
                // activation; a stale response must not resurrect state.
                if self.epoch.load(Ordering::SeqCst) == epoch {
                    let count = records.len();
                    self.store.bulk_load(records);
                    info!(count, "Notifications loaded");
                } else {
                    debug!("Stale notification load dropped");
                }
            }
            Err(e) => warn!(%e, "Failed to load notifications"),
        }
    }

    /// Tears the channel down. Late events and in-flight responses are
    /// discarded, not applied.
    pub async fn deactivate(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.teardown_channel().await;
    }

    async fn teardown_channel(&self) {
        if let Some(handle) = self.active_channel.lock().await.take() {
            handle.shutdown().await;
        }
    }

    /// Bell click: opens the panel, or dismisses it and flushes the unseen
    /// set to the backend.
    pub async fn toggle_panel(&self) {
        let dismissed = self.panel.lock().toggle();
        if dismissed {
            self.seen_sync.flush().await;
        }
    }

    /// Interaction outside the panel bounds; dismisses an open panel and
    /// flushes, no-op otherwise.
    pub async fn interact_outside_panel(&self) {
        let dismissed = self.panel.lock().outside_interaction();
        if dismissed {
            self.seen_sync.flush().await;
        }
    }

    pub fn panel_open(&self) -> bool {
        self.panel.lock().is_open()
    }

    /// Badge count next to the bell.
    pub fn unseen_count(&self) -> usize {
        self.store.unseen_count()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.store.snapshot()
    }

    pub fn toggle_sidebar(&self) -> bool {
        !self.sidebar_open.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open.load(Ordering::SeqCst)
    }
}
