use std::sync::Arc;

use tracing::{debug, warn};

use campaigner_session::SessionStore;

use crate::rest::NotificationApi;
use crate::store::NotificationStore;

/// Pushes the unseen-id set to the backend when the panel is dismissed.
///
/// Two-phase: the unseen set is snapshotted as tentative intent, sent, and
/// committed locally only on backend success. A failed flush changes
/// nothing locally, so the next dismissal retries with the same or an
/// extended set (at-least-once).
pub struct SeenSync {
    api: Arc<NotificationApi>,
    store: Arc<NotificationStore>,
    session: Arc<SessionStore>,
}

impl SeenSync {
    pub fn new(
        api: Arc<NotificationApi>,
        store: Arc<NotificationStore>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            api,
            store,
            session,
        }
    }

    /// Sends the current unseen-id set with `seen=true`. No-op when the
    /// set is empty or no session is established.
    pub async fn flush(&self) {
        let ids = self.store.unseen_ids();
        if ids.is_empty() {
            return;
        }

        let Some(bearer) = self.session.bearer() else {
            debug!("No session; unseen flush skipped");
            return;
        };

        match self.api.mark_seen(&ids, &bearer).await {
            Ok(()) => {
                // Commit exactly the snapshot; pushes that arrived during
                // the request stay unseen.
                self.store.commit_seen(&ids);
                debug!(count = ids.len(), "Notifications marked seen");
            }
            Err(e) => {
                warn!(%e, "Failed to mark notifications seen");
            }
        }
    }
}
