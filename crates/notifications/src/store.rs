use std::collections::HashSet;

use parking_lot::RwLock;
use tracing::debug;

use crate::model::Notification;

#[derive(Default)]
struct Inner {
    /// Newest first.
    sequence: Vec<Notification>,
    unseen_ids: HashSet<String>,
}

/// Client-side replica of the user's notifications.
///
/// Invariant: `unseen_ids` holds exactly the ids of records in `sequence`
/// with `seen == false`, so the unseen count is always the set's size.
/// Every mutation runs under one write lock; readers never observe a
/// half-applied update.
#[derive(Default)]
pub struct NotificationStore {
    inner: RwLock<Inner>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the replica with a backend-fetched list, keeping records
    /// that were pushed while the fetch was in flight.
    ///
    /// The backend list is newest first; local records absent from it are
    /// newer pushes and stay ahead of it. The unseen set is recomputed
    /// from every record's `seen` flag.
    pub fn bulk_load(&self, fetched: Vec<Notification>) {
        let mut inner = self.inner.write();

        let fetched_ids: HashSet<String> = fetched.iter().map(|n| n.id.clone()).collect();
        let mut merged: Vec<Notification> = inner
            .sequence
            .drain(..)
            .filter(|n| !fetched_ids.contains(&n.id))
            .collect();
        merged.extend(fetched);

        inner.unseen_ids = merged
            .iter()
            .filter(|n| !n.seen)
            .map(|n| n.id.clone())
            .collect();
        inner.sequence = merged;
    }

    /// Prepends a pushed record. Idempotent on the record id: a push that
    /// raced a bulk-load already containing it is dropped.
    pub fn prepend(&self, record: Notification) {
        let mut inner = self.inner.write();

        if inner.sequence.iter().any(|n| n.id == record.id) {
            debug!(id = %record.id, "Duplicate push dropped");
            return;
        }

        if !record.seen {
            inner.unseen_ids.insert(record.id.clone());
        }
        inner.sequence.insert(0, record);
    }

    /// Flips `seen = true` for the given ids and shrinks the unseen set in
    /// one critical section.
    pub fn commit_seen(&self, ids: &[String]) {
        let mut inner = self.inner.write();

        for record in inner.sequence.iter_mut() {
            if ids.contains(&record.id) {
                record.seen = true;
            }
        }
        for id in ids {
            inner.unseen_ids.remove(id);
        }
    }

    /// Drops the whole replica. Used when the owning session changes, so
    /// one identity's records never bleed into the next.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.sequence.clear();
        inner.unseen_ids.clear();
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner.read().sequence.clone()
    }

    pub fn unseen_ids(&self) -> Vec<String> {
        self.inner.read().unseen_ids.iter().cloned().collect()
    }

    pub fn unseen_count(&self) -> usize {
        self.inner.read().unseen_ids.len()
    }

    pub fn len(&self) -> usize {
        self.inner.read().sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().sequence.is_empty()
    }
}
