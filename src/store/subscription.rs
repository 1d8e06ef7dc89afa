//! Collection watchers and the RAII subscription handle.
//!
//! A watcher pairs a collection path with a snapshot callback. The store
//! notifies every watcher of a collection after each committed write.
//! `Subscription` unregisters its watcher on drop, so a forgotten handle
//! can never leak callbacks.

use std::sync::{Arc, Mutex};

use super::SnapshotCallback;

pub(crate) struct Watcher {
    pub id: u64,
    pub collection: String,
    pub order_key: String,
    pub callback: SnapshotCallback,
}

pub(crate) type WatcherRegistry = Arc<Mutex<Vec<Watcher>>>;

/// Live-update handle returned by `stream_collection`.
///
/// Updates stop when the handle is dropped or `unsubscribe` is called.
pub struct Subscription {
    id: u64,
    registry: WatcherRegistry,
}

impl Subscription {
    pub(crate) fn new(id: u64, registry: WatcherRegistry) -> Self {
        Self { id, registry }
    }

    /// Stop receiving snapshots. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Ok(mut watchers) = self.registry.lock() {
            watchers.retain(|w| w.id != self.id);
        }
    }
}
