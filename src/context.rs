//! Sync Context
//!
//! Cross-view invalidation. A view that changes remote data publishes a
//! `DataUpdated` signal; every other open view sees it and re-fetches.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Identifies one open view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

/// The invalidation signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUpdated {
    /// Bumped on every signal; zero means nothing has been published yet
    pub seq: u64,
    /// Wall-clock time of the signal, epoch milliseconds
    pub at_millis: i64,
    /// View that caused it
    pub origin: ViewId,
}

impl DataUpdated {
    const INITIAL: DataUpdated = DataUpdated {
        seq: 0,
        at_millis: 0,
        origin: ViewId(0),
    };
}

/// Shared handle; cheap to clone
#[derive(Clone)]
pub struct SyncContext {
    updates: Arc<watch::Sender<DataUpdated>>,
    next_view: Arc<AtomicU64>,
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DataUpdated::INITIAL);
        Self {
            updates: Arc::new(tx),
            next_view: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Allocate an id for a newly opened view
    pub fn register_view(&self) -> ViewId {
        ViewId(self.next_view.fetch_add(1, Ordering::Relaxed))
    }

    /// Publish an invalidation from `origin`
    pub fn reload(&self, origin: ViewId) -> DataUpdated {
        let at_millis = chrono::Local::now().timestamp_millis();
        let mut published = DataUpdated::INITIAL;
        self.updates.send_modify(|current| {
            *current = DataUpdated {
                seq: current.seq + 1,
                at_millis,
                origin,
            };
            published = *current;
        });
        published
    }

    /// Latest signal, or `None` before the first one
    pub fn latest(&self) -> Option<DataUpdated> {
        let current = *self.updates.borrow();
        (current.seq > 0).then_some(current)
    }

    /// Receiver positioned at the current signal, so only later ones count
    pub fn subscribe(&self) -> watch::Receiver<DataUpdated> {
        self.updates.subscribe()
    }
}
