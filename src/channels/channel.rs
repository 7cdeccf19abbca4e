//! Per-channel state owned by the registry.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::channels::ChannelId;
use crate::subscribers::SubscriberRef;

/// State of one registered channel.
///
/// The committed offset has a single writer (the poller); subscribers are
/// additive only and read as a snapshot, so fan-out iteration is never
/// invalidated by a concurrent subscribe.
pub(crate) struct Channel {
    id: ChannelId,
    log_path: PathBuf,
    offset_path: PathBuf,
    committed: AtomicU64,
    subscribers: RwLock<Vec<SubscriberRef>>,
}

impl Channel {
    pub(crate) fn new(
        id: ChannelId,
        log_path: PathBuf,
        offset_path: PathBuf,
        initial_offset: u64,
    ) -> Self {
        Self {
            id,
            log_path,
            offset_path,
            committed: AtomicU64::new(initial_offset),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn id(&self) -> &ChannelId {
        &self.id
    }

    pub(crate) fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub(crate) fn offset_path(&self) -> &Path {
        &self.offset_path
    }

    pub(crate) fn committed(&self) -> u64 {
        self.committed.load(Ordering::Acquire)
    }

    pub(crate) fn set_committed(&self, offset: u64) {
        self.committed.store(offset, Ordering::Release);
    }

    pub(crate) async fn add_subscriber(&self, subscriber: SubscriberRef) {
        self.subscribers.write().await.push(subscriber);
    }

    /// Snapshot of the subscriber list in insertion order.
    pub(crate) async fn subscribers(&self) -> Vec<SubscriberRef> {
        self.subscribers.read().await.clone()
    }
}
