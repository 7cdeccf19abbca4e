//! # Channel registry: idempotent creation and lookup of channel state.
//!
//! The registry maps [`ChannelId`]s to their state. Entries are created
//! lazily on first publish, subscribe, or explicit registration, and live
//! until the bus is dropped.
//!
//! ## Rules
//! - Registration is synchronized: concurrent calls for the same id produce
//!   exactly one entry.
//! - Repeat registration is a no-op returning the existing state; it never
//!   reloads or resets the committed offset.
//! - The initial offset is loaded from the sidecar at creation time, so a
//!   restarted bus resumes where the previous instance committed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::channels::{Channel, ChannelId};
use crate::store;
use crate::subscribers::SubscriberRef;

/// Registry of channel state, keyed by [`ChannelId`].
pub(crate) struct Registry {
    data_root: PathBuf,
    state_root: PathBuf,
    channels: RwLock<HashMap<ChannelId, Arc<Channel>>>,
}

impl Registry {
    pub(crate) fn new(data_root: PathBuf, state_root: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            data_root,
            state_root,
            channels: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the channel state for `id`, creating it on first sight.
    pub(crate) async fn register(&self, id: &ChannelId) -> Arc<Channel> {
        {
            let channels = self.channels.read().await;
            if let Some(channel) = channels.get(id) {
                return Arc::clone(channel);
            }
        }

        let mut channels = self.channels.write().await;
        if let Some(channel) = channels.get(id) {
            return Arc::clone(channel);
        }

        let log_path = id.log_path(&self.data_root);
        let offset_path = id.offset_path(&self.state_root);
        let initial = store::offset::read_offset(&offset_path).await;
        let channel = Arc::new(Channel::new(id.clone(), log_path, offset_path, initial));
        channels.insert(id.clone(), Arc::clone(&channel));
        debug!(channel = %id, offset = initial, "channel registered");
        channel
    }

    /// Registers `id` if needed, then appends `subscriber` to its list.
    pub(crate) async fn subscribe(&self, id: &ChannelId, subscriber: SubscriberRef) {
        let channel = self.register(id).await;
        channel.add_subscriber(subscriber).await;
        debug!(channel = %id, "subscriber added");
    }

    /// All currently registered channels, for the poller's sweep.
    pub(crate) async fn snapshot(&self) -> Vec<Arc<Channel>> {
        self.channels.read().await.values().cloned().collect()
    }
}
