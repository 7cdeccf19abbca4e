//! Channel identity, per-channel state, and the channel registry.
//!
//! Internal modules:
//! - [`id`]: channel names, kinds, and the filesystem layout convention;
//! - [`channel`]: registry-owned state (paths, committed offset, subscribers);
//! - [`registry`]: idempotent creation and lookup of channel state.

mod channel;
mod id;
mod registry;

pub use id::{ChannelId, ChannelKind};

pub(crate) use channel::Channel;
pub(crate) use registry::Registry;
