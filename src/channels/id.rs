//! # Channel identity and filesystem layout.
//!
//! A channel is addressed by a [`ChannelId`]: a [`ChannelKind`] plus a name.
//! The kind fixes where the channel's files live relative to the configured
//! roots:
//!
//! ```text
//! <data_root>/events/<name>.log        broadcast event topics
//! <data_root>/tasks/<name>.jsonl       named task queues
//! <state_root>/events/<name>.offset    committed offset per event topic
//! <state_root>/tasks/<name>.offset     committed offset per task queue
//! ```
//!
//! The layout is a convention, not caller-configurable: embedders choose the
//! roots, the bus owns everything below them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Classification of channels, determining file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Broadcast topic: `events/<name>.log`.
    Event,
    /// Named task queue: `tasks/<name>.jsonl`.
    Task,
}

impl ChannelKind {
    pub(crate) fn dir(self) -> &'static str {
        match self {
            ChannelKind::Event => "events",
            ChannelKind::Task => "tasks",
        }
    }

    pub(crate) fn log_extension(self) -> &'static str {
        match self {
            ChannelKind::Event => "log",
            ChannelKind::Task => "jsonl",
        }
    }
}

/// Identity of a channel: kind plus name.
///
/// Cheap to clone (the name is an `Arc<str>`); usable as a map key. Displays
/// as `events/<name>` or `tasks/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId {
    kind: ChannelKind,
    name: Arc<str>,
}

impl ChannelId {
    /// Creates the id of a broadcast event topic.
    #[must_use]
    pub fn event(name: impl Into<Arc<str>>) -> Self {
        Self { kind: ChannelKind::Event, name: name.into() }
    }

    /// Creates the id of a named task queue.
    #[must_use]
    pub fn task(name: impl Into<Arc<str>>) -> Self {
        Self { kind: ChannelKind::Task, name: name.into() }
    }

    /// Returns the channel kind.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Returns the channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Log file path under `data_root`, per the layout convention.
    pub(crate) fn log_path(&self, data_root: &Path) -> PathBuf {
        data_root
            .join(self.kind.dir())
            .join(format!("{}.{}", self.name, self.kind.log_extension()))
    }

    /// Offset sidecar path under `state_root`, per the layout convention.
    pub(crate) fn offset_path(&self, state_root: &Path) -> PathBuf {
        state_root.join(self.kind.dir()).join(format!("{}.offset", self.name))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.dir(), self.name)
    }
}
