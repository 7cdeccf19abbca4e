//! # Bus configuration.
//!
//! Provides [`BusConfig`], the construction-time settings for a bus
//! instance, and [`CommitPolicy`], the offset commit timing.
//!
//! ## Sentinel values
//! - `poll_interval` below 1ms is clamped up to 1ms by the poller.
//!
//! Two bus instances must not share a `data_root`; each channel's files are
//! owned by exactly one instance at a time.

use std::path::PathBuf;
use std::time::Duration;

/// When the poller persists a channel's new offset relative to handler
/// execution.
///
/// The offset is the replay boundary after a restart, so this choice decides
/// what a crash mid-tick costs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Persist right after handler tasks are spawned (the default).
    ///
    /// Lowest end-to-end latency: the poller never waits on handlers. A
    /// crash between submission and handler completion drops that tick's
    /// deliveries on restart; they are already committed.
    #[default]
    OnSubmit,

    /// Persist only after every handler task for the tick has finished.
    ///
    /// A crash mid-tick replays the whole batch on restart instead of
    /// dropping it. The poller's tick blocks on the slowest handler, so
    /// end-to-end latency for subsequent records grows accordingly.
    AfterDelivery,
}

/// Construction-time configuration for a [`Bus`](crate::Bus).
///
/// ## Field semantics
/// - `data_root`: base directory for channel logs (`events/`, `tasks/`) and
///   the derived state tree (`bus_state/`)
/// - `poll_interval`: fixed period of the scan loop; bounds worst-case
///   end-to-end latency
/// - `commit`: offset commit timing, see [`CommitPolicy`]
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Base directory for log and offset files.
    pub data_root: PathBuf,

    /// Fixed tick period of the poller.
    ///
    /// Every registered channel is scanned once per tick. Clamped to a
    /// minimum of 1ms.
    pub poll_interval: Duration,

    /// Offset commit timing.
    pub commit: CommitPolicy,
}

impl BusConfig {
    /// Root of the offset state tree, derived from `data_root`.
    pub fn state_root(&self) -> PathBuf {
        self.data_root.join("bus_state")
    }

    /// Poll interval clamped to a minimum of 1ms.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `data_root = "data"`
    /// - `poll_interval = 200ms`
    /// - `commit = CommitPolicy::OnSubmit`
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            poll_interval: Duration::from_millis(200),
            commit: CommitPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_root_is_derived_from_data_root() {
        let cfg = BusConfig { data_root: PathBuf::from("/var/agency"), ..BusConfig::default() };
        assert_eq!(cfg.state_root(), PathBuf::from("/var/agency/bus_state"));
    }

    #[test]
    fn poll_interval_is_clamped() {
        let cfg = BusConfig { poll_interval: Duration::ZERO, ..BusConfig::default() };
        assert_eq!(cfg.poll_interval_clamped(), Duration::from_millis(1));

        let cfg = BusConfig { poll_interval: Duration::from_millis(50), ..BusConfig::default() };
        assert_eq!(cfg.poll_interval_clamped(), Duration::from_millis(50));
    }
}
