//! # Poller: periodic discovery of newly appended records.
//!
//! One poller task runs per bus instance, started at open and stopped by the
//! bus's cancellation token. Every tick it sweeps all registered channels
//! sequentially; handler execution happens elsewhere, so a tick only ever
//! blocks on file I/O.
//!
//! Per channel, a tick:
//! 1. reads the log length; a missing file means nothing to do;
//! 2. treats a log shorter than the committed offset as truncated: the
//!    offset resets to 0, is persisted immediately, and the scan continues
//!    from the start of the file;
//! 3. skips when the length equals the committed offset;
//! 4. otherwise reads whole lines from the committed offset, leaving a
//!    partial trailing line for a later tick;
//! 5. hands the batch to the dispatcher and then commits the new offset,
//!    per the configured [`CommitPolicy`].
//!
//! ## Rules
//! - A channel with pending records but no subscribers commits nothing and
//!   is skipped for the tick; other channels are never stalled by it.
//! - Scan failures are logged and retried next tick, never fatal.
//! - Polling is deliberate: a fixed short interval bounds worst-case
//!   latency without platform file-notification primitives.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::channels::{Channel, Registry};
use crate::core::config::CommitPolicy;
use crate::core::dispatcher;
use crate::store;

pub(crate) struct Poller {
    registry: Arc<Registry>,
    interval: Duration,
    commit: CommitPolicy,
}

impl Poller {
    pub(crate) fn new(registry: Arc<Registry>, interval: Duration, commit: CommitPolicy) -> Self {
        Self { registry, interval, commit }
    }

    /// Runs the tick loop until `token` is cancelled.
    ///
    /// A tick in progress finishes before the loop exits, so offsets
    /// committed during it are persisted.
    pub(crate) async fn run(self, token: CancellationToken) {
        let mut tick = time::interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tick.tick() => self.tick_once().await,
            }
        }
    }

    async fn tick_once(&self) {
        for channel in self.registry.snapshot().await {
            if let Err(err) = self.scan_channel(&channel).await {
                warn!(channel = %channel.id(), error = %err, "poll failed, retrying next tick");
            }
        }
    }

    async fn scan_channel(&self, channel: &Channel) -> std::io::Result<()> {
        let Some(len) = store::log::file_len(channel.log_path()).await? else {
            return Ok(());
        };

        let mut committed = channel.committed();
        if len < committed {
            warn!(
                channel = %channel.id(),
                len,
                committed,
                "log shorter than committed offset, resetting to 0"
            );
            committed = 0;
            channel.set_committed(0);
            store::offset::write_offset(channel.offset_path(), 0).await?;
        }
        if len == committed {
            return Ok(());
        }

        let batch = store::log::read_lines_from(channel.log_path(), committed).await?;
        if batch.records.is_empty() {
            // Only a partial line so far; wait for its terminator.
            return Ok(());
        }

        let subscribers = channel.subscribers().await;
        if subscribers.is_empty() {
            debug!(
                channel = %channel.id(),
                pending = batch.records.len(),
                "records pending but no subscribers, offset left uncommitted"
            );
            return Ok(());
        }

        debug!(
            channel = %channel.id(),
            records = batch.records.len(),
            next_offset = batch.next_offset,
            "dispatching batch"
        );
        let inflight = dispatcher::dispatch(channel.id(), batch.records, &subscribers);
        if self.commit == CommitPolicy::AfterDelivery {
            for handle in inflight {
                let _ = handle.await;
            }
        }

        channel.set_committed(batch.next_offset);
        if let Err(err) = store::offset::write_offset(channel.offset_path(), batch.next_offset).await
        {
            warn!(
                channel = %channel.id(),
                offset = batch.next_offset,
                error = %err,
                "offset persist failed, replay may start earlier after restart"
            );
        }
        Ok(())
    }
}
