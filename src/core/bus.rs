//! # Bus facade: publish, subscribe, and lifecycle.
//!
//! [`Bus`] ties the channel registry, the poller, and the dispatcher
//! together behind a small API:
//!
//! - [`Bus::publish`] appends one record to a channel's log (non-blocking
//!   beyond the append I/O; it never waits for delivery).
//! - [`Bus::subscribe`] adds a permanent subscriber to a channel.
//! - [`Bus::register`] makes the poller track a channel before any publish
//!   or subscribe touches it.
//!
//! One poller task is spawned per instance at [`Bus::open`] and runs until
//! [`Bus::shutdown`]. Instances hold no global state: several buses may
//! coexist in one process as long as their data roots are disjoint.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::channels::{ChannelId, Registry};
use crate::core::config::BusConfig;
use crate::core::poller::Poller;
use crate::error::BusError;
use crate::store;
use crate::subscribers::SubscriberRef;

/// A durable, file-backed publish/subscribe bus.
///
/// Each channel is an append-only log file plus a persisted read offset.
/// Producers append lines; the poller discovers them within one poll
/// interval and fans them out to every subscriber of the channel.
pub struct Bus {
    cfg: BusConfig,
    registry: Arc<Registry>,
    token: CancellationToken,
    poller: JoinHandle<()>,
}

impl Bus {
    /// Opens a bus over `cfg.data_root` and starts its poller.
    ///
    /// Creates the data and state roots if absent. Channels themselves are
    /// created lazily on first use.
    pub async fn open(cfg: BusConfig) -> Result<Self, BusError> {
        tokio::fs::create_dir_all(&cfg.data_root)
            .await
            .map_err(|e| BusError::io(&cfg.data_root, e))?;
        let state_root = cfg.state_root();
        tokio::fs::create_dir_all(&state_root)
            .await
            .map_err(|e| BusError::io(&state_root, e))?;

        let registry = Registry::new(cfg.data_root.clone(), state_root);
        let token = CancellationToken::new();
        let poller = Poller::new(
            Arc::clone(&registry),
            cfg.poll_interval_clamped(),
            cfg.commit,
        );
        let handle = tokio::spawn(poller.run(token.clone()));
        debug!(
            data_root = %cfg.data_root.display(),
            interval = ?cfg.poll_interval_clamped(),
            "bus opened"
        );

        Ok(Self { cfg, registry, token, poller: handle })
    }

    /// Returns the configuration this bus was opened with.
    pub fn config(&self) -> &BusConfig {
        &self.cfg
    }

    /// Makes the poller track `id` without publishing or subscribing.
    ///
    /// Idempotent; repeat calls are no-ops.
    pub async fn register(&self, id: &ChannelId) {
        self.registry.register(id).await;
    }

    /// Subscribes `subscriber` to `id`, registering the channel if needed.
    ///
    /// The subscriber receives every record committed after this call, for
    /// the life of the bus. There is no unsubscribe.
    pub async fn subscribe(&self, id: &ChannelId, subscriber: SubscriberRef) {
        self.registry.subscribe(id, subscriber).await;
    }

    /// Appends one record to the channel's log.
    ///
    /// The payload must not contain a line terminator; encode structured
    /// content as a single line (e.g. compact JSON) first. Delivery happens
    /// asynchronously, within one poll interval.
    pub async fn publish(&self, id: &ChannelId, payload: &str) -> Result<(), BusError> {
        if payload.contains('\n') || payload.contains('\r') {
            return Err(BusError::PayloadHasNewline { channel: id.to_string() });
        }
        let channel = self.registry.register(id).await;
        store::log::append_line(channel.log_path(), payload)
            .await
            .map_err(|e| BusError::io(channel.log_path(), e))?;
        debug!(channel = %id, "record appended");
        Ok(())
    }

    /// Stops the poller and waits for its current tick to finish.
    ///
    /// In-flight handler tasks are left to complete on the runtime; offsets
    /// committed before shutdown are persisted. A bus reopened over the
    /// same data root resumes from the persisted offsets.
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.poller.await;
        debug!(data_root = %self.cfg.data_root.display(), "bus shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CommitPolicy;
    use crate::error::DeliveryError;
    use crate::subscribers::SubscriberFn;

    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::sync::Notify;

    fn test_config(root: &Path, commit: CommitPolicy) -> BusConfig {
        BusConfig {
            data_root: root.to_path_buf(),
            poll_interval: Duration::from_millis(20),
            commit,
        }
    }

    fn collector() -> (Arc<Mutex<Vec<String>>>, SubscriberRef) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub: SubscriberRef = SubscriberFn::arc("collector", move |payload: String| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(payload);
                Ok::<_, DeliveryError>(())
            }
        });
        (seen, sub)
    }

    async fn wait_until(cond: impl Fn() -> bool) -> bool {
        for _ in 0..200 {
            if cond() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cond()
    }

    fn offset_path(cfg: &BusConfig, id: &ChannelId) -> PathBuf {
        id.offset_path(&cfg.state_root())
    }

    fn log_path(cfg: &BusConfig, id: &ChannelId) -> PathBuf {
        id.log_path(&cfg.data_root)
    }

    #[tokio::test]
    async fn publishes_are_delivered_in_order_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path(), CommitPolicy::OnSubmit);
        let bus = Bus::open(cfg).await.unwrap();

        let orders = ChannelId::task("orders");
        let (seen, sub) = collector();
        bus.subscribe(&orders, sub).await;

        bus.publish(&orders, "hello").await.unwrap();
        assert!(wait_until(|| *seen.lock().unwrap() == vec!["hello"]).await);

        bus.publish(&orders, "world").await.unwrap();
        assert!(wait_until(|| *seen.lock().unwrap() == vec!["hello", "world"]).await);

        // A few more ticks must not produce duplicates.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["hello", "world"]);

        bus.shutdown().await;
    }

    #[tokio::test]
    async fn fans_out_to_every_current_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path(), CommitPolicy::OnSubmit);
        let bus = Bus::open(cfg).await.unwrap();

        let topic = ChannelId::event("standup");
        let collectors: Vec<_> = (0..3).map(|_| collector()).collect();
        for (_, sub) in &collectors {
            bus.subscribe(&topic, Arc::clone(sub)).await;
        }

        bus.publish(&topic, "broadcast").await.unwrap();
        for (seen, _) in &collectors {
            let seen = Arc::clone(seen);
            assert!(wait_until(move || *seen.lock().unwrap() == vec!["broadcast"]).await);
        }

        bus.shutdown().await;
    }

    #[tokio::test]
    async fn late_subscriber_does_not_receive_old_records() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path(), CommitPolicy::OnSubmit);
        let bus = Bus::open(cfg).await.unwrap();

        let topic = ChannelId::event("standup");
        let (early_seen, early) = collector();
        bus.subscribe(&topic, early).await;

        bus.publish(&topic, "first").await.unwrap();
        assert!(wait_until(|| *early_seen.lock().unwrap() == vec!["first"]).await);

        let (late_seen, late) = collector();
        bus.subscribe(&topic, late).await;

        bus.publish(&topic, "second").await.unwrap();
        assert!(wait_until(|| *early_seen.lock().unwrap() == vec!["first", "second"]).await);
        assert!(wait_until(|| *late_seen.lock().unwrap() == vec!["second"]).await);
        assert!(!late_seen.lock().unwrap().contains(&"first".to_string()));

        bus.shutdown().await;
    }

    #[tokio::test]
    async fn restart_replays_only_uncommitted_records() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path(), CommitPolicy::OnSubmit);
        let orders = ChannelId::task("orders");

        let bus = Bus::open(cfg.clone()).await.unwrap();
        let (seen, sub) = collector();
        bus.subscribe(&orders, sub).await;
        bus.publish(&orders, "hello").await.unwrap();
        assert!(wait_until(|| *seen.lock().unwrap() == vec!["hello"]).await);
        bus.shutdown().await;

        // Same data directory, fresh instance: nothing is redelivered.
        let bus = Bus::open(cfg.clone()).await.unwrap();
        let (seen, sub) = collector();
        bus.subscribe(&orders, sub).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(seen.lock().unwrap().is_empty());

        bus.publish(&orders, "world").await.unwrap();
        assert!(wait_until(|| *seen.lock().unwrap() == vec!["world"]).await);

        let raw = std::fs::read_to_string(log_path(&cfg, &orders)).unwrap();
        assert_eq!(raw, "hello\nworld\n");

        bus.shutdown().await;
    }

    #[tokio::test]
    async fn truncated_log_resets_offset_and_replays() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path(), CommitPolicy::OnSubmit);
        let topic = ChannelId::event("feed");

        let bus = Bus::open(cfg.clone()).await.unwrap();
        let (seen, sub) = collector();
        bus.subscribe(&topic, sub).await;
        bus.publish(&topic, "a-long-first-record").await.unwrap();
        assert!(wait_until(|| *seen.lock().unwrap() == vec!["a-long-first-record"]).await);
        bus.shutdown().await;

        // Replace the log with a shorter file while the offset still points
        // past its end.
        std::fs::write(log_path(&cfg, &topic), "x\n").unwrap();

        let bus = Bus::open(cfg.clone()).await.unwrap();
        let (seen, sub) = collector();
        bus.subscribe(&topic, sub).await;
        assert!(wait_until(|| *seen.lock().unwrap() == vec!["x"]).await);
        let offset = offset_path(&cfg, &topic);
        assert!(
            wait_until(|| std::fs::read_to_string(&offset).map(|s| s == "2").unwrap_or(false))
                .await
        );

        bus.shutdown().await;
    }

    #[tokio::test]
    async fn partial_line_is_held_until_terminated() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path(), CommitPolicy::OnSubmit);
        let bus = Bus::open(cfg.clone()).await.unwrap();

        let topic = ChannelId::event("stream");
        let (seen, sub) = collector();
        bus.subscribe(&topic, sub).await;

        let path = log_path(&cfg, &topic);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();
        file.write_all(b"half a record").unwrap();
        file.flush().unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(seen.lock().unwrap().is_empty());

        file.write_all(b" now whole\n").unwrap();
        file.flush().unwrap();
        assert!(wait_until(|| *seen.lock().unwrap() == vec!["half a record now whole"]).await);

        bus.shutdown().await;
    }

    #[tokio::test]
    async fn channel_without_subscribers_keeps_offset_uncommitted() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path(), CommitPolicy::OnSubmit);
        let bus = Bus::open(cfg.clone()).await.unwrap();

        let queue = ChannelId::task("grooming");
        bus.register(&queue).await;
        bus.publish(&queue, "queued").await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!offset_path(&cfg, &queue).exists());

        // The records are delivered once a subscriber appears.
        let (seen, sub) = collector();
        bus.subscribe(&queue, sub).await;
        assert!(wait_until(|| *seen.lock().unwrap() == vec!["queued"]).await);
        assert!(wait_until(|| offset_path(&cfg, &queue).exists()).await);

        bus.shutdown().await;
    }

    #[tokio::test]
    async fn publish_rejects_embedded_line_terminators() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path(), CommitPolicy::OnSubmit);
        let bus = Bus::open(cfg.clone()).await.unwrap();

        let orders = ChannelId::task("orders");
        let err = bus.publish(&orders, "two\nlines").await.unwrap_err();
        assert!(matches!(err, BusError::PayloadHasNewline { .. }));
        let err = bus.publish(&orders, "carriage\rreturn").await.unwrap_err();
        assert_eq!(err.as_label(), "bus_payload_newline");

        // Nothing was appended.
        assert!(!log_path(&cfg, &orders).exists());

        bus.shutdown().await;
    }

    struct Gate {
        started: AtomicBool,
        release: Notify,
    }

    fn gated_collector(gate: Arc<Gate>) -> (Arc<Mutex<Vec<String>>>, SubscriberRef) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub: SubscriberRef = SubscriberFn::arc("gated", move |payload: String| {
            let sink = Arc::clone(&sink);
            let gate = Arc::clone(&gate);
            async move {
                gate.started.store(true, Ordering::Release);
                gate.release.notified().await;
                sink.lock().unwrap().push(payload);
                Ok::<_, DeliveryError>(())
            }
        });
        (seen, sub)
    }

    #[tokio::test]
    async fn on_submit_commits_while_handlers_run() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path(), CommitPolicy::OnSubmit);
        let bus = Bus::open(cfg.clone()).await.unwrap();

        let queue = ChannelId::task("slow");
        let gate = Arc::new(Gate { started: AtomicBool::new(false), release: Notify::new() });
        let (seen, sub) = gated_collector(Arc::clone(&gate));
        bus.subscribe(&queue, sub).await;

        bus.publish(&queue, "blocked").await.unwrap();
        assert!(wait_until(|| gate.started.load(Ordering::Acquire)).await);

        // The offset is persisted even though the handler has not finished.
        let expected = std::fs::metadata(log_path(&cfg, &queue)).unwrap().len();
        let offset = offset_path(&cfg, &queue);
        assert!(
            wait_until(|| {
                std::fs::read_to_string(&offset).map(|s| s == expected.to_string()).unwrap_or(false)
            })
            .await
        );
        assert!(seen.lock().unwrap().is_empty());

        gate.release.notify_one();
        assert!(wait_until(|| *seen.lock().unwrap() == vec!["blocked"]).await);

        bus.shutdown().await;
    }

    #[tokio::test]
    async fn after_delivery_commits_only_when_handlers_finish() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path(), CommitPolicy::AfterDelivery);
        let bus = Bus::open(cfg.clone()).await.unwrap();

        let queue = ChannelId::task("slow");
        let gate = Arc::new(Gate { started: AtomicBool::new(false), release: Notify::new() });
        let (seen, sub) = gated_collector(Arc::clone(&gate));
        bus.subscribe(&queue, sub).await;

        bus.publish(&queue, "blocked").await.unwrap();
        assert!(wait_until(|| gate.started.load(Ordering::Acquire)).await);

        // Handler still blocked: the offset must not be persisted yet.
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!offset_path(&cfg, &queue).exists());

        gate.release.notify_one();
        assert!(wait_until(|| *seen.lock().unwrap() == vec!["blocked"]).await);

        let expected = std::fs::metadata(log_path(&cfg, &queue)).unwrap().len();
        let offset = offset_path(&cfg, &queue);
        assert!(
            wait_until(|| {
                std::fs::read_to_string(&offset).map(|s| s == expected.to_string()).unwrap_or(false)
            })
            .await
        );

        bus.shutdown().await;
    }

    #[tokio::test]
    async fn independent_buses_coexist_on_disjoint_roots() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let bus_a = Bus::open(test_config(dir_a.path(), CommitPolicy::OnSubmit)).await.unwrap();
        let bus_b = Bus::open(test_config(dir_b.path(), CommitPolicy::OnSubmit)).await.unwrap();

        let topic = ChannelId::event("shared-name");
        let (seen_a, sub_a) = collector();
        let (seen_b, sub_b) = collector();
        bus_a.subscribe(&topic, sub_a).await;
        bus_b.subscribe(&topic, sub_b).await;

        bus_a.publish(&topic, "only-a").await.unwrap();
        assert!(wait_until(|| *seen_a.lock().unwrap() == vec!["only-a"]).await);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(seen_b.lock().unwrap().is_empty());

        bus_a.shutdown().await;
        bus_b.shutdown().await;
    }
}
