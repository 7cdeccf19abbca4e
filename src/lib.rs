//! # tailbus
//!
//! **tailbus** is a durable, file-backed publish/subscribe bus for a single
//! process.
//!
//! Decoupled components exchange line-delimited records through append-only
//! log files. A persisted byte offset per channel marks how far delivery has
//! progressed, so a restarted process resumes where it left off instead of
//! replaying everything or losing what arrived while it was down.
//!
//! ## Architecture
//! ```text
//!  producer ── publish(channel, payload) ──► append "<payload>\n"
//!                                                 │
//!                                                 ▼
//!                               <data_root>/events/<name>.log
//!                               <data_root>/tasks/<name>.jsonl
//!                                                 │
//!            ┌────────────────────────────────────┘
//!            ▼
//!  ┌─────────────────────────────────────────────────────────┐
//!  │  Poller (one task per bus, fixed tick)                  │
//!  │  - reads bytes past the committed offset                │
//!  │  - splits them into whole lines (partial line: waits)   │
//!  │  - resets to 0 when the log was truncated externally    │
//!  └──────────────┬──────────────────────────────────────────┘
//!                 │ ordered batch
//!                 ▼
//!  ┌─────────────────────────────────────────────────────────┐
//!  │  Dispatcher (shared runtime)                            │
//!  │  - one unit of work per record x subscriber             │
//!  │  - errors and panics caught and logged per invocation   │
//!  └──────────────┬──────────────────────────────────────────┘
//!                 │ then
//!                 ▼
//!     commit offset to <data_root>/bus_state/.../<name>.offset
//! ```
//!
//! Delivery is broadcast: every subscriber of a channel receives every
//! record published after it subscribed. There is one offset per channel,
//! not per subscriber, and no unsubscribe.
//!
//! ## Guarantees
//! - Within a channel, records are submitted to handlers in file order.
//! - In normal operation every record reaches every subscriber exactly
//!   once. Under the default [`CommitPolicy::OnSubmit`] a crash between
//!   offset commit and handler completion drops that tick's deliveries;
//!   [`CommitPolicy::AfterDelivery`] turns the same window into
//!   redelivery instead.
//! - Offsets never move backwards except through truncation recovery, and
//!   never point past the end of the log.
//! - No error in the bus core terminates the process: poll failures are
//!   logged and retried, handler failures are logged and isolated.
//!
//! ## Example
//! ```no_run
//! use tailbus::{Bus, BusConfig, ChannelId, DeliveryError, SubscriberFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Bus::open(BusConfig::default()).await?;
//!
//!     let orders = ChannelId::task("orders");
//!     bus.subscribe(
//!         &orders,
//!         SubscriberFn::arc("printer", |payload: String| async move {
//!             println!("order: {payload}");
//!             Ok::<_, DeliveryError>(())
//!         }),
//!     )
//!     .await;
//!
//!     bus.publish(&orders, r#"{"id":1,"sku":"widget"}"#).await?;
//!     // Delivery happens within one poll interval (200ms by default).
//!     Ok(())
//! }
//! ```

mod channels;
mod core;
mod error;
mod store;
mod subscribers;

// ---- Public re-exports ----

pub use channels::{ChannelId, ChannelKind};
pub use error::{BusError, DeliveryError};
pub use subscribers::{Subscribe, SubscriberFn, SubscriberRef};

pub use crate::core::{Bus, BusConfig, CommitPolicy};
