//! # Dispatcher: concurrent fan-out over records and subscribers.
//!
//! For each record in a batch, for each subscriber on the channel, one
//! independent unit of work is spawned onto the shared runtime.
//!
//! ## What it guarantees
//! - Submission preserves file order per channel: record `i` is spawned
//!   before record `i + 1`.
//! - A returned error or a panic is caught and logged per invocation;
//!   it never affects other records, other subscribers, or the committed
//!   offset.
//! - Spawning never blocks the poll loop.
//!
//! ## What it does **not** guarantee
//! - No ordering of handler *completions*, across records or subscribers.
//! - No retries: a failed delivery is logged and done.
//!
//! ## Diagram
//! ```text
//!    dispatch(batch)
//!        │                 (one task per record x subscriber)
//!        ├── record 1 ──► [task S1] [task S2] .. [task SN]
//!        ├── record 2 ──► [task S1] [task S2] .. [task SN]
//!        └── record M ──► [task S1] [task S2] .. [task SN]
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::error;

use crate::channels::ChannelId;
use crate::subscribers::SubscriberRef;

/// Fans `records` out to every subscriber in `subscribers`.
///
/// Returns the spawned handles so the caller can either drop them
/// (fire-and-forget) or await them before committing the offset.
pub(crate) fn dispatch(
    channel: &ChannelId,
    records: Vec<String>,
    subscribers: &[SubscriberRef],
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(records.len() * subscribers.len());
    for record in records {
        let record: Arc<str> = Arc::from(record);
        for subscriber in subscribers {
            let subscriber = Arc::clone(subscriber);
            let record = Arc::clone(&record);
            let channel = channel.clone();
            handles.push(tokio::spawn(async move {
                let fut = subscriber.deliver(&record);
                match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        error!(
                            channel = %channel,
                            subscriber = subscriber.name(),
                            record = %record,
                            error = %err,
                            "subscriber failed"
                        );
                    }
                    Err(panic_err) => {
                        error!(
                            channel = %channel,
                            subscriber = subscriber.name(),
                            record = %record,
                            panic = ?panic_err,
                            "subscriber panicked"
                        );
                    }
                }
            }));
        }
    }
    handles
}
