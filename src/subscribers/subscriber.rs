//! # Record subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for plugging record handlers
//! into the bus. Each delivery runs as its own unit of work on the shared
//! runtime, isolated from the poll loop and from every other delivery.
//!
//! ## Rules
//! - A slow handler delays only its own unit of work, never the poller or
//!   other subscribers.
//! - A returned error is logged with channel and record context; the record
//!   still counts as delivered and is not retried.
//! - Panics are caught and logged; they cannot take down the bus.
//! - Per channel, deliveries are submitted in file order; completion order
//!   is unspecified.
//!
//! ## Example
//! ```
//! use async_trait::async_trait;
//! use tailbus::{DeliveryError, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Subscribe for Audit {
//!     async fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
//!         // persist the payload, call a downstream service, ...
//!         let _ = payload;
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "audit"
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DeliveryError;

/// Shared handle to a subscriber.
pub type SubscriberRef = Arc<dyn Subscribe>;

/// Handler for records published to one channel.
///
/// Implementations should use async I/O and handle their own errors where
/// possible; whatever escapes (an `Err` or a panic) is caught and logged by
/// the dispatcher without affecting other deliveries.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single record payload.
    ///
    /// Called from a dedicated unit of work, not from the poll loop.
    async fn deliver(&self, payload: &str) -> Result<(), DeliveryError>;

    /// Returns the subscriber name used in logs.
    ///
    /// Prefer short, descriptive names (e.g. "audit", "metrics", "slack").
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
