//! Error types used by the bus runtime and subscribers.
//!
//! This module defines two main error enums:
//!
//! - [`BusError`] - errors surfaced by bus operations (opening, publishing).
//! - [`DeliveryError`] - errors returned by subscriber callbacks.
//!
//! Both types provide `as_label` for logging/metrics. Poll-side failures are
//! never surfaced through these types: the poller logs them and retries on
//! the next tick.

use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced by bus operations.
///
/// These represent failures of calls made by the embedding application,
/// such as an append that could not reach the filesystem. Failures inside
/// the poll loop are logged and retried, never raised.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// A filesystem operation failed.
    #[error("i/o failure on {path}: {source}")]
    Io {
        /// Path the operation was addressing.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A publish payload contained a line terminator.
    ///
    /// Records are framed as one line each; callers must encode structured
    /// content (e.g. as single-line JSON) before publishing.
    #[error("payload for channel {channel} contains a line terminator")]
    PayloadHasNewline {
        /// The channel the publish was addressed to.
        channel: String,
    },
}

impl BusError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BusError::Io { path: path.into(), source }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tailbus::BusError;
    ///
    /// let err = BusError::PayloadHasNewline { channel: "tasks/orders".into() };
    /// assert_eq!(err.as_label(), "bus_payload_newline");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::Io { .. } => "bus_io",
            BusError::PayloadHasNewline { .. } => "bus_payload_newline",
        }
    }
}

/// # Errors produced by subscriber callbacks.
///
/// Returned from [`Subscribe::deliver`](crate::Subscribe::deliver) to signal
/// a handled failure. The dispatcher logs the error with channel and record
/// context; the record is still considered delivered and is never retried.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The callback could not process the record.
    #[error("delivery failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },
}

impl DeliveryError {
    /// Creates a [`DeliveryError::Failed`] from any message.
    ///
    /// # Example
    /// ```
    /// use tailbus::DeliveryError;
    ///
    /// let err = DeliveryError::failed("downstream unavailable");
    /// assert_eq!(err.as_label(), "delivery_failed");
    /// ```
    pub fn failed(error: impl Into<String>) -> Self {
        DeliveryError::Failed { error: error.into() }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::Failed { .. } => "delivery_failed",
        }
    }
}
