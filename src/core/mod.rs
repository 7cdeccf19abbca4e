//! Runtime core: bus facade, poller, dispatcher, configuration.
//!
//! The public API from this module is [`Bus`] plus its configuration. The
//! internals:
//! - [`poller`]: the periodic scanner that discovers new records and
//!   advances committed offsets;
//! - [`dispatcher`]: fans each discovered record out to every subscriber as
//!   independent units of work;
//! - [`config`]: construction-time settings ([`BusConfig`], [`CommitPolicy`]);
//! - [`bus`]: the facade tying registry, poller, and dispatcher together.

mod bus;
mod config;
mod dispatcher;
mod poller;

pub use bus::Bus;
pub use config::{BusConfig, CommitPolicy};
