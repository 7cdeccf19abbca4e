//! Subscriber seam: the [`Subscribe`] trait and a closure adapter.
//!
//! A subscriber is bound to exactly one channel at registration time and
//! receives every record published to that channel afterwards. Registration
//! is permanent for the life of the bus; there is no unsubscribe.

mod func;
mod subscriber;

pub use func::SubscriberFn;
pub use subscriber::{Subscribe, SubscriberRef};
