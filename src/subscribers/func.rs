//! # Function-backed subscriber (`SubscriberFn`)
//!
//! [`SubscriberFn`] wraps a closure `F: Fn(String) -> Fut`, producing a fresh
//! future per delivery. This avoids shared mutable state; when a handler does
//! need shared state, capture an `Arc<...>` explicitly inside the closure.
//!
//! ## Example
//! ```
//! use tailbus::{DeliveryError, SubscriberFn, SubscriberRef};
//!
//! let sub: SubscriberRef = SubscriberFn::arc("printer", |payload: String| async move {
//!     println!("got: {payload}");
//!     Ok::<_, DeliveryError>(())
//! });
//!
//! assert_eq!(sub.name(), "printer");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::subscribers::subscriber::Subscribe;

/// Function-backed subscriber implementation.
///
/// Wraps a closure that *creates* a new future per delivery.
#[derive(Debug)]
pub struct SubscriberFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SubscriberFn<F> {
    /// Creates a new function-backed subscriber.
    ///
    /// Prefer [`SubscriberFn::arc`] when you immediately need a
    /// [`SubscriberRef`](crate::SubscriberRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Subscribe for SubscriberFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), DeliveryError>> + Send + 'static,
{
    async fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
        (self.f)(payload.to_owned()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
