//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use crate::events::{EventFilter, EventTopic, PreconfEvent};
use crate::publisher::InMemoryEventBus;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::task::{ready, Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;
use uuid::Uuid;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// Trait for subscribing to events from the bus.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to events matching a filter.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        InMemoryEventBus::subscribe(self, filter)
    }
}

/// Bookkeeping of live subscription handles.
#[derive(Debug, Clone, Default)]
pub(crate) struct SubscriptionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Vec<EventTopic>>>>,
}

impl SubscriptionRegistry {
    pub(crate) fn register(&self, filter: &EventFilter) -> Uuid {
        let id = Uuid::new_v4();
        if let Ok(mut subs) = self.inner.write() {
            subs.insert(id, filter.topics.clone());
        }
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().map(|subs| subs.len()).unwrap_or(0)
    }

    fn release(&self, id: Uuid) {
        let Ok(mut subs) = self.inner.write() else {
            return;
        };
        if subs.remove(&id).is_some() {
            debug!(subscription = %id, "Subscription released");
        }
    }
}

/// Removes the registry entry when the owning handle goes away.
struct RegistryGuard {
    id: Uuid,
    registry: SubscriptionRegistry,
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

/// A subscription handle for receiving events.
///
/// When dropped, the subscription is automatically cleaned up.
pub struct Subscription {
    /// Unique id of this subscription.
    id: Uuid,

    /// The broadcast receiver.
    receiver: broadcast::Receiver<PreconfEvent>,

    /// Filter for this subscription.
    filter: EventFilter,

    guard: RegistryGuard,
}

impl Subscription {
    /// Create a new subscription.
    pub(crate) fn new(
        id: Uuid,
        receiver: broadcast::Receiver<PreconfEvent>,
        filter: EventFilter,
        registry: SubscriptionRegistry,
    ) -> Self {
        Self {
            id,
            receiver,
            filter,
            guard: RegistryGuard { id, registry },
        }
    }

    /// Id of this subscription.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Receive the next event that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next matching event
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<PreconfEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, oldest events dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
            // Event doesn't match filter, continue waiting
        }
    }

    /// Try to receive the next event without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was available and matched
    /// - `Ok(None)` - No event available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<PreconfEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
            // Event doesn't match filter, try again
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Release the subscription.
    ///
    /// The receiver is dropped before this returns, so nothing published
    /// afterwards can reach this handle.
    pub fn unsubscribe(self) {
        debug!(subscription = %self.id, "Unsubscribing");
        drop(self);
    }

    /// Convert into a `Stream`.
    #[must_use]
    pub fn into_stream(self) -> EventStream {
        EventStream {
            inner: BroadcastStream::new(self.receiver),
            filter: self.filter,
            _guard: self.guard,
        }
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct EventStream {
    inner: BroadcastStream<PreconfEvent>,
    filter: EventFilter,
    _guard: RegistryGuard,
}

impl EventStream {
    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = PreconfEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                Some(Ok(event)) if this.filter.matches(&event) => return Poll::Ready(Some(event)),
                Some(Ok(_)) => continue,
                Some(Err(BroadcastStreamRecvError::Lagged(count))) => {
                    debug!(lagged = count, "Stream lagged, oldest events dropped");
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
