//! # Shared Bus - Preconfirmation Event Feed
//!
//! Explicit publish/subscribe channel for preconf request notices and
//! verdicts.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Coordinator  │                    │  Subscriber  │
//! │              │    publish()       │ (RPC waiter, │
//! │              │ ──────┐            │  listeners)  │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │  (bounded)   │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery
//!
//! - Publishing never waits on subscribers.
//! - Each subscriber has a bounded buffer; a subscriber that falls behind
//!   loses the oldest events.
//! - A [`Subscription`] is owned by its holder; `unsubscribe` (or drop)
//!   ends delivery.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, PreconfEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
