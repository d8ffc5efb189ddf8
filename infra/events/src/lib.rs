//! # Event Bus
//!
//! A small, type-safe fan-out event bus.
//!
//! ## Overview
//!
//! Every event type gets its own broadcast channel, created lazily on first use.
//! Publishing is synchronous: the event is handed to every live subscriber before
//! `publish` returns, and silently dropped when nobody listens. Subscribers drain
//! events either synchronously ([`EventReceiverExt::drain`]) or asynchronously
//! ([`EventReceiverExt::recv_event`]).
//!
//! ## Features
//!
//! * **Type-Safe**: Events are identified by their Rust type.
//! * **Any number of observers**: each subscriber receives every event.
//! * **Lag tolerant**: slow receivers skip to the oldest retained event instead of failing.
//!
//! # Example
//!
//! ```rust
//! use strata_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct ThemeChanged { dark: bool }
//!
//! fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<ThemeChanged>()?;
//!
//!     bus.publish(ThemeChanged { dark: true })?;
//!
//!     let events = rx.drain();
//!     assert_eq!(events.len(), 1);
//!     assert!(events[0].dark);
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
pub use tokio::sync::broadcast::Receiver;
