use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Buffer size used when a channel is created implicitly.
const DEFAULT_CAPACITY: usize = 64;
const MIN_CAPACITY: usize = 1;

/// Marker trait for types that can be sent across the [`EventBus`].
///
/// Any type that is `Send + Sync + 'static` automatically implements this trait.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug)]
struct Channel {
    capacity: usize,
    sender: Box<dyn Any + Send + Sync>,
}

impl Channel {
    fn new<T: Event>(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel::<Arc<T>>(capacity);
        Self { capacity, sender: Box::new(tx) }
    }

    fn sender<T: Event>(&self) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        self.sender.downcast_ref::<broadcast::Sender<Arc<T>>>().cloned().ok_or_else(|| {
            EventBusError::TypeMismatch {
                message: std::any::type_name::<T>().into(),
                context: Some("Unexpected event type".into()),
            }
        })
    }
}

#[derive(Debug)]
struct BusInner {
    channels: RwLock<FxHashMap<TypeId, Channel>>,
    capacity: usize,
    closed: AtomicBool,
}

/// A thread-safe, typed fan-out event bus.
///
/// Channels are indexed by the [`TypeId`] of the event. Cloning the bus is cheap and every
/// clone shares the same channels.
#[derive(Debug, Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a new, empty `EventBus` with the default per-type buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                channels: RwLock::new(FxHashMap::default()),
                capacity: DEFAULT_CAPACITY,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Creates a bus whose implicitly created channels buffer `capacity` events.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, EventBusError> {
        let capacity = validate_capacity(capacity)?;
        Ok(Self {
            inner: Arc::new(BusInner {
                channels: RwLock::new(FxHashMap::default()),
                capacity,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Subscribes to events of type `T`.
    ///
    /// # Errors
    /// Returns [`EventBusError::Closed`] after [`EventBus::shutdown`].
    ///
    /// # Examples
    /// ```rust
    /// use strata_event_bus::{EventBus, EventReceiverExt};
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// struct Saved(u64);
    ///
    /// # fn main() -> Result<(), strata_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// let mut rx = bus.subscribe::<Saved>()?;
    /// bus.publish(Saved(1))?;
    /// assert_eq!(rx.drain()[0].0, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(self.inner.capacity)
    }

    /// Subscribes to events of type `T`, creating the channel with `capacity` if it is new.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] if `capacity` is zero and
    /// [`EventBusError::Closed`] after [`EventBus::shutdown`].
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        let capacity = validate_capacity(capacity)?;
        if self.is_closed() {
            return Err(EventBusError::Closed {
                message: std::any::type_name::<T>().into(),
                context: Some("Subscription after shutdown".into()),
            });
        }
        Ok(self.sender::<T>(capacity)?.subscribe())
    }

    /// Publishes an event to every current subscriber of `T`.
    ///
    /// Returns the number of subscribers that received it. Publishing without subscribers,
    /// or after shutdown, is not an error and reports zero.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the type registry is corrupted.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Publishes a shared event instance without re-wrapping.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the type registry is corrupted.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        if self.is_closed() {
            trace!(event = std::any::type_name::<T>(), "Event dropped: bus is shut down");
            return Ok(0);
        }

        let sender = self.sender::<T>(self.inner.capacity)?;
        Ok(sender.send(event).map_or_else(
            |_| {
                trace!(event = std::any::type_name::<T>(), "Event dropped: no active subscribers");
                0
            },
            |count| {
                trace!(event = std::any::type_name::<T>(), count, "Event dispatched");
                count
            },
        ))
    }

    /// Number of live receivers for events of type `T`.
    #[must_use]
    pub fn subscriber_count<T: Event>(&self) -> usize {
        self.inner
            .channels
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|channel| channel.sender::<T>().ok())
            .map_or(0, |tx| tx.receiver_count())
    }

    /// Whether [`EventBus::shutdown`] has been called on this bus or any of its clones.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Shuts the bus down by dropping all channels; receivers observe closure.
    ///
    /// Returns the number of event channels that were closed.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        self.inner.closed.store(true, Ordering::Release);
        let mut channels = self.inner.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn sender<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        let id = TypeId::of::<T>();

        if let Some(channel) = self.inner.channels.read().get(&id) {
            if channel.capacity != capacity && capacity != self.inner.capacity {
                warn!(
                    event = std::any::type_name::<T>(),
                    existing_capacity = channel.capacity,
                    requested_capacity = capacity,
                    "Channel already initialized with a different capacity"
                );
            }
            return channel.sender::<T>();
        }

        let mut channels = self.inner.channels.write();
        let channel = channels.entry(id).or_insert_with(|| {
            trace!(event = std::any::type_name::<T>(), capacity, "Initializing new event channel");
            Channel::new::<T>(capacity)
        });
        channel.sender::<T>()
    }
}

fn validate_capacity(capacity: usize) -> Result<usize, EventBusError> {
    if capacity < MIN_CAPACITY {
        return Err(EventBusError::InvalidCapacity {
            message: format!("capacity must be >= {MIN_CAPACITY}").into(),
            context: None,
        });
    }
    Ok(capacity)
}
