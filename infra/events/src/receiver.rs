use crate::bus::Event;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// An extension trait for event receivers to provide a more ergonomic API.
pub trait EventReceiverExt<T> {
    /// Waits for the next event, returning `None` when the channel is closed.
    ///
    /// Lagged receivers continue from the oldest retained event.
    fn recv_event(&mut self) -> impl Future<Output = Option<Arc<T>>> + Send;

    /// Collects every event that is already queued, without waiting.
    fn drain(&mut self) -> Vec<Arc<T>>;
}

impl<T: Event> EventReceiverExt<T> for broadcast::Receiver<Arc<T>> {
    async fn recv_event(&mut self) -> Option<Arc<T>> {
        let mut skipped = 0u64;

        loop {
            match self.recv().await {
                Ok(event) => {
                    if skipped > 0 {
                        warn!(
                            event = std::any::type_name::<T>(),
                            skipped, "EventBus receiver lagged; continuing from oldest retained"
                        );
                    }
                    return Some(event);
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    skipped = skipped.saturating_add(n);
                    debug!(
                        event = std::any::type_name::<T>(),
                        skipped = n,
                        total_skipped = skipped,
                        "EventBus receiver lagged; accumulating skipped events"
                    );
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn drain(&mut self) -> Vec<Arc<T>> {
        let mut events = Vec::new();
        loop {
            match self.try_recv() {
                Ok(event) => events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!(event = std::any::type_name::<T>(), skipped = n, "Drain skipped events");
                },
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return events,
            }
        }
    }
}
