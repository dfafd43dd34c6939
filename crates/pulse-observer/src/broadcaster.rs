//! Observer registry and event fan-out.
//!
//! [`EventBroadcaster`] is the only owner of the observer registry. Each
//! attached observer gets a bounded queue; [`publish`](EventBroadcaster::publish)
//! stamps an event once and offers it to every queue without blocking. A
//! full queue loses that one event for that one observer, a closed queue
//! unregisters its observer. Neither case affects anyone else.
//!
//! The registry is transport-independent: the `WebSocket` endpoint is just
//! one consumer of a [`Subscription`].

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use pulse_core::notify::EventSink;
use pulse_types::{ClientId, EventEnvelope, ObserverEvent};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

/// Per-observer queue length used when none is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Greeting carried by `connection:established`.
const GREETING: &str = "Connected to message generator";

type Outbox = mpsc::Sender<Arc<EventEnvelope>>;

/// Fans generator events out to every attached observer.
#[derive(Debug)]
pub struct EventBroadcaster {
    observers: RwLock<HashMap<ClientId, Outbox>>,
    queue_capacity: usize,
}

impl EventBroadcaster {
    /// Create an empty broadcaster whose observers each buffer up to
    /// `queue_capacity` events (at least one).
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            observers: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a new observer.
    ///
    /// The returned subscription already holds a `connection:established`
    /// event; no other observer sees it. Dropping the subscription
    /// unregisters the observer.
    pub fn attach(self: &Arc<Self>) -> Subscription {
        let client_id = ClientId::new();
        let (outbox, receiver) = mpsc::channel(self.queue_capacity);

        let greeting = EventEnvelope::now(ObserverEvent::ConnectionEstablished {
            message: GREETING.to_owned(),
            client_id,
        });
        if outbox.try_send(Arc::new(greeting)).is_err() {
            warn!(%client_id, "Could not queue connection greeting");
        }

        let count = {
            let mut observers = self.write();
            observers.insert(client_id, outbox);
            observers.len()
        };
        info!(%client_id, observers = count, "Observer attached");

        Subscription {
            client_id,
            receiver,
            broadcaster: Arc::downgrade(self),
        }
    }

    /// Unregister an observer. Returns `false` if it was not attached.
    pub fn detach(&self, client_id: ClientId) -> bool {
        let (removed, count) = {
            let mut observers = self.write();
            let removed = observers.remove(&client_id).is_some();
            (removed, observers.len())
        };
        if removed {
            info!(%client_id, observers = count, "Observer detached");
        }
        removed
    }

    /// Deliver `event` to every attached observer.
    ///
    /// Returns the number of observers whose queue accepted it.
    pub fn publish(&self, event: ObserverEvent) -> usize {
        let envelope = Arc::new(EventEnvelope::now(event));
        let mut delivered: usize = 0;
        let mut closed = Vec::new();

        {
            let observers = self.read();
            for (client_id, outbox) in observers.iter() {
                match outbox.try_send(Arc::clone(&envelope)) {
                    Ok(()) => delivered = delivered.saturating_add(1),
                    Err(TrySendError::Full(_)) => {
                        warn!(
                            %client_id,
                            event = envelope.name(),
                            "Observer queue full, dropping event"
                        );
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*client_id),
                }
            }
        }

        if !closed.is_empty() {
            let mut observers = self.write();
            for client_id in closed {
                observers.remove(&client_id);
                debug!(%client_id, "Removed observer with closed queue");
            }
        }

        delivered
    }

    /// Deliver `event` to one observer only.
    ///
    /// Returns `false` if the observer is unknown or its queue refused it.
    pub fn send_to(&self, client_id: ClientId, event: ObserverEvent) -> bool {
        let Some(outbox) = self.read().get(&client_id).cloned() else {
            debug!(%client_id, "Direct send to unknown observer");
            return false;
        };
        match outbox.try_send(Arc::new(EventEnvelope::now(event))) {
            Ok(()) => true,
            Err(e) => {
                warn!(%client_id, "Direct send to observer failed: {e}");
                false
            }
        }
    }

    /// Number of attached observers.
    pub fn observer_count(&self) -> usize {
        self.read().len()
    }

    /// IDs of attached observers, sorted (UUID v7, so roughly oldest first).
    pub fn observer_ids(&self) -> Vec<ClientId> {
        let mut ids: Vec<ClientId> = self.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ClientId, Outbox>> {
        self.observers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ClientId, Outbox>> {
        self.observers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl EventSink for EventBroadcaster {
    fn emit(&self, event: ObserverEvent) {
        let name = event.name();
        let delivered = self.publish(event);
        debug!(event = name, delivered, "Event broadcast");
    }
}

/// An attached observer's end of the event stream.
#[derive(Debug)]
pub struct Subscription {
    client_id: ClientId,
    receiver: mpsc::Receiver<Arc<EventEnvelope>>,
    broadcaster: Weak<EventBroadcaster>,
}

impl Subscription {
    /// This observer's registration handle.
    pub const fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Wait for the next event. `None` once the observer was unregistered
    /// and its queue drained.
    pub async fn recv(&mut self) -> Option<Arc<EventEnvelope>> {
        self.receiver.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<EventEnvelope>> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(broadcaster) = self.broadcaster.upgrade() {
            broadcaster.detach(self.client_id);
        }
    }
}
