//! Synchronous, in-process event delivery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};
use uuid::Uuid;

use memberbill_core::{AggregateId, DomainError, DomainResult};

use crate::{Event, EventEnvelope, EventHandler};

/// Fan-out of events to subscribed handlers.
///
/// - No IO / no async / no queueing
/// - Handlers run in subscription order, inside `publish`
/// - The first failing handler aborts delivery and its error is returned
pub struct EventDispatcher<E: Event> {
    handlers: RwLock<Vec<Arc<dyn EventHandler<E>>>>,
    next_sequence: AtomicU64,
}

impl<E: Event> EventDispatcher<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: Arc<dyn EventHandler<E>>) {
        // A poisoned lock only means an earlier subscribe panicked; the Vec is intact.
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!(handler = handler.name(), "event handler subscribed");
        handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().map(|h| h.len()).unwrap_or(0)
    }

    /// Wrap `event` in an envelope and deliver it to every handler.
    pub fn publish(
        &self,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        event: E,
    ) -> DomainResult<EventEnvelope<E>> {
        let sequence_number = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let envelope = EventEnvelope::new(
            Uuid::now_v7(),
            aggregate_id,
            aggregate_type,
            sequence_number,
            event,
        );

        // Snapshot so handlers may subscribe further handlers without deadlocking.
        let handlers: Vec<Arc<dyn EventHandler<E>>> = self
            .handlers
            .read()
            .map_err(|_| DomainError::invariant("event dispatcher lock poisoned"))?
            .clone();

        for handler in &handlers {
            if let Err(err) = handler.handle(&envelope) {
                warn!(
                    handler = handler.name(),
                    event_type = envelope.payload().event_type(),
                    sequence_number,
                    error = %err,
                    "event handler failed"
                );
                return Err(err);
            }
        }

        debug!(
            event_type = envelope.payload().event_type(),
            %aggregate_id,
            sequence_number,
            handlers = handlers.len(),
            "event delivered"
        );
        Ok(envelope)
    }
}

impl<E: Event> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_sequence: AtomicU64::new(0),
        }
    }
}

impl<E: Event> core::fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handler_count())
            .field("next_sequence", &self.next_sequence.load(Ordering::SeqCst))
            .finish()
    }
}
