use std::sync::Arc;

use memberbill_core::DomainResult;

use crate::{Event, EventEnvelope};

/// Reacts to a published event, synchronously.
///
/// Handlers run inside the publisher's call: an error returned here is the
/// publisher's error. Handlers must be idempotent, since a caller may retry
/// the whole operation after a failure.
pub trait EventHandler<E: Event>: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn handle(&self, envelope: &EventEnvelope<E>) -> DomainResult<()>;
}

impl<E, H> EventHandler<E> for Arc<H>
where
    E: Event,
    H: EventHandler<E> + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn handle(&self, envelope: &EventEnvelope<E>) -> DomainResult<()> {
        (**self).handle(envelope)
    }
}
