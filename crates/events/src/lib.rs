//! Domain events and synchronous in-process delivery.
//!
//! Aggregates react to changes of their children by subscribing to the
//! children's events: a line item being saved or removed is published once,
//! and every subscribed handler runs before `publish` returns.

pub mod dispatcher;
pub mod envelope;
pub mod event;
pub mod handler;

pub use dispatcher::EventDispatcher;
pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::EventHandler;
