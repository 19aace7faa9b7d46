//! Infrastructure adapters

pub mod clock;
pub mod persistence;

pub use clock::{ManualClock, SystemClock};
pub use persistence::{InMemoryAgentDirectory, InMemoryEventLog, InMemoryTicketRepository, TracingEventPublisher};
