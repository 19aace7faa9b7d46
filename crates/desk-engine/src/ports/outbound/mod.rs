//! Outbound ports
//!
//! Interfaces the engine depends on. Infrastructure provides the
//! implementations; all calls are synchronous.

use chrono::{DateTime, Utc};

use crate::domain::aggregates::{Agent, Ticket};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::{AgentId, TicketId};

/// Ticket repository port
pub trait TicketRepository: Send + Sync {
    /// Allocate the next sequential ticket id
    fn next_id(&self) -> TicketId;

    fn find_by_id(&self, id: TicketId) -> Result<Option<Ticket>, RepositoryError>;

    /// Insert or replace
    fn save(&self, ticket: &Ticket) -> Result<(), RepositoryError>;

    /// All tickets ordered by id
    fn list(&self) -> Result<Vec<Ticket>, RepositoryError>;
}

/// Agent roster port
///
/// Implementations must make `try_reserve` and `release` mutually exclusive
/// per agent: two concurrent reservations against one free slot must not
/// both succeed.
pub trait AgentDirectory: Send + Sync {
    /// Fails with `Conflict` if the id is taken
    fn insert(&self, agent: Agent) -> Result<(), RepositoryError>;

    fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError>;

    /// Point-in-time copy of every agent, ordered by id
    fn snapshot(&self) -> Result<Vec<Agent>, RepositoryError>;

    /// Take one slot. `Ok(false)` when the agent is inactive or full.
    fn try_reserve(&self, id: &AgentId, at: DateTime<Utc>, events: &mut Vec<DomainEvent>) -> Result<bool, RepositoryError>;

    /// Give one slot back (never below zero)
    fn release(&self, id: &AgentId, at: DateTime<Utc>, events: &mut Vec<DomainEvent>) -> Result<(), RepositoryError>;

    fn set_active(&self, id: &AgentId, active: bool, at: DateTime<Utc>, events: &mut Vec<DomainEvent>) -> Result<Agent, RepositoryError>;
}

/// Event publisher port
pub trait EventPublisher: Send + Sync {
    fn publish(&self, events: Vec<DomainEvent>) -> Result<(), RepositoryError>;
}

/// Time source
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),
}
