//! In-memory adapters
//!
//! Backing store for the CLI and tests. Tickets live in a `DashMap`; agents
//! sit behind their own `Mutex` so capacity checks on one agent never block
//! another.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::domain::aggregates::{Agent, Ticket};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::{AgentId, TicketId};
use crate::ports::outbound::{AgentDirectory, EventPublisher, RepositoryError, TicketRepository};

#[derive(Default)]
pub struct InMemoryTicketRepository {
    tickets: DashMap<TicketId, Ticket>,
    sequence: AtomicU64,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TicketRepository for InMemoryTicketRepository {
    fn next_id(&self) -> TicketId {
        TicketId::new(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn find_by_id(&self, id: TicketId) -> Result<Option<Ticket>, RepositoryError> {
        Ok(self.tickets.get(&id).map(|t| t.value().clone()))
    }

    fn save(&self, ticket: &Ticket) -> Result<(), RepositoryError> {
        self.tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Ticket>, RepositoryError> {
        let mut tickets: Vec<Ticket> = self.tickets.iter().map(|t| t.value().clone()).collect();
        tickets.sort_by_key(|t| t.id());
        Ok(tickets)
    }
}

#[derive(Default)]
pub struct InMemoryAgentDirectory {
    agents: DashMap<AgentId, Arc<Mutex<Agent>>>,
}

impl InMemoryAgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the handle out so the map shard is released before locking.
    fn handle(&self, id: &AgentId) -> Result<Arc<Mutex<Agent>>, RepositoryError> {
        self.agents
            .get(id)
            .map(|a| Arc::clone(a.value()))
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}

impl AgentDirectory for InMemoryAgentDirectory {
    fn insert(&self, agent: Agent) -> Result<(), RepositoryError> {
        match self.agents.entry(agent.id().clone()) {
            dashmap::mapref::entry::Entry::Occupied(e) => Err(RepositoryError::Conflict(format!("agent {} already registered", e.key()))),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(Arc::new(Mutex::new(agent)));
                Ok(())
            }
        }
    }

    fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        match self.handle(id) {
            Ok(agent) => Ok(Some(agent.lock().clone())),
            Err(RepositoryError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn snapshot(&self) -> Result<Vec<Agent>, RepositoryError> {
        let handles: Vec<Arc<Mutex<Agent>>> = self.agents.iter().map(|a| Arc::clone(a.value())).collect();
        let mut agents: Vec<Agent> = handles.iter().map(|a| a.lock().clone()).collect();
        agents.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(agents)
    }

    fn try_reserve(&self, id: &AgentId, at: DateTime<Utc>, events: &mut Vec<DomainEvent>) -> Result<bool, RepositoryError> {
        let handle = self.handle(id)?;
        let mut agent = handle.lock();
        let reserved = agent.reserve_slot(at);
        events.extend(agent.take_events());
        Ok(reserved)
    }

    fn release(&self, id: &AgentId, at: DateTime<Utc>, events: &mut Vec<DomainEvent>) -> Result<(), RepositoryError> {
        let handle = self.handle(id)?;
        let mut agent = handle.lock();
        agent.release_slot(at);
        events.extend(agent.take_events());
        Ok(())
    }

    fn set_active(&self, id: &AgentId, active: bool, at: DateTime<Utc>, events: &mut Vec<DomainEvent>) -> Result<Agent, RepositoryError> {
        let handle = self.handle(id)?;
        let mut agent = handle.lock();
        agent.set_active(active, at);
        events.extend(agent.take_events());
        Ok(agent.clone())
    }
}

/// Keeps every published event; handy for assertions and replay.
#[derive(Default)]
pub struct InMemoryEventLog {
    events: Mutex<Vec<DomainEvent>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(DomainEvent::event_type).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventPublisher for InMemoryEventLog {
    fn publish(&self, events: Vec<DomainEvent>) -> Result<(), RepositoryError> {
        self.events.lock().extend(events);
        Ok(())
    }
}

/// Writes each event to the `tracing` log at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, events: Vec<DomainEvent>) -> Result<(), RepositoryError> {
        for event in &events {
            tracing::debug!(
                event_type = event.event_type(),
                aggregate = %event.aggregate_id(),
                event_id = %event.metadata().event_id,
                "domain event"
            );
        }
        Ok(())
    }
}
