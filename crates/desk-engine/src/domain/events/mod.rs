//! Helpdesk domain events
//!
//! Raised by aggregates, drained by the engine after each operation and
//! handed to the [`EventPublisher`](crate::ports::outbound::EventPublisher).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::TicketStatus;
use crate::domain::value_objects::{AgentId, Priority, RuleId, TicketId};

/// Envelope carrying the event id and the moment it was recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    pub fn at(occurred_at: DateTime<Utc>) -> Self {
        Self { event_id: Uuid::new_v4(), occurred_at }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum DomainEvent {
    Ticket(TicketEvent),
    Agent(AgentEvent),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TicketEvent {
    Created {
        metadata: EventMetadata,
        ticket_id: TicketId,
        priority: Priority,
        response_due: DateTime<Utc>,
        resolution_due: DateTime<Utc>,
    },
    Assigned {
        metadata: EventMetadata,
        ticket_id: TicketId,
        agent_id: AgentId,
        rule_id: Option<RuleId>,
    },
    /// Routing ran and found nobody; the ticket stays queued.
    Unassigned {
        metadata: EventMetadata,
        ticket_id: TicketId,
    },
    StatusChanged {
        metadata: EventMetadata,
        ticket_id: TicketId,
        from: TicketStatus,
        to: TicketStatus,
    },
    Responded {
        metadata: EventMetadata,
        ticket_id: TicketId,
    },
    Resolved {
        metadata: EventMetadata,
        ticket_id: TicketId,
    },
    Closed {
        metadata: EventMetadata,
        ticket_id: TicketId,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AgentEvent {
    CapacityReserved {
        metadata: EventMetadata,
        agent_id: AgentId,
        current_tickets: u32,
    },
    CapacityReleased {
        metadata: EventMetadata,
        agent_id: AgentId,
        current_tickets: u32,
    },
    ActivationChanged {
        metadata: EventMetadata,
        agent_id: AgentId,
        active: bool,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::Ticket(e) => match e {
                TicketEvent::Created { .. } => "ticket.created",
                TicketEvent::Assigned { .. } => "ticket.assigned",
                TicketEvent::Unassigned { .. } => "ticket.unassigned",
                TicketEvent::StatusChanged { .. } => "ticket.status_changed",
                TicketEvent::Responded { .. } => "ticket.responded",
                TicketEvent::Resolved { .. } => "ticket.resolved",
                TicketEvent::Closed { .. } => "ticket.closed",
            },
            DomainEvent::Agent(e) => match e {
                AgentEvent::CapacityReserved { .. } => "agent.capacity_reserved",
                AgentEvent::CapacityReleased { .. } => "agent.capacity_released",
                AgentEvent::ActivationChanged { .. } => "agent.activation_changed",
            },
        }
    }

    /// Id of the aggregate this event belongs to, as displayed.
    pub fn aggregate_id(&self) -> String {
        match self {
            DomainEvent::Ticket(e) => match e {
                TicketEvent::Created { ticket_id, .. }
                | TicketEvent::Assigned { ticket_id, .. }
                | TicketEvent::Unassigned { ticket_id, .. }
                | TicketEvent::StatusChanged { ticket_id, .. }
                | TicketEvent::Responded { ticket_id, .. }
                | TicketEvent::Resolved { ticket_id, .. }
                | TicketEvent::Closed { ticket_id, .. } => ticket_id.to_string(),
            },
            DomainEvent::Agent(e) => match e {
                AgentEvent::CapacityReserved { agent_id, .. }
                | AgentEvent::CapacityReleased { agent_id, .. }
                | AgentEvent::ActivationChanged { agent_id, .. } => agent_id.to_string(),
            },
        }
    }

    pub fn metadata(&self) -> &EventMetadata {
        match self {
            DomainEvent::Ticket(e) => match e {
                TicketEvent::Created { metadata, .. }
                | TicketEvent::Assigned { metadata, .. }
                | TicketEvent::Unassigned { metadata, .. }
                | TicketEvent::StatusChanged { metadata, .. }
                | TicketEvent::Responded { metadata, .. }
                | TicketEvent::Resolved { metadata, .. }
                | TicketEvent::Closed { metadata, .. } => metadata,
            },
            DomainEvent::Agent(e) => match e {
                AgentEvent::CapacityReserved { metadata, .. }
                | AgentEvent::CapacityReleased { metadata, .. }
                | AgentEvent::ActivationChanged { metadata, .. } => metadata,
            },
        }
    }
}
