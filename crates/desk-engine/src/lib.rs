//! Helpdesk Ticket Routing & SLA Engine
//!
//! Decides who owns a ticket and whether it is on schedule.
//!
//! ## Features
//! - Priority-based SLA deadlines stamped at creation
//! - Ordered assignment rules with capacity-aware fallback routing
//! - Ticket lifecycle state machine with first-response tracking
//! - On-track / at-risk / breached SLA status derived on read
//! - Dashboard statistics and per-agent performance
//!
//! ## Architecture
//!
//! - **Domain Layer**: aggregates (ticket, agent, rule), value objects,
//!   domain events and stateless services (SLA, matching, resolution)
//! - **Application Layer**: [`HelpdeskEngine`] orchestrating the use cases
//! - **Ports Layer**: use case traits and the storage, event and clock seams
//! - **Infrastructure Layer**: in-memory adapters and clocks

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use application::dto::{AddCommentCommand, CreateTicketCommand, TicketFilter, TicketView, UpdateStatusCommand};
pub use application::{HelpdeskEngine, Ports};
pub use config::{AgentConfig, EngineConfig, SlaConfig};
pub use domain::aggregates::{Agent, AssignmentRule, Comment, Condition, Ticket, TicketField, TicketStatus};
pub use domain::events::{AgentEvent, DomainEvent, TicketEvent};
pub use domain::services::{
    AgentPerformance, Assignment, AssignmentSource, RuleBook, SlaEvaluator, SlaPolicyTable, SlaStatus, TicketStats,
};
pub use domain::value_objects::{AgentId, CustomerContact, Email, Priority, RuleId, SlaBudget, TicketId};
pub use error::{EngineError, Result};
pub use ports::inbound::{RoutingAdmin, TicketUseCases};
pub use ports::outbound::{AgentDirectory, Clock, EventPublisher, RepositoryError, TicketRepository};
