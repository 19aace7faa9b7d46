//! Aggregates
pub mod ticket;
pub mod agent;
pub mod rule;
pub use ticket::{Comment, NewTicket, Ticket, TicketError, TicketStatus};
pub use agent::Agent;
pub use rule::{AssignmentRule, Condition, TicketField};
