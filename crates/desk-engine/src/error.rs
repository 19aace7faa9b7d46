//! Error types for the helpdesk engine

use thiserror::Error;

use crate::domain::aggregates::{TicketError, TicketStatus};
use crate::domain::services::RuleBookError;
use crate::domain::value_objects::DomainError;
use crate::ports::outbound::RepositoryError;

/// Engine error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Priority string not recognised, or missing from the SLA table
    #[error("unknown priority: {0}")]
    UnknownPriority(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Lifecycle move not allowed; the ticket is unchanged
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: TicketStatus, to: TicketStatus },

    #[error("ticket not found: {0}")]
    TicketNotFound(String),

    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("rule not found: {0}")]
    RuleNotFound(String),

    /// Duplicate rule id or priority number
    #[error("rule conflict: {0}")]
    RuleConflict(String),

    /// Ticket is already owned, terminal, or closed to comments
    #[error("ticket conflict: {0}")]
    TicketConflict(String),

    /// Malformed identifier, email, budget or condition
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<DomainError> for EngineError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UnknownPriority(p) => Self::UnknownPriority(p),
            DomainError::UnknownStatus(s) => Self::InvalidStatus(s),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

impl From<TicketError> for EngineError {
    fn from(e: TicketError) -> Self {
        match e {
            TicketError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            other => Self::TicketConflict(other.to_string()),
        }
    }
}

impl From<RuleBookError> for EngineError {
    fn from(e: RuleBookError) -> Self {
        match e {
            RuleBookError::NotFound(id) => Self::RuleNotFound(id.to_string()),
            RuleBookError::Invalid(inner) => inner.into(),
            conflict => Self::RuleConflict(conflict.to_string()),
        }
    }
}

/// Result type for the helpdesk engine
pub type Result<T> = std::result::Result<T, EngineError>;
