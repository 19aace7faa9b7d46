//! Helpdesk value objects
//!
//! Immutable, self-validating primitives shared by the aggregates.

mod email;
mod sla_budget;

pub use email::{CustomerContact, Email};
pub use sla_budget::SlaBudget;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sequential ticket number, displayed as `TKT-001`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TicketId(u64);

impl TicketId {
    pub fn new(id: u64) -> Self { Self(id) }
    pub fn value(&self) -> u64 { self.0 }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "TKT-{:03}", self.0) }
}

impl FromStr for TicketId {
    type Err = DomainError;

    /// Accepts both `TKT-007` and the bare number `7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("TKT-")
            .or_else(|| trimmed.strip_prefix("tkt-"))
            .unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| DomainError::InvalidIdentifier(format!("ticket id '{}'", s)))
    }
}

/// Agent identifier (Value Object)
///
/// # Invariants
/// - Non-empty
/// - Max 64 characters
/// - Alphanumeric with hyphens or underscores
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        validate_slug("agent id", id.into()).map(Self)
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for AgentId {
    type Error = DomainError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<AgentId> for String {
    fn from(id: AgentId) -> Self { id.0 }
}

/// Assignment rule identifier
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        validate_slug("rule id", id.into()).map(Self)
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for RuleId {
    type Error = DomainError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<RuleId> for String {
    fn from(id: RuleId) -> Self { id.0 }
}

fn validate_slug(kind: &str, id: String) -> Result<String, DomainError> {
    if id.is_empty() {
        return Err(DomainError::InvalidIdentifier(format!("{} cannot be empty", kind)));
    }
    if id.len() > 64 {
        return Err(DomainError::InvalidIdentifier(format!("{} max 64 characters", kind)));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(DomainError::InvalidIdentifier(format!("{} '{}' must be alphanumeric", kind, id)));
    }
    Ok(id)
}

/// Ticket priority, lowest to highest urgency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(DomainError::UnknownPriority(s.to_string())),
        }
    }
}

/// Domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("unknown priority: {0}")]
    UnknownPriority(String),

    #[error("unknown status: {0}")]
    UnknownStatus(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("invalid SLA budget: {0}")]
    InvalidBudget(String),

    #[error("invalid condition: {0}")]
    InvalidCondition(String),
}
