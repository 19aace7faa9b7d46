//! Domain services
//!
//! Stateless logic spanning several aggregates.

pub mod matcher;
pub mod resolver;
pub mod sla;
pub mod stats;

pub use matcher::{RuleBook, RuleBookError, RuleMatcher};
pub use resolver::{Assignment, AssignmentResolver, AssignmentSource, Candidate};
pub use sla::{SlaEvaluator, SlaPolicyTable, SlaStatus};
pub use stats::{AgentPerformance, TicketStats};
