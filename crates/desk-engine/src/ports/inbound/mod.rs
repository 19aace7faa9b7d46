//! Inbound ports (use case traits)

use crate::application::dto::*;
use crate::domain::aggregates::{Agent, AssignmentRule};
use crate::domain::services::{AgentPerformance, SlaPolicyTable, TicketStats};
use crate::domain::value_objects::{AgentId, RuleId, TicketId};
use crate::Result;

/// Ticket use cases
pub trait TicketUseCases: Send + Sync {
    /// Create, stamp SLA deadlines and route
    fn create_ticket(&self, command: CreateTicketCommand) -> Result<TicketView>;

    fn update_status(&self, command: UpdateStatusCommand) -> Result<TicketView>;

    fn add_comment(&self, command: AddCommentCommand) -> Result<TicketView>;

    /// Hand an unassigned ticket to a named agent
    fn assign_to(&self, ticket_id: TicketId, agent_id: &AgentId) -> Result<TicketView>;

    /// Re-run routing for an unassigned ticket
    fn retry_assignment(&self, ticket_id: TicketId) -> Result<TicketView>;

    fn get_ticket(&self, ticket_id: TicketId) -> Result<TicketView>;

    fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<TicketView>>;

    fn ticket_stats(&self) -> Result<TicketStats>;

    fn agent_performance(&self) -> Result<Vec<AgentPerformance>>;
}

/// Roster, rule and policy administration
pub trait RoutingAdmin: Send + Sync {
    fn register_agent(&self, agent: Agent) -> Result<()>;

    fn set_agent_active(&self, agent_id: &AgentId, active: bool) -> Result<Agent>;

    /// Sorted by id
    fn list_agents(&self) -> Result<Vec<Agent>>;

    fn add_rule(&self, rule: AssignmentRule) -> Result<()>;

    fn set_rule_active(&self, rule_id: &RuleId, active: bool) -> Result<AssignmentRule>;

    /// Evaluation order
    fn list_rules(&self) -> Vec<AssignmentRule>;

    fn sla_policies(&self) -> &SlaPolicyTable;
}
