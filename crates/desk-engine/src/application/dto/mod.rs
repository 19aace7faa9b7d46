//! Data Transfer Objects
//!
//! Commands carry raw strings as they arrive from a form or the CLI; the
//! engine parses them into value objects. Views carry derived state.

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{Ticket, TicketStatus};
use crate::domain::services::{Assignment, SlaStatus};
use crate::domain::value_objects::{AgentId, Priority};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTicketCommand {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// `low`, `medium`, `high` or `critical`
    pub priority: String,
    pub customer_name: Option<String>,
    pub customer_email: String,
    /// Skip rule routing and hand the ticket to this agent
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusCommand {
    pub ticket_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentCommand {
    pub ticket_id: String,
    pub author_name: String,
    pub author_email: String,
    pub body: String,
    #[serde(default)]
    pub is_internal: bool,
}

/// Ticket list filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Case-insensitive substring of id, title, customer name or email
    pub search: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub agent_id: Option<AgentId>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if self.status.is_some_and(|s| s != ticket.status()) {
            return false;
        }
        if self.priority.is_some_and(|p| p != ticket.priority()) {
            return false;
        }
        if let Some(agent) = &self.agent_id {
            if ticket.assigned_agent() != Some(agent) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                let customer = ticket.customer();
                ticket.id().to_string().to_lowercase().contains(&term)
                    || ticket.title().to_lowercase().contains(&term)
                    || customer.name.as_deref().is_some_and(|n| n.to_lowercase().contains(&term))
                    || customer.email.as_str().contains(&term)
            }
        }
    }
}

/// Ticket as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    /// `TKT-001`
    pub display_id: String,
    #[serde(flatten)]
    pub ticket: Ticket,
    pub sla_status: SlaStatus,
    /// Present when the call that produced this view ran routing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
}

impl TicketView {
    pub fn new(ticket: Ticket, sla_status: SlaStatus) -> Self {
        Self { display_id: ticket.id().to_string(), ticket, sla_status, assignment: None }
    }

    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignment = Some(assignment);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::NewTicket;
    use crate::domain::value_objects::{CustomerContact, Email, SlaBudget, TicketId};
    use chrono::Utc;

    fn ticket() -> Ticket {
        Ticket::create(
            TicketId::new(12),
            NewTicket {
                title: "Login page returns 500".into(),
                description: None,
                category: Some("Bug Report".into()),
                priority: Priority::High,
                customer: CustomerContact::new(Some("Jane Smith".into()), Email::new("Jane@Acme.com").unwrap()),
            },
            SlaBudget::from_hours(2, 8).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn test_search_fields() {
        let t = ticket();
        for term in ["tkt-012", "LOGIN", "jane smith", "acme.com", "  500 "] {
            let f = TicketFilter { search: Some(term.into()), ..Default::default() };
            assert!(f.matches(&t), "{term}");
        }
        let f = TicketFilter { search: Some("invoice".into()), ..Default::default() };
        assert!(!f.matches(&t));
    }

    #[test]
    fn test_structured_filters() {
        let t = ticket();
        assert!(TicketFilter::default().matches(&t));
        assert!(TicketFilter { priority: Some(Priority::High), ..Default::default() }.matches(&t));
        assert!(!TicketFilter { status: Some(TicketStatus::Closed), ..Default::default() }.matches(&t));
        assert!(!TicketFilter { agent_id: Some(AgentId::new("agent_1").unwrap()), ..Default::default() }.matches(&t));
    }

    #[test]
    fn test_view_json_shape() {
        let view = TicketView::new(ticket(), SlaStatus::AtRisk);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["display_id"], "TKT-012");
        assert_eq!(json["sla_status"], "at-risk");
        assert_eq!(json["status"], "new");
        assert!(json.get("assignment").is_none());
    }
}
