//! Ticket Aggregate
//!
//! Owns the lifecycle state machine:
//!
//! ```text
//! new → in_progress ⇄ pending
//!           │
//!           ▼
//!       resolved → closed
//! ```
//!
//! SLA due timestamps are stamped once in [`Ticket::create`] and never touched again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::events::{DomainEvent, EventMetadata, TicketEvent};
use crate::domain::value_objects::{AgentId, CustomerContact, DomainError, Email, Priority, RuleId, SlaBudget, TicketId};

#[derive(Clone, Debug, Serialize)]
pub struct Ticket {
    id: TicketId,
    title: String,
    description: Option<String>,
    category: Option<String>,
    priority: Priority,
    status: TicketStatus,
    customer: CustomerContact,
    assigned_agent: Option<AgentId>,
    comments: Vec<Comment>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    sla_response_due: DateTime<Utc>,
    sla_resolution_due: DateTime<Utc>,
    first_response_at: Option<DateTime<Utc>>,
    resolved_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_name: String,
    pub author_email: Email,
    pub body: String,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    New,
    InProgress,
    Pending,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 5] = [
        TicketStatus::New,
        TicketStatus::InProgress,
        TicketStatus::Pending,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Resolved and closed tickets accept no further work.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    /// Legal edges of the lifecycle graph.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::InProgress)
                | (Self::InProgress, Self::Pending)
                | (Self::InProgress, Self::Resolved)
                | (Self::Pending, Self::InProgress)
                | (Self::Resolved, Self::Closed)
        )
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for TicketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "pending" => Ok(Self::Pending),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(DomainError::UnknownStatus(s.to_string())),
        }
    }
}

/// Fields captured by the creation form.
#[derive(Clone, Debug)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Priority,
    pub customer: CustomerContact,
}

impl Ticket {
    pub fn create(id: TicketId, new: NewTicket, budget: SlaBudget, created_at: DateTime<Utc>) -> Self {
        let sla_response_due = created_at + budget.response();
        let sla_resolution_due = created_at + budget.resolution();
        let category = new.category.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());

        let mut t = Self {
            id,
            title: new.title,
            description: new.description,
            category,
            priority: new.priority,
            status: TicketStatus::New,
            customer: new.customer,
            assigned_agent: None,
            comments: vec![],
            created_at,
            updated_at: created_at,
            sla_response_due,
            sla_resolution_due,
            first_response_at: None,
            resolved_at: None,
            closed_at: None,
            events: vec![],
        };
        t.raise_event(DomainEvent::Ticket(TicketEvent::Created {
            metadata: EventMetadata::at(created_at),
            ticket_id: id,
            priority: t.priority,
            response_due: sla_response_due,
            resolution_due: sla_resolution_due,
        }));
        t
    }

    pub fn id(&self) -> TicketId { self.id }
    pub fn title(&self) -> &str { &self.title }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn category(&self) -> Option<&str> { self.category.as_deref() }
    pub fn priority(&self) -> Priority { self.priority }
    pub fn status(&self) -> TicketStatus { self.status }
    pub fn customer(&self) -> &CustomerContact { &self.customer }
    pub fn assigned_agent(&self) -> Option<&AgentId> { self.assigned_agent.as_ref() }
    pub fn comments(&self) -> &[Comment] { &self.comments }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn sla_response_due(&self) -> DateTime<Utc> { self.sla_response_due }
    pub fn sla_resolution_due(&self) -> DateTime<Utc> { self.sla_resolution_due }
    pub fn first_response_at(&self) -> Option<DateTime<Utc>> { self.first_response_at }
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> { self.resolved_at }
    pub fn closed_at(&self) -> Option<DateTime<Utc>> { self.closed_at }

    /// Unassigned tickets that can still be routed.
    pub fn awaiting_assignment(&self) -> bool {
        self.assigned_agent.is_none() && !self.status.is_terminal()
    }

    pub fn assign(&mut self, agent_id: AgentId, rule_id: Option<RuleId>, at: DateTime<Utc>) -> Result<(), TicketError> {
        if let Some(current) = &self.assigned_agent {
            return Err(TicketError::AlreadyAssigned(current.clone()));
        }
        if self.status.is_terminal() {
            return Err(TicketError::NotAssignable(self.status));
        }

        self.assigned_agent = Some(agent_id.clone());
        self.touch(at);
        self.raise_event(DomainEvent::Ticket(TicketEvent::Assigned {
            metadata: EventMetadata::at(at),
            ticket_id: self.id,
            agent_id,
            rule_id,
        }));
        Ok(())
    }

    /// Record that routing ran without finding an owner.
    pub fn mark_unassigned(&mut self, at: DateTime<Utc>) {
        self.raise_event(DomainEvent::Ticket(TicketEvent::Unassigned {
            metadata: EventMetadata::at(at),
            ticket_id: self.id,
        }));
    }

    /// Move along the lifecycle. On error the ticket is left untouched.
    pub fn transition(&mut self, to: TicketStatus, at: DateTime<Utc>) -> Result<(), TicketError> {
        let from = self.status;
        if !from.can_transition_to(to) {
            return Err(TicketError::InvalidTransition { from, to });
        }

        self.status = to;
        match to {
            TicketStatus::InProgress if from == TicketStatus::New => self.record_response(at),
            TicketStatus::Resolved => self.resolved_at = Some(at),
            TicketStatus::Closed => self.closed_at = Some(at),
            _ => {}
        }
        self.touch(at);

        self.raise_event(DomainEvent::Ticket(TicketEvent::StatusChanged {
            metadata: EventMetadata::at(at),
            ticket_id: self.id,
            from,
            to,
        }));
        match to {
            TicketStatus::Resolved => self.raise_event(DomainEvent::Ticket(TicketEvent::Resolved {
                metadata: EventMetadata::at(at),
                ticket_id: self.id,
            })),
            TicketStatus::Closed => self.raise_event(DomainEvent::Ticket(TicketEvent::Closed {
                metadata: EventMetadata::at(at),
                ticket_id: self.id,
            })),
            _ => {}
        }
        Ok(())
    }

    /// A public reply from anyone but the customer counts as the first response.
    pub fn add_comment(
        &mut self,
        author_name: impl Into<String>,
        author_email: Email,
        body: impl Into<String>,
        is_internal: bool,
        at: DateTime<Utc>,
    ) -> Result<Uuid, TicketError> {
        if self.status == TicketStatus::Closed {
            return Err(TicketError::Closed(self.id));
        }

        let responds = !is_internal && author_email != self.customer.email;
        let comment = Comment {
            id: Uuid::new_v4(),
            author_name: author_name.into(),
            author_email,
            body: body.into(),
            is_internal,
            created_at: at,
        };
        let id = comment.id;
        self.comments.push(comment);
        if responds {
            self.record_response(at);
        }
        self.touch(at);
        Ok(id)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn record_response(&mut self, at: DateTime<Utc>) {
        if self.first_response_at.is_some() {
            return;
        }
        self.first_response_at = Some(at);
        self.raise_event(DomainEvent::Ticket(TicketEvent::Responded {
            metadata: EventMetadata::at(at),
            ticket_id: self.id,
        }));
    }

    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self, at: DateTime<Utc>) { self.updated_at = at; }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: TicketStatus, to: TicketStatus },

    #[error("ticket already assigned to {0}")]
    AlreadyAssigned(AgentId),

    #[error("ticket is {0}")]
    NotAssignable(TicketStatus),

    #[error("{0} is closed")]
    Closed(TicketId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    }

    fn new_ticket(priority: Priority) -> Ticket {
        let customer = CustomerContact::new(Some("Jane Doe".into()), Email::new("jane@acme.com").unwrap());
        Ticket::create(
            TicketId::new(1),
            NewTicket {
                title: "Login page not loading".into(),
                description: None,
                category: Some(" Technical Support ".into()),
                priority,
                customer,
            },
            SlaBudget::from_hours(1, 4).unwrap(),
            t0(),
        )
    }

    #[test]
    fn test_create_stamps_sla_deadlines() {
        let t = new_ticket(Priority::Critical);
        assert_eq!(t.status(), TicketStatus::New);
        assert_eq!(t.sla_response_due(), t0() + Duration::hours(1));
        assert_eq!(t.sla_resolution_due(), t0() + Duration::hours(4));
        assert_eq!(t.category(), Some("Technical Support"));
    }

    #[test]
    fn test_ticket_workflow() {
        let mut t = new_ticket(Priority::High);
        t.assign(AgentId::new("agent_1").unwrap(), None, t0()).unwrap();
        t.transition(TicketStatus::InProgress, t0() + Duration::minutes(10)).unwrap();
        assert_eq!(t.first_response_at(), Some(t0() + Duration::minutes(10)));
        t.transition(TicketStatus::Pending, t0() + Duration::minutes(20)).unwrap();
        t.transition(TicketStatus::InProgress, t0() + Duration::minutes(30)).unwrap();
        t.transition(TicketStatus::Resolved, t0() + Duration::hours(2)).unwrap();
        assert_eq!(t.resolved_at(), Some(t0() + Duration::hours(2)));
        t.transition(TicketStatus::Closed, t0() + Duration::hours(3)).unwrap();
        assert_eq!(t.closed_at(), Some(t0() + Duration::hours(3)));

        // deadlines never move
        assert_eq!(t.sla_response_due(), t0() + Duration::hours(1));
        assert_eq!(t.sla_resolution_due(), t0() + Duration::hours(4));
    }

    #[test]
    fn test_illegal_transitions_leave_ticket_unchanged() {
        let mut t = new_ticket(Priority::Low);
        let err = t.transition(TicketStatus::Closed, t0()).unwrap_err();
        assert_eq!(err, TicketError::InvalidTransition { from: TicketStatus::New, to: TicketStatus::Closed });
        assert_eq!(t.status(), TicketStatus::New);
        assert!(t.closed_at().is_none());

        assert!(t.transition(TicketStatus::Resolved, t0()).is_err());
        assert!(t.transition(TicketStatus::New, t0()).is_err());
    }

    #[test]
    fn test_transition_table() {
        use TicketStatus::*;
        for from in TicketStatus::ALL {
            for to in TicketStatus::ALL {
                let allowed = matches!(
                    (from, to),
                    (New, InProgress) | (InProgress, Pending) | (InProgress, Resolved) | (Pending, InProgress) | (Resolved, Closed)
                );
                assert_eq!(from.can_transition_to(to), allowed, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_customer_comment_is_not_a_response() {
        let mut t = new_ticket(Priority::Medium);
        t.add_comment("Jane", Email::new("jane@acme.com").unwrap(), "any update?", false, t0()).unwrap();
        assert!(t.first_response_at().is_none());

        t.add_comment("John", Email::new("john@support.io").unwrap(), "note", true, t0()).unwrap();
        assert!(t.first_response_at().is_none());

        let at = t0() + Duration::minutes(5);
        t.add_comment("John", Email::new("john@support.io").unwrap(), "looking", false, at).unwrap();
        assert_eq!(t.first_response_at(), Some(at));
        assert_eq!(t.comments().len(), 3);
    }

    #[test]
    fn test_closed_ticket_takes_no_comments() {
        let mut t = new_ticket(Priority::Medium);
        for to in [TicketStatus::InProgress, TicketStatus::Resolved] {
            t.transition(to, t0()).unwrap();
        }
        t.add_comment("Jane", Email::new("jane@acme.com").unwrap(), "thanks", false, t0()).unwrap();

        t.transition(TicketStatus::Closed, t0()).unwrap();
        let err = t.add_comment("Jane", Email::new("jane@acme.com").unwrap(), "one more", false, t0());
        assert_eq!(err, Err(TicketError::Closed(TicketId::new(1))));
        assert_eq!(t.comments().len(), 1);
    }

    #[test]
    fn test_double_assignment_rejected() {
        let mut t = new_ticket(Priority::Medium);
        t.assign(AgentId::new("agent_1").unwrap(), None, t0()).unwrap();
        assert!(matches!(
            t.assign(AgentId::new("agent_2").unwrap(), None, t0()),
            Err(TicketError::AlreadyAssigned(_))
        ));
    }

    #[test]
    fn test_events_recorded() {
        let mut t = new_ticket(Priority::Medium);
        t.transition(TicketStatus::InProgress, t0()).unwrap();
        let types: Vec<_> = t.take_events().iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["ticket.created", "ticket.responded", "ticket.status_changed"]);
        assert!(t.take_events().is_empty());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("in-progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert_eq!("RESOLVED".parse::<TicketStatus>().unwrap(), TicketStatus::Resolved);
        assert!("reopened".parse::<TicketStatus>().is_err());
    }
}
