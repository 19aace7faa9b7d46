//! Agent entity
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::events::{AgentEvent, DomainEvent, EventMetadata};
use crate::domain::value_objects::{AgentId, Email};

#[derive(Clone, Debug, Serialize)]
pub struct Agent {
    id: AgentId,
    name: String,
    email: Option<Email>,
    department: Option<String>,
    specialties: Vec<String>,
    active: bool,
    max_tickets: u32,
    current_tickets: u32,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Agent {
    pub fn new(id: AgentId, name: impl Into<String>, max_tickets: u32) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            department: None,
            specialties: vec![],
            active: true,
            max_tickets,
            current_tickets: 0,
            events: vec![],
        }
    }

    pub fn with_email(mut self, email: Email) -> Self { self.email = Some(email); self }
    pub fn with_department(mut self, department: impl Into<String>) -> Self { self.department = Some(department.into()); self }
    pub fn with_specialties<I, S>(mut self, specialties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specialties = specialties.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_active(mut self, active: bool) -> Self { self.active = active; self }

    /// Seed the open-ticket count when restoring an agent from elsewhere.
    pub fn with_current_tickets(mut self, current_tickets: u32) -> Self { self.current_tickets = current_tickets; self }

    pub fn id(&self) -> &AgentId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn email(&self) -> Option<&Email> { self.email.as_ref() }
    pub fn department(&self) -> Option<&str> { self.department.as_deref() }
    pub fn specialties(&self) -> &[String] { &self.specialties }
    pub fn is_active(&self) -> bool { self.active }
    pub fn max_tickets(&self) -> u32 { self.max_tickets }
    pub fn current_tickets(&self) -> u32 { self.current_tickets }

    pub fn has_specialty(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.specialties.iter().any(|s| s.trim().eq_ignore_ascii_case(tag))
    }

    pub fn can_take_ticket(&self) -> bool { self.active && self.current_tickets < self.max_tickets }

    /// Take one slot if the agent is active and under capacity.
    pub fn reserve_slot(&mut self, at: DateTime<Utc>) -> bool {
        if !self.can_take_ticket() {
            return false;
        }
        self.current_tickets += 1;
        self.events.push(DomainEvent::Agent(AgentEvent::CapacityReserved {
            metadata: EventMetadata::at(at),
            agent_id: self.id.clone(),
            current_tickets: self.current_tickets,
        }));
        true
    }

    pub fn release_slot(&mut self, at: DateTime<Utc>) {
        if self.current_tickets == 0 {
            return;
        }
        self.current_tickets -= 1;
        self.events.push(DomainEvent::Agent(AgentEvent::CapacityReleased {
            metadata: EventMetadata::at(at),
            agent_id: self.id.clone(),
            current_tickets: self.current_tickets,
        }));
    }

    pub fn set_active(&mut self, active: bool, at: DateTime<Utc>) {
        if self.active == active {
            return;
        }
        self.active = active;
        self.events.push(DomainEvent::Agent(AgentEvent::ActivationChanged {
            metadata: EventMetadata::at(at),
            agent_id: self.id.clone(),
            active,
        }));
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(max: u32) -> Agent {
        Agent::new(AgentId::new("agent_3").unwrap(), "Mike Wilson", max)
            .with_department("Billing")
            .with_specialties(["Billing", "Account Issues"])
    }

    #[test]
    fn test_reserve_respects_capacity() {
        let mut a = agent(2);
        let now = Utc::now();
        assert!(a.reserve_slot(now));
        assert!(a.reserve_slot(now));
        assert!(!a.reserve_slot(now));
        assert_eq!(a.current_tickets(), 2);

        a.release_slot(now);
        assert_eq!(a.current_tickets(), 1);
        assert!(a.can_take_ticket());
    }

    #[test]
    fn test_inactive_agent_takes_nothing() {
        let mut a = agent(5);
        a.set_active(false, Utc::now());
        assert!(!a.reserve_slot(Utc::now()));
        assert_eq!(a.current_tickets(), 0);
    }

    #[test]
    fn test_release_never_underflows() {
        let mut a = agent(1);
        a.release_slot(Utc::now());
        assert_eq!(a.current_tickets(), 0);
        assert!(a.take_events().is_empty());
    }

    #[test]
    fn test_specialty_match_ignores_case() {
        let a = agent(1);
        assert!(a.has_specialty("billing"));
        assert!(a.has_specialty("account issues"));
        assert!(!a.has_specialty("Technical Support"));
    }
}
