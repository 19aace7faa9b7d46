//! Command handlers
//!
//! [`HelpdeskEngine`] orchestrates the use cases. Every mutation of a ticket
//! runs under that ticket's own lock; capacity is reserved through the
//! [`AgentDirectory`] before the ticket records its owner, and handed back
//! if the ticket cannot be saved.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::application::dto::*;
use crate::config::EngineConfig;
use crate::domain::aggregates::{Agent, AssignmentRule, NewTicket, Ticket, TicketError, TicketStatus};
use crate::domain::events::DomainEvent;
use crate::domain::services::{
    AgentPerformance, Assignment, AssignmentResolver, AssignmentSource, RuleBook, SlaEvaluator, SlaPolicyTable,
    SlaStatus, TicketStats,
};
use crate::domain::value_objects::{AgentId, CustomerContact, Email, Priority, RuleId, TicketId};
use crate::infrastructure::{InMemoryAgentDirectory, InMemoryTicketRepository, SystemClock, TracingEventPublisher};
use crate::ports::inbound::{RoutingAdmin, TicketUseCases};
use crate::ports::outbound::{AgentDirectory, Clock, EventPublisher, RepositoryError, TicketRepository};
use crate::{EngineError, Result};

/// Outbound adapters the engine runs against.
pub struct Ports {
    pub tickets: Arc<dyn TicketRepository>,
    pub agents: Arc<dyn AgentDirectory>,
    pub events: Arc<dyn EventPublisher>,
    pub clock: Arc<dyn Clock>,
}

impl Ports {
    /// In-memory stores, `tracing` event sink, wall clock.
    pub fn in_memory() -> Self {
        Self {
            tickets: Arc::new(InMemoryTicketRepository::new()),
            agents: Arc::new(InMemoryAgentDirectory::new()),
            events: Arc::new(TracingEventPublisher),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = events;
        self
    }
}

/// Helpdesk application service
pub struct HelpdeskEngine {
    sla: SlaPolicyTable,
    evaluator: SlaEvaluator,
    auto_assignment: AtomicBool,
    rules: RwLock<RuleBook>,
    ports: Ports,
    ticket_locks: DashMap<TicketId, Arc<Mutex<()>>>,
}

impl HelpdeskEngine {
    /// Build the engine and seed roster and rules from `config`.
    pub fn new(config: &EngineConfig, ports: Ports) -> Result<Self> {
        config.validate()?;
        let engine = Self {
            sla: config.sla_table(),
            evaluator: config.evaluator()?,
            auto_assignment: AtomicBool::new(config.auto_assignment),
            rules: RwLock::new(RuleBook::new()),
            ports,
            ticket_locks: DashMap::new(),
        };

        for agent in &config.agents {
            engine.register_agent(agent.to_agent())?;
        }
        for rule in &config.rules {
            engine.add_rule(rule.clone())?;
        }

        tracing::info!(
            agents = config.agents.len(),
            rules = config.rules.len(),
            auto_assignment = config.auto_assignment,
            "helpdesk engine ready"
        );
        Ok(engine)
    }

    pub fn in_memory(config: &EngineConfig) -> Result<Self> {
        Self::new(config, Ports::in_memory())
    }

    pub fn auto_assignment(&self) -> bool {
        self.auto_assignment.load(Ordering::SeqCst)
    }

    pub fn set_auto_assignment(&self, enabled: bool) {
        self.auto_assignment.store(enabled, Ordering::SeqCst);
        tracing::info!(enabled, "auto-assignment toggled");
    }

    pub fn evaluator(&self) -> &SlaEvaluator {
        &self.evaluator
    }

    pub fn sla_status(&self, ticket: &Ticket) -> SlaStatus {
        self.evaluator.evaluate(ticket, self.ports.clock.now())
    }

    fn view(&self, ticket: Ticket, now: DateTime<Utc>) -> TicketView {
        let status = self.evaluator.evaluate(&ticket, now);
        TicketView::new(ticket, status)
    }

    fn ticket_lock(&self, id: TicketId) -> Arc<Mutex<()>> {
        Arc::clone(self.ticket_locks.entry(id).or_default().value())
    }

    fn load(&self, id: TicketId) -> Result<Ticket> {
        self.ports
            .tickets
            .find_by_id(id)?
            .ok_or_else(|| EngineError::TicketNotFound(id.to_string()))
    }

    fn require_agent(&self, id: &AgentId) -> Result<Agent> {
        self.ports
            .agents
            .find_by_id(id)?
            .ok_or_else(|| EngineError::AgentNotFound(id.to_string()))
    }

    fn ensure_assignable(ticket: &Ticket) -> Result<()> {
        if let Some(agent) = ticket.assigned_agent() {
            return Err(TicketError::AlreadyAssigned(agent.clone()).into());
        }
        if ticket.status().is_terminal() {
            return Err(TicketError::NotAssignable(ticket.status()).into());
        }
        Ok(())
    }

    /// Reserve a slot on `agent_id` and record it on the ticket.
    ///
    /// `Ok(false)` when the agent is inactive or full.
    fn claim(
        &self,
        ticket: &mut Ticket,
        agent_id: &AgentId,
        source: &AssignmentSource,
        now: DateTime<Utc>,
        events: &mut Vec<DomainEvent>,
    ) -> Result<bool> {
        let reserved = match self.ports.agents.try_reserve(agent_id, now, events) {
            Ok(reserved) => reserved,
            Err(RepositoryError::NotFound(_)) => return Err(EngineError::AgentNotFound(agent_id.to_string())),
            Err(e) => return Err(e.into()),
        };
        if !reserved {
            return Ok(false);
        }

        if let Err(e) = ticket.assign(agent_id.clone(), source.rule_id().cloned(), now) {
            self.ports.agents.release(agent_id, now, events)?;
            return Err(e.into());
        }
        Ok(true)
    }

    /// Match rules, then walk the candidates until a reservation sticks.
    fn route(&self, ticket: &mut Ticket, now: DateTime<Utc>, events: &mut Vec<DomainEvent>) -> Result<Assignment> {
        let rule = self.rules.read().find_match(ticket).cloned();
        let agents = self.ports.agents.snapshot()?;

        for candidate in AssignmentResolver::candidates(ticket, rule.as_ref(), &agents) {
            match self.claim(ticket, &candidate.agent_id, &candidate.source, now, events) {
                Ok(true) => {
                    tracing::info!(ticket = %ticket.id(), agent = %candidate.agent_id, source = ?candidate.source, "ticket assigned");
                    return Ok(Assignment::Assigned { agent_id: candidate.agent_id, source: candidate.source });
                }
                Ok(false) => {
                    tracing::debug!(ticket = %ticket.id(), agent = %candidate.agent_id, "candidate filled up, trying next");
                }
                Err(EngineError::AgentNotFound(agent)) => {
                    tracing::debug!(ticket = %ticket.id(), agent = %agent, "candidate left the roster");
                }
                Err(e) => return Err(e),
            }
        }

        ticket.mark_unassigned(now);
        tracing::warn!(
            ticket = %ticket.id(),
            category = ticket.category().unwrap_or("-"),
            rule = ?rule.as_ref().map(|r| r.id.as_str()),
            "no agent available, ticket left unassigned"
        );
        Ok(Assignment::Unassigned)
    }

    fn assign_manually(
        &self,
        ticket: &mut Ticket,
        agent_id: &AgentId,
        now: DateTime<Utc>,
        events: &mut Vec<DomainEvent>,
    ) -> Result<Assignment> {
        if self.claim(ticket, agent_id, &AssignmentSource::Manual, now, events)? {
            tracing::info!(ticket = %ticket.id(), agent = %agent_id, "ticket assigned manually");
            return Ok(Assignment::Assigned { agent_id: agent_id.clone(), source: AssignmentSource::Manual });
        }

        ticket.mark_unassigned(now);
        tracing::warn!(ticket = %ticket.id(), agent = %agent_id, "agent unavailable, ticket left unassigned");
        Ok(Assignment::Unassigned)
    }

    /// Persist, giving back any slot reserved for this ticket if the save fails.
    fn save_or_release(
        &self,
        ticket: &Ticket,
        assignment: &Assignment,
        now: DateTime<Utc>,
        events: &mut Vec<DomainEvent>,
    ) -> Result<()> {
        if let Err(e) = self.ports.tickets.save(ticket) {
            if let Some(agent_id) = assignment.agent_id() {
                self.ports.agents.release(agent_id, now, events)?;
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Ticket events first, then the agent events raised alongside them.
    /// Must run before the save so the stored copy carries none.
    fn drain(ticket: &mut Ticket, agent_events: Vec<DomainEvent>) -> Vec<DomainEvent> {
        let mut events = ticket.take_events();
        events.extend(agent_events);
        events
    }

    fn publish(&self, ticket_id: TicketId, events: Vec<DomainEvent>) {
        if events.is_empty() {
            return;
        }
        if let Err(e) = self.ports.events.publish(events) {
            tracing::warn!(ticket = %ticket_id, error = %e, "failed to publish domain events");
        }
    }
}

impl TicketUseCases for HelpdeskEngine {
    fn create_ticket(&self, command: CreateTicketCommand) -> Result<TicketView> {
        let priority: Priority = command.priority.parse()?;
        let email = Email::new(command.customer_email)?;
        let title = command.title.trim();
        if title.is_empty() {
            return Err(EngineError::InvalidInput("title cannot be empty".into()));
        }
        let manual = command.agent_id.map(AgentId::new).transpose()?;
        if let Some(agent_id) = &manual {
            self.require_agent(agent_id)?;
        }
        let budget = self.sla.lookup(priority)?;

        let now = self.ports.clock.now();
        let id = self.ports.tickets.next_id();
        let customer_name = command.customer_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let mut ticket = Ticket::create(
            id,
            NewTicket {
                title: title.to_string(),
                description: command.description,
                category: command.category,
                priority,
                customer: CustomerContact::new(customer_name, email),
            },
            budget,
            now,
        );

        let lock = self.ticket_lock(id);
        let _guard = lock.lock();

        let mut events = Vec::new();
        let assignment = match &manual {
            Some(agent_id) => self.assign_manually(&mut ticket, agent_id, now, &mut events)?,
            None if self.auto_assignment() => self.route(&mut ticket, now, &mut events)?,
            None => {
                ticket.mark_unassigned(now);
                tracing::debug!(ticket = %id, "auto-assignment off, ticket queued");
                Assignment::Unassigned
            }
        };
        let mut events = Self::drain(&mut ticket, events);
        self.save_or_release(&ticket, &assignment, now, &mut events)?;

        tracing::info!(
            ticket = %id,
            priority = %priority,
            response_due = %ticket.sla_response_due(),
            resolution_due = %ticket.sla_resolution_due(),
            "ticket created"
        );
        self.publish(id, events);
        Ok(self.view(ticket, now).with_assignment(assignment))
    }

    fn update_status(&self, command: UpdateStatusCommand) -> Result<TicketView> {
        let id: TicketId = command.ticket_id.parse()?;
        let to: TicketStatus = command.status.parse()?;

        let lock = self.ticket_lock(id);
        let _guard = lock.lock();

        let mut ticket = self.load(id)?;
        let now = self.ports.clock.now();
        let from = ticket.status();
        ticket.transition(to, now)?;
        let mut events = ticket.take_events();
        self.ports.tickets.save(&ticket)?;

        if to == TicketStatus::Resolved {
            if let Some(agent_id) = ticket.assigned_agent() {
                if let Err(e) = self.ports.agents.release(agent_id, now, &mut events) {
                    tracing::warn!(ticket = %id, agent = %agent_id, error = %e, "could not release agent slot");
                }
            }
        }

        if to == TicketStatus::Closed {
            // closed is final
            self.ticket_locks.remove(&id);
        }

        tracing::info!(ticket = %id, from = %from, to = %to, "ticket status changed");
        self.publish(id, events);
        Ok(self.view(ticket, now))
    }

    fn add_comment(&self, command: AddCommentCommand) -> Result<TicketView> {
        let id: TicketId = command.ticket_id.parse()?;
        let author_email = Email::new(command.author_email)?;
        if command.body.trim().is_empty() {
            return Err(EngineError::InvalidInput("comment body cannot be empty".into()));
        }

        let lock = self.ticket_lock(id);
        let _guard = lock.lock();

        let mut ticket = self.load(id)?;
        let now = self.ports.clock.now();
        ticket.add_comment(command.author_name, author_email, command.body, command.is_internal, now)?;
        let events = ticket.take_events();
        self.ports.tickets.save(&ticket)?;

        tracing::debug!(ticket = %id, internal = command.is_internal, "comment added");
        self.publish(id, events);
        Ok(self.view(ticket, now))
    }

    fn assign_to(&self, ticket_id: TicketId, agent_id: &AgentId) -> Result<TicketView> {
        self.require_agent(agent_id)?;

        let lock = self.ticket_lock(ticket_id);
        let _guard = lock.lock();

        let mut ticket = self.load(ticket_id)?;
        Self::ensure_assignable(&ticket)?;

        let now = self.ports.clock.now();
        let mut events = Vec::new();
        let assignment = self.assign_manually(&mut ticket, agent_id, now, &mut events)?;
        let mut events = Self::drain(&mut ticket, events);
        self.save_or_release(&ticket, &assignment, now, &mut events)?;

        self.publish(ticket_id, events);
        Ok(self.view(ticket, now).with_assignment(assignment))
    }

    fn retry_assignment(&self, ticket_id: TicketId) -> Result<TicketView> {
        let lock = self.ticket_lock(ticket_id);
        let _guard = lock.lock();

        let mut ticket = self.load(ticket_id)?;
        Self::ensure_assignable(&ticket)?;

        let now = self.ports.clock.now();
        let mut events = Vec::new();
        let assignment = self.route(&mut ticket, now, &mut events)?;
        let mut events = Self::drain(&mut ticket, events);
        self.save_or_release(&ticket, &assignment, now, &mut events)?;

        self.publish(ticket_id, events);
        Ok(self.view(ticket, now).with_assignment(assignment))
    }

    fn get_ticket(&self, ticket_id: TicketId) -> Result<TicketView> {
        let ticket = self.load(ticket_id)?;
        Ok(self.view(ticket, self.ports.clock.now()))
    }

    fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<TicketView>> {
        let now = self.ports.clock.now();
        Ok(self
            .ports
            .tickets
            .list()?
            .into_iter()
            .filter(|t| filter.matches(t))
            .map(|t| self.view(t, now))
            .collect())
    }

    fn ticket_stats(&self) -> Result<TicketStats> {
        let tickets = self.ports.tickets.list()?;
        Ok(TicketStats::collect(&tickets, &self.evaluator, self.ports.clock.now()))
    }

    fn agent_performance(&self) -> Result<Vec<AgentPerformance>> {
        let now = self.ports.clock.now();
        let tickets = self.ports.tickets.list()?;
        Ok(self
            .ports
            .agents
            .snapshot()?
            .iter()
            .map(|a| AgentPerformance::collect(a, &tickets, &self.evaluator, now))
            .collect())
    }
}

impl RoutingAdmin for HelpdeskEngine {
    fn register_agent(&self, agent: Agent) -> Result<()> {
        let id = agent.id().clone();
        self.ports.agents.insert(agent)?;
        tracing::info!(agent = %id, "agent registered");
        Ok(())
    }

    fn set_agent_active(&self, agent_id: &AgentId, active: bool) -> Result<Agent> {
        let mut events = Vec::new();
        let agent = match self.ports.agents.set_active(agent_id, active, self.ports.clock.now(), &mut events) {
            Ok(agent) => agent,
            Err(RepositoryError::NotFound(_)) => return Err(EngineError::AgentNotFound(agent_id.to_string())),
            Err(e) => return Err(e.into()),
        };
        if !events.is_empty() {
            if let Err(e) = self.ports.events.publish(events) {
                tracing::warn!(agent = %agent_id, error = %e, "failed to publish domain events");
            }
        }
        tracing::info!(agent = %agent_id, active, "agent availability changed");
        Ok(agent)
    }

    fn list_agents(&self) -> Result<Vec<Agent>> {
        Ok(self.ports.agents.snapshot()?)
    }

    fn add_rule(&self, rule: AssignmentRule) -> Result<()> {
        if self.ports.agents.find_by_id(&rule.agent_id)?.is_none() {
            tracing::warn!(rule = %rule.id, agent = %rule.agent_id, "rule targets an agent that is not on the roster");
        }
        let id = rule.id.clone();
        let priority = rule.priority;
        self.rules.write().add(rule)?;
        tracing::info!(rule = %id, priority, "assignment rule added");
        Ok(())
    }

    fn set_rule_active(&self, rule_id: &RuleId, active: bool) -> Result<AssignmentRule> {
        let rule = self.rules.write().set_active(rule_id, active)?.clone();
        tracing::info!(rule = %rule_id, active, "assignment rule toggled");
        Ok(rule)
    }

    fn list_rules(&self) -> Vec<AssignmentRule> {
        self.rules.read().rules().to_vec()
    }

    fn sla_policies(&self) -> &SlaPolicyTable {
        &self.sla
    }
}
