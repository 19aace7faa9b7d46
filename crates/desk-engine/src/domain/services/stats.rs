//! Dashboard statistics

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::sla::{SlaEvaluator, SlaStatus};
use crate::domain::aggregates::{Agent, Ticket, TicketStatus};
use crate::domain::value_objects::AgentId;

/// Ticket counts by status
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TicketStats {
    pub total: usize,
    pub new: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub resolved: usize,
    pub closed: usize,
    /// Still open and already breached
    pub overdue: usize,
}

impl TicketStats {
    pub fn collect(tickets: &[Ticket], evaluator: &SlaEvaluator, now: DateTime<Utc>) -> Self {
        let mut stats = Self { total: tickets.len(), ..Self::default() };
        for ticket in tickets {
            match ticket.status() {
                TicketStatus::New => stats.new += 1,
                TicketStatus::InProgress => stats.in_progress += 1,
                TicketStatus::Pending => stats.pending += 1,
                TicketStatus::Resolved => stats.resolved += 1,
                TicketStatus::Closed => stats.closed += 1,
            }
            if !ticket.status().is_terminal() && evaluator.evaluate(ticket, now) == SlaStatus::Breached {
                stats.overdue += 1;
            }
        }
        stats
    }
}

/// Per-agent performance summary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentPerformance {
    pub agent_id: AgentId,
    pub name: String,
    pub active: bool,
    pub current_tickets: u32,
    pub max_tickets: u32,
    pub total_tickets: usize,
    pub resolved_tickets: usize,
    /// Mean creation-to-resolution time over resolved tickets, in hours.
    pub avg_resolution_hours: f64,
    /// Share of resolved tickets that never breached, 0..=100.
    pub sla_compliance: f64,
}

impl AgentPerformance {
    pub fn collect(agent: &Agent, tickets: &[Ticket], evaluator: &SlaEvaluator, now: DateTime<Utc>) -> Self {
        let owned: Vec<&Ticket> = tickets.iter().filter(|t| t.assigned_agent() == Some(agent.id())).collect();
        let resolved: Vec<&Ticket> = owned.iter().copied().filter(|t| t.resolved_at().is_some()).collect();

        let (avg_resolution_hours, sla_compliance) = if resolved.is_empty() {
            (0.0, 100.0)
        } else {
            let n = resolved.len() as f64;
            let total_minutes: i64 = resolved
                .iter()
                .filter_map(|t| t.resolved_at().map(|at| (at - t.created_at()).num_minutes()))
                .sum();
            let compliant = resolved
                .iter()
                .filter(|t| evaluator.evaluate(t, now) != SlaStatus::Breached)
                .count() as f64;
            (total_minutes as f64 / 60.0 / n, compliant / n * 100.0)
        };

        Self {
            agent_id: agent.id().clone(),
            name: agent.name().to_string(),
            active: agent.is_active(),
            current_tickets: agent.current_tickets(),
            max_tickets: agent.max_tickets(),
            total_tickets: owned.len(),
            resolved_tickets: resolved.len(),
            avg_resolution_hours,
            sla_compliance,
        }
    }
}
