//! Assignment resolution
//!
//! Turns a matched rule and a roster snapshot into an ordered list of agents
//! worth trying. The caller reserves capacity against live agents, walking
//! the list until one reservation succeeds; a snapshot can be stale by the
//! time a slot is taken.

use serde::Serialize;

use crate::domain::aggregates::{Agent, AssignmentRule, Ticket};
use crate::domain::value_objects::{AgentId, RuleId};

/// Why an agent was chosen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum AssignmentSource {
    /// Target of the matched rule
    Rule { rule_id: RuleId },
    /// Least-loaded specialist for the ticket category
    Fallback,
    /// Picked explicitly by an operator
    Manual,
}

impl AssignmentSource {
    pub fn rule_id(&self) -> Option<&RuleId> {
        match self {
            Self::Rule { rule_id } => Some(rule_id),
            _ => None,
        }
    }
}

/// Routing outcome
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Assignment {
    Assigned { agent_id: AgentId, source: AssignmentSource },
    Unassigned,
}

impl Assignment {
    pub fn agent_id(&self) -> Option<&AgentId> {
        match self {
            Self::Assigned { agent_id, .. } => Some(agent_id),
            Self::Unassigned => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned { .. })
    }
}

/// A single agent to try, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub agent_id: AgentId,
    pub source: AssignmentSource,
}

pub struct AssignmentResolver;

impl AssignmentResolver {
    /// Ordered candidates for `ticket`.
    ///
    /// The rule target comes first when it exists, is active and has room.
    /// Then every active specialist in the ticket's category with room, by
    /// ascending load and then id. A ticket without category gets no
    /// fallback candidates.
    pub fn candidates(ticket: &Ticket, rule: Option<&AssignmentRule>, agents: &[Agent]) -> Vec<Candidate> {
        let mut out = Vec::new();

        if let Some(rule) = rule {
            match agents.iter().find(|a| a.id() == &rule.agent_id) {
                Some(target) if target.can_take_ticket() => out.push(Candidate {
                    agent_id: target.id().clone(),
                    source: AssignmentSource::Rule { rule_id: rule.id.clone() },
                }),
                Some(_) => tracing::debug!(rule = %rule.id, agent = %rule.agent_id, "rule target unavailable"),
                None => tracing::warn!(rule = %rule.id, agent = %rule.agent_id, "rule targets unknown agent"),
            }
        }

        let Some(category) = ticket.category() else {
            return out;
        };

        let mut fallback: Vec<&Agent> = agents
            .iter()
            .filter(|a| a.can_take_ticket() && a.has_specialty(category))
            .filter(|a| !out.iter().any(|c| &c.agent_id == a.id()))
            .collect();
        fallback.sort_by(|a, b| (a.current_tickets(), a.id()).cmp(&(b.current_tickets(), b.id())));

        out.extend(fallback.into_iter().map(|a| Candidate {
            agent_id: a.id().clone(),
            source: AssignmentSource::Fallback,
        }));
        out
    }

    /// Decision against the snapshot alone, with no reservation.
    pub fn resolve(ticket: &Ticket, rule: Option<&AssignmentRule>, agents: &[Agent]) -> Assignment {
        match Self::candidates(ticket, rule, agents).into_iter().next() {
            Some(c) => Assignment::Assigned { agent_id: c.agent_id, source: c.source },
            None => Assignment::Unassigned,
        }
    }
}
