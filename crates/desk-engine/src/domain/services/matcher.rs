//! Rule matching
//!
//! Rules are kept ordered by `(priority, id)`; the first active rule whose
//! condition holds wins. Evaluation is pure: same rules, same ticket, same
//! answer.

use crate::domain::aggregates::{AssignmentRule, Ticket};
use crate::domain::value_objects::{DomainError, RuleId};

/// Picks the first matching rule.
pub struct RuleMatcher;

impl RuleMatcher {
    /// Lowest priority number wins; equal numbers fall back to rule id so the
    /// result never depends on slice order.
    pub fn find_match<'r>(ticket: &Ticket, rules: &'r [AssignmentRule]) -> Option<&'r AssignmentRule> {
        let hit = rules
            .iter()
            .filter(|r| r.matches(ticket))
            .min_by(|a, b| (a.priority, &a.id).cmp(&(b.priority, &b.id)));

        match hit {
            Some(rule) => tracing::debug!(ticket = %ticket.id(), rule = %rule.id, "rule matched"),
            None => tracing::debug!(ticket = %ticket.id(), "no rule matched"),
        }
        hit
    }
}

/// Rule book errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleBookError {
    #[error("rule {0} already exists")]
    DuplicateId(RuleId),

    #[error("priority {priority} already used by rule {existing}")]
    DuplicatePriority { priority: u32, existing: RuleId },

    #[error("rule {0} not found")]
    NotFound(RuleId),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Ordered rule collection
///
/// # Invariants
/// - Rule ids are unique
/// - Priority numbers are unique
/// - Rules are stored in evaluation order
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: Vec<AssignmentRule>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: AssignmentRule) -> Result<(), RuleBookError> {
        rule.condition.validate()?;
        if self.rules.iter().any(|r| r.id == rule.id) {
            return Err(RuleBookError::DuplicateId(rule.id));
        }
        if let Some(existing) = self.rules.iter().find(|r| r.priority == rule.priority) {
            return Err(RuleBookError::DuplicatePriority { priority: rule.priority, existing: existing.id.clone() });
        }

        self.rules.push(rule);
        self.rules.sort_by(|a, b| (a.priority, &a.id).cmp(&(b.priority, &b.id)));
        Ok(())
    }

    pub fn set_active(&mut self, id: &RuleId, active: bool) -> Result<&AssignmentRule, RuleBookError> {
        let rule = self
            .rules
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| RuleBookError::NotFound(id.clone()))?;
        rule.active = active;
        Ok(rule)
    }

    pub fn find_match(&self, ticket: &Ticket) -> Option<&AssignmentRule> {
        RuleMatcher::find_match(ticket, &self.rules)
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[AssignmentRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Condition, NewTicket, TicketField};
    use crate::domain::value_objects::{AgentId, CustomerContact, Email, Priority, SlaBudget, TicketId};
    use chrono::Utc;

    fn ticket(category: &str, priority: Priority) -> Ticket {
        Ticket::create(
            TicketId::new(1),
            NewTicket {
                title: "Cannot log in".into(),
                description: None,
                category: Some(category.into()),
                priority,
                customer: CustomerContact::new(None, Email::new("jane@initech.com").unwrap()),
            },
            SlaBudget::from_hours(4, 24).unwrap(),
            Utc::now(),
        )
    }

    fn rule(id: &str, priority: u32, category: &str, agent: &str) -> AssignmentRule {
        AssignmentRule::new(
            RuleId::new(id).unwrap(),
            id,
            priority,
            Condition::equals(TicketField::Category, category),
            AgentId::new(agent).unwrap(),
        )
    }

    #[test]
    fn test_lowest_priority_number_wins_regardless_of_order() {
        let rules = vec![
            rule("rule_3", 3, "Technical Support", "agent_2"),
            rule("rule_1", 1, "Technical Support", "agent_1"),
        ];
        let t = ticket("Technical Support", Priority::High);
        assert_eq!(RuleMatcher::find_match(&t, &rules).unwrap().id.as_str(), "rule_1");
    }

    #[test]
    fn test_tie_broken_by_id() {
        let rules = vec![
            rule("rule_b", 2, "Billing", "agent_2"),
            rule("rule_a", 2, "Billing", "agent_1"),
        ];
        let t = ticket("Billing", Priority::Low);
        assert_eq!(RuleMatcher::find_match(&t, &rules).unwrap().id.as_str(), "rule_a");
    }

    #[test]
    fn test_inactive_rules_skipped() {
        let rules = vec![
            rule("rule_1", 1, "Billing", "agent_1").inactive(),
            rule("rule_2", 2, "Billing", "agent_3"),
        ];
        let t = ticket("Billing", Priority::Low);
        assert_eq!(RuleMatcher::find_match(&t, &rules).unwrap().id.as_str(), "rule_2");
        assert!(RuleMatcher::find_match(&ticket("Sales", Priority::Low), &rules).is_none());
    }

    #[test]
    fn test_rule_book_rejects_duplicates() {
        let mut book = RuleBook::new();
        book.add(rule("rule_1", 1, "Billing", "agent_1")).unwrap();
        assert_eq!(
            book.add(rule("rule_1", 5, "Sales", "agent_1")),
            Err(RuleBookError::DuplicateId(RuleId::new("rule_1").unwrap()))
        );
        assert!(matches!(
            book.add(rule("rule_9", 1, "Sales", "agent_1")),
            Err(RuleBookError::DuplicatePriority { priority: 1, .. })
        ));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_rule_book_keeps_evaluation_order_and_toggles() {
        let mut book = RuleBook::new();
        book.add(rule("rule_3", 3, "Billing", "agent_3")).unwrap();
        book.add(rule("rule_1", 1, "Billing", "agent_1")).unwrap();
        let ids: Vec<_> = book.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rule_1", "rule_3"]);

        book.set_active(&RuleId::new("rule_1").unwrap(), false).unwrap();
        let t = ticket("Billing", Priority::Medium);
        assert_eq!(book.find_match(&t).unwrap().id.as_str(), "rule_3");
        assert!(book.set_active(&RuleId::new("nope").unwrap(), true).is_err());
    }
}
