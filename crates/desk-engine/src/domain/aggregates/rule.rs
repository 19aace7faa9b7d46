//! Assignment rules
//!
//! A rule maps a condition over ticket attributes to a preferred agent.
//! Conditions form a small closed tree so evaluation is total: every
//! variant answers `true` or `false` for every ticket.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ticket::Ticket;
use crate::domain::value_objects::{AgentId, DomainError, Priority, RuleId};

/// Ticket attribute a condition can inspect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketField {
    Category,
    Priority,
    CustomerDomain,
    CustomerEmail,
}

impl TicketField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Priority => "priority",
            Self::CustomerDomain => "customer_domain",
            Self::CustomerEmail => "customer_email",
        }
    }

    fn read<'a>(&self, ticket: &'a Ticket) -> Option<&'a str> {
        match self {
            Self::Category => ticket.category(),
            Self::Priority => Some(ticket.priority().as_str()),
            Self::CustomerDomain => Some(ticket.customer().email.domain()),
            Self::CustomerEmail => Some(ticket.customer().email.as_str()),
        }
    }
}

/// Rule condition
///
/// String comparisons are trimmed and ASCII case-insensitive. A missing
/// attribute (a ticket without category) never matches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Equals { field: TicketField, value: String },
    OneOf { field: TicketField, values: Vec<String> },
    /// Every child must hold. An empty list always holds.
    All { conditions: Vec<Condition> },
}

impl Condition {
    pub fn equals(field: TicketField, value: impl Into<String>) -> Self {
        Self::Equals { field, value: value.into() }
    }

    pub fn one_of<I, S>(field: TicketField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf { field, values: values.into_iter().map(Into::into).collect() }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Self::All { conditions }
    }

    pub fn evaluate(&self, ticket: &Ticket) -> bool {
        match self {
            Self::Equals { field, value } => field.read(ticket).is_some_and(|actual| same(actual, value)),
            Self::OneOf { field, values } => {
                field.read(ticket).is_some_and(|actual| values.iter().any(|v| same(actual, v)))
            }
            Self::All { conditions } => conditions.iter().all(|c| c.evaluate(ticket)),
        }
    }

    /// Reject conditions that can never match because of a typo.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::OneOf { values, .. } if values.is_empty() => {
                Err(DomainError::InvalidCondition("one_of needs at least one value".into()))
            }
            Self::Equals { field: TicketField::Priority, value } => value.parse::<Priority>().map(|_| ()),
            Self::OneOf { field: TicketField::Priority, values } => {
                values.iter().try_for_each(|v| v.parse::<Priority>().map(|_| ()))
            }
            Self::Equals { .. } | Self::OneOf { .. } => Ok(()),
            Self::All { conditions } => conditions.iter().try_for_each(Condition::validate),
        }
    }
}

/// Renders as the settings screen does, e.g. `priority = critical AND category = Billing`.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { field, value } => write!(f, "{} = {}", field.as_str(), value),
            Self::OneOf { field, values } => write!(f, "{} IN ({})", field.as_str(), values.join(", ")),
            Self::All { conditions } if conditions.is_empty() => f.write_str("always"),
            Self::All { conditions } => {
                for (i, c) in conditions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" AND ")?;
                    }
                    write!(f, "{}", c)?;
                }
                Ok(())
            }
        }
    }
}

fn same(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}

fn default_active() -> bool {
    true
}

/// Assignment rule (configuration entity)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRule {
    pub id: RuleId,
    pub name: String,
    /// Lower = evaluated first
    pub priority: u32,
    pub condition: Condition,
    pub agent_id: AgentId,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl AssignmentRule {
    pub fn new(id: RuleId, name: impl Into<String>, priority: u32, condition: Condition, agent_id: AgentId) -> Self {
        Self { id, name: name.into(), priority, condition, agent_id, active: true }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Active and condition holds.
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.active && self.condition.evaluate(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::NewTicket;
    use crate::domain::value_objects::{CustomerContact, Email, SlaBudget, TicketId};
    use chrono::Utc;

    fn ticket(category: Option<&str>, priority: Priority) -> Ticket {
        Ticket::create(
            TicketId::new(1),
            NewTicket {
                title: "Payment failed".into(),
                description: None,
                category: category.map(String::from),
                priority,
                customer: CustomerContact::new(None, Email::new("ops@globex.com").unwrap()),
            },
            SlaBudget::from_hours(4, 24).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn test_equals_ignores_case() {
        let t = ticket(Some("Billing"), Priority::High);
        assert!(Condition::equals(TicketField::Category, "billing").evaluate(&t));
        assert!(Condition::equals(TicketField::CustomerDomain, "GLOBEX.com").evaluate(&t));
        assert!(!Condition::equals(TicketField::Category, "Bug Report").evaluate(&t));
    }

    #[test]
    fn test_missing_category_never_matches() {
        let t = ticket(None, Priority::High);
        assert!(!Condition::equals(TicketField::Category, "Billing").evaluate(&t));
        assert!(!Condition::one_of(TicketField::Category, ["Billing", ""]).evaluate(&t));
    }

    #[test]
    fn test_compound_and() {
        let cond = Condition::all(vec![
            Condition::equals(TicketField::Priority, "critical"),
            Condition::equals(TicketField::Category, "Technical Support"),
        ]);
        assert!(cond.evaluate(&ticket(Some("Technical Support"), Priority::Critical)));
        assert!(!cond.evaluate(&ticket(Some("Technical Support"), Priority::High)));
        assert!(Condition::all(vec![]).evaluate(&ticket(None, Priority::Low)));
    }

    #[test]
    fn test_one_of() {
        let cond = Condition::one_of(TicketField::Priority, ["high", "critical"]);
        assert!(cond.evaluate(&ticket(None, Priority::High)));
        assert!(!cond.evaluate(&ticket(None, Priority::Medium)));
    }

    #[test]
    fn test_validate_rejects_unknown_priority() {
        assert!(Condition::equals(TicketField::Priority, "urgent").validate().is_err());
        let nested = Condition::all(vec![Condition::one_of(TicketField::Priority, ["low", "blocker"])]);
        assert!(nested.validate().is_err());
        assert!(Condition::one_of(TicketField::Category, Vec::<String>::new()).validate().is_err());
        assert!(Condition::equals(TicketField::Category, "anything").validate().is_ok());
    }

    #[test]
    fn test_condition_display() {
        let cond = Condition::all(vec![
            Condition::equals(TicketField::Priority, "critical"),
            Condition::one_of(TicketField::Category, ["Billing", "Payments"]),
        ]);
        assert_eq!(cond.to_string(), "priority = critical AND category IN (Billing, Payments)");
        assert_eq!(Condition::all(vec![]).to_string(), "always");
    }

    #[test]
    fn test_inactive_rule_never_matches() {
        let rule = AssignmentRule::new(
            RuleId::new("rule_3").unwrap(),
            "General Technical",
            3,
            Condition::equals(TicketField::Category, "Billing"),
            AgentId::new("agent_2").unwrap(),
        )
        .inactive();
        assert!(!rule.matches(&ticket(Some("Billing"), Priority::Low)));
    }

    #[test]
    fn test_condition_toml_shape() {
        let rule: AssignmentRule = toml::from_str(
            r#"
            id = "rule_1"
            name = "Critical Technical Issues"
            priority = 1
            agent_id = "agent_1"
            [condition]
            type = "all"
            conditions = [
                { type = "equals", field = "priority", value = "critical" },
                { type = "equals", field = "category", value = "Technical Support" },
            ]
            "#,
        )
        .unwrap();
        assert!(rule.active);
        assert!(rule.matches(&ticket(Some("Technical Support"), Priority::Critical)));
    }
}
