//! SLA policy table and SLA status derivation

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::aggregates::Ticket;
use crate::domain::value_objects::{DomainError, Priority, SlaBudget};

/// Priority → budgets. Consulted once per ticket creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlaPolicyTable {
    policies: BTreeMap<Priority, SlaBudget>,
}

impl SlaPolicyTable {
    /// Empty table; every lookup fails until budgets are added.
    pub fn empty() -> Self {
        Self { policies: BTreeMap::new() }
    }

    pub fn with_budget(mut self, priority: Priority, budget: SlaBudget) -> Self {
        self.policies.insert(priority, budget);
        self
    }

    pub fn lookup(&self, priority: Priority) -> Result<SlaBudget, DomainError> {
        self.policies
            .get(&priority)
            .copied()
            .ok_or_else(|| DomainError::UnknownPriority(priority.to_string()))
    }

    /// Entries from most to least urgent.
    pub fn entries(&self) -> impl Iterator<Item = (Priority, SlaBudget)> + '_ {
        self.policies.iter().rev().map(|(p, b)| (*p, *b))
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl Default for SlaPolicyTable {
    /// Response / resolution hours: critical 1/4, high 2/8, medium 4/24, low 8/72.
    fn default() -> Self {
        let budget = |response: i64, resolution: i64| SlaBudget::new(Duration::hours(response), Duration::hours(resolution));
        let mut policies = BTreeMap::new();
        for (priority, b) in [
            (Priority::Critical, budget(1, 4)),
            (Priority::High, budget(2, 8)),
            (Priority::Medium, budget(4, 24)),
            (Priority::Low, budget(8, 72)),
        ] {
            if let Ok(b) = b {
                policies.insert(priority, b);
            }
        }
        Self { policies }
    }
}

/// Derived SLA state. Ordered by severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlaStatus {
    OnTrack,
    AtRisk,
    Breached,
}

impl SlaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTrack => "on-track",
            Self::AtRisk => "at-risk",
            Self::Breached => "breached",
        }
    }
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Computes [`SlaStatus`] from a ticket and the current time.
///
/// Each milestone (first response, resolution) is judged on its own and the
/// worse of the two wins:
/// - reached on or before its due time: on track
/// - reached after its due time, or still pending past it: breached
/// - pending with less than `at_risk_ratio` of its budget left: at risk
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlaEvaluator {
    at_risk_ratio: f64,
}

impl SlaEvaluator {
    pub const DEFAULT_AT_RISK_RATIO: f64 = 0.2;

    pub fn new(at_risk_ratio: f64) -> Result<Self, DomainError> {
        if !(0.0..1.0).contains(&at_risk_ratio) {
            return Err(DomainError::InvalidBudget(format!(
                "at-risk ratio must be within [0, 1), got {}",
                at_risk_ratio
            )));
        }
        Ok(Self { at_risk_ratio })
    }

    pub fn at_risk_ratio(&self) -> f64 {
        self.at_risk_ratio
    }

    pub fn evaluate(&self, ticket: &Ticket, now: DateTime<Utc>) -> SlaStatus {
        let response = self.milestone(ticket.created_at(), ticket.sla_response_due(), ticket.first_response_at(), now);
        let resolution = self.milestone(ticket.created_at(), ticket.sla_resolution_due(), ticket.resolved_at(), now);
        response.max(resolution)
    }

    fn milestone(
        &self,
        start: DateTime<Utc>,
        due: DateTime<Utc>,
        reached: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> SlaStatus {
        if let Some(at) = reached {
            return if at > due { SlaStatus::Breached } else { SlaStatus::OnTrack };
        }
        if now > due {
            return SlaStatus::Breached;
        }

        let budget = (due - start).num_milliseconds() as f64;
        let remaining = (due - now).num_milliseconds() as f64;
        if remaining < budget * self.at_risk_ratio {
            SlaStatus::AtRisk
        } else {
            SlaStatus::OnTrack
        }
    }
}

impl Default for SlaEvaluator {
    fn default() -> Self {
        Self { at_risk_ratio: Self::DEFAULT_AT_RISK_RATIO }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{NewTicket, TicketStatus};
    use crate::domain::value_objects::{CustomerContact, Email, TicketId};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    }

    fn critical_ticket() -> Ticket {
        let table = SlaPolicyTable::default();
        Ticket::create(
            TicketId::new(1),
            NewTicket {
                title: "Production down".into(),
                description: None,
                category: Some("Technical Support".into()),
                priority: Priority::Critical,
                customer: CustomerContact::new(None, Email::new("cto@acme.com").unwrap()),
            },
            table.lookup(Priority::Critical).unwrap(),
            t0(),
        )
    }

    #[test]
    fn test_default_table_matches_settings_screen() {
        let table = SlaPolicyTable::default();
        let expect = [
            (Priority::Critical, 1, 4),
            (Priority::High, 2, 8),
            (Priority::Medium, 4, 24),
            (Priority::Low, 8, 72),
        ];
        for (priority, response, resolution) in expect {
            let budget = table.lookup(priority).unwrap();
            assert_eq!(budget.response(), Duration::hours(response));
            assert_eq!(budget.resolution(), Duration::hours(resolution));
        }
        let order: Vec<_> = table.entries().map(|(p, _)| p).collect();
        assert_eq!(order, vec![Priority::Critical, Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn test_lookup_missing_priority_fails() {
        let table = SlaPolicyTable::empty().with_budget(Priority::Low, SlaBudget::from_hours(8, 72).unwrap());
        assert_eq!(
            table.lookup(Priority::High),
            Err(DomainError::UnknownPriority("high".into()))
        );
    }

    #[test]
    fn test_critical_scenario() {
        let eval = SlaEvaluator::default();
        let mut t = critical_ticket();
        assert_eq!(eval.evaluate(&t, t0()), SlaStatus::OnTrack);

        t.transition(TicketStatus::InProgress, t0() + Duration::minutes(30)).unwrap();
        assert_eq!(eval.evaluate(&t, t0() + Duration::hours(2)), SlaStatus::OnTrack);
        assert_eq!(eval.evaluate(&t, t0() + Duration::minutes(235)), SlaStatus::AtRisk);
        assert_eq!(eval.evaluate(&t, t0() + Duration::minutes(241)), SlaStatus::Breached);
    }

    #[test]
    fn test_response_window() {
        let eval = SlaEvaluator::default();
        let t = critical_ticket();
        // 20% of a 60 minute response budget is 12 minutes
        assert_eq!(eval.evaluate(&t, t0() + Duration::minutes(47)), SlaStatus::OnTrack);
        assert_eq!(eval.evaluate(&t, t0() + Duration::minutes(50)), SlaStatus::AtRisk);
        assert_eq!(eval.evaluate(&t, t0() + Duration::minutes(61)), SlaStatus::Breached);
    }

    #[test]
    fn test_late_milestone_stays_breached() {
        let eval = SlaEvaluator::default();
        let mut t = critical_ticket();
        t.transition(TicketStatus::InProgress, t0() + Duration::minutes(90)).unwrap();
        t.transition(TicketStatus::Resolved, t0() + Duration::hours(2)).unwrap();
        assert_eq!(eval.evaluate(&t, t0() + Duration::hours(3)), SlaStatus::Breached);
    }

    #[test]
    fn test_resolved_on_time_is_on_track_forever() {
        let eval = SlaEvaluator::default();
        let mut t = critical_ticket();
        t.transition(TicketStatus::InProgress, t0() + Duration::minutes(10)).unwrap();
        t.transition(TicketStatus::Resolved, t0() + Duration::hours(1)).unwrap();
        assert_eq!(eval.evaluate(&t, t0() + Duration::days(30)), SlaStatus::OnTrack);
    }

    #[test]
    fn test_zero_ratio_disables_at_risk() {
        let eval = SlaEvaluator::new(0.0).unwrap();
        let t = critical_ticket();
        assert_eq!(eval.evaluate(&t, t0() + Duration::minutes(59)), SlaStatus::OnTrack);
        assert!(SlaEvaluator::new(1.0).is_err());
        assert!(SlaEvaluator::new(-0.1).is_err());
    }
}
