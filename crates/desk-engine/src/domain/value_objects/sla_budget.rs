//! SLA time budgets

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Response and resolution budgets for one priority level.
///
/// # Invariants
/// - Both budgets are strictly positive
/// - Response budget never exceeds resolution budget
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlaBudget {
    response: Duration,
    resolution: Duration,
}

impl SlaBudget {
    pub fn new(response: Duration, resolution: Duration) -> Result<Self, DomainError> {
        if response <= Duration::zero() || resolution <= Duration::zero() {
            return Err(DomainError::InvalidBudget("budgets must be positive".into()));
        }
        if response > resolution {
            return Err(DomainError::InvalidBudget(format!(
                "response budget {}m exceeds resolution budget {}m",
                response.num_minutes(),
                resolution.num_minutes()
            )));
        }
        Ok(Self { response, resolution })
    }

    pub fn from_hours(response: i64, resolution: i64) -> Result<Self, DomainError> {
        Self::new(Duration::hours(response), Duration::hours(resolution))
    }

    pub fn from_minutes(response: i64, resolution: i64) -> Result<Self, DomainError> {
        Self::new(Duration::minutes(response), Duration::minutes(resolution))
    }

    pub fn response(&self) -> Duration { self.response }
    pub fn resolution(&self) -> Duration { self.resolution }
}

/// Wire form used by config files: whole minutes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct BudgetMinutes {
    response_minutes: i64,
    resolution_minutes: i64,
}

impl Serialize for SlaBudget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BudgetMinutes {
            response_minutes: self.response.num_minutes(),
            resolution_minutes: self.resolution.num_minutes(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SlaBudget {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BudgetMinutes::deserialize(deserializer)?;
        Self::from_minutes(raw.response_minutes, raw.resolution_minutes).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_validation() {
        assert!(SlaBudget::from_hours(1, 4).is_ok());
        assert!(SlaBudget::from_hours(0, 4).is_err());
        assert!(SlaBudget::from_hours(8, 4).is_err());
        assert!(SlaBudget::from_hours(4, 4).is_ok());
    }

    #[test]
    fn test_budget_minutes_wire_form() {
        let budget: SlaBudget =
            serde_json::from_str(r#"{"response_minutes":60,"resolution_minutes":240}"#).unwrap();
        assert_eq!(budget.response(), Duration::hours(1));
        assert_eq!(budget.resolution(), Duration::hours(4));

        let bad = serde_json::from_str::<SlaBudget>(r#"{"response_minutes":-5,"resolution_minutes":240}"#);
        assert!(bad.is_err());
    }
}
