//! Engine configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! config: default SLA table, 20% at-risk window, auto-assignment on, no
//! agents and no rules.
//!
//! ```toml
//! auto_assignment = true
//! at_risk_ratio = 0.2
//!
//! [sla.critical]
//! response_minutes = 60
//! resolution_minutes = 240
//!
//! [[agents]]
//! id = "agent_3"
//! name = "Mike Wilson"
//! specialties = ["Billing", "Payments"]
//! max_tickets = 10
//!
//! [[rules]]
//! id = "rule_2"
//! name = "Billing Issues"
//! priority = 2
//! agent_id = "agent_3"
//! condition = { type = "equals", field = "category", value = "Billing" }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domain::aggregates::{Agent, AssignmentRule};
use crate::domain::services::{SlaEvaluator, SlaPolicyTable};
use crate::domain::value_objects::{AgentId, Email, Priority, SlaBudget};
use crate::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub auto_assignment: bool,
    pub at_risk_ratio: f64,
    pub sla: SlaConfig,
    pub agents: Vec<AgentConfig>,
    pub rules: Vec<AssignmentRule>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_assignment: true,
            at_risk_ratio: SlaEvaluator::DEFAULT_AT_RISK_RATIO,
            sla: SlaConfig::default(),
            agents: Vec::new(),
            rules: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        SlaEvaluator::new(self.at_risk_ratio).map_err(|e| EngineError::Config(e.to_string()))?;
        for rule in &self.rules {
            rule.condition
                .validate()
                .map_err(|e| EngineError::Config(format!("rule {}: {}", rule.id, e)))?;
        }
        Ok(())
    }

    pub fn evaluator(&self) -> Result<SlaEvaluator> {
        SlaEvaluator::new(self.at_risk_ratio).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Effective table: defaults with configured overrides applied.
    pub fn sla_table(&self) -> SlaPolicyTable {
        let mut table = SlaPolicyTable::default();
        for (priority, budget) in self.sla.overrides() {
            table = table.with_budget(priority, budget);
        }
        table
    }
}

/// Per-priority budget overrides. Unset priorities keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical: Option<SlaBudget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<SlaBudget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<SlaBudget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<SlaBudget>,
}

impl SlaConfig {
    fn overrides(&self) -> impl Iterator<Item = (Priority, SlaBudget)> + '_ {
        [
            (Priority::Critical, self.critical),
            (Priority::High, self.high),
            (Priority::Medium, self.medium),
            (Priority::Low, self.low),
        ]
        .into_iter()
        .filter_map(|(p, b)| b.map(|b| (p, b)))
    }
}

impl From<&SlaPolicyTable> for SlaConfig {
    fn from(table: &SlaPolicyTable) -> Self {
        let get = |p| table.lookup(p).ok();
        Self {
            critical: get(Priority::Critical),
            high: get(Priority::High),
            medium: get(Priority::Medium),
            low: get(Priority::Low),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: AgentId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    pub max_tickets: u32,
    /// Open tickets already held when the engine starts
    #[serde(default)]
    pub current_tickets: u32,
}

impl AgentConfig {
    pub fn to_agent(&self) -> Agent {
        let mut agent = Agent::new(self.id.clone(), self.name.clone(), self.max_tickets)
            .with_specialties(self.specialties.iter().cloned())
            .with_active(self.active)
            .with_current_tickets(self.current_tickets);
        if let Some(email) = &self.email {
            agent = agent.with_email(email.clone());
        }
        if let Some(department) = &self.department {
            agent = agent.with_department(department.clone());
        }
        agent
    }
}

impl From<&Agent> for AgentConfig {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id().clone(),
            name: agent.name().to_string(),
            email: agent.email().cloned(),
            department: agent.department().map(String::from),
            specialties: agent.specialties().to_vec(),
            active: agent.is_active(),
            max_tickets: agent.max_tickets(),
            current_tickets: agent.current_tickets(),
        }
    }
}
