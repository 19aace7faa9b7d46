//! Agent commands

use crate::output::{or_dash, OutputFormat};
use desk_engine::RoutingAdmin;
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled)]
struct AgentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Specialties")]
    specialties: String,
    #[tabled(rename = "Load")]
    load: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

pub fn handle(config_path: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let engine = super::engine(config_path)?;
    let agents = engine.list_agents()?;

    format.print("Agents", &agents, || {
        agents
            .iter()
            .map(|a| AgentRow {
                id: a.id().to_string(),
                name: a.name().to_string(),
                department: or_dash(a.department()),
                specialties: a.specialties().join(", "),
                load: format!("{}/{}", a.current_tickets(), a.max_tickets()),
                active: if a.is_active() { "yes" } else { "no" },
            })
            .collect()
    })
}
