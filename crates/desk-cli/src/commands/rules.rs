//! Rule commands

use crate::output::OutputFormat;
use desk_engine::RoutingAdmin;
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "#")]
    order: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Priority")]
    priority: u32,
    #[tabled(rename = "When")]
    condition: String,
    #[tabled(rename = "Assign to")]
    agent: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

pub fn handle(config_path: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let engine = super::engine(config_path)?;
    let rules = engine.list_rules();

    format.print("Assignment rules", &rules, || {
        rules
            .iter()
            .enumerate()
            .map(|(i, r)| RuleRow {
                order: i + 1,
                id: r.id.to_string(),
                name: r.name.clone(),
                priority: r.priority,
                condition: r.condition.to_string(),
                agent: r.agent_id.to_string(),
                active: if r.active { "yes" } else { "no" },
            })
            .collect()
    })
}
