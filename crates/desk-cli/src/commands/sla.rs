//! SLA commands

use crate::output::OutputFormat;
use desk_engine::{RoutingAdmin, SlaConfig};
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled)]
struct SlaRow {
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "First response")]
    response: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
}

pub fn handle(config_path: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let engine = super::engine(config_path)?;
    let table = engine.sla_policies();

    format.print("SLA policies", &SlaConfig::from(table), || {
        table
            .entries()
            .map(|(priority, budget)| SlaRow {
                priority: priority.to_string(),
                response: human(budget.response()),
                resolution: human(budget.resolution()),
            })
            .collect()
    })
}

/// `90m` → `1h 30m`, `4320m` → `72h`
fn human(d: chrono::Duration) -> String {
    let (h, m) = (d.num_hours(), d.num_minutes() % 60);
    match (h, m) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_human_durations() {
        assert_eq!(human(Duration::minutes(45)), "45m");
        assert_eq!(human(Duration::hours(72)), "72h");
        assert_eq!(human(Duration::minutes(90)), "1h 30m");
    }
}
