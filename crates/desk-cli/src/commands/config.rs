//! Config commands

use crate::config;
use crate::output::{Field, OutputFormat};
use crate::ConfigCommands;
use desk_engine::{EngineConfig, SlaConfig};
use std::path::Path;

pub fn handle(action: ConfigCommands, config_path: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Init { force } => {
            let path = match config_path {
                Some(p) => p.to_path_buf(),
                None => config::default_path().ok_or_else(|| anyhow::anyhow!("cannot find home directory"))?,
            };
            let mut defaults = EngineConfig::default();
            defaults.sla = SlaConfig::from(&defaults.sla_table());
            config::save(&defaults, &path, force)?;
            println!("Configuration initialized at {}", path.display());
        }
        ConfigCommands::Show => {
            let (mut effective, source) = config::load(config_path)?;
            effective.sla = SlaConfig::from(&effective.sla_table());
            let source = source.map(|p| p.display().to_string()).unwrap_or_else(|| "(built-in defaults)".into());

            match format {
                OutputFormat::Table => {
                    let summary = vec![
                        Field::new("Source", &source),
                        Field::new("Auto-assignment", effective.auto_assignment),
                        Field::new("At-risk ratio", effective.at_risk_ratio),
                        Field::new("Agents", effective.agents.len()),
                        Field::new("Rules", effective.rules.len()),
                    ];
                    format.print("Configuration", &effective, || summary)?;
                    println!("{}", effective.to_toml_string()?);
                }
                _ => format.print("Configuration", &effective, Vec::<Field>::new)?,
            }
        }
    }
    Ok(())
}
