//! Config file resolution

use anyhow::{bail, Context};
use desk_engine::EngineConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// `~/.helpdesk/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".helpdesk").join("config.toml"))
}

/// An explicit path must exist. Without one, the default location is used
/// if present, otherwise built-in defaults.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<(EngineConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?;
        return Ok((config, Some(path.to_path_buf())));
    }

    match default_path() {
        Some(path) if path.exists() => {
            let config = EngineConfig::load(&path).with_context(|| format!("loading {}", path.display()))?;
            Ok((config, Some(path)))
        }
        _ => {
            tracing::debug!("no config file found, using defaults");
            Ok((EngineConfig::default(), None))
        }
    }
}

pub fn save(config: &EngineConfig, path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let content = config.to_toml_string()?;
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}
