use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    error::{Error, Result},
    schema::SkillsConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "skillport.toml",
    "skillport.yaml",
    "skillport.yml",
    "skillport.json",
];

/// Comma-separated override for the projection target list.
pub const TARGETS_ENV: &str = "SKILLPORT_TARGETS";

/// Load and validate config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<SkillsConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw, path)?;
    config.validate()?;
    Ok(config)
}

/// Discover and load config for a project root.
///
/// Search order:
/// 1. `<root>/skillport.{toml,yaml,yml,json}`
/// 2. `~/.config/skillport/skillport.{toml,yaml,yml,json}`
///
/// Returns `SkillsConfig::default()` if no config file is found. A file that
/// exists but fails to parse is an error.
pub fn discover_and_load(root: &Path) -> Result<SkillsConfig> {
    let mut config = match find_config_file(root) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path)?
        },
        None => {
            debug!(root = %root.display(), "no config file found, using defaults");
            SkillsConfig::default()
        },
    };
    apply_env_overrides(&mut config, std::env::var(TARGETS_ENV).ok().as_deref());
    config.validate()?;
    Ok(config)
}

/// Find the first config file in standard locations.
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    let local = CONFIG_FILENAMES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file());
    if local.is_some() {
        return local;
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.is_file())
}

/// Returns the user-global config directory (`~/.config/skillport/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "skillport").map(|d| d.config_dir().to_path_buf())
}

/// Replace the target list with a comma-separated override, ignoring blank
/// entries. An override with no usable entries leaves the config unchanged.
pub fn apply_env_overrides(config: &mut SkillsConfig, targets: Option<&str>) {
    let Some(raw) = targets else {
        return;
    };
    let parsed: Vec<PathBuf> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(PathBuf::from)
        .collect();
    if parsed.is_empty() {
        return;
    }
    debug!(targets = raw, "projection targets overridden from environment");
    config.targets = parsed;
}

fn parse_config(raw: &str, path: &Path) -> Result<SkillsConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}
