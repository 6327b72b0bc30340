//! Layout configuration for the skill store and its projection targets.
//!
//! Config files: `skillport.toml`, `skillport.yaml` or `skillport.json`,
//! searched in the project root then `~/.config/skillport/`. Without a file
//! the default layout applies: `skills/{domains,stack,workflows}` projected
//! into `.claude/skills` and `.codex/skills`.

pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{TARGETS_ENV, apply_env_overrides, config_dir, discover_and_load, load_config},
    schema::SkillsConfig,
};
