//! Layout schema: where the canonical store lives, which categories it
//! accepts, and which consumer directories receive projected skills.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_SKILLS_DIR: &str = "skills";
pub const DEFAULT_CATEGORIES: &[&str] = &["domains", "stack", "workflows"];
pub const DEFAULT_TARGETS: &[&str] = &[".claude/skills", ".codex/skills"];

/// Store and projection layout, relative to a project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// Canonical store directory.
    pub skills_dir: PathBuf,
    /// Allowed top-level categories, in enumeration order.
    pub categories: Vec<String>,
    /// Flat consumer directories, in projection order.
    pub targets: Vec<PathBuf>,
    /// Directory of pre-authored skills copied on creation when present.
    pub library_dir: Option<PathBuf>,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            skills_dir: PathBuf::from(DEFAULT_SKILLS_DIR),
            categories: DEFAULT_CATEGORIES.iter().map(|c| (*c).to_string()).collect(),
            targets: DEFAULT_TARGETS.iter().map(PathBuf::from).collect(),
            library_dir: None,
        }
    }
}

impl SkillsConfig {
    /// Build a config with a custom target list and default everything else.
    pub fn with_targets<I, P>(targets: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Check the layout is usable: relative, normal paths and a sane
    /// category set.
    pub fn validate(&self) -> Result<()> {
        check_relative("skills_dir", &self.skills_dir)?;

        if self.categories.is_empty() {
            return Err(Error::invalid("at least one category is required"));
        }
        for (i, category) in self.categories.iter().enumerate() {
            if category.is_empty()
                || category.starts_with('.')
                || category.contains(['/', '\\'])
            {
                return Err(Error::invalid(format!(
                    "category '{category}' must be a single non-hidden path segment"
                )));
            }
            if self.categories[..i].contains(category) {
                return Err(Error::invalid(format!("duplicate category '{category}'")));
            }
        }

        if self.targets.is_empty() {
            return Err(Error::invalid("at least one projection target is required"));
        }
        for target in &self.targets {
            check_relative("targets", target)?;
            if target.starts_with(&self.skills_dir) {
                return Err(Error::invalid(format!(
                    "target {} lies inside the skills directory",
                    target.display()
                )));
            }
        }

        if let Some(library) = &self.library_dir
            && library.as_os_str().is_empty()
        {
            return Err(Error::invalid("library_dir cannot be empty"));
        }
        Ok(())
    }
}

/// Paths inside the project must be non-empty and made of plain segments so
/// relative link targets can be computed lexically.
fn check_relative(field: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::invalid(format!("{field} cannot be empty")));
    }
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(Error::invalid(format!(
            "{field} entry {} must be relative without '.' or '..'",
            path.display()
        )));
    }
    Ok(())
}
