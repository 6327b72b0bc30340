use std::{fmt, path::PathBuf, str::FromStr};

use {
    serde::{Serialize, Serializer},
    skillport_config::SkillsConfig,
};

use crate::error::{Error, Result};

/// File holding a skill's manifest and body.
pub const SKILL_DOCUMENT: &str = "SKILL.md";

/// Optional auxiliary subtree inside a skill directory.
pub const REFERENCES_DIR: &str = "references";

// ── Skill paths ─────────────────────────────────────────────────────────────

/// Address of a skill inside the store: `category/leaf` or
/// `category/group/.../leaf`. The leaf is always the final segment and is the
/// name the skill is projected under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SkillPath {
    segments: Vec<String>,
}

impl SkillPath {
    /// Parse a slash-separated skill path. Only the syntax is checked here;
    /// category membership depends on the layout, see [`SkillPath::resolve`].
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidSkillPath {
            path: raw.to_string(),
            reason,
        };

        if raw.contains('\\') {
            return Err(invalid("backslashes are not allowed"));
        }
        if raw.starts_with('/') {
            return Err(invalid("must be relative to the store"));
        }
        let trimmed = raw.strip_suffix('/').unwrap_or(raw);
        let segments: Vec<String> = trimmed.split('/').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("empty path segment"));
        }
        if segments.iter().any(|s| s == "." || s == "..") {
            return Err(invalid("'.' and '..' segments are not allowed"));
        }
        if segments.len() < 2 {
            return Err(invalid("expected <category>/<name>"));
        }
        Ok(Self { segments })
    }

    /// Parse and check the category against the configured set.
    pub fn resolve(raw: &str, config: &SkillsConfig) -> Result<Self> {
        let path = Self::parse(raw)?;
        check_category(config, path.category())?;
        Ok(path)
    }

    /// Build a path from segments found on disk. Callers pass the category
    /// followed by at least one name.
    pub(crate) fn from_segments(segments: Vec<String>) -> Self {
        debug_assert!(segments.len() >= 2);
        Self { segments }
    }

    pub fn category(&self) -> &str {
        &self.segments[0]
    }

    /// Final segment; the flat name used in projection targets.
    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Path of the skill directory relative to the store directory.
    pub fn relative_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

impl fmt::Display for SkillPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for SkillPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for SkillPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Reject categories outside the configured set.
pub fn check_category(config: &SkillsConfig, category: &str) -> Result<()> {
    if config.has_category(category) {
        return Ok(());
    }
    Err(Error::UnknownCategory {
        category: category.to_string(),
        allowed: config.categories.join(", "),
    })
}
