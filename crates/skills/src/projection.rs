//! Projection of canonical skills into flat consumer directories.
//!
//! Each target receives one relative symlink per skill, named by the skill's
//! leaf. Existing entries are never replaced, which makes projection safe to
//! re-run and keeps user overrides intact. Because categories are dropped,
//! two skills sharing a leaf name collide: the first one projected wins and
//! later ones are reported as [`ProjectionStatus::Exists`].
//!
//! The existence check and link creation are not atomic; two concurrent runs
//! against the same project may race for the same destination. The loser of
//! such a race sees `AlreadyExists`, which is reported as `Exists`.

use std::{
    fmt,
    io::{self, ErrorKind},
    path::{Component, Path, PathBuf},
};

use {
    serde::Serialize,
    skillport_config::SkillsConfig,
    tracing::{debug, info, warn},
};

use crate::{
    discover,
    error::{Error, Result},
    store::SkillStore,
    types::{SkillPath, check_category},
};

/// Outcome for one skill/target pair that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionStatus {
    /// Something already occupies the destination; nothing was touched.
    Exists,
    /// A new symlink was created.
    Symlink,
}

impl fmt::Display for ProjectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists => f.pad("exists"),
            Self::Symlink => f.pad("symlink"),
        }
    }
}

/// A projected (or already present) destination entry.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionEntry {
    pub skill: SkillPath,
    /// Target directory as configured, relative to the project root.
    pub target: PathBuf,
    /// Absolute path of the destination entry.
    pub link: PathBuf,
    /// Relative link contents pointing back into the store.
    pub points_to: PathBuf,
    pub status: ProjectionStatus,
}

/// Collected results of a projection run. Failures of individual pairs do
/// not stop the run.
#[derive(Debug, Default)]
pub struct ProjectionReport {
    pub entries: Vec<ProjectionEntry>,
    pub failures: Vec<Error>,
}

impl ProjectionReport {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    #[must_use]
    pub fn count(&self, status: ProjectionStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
        self.failures.extend(other.failures);
    }
}

/// Creates and maintains symlinks from targets into the store.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    root: PathBuf,
    config: SkillsConfig,
}

impl ProjectionEngine {
    pub fn new(root: impl Into<PathBuf>, config: SkillsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            root: root.into(),
            config,
        })
    }

    /// Engine sharing a store's root and layout.
    pub fn for_store(store: &SkillStore) -> Self {
        Self {
            root: store.root().to_path_buf(),
            config: store.config().clone(),
        }
    }

    pub fn targets(&self) -> &[PathBuf] {
        &self.config.targets
    }

    /// Link contents for `skill` inside `target`: climb out of the target to
    /// the project root, then descend into the store.
    pub fn link_target(&self, target: &Path, skill: &SkillPath) -> PathBuf {
        let depth = target
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count();
        let mut path: PathBuf = std::iter::repeat_n(Component::ParentDir, depth).collect();
        path.push(&self.config.skills_dir);
        path.push(skill.relative_path());
        path
    }

    /// Ensure `skill` is linked into every target, in declared order.
    pub fn project_skill(&self, skill: &SkillPath) -> ProjectionReport {
        let mut report = ProjectionReport::default();
        for target in &self.config.targets {
            match self.project_into(target, skill) {
                Ok(entry) => report.entries.push(entry),
                Err(e) => {
                    warn!(skill = %skill, target = %target.display(), error = %e, "projection failed");
                    report.failures.push(e);
                },
            }
        }
        report
    }

    /// Project every skill of one category, lexicographic.
    pub fn project_category(&self, category: &str) -> Result<ProjectionReport> {
        check_category(&self.config, category)?;
        let store_dir = self.root.join(&self.config.skills_dir);
        let mut report = ProjectionReport::default();
        for skill in discover::discover_category(&store_dir, category)? {
            report.merge(self.project_skill(&skill));
        }
        Ok(report)
    }

    /// Project every category in configured order. A category that cannot
    /// be enumerated is recorded as a failure; the others still run.
    pub fn project_all(&self) -> ProjectionReport {
        let mut report = ProjectionReport::default();
        for category in &self.config.categories {
            match self.project_category(category) {
                Ok(projected) => report.merge(projected),
                Err(e) => {
                    warn!(category = %category, error = %e, "cannot enumerate category");
                    report.failures.push(e);
                },
            }
        }
        report
    }

    fn project_into(&self, target: &Path, skill: &SkillPath) -> Result<ProjectionEntry> {
        let target_dir = self.root.join(target);
        let link = target_dir.join(skill.leaf());
        let points_to = self.link_target(target, skill);
        let entry = |status| ProjectionEntry {
            skill: skill.clone(),
            target: target.to_path_buf(),
            link: link.clone(),
            points_to: points_to.clone(),
            status,
        };

        // symlink_metadata so dangling links also count as present.
        match std::fs::symlink_metadata(&link) {
            Ok(_) => {
                debug!(link = %link.display(), "destination exists");
                return Ok(entry(ProjectionStatus::Exists));
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {},
            Err(e) => return Err(Error::link(&target_dir, skill.leaf(), e)),
        }

        std::fs::create_dir_all(&target_dir)
            .map_err(|e| Error::link(&target_dir, skill.leaf(), e))?;

        match symlink_dir(&points_to, &link) {
            Ok(()) => {
                info!(link = %link.display(), points_to = %points_to.display(), "symlink");
                Ok(entry(ProjectionStatus::Symlink))
            },
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(link = %link.display(), "destination appeared concurrently");
                Ok(entry(ProjectionStatus::Exists))
            },
            Err(e) if e.kind() == ErrorKind::Unsupported => Err(Error::Unsupported {
                target: target_dir,
                skill: skill.leaf().to_string(),
            }),
            Err(e) => Err(Error::link(&target_dir, skill.leaf(), e)),
        }
    }
}

#[cfg(unix)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink_dir(_original: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}
