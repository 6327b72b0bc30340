//! The canonical, categorized skill tree.

use std::{
    fs::OpenOptions,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use {
    skillport_config::SkillsConfig,
    tracing::{debug, info, warn},
};

use crate::{
    discover,
    error::{Error, Result},
    template::Template,
    types::{REFERENCES_DIR, SKILL_DOCUMENT, SkillPath, check_category},
};

/// How a skill's canonical directory gets its content.
#[derive(Debug, Clone, Default)]
pub struct MaterializeOptions {
    /// Pre-authored source: a directory copied as the skill tree, or a single
    /// file copied as `SKILL.md`. Falls back to the configured library.
    pub source: Option<PathBuf>,
    /// Document synthesized when no source is available.
    pub template: Template,
    /// Create an empty `references/` subtree.
    pub with_references: bool,
}

/// What [`SkillStore::materialize`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    /// Document written from a template.
    Created,
    /// Content copied from a pre-authored source.
    Copied { from: PathBuf },
    /// A document was already present; nothing was written.
    Exists,
}

/// Canonical store rooted at `<root>/<skills_dir>`.
#[derive(Debug, Clone)]
pub struct SkillStore {
    root: PathBuf,
    config: SkillsConfig,
}

impl SkillStore {
    pub fn new(root: impl Into<PathBuf>, config: SkillsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            root: root.into(),
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SkillsConfig {
        &self.config
    }

    /// Absolute store directory.
    pub fn skills_dir(&self) -> PathBuf {
        self.root.join(&self.config.skills_dir)
    }

    /// Parse a `category/name` string against this store's categories.
    pub fn skill(&self, raw: &str) -> Result<SkillPath> {
        SkillPath::resolve(raw, &self.config)
    }

    pub fn skill_dir(&self, skill: &SkillPath) -> PathBuf {
        self.skills_dir().join(skill.relative_path())
    }

    pub fn document_path(&self, skill: &SkillPath) -> PathBuf {
        self.skill_dir(skill).join(SKILL_DOCUMENT)
    }

    /// Create every category directory. Existing ones are left alone.
    pub fn ensure_categories(&self) -> Result<()> {
        for category in &self.config.categories {
            let dir = self.skills_dir().join(category);
            if dir.is_dir() {
                debug!(dir = %dir.display(), "category exists");
                continue;
            }
            std::fs::create_dir_all(&dir).map_err(|e| Error::write(&dir, e))?;
            info!(dir = %dir.display(), "created category");
        }
        Ok(())
    }

    /// Skills of one category, lexicographic.
    pub fn list_category(&self, category: &str) -> Result<Vec<SkillPath>> {
        check_category(&self.config, category)?;
        discover::discover_category(&self.skills_dir(), category)
    }

    /// Skills of every category, categories in configured order.
    pub fn list_skills(&self) -> Result<Vec<SkillPath>> {
        let mut skills = Vec::new();
        for category in &self.config.categories {
            skills.extend(discover::discover_category(&self.skills_dir(), category)?);
        }
        Ok(skills)
    }

    /// Pre-authored library entry for a skill: `<library>/<path>` as a
    /// directory, or `<library>/<path>.md` as a single document.
    pub fn library_source(&self, skill: &SkillPath) -> Option<PathBuf> {
        let library = self.root.join(self.config.library_dir.as_ref()?);
        let dir = library.join(skill.relative_path());
        if dir.is_dir() {
            return Some(dir);
        }
        let mut file = dir.into_os_string();
        file.push(".md");
        let file = PathBuf::from(file);
        file.is_file().then_some(file)
    }

    /// Create the skill's canonical directory and document.
    ///
    /// Never overwrites: if `SKILL.md` already exists the document is left
    /// untouched and [`Materialized::Exists`] is returned. A requested
    /// `references/` subtree is still added.
    pub fn materialize(
        &self,
        skill: &SkillPath,
        options: &MaterializeOptions,
    ) -> Result<Materialized> {
        check_category(&self.config, skill.category())?;
        let dir = self.skill_dir(skill);
        let document = dir.join(SKILL_DOCUMENT);

        match std::fs::symlink_metadata(&document) {
            Ok(_) => {
                debug!(skill = %skill, "skill document exists, skipping");
                if options.with_references {
                    create_references(&dir)?;
                }
                return Ok(Materialized::Exists);
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {},
            Err(e) => return Err(Error::read(&document, e)),
        }

        let source = options
            .source
            .clone()
            .or_else(|| self.library_source(skill));

        let outcome = match source {
            Some(from) => {
                let meta = std::fs::metadata(&from).map_err(|e| Error::read(&from, e))?;
                if meta.is_dir() {
                    copy_dir_recursive(&from, &dir)?;
                    if !document.is_file() {
                        warn!(skill = %skill, from = %from.display(), "copied skill has no SKILL.md");
                    }
                } else {
                    create_dir(&dir)?;
                    std::fs::copy(&from, &document).map_err(|source| Error::Copy {
                        from: from.clone(),
                        to: document.clone(),
                        source,
                    })?;
                }
                info!(skill = %skill, from = %from.display(), "copied skill");
                Materialized::Copied { from }
            },
            None => {
                create_dir(&dir)?;
                if !write_new(&document, &options.template.render(skill.leaf()))? {
                    return Ok(Materialized::Exists);
                }
                info!(skill = %skill, path = %document.display(), "created skill");
                Materialized::Created
            },
        };

        if options.with_references {
            create_references(&dir)?;
        }

        Ok(outcome)
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| Error::write(dir, e))
}

fn create_references(skill_dir: &Path) -> Result<()> {
    let references = skill_dir.join(REFERENCES_DIR);
    create_dir(&references)?;
    write_new(&references.join(".keep"), "")?;
    Ok(())
}

/// Write a file only if nothing exists at `path`. Returns `false` when an
/// entry was already there.
fn write_new(path: &Path, content: &str) -> Result<bool> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(Error::write(path, e)),
    };
    file.write_all(content.as_bytes())
        .map_err(|e| Error::write(path, e))?;
    Ok(true)
}

/// Recursively copy a directory, keeping any file already present at the
/// destination. Symlinks inside the source are not followed.
fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    create_dir(dest)?;

    for entry in walkdir::WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);

        if entry.file_type().is_symlink() {
            warn!(path = %entry.path().display(), "skipping symlink in skill source");
            continue;
        }
        if entry.file_type().is_dir() {
            create_dir(&target)?;
            continue;
        }
        if std::fs::symlink_metadata(&target).is_ok() {
            debug!(path = %target.display(), "file exists, not copying");
            continue;
        }
        if let Some(parent) = target.parent() {
            create_dir(parent)?;
        }
        std::fs::copy(entry.path(), &target).map_err(|source| Error::Copy {
            from: entry.path().to_path_buf(),
            to: target.clone(),
            source,
        })?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, crate::validate::validate};

    fn store(root: &Path) -> SkillStore {
        SkillStore::new(root, SkillsConfig::default()).unwrap()
    }

    #[test]
    fn ensure_categories_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        store.ensure_categories().unwrap();
        std::fs::write(tmp.path().join("skills/stack/marker"), "x").unwrap();
        store.ensure_categories().unwrap();

        for category in ["domains", "stack", "workflows"] {
            assert!(tmp.path().join("skills").join(category).is_dir());
        }
        assert!(tmp.path().join("skills/stack/marker").is_file());
    }

    #[test]
    fn new_rejects_invalid_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = SkillsConfig::with_targets(Vec::<PathBuf>::new());
        assert!(matches!(
            SkillStore::new(tmp.path(), config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn materialize_writes_default_template() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let skill = store.skill("stack/ruby/rails-models").unwrap();

        let outcome = store
            .materialize(&skill, &MaterializeOptions::default())
            .unwrap();
        assert_eq!(outcome, Materialized::Created);

        let document = tmp.path().join("skills/stack/ruby/rails-models/SKILL.md");
        let content = std::fs::read_to_string(&document).unwrap();
        assert!(content.starts_with("---\nname: rails-models\n"));
        assert!(content.contains("# Rails models"));
        assert!(validate(&document).unwrap().is_empty());
    }

    #[test]
    fn materialize_never_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let skill = store.skill("workflows/commit").unwrap();
        let dir = store.skill_dir(&skill);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("SKILL.md"), "hand written").unwrap();

        let outcome = store
            .materialize(&skill, &MaterializeOptions::default())
            .unwrap();
        assert_eq!(outcome, Materialized::Exists);
        assert_eq!(
            std::fs::read_to_string(dir.join("SKILL.md")).unwrap(),
            "hand written"
        );
    }

    #[test]
    fn references_are_added_to_existing_skill() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let skill = store.skill("workflows/commit").unwrap();
        let dir = store.skill_dir(&skill);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("SKILL.md"), "hand written").unwrap();

        let outcome = store
            .materialize(&skill, &MaterializeOptions {
                with_references: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(outcome, Materialized::Exists);
        assert!(dir.join("references/.keep").is_file());
        assert_eq!(
            std::fs::read_to_string(dir.join("SKILL.md")).unwrap(),
            "hand written"
        );
    }

    #[cfg(unix)]
    #[test]
    fn uninspectable_document_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        // A file where the skill directory should be.
        std::fs::create_dir_all(tmp.path().join("skills/workflows")).unwrap();
        std::fs::write(tmp.path().join("skills/workflows/commit"), "x").unwrap();

        let skill = store.skill("workflows/commit").unwrap();
        let err = store
            .materialize(&skill, &MaterializeOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn materialize_copies_source_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("library-src");
        std::fs::create_dir_all(source.join("references")).unwrap();
        std::fs::write(
            source.join("SKILL.md"),
            "---\nname: hotwire\ndescription: Turbo and Stimulus\n---\n",
        )
        .unwrap();
        std::fs::write(source.join("references/turbo.md"), "# Turbo").unwrap();

        let store = store(tmp.path());
        let skill = store.skill("stack/hotwire").unwrap();
        let outcome = store
            .materialize(&skill, &MaterializeOptions {
                source: Some(source.clone()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(outcome, Materialized::Copied { from: source });
        let dir = store.skill_dir(&skill);
        assert!(dir.join("references/turbo.md").is_file());
        assert!(validate(&dir.join("SKILL.md")).unwrap().is_empty());
    }

    #[test]
    fn materialize_copies_single_file_as_document() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("commit.md");
        std::fs::write(&source, "---\nname: commit\ndescription: Commits\n---\n").unwrap();

        let store = store(tmp.path());
        let skill = store.skill("workflows/commit").unwrap();
        store
            .materialize(&skill, &MaterializeOptions {
                source: Some(source),
                ..Default::default()
            })
            .unwrap();
        assert!(store.document_path(&skill).is_file());
    }

    #[test]
    fn missing_explicit_source_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let skill = store.skill("workflows/commit").unwrap();
        let err = store
            .materialize(&skill, &MaterializeOptions {
                source: Some(tmp.path().join("nope")),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn library_is_used_when_present() {
        let tmp = tempfile::tempdir().unwrap();
        let library = tmp.path().join("library");
        std::fs::create_dir_all(library.join("stack/rspec")).unwrap();
        std::fs::write(
            library.join("stack/rspec/SKILL.md"),
            "---\nname: rspec\ndescription: RSpec testing\n---\n",
        )
        .unwrap();
        std::fs::create_dir_all(library.join("workflows")).unwrap();
        std::fs::write(
            library.join("workflows/commit.md"),
            "---\nname: commit\ndescription: Commits\n---\n",
        )
        .unwrap();

        let config = SkillsConfig {
            library_dir: Some(PathBuf::from("library")),
            ..SkillsConfig::default()
        };
        let store = SkillStore::new(tmp.path(), config).unwrap();

        let rspec = store.skill("stack/rspec").unwrap();
        assert!(matches!(
            store.materialize(&rspec, &MaterializeOptions::default()).unwrap(),
            Materialized::Copied { .. }
        ));
        let commit = store.skill("workflows/commit").unwrap();
        assert!(matches!(
            store.materialize(&commit, &MaterializeOptions::default()).unwrap(),
            Materialized::Copied { .. }
        ));
        let other = store.skill("domains/billing").unwrap();
        assert_eq!(
            store.materialize(&other, &MaterializeOptions::default()).unwrap(),
            Materialized::Created
        );
    }

    #[test]
    fn references_subtree_is_optional() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let skill = store.skill("domains/billing").unwrap();
        store
            .materialize(&skill, &MaterializeOptions {
                template: Template::Authored {
                    description: Some("Billing rules".into()),
                },
                with_references: true,
                ..Default::default()
            })
            .unwrap();

        let dir = store.skill_dir(&skill);
        assert!(dir.join("references/.keep").is_file());
        let content = std::fs::read_to_string(dir.join("SKILL.md")).unwrap();
        assert!(content.contains("description: Billing rules"));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        assert!(matches!(
            store.skill("rules/ruby"),
            Err(Error::UnknownCategory { .. })
        ));
        assert!(store.list_category("rules").is_err());
    }

    #[test]
    fn list_skills_follows_category_order() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        for raw in ["workflows/commit", "domains/billing", "stack/ruby"] {
            let skill = store.skill(raw).unwrap();
            store
                .materialize(&skill, &MaterializeOptions::default())
                .unwrap();
        }

        let listed: Vec<String> = store
            .list_skills()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(listed, vec![
            "domains/billing",
            "stack/ruby",
            "workflows/commit"
        ]);
    }
}
