use std::{io::ErrorKind, path::Path};

use tracing::debug;

use crate::{
    error::{Error, Result},
    types::{REFERENCES_DIR, SKILL_DOCUMENT, SkillPath},
};

/// List the skills under one category directory.
///
/// A subdirectory holding a `SKILL.md` is a skill. One without a document
/// groups nested skills (`stack/ruby/rails-models`) and is descended into;
/// if it has no subdirectories either, it is listed as a skill so validation
/// can report the missing document. Hidden entries and plain files are
/// skipped, and names are visited in lexicographic order so bulk operations
/// are deterministic. A category directory that does not exist yet has no
/// skills.
pub fn discover_category(store_dir: &Path, category: &str) -> Result<Vec<SkillPath>> {
    let category_dir = store_dir.join(category);
    let mut skills = Vec::new();
    for name in child_dirs(&category_dir)? {
        collect(
            &category_dir.join(&name),
            vec![category.to_string(), name],
            &mut skills,
        )?;
    }
    Ok(skills)
}

fn collect(dir: &Path, segments: Vec<String>, skills: &mut Vec<SkillPath>) -> Result<()> {
    if std::fs::symlink_metadata(dir.join(SKILL_DOCUMENT)).is_ok() {
        skills.push(SkillPath::from_segments(segments));
        return Ok(());
    }

    // Linked-in directories are never descended into.
    let is_link = std::fs::symlink_metadata(dir)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);
    let children: Vec<String> = if is_link {
        Vec::new()
    } else {
        child_dirs(dir)?
            .into_iter()
            .filter(|name| *name != REFERENCES_DIR)
            .collect()
    };

    if children.is_empty() {
        debug!(dir = %dir.display(), "skill directory without document");
        skills.push(SkillPath::from_segments(segments));
        return Ok(());
    }
    for name in children {
        let mut nested = segments.clone();
        nested.push(name.clone());
        collect(&dir.join(&name), nested, skills)?;
    }
    Ok(())
}

/// Visible subdirectory names of `dir`, sorted. Missing directories are empty.
fn child_dirs(dir: &Path) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "directory missing");
            return Ok(Vec::new());
        },
        Err(e) => return Err(Error::read(dir, e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::read(dir, e))?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            debug!(entry = ?entry.path(), "skipping non UTF-8 entry");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        // Follows symlinks, so a linked-in skill directory still counts.
        if !entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}
