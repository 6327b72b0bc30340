//! Skill store, manifest validation and projection.
//!
//! Skills live once in a categorized store (`skills/<category>/<name>/SKILL.md`)
//! and are exposed to consumer tools by relative symlinks in flat target
//! directories. Each `SKILL.md` starts with a YAML header carrying at least
//! `name` and `description`.

pub mod discover;
pub mod error;
pub mod parse;
pub mod projection;
pub mod store;
pub mod template;
pub mod types;
pub mod validate;

pub use {
    error::{Error, Result},
    parse::{Manifest, ManifestError, parse_manifest},
    projection::{ProjectionEngine, ProjectionEntry, ProjectionReport, ProjectionStatus},
    store::{MaterializeOptions, Materialized, SkillStore},
    template::Template,
    types::{SKILL_DOCUMENT, SkillPath},
    validate::{Defect, SkillReport, is_valid, validate, validate_store},
};
