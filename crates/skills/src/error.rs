use std::path::PathBuf;

/// Operational failures. Validation defects are not errors; see
/// [`crate::validate::Defect`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] skillport_config::Error),
    #[error("invalid skill path '{path}': {reason}")]
    InvalidSkillPath { path: String, reason: &'static str },
    #[error("unknown category '{category}' (expected one of: {allowed})")]
    UnknownCategory { category: String, allowed: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Walkdir(#[from] walkdir::Error),
    #[error("failed to project '{skill}' into {target}: {source}")]
    Link {
        target: PathBuf,
        skill: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot project '{skill}' into {target}: symlinks are not supported on this platform")]
    Unsupported { target: PathBuf, skill: String },
}

impl Error {
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn link(target: impl Into<PathBuf>, skill: impl Into<String>, source: std::io::Error) -> Self {
        Self::Link {
            target: target.into(),
            skill: skill.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
