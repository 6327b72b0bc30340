//! Manifest validation producing human-readable defects.
//!
//! Defects are data-quality findings and are returned as an ordered list.
//! Only unexpected I/O failures (anything other than a missing file) are
//! errors.

use std::{
    fmt,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use {serde::Serialize, tracing::debug};

use crate::{
    error::{Error, Result},
    parse::{self, ManifestError},
    store::SkillStore,
    types::SkillPath,
};

/// Header keys every manifest must carry, in reporting order.
pub const REQUIRED_KEYS: &[&str] = &["name", "description"];

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Defect {
    FileNotFound { path: PathBuf },
    EmptyFile,
    MissingDelimiters,
    InvalidYaml { message: String },
    NotAMapping,
    MissingKey { key: &'static str },
    EmptyValue { key: &'static str },
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound { path } => write!(f, "File not found: {}", path.display()),
            Self::EmptyFile => f.write_str("File is empty"),
            Self::MissingDelimiters => f.write_str("Missing YAML frontmatter delimiters (---)"),
            Self::InvalidYaml { message } => write!(f, "Invalid YAML in frontmatter: {message}"),
            Self::NotAMapping => f.write_str("Frontmatter is not a valid YAML mapping"),
            Self::MissingKey { key } => write!(f, "Missing required key: {key}"),
            Self::EmptyValue { key } => write!(f, "Value for '{key}' cannot be empty"),
        }
    }
}

impl Serialize for Defect {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Validate the document at `path`. An empty list means valid.
pub fn validate(path: &Path) -> Result<Vec<Defect>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(vec![Defect::FileNotFound {
                path: path.to_path_buf(),
            }]);
        },
        Err(e) => return Err(Error::read(path, e)),
    };
    let defects = validate_content(&content);
    debug!(path = %path.display(), defects = defects.len(), "validated skill document");
    Ok(defects)
}

/// `true` iff [`validate`] reports no defects.
pub fn is_valid(path: &Path) -> Result<bool> {
    Ok(validate(path)?.is_empty())
}

/// Validate in-memory document text.
pub fn validate_content(content: &str) -> Vec<Defect> {
    if content.trim().is_empty() {
        return vec![Defect::EmptyFile];
    }

    let manifest = match parse::parse_manifest(content) {
        Ok(manifest) => manifest,
        Err(ManifestError::MissingHeader) => return vec![Defect::MissingDelimiters],
        Err(ManifestError::MalformedHeader(message)) => {
            return vec![Defect::InvalidYaml { message }];
        },
        Err(ManifestError::NotAMapping) => return vec![Defect::NotAMapping],
    };

    REQUIRED_KEYS
        .iter()
        .filter_map(|&key| match manifest.get(key) {
            None => Some(Defect::MissingKey { key }),
            Some(value) if parse::is_blank(value) => Some(Defect::EmptyValue { key }),
            Some(_) => None,
        })
        .collect()
}

/// Validation result for one skill of the store.
#[derive(Debug, Clone, Serialize)]
pub struct SkillReport {
    pub skill: SkillPath,
    pub path: PathBuf,
    pub defects: Vec<Defect>,
}

impl SkillReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.defects.is_empty()
    }
}

/// Validate the document of every skill in the store, in enumeration order.
pub fn validate_store(store: &SkillStore) -> Result<Vec<SkillReport>> {
    store
        .list_skills()?
        .into_iter()
        .map(|skill| {
            let path = store.document_path(&skill);
            let defects = validate(&path)?;
            Ok(SkillReport {
                skill,
                path,
                defects,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, rstest::rstest};

    fn messages(defects: &[Defect]) -> Vec<String> {
        defects.iter().map(ToString::to_string).collect()
    }

    fn write_skill(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("SKILL.md");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn valid_document_has_no_defects() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_skill(
            tmp.path(),
            "---\nname: my-skill\ndescription: A useful skill\n---\n\n# My Skill\n",
        );
        assert!(validate(&path).unwrap().is_empty());
        assert!(is_valid(&path).unwrap());
    }

    #[test]
    fn extra_keys_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_skill(
            tmp.path(),
            "---\nname: my-skill\ndescription: A useful skill\nversion: 1.0.0\n---\n\n# My Skill\n",
        );
        assert!(is_valid(&path).unwrap());
    }

    #[test]
    fn missing_file_is_a_single_defect() {
        let path = Path::new("/nonexistent/SKILL.md");
        let defects = validate(path).unwrap();
        assert_eq!(messages(&defects), vec!["File not found: /nonexistent/SKILL.md"]);
        assert!(!is_valid(path).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_path_is_an_error_not_a_defect() {
        let tmp = tempfile::tempdir().unwrap();
        // Reading a directory fails with something other than NotFound.
        assert!(matches!(validate(tmp.path()), Err(Error::Read { .. })));
    }

    #[test]
    fn non_utf8_content_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("SKILL.md");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(validate(&path).is_err());
    }

    #[test]
    fn duplicate_keys_are_malformed() {
        let defects = validate_content("---\nname: a\nname: b\ndescription: c\n---\n");
        assert_eq!(defects.len(), 1);
        let message = defects[0].to_string();
        assert!(message.starts_with("Invalid YAML in frontmatter: "));
        assert!(message.contains("duplicate"));
    }

    #[rstest]
    #[case::empty("", &["File is empty"])]
    #[case::whitespace("   \n  \n", &["File is empty"])]
    #[case::no_header(
        "name: my-skill\ndescription: A useful skill\n\n# My Skill\n",
        &["Missing YAML frontmatter delimiters (---)"]
    )]
    #[case::indented_header(
        "  ---\nname: a\ndescription: b\n---\n",
        &["Missing YAML frontmatter delimiters (---)"]
    )]
    #[case::scalar_header("---\njust text\n---\n", &["Frontmatter is not a valid YAML mapping"])]
    #[case::sequence_header("---\n- a\n---\n", &["Frontmatter is not a valid YAML mapping"])]
    #[case::empty_mapping(
        "---\n{}\n---\n",
        &["Missing required key: name", "Missing required key: description"]
    )]
    #[case::only_version(
        "---\nversion: 1.0.0\n---\n\n# Bad Skill\n",
        &["Missing required key: name", "Missing required key: description"]
    )]
    #[case::missing_name(
        "---\ndescription: A useful skill\n---\n",
        &["Missing required key: name"]
    )]
    #[case::missing_description("---\nname: my-skill\n---\n", &["Missing required key: description"])]
    #[case::empty_name(
        "---\nname: \"\"\ndescription: A useful skill\n---\n",
        &["Value for 'name' cannot be empty"]
    )]
    #[case::empty_description(
        "---\nname: my-skill\ndescription: \"\"\n---\n",
        &["Value for 'description' cannot be empty"]
    )]
    #[case::null_and_blank(
        "---\nname:\ndescription: \"   \"\n---\n",
        &["Value for 'name' cannot be empty", "Value for 'description' cannot be empty"]
    )]
    #[case::missing_and_empty(
        "---\ndescription: ''\n---\n",
        &["Missing required key: name", "Value for 'description' cannot be empty"]
    )]
    #[case::numeric_values("---\nname: 42\ndescription: true\n---\n", &[])]
    fn content_defects(#[case] content: &str, #[case] expected: &[&str]) {
        assert_eq!(messages(&validate_content(content)), expected);
    }

    #[test]
    fn invalid_yaml_is_prefixed() {
        let defects = validate_content("---\nname: [unclosed\ndescription: x\n---\n");
        assert_eq!(defects.len(), 1);
        assert!(matches!(defects[0], Defect::InvalidYaml { .. }));
        assert!(
            defects[0]
                .to_string()
                .starts_with("Invalid YAML in frontmatter: ")
        );
    }

    #[test]
    fn defects_serialize_as_messages() {
        let json = serde_json::to_string(&[Defect::EmptyFile, Defect::MissingKey {
            key: "name",
        }])
        .unwrap();
        assert_eq!(json, r#"["File is empty","Missing required key: name"]"#);
    }
}
