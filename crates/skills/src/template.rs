//! Documents synthesized for skills that have no pre-authored source.

use serde_yaml::Value;

/// Which synthesized document to write for a new skill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Template {
    /// Short placeholder used when installing skill sets in bulk.
    #[default]
    Default,
    /// Fuller scaffold used when a single skill is created by hand.
    Authored { description: Option<String> },
}

impl Template {
    /// Render the `SKILL.md` text for a skill named `leaf`.
    pub fn render(&self, leaf: &str) -> String {
        match self {
            Self::Default => default_document(leaf),
            Self::Authored { description } => authored_document(leaf, description.as_deref()),
        }
    }
}

/// `rails-models` → `Rails models`.
pub fn humanize(name: &str) -> String {
    let spaced = name.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn default_document(leaf: &str) -> String {
    let title = humanize(leaf);
    format!(
        "---\nname: {name}\ndescription: {description}\nversion: 1.0.0\n---\n\n# {title}\n\nAdd your skill content here.\n",
        name = yaml_scalar(leaf),
        description = yaml_scalar(&format!("{title} skill")),
    )
}

pub fn authored_document(leaf: &str, description: Option<&str>) -> String {
    let description = description
        .map(str::to_string)
        .unwrap_or_else(|| format!("Custom skill for {}", leaf.replace('-', " ")));
    let title = humanize(leaf);
    format!(
        "---\n\
         name: {name}\n\
         description: {quoted}\n\
         version: 1.0.0\n\
         ---\n\
         \n\
         # {title}\n\
         \n\
         ## Quick Reference\n\
         \n\
         | Command | Purpose |\n\
         |---------|---------|\n\
         | TODO    | Add commands here |\n\
         \n\
         ## Overview\n\
         \n\
         {description}\n\
         \n\
         ## Usage\n\
         \n\
         Add usage examples and patterns here.\n",
        name = yaml_scalar(leaf),
        quoted = yaml_scalar(&description),
    )
}

/// Emit `text` as a plain YAML scalar when it reads back as the same string,
/// otherwise as a double-quoted scalar.
fn yaml_scalar(text: &str) -> String {
    let plain = serde_yaml::from_str::<Value>(text)
        .is_ok_and(|v| v.as_str() == Some(text));
    if plain && !text.contains('\n') {
        return text.to_string();
    }
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text.escape_default()))
}
