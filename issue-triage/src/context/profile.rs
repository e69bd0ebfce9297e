//! Repository profiles and the `PROJECT.md` format they are read from.

use serde::Serialize;

/// Descriptive metadata about a portfolio project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryProfile {
    pub name: String,
    pub description: String,
    pub tech_stack: String,
    pub platforms: String,
    pub status: String,
    /// Features already shipped, in document order.
    pub existing_features: Vec<String>,
}

impl RepositoryProfile {
    /// Profile used when nothing is known about a repository.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "unknown".to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    TechStack,
    Services,
    Backlog,
    Other,
}

/// Value of a `**Field**: value` line, if `line` carries `field`.
fn field_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let marker = format!("**{field}**:");
    line.find(&marker)
        .map(|start| line[start + marker.len()..].trim())
}

fn bullet_text(line: &str) -> Option<String> {
    let item = line.strip_prefix('-').or_else(|| line.strip_prefix('*'))?;
    let cleaned = item.replace("**", "");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Parses a `PROJECT.md` document.
///
/// Recognised content:
/// - `**Name**:`, `**Description**:`, `**Platforms**:`, `**Status**:` lines
/// - bullets under `## Tech Stack`, joined with `; `
/// - bullets under `## Services` and `**DONE**:` entries under `## Backlog`,
///   collected as existing features
///
/// `fallback_name` is used when the document has no `**Name**:` line.
#[must_use]
pub fn parse_project_document(content: &str, fallback_name: &str) -> RepositoryProfile {
    let mut profile = RepositoryProfile::unknown(fallback_name);
    let mut tech_stack: Vec<String> = Vec::new();
    let mut section = Section::Other;

    for raw in content.lines() {
        let line = raw.trim();

        if let Some(value) = field_value(line, "Name") {
            profile.name = value.to_string();
        } else if let Some(value) = field_value(line, "Description") {
            profile.description = value.to_string();
        } else if let Some(value) = field_value(line, "Platforms") {
            profile.platforms = value.to_string();
        } else if let Some(value) = field_value(line, "Status") {
            profile.status = value.to_string();
        } else if line.starts_with('#') {
            let heading = line.trim_start_matches('#').trim();
            section = match heading {
                h if h.starts_with("Tech Stack") => Section::TechStack,
                h if h.starts_with("Services") => Section::Services,
                h if h.starts_with("Backlog") => Section::Backlog,
                _ => Section::Other,
            };
        } else {
            match section {
                Section::TechStack => tech_stack.extend(bullet_text(line)),
                Section::Services => profile.existing_features.extend(bullet_text(line)),
                Section::Backlog => {
                    if let Some(done) = field_value(line, "DONE") {
                        if !done.is_empty() {
                            profile.existing_features.push(done.to_string());
                        }
                    }
                }
                Section::Other => {}
            }
        }
    }

    profile.tech_stack = tech_stack.join("; ");
    profile
}
