//! Structured issue requests.

use super::IssueKind;
use crate::repository::Repository;

/// Characters of the description kept in a title.
const TITLE_SUBJECT_CHARS: usize = 50;

/// Longest title accepted by the tracker workflow.
const MAX_TITLE_CHARS: usize = 60;

/// Marker appended to truncated titles.
const ELLIPSIS: &str = "...";

/// A classified request, ready to be rendered and filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    /// Description as written by the operator.
    pub description: String,

    /// Target repository.
    pub repository: Repository,

    /// Kind of work requested.
    pub kind: IssueKind,

    /// Title derived from `kind` and `description`.
    pub title: String,

    /// Labels to apply, in order and without duplicates.
    pub labels: Vec<String>,
}

impl IssueRequest {
    /// Builds a request, deriving the title from `kind` and `description`.
    pub fn new(
        description: impl Into<String>,
        repository: Repository,
        kind: IssueKind,
        labels: Vec<String>,
    ) -> Self {
        let description = description.into().trim().to_string();
        let title = generate_title(kind, &description);
        let mut unique = Vec::with_capacity(labels.len());
        for label in labels {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        Self {
            description,
            repository,
            kind,
            title,
            labels: unique,
        }
    }

    /// Title without the `{Kind}: ` prefix.
    #[must_use]
    pub fn title_subject(&self) -> &str {
        self.title
            .strip_prefix(self.kind.title_label())
            .and_then(|rest| rest.strip_prefix(": "))
            .unwrap_or(&self.title)
    }

    /// The `/issue` command that reproduces this request.
    #[must_use]
    pub fn original_command(&self) -> String {
        format!("/issue - \"{}\"", self.description)
    }
}

/// Generates the issue title.
///
/// Format: `"{Kind}: {first 50 characters of description}"`, hard-truncated to
/// 57 characters plus `...` when longer than 60 characters.
#[must_use]
pub fn generate_title(kind: IssueKind, description: &str) -> String {
    let subject: String = description.trim().chars().take(TITLE_SUBJECT_CHARS).collect();
    let title = format!("{}: {}", kind.title_label(), subject.trim_end());

    if title.chars().count() > MAX_TITLE_CHARS {
        let kept: String = title
            .chars()
            .take(MAX_TITLE_CHARS - ELLIPSIS.len())
            .collect();
        format!("{kept}{ELLIPSIS}")
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_description_is_kept_whole() {
        assert_eq!(
            generate_title(IssueKind::Feature, "implementare upload file per GridConnect"),
            "Feature: implementare upload file per GridConnect"
        );
    }

    #[test]
    fn long_titles_are_truncated_with_ellipsis() {
        let description = "ottimizzare il caricamento delle immagini nella galleria principale";
        let title = generate_title(IssueKind::Improvement, description);
        assert_eq!(title.chars().count(), 60);
        assert!(title.ends_with("..."));
        assert!(title.starts_with("Improvement: ottimizzare"));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let description = "è".repeat(80);
        let title = generate_title(IssueKind::Improvement, &description);
        assert_eq!(title.chars().count(), 60);
    }

    #[test]
    fn title_subject_strips_prefix() {
        let request = IssueRequest::new(
            "bug login",
            Repository::new("o", "r"),
            IssueKind::Bug,
            vec!["bug".to_string(), "bug".to_string()],
        );
        assert_eq!(request.title_subject(), "bug login");
        assert_eq!(request.labels, vec!["bug".to_string()]);
    }
}
