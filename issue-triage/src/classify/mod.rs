//! Repository and issue-kind classification.
//!
//! Classification never fails: when no keyword matches, the configured
//! default repository and the `feature` kind are used.

mod keywords;
mod kind;
mod request;
mod rules;

pub use keywords::KeywordTable;
pub use kind::IssueKind;
pub use request::{generate_title, IssueRequest};
pub use rules::{builtin_rules, extract, Arity, Extraction, PatternRule};

use crate::config::Settings;
use crate::repository::Repository;
use tracing::debug;

/// Where a classification decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// Keyword hits, with the winning score.
    Keywords { hits: usize },
    /// Nothing matched; the default was used.
    Default,
}

/// Result of classifying a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub repository: Repository,
    pub repository_basis: Basis,
    pub kind: IssueKind,
    pub kind_basis: Basis,
}

/// Keyword-based classifier over the configured portfolio.
#[derive(Debug, Clone)]
pub struct Classifier {
    repositories: KeywordTable<Repository>,
    kinds: KeywordTable<IssueKind>,
    default_repository: Repository,
    rules: Vec<PatternRule>,
}

impl Classifier {
    /// Builds the classifier from settings.
    ///
    /// Each repository's own short name counts as one of its keywords, so a
    /// message naming a project literally leans towards it.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let mut repositories = KeywordTable::new();
        for repo in &settings.repositories {
            let keywords = repo
                .keywords
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(repo.name.as_str()));
            repositories.push(settings.repository(&repo.name), keywords);
        }

        let mut kinds = KeywordTable::new();
        for kind in IssueKind::ALL {
            kinds.push(kind, settings.kinds.for_kind(kind));
        }

        Self {
            repositories,
            kinds,
            default_repository: settings.repository(&settings.default_repository),
            rules: builtin_rules().to_vec(),
        }
    }

    /// Replaces the free-text rules.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<PatternRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Detects the repository `text` is about.
    #[must_use]
    pub fn detect_repository(&self, text: &str) -> (Repository, Basis) {
        match self.repositories.best_match(text) {
            Some((repo, hits)) => (repo.clone(), Basis::Keywords { hits }),
            None => (self.default_repository.clone(), Basis::Default),
        }
    }

    /// Detects the issue kind of `text`.
    #[must_use]
    pub fn detect_kind(&self, text: &str) -> (IssueKind, Basis) {
        match self.kinds.best_match(text) {
            Some((kind, hits)) => (*kind, Basis::Keywords { hits }),
            None => (IssueKind::Feature, Basis::Default),
        }
    }

    /// Classifies `text` by repository and kind.
    #[must_use]
    pub fn classify(&self, text: &str) -> Classification {
        let (repository, repository_basis) = self.detect_repository(text);
        let (kind, kind_basis) = self.detect_kind(text);

        if repository_basis == Basis::Default {
            debug!(repo = %repository, "No repository keyword matched, using default");
        }
        if kind_basis == Basis::Default {
            debug!("No kind keyword matched, defaulting to feature");
        }

        Classification {
            repository,
            repository_basis,
            kind,
            kind_basis,
        }
    }

    /// Builds the request for a slash-command description.
    #[must_use]
    pub fn request_from_description(&self, description: &str) -> IssueRequest {
        let classification = self.classify(description);
        IssueRequest::new(
            description,
            classification.repository,
            classification.kind,
            vec![classification.kind.tracker_label().to_string()],
        )
    }

    /// Builds a request from a free-text message, if one of the phrase rules
    /// matches it.
    #[must_use]
    pub fn request_from_free_text(&self, message: &str) -> Option<IssueRequest> {
        let extraction = extract(&self.rules, message)?;
        let (repository, _) = self.detect_repository(message);
        Some(IssueRequest::new(
            extraction.description,
            repository,
            extraction.kind,
            vec![extraction.kind.free_text_label().to_string()],
        ))
    }
}
