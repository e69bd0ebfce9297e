//! Persisted triage session document.

use crate::repository::{InvalidReference, Repository};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prompt ids kept for invalidation, besides the active one.
pub const HISTORY_LIMIT: usize = 10;

/// Issue currently presented to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingIssue {
    /// Full name, `owner/name`.
    pub repo: String,
    pub repo_short: String,
    #[serde(with = "number_text")]
    pub number: u64,
    pub title: String,
}

impl PendingIssue {
    /// Creates the pending entry for an issue of `repository`.
    pub fn new(repository: &Repository, number: u64, title: impl Into<String>) -> Self {
        Self {
            repo: repository.full_name(),
            repo_short: repository.name.clone(),
            number,
            title: title.into(),
        }
    }

    /// Repository of the pending issue.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidReference`] if the stored name is not `owner/name`.
    pub fn repository(&self) -> Result<Repository, InvalidReference> {
        self.repo.parse()
    }
}

/// State of the operator's triage walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageSession {
    #[serde(default)]
    pub active_message_id: Option<String>,

    #[serde(default)]
    pub history: Vec<String>,

    /// Written as `{}` when nothing is pending.
    #[serde(default, with = "pending_or_empty")]
    pub pending_issue: Option<PendingIssue>,

    /// Issues passed over with `salta` since the walk started.
    #[serde(default)]
    pub skipped: Vec<(String, u64)>,
}

impl TriageSession {
    /// Makes `id` the active prompt, moving the previous one into the history.
    pub fn record_prompt(&mut self, id: impl Into<String>) {
        if let Some(previous) = self.active_message_id.take() {
            self.history.push(previous);
        }
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
        self.active_message_id = Some(id.into());
    }

    /// Prompt ids the transport should invalidate: history, then the active id.
    #[must_use]
    pub fn stale_prompts(&self) -> Vec<String> {
        self.history
            .iter()
            .cloned()
            .chain(self.active_message_id.clone())
            .collect()
    }

    /// Marks an issue as skipped for the rest of the walk.
    pub fn skip(&mut self, repository: &Repository, number: u64) {
        let key = (repository.full_name(), number);
        if !self.skipped.contains(&key) {
            self.skipped.push(key);
        }
    }

    /// True if the issue was skipped during this walk.
    #[must_use]
    pub fn is_skipped(&self, repository: &Repository, number: u64) -> bool {
        self.skipped
            .iter()
            .any(|(repo, n)| *n == number && repo.eq_ignore_ascii_case(&repository.full_name()))
    }
}

/// `Option<PendingIssue>` as either the issue or an empty object.
mod pending_or_empty {
    use super::{Deserialize, Deserializer, PendingIssue, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Issue(PendingIssue),
        Empty(serde_json::Map<String, serde_json::Value>),
        Null(()),
    }

    pub fn serialize<S: Serializer>(
        value: &Option<PendingIssue>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(issue) => issue.serialize(serializer),
            None => serde_json::Map::new().serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PendingIssue>, D::Error> {
        Ok(match Stored::deserialize(deserializer)? {
            Stored::Issue(issue) => Some(issue),
            Stored::Empty(_) | Stored::Null(()) => None,
        })
    }
}

/// Issue numbers are stored as text; plain numbers are accepted too.
mod number_text {
    use super::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Stored::deserialize(deserializer)? {
            Stored::Number(n) => Ok(n),
            Stored::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}
