//! Issue tracker access.
//!
//! Handlers talk to the tracker through [`IssueTracker`] so the flows can be
//! exercised against in-memory fakes. [`GitHubTracker`] is the production
//! implementation.

mod error;
mod github;

pub use error::TrackerError;
pub use github::GitHubTracker;

use crate::repository::Repository;
use async_trait::async_trait;

/// Issue to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
}

/// Issue returned by the tracker after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    pub number: u64,
    pub url: String,
}

/// An open issue as listed by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerIssue {
    pub number: u64,
    pub title: String,
    pub labels: Vec<String>,
    pub url: String,
    pub body: Option<String>,
}

/// A single issue looked up by number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDetails {
    pub title: String,
    pub url: String,
    pub labels: Vec<String>,
    pub repository: Repository,
}

/// Why an issue is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    NotPlanned,
    Completed,
}

impl CloseReason {
    /// Value of the tracker's `state_reason` field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotPlanned => "not_planned",
            Self::Completed => "completed",
        }
    }
}

/// A label that must exist before it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDefinition {
    pub name: String,
    pub color: String,
    pub description: String,
}

/// Operations the bot performs on issues.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Creates an issue.
    async fn create_issue(
        &self,
        repository: &Repository,
        issue: NewIssue,
    ) -> Result<CreatedIssue, TrackerError>;

    /// Lists open issues, pull requests excluded.
    async fn list_open_issues(
        &self,
        repository: &Repository,
    ) -> Result<Vec<TrackerIssue>, TrackerError>;

    /// Looks up a single issue.
    async fn view_issue(
        &self,
        repository: &Repository,
        number: u64,
    ) -> Result<IssueDetails, TrackerError>;

    /// Adds labels to an issue.
    async fn add_labels(
        &self,
        repository: &Repository,
        number: u64,
        labels: &[String],
    ) -> Result<(), TrackerError>;

    /// Removes one label from an issue.
    async fn remove_label(
        &self,
        repository: &Repository,
        number: u64,
        label: &str,
    ) -> Result<(), TrackerError>;

    /// Adds assignees to an issue.
    async fn add_assignees(
        &self,
        repository: &Repository,
        number: u64,
        assignees: &[String],
    ) -> Result<(), TrackerError>;

    /// Closes an issue.
    async fn close_issue(
        &self,
        repository: &Repository,
        number: u64,
        reason: CloseReason,
    ) -> Result<(), TrackerError>;

    /// Posts a comment on an issue.
    async fn comment(
        &self,
        repository: &Repository,
        number: u64,
        body: &str,
    ) -> Result<(), TrackerError>;

    /// Creates the label if the repository does not have it yet.
    async fn ensure_label(
        &self,
        repository: &Repository,
        label: &LabelDefinition,
    ) -> Result<(), TrackerError>;
}
