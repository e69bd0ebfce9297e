//! Backlog snapshots and grouping.

use super::TriageSession;
use crate::repository::Repository;
use crate::tracker::{IssueTracker, TrackerIssue};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

/// Repositories listed concurrently during a snapshot.
const LISTING_CONCURRENCY: usize = 4;

/// An open issue waiting for an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogItem {
    pub repository: Repository,
    pub number: u64,
    pub title: String,
    pub url: String,
    pub current_labels: Vec<String>,
}

impl BacklogItem {
    fn from_issue(repository: &Repository, issue: TrackerIssue) -> Self {
        Self {
            repository: repository.clone(),
            number: issue.number,
            title: issue.title,
            url: issue.url,
            current_labels: issue.labels,
        }
    }

    /// True if any label mentions `bug`.
    #[must_use]
    pub fn is_bug(&self) -> bool {
        self.current_labels
            .iter()
            .any(|label| label.to_lowercase().contains("bug"))
    }
}

/// Issues of one repository, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryGroup {
    pub repository: Repository,
    pub items: Vec<BacklogItem>,
}

/// Lists open issues of `repositories` that carry none of `excluded_labels`.
///
/// Listings run concurrently but results keep the order of `repositories`. A
/// repository whose listing fails is logged and left out.
pub async fn snapshot(
    tracker: &dyn IssueTracker,
    repositories: &[Repository],
    excluded_labels: &[String],
) -> Vec<BacklogItem> {
    let listings: Vec<_> = stream::iter(repositories)
        .map(|repo| async move { (repo, tracker.list_open_issues(repo).await) })
        .buffered(LISTING_CONCURRENCY)
        .collect()
        .await;

    let mut items = Vec::new();
    for (repo, listing) in listings {
        match listing {
            Ok(issues) => {
                let before = items.len();
                items.extend(
                    issues
                        .into_iter()
                        .filter(|issue| {
                            !issue
                                .labels
                                .iter()
                                .any(|label| excluded_labels.contains(label))
                        })
                        .map(|issue| BacklogItem::from_issue(repo, issue)),
                );
                debug!(repo = %repo, unassigned = items.len() - before, "Repository listed");
            }
            Err(e) => warn!(repo = %repo, error = %e, "Listing failed, repository left out"),
        }
    }
    items
}

/// Groups items by repository in order of first appearance, bug-labelled
/// issues first and then by ascending number. Issues skipped in `session` are
/// left out; groups left empty are dropped.
#[must_use]
pub fn group(items: Vec<BacklogItem>, session: &TriageSession) -> Vec<RepositoryGroup> {
    let mut groups: Vec<RepositoryGroup> = Vec::new();

    for item in items {
        if session.is_skipped(&item.repository, item.number) {
            continue;
        }
        match groups.iter_mut().find(|g| g.repository == item.repository) {
            Some(group) => group.items.push(item),
            None => groups.push(RepositoryGroup {
                repository: item.repository.clone(),
                items: vec![item],
            }),
        }
    }

    for group in &mut groups {
        group
            .items
            .sort_by_key(|item| (!item.is_bug(), item.number));
    }
    groups
}
