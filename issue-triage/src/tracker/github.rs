//! GitHub-backed issue tracker.

use super::{
    CloseReason, CreatedIssue, IssueDetails, IssueTracker, LabelDefinition, NewIssue, TrackerError,
    TrackerIssue,
};
use crate::rate_limit::ensure_core_rate_limit;
use crate::repository::Repository;
use async_trait::async_trait;
use octocrab::models::issues::Issue;
use octocrab::{params, Octocrab};
use serde_json::json;
use tracing::{debug, info, info_span, Instrument};

/// Issues requested per listing page.
const PAGE_SIZE: u8 = 100;

/// Issue tracker backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubTracker {
    octocrab: Octocrab,
}

impl GitHubTracker {
    /// Creates a tracker using an authenticated client.
    #[must_use]
    pub fn new(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    async fn guard(&self) -> Result<(), TrackerError> {
        match ensure_core_rate_limit(&self.octocrab).await? {
            Some(reset_at) => Err(TrackerError::RateLimited { reset_at }),
            None => Ok(()),
        }
    }
}

/// Maps HTTP statuses the handlers care about onto typed errors.
fn map_error(error: octocrab::Error, repository: &Repository, number: Option<u64>) -> TrackerError {
    if let octocrab::Error::GitHub { source, .. } = &error {
        match (source.status_code.as_u16(), number) {
            (404, Some(number)) => {
                return TrackerError::NotFound {
                    repo: repository.full_name(),
                    number,
                }
            }
            (403, _) => {
                return TrackerError::PermissionDenied {
                    repo: repository.full_name(),
                }
            }
            _ => {}
        }
    }
    TrackerError::GitHub(error)
}

fn is_not_found(error: &octocrab::Error) -> bool {
    matches!(error, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

fn label_names(issue: &Issue) -> Vec<String> {
    issue.labels.iter().map(|label| label.name.clone()).collect()
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    async fn create_issue(
        &self,
        repository: &Repository,
        issue: NewIssue,
    ) -> Result<CreatedIssue, TrackerError> {
        let span = info_span!("create_issue", repo = %repository);
        async {
            self.guard().await?;
            let created = self
                .octocrab
                .issues(&repository.owner, &repository.name)
                .create(&issue.title)
                .body(&issue.body)
                .labels(issue.labels)
                .assignees(issue.assignees)
                .send()
                .await
                .map_err(|e| map_error(e, repository, None))?;

            info!(issue_number = created.number, "Issue created");
            Ok(CreatedIssue {
                number: created.number,
                url: created.html_url.to_string(),
            })
        }
        .instrument(span)
        .await
    }

    async fn list_open_issues(
        &self,
        repository: &Repository,
    ) -> Result<Vec<TrackerIssue>, TrackerError> {
        let span = info_span!("list_open_issues", repo = %repository);
        async {
            let mut issues = Vec::new();
            let mut page_number: u32 = 1;

            loop {
                self.guard().await?;
                let page = self
                    .octocrab
                    .issues(&repository.owner, &repository.name)
                    .list()
                    .state(params::State::Open)
                    .per_page(PAGE_SIZE)
                    .page(page_number)
                    .send()
                    .await
                    .map_err(|e| map_error(e, repository, None))?;

                let has_next = page.next.is_some();
                issues.extend(
                    page.items
                        .into_iter()
                        .filter(|issue| issue.pull_request.is_none())
                        .map(|issue| TrackerIssue {
                            number: issue.number,
                            labels: label_names(&issue),
                            url: issue.html_url.to_string(),
                            title: issue.title,
                            body: issue.body,
                        }),
                );

                if !has_next {
                    break;
                }
                page_number += 1;
            }

            debug!(count = issues.len(), "Listed open issues");
            Ok(issues)
        }
        .instrument(span)
        .await
    }

    async fn view_issue(
        &self,
        repository: &Repository,
        number: u64,
    ) -> Result<IssueDetails, TrackerError> {
        self.guard().await?;
        let issue = self
            .octocrab
            .issues(&repository.owner, &repository.name)
            .get(number)
            .await
            .map_err(|e| map_error(e, repository, Some(number)))?;

        Ok(IssueDetails {
            labels: label_names(&issue),
            url: issue.html_url.to_string(),
            title: issue.title,
            repository: repository.clone(),
        })
    }

    async fn add_labels(
        &self,
        repository: &Repository,
        number: u64,
        labels: &[String],
    ) -> Result<(), TrackerError> {
        self.guard().await?;
        self.octocrab
            .issues(&repository.owner, &repository.name)
            .add_labels(number, labels)
            .await
            .map_err(|e| map_error(e, repository, Some(number)))?;
        debug!(repo = %repository, issue_number = number, ?labels, "Labels added");
        Ok(())
    }

    async fn remove_label(
        &self,
        repository: &Repository,
        number: u64,
        label: &str,
    ) -> Result<(), TrackerError> {
        self.guard().await?;
        self.octocrab
            .issues(&repository.owner, &repository.name)
            .remove_label(number, label)
            .await
            .map_err(|e| map_error(e, repository, Some(number)))?;
        debug!(repo = %repository, issue_number = number, label, "Label removed");
        Ok(())
    }

    async fn add_assignees(
        &self,
        repository: &Repository,
        number: u64,
        assignees: &[String],
    ) -> Result<(), TrackerError> {
        let assignees: Vec<&str> = assignees.iter().map(String::as_str).collect();
        self.guard().await?;
        self.octocrab
            .issues(&repository.owner, &repository.name)
            .add_assignees(number, &assignees)
            .await
            .map_err(|e| map_error(e, repository, Some(number)))?;
        Ok(())
    }

    async fn close_issue(
        &self,
        repository: &Repository,
        number: u64,
        reason: CloseReason,
    ) -> Result<(), TrackerError> {
        let route = format!(
            "/repos/{}/{}/issues/{number}",
            repository.owner, repository.name
        );
        let payload = json!({ "state": "closed", "state_reason": reason.as_str() });

        self.guard().await?;
        let _: serde_json::Value = self
            .octocrab
            .patch(route, Some(&payload))
            .await
            .map_err(|e| map_error(e, repository, Some(number)))?;
        info!(repo = %repository, issue_number = number, reason = reason.as_str(), "Issue closed");
        Ok(())
    }

    async fn comment(
        &self,
        repository: &Repository,
        number: u64,
        body: &str,
    ) -> Result<(), TrackerError> {
        self.guard().await?;
        self.octocrab
            .issues(&repository.owner, &repository.name)
            .create_comment(number, body)
            .await
            .map_err(|e| map_error(e, repository, Some(number)))?;
        Ok(())
    }

    async fn ensure_label(
        &self,
        repository: &Repository,
        label: &LabelDefinition,
    ) -> Result<(), TrackerError> {
        let issues = self.octocrab.issues(&repository.owner, &repository.name);

        self.guard().await?;
        match issues.get_label(&label.name).await {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => {
                issues
                    .create_label(&label.name, &label.color, &label.description)
                    .await
                    .map_err(|e| map_error(e, repository, None))?;
                info!(repo = %repository, label = %label.name, "Label created");
                Ok(())
            }
            Err(e) => Err(map_error(e, repository, None)),
        }
    }
}
