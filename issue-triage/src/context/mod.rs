//! Repository context used to contextualize generated issue bodies.

mod profile;

pub use profile::{parse_project_document, RepositoryProfile};

use crate::repository::Repository;
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::{debug, warn};

/// Document read from each repository.
pub const PROJECT_DOCUMENT: &str = "PROJECT.md";

/// Supplies a profile for a repository.
///
/// Implementations never fail: when nothing is available they return
/// [`RepositoryProfile::unknown`].
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Returns the profile of `repository`.
    async fn profile(&self, repository: &Repository) -> RepositoryProfile;
}

/// Reads `PROJECT.md` from the repository's default branch.
#[derive(Debug, Clone)]
pub struct GitHubContextProvider {
    octocrab: Octocrab,
}

impl GitHubContextProvider {
    /// Creates a provider using an authenticated client.
    #[must_use]
    pub fn new(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    async fn fetch_document(
        &self,
        repository: &Repository,
    ) -> Result<Option<String>, octocrab::Error> {
        let content = self
            .octocrab
            .repos(&repository.owner, &repository.name)
            .get_content()
            .path(PROJECT_DOCUMENT)
            .send()
            .await?;

        Ok(content
            .items
            .into_iter()
            .next()
            .and_then(|item| item.decoded_content()))
    }
}

#[async_trait]
impl ContextProvider for GitHubContextProvider {
    async fn profile(&self, repository: &Repository) -> RepositoryProfile {
        match self.fetch_document(repository).await {
            Ok(Some(content)) => {
                debug!(repo = %repository, bytes = content.len(), "Parsed project document");
                parse_project_document(&content, &repository.name)
            }
            Ok(None) => {
                debug!(repo = %repository, "Project document is empty or not a file");
                RepositoryProfile::unknown(&repository.name)
            }
            Err(e) => {
                warn!(repo = %repository, error = %e, "Project document unavailable");
                RepositoryProfile::unknown(&repository.name)
            }
        }
    }
}
