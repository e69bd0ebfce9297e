//! Repository identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A GitHub repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Repository {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name, also used as the short form in triage output.
    pub name: String,
}

impl Repository {
    /// Creates a repository identifier.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Full name in `owner/name` format.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Browser URL of an issue in this repository.
    #[must_use]
    pub fn issue_url(&self, number: u64) -> String {
        format!("https://github.com/{}/{}/issues/{number}", self.owner, self.name)
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Error returned when a repository or issue reference cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid repository reference '{0}'")]
pub struct InvalidReference(pub String);

impl FromStr for Repository {
    type Err = InvalidReference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(InvalidReference(s.to_string())),
        }
    }
}

/// Splits an issue URL (`https://github.com/{owner}/{repo}/issues/{number}`)
/// into its repository and number.
///
/// # Errors
///
/// Returns [`InvalidReference`] for anything that is not a GitHub issue URL.
pub fn parse_issue_url(raw: &str) -> Result<(Repository, u64), InvalidReference> {
    let invalid = || InvalidReference(raw.to_string());
    let parsed = Url::parse(raw.trim()).map_err(|_| invalid())?;

    if parsed.host_str() != Some("github.com") {
        return Err(invalid());
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        [owner, name, "issues", number] => {
            let number = number.parse::<u64>().map_err(|_| invalid())?;
            Ok((Repository::new(*owner, *name), number))
        }
        _ => Err(invalid()),
    }
}
