//! Issue tracker error types.

use thiserror::Error;

/// Errors that can occur while talking to the issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),

    /// The issue or repository does not exist.
    #[error("Issue #{number} not found in {repo}")]
    NotFound { repo: String, number: u64 },

    /// Permission denied.
    #[error("Permission denied: no write access to {repo}")]
    PermissionDenied { repo: String },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, reset at {reset_at}")]
    RateLimited { reset_at: u64 },

    /// The tracker answered with something unusable.
    #[error("Malformed tracker response: {0}")]
    Malformed(String),
}

impl TrackerError {
    /// True for errors caused by missing write access.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied { .. } => true,
            Self::GitHub(e) => {
                let msg = e.to_string().to_lowercase();
                msg.contains("403") || msg.contains("forbidden") || msg.contains("permission")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_detect_permission_denied() {
        assert!(TrackerError::PermissionDenied {
            repo: "o/r".to_string()
        }
        .is_permission_denied());
        assert!(!TrackerError::Malformed("x".to_string()).is_permission_denied());
    }
}
