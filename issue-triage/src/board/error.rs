//! Project board error types.

use thiserror::Error;

/// Errors that can occur while synchronizing the project board.
#[derive(Debug, Error)]
pub enum BoardError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),

    /// The GraphQL endpoint answered with an `errors` payload.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// The response did not have the expected shape.
    #[error("Malformed board response: {0}")]
    Malformed(String),

    /// Column name outside the board's fixed set.
    #[error("Unknown board column '{0}'")]
    UnknownColumn(String),

    /// Column with no configured status option id.
    #[error("No status option configured for column '{0}'")]
    MissingOption(String),
}
