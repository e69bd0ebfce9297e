//! Issue kinds.

use serde::Serialize;
use std::fmt;

/// The kind of work an issue asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Feature,
    Bug,
    Improvement,
    Question,
}

impl IssueKind {
    /// All kinds in detection priority order.
    pub const ALL: [IssueKind; 4] = [
        IssueKind::Feature,
        IssueKind::Bug,
        IssueKind::Improvement,
        IssueKind::Question,
    ];

    /// Lower-case identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Bug => "bug",
            Self::Improvement => "improvement",
            Self::Question => "question",
        }
    }

    /// Capitalised label used as the title prefix.
    #[must_use]
    pub fn title_label(self) -> &'static str {
        match self {
            Self::Feature => "Feature",
            Self::Bug => "Bug",
            Self::Improvement => "Improvement",
            Self::Question => "Question",
        }
    }

    /// Standard tracker label for slash-command issues.
    #[must_use]
    pub fn tracker_label(self) -> &'static str {
        match self {
            Self::Feature | Self::Improvement => "enhancement",
            Self::Bug => "bug",
            Self::Question => "question",
        }
    }

    /// Label for issues extracted from free text.
    #[must_use]
    pub fn free_text_label(self) -> &'static str {
        match self {
            Self::Feature => "feature-request",
            Self::Bug => "bug-report",
            Self::Improvement => "improvement",
            Self::Question => "question",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_tracker_labels() {
        assert_eq!(IssueKind::Feature.tracker_label(), "enhancement");
        assert_eq!(IssueKind::Improvement.tracker_label(), "enhancement");
        assert_eq!(IssueKind::Bug.tracker_label(), "bug");
        assert_eq!(IssueKind::Question.tracker_label(), "question");
    }
}
