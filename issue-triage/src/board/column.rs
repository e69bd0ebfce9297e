//! Board columns.

use super::BoardError;
use std::fmt;
use std::str::FromStr;

/// Status column of a card on the project board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoardColumn {
    Todo,
    InProgress,
    Push,
    Test,
    Done,
}

impl BoardColumn {
    pub const ALL: [BoardColumn; 5] = [
        BoardColumn::Todo,
        BoardColumn::InProgress,
        BoardColumn::Push,
        BoardColumn::Test,
        BoardColumn::Done,
    ];

    /// Name of the column as shown on the board.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::Push => "PUSH",
            Self::Test => "Test",
            Self::Done => "Done",
        }
    }

    /// All column names, in board order.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|column| column.as_str()).collect()
    }
}

impl fmt::Display for BoardColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardColumn {
    type Err = BoardError;

    /// Accepts the board name case-insensitively, plus the `in_progress`
    /// spelling used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|column| {
                column.as_str().eq_ignore_ascii_case(wanted)
                    || column.as_str().replace(' ', "_").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| BoardError::UnknownColumn(wanted.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_board_and_cli_spellings() {
        assert_eq!("In Progress".parse::<BoardColumn>().unwrap(), BoardColumn::InProgress);
        assert_eq!("in_progress".parse::<BoardColumn>().unwrap(), BoardColumn::InProgress);
        assert_eq!("push".parse::<BoardColumn>().unwrap(), BoardColumn::Push);
        assert_eq!(" Done ".parse::<BoardColumn>().unwrap(), BoardColumn::Done);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!(
            "Backlog".parse::<BoardColumn>(),
            Err(BoardError::UnknownColumn(name)) if name == "Backlog"
        ));
    }

    #[test]
    fn names_follow_board_order() {
        assert_eq!(BoardColumn::names(), vec!["Todo", "In Progress", "PUSH", "Test", "Done"]);
    }
}
