//! Project board synchronization.
//!
//! [`BoardSync::move_card`] resolves an issue to its board card, adding the
//! card when it is missing, and writes the target column. Failures never
//! propagate: they are logged and reported as `false`.

mod column;
mod error;
mod github;

pub use column::BoardColumn;
pub use error::BoardError;
pub use github::GitHubProjectBoard;

use crate::repository::Repository;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// A card on the board that points at an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardItem {
    pub item_id: String,
    pub issue_number: u64,
    /// `owner/name` as reported by the board.
    pub repository: String,
}

impl BoardItem {
    /// True if the card points at issue `number` of `repository`.
    #[must_use]
    pub fn matches(&self, repository: &Repository, number: u64) -> bool {
        self.issue_number == number
            && self
                .repository
                .to_lowercase()
                .contains(&repository.full_name().to_lowercase())
    }
}

/// Raw board operations.
#[async_trait]
pub trait ProjectBoard: Send + Sync {
    /// Lists every card on the board.
    async fn list_items(&self) -> Result<Vec<BoardItem>, BoardError>;

    /// Adds an issue to the board, returning the new card id.
    async fn add_item(&self, repository: &Repository, number: u64) -> Result<String, BoardError>;

    /// Writes the status field of a card.
    async fn set_status(&self, item_id: &str, option_id: &str) -> Result<(), BoardError>;
}

/// Moves issue cards between columns.
#[derive(Clone)]
pub struct BoardSync {
    board: Arc<dyn ProjectBoard>,
    /// Column name to status option id.
    options: BTreeMap<String, String>,
}

impl BoardSync {
    /// Creates a synchronizer; `options` maps column names to option ids.
    pub fn new(board: Arc<dyn ProjectBoard>, options: BTreeMap<String, String>) -> Self {
        Self { board, options }
    }

    fn option_for(&self, column: BoardColumn) -> Result<&str, BoardError> {
        self.options
            .iter()
            .find(|(name, _)| name.parse::<BoardColumn>().ok() == Some(column))
            .map(|(_, id)| id.as_str())
            .ok_or_else(|| BoardError::MissingOption(column.to_string()))
    }

    async fn find_item(
        &self,
        repository: &Repository,
        number: u64,
    ) -> Result<Option<String>, BoardError> {
        Ok(self
            .board
            .list_items()
            .await?
            .into_iter()
            .find(|item| item.matches(repository, number))
            .map(|item| item.item_id))
    }

    /// Finds the card, adding the issue once when it is not on the board.
    async fn resolve_or_add(
        &self,
        repository: &Repository,
        number: u64,
    ) -> Result<Option<String>, BoardError> {
        if let Some(item_id) = self.find_item(repository, number).await? {
            return Ok(Some(item_id));
        }

        info!("Card not on board, adding it");
        if let Err(e) = self.board.add_item(repository, number).await {
            // The card may exist anyway, e.g. added concurrently.
            warn!(error = %e, "Adding card failed, resolving again");
        }
        self.find_item(repository, number).await
    }

    async fn try_move(
        &self,
        repository: &Repository,
        number: u64,
        column: BoardColumn,
    ) -> Result<bool, BoardError> {
        let option_id = self.option_for(column)?;

        let Some(item_id) = self.resolve_or_add(repository, number).await? else {
            warn!("Card still missing after adding it");
            return Ok(false);
        };

        self.board.set_status(&item_id, option_id).await?;
        debug!(item_id = %item_id, "Status written");
        Ok(true)
    }

    /// Moves the card of `repository#number` to `column`.
    ///
    /// Returns `true` when the status was written.
    pub async fn move_card(&self, repository: &Repository, number: u64, column: BoardColumn) -> bool {
        let span = info_span!(
            "move_card",
            repo = %repository,
            issue_number = number,
            column = %column
        );

        async {
            match self.try_move(repository, number, column).await {
                Ok(true) => {
                    info!("Card moved");
                    true
                }
                Ok(false) => false,
                Err(e) => {
                    warn!(error = %e, "Card move failed");
                    false
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Like [`move_card`](Self::move_card), with the column given by name.
    ///
    /// Unknown names are logged and return `false` without any remote call.
    pub async fn move_card_named(&self, repository: &Repository, number: u64, column: &str) -> bool {
        match column.parse::<BoardColumn>() {
            Ok(column) => self.move_card(repository, number, column).await,
            Err(e) => {
                warn!(repo = %repository, issue_number = number, error = %e, "Card move refused");
                false
            }
        }
    }

    pub async fn todo(&self, repository: &Repository, number: u64) -> bool {
        self.move_card(repository, number, BoardColumn::Todo).await
    }

    pub async fn in_progress(&self, repository: &Repository, number: u64) -> bool {
        self.move_card(repository, number, BoardColumn::InProgress).await
    }

    pub async fn push(&self, repository: &Repository, number: u64) -> bool {
        self.move_card(repository, number, BoardColumn::Push).await
    }

    pub async fn test(&self, repository: &Repository, number: u64) -> bool {
        self.move_card(repository, number, BoardColumn::Test).await
    }

    pub async fn done(&self, repository: &Repository, number: u64) -> bool {
        self.move_card(repository, number, BoardColumn::Done).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryBoard {
        items: Mutex<Vec<BoardItem>>,
        statuses: Mutex<Vec<(String, String)>>,
        adds: Mutex<u32>,
        lists: Mutex<u32>,
        /// When false, added cards never show up in listings.
        visible_after_add: bool,
        /// Adding reports an error after the card was placed.
        fail_add: bool,
        fail_status: bool,
    }

    #[async_trait]
    impl ProjectBoard for MemoryBoard {
        async fn list_items(&self) -> Result<Vec<BoardItem>, BoardError> {
            *self.lists.lock().unwrap() += 1;
            Ok(self.items.lock().unwrap().clone())
        }

        async fn add_item(&self, repository: &Repository, number: u64) -> Result<String, BoardError> {
            let mut adds = self.adds.lock().unwrap();
            *adds += 1;
            let item_id = format!("PVTI_{}", *adds);
            if self.visible_after_add {
                self.items.lock().unwrap().push(BoardItem {
                    item_id: item_id.clone(),
                    issue_number: number,
                    repository: repository.full_name(),
                });
            }
            if self.fail_add {
                let message = "Content already exists in this project";
                return Err(BoardError::GraphQl(message.to_string()));
            }
            Ok(item_id)
        }

        async fn set_status(&self, item_id: &str, option_id: &str) -> Result<(), BoardError> {
            if self.fail_status {
                return Err(BoardError::GraphQl("denied".to_string()));
            }
            self.statuses
                .lock()
                .unwrap()
                .push((item_id.to_string(), option_id.to_string()));
            Ok(())
        }
    }

    fn options() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("Todo".to_string(), "opt-todo".to_string()),
            ("In Progress".to_string(), "opt-progress".to_string()),
        ])
    }

    fn repo() -> Repository {
        Repository::new("ecologicaleaving", "finn")
    }

    fn sync(board: &Arc<MemoryBoard>) -> BoardSync {
        BoardSync::new(board.clone(), options())
    }

    #[tokio::test]
    async fn moves_existing_card() {
        let board = Arc::new(MemoryBoard::default());
        board.items.lock().unwrap().push(BoardItem {
            item_id: "PVTI_a".to_string(),
            issue_number: 7,
            repository: "Ecologicaleaving/Finn".to_string(),
        });

        assert!(sync(&board).in_progress(&repo(), 7).await);
        assert_eq!(
            *board.statuses.lock().unwrap(),
            vec![("PVTI_a".to_string(), "opt-progress".to_string())]
        );
        assert_eq!(*board.adds.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_card_is_added_once_and_move_is_idempotent() {
        let board = Arc::new(MemoryBoard {
            visible_after_add: true,
            ..MemoryBoard::default()
        });
        let sync = sync(&board);

        assert!(sync.todo(&repo(), 9).await);
        assert!(sync.todo(&repo(), 9).await);

        assert_eq!(*board.adds.lock().unwrap(), 1);
        assert_eq!(board.items.lock().unwrap().len(), 1);
        let statuses = board.statuses.lock().unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|(item, option)| item == "PVTI_1" && option == "opt-todo"));
    }

    #[tokio::test]
    async fn card_invisible_after_add_fails() {
        let board = Arc::new(MemoryBoard::default());
        assert!(!sync(&board).todo(&repo(), 9).await);
        assert_eq!(*board.adds.lock().unwrap(), 1);
        assert!(board.statuses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_add_still_resolves_once_more() {
        let board = Arc::new(MemoryBoard {
            visible_after_add: true,
            fail_add: true,
            ..MemoryBoard::default()
        });

        assert!(sync(&board).todo(&repo(), 9).await);
        assert_eq!(*board.lists.lock().unwrap(), 2);
        assert_eq!(
            *board.statuses.lock().unwrap(),
            vec![("PVTI_1".to_string(), "opt-todo".to_string())]
        );
    }

    #[tokio::test]
    async fn failed_add_without_card_is_false() {
        let board = Arc::new(MemoryBoard {
            fail_add: true,
            ..MemoryBoard::default()
        });

        assert!(!sync(&board).todo(&repo(), 9).await);
        assert_eq!(*board.lists.lock().unwrap(), 2);
        assert!(board.statuses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn column_without_option_is_never_attempted() {
        let board = Arc::new(MemoryBoard::default());
        assert!(!sync(&board).done(&repo(), 9).await);
        assert_eq!(*board.adds.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_column_name_is_refused() {
        let board = Arc::new(MemoryBoard::default());
        assert!(!sync(&board).move_card_named(&repo(), 9, "Backlog").await);
        assert_eq!(*board.adds.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn status_write_failure_is_false() {
        let board = Arc::new(MemoryBoard {
            visible_after_add: true,
            fail_status: true,
            ..MemoryBoard::default()
        });
        assert!(!sync(&board).todo(&repo(), 9).await);
    }

    #[test]
    fn matching_needs_number_and_repository() {
        let item = BoardItem {
            item_id: "x".to_string(),
            issue_number: 3,
            repository: "ecologicaleaving/BeachRef-app".to_string(),
        };
        let beachref = Repository::new("ecologicaleaving", "BeachRef");
        // Substring match: the shorter name also matches the longer one.
        assert!(item.matches(&beachref, 3));
        assert!(!item.matches(&beachref, 4));
        assert!(!item.matches(&repo(), 3));
    }
}
