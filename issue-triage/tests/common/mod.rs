//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use issue_triage::context::parse_project_document;
use issue_triage::{
    BoardError, BoardItem, CloseReason, Collaborators, ContextProvider, CreatedIssue, Dispatcher,
    IssueDetails, IssueTracker, LabelDefinition, MemorySessionStore, Message, NewIssue,
    ProjectBoard, Repository, RepositoryProfile, SessionStore, Settings, TrackerError,
    TrackerIssue,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const OPERATOR: &str = "davide crescentini";

pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn repo(name: &str) -> Repository {
    Repository::new("ecologicaleaving", name)
}

pub fn from_operator(text: &str) -> Message {
    Message::new(OPERATOR, text)
}

#[derive(Default)]
pub struct TrackerState {
    /// Open issues per `owner/name`.
    pub open: BTreeMap<String, Vec<TrackerIssue>>,
    pub created: Vec<(Repository, NewIssue)>,
    pub ensured_labels: Vec<String>,
    pub comments: Vec<(String, u64, String)>,
    pub assignees: Vec<(String, u64, String)>,
    pub closed: Vec<(String, u64, CloseReason)>,
    pub fail_create: bool,
    pub fail_remove: bool,
}

/// Tracker holding issues in memory and recording every write.
#[derive(Default)]
pub struct FakeTracker {
    pub state: Mutex<TrackerState>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(self, repository: &str, number: u64, title: &str, labels: &[&str]) -> Self {
        let full_name = repo(repository).full_name();
        let issue = TrackerIssue {
            number,
            title: title.to_string(),
            labels: labels.iter().map(|label| (*label).to_string()).collect(),
            url: format!("https://github.com/{full_name}/issues/{number}"),
            body: None,
        };
        self.state
            .lock()
            .unwrap()
            .open
            .entry(full_name)
            .or_default()
            .push(issue);
        self
    }

    pub fn failing_creation(self) -> Self {
        self.state.lock().unwrap().fail_create = true;
        self
    }

    pub fn failing_label_removal(self) -> Self {
        self.state.lock().unwrap().fail_remove = true;
        self
    }

    pub fn labels_of(&self, repository: &str, number: u64) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .open
            .get(&repo(repository).full_name())
            .and_then(|issues| issues.iter().find(|issue| issue.number == number))
            .map(|issue| issue.labels.clone())
            .unwrap_or_default()
    }

    fn with_open_issue<T>(
        &self,
        repository: &Repository,
        number: u64,
        change: impl FnOnce(&mut TrackerIssue) -> T,
    ) -> Result<T, TrackerError> {
        let mut state = self.state.lock().unwrap();
        state
            .open
            .get_mut(&repository.full_name())
            .and_then(|issues| issues.iter_mut().find(|issue| issue.number == number))
            .map(change)
            .ok_or_else(|| TrackerError::NotFound {
                repo: repository.full_name(),
                number,
            })
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn create_issue(
        &self,
        repository: &Repository,
        issue: NewIssue,
    ) -> Result<CreatedIssue, TrackerError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            return Err(TrackerError::Malformed("creation disabled".to_string()));
        }
        state.created.push((repository.clone(), issue));
        let number = 100 + state.created.len() as u64;
        Ok(CreatedIssue {
            number,
            url: format!("https://github.com/{}/issues/{number}", repository.full_name()),
        })
    }

    async fn list_open_issues(
        &self,
        repository: &Repository,
    ) -> Result<Vec<TrackerIssue>, TrackerError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .open
            .get(&repository.full_name())
            .cloned()
            .unwrap_or_default())
    }

    async fn view_issue(
        &self,
        repository: &Repository,
        number: u64,
    ) -> Result<IssueDetails, TrackerError> {
        self.with_open_issue(repository, number, |issue| IssueDetails {
            title: issue.title.clone(),
            url: issue.url.clone(),
            labels: issue.labels.clone(),
            repository: repository.clone(),
        })
    }

    async fn add_labels(
        &self,
        repository: &Repository,
        number: u64,
        labels: &[String],
    ) -> Result<(), TrackerError> {
        self.with_open_issue(repository, number, |issue| {
            for label in labels {
                if !issue.labels.contains(label) {
                    issue.labels.push(label.clone());
                }
            }
        })
    }

    async fn remove_label(
        &self,
        repository: &Repository,
        number: u64,
        label: &str,
    ) -> Result<(), TrackerError> {
        if self.state.lock().unwrap().fail_remove {
            return Err(TrackerError::Malformed("label removal disabled".to_string()));
        }
        self.with_open_issue(repository, number, |issue| {
            issue.labels.retain(|existing| existing != label);
        })
    }

    async fn add_assignees(
        &self,
        repository: &Repository,
        number: u64,
        assignees: &[String],
    ) -> Result<(), TrackerError> {
        self.with_open_issue(repository, number, |_| ())?;
        let mut state = self.state.lock().unwrap();
        for assignee in assignees {
            state
                .assignees
                .push((repository.full_name(), number, assignee.clone()));
        }
        Ok(())
    }

    async fn close_issue(
        &self,
        repository: &Repository,
        number: u64,
        reason: CloseReason,
    ) -> Result<(), TrackerError> {
        self.with_open_issue(repository, number, |_| ())?;
        let mut state = self.state.lock().unwrap();
        if let Some(issues) = state.open.get_mut(&repository.full_name()) {
            issues.retain(|issue| issue.number != number);
        }
        state.closed.push((repository.full_name(), number, reason));
        Ok(())
    }

    async fn comment(
        &self,
        repository: &Repository,
        number: u64,
        body: &str,
    ) -> Result<(), TrackerError> {
        self.with_open_issue(repository, number, |_| ())?;
        self.state
            .lock()
            .unwrap()
            .comments
            .push((repository.full_name(), number, body.to_string()));
        Ok(())
    }

    async fn ensure_label(
        &self,
        _repository: &Repository,
        label: &LabelDefinition,
    ) -> Result<(), TrackerError> {
        self.state
            .lock()
            .unwrap()
            .ensured_labels
            .push(label.name.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct BoardState {
    pub items: Vec<BoardItem>,
    pub adds: usize,
    /// `(item_id, option_id)` in write order.
    pub statuses: Vec<(String, String)>,
    pub offline: bool,
}

/// Board holding cards in memory.
#[derive(Default)]
pub struct FakeBoard {
    pub state: Mutex<BoardState>,
}

impl FakeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        let board = Self::default();
        board.state.lock().unwrap().offline = true;
        board
    }

    pub fn adds(&self) -> usize {
        self.state.lock().unwrap().adds
    }

    pub fn last_status(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .statuses
            .last()
            .map(|(_, option)| option.clone())
    }
}

#[async_trait]
impl ProjectBoard for FakeBoard {
    async fn list_items(&self) -> Result<Vec<BoardItem>, BoardError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(BoardError::GraphQl("board offline".to_string()));
        }
        Ok(state.items.clone())
    }

    async fn add_item(&self, repository: &Repository, number: u64) -> Result<String, BoardError> {
        let mut state = self.state.lock().unwrap();
        state.adds += 1;
        let item_id = format!("PVTI_{}", state.adds);
        state.items.push(BoardItem {
            item_id: item_id.clone(),
            issue_number: number,
            repository: repository.full_name(),
        });
        Ok(item_id)
    }

    async fn set_status(&self, item_id: &str, option_id: &str) -> Result<(), BoardError> {
        self.state
            .lock()
            .unwrap()
            .statuses
            .push((item_id.to_string(), option_id.to_string()));
        Ok(())
    }
}

/// Every repository gets the profile parsed from the fixture document.
pub struct FixtureContext;

#[async_trait]
impl ContextProvider for FixtureContext {
    async fn profile(&self, repository: &Repository) -> RepositoryProfile {
        match std::fs::read_to_string(fixtures_root().join("PROJECT.md")) {
            Ok(content) => parse_project_document(&content, &repository.name),
            Err(_) => RepositoryProfile::unknown(&repository.name),
        }
    }
}

pub struct Harness {
    pub tracker: Arc<FakeTracker>,
    pub board: Arc<FakeBoard>,
    pub dispatcher: Dispatcher,
}

impl Harness {
    pub fn new(tracker: FakeTracker, board: FakeBoard) -> Self {
        Self::with_store(tracker, board, Arc::new(MemorySessionStore::new()))
    }

    pub fn with_store(
        tracker: FakeTracker,
        board: FakeBoard,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let tracker = Arc::new(tracker);
        let board = Arc::new(board);
        let collaborators = Collaborators {
            tracker: tracker.clone(),
            board: board.clone(),
            context: Arc::new(FixtureContext),
            store,
        };

        Self {
            dispatcher: Dispatcher::new(Settings::default(), collaborators),
            tracker,
            board,
        }
    }
}
