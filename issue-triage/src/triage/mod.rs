//! Interactive triage of the unassigned backlog.
//!
//! The operator is walked through open issues that no agent owns yet, one at
//! a time and grouped by repository. Each answer labels, skips or closes the
//! presented issue and the next one is shown. The walk's state lives in a
//! [`SessionStore`] so consecutive messages, and separate processes, see the
//! same pending issue.

mod backlog;
mod presentation;
mod reply;
mod session;
mod store;

pub use backlog::{group, snapshot, BacklogItem, RepositoryGroup};
pub use presentation::{ALL_CLEAR, COMPLETED};
pub use reply::TriageAction;
pub use session::{PendingIssue, TriageSession, HISTORY_LIMIT};
pub use store::{is_plain_key, FileSessionStore, MemorySessionStore, SessionStore, StoreError};

use crate::board::BoardSync;
use crate::chat::Reply;
use crate::config::{AssignableLabel, Settings};
use crate::repository::Repository;
use crate::tracker::{CloseReason, IssueTracker};
use presentation::Position;
use std::sync::Arc;
use tokio::task;
use tracing::{info, info_span, warn, Instrument};

/// `/ta` addressed to a specific issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedAction {
    pub repo_short: String,
    pub number: u64,
    /// Raw action word: an assignable label, `skip` or `close`.
    pub action: String,
}

/// Usage shown for an unusable `/ta`.
pub const ADDRESSED_USAGE: &str = "❌ Uso: `/ta <repo> <numero> <azione>`\nAzioni: label agente, `skip`, `close`";

/// Drives the triage walk.
pub struct TriageEngine {
    settings: Arc<Settings>,
    tracker: Arc<dyn IssueTracker>,
    board: BoardSync,
    store: Arc<dyn SessionStore>,
}

impl TriageEngine {
    pub fn new(
        settings: Arc<Settings>,
        tracker: Arc<dyn IssueTracker>,
        board: BoardSync,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            settings,
            tracker,
            board,
            store,
        }
    }

    fn labels(&self) -> &[AssignableLabel] {
        &self.settings.triage.assignable_labels
    }

    fn session_key(&self) -> &str {
        &self.settings.triage.session
    }

    /// Labels that keep an issue out of the backlog.
    fn excluded_labels(&self) -> Vec<String> {
        self.labels()
            .iter()
            .map(|agent| agent.label.clone())
            .chain(self.settings.triage.workflow_labels.iter().cloned())
            .collect()
    }

    /// Store calls lock and write files, so they run on the blocking pool.
    async fn load_session(&self) -> TriageSession {
        let store = Arc::clone(&self.store);
        let key = self.session_key().to_string();

        match task::spawn_blocking(move || store.load(&key)).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                warn!(error = %e, "Session unreadable, starting empty");
                TriageSession::default()
            }
            Err(e) => {
                warn!(error = %e, "Session load task failed");
                TriageSession::default()
            }
        }
    }

    async fn save_session(&self, mut change: impl FnMut(&mut TriageSession) + Send + 'static) {
        let store = Arc::clone(&self.store);
        let key = self.session_key().to_string();

        match task::spawn_blocking(move || store.update(&key, &mut change)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(error = %e, "Failed to save triage session"),
            Err(e) => warn!(error = %e, "Session save task failed"),
        }
    }

    async fn groups(&self, session: &TriageSession) -> Vec<RepositoryGroup> {
        let items = snapshot(
            self.tracker.as_ref(),
            &self.settings.triage_repositories(),
            &self.excluded_labels(),
        )
        .await;
        group(items, session)
    }

    async fn present(&self, groups: &[RepositoryGroup], project: usize) -> String {
        let group = &groups[project];
        let item = &group.items[0];

        let pending = PendingIssue::new(&item.repository, item.number, &item.title);
        self.save_session(move |session| session.pending_issue = Some(pending.clone()))
            .await;

        let position = Position {
            index: 1,
            group_size: group.items.len(),
            project: project + 1,
            projects: groups.len(),
        };
        presentation::issue(item, position, self.labels())
    }

    /// Starts a new walk (`/triage`).
    pub async fn start(&self) -> Reply {
        let span = info_span!("triage_start");
        async {
            self.save_session(|session| session.skipped.clear()).await;
            let groups = self.groups(&TriageSession::default()).await;

            if groups.is_empty() {
                self.save_session(|session| session.pending_issue = None).await;
                info!("Backlog empty");
                return Reply::text(ALL_CLEAR).invalidating_previous();
            }

            let total: usize = groups.iter().map(|g| g.items.len()).sum();
            info!(issues = total, projects = groups.len(), "Triage started");

            let text = presentation::header(total, groups.len()) + &self.present(&groups, 0).await;
            Reply::prompt(text).invalidating_previous()
        }
        .instrument(span)
        .await
    }

    /// Handles an answer to the pending prompt.
    ///
    /// Returns `None` when `text` is not a triage answer or nothing is pending,
    /// so other handlers may take the message.
    pub async fn handle_reply(&self, text: &str) -> Option<Reply> {
        let action = TriageAction::parse_reply(text, self.labels())?;
        let pending = self.load_session().await.pending_issue?;
        let repository = pending
            .repository()
            .unwrap_or_else(|_| self.settings.resolve_short_name(&pending.repo_short));

        Some(self.act(&repository, pending.number, &action).await)
    }

    /// Handles `/ta <repo_short> <number> <action>`.
    pub async fn handle_addressed(&self, command: &AddressedAction) -> Reply {
        let Some(action) = TriageAction::parse_addressed(&command.action, self.labels()) else {
            return Reply::text(ADDRESSED_USAGE);
        };
        let repository = self.settings.resolve_short_name(&command.repo_short);
        self.act(&repository, command.number, &action).await
    }

    async fn act(&self, repository: &Repository, number: u64, action: &TriageAction) -> Reply {
        let span = info_span!("triage_action", repo = %repository, issue_number = number);
        async {
            let outcome = self.apply(repository, number, action).await;
            self.advance(repository, outcome).await
        }
        .instrument(span)
        .await
    }

    /// Performs `action` and describes the outcome in one or two lines.
    async fn apply(&self, repository: &Repository, number: u64, action: &TriageAction) -> String {
        let reference = format!("`{} #{number}`", repository.name);

        match action {
            TriageAction::Assign(label) => {
                let assignee = self.settings.assignee.clone();
                let labelled = self
                    .tracker
                    .add_labels(repository, number, std::slice::from_ref(label))
                    .await;
                let assigned = self
                    .tracker
                    .add_assignees(repository, number, std::slice::from_ref(&assignee))
                    .await;

                match labelled.and(assigned) {
                    Ok(()) => {
                        info!(label = %label, "Issue assigned");
                        let mut text = format!("✅ {reference} → *{label}* + @{assignee}");
                        if !self.board.todo(repository, number).await {
                            text.push_str("\n⚠️ Board non aggiornata (Todo)");
                        }
                        text
                    }
                    Err(e) => {
                        warn!(error = %e, "Assignment failed");
                        format!("❌ Errore assegnazione {reference}: {e}")
                    }
                }
            }
            TriageAction::Skip => {
                let skipped = repository.clone();
                self.save_session(move |session| session.skip(&skipped, number))
                    .await;
                format!("⏭️ Saltata {reference}")
            }
            TriageAction::Close => {
                match self
                    .tracker
                    .close_issue(repository, number, CloseReason::NotPlanned)
                    .await
                {
                    Ok(()) => {
                        let mut text = format!("🔒 Chiusa {reference}");
                        if !self.board.done(repository, number).await {
                            text.push_str("\n⚠️ Board non aggiornata (Done)");
                        }
                        text
                    }
                    Err(e) => {
                        warn!(error = %e, "Close failed");
                        format!("❌ Errore chiusura {reference}: {e}")
                    }
                }
            }
        }
    }

    /// Presents the next issue, staying on `previous` while it has items.
    async fn advance(&self, previous: &Repository, outcome: String) -> Reply {
        let session = self.load_session().await;
        let groups = self.groups(&session).await;

        if groups.is_empty() {
            self.save_session(|session| session.pending_issue = None).await;
            info!("Triage completed");
            return Reply::text(format!("{outcome}\n\n{COMPLETED}"));
        }

        let project = groups
            .iter()
            .position(|g| g.repository == *previous)
            .unwrap_or(0);
        let separator = if project == 0 && groups[0].repository != *previous {
            presentation::next_project_separator(&groups[0].repository.name)
        } else {
            "\n\n".to_string()
        };

        Reply::prompt(outcome + &separator + &self.present(&groups, project).await)
    }

    /// Records the transport id of the prompt just sent.
    pub async fn record_prompt(&self, id: &str) {
        let id = id.to_string();
        self.save_session(move |session| session.record_prompt(id.clone()))
            .await;
    }

    /// Ids of earlier prompts the transport should invalidate.
    pub async fn stale_prompts(&self) -> Vec<String> {
        self.load_session().await.stale_prompts()
    }

    /// The issue currently awaiting an answer.
    pub async fn pending(&self) -> Option<PendingIssue> {
        self.load_session().await.pending_issue
    }
}
