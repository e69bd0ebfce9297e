//! Routes inbound chat messages to the handlers.
//!
//! Precedence: `/issue`, `/reject`, `/triage`, `/ta`, triage replies, then
//! free-text issue requests. Every failure is turned into a reply here; nothing
//! escapes to the transport.

use crate::board::{BoardSync, GitHubProjectBoard, ProjectBoard};
use crate::body::BodyGenerator;
use crate::chat::{Message, Reply};
use crate::classify::{Classifier, IssueRequest};
use crate::commands::{self, Command};
use crate::config::{ConfigError, Settings};
use crate::context::{ContextProvider, GitHubContextProvider};
use crate::repository::{parse_issue_url, InvalidReference, Repository};
use crate::templates::TemplateRenderer;
use crate::tracker::{GitHubTracker, IssueTracker};
use crate::triage::{FileSessionStore, SessionStore, TriageEngine};
use octocrab::Octocrab;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

/// Errors that can occur while building a dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DispatcherError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),
}

/// External systems the dispatcher works against.
#[derive(Clone)]
pub struct Collaborators {
    pub tracker: Arc<dyn IssueTracker>,
    pub board: Arc<dyn ProjectBoard>,
    pub context: Arc<dyn ContextProvider>,
    pub store: Arc<dyn SessionStore>,
}

impl Collaborators {
    /// GitHub-backed collaborators with sessions stored under the configured
    /// state directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitHub client cannot be built.
    pub fn github(settings: &Settings, token: &str) -> Result<Self, DispatcherError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()?;

        Ok(Self {
            tracker: Arc::new(GitHubTracker::new(octocrab.clone())),
            board: Arc::new(GitHubProjectBoard::new(
                octocrab.clone(),
                settings.owner.clone(),
                settings.board.clone(),
            )),
            context: Arc::new(GitHubContextProvider::new(octocrab)),
            store: Arc::new(FileSessionStore::new(settings.triage.state_dir.clone())),
        })
    }
}

/// Handles chat messages for the configured operator.
pub struct Dispatcher {
    settings: Arc<Settings>,
    classifier: Classifier,
    generator: BodyGenerator,
    renderer: TemplateRenderer,
    tracker: Arc<dyn IssueTracker>,
    context: Arc<dyn ContextProvider>,
    board: BoardSync,
    triage: TriageEngine,
}

impl Dispatcher {
    /// Builds a dispatcher over the given collaborators.
    pub fn new(settings: Settings, collaborators: Collaborators) -> Self {
        let settings = Arc::new(settings);
        let board = BoardSync::new(collaborators.board, settings.board.columns.clone());
        let triage = TriageEngine::new(
            settings.clone(),
            collaborators.tracker.clone(),
            board.clone(),
            collaborators.store,
        );

        Self {
            classifier: Classifier::from_settings(&settings),
            generator: BodyGenerator::new(&settings.hedge_words, settings.issue.agent_label.clone()),
            renderer: TemplateRenderer::new(),
            tracker: collaborators.tracker,
            context: collaborators.context,
            board,
            triage,
            settings,
        }
    }

    /// Builds a dispatcher talking to GitHub.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitHub client cannot be built.
    pub fn connect(settings: Settings, token: &str) -> Result<Self, DispatcherError> {
        let collaborators = Collaborators::github(&settings, token)?;
        Ok(Self::new(settings, collaborators))
    }

    /// Settings in use.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The triage engine.
    #[must_use]
    pub fn triage(&self) -> &TriageEngine {
        &self.triage
    }

    /// The board synchronizer.
    #[must_use]
    pub fn board(&self) -> &BoardSync {
        &self.board
    }

    fn is_operator(&self, author: &str) -> bool {
        author.trim().to_lowercase() == self.settings.operator.trim().to_lowercase()
    }

    /// Handles one message; `None` means no reply.
    pub async fn handle_message(&self, message: &Message) -> Option<Reply> {
        let span = info_span!("handle_message", author = %message.author);
        async {
            let operator = self.is_operator(&message.author);

            if let Some(parsed) = Command::parse(&message.text) {
                let name = match &parsed {
                    Ok(command) => command.name(),
                    Err(e) => e.command(),
                };
                if !operator {
                    info!(command = name, "Command refused");
                    return Some(Reply::text(format!(
                        "❌ Solo {} può usare {name}.",
                        self.settings.operator
                    )));
                }
                return Some(match parsed {
                    Ok(command) => self.run(command, message).await,
                    Err(e) => {
                        debug!(error = %e, "Command did not parse");
                        Reply::text(e.usage())
                    }
                });
            }

            if !operator {
                return None;
            }

            if let Some(reply) = self.triage.handle_reply(&message.text).await {
                return Some(reply);
            }

            let request = self.classifier.request_from_free_text(&message.text)?;
            info!(repo = %request.repository, kind = %request.kind, "Free-text issue request");
            Some(self.file_issue(&request).await)
        }
        .instrument(span)
        .await
    }

    async fn run(&self, command: Command, message: &Message) -> Reply {
        match command {
            Command::Issue { description } => {
                let request = self.classifier.request_from_description(&description);
                self.file_issue(&request).await
            }
            Command::Reject { number, feedback } => {
                commands::reject_issue(
                    self.tracker.as_ref(),
                    &self.board,
                    &self.renderer,
                    &self.settings,
                    &message.author,
                    number,
                    &feedback,
                )
                .await
            }
            Command::Triage => self.triage.start().await,
            Command::Addressed(action) => self.triage.handle_addressed(&action).await,
        }
    }

    async fn file_issue(&self, request: &IssueRequest) -> Reply {
        commands::create_issue(
            self.tracker.as_ref(),
            &self.board,
            self.context.as_ref(),
            &self.generator,
            &self.settings,
            request,
        )
        .await
    }

    /// Places the issue behind `url` in the `Todo` column.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidReference`] if `url` is not a GitHub issue URL.
    pub async fn place_card(&self, url: &str) -> Result<bool, InvalidReference> {
        let (repository, number) = parse_issue_url(url)?;
        Ok(self.board.todo(&repository, number).await)
    }

    /// Moves a card to the column called `column`.
    pub async fn move_card(&self, repository: &Repository, number: u64, column: &str) -> bool {
        self.board.move_card_named(repository, number, column).await
    }
}
