#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod board;
pub mod body;
pub mod chat;
pub mod classify;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod rate_limit;
pub mod repository;
pub mod templates;
pub mod tracker;
pub mod triage;

pub use board::{BoardColumn, BoardError, BoardItem, BoardSync, GitHubProjectBoard, ProjectBoard};
pub use body::{BodyGenerator, RenderedBody};
pub use chat::{Message, Reply};
pub use classify::{Basis, Classification, Classifier, IssueKind, IssueRequest};
pub use commands::{Command, ParseError};
pub use config::{resolve_settings_path, ConfigError, Settings};
pub use context::{ContextProvider, GitHubContextProvider, RepositoryProfile};
pub use dispatcher::{Collaborators, Dispatcher, DispatcherError};
pub use rate_limit::{check_core_rate_limit, ensure_core_rate_limit, RateLimitInfo};
pub use repository::{parse_issue_url, InvalidReference, Repository};
pub use templates::{create_handlebars_registry, TemplateError, TemplateRenderer};
pub use tracker::{
    CloseReason, CreatedIssue, GitHubTracker, IssueDetails, IssueTracker, LabelDefinition, NewIssue,
    TrackerError, TrackerIssue,
};
pub use triage::{
    FileSessionStore, MemorySessionStore, PendingIssue, SessionStore, StoreError, TriageEngine,
    TriageSession,
};
