//! Settings deserialization.
//!
//! Every section falls back to the built-in portfolio, so a settings file only
//! has to mention what it overrides.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::classify::IssueKind;
use crate::repository::Repository;

/// Parsed contents of `issue-triage.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Owner of every repository in the portfolio.
    pub owner: String,

    /// Chat author allowed to create and reject issues.
    pub operator: String,

    /// Account assigned to issues created or triaged by the bot.
    pub assignee: String,

    /// Repository used when no keyword matches.
    pub default_repository: String,

    /// Portfolio repositories with their detection keywords, in priority order.
    pub repositories: Vec<RepositorySettings>,

    /// Keyword table used for issue kind detection.
    pub kinds: KindKeywords,

    /// Words that mark a description as a wish rather than a request.
    pub hedge_words: Vec<String>,

    /// Issue creation settings.
    pub issue: IssueSettings,

    /// Backlog triage settings.
    pub triage: TriageSettings,

    /// `/reject` settings.
    pub reject: RejectSettings,

    /// Project board settings.
    pub board: BoardSettings,
}

/// One portfolio repository.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RepositorySettings {
    /// Short repository name (without owner).
    pub name: String,

    /// Lower-case keywords that point at this repository.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Keyword lists per issue kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct KindKeywords {
    pub feature: Vec<String>,
    pub bug: Vec<String>,
    pub improvement: Vec<String>,
    pub question: Vec<String>,
}

impl KindKeywords {
    /// Keywords declared for `kind`.
    #[must_use]
    pub fn for_kind(&self, kind: IssueKind) -> &[String] {
        match kind {
            IssueKind::Feature => &self.feature,
            IssueKind::Bug => &self.bug,
            IssueKind::Improvement => &self.improvement,
            IssueKind::Question => &self.question,
        }
    }
}

/// Label attached to every created issue so an agent picks it up.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IssueSettings {
    pub agent_label: String,
    pub agent_label_color: String,
    pub agent_label_description: String,
}

/// An execution agent the operator can hand an issue to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssignableLabel {
    /// Tracker label naming the agent.
    pub label: String,

    /// Emoji shown in the reply menu.
    #[serde(default)]
    pub emoji: String,

    /// Human readable agent name.
    #[serde(default)]
    pub display_name: String,
}

impl AssignableLabel {
    fn new(label: &str, emoji: &str, display_name: &str) -> Self {
        Self {
            label: label.to_string(),
            emoji: emoji.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TriageSettings {
    /// Repositories whose backlog is triaged, in presentation order.
    pub repositories: Vec<String>,

    /// Agents, in shortcut order (`1`, `2`, `3`, ...).
    pub assignable_labels: Vec<AssignableLabel>,

    /// Labels meaning an issue is already being worked on.
    pub workflow_labels: Vec<String>,

    /// Directory holding session documents.
    pub state_dir: PathBuf,

    /// Session key; the document is `<state-dir>/<session>.json`.
    pub session: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RejectSettings {
    /// Repositories searched, in order, for a rejected issue number.
    pub search_repositories: Vec<String>,

    /// Labels removed when an issue goes back to rework.
    pub rework_labels: Vec<String>,

    /// Label added when an issue goes back to rework.
    pub fix_label: String,
}

/// Whether the board belongs to a user or an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnerKind {
    User,
    Organization,
}

impl OwnerKind {
    /// GraphQL root field for this owner kind.
    #[must_use]
    pub fn graphql_field(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Organization => "organization",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BoardSettings {
    pub owner_kind: OwnerKind,
    pub project_number: u64,
    /// Node id of the project.
    pub project_id: String,
    /// Node id of the single-select status field.
    pub status_field_id: String,
    /// Column name to status option id.
    pub columns: BTreeMap<String, String>,
}

impl Settings {
    /// Full identifier of a portfolio repository given its short name.
    ///
    /// Names that already carry an owner are parsed as-is.
    #[must_use]
    pub fn repository(&self, name: &str) -> Repository {
        name.parse()
            .unwrap_or_else(|_| Repository::new(self.owner.clone(), name))
    }

    /// Resolves a short name case-insensitively against the portfolio and the
    /// triage list, falling back to `owner/<short>`.
    #[must_use]
    pub fn resolve_short_name(&self, short: &str) -> Repository {
        self.repositories
            .iter()
            .map(|repo| repo.name.as_str())
            .chain(self.triage.repositories.iter().map(String::as_str))
            .find(|name| name.eq_ignore_ascii_case(short))
            .map_or_else(|| self.repository(short), |name| self.repository(name))
    }

    /// Repositories triaged, in presentation order.
    #[must_use]
    pub fn triage_repositories(&self) -> Vec<Repository> {
        self.triage
            .repositories
            .iter()
            .map(|name| self.repository(name))
            .collect()
    }

    /// Repositories searched by `/reject`, in order.
    #[must_use]
    pub fn reject_repositories(&self) -> Vec<Repository> {
        self.reject
            .search_repositories
            .iter()
            .map(|name| self.repository(name))
            .collect()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn repo(name: &str, keywords: &[&str]) -> RepositorySettings {
    RepositorySettings {
        name: name.to_string(),
        keywords: strings(keywords),
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            owner: "ecologicaleaving".to_string(),
            operator: "davide crescentini".to_string(),
            assignee: "ecologicaleaving".to_string(),
            default_repository: "progetto-casa".to_string(),
            repositories: vec![
                repo(
                    "progetto-casa",
                    &["casa", "lavori", "cantiere", "cme", "relazione", "edificio"],
                ),
                repo(
                    "StageConnect",
                    &["stage", "debug", "browser", "device", "connect"],
                ),
                repo(
                    "BeachRef-app",
                    &[
                        "beach",
                        "spiaggia",
                        "flutter",
                        "app mobile",
                        "beachref",
                        "arbitri",
                        "torneo",
                    ],
                ),
                repo("BeachRef", &["beach backend", "api beach", "server beach"]),
                repo("maestro", &["maestro", "automation", "commands", "control"]),
                repo("finn", &["finn", "finance", "tracking", "financial"]),
                repo(
                    "sun-stop-timer",
                    &["drum", "audio", "reaper", "music", "timer", "sun"],
                ),
                repo(
                    "GridConnect",
                    &["grid", "elettrico", "enel", "pratiche", "energia", "connessioni"],
                ),
                repo(
                    "workflow",
                    &["workflow", "processo", "automation", "team", "standard"],
                ),
                repo("x32-Assist", &[]),
            ],
            kinds: KindKeywords::default(),
            hedge_words: strings(&["voglio", "serve", "bisogna", "dovrebbe", "sarebbe bello"]),
            issue: IssueSettings::default(),
            triage: TriageSettings::default(),
            reject: RejectSettings::default(),
            board: BoardSettings::default(),
        }
    }
}

impl Default for KindKeywords {
    fn default() -> Self {
        Self {
            feature: strings(&[
                "voglio",
                "poter",
                "servire",
                "implementare",
                "aggiungere",
                "creare",
                "nuovo",
                "feature",
            ]),
            bug: strings(&["bug", "errore", "problema", "non funziona", "crash", "error"]),
            improvement: strings(&[
                "migliorare",
                "ottimizzare",
                "rendere più",
                "enhancement",
                "upgrade",
            ]),
            question: strings(&["come", "perché", "cosa", "quando", "dove", "domanda", "help"]),
        }
    }
}

impl Default for IssueSettings {
    fn default() -> Self {
        Self {
            agent_label: "claude-code".to_string(),
            agent_label_color: "0e7490".to_string(),
            agent_label_description: "Auto-assignment to Claude Code agent (PC development system)"
                .to_string(),
        }
    }
}

impl Default for TriageSettings {
    fn default() -> Self {
        Self {
            repositories: strings(&[
                "progetto-casa",
                "BeachRef-app",
                "finn",
                "StageConnect",
                "maestro",
                "x32-Assist",
                "GridConnect",
            ]),
            assignable_labels: vec![
                AssignableLabel::new("claude-code", "🤖", "Claude Code"),
                AssignableLabel::new("ciccio", "🖥️", "Ciccio VPS"),
                AssignableLabel::new("codex", "⚡", "Codex"),
            ],
            workflow_labels: strings(&["in-progress", "review-ready", "deployed-test", "needs-fix"]),
            state_dir: PathBuf::from("memory"),
            session: "triage_state".to_string(),
        }
    }
}

impl Default for RejectSettings {
    fn default() -> Self {
        Self {
            search_repositories: strings(&[
                "StageConnect",
                "BeachRef-app",
                "maestro",
                "finn",
                "GridConnect",
                "workflow",
                "progetto-casa",
            ]),
            rework_labels: strings(&["review-ready", "deployed-test", "in-progress"]),
            fix_label: "needs-fix".to_string(),
        }
    }
}

impl Default for BoardSettings {
    fn default() -> Self {
        let columns = [
            ("Todo", "f75ad846"),
            ("In Progress", "47fc9ee4"),
            ("PUSH", "03f548ab"),
            ("Test", "1d6a37f9"),
            ("Done", "98236657"),
        ]
        .into_iter()
        .map(|(name, option)| (name.to_string(), option.to_string()))
        .collect();

        Self {
            owner_kind: OwnerKind::User,
            project_number: 2,
            project_id: "PVT_kwHODSTPQM4BP1Xp".to_string(),
            status_field_id: "PVTSSF_lAHODSTPQM4BP1Xpzg-INlw".to_string(),
            columns,
        }
    }
}
