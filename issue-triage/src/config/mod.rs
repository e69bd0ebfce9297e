//! Settings loading.
//!
//! Settings live in a single TOML file (`issue-triage.toml` by default). A
//! missing file is not an error: the built-in portfolio is used instead.

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{
    AssignableLabel, BoardSettings, IssueSettings, KindKeywords, OwnerKind, RejectSettings,
    RepositorySettings, Settings, TriageSettings,
};

use crate::board::BoardColumn;
use crate::triage::is_plain_key;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable pointing at the settings file.
pub const SETTINGS_ENV: &str = "ISSUE_TRIAGE_CONFIG";

/// Settings file used when neither the caller nor [`SETTINGS_ENV`] names one.
pub const DEFAULT_SETTINGS_FILE: &str = "issue-triage.toml";

/// Picks the settings path: explicit argument, then [`SETTINGS_ENV`], then
/// [`DEFAULT_SETTINGS_FILE`].
#[must_use]
pub fn resolve_settings_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(SETTINGS_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

impl Settings {
    /// Loads and validates settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading settings");

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })?;

        settings.validate(path)?;
        Ok(settings)
    }

    /// Loads settings from `path` if it exists, otherwise returns the built-in
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an existing file is invalid.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }
        info!(path = %path.display(), "Settings file not found, using built-in portfolio");
        Ok(Self::default())
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let fail = |message: String| {
            Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                message,
            })
        };

        if self.owner.trim().is_empty() {
            return fail("owner must not be empty".to_string());
        }

        if !self
            .repositories
            .iter()
            .any(|repo| repo.name == self.default_repository)
        {
            return fail(format!(
                "default-repository '{}' is not one of the declared repositories",
                self.default_repository
            ));
        }

        if self.triage.assignable_labels.is_empty() {
            return fail("triage.assignable-labels must not be empty".to_string());
        }

        if self.triage.assignable_labels.len() > 9 {
            return fail("triage.assignable-labels supports at most 9 shortcuts".to_string());
        }

        if !is_plain_key(&self.triage.session) {
            return fail(format!(
                "triage.session '{}' may only contain letters, digits, '-' and '_'",
                self.triage.session
            ));
        }

        for column in self.board.columns.keys() {
            if column.parse::<BoardColumn>().is_err() {
                return fail(format!(
                    "board.columns: unknown column '{column}', expected one of {}",
                    BoardColumn::names().join(", ")
                ));
            }
        }

        Ok(())
    }
}
