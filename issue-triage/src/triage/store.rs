//! Session persistence.
//!
//! A session document is keyed by session id. [`FileSessionStore`] keeps one
//! JSON file per session and serializes read-modify-write cycles across
//! processes with an advisory lock file next to it.

use super::TriageSession;
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while loading or saving a session.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File system error.
    #[error("Session I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid session.
    #[error("Corrupt session document '{path}': {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The session could not be encoded.
    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),

    /// The session id cannot be used as a file name.
    #[error("Invalid session id '{0}'")]
    InvalidKey(String),
}

/// Storage for triage sessions.
pub trait SessionStore: Send + Sync {
    /// Loads a session; a missing session is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the session exists but cannot be read.
    fn load(&self, key: &str) -> Result<TriageSession, StoreError>;

    /// Applies `change` to the stored session and writes it back, returning the
    /// new state. The whole cycle is exclusive.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the session cannot be written.
    fn update(
        &self,
        key: &str,
        change: &mut dyn FnMut(&mut TriageSession),
    ) -> Result<TriageSession, StoreError>;
}

/// True if `key` can name a session document: ASCII letters, digits, `-`
/// and `_`, not empty.
#[must_use]
pub fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Sessions stored as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at `dir`; the directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the document for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] for keys that are not plain file stems.
    pub fn document_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !is_plain_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Opens the lock file of `document`, holding the lock until dropped.
    fn lock(&self, document: &Path, exclusive: bool) -> Result<File, StoreError> {
        let lock_path = document.with_extension("json.lock");
        std::fs::create_dir_all(&self.dir).map_err(Self::io_error(&self.dir))?;

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(Self::io_error(&lock_path))?;

        let locked = if exclusive {
            file.lock_exclusive()
        } else {
            file.lock_shared()
        };
        locked.map_err(Self::io_error(&lock_path))?;
        Ok(file)
    }

    fn read(document: &Path) -> Result<TriageSession, StoreError> {
        match std::fs::read_to_string(document) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: document.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(TriageSession::default()),
            Err(e) => Err(Self::io_error(document)(e)),
        }
    }

    /// Writes through a temporary file in the same directory, renamed over the
    /// document.
    fn write(&self, document: &Path, session: &TriageSession) -> Result<(), StoreError> {
        let temp = NamedTempFile::new_in(&self.dir).map_err(Self::io_error(&self.dir))?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, session)?;
            writer.flush().map_err(Self::io_error(temp.path()))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(Self::io_error(temp.path()))?;
        temp.persist(document)
            .map_err(|e| Self::io_error(document)(e.error))?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, key: &str) -> Result<TriageSession, StoreError> {
        let document = self.document_path(key)?;
        let _lock = self.lock(&document, false)?;
        Self::read(&document)
    }

    fn update(
        &self,
        key: &str,
        change: &mut dyn FnMut(&mut TriageSession),
    ) -> Result<TriageSession, StoreError> {
        let document = self.document_path(key)?;
        let _lock = self.lock(&document, true)?;

        let mut session = match Self::read(&document) {
            Ok(session) => session,
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!(error = %e, "Replacing corrupt session document");
                TriageSession::default()
            }
            Err(e) => return Err(e),
        };

        change(&mut session);
        self.write(&document, &session)?;
        debug!(path = %document.display(), "Session saved");
        Ok(session)
    }
}

/// In-process sessions, for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, TriageSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> Result<TriageSession, StoreError> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(sessions.get(key).cloned().unwrap_or_default())
    }

    fn update(
        &self,
        key: &str,
        change: &mut dyn FnMut(&mut TriageSession),
    ) -> Result<TriageSession, StoreError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let session = sessions.entry(key.to_string()).or_default();
        change(session);
        Ok(session.clone())
    }
}
