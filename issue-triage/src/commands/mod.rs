//! Slash command parsing and the `/issue` and `/reject` handlers.

mod issue;
mod reject;

pub use issue::create_issue;
pub use reject::{reject_comment, reject_issue};

use crate::triage::AddressedAction;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// A recognised slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/issue <description>`
    Issue { description: String },
    /// `/reject #N "feedback"`
    Reject { number: u64, feedback: String },
    /// `/triage`
    Triage,
    /// `/ta <repo_short> <number> <action>`
    Addressed(AddressedAction),
}

/// A message named a command but did not follow its grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed /issue command")]
    Issue,
    #[error("malformed /reject command")]
    Reject,
    #[error("malformed /ta command")]
    Addressed,
}

impl ParseError {
    /// The command that failed to parse.
    #[must_use]
    pub fn command(self) -> &'static str {
        match self {
            Self::Issue => "/issue",
            Self::Reject => "/reject",
            Self::Addressed => "/ta",
        }
    }

    /// Help text answered instead of running the command.
    #[must_use]
    pub fn usage(self) -> &'static str {
        match self {
            Self::Issue => ISSUE_USAGE,
            Self::Reject => REJECT_USAGE,
            Self::Addressed => crate::triage::ADDRESSED_USAGE,
        }
    }
}

const ISSUE_USAGE: &str = r#"❌ **Formato comando non valido**

**Uso corretto:**
• `/issue - "descrizione issue"`
• `/issue "descrizione issue"`
• `/issue descrizione issue`

**Esempi:**
• `/issue - "in progetto-casa voglio upload documenti CME"`
• `/issue "bug maestro automation non funziona"`
• `/issue migliorare UI BeachRef più responsiva`"#;

const REJECT_USAGE: &str = r#"❌ **Formato /reject non valido**

**Uso corretto:**
• `/reject #123 "schermata bianca su mobile"`
• `/reject 123 - "bottone salva non funziona, errore 401 in console"`

**Cosa succede:**
1. Aggiungo un commento sulla issue con il tuo feedback
2. Cambio label: review-ready/deployed-test → `needs-fix`
3. La card torna in *In Progress* sul board"#;

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .map(|source| {
            Regex::new(&format!("(?is){source}")).expect("built-in pattern is valid")
        })
        .collect()
}

/// Tried in order; the first match wins.
static ISSUE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r#"^/issue\s*[-:]\s*["'](.+)["']"#,
        r"^/issue\s*[-:]\s*(.+)",
        r#"^/issue\s*["'](.+)["']"#,
        r"^/issue\s+(.+)",
    ])
});

static REJECT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r#"^/reject\s+#?(\d+)\s*[-:]\s*["'](.+)["']"#,
        r#"^/reject\s+#?(\d+)\s+["'](.+)["']"#,
        r"^/reject\s+#?(\d+)\s*[-:]\s*(.+)",
        r"^/reject\s+#?(\d+)\s+(.+)",
    ])
});

static ADDRESSED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^/ta\s+(\S+)\s+(\d+)\s+(\S+)").expect("built-in pattern is valid")
});

/// True if `text` invokes `/name`: the name is followed by nothing, a
/// separator, or a quote.
fn invokes(text: &str, name: &str) -> bool {
    let Some(head) = text.get(..name.len()) else {
        return false;
    };
    head.eq_ignore_ascii_case(name)
        && text[name.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric() && c != '_')
}

fn parse_issue(text: &str) -> Result<Command, ParseError> {
    ISSUE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|description| description.as_str().trim())
        .filter(|description| !description.is_empty())
        .map(|description| Command::Issue {
            description: description.to_string(),
        })
        .ok_or(ParseError::Issue)
}

fn parse_reject(text: &str) -> Result<Command, ParseError> {
    let captures = REJECT_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .ok_or(ParseError::Reject)?;

    let number = captures[1].parse().map_err(|_| ParseError::Reject)?;
    let feedback = captures[2].trim();
    if number == 0 || feedback.is_empty() {
        return Err(ParseError::Reject);
    }
    Ok(Command::Reject {
        number,
        feedback: feedback.to_string(),
    })
}

fn parse_addressed(text: &str) -> Result<Command, ParseError> {
    let captures = ADDRESSED_PATTERN
        .captures(text)
        .ok_or(ParseError::Addressed)?;
    Ok(Command::Addressed(AddressedAction {
        repo_short: captures[1].to_string(),
        number: captures[2].parse().map_err(|_| ParseError::Addressed)?,
        action: captures[3].to_string(),
    }))
}

impl Command {
    /// The command as typed.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Issue { .. } => "/issue",
            Self::Reject { .. } => "/reject",
            Self::Triage => "/triage",
            Self::Addressed(_) => "/ta",
        }
    }

    /// Parses a chat message.
    ///
    /// Returns `None` when the message is not a slash command at all, and
    /// `Some(Err(_))` when it names a command but breaks its grammar.
    #[must_use]
    pub fn parse(text: &str) -> Option<Result<Self, ParseError>> {
        let text = text.trim();
        if invokes(text, "/issue") {
            Some(parse_issue(text))
        } else if invokes(text, "/reject") {
            Some(parse_reject(text))
        } else if invokes(text, "/triage") {
            Some(Ok(Self::Triage))
        } else if invokes(text, "/ta") {
            Some(parse_addressed(text))
        } else {
            None
        }
    }
}
