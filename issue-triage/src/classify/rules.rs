//! Ordered phrase rules for free-text messages.
//!
//! Rules are evaluated in declaration order and the first match wins. The
//! order is the priority: feature phrasings come before bug phrasings, which
//! come before improvement phrasings.

use super::IssueKind;
use regex::Regex;
use std::sync::LazyLock;

/// What a rule captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// One group: the subject of the request.
    Subject,
    /// Two groups: a context, then the subject.
    ContextSubject,
}

/// A tagged phrase pattern.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub kind: IssueKind,
    pub pattern: Regex,
    pub arity: Arity,
}

impl PatternRule {
    fn new(kind: IssueKind, pattern: &str, arity: Arity) -> Self {
        Self {
            kind,
            pattern: Regex::new(&format!("(?i){pattern}")).expect("built-in pattern is valid"),
            arity,
        }
    }

    /// Applies the rule, returning the produced description on a match.
    #[must_use]
    pub fn apply(&self, text: &str) -> Option<String> {
        let captures = self.pattern.captures(text)?;
        let group = |index: usize| captures.get(index).map(|m| m.as_str().trim());

        match self.arity {
            Arity::Subject => group(1)
                .filter(|subject| !subject.is_empty())
                .map(str::to_string),
            Arity::ContextSubject => {
                let context = group(1)?;
                let subject = group(2).filter(|subject| !subject.is_empty())?;
                Some(format!("{subject} (per {context})"))
            }
        }
    }
}

/// A successful free-text extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub kind: IssueKind,
    pub description: String,
}

static BUILTIN_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    use Arity::{ContextSubject, Subject};
    use IssueKind::{Bug, Feature, Improvement};

    vec![
        PatternRule::new(Feature, r"voglio\s+(?:poter\s+)?(.+)", Subject),
        PatternRule::new(Feature, r"servire\s+(.+)", Subject),
        PatternRule::new(Feature, r"implementare\s+(.+)", Subject),
        PatternRule::new(Feature, r"aggiungere\s+(.+)", Subject),
        PatternRule::new(Feature, r"creare\s+(?:un\s+)?(.+)", Subject),
        PatternRule::new(Feature, r"per\s+(.+)\s+voglio\s+(.+)", ContextSubject),
        PatternRule::new(Feature, r"nel\s+(.+)\s+per\s+(.+)", ContextSubject),
        PatternRule::new(Bug, r"(?:bug|errore|problema)\s+(?:in\s+|con\s+|nel\s+)?(.+)", Subject),
        PatternRule::new(Bug, r"non\s+funziona\s+(.+)", Subject),
        PatternRule::new(Bug, r"(.+)\s+non\s+va", Subject),
        PatternRule::new(Improvement, r"migliorare\s+(.+)", Subject),
        PatternRule::new(Improvement, r"ottimizzare\s+(.+)", Subject),
        PatternRule::new(Improvement, r"rendere\s+(.+)\s+più\s+(.+)", Subject),
    ]
});

/// The built-in rule list, in priority order.
#[must_use]
pub fn builtin_rules() -> &'static [PatternRule] {
    &BUILTIN_RULES
}

/// Runs `rules` in order against `text`; the first rule that matches decides.
#[must_use]
pub fn extract(rules: &[PatternRule], text: &str) -> Option<Extraction> {
    rules.iter().find_map(|rule| {
        rule.apply(text).map(|description| Extraction {
            kind: rule.kind,
            description,
        })
    })
}
