//! Operator answers to a triage prompt.

use crate::config::AssignableLabel;

/// What to do with the presented issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageAction {
    /// Hand the issue to the agent behind this label.
    Assign(String),
    Skip,
    Close,
}

fn find_label(word: &str, labels: &[AssignableLabel]) -> Option<TriageAction> {
    labels
        .iter()
        .find(|agent| agent.label.eq_ignore_ascii_case(word))
        .map(|agent| TriageAction::Assign(agent.label.clone()))
}

impl TriageAction {
    /// Parses a prompt reply: a numeric shortcut, an assignable label,
    /// `salta` or `chiudi`. Anything else is not a triage reply.
    #[must_use]
    pub fn parse_reply(text: &str, labels: &[AssignableLabel]) -> Option<Self> {
        let word = text.trim().to_lowercase();

        // Shortcuts are matched literally, so "+1" or "01" are not "1".
        let shortcut = labels
            .iter()
            .enumerate()
            .find(|(index, _)| word == (index + 1).to_string());
        if let Some((_, agent)) = shortcut {
            return Some(Self::Assign(agent.label.clone()));
        }

        match word.as_str() {
            "salta" => Some(Self::Skip),
            "chiudi" => Some(Self::Close),
            _ => find_label(&word, labels),
        }
    }

    /// Parses the action word of `/ta`: an assignable label, `skip` or `close`.
    #[must_use]
    pub fn parse_addressed(word: &str, labels: &[AssignableLabel]) -> Option<Self> {
        let word = word.trim().to_lowercase();
        match word.as_str() {
            "skip" => Some(Self::Skip),
            "close" => Some(Self::Close),
            _ => find_label(&word, labels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn labels() -> Vec<AssignableLabel> {
        Settings::default().triage.assignable_labels
    }

    #[test]
    fn numeric_shortcuts_follow_configured_order() {
        let labels = labels();
        assert_eq!(
            TriageAction::parse_reply("1", &labels),
            Some(TriageAction::Assign("claude-code".to_string()))
        );
        assert_eq!(
            TriageAction::parse_reply(" 3 ", &labels),
            Some(TriageAction::Assign("codex".to_string()))
        );
        assert_eq!(TriageAction::parse_reply("4", &labels), None);
        assert_eq!(TriageAction::parse_reply("0", &labels), None);
    }

    #[test]
    fn shortcuts_must_be_written_exactly() {
        let labels = labels();
        for reply in ["+1", "01", "1.0", "1 2"] {
            assert_eq!(TriageAction::parse_reply(reply, &labels), None, "{reply}");
        }
    }

    #[test]
    fn words_are_case_insensitive() {
        let labels = labels();
        assert_eq!(
            TriageAction::parse_reply("Ciccio", &labels),
            Some(TriageAction::Assign("ciccio".to_string()))
        );
        assert_eq!(TriageAction::parse_reply("SALTA", &labels), Some(TriageAction::Skip));
        assert_eq!(TriageAction::parse_reply("chiudi", &labels), Some(TriageAction::Close));
    }

    #[test]
    fn other_text_is_not_a_reply() {
        assert_eq!(TriageAction::parse_reply("skip", &labels()), None);
        assert_eq!(TriageAction::parse_reply("ok grazie", &labels()), None);
    }

    #[test]
    fn addressed_actions_use_english_words() {
        let labels = labels();
        assert_eq!(TriageAction::parse_addressed("skip", &labels), Some(TriageAction::Skip));
        assert_eq!(TriageAction::parse_addressed("close", &labels), Some(TriageAction::Close));
        assert_eq!(
            TriageAction::parse_addressed("codex", &labels),
            Some(TriageAction::Assign("codex".to_string()))
        );
        assert_eq!(TriageAction::parse_addressed("salta", &labels), None);
    }
}
