//! Chat text shown during triage.

use super::BacklogItem;
use crate::config::AssignableLabel;
use std::fmt::Write;

pub const ALL_CLEAR: &str = "✅ *Tutto in ordine!*\n\nNon ci sono issue aperte senza assegnazione.";

pub const COMPLETED: &str = "🎉 *Triage completato!* Tutte le issue sono assegnate.";

/// Keycap emoji for shortcuts 1 to 9.
fn keycap(n: usize) -> String {
    format!("{n}\u{fe0f}\u{20e3}")
}

/// Opening line of a triage walk.
#[must_use]
pub fn header(issues: usize, projects: usize) -> String {
    format!("🗂️ *Triage issues* — {issues} da assegnare in {projects} progetti\n\n")
}

/// Line shown when the walk moves to another repository.
#[must_use]
pub fn next_project_separator(name: &str) -> String {
    format!("\n\n➡️ *Prossimo progetto: {name}*\n\n")
}

/// Reply menu: one line per assignable label, then `salta` and `chiudi`.
#[must_use]
pub fn menu(labels: &[AssignableLabel]) -> String {
    let mut out = String::from("\n👇 *Rispondi con:*\n");
    for (index, agent) in labels.iter().enumerate() {
        let _ = writeln!(
            out,
            "{} `{}` — {} {}",
            keycap(index + 1),
            agent.label,
            agent.emoji,
            agent.display_name
        );
    }
    out.push_str("▶️ `salta` — passa oltre\n");
    out.push_str("🔒 `chiudi` — chiudi issue");
    out
}

/// Position of the presented issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based index inside the repository group.
    pub index: usize,
    pub group_size: usize,
    /// 1-based index of the repository group.
    pub project: usize,
    pub projects: usize,
}

/// Presentation of one issue, menu included.
#[must_use]
pub fn issue(item: &BacklogItem, position: Position, labels: &[AssignableLabel]) -> String {
    let mut out = format!(
        "📁 *{}* — progetto {}/{}\n📋 *Issue {}/{}*\n\n📌 *{}*\n\n",
        item.repository.name,
        position.project,
        position.projects,
        position.index,
        position.group_size,
        item.title
    );
    if !item.current_labels.is_empty() {
        let _ = writeln!(out, "🏷️ `{}`", item.current_labels.join(", "));
    }
    let _ = write!(out, "🔗 [Apri su GitHub]({})", item.url);
    out.push_str(&menu(labels));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::repository::Repository;

    #[test]
    fn menu_lists_agents_then_skip_and_close() {
        let menu = menu(&Settings::default().triage.assignable_labels);
        let lines: Vec<&str> = menu.lines().collect();
        assert_eq!(lines[1], "👇 *Rispondi con:*");
        assert_eq!(lines[2], "1\u{fe0f}\u{20e3} `claude-code` — 🤖 Claude Code");
        assert_eq!(lines[4], "3\u{fe0f}\u{20e3} `codex` — ⚡ Codex");
        assert_eq!(lines[5], "▶️ `salta` — passa oltre");
        assert_eq!(lines[6], "🔒 `chiudi` — chiudi issue");
    }

    #[test]
    fn issue_shows_position_labels_and_link() {
        let item = BacklogItem {
            repository: Repository::new("o", "finn"),
            number: 4,
            title: "Export PDF".to_string(),
            url: "https://github.com/o/finn/issues/4".to_string(),
            current_labels: vec!["bug".to_string(), "ui".to_string()],
        };
        let position = Position {
            index: 1,
            group_size: 3,
            project: 2,
            projects: 5,
        };
        let text = issue(&item, position, &[]);
        assert!(text.starts_with("📁 *finn* — progetto 2/5\n📋 *Issue 1/3*"));
        assert!(text.contains("🏷️ `bug, ui`"));
        assert!(text.contains("🔗 [Apri su GitHub](https://github.com/o/finn/issues/4)"));
    }
}
