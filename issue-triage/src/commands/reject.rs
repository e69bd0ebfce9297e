//! `/reject`: send a reviewed issue back to work.

use crate::board::BoardSync;
use crate::chat::Reply;
use crate::config::Settings;
use crate::repository::Repository;
use crate::templates::{BuiltinTemplate, TemplateError, TemplateRenderer};
use crate::tracker::{IssueDetails, IssueTracker, TrackerError};
use serde_json::json;
use tracing::{debug, info, info_span, warn, Instrument};

/// Renders the rework comment.
///
/// The reviewer handle is the first word of `author`, lower-cased.
///
/// # Errors
///
/// Returns [`TemplateError`] if the template fails to render.
pub fn reject_comment(
    renderer: &TemplateRenderer,
    timestamp: &str,
    author: &str,
    feedback: &str,
    number: u64,
) -> Result<String, TemplateError> {
    let reviewer = author
        .split_whitespace()
        .next()
        .unwrap_or("operator")
        .to_lowercase();
    renderer.render(
        BuiltinTemplate::RejectComment,
        &json!({
            "timestamp": timestamp,
            "reviewer": reviewer,
            "feedback": feedback,
            "number": number,
        }),
    )
}

/// Tries the search repositories in order.
async fn find_issue(
    tracker: &dyn IssueTracker,
    repositories: &[Repository],
    number: u64,
) -> Option<IssueDetails> {
    for repo in repositories {
        match tracker.view_issue(repo, number).await {
            Ok(details) => return Some(details),
            Err(TrackerError::NotFound { .. }) => debug!(repo = %repo, "Not here"),
            Err(e) => warn!(repo = %repo, error = %e, "Lookup failed"),
        }
    }
    None
}

/// Handles `/reject #number "feedback"`.
pub async fn reject_issue(
    tracker: &dyn IssueTracker,
    board: &BoardSync,
    renderer: &TemplateRenderer,
    settings: &Settings,
    author: &str,
    number: u64,
    feedback: &str,
) -> Reply {
    let span = info_span!("reject_issue", issue_number = number);

    async {
        let repositories = settings.reject_repositories();
        let Some(issue) = find_issue(tracker, &repositories, number).await else {
            let searched: Vec<&str> = repositories.iter().map(|r| r.name.as_str()).collect();
            return Reply::text(format!(
                "❌ Issue #{number} non trovata in: {}",
                searched.join(", ")
            ));
        };
        let repo = &issue.repository;

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
        let comment = match reject_comment(renderer, &timestamp, author, feedback, number) {
            Ok(comment) => comment,
            Err(e) => return Reply::text(format!("❌ Errore preparazione commento #{number}: {e}")),
        };

        if let Err(e) = tracker.comment(repo, number, &comment).await {
            warn!(repo = %repo, error = %e, "Comment failed");
            return Reply::text(format!("❌ Errore aggiunta commento su issue #{number}: {e}"));
        }

        // The fix label goes on before any rework label comes off.
        let fix_label = &settings.reject.fix_label;
        if let Err(e) = tracker
            .add_labels(repo, number, std::slice::from_ref(fix_label))
            .await
        {
            warn!(repo = %repo, error = %e, "Label update failed");
            return Reply::text(format!("❌ Errore aggiornamento label issue #{number}: {e}"));
        }

        let removed: Vec<&String> = issue
            .labels
            .iter()
            .filter(|label| *label != fix_label && settings.reject.rework_labels.contains(*label))
            .collect();
        for label in &removed {
            if let Err(e) = tracker.remove_label(repo, number, label.as_str()).await {
                warn!(repo = %repo, label = %label, error = %e, "Label removal failed");
                return Reply::text(format!("❌ Errore aggiornamento label issue #{number}: {e}"));
            }
        }

        let board_line = if board.in_progress(repo, number).await {
            "📋 Card spostata in *In Progress*"
        } else {
            "⚠️ Board non aggiornata (In Progress)"
        };
        info!(repo = %repo, removed = removed.len(), "Issue sent back to work");

        let removed_text = if removed.is_empty() {
            "nessuna".to_string()
        } else {
            removed
                .iter()
                .map(|label| label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        Reply::text(format!(
            "🔧 **Issue #{number} rimandata in lavorazione**\n\n\
             🔗 **URL:** {url}\n\
             📋 **Titolo:** {title}\n\
             📁 **Repository:** {repo}\n\n\
             **Azioni eseguite:**\n\
             • 💬 Commento feedback aggiunto alla issue\n\
             • 🏷️ Rimossa: `{removed_text}`\n\
             • 🏷️ Aggiunta: `{fix_label}`\n\
             • {board_line}\n\n\
             **Feedback registrato:**\n\
             _{feedback}_",
            url = issue.url,
            title = issue.title,
        ))
    }
    .instrument(span)
    .await
}
