//! Issue creation from a classified request.

use crate::board::BoardSync;
use crate::body::BodyGenerator;
use crate::chat::Reply;
use crate::classify::IssueRequest;
use crate::config::Settings;
use crate::context::ContextProvider;
use crate::tracker::{IssueTracker, LabelDefinition, NewIssue};
use tracing::{info, info_span, warn, Instrument};

fn failure(request: &IssueRequest, error: &dyn std::fmt::Display) -> Reply {
    Reply::text(format!(
        "❌ **Errore nella creazione issue**\n\n\
         **Dati estratti:**\n\
         • **Repo:** {}\n\
         • **Tipo:** {}\n\
         • **Titolo:** {}\n\n\
         Errore: {error}",
        request.repository,
        request.kind,
        request.title
    ))
}

/// Creates the issue for `request`: profile, body, agent label, assignee, then
/// placement in the `Todo` column.
///
/// Board placement is reported on its own line and never fails the command.
pub async fn create_issue(
    tracker: &dyn IssueTracker,
    board: &BoardSync,
    context: &dyn ContextProvider,
    generator: &BodyGenerator,
    settings: &Settings,
    request: &IssueRequest,
) -> Reply {
    let span = info_span!(
        "create_issue",
        repo = %request.repository,
        kind = %request.kind
    );

    async {
        let repo = &request.repository;
        let profile = context.profile(repo).await;

        let body = match generator.render(request, &profile) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Body rendering failed");
                return failure(request, &e);
            }
        };

        let agent_label = LabelDefinition {
            name: settings.issue.agent_label.clone(),
            color: settings.issue.agent_label_color.clone(),
            description: settings.issue.agent_label_description.clone(),
        };
        if let Err(e) = tracker.ensure_label(repo, &agent_label).await {
            warn!(error = %e, label = %agent_label.name, "Could not ensure agent label");
        }

        let mut labels = request.labels.clone();
        if !labels.contains(&agent_label.name) {
            labels.push(agent_label.name.clone());
        }

        let new_issue = NewIssue {
            title: request.title.clone(),
            body: body.text,
            labels: labels.clone(),
            assignees: vec![settings.assignee.clone()],
        };

        let created = match tracker.create_issue(repo, new_issue).await {
            Ok(created) => created,
            Err(e) => {
                warn!(error = %e, "Issue creation failed");
                return failure(request, &e);
            }
        };
        info!(issue_number = created.number, clarification = body.needs_clarification, "Issue filed");

        let board_line = if board.todo(repo, created.number).await {
            "📋 Aggiunta al board in *Todo*".to_string()
        } else {
            format!(
                "⚠️ Board non aggiornata: riprova con `issue-triage place-card {}`",
                created.url
            )
        };

        let text = if body.needs_clarification {
            format!(
                "⚠️ **Issue creata - Richiede chiarimenti**\n\n\
                 🔗 **URL:** {url}\n\
                 📋 **Titolo:** {title}\n\
                 📁 **Repository:** {repo}\n\n\
                 📝 **AZIONE RICHIESTA:**\n\
                 L'issue ha bisogno di maggiori dettagli per essere processabile.\n\
                 Consulta la issue per le domande specifiche e riformula con più dettagli.\n\n\
                 {board_line}",
                url = created.url,
                title = request.title,
            )
        } else {
            format!(
                "✅ **Issue strutturata creata!**\n\n\
                 🔗 **URL:** {url}\n\
                 📋 **Titolo:** {title}\n\
                 📁 **Repository:** {repo}\n\
                 🏷️ **Tipo:** {kind}\n\
                 📌 **Labels:** {labels}\n\
                 👤 **Assigned to:** {assignee}\n\n\
                 {board_line}",
                url = created.url,
                title = request.title,
                kind = request.kind,
                labels = labels.join(", "),
                assignee = settings.assignee,
            )
        };
        Reply::text(text)
    }
    .instrument(span)
    .await
}
