mod common;

use common::{from_operator, FakeBoard, FakeTracker, Harness, OPERATOR};
use issue_triage::triage::{ADDRESSED_USAGE, ALL_CLEAR, COMPLETED};
use issue_triage::{CloseReason, Message};

const TODO: &str = "f75ad846";
const DONE: &str = "98236657";

/// Two repositories to walk: progetto-casa (a feature and a bug) and finn
/// (one free issue, one already owned by an agent).
fn backlog() -> FakeTracker {
    FakeTracker::new()
        .with_issue("progetto-casa", 3, "Upload CME", &["enhancement"])
        .with_issue("progetto-casa", 5, "Crash su relazione", &["bug"])
        .with_issue("finn", 1, "Import CSV", &["claude-code"])
        .with_issue("finn", 2, "Export PDF", &[])
        .with_issue("finn", 8, "Ricontrollo", &["in-progress"])
}

#[tokio::test]
async fn start_presents_bugs_first_and_counts_free_issues() {
    let harness = Harness::new(backlog(), FakeBoard::new());

    let reply = harness.dispatcher.triage().start().await;

    assert!(reply.prompt);
    assert!(reply.invalidate_previous);
    assert!(reply
        .text
        .starts_with("🗂️ *Triage issues* — 3 da assegnare in 2 progetti\n\n"));
    assert!(reply.text.contains("📁 *progetto-casa* — progetto 1/2"));
    assert!(reply.text.contains("📋 *Issue 1/2*"));
    assert!(reply.text.contains("📌 *Crash su relazione*"));

    let pending = harness.dispatcher.triage().pending().await.unwrap();
    assert_eq!(pending.number, 5);
    assert_eq!(pending.repo, "ecologicaleaving/progetto-casa");
}

#[tokio::test]
async fn walk_assigns_skips_and_closes_until_done() {
    let harness = Harness::new(backlog(), FakeBoard::new());
    let dispatcher = &harness.dispatcher;
    dispatcher.triage().start().await;

    // Assign the bug; the walk stays on progetto-casa.
    let reply = dispatcher.handle_message(&from_operator("1")).await.unwrap();
    assert!(reply.prompt);
    assert!(reply
        .text
        .starts_with("✅ `progetto-casa #5` → *claude-code* + @ecologicaleaving\n\n"));
    assert!(reply.text.contains("📌 *Upload CME*"));
    assert!(harness
        .tracker
        .labels_of("progetto-casa", 5)
        .contains(&"claude-code".to_string()));
    assert_eq!(
        harness.tracker.state.lock().unwrap().assignees,
        vec![(
            "ecologicaleaving/progetto-casa".to_string(),
            5,
            "ecologicaleaving".to_string()
        )]
    );
    assert_eq!(harness.board.last_status().as_deref(), Some(TODO));

    // Skip the feature; the walk moves on to finn.
    let reply = dispatcher.handle_message(&from_operator("salta")).await.unwrap();
    assert!(reply.text.starts_with("⏭️ Saltata `progetto-casa #3`"));
    assert!(reply.text.contains("➡️ *Prossimo progetto: finn*"));
    assert!(reply.text.contains("📌 *Export PDF*"));
    assert!(harness.tracker.labels_of("progetto-casa", 3) == vec!["enhancement".to_string()]);

    // Close the last one.
    let reply = dispatcher.handle_message(&from_operator("chiudi")).await.unwrap();
    assert!(!reply.prompt);
    assert!(reply.text.starts_with("🔒 Chiusa `finn #2`"));
    assert!(reply.text.ends_with(COMPLETED));
    assert_eq!(
        harness.tracker.state.lock().unwrap().closed,
        vec![("ecologicaleaving/finn".to_string(), 2, CloseReason::NotPlanned)]
    );
    assert_eq!(harness.board.last_status().as_deref(), Some(DONE));
    assert!(dispatcher.triage().pending().await.is_none());
}

#[tokio::test]
async fn label_name_answers_like_its_shortcut() {
    let harness = Harness::new(backlog(), FakeBoard::new());
    harness.dispatcher.triage().start().await;

    let reply = harness
        .dispatcher
        .handle_message(&from_operator("Codex"))
        .await
        .unwrap();

    assert!(reply.text.starts_with("✅ `progetto-casa #5` → *codex*"));
}

#[tokio::test]
async fn empty_backlog_reports_all_clear() {
    let tracker = FakeTracker::new().with_issue("finn", 1, "Import CSV", &["codex"]);
    let harness = Harness::new(tracker, FakeBoard::new());

    let reply = harness
        .dispatcher
        .handle_message(&from_operator("/triage"))
        .await
        .unwrap();

    assert_eq!(reply.text, ALL_CLEAR);
    assert!(reply.invalidate_previous);
    assert!(!reply.prompt);
    assert!(harness.dispatcher.triage().pending().await.is_none());
}

#[tokio::test]
async fn answers_without_pending_issue_are_not_triage_replies() {
    let harness = Harness::new(backlog(), FakeBoard::new());

    assert!(harness
        .dispatcher
        .handle_message(&from_operator("1"))
        .await
        .is_none());
    assert!(harness.tracker.labels_of("progetto-casa", 5) == vec!["bug".to_string()]);
}

#[tokio::test]
async fn addressed_action_targets_named_issue() {
    let harness = Harness::new(backlog(), FakeBoard::new());

    let reply = harness
        .dispatcher
        .handle_message(&from_operator("/ta FINN 2 ciccio"))
        .await
        .unwrap();

    assert!(reply.text.starts_with("✅ `finn #2` → *ciccio* + @ecologicaleaving"));
    assert!(harness
        .tracker
        .labels_of("finn", 2)
        .contains(&"ciccio".to_string()));
}

#[tokio::test]
async fn addressed_action_with_unknown_word_shows_usage() {
    let harness = Harness::new(backlog(), FakeBoard::new());

    let reply = harness
        .dispatcher
        .handle_message(&from_operator("/ta finn 2 boh"))
        .await
        .unwrap();

    assert_eq!(reply.text, ADDRESSED_USAGE);
    assert!(harness.tracker.labels_of("finn", 2).is_empty());
}

#[tokio::test]
async fn only_operator_drives_triage() {
    let harness = Harness::new(backlog(), FakeBoard::new());

    let refused = harness
        .dispatcher
        .handle_message(&Message::new("someone", "/triage"))
        .await
        .unwrap();
    assert_eq!(refused.text, format!("❌ Solo {OPERATOR} può usare /triage."));
    assert!(harness.dispatcher.triage().pending().await.is_none());

    harness.dispatcher.triage().start().await;
    let ignored = harness
        .dispatcher
        .handle_message(&Message::new("someone", "chiudi"))
        .await;
    assert!(ignored.is_none());
    assert!(harness.tracker.state.lock().unwrap().closed.is_empty());
}

#[tokio::test]
async fn board_failure_does_not_block_assignment() {
    let harness = Harness::new(backlog(), FakeBoard::offline());
    harness.dispatcher.triage().start().await;

    let reply = harness
        .dispatcher
        .handle_message(&from_operator("2"))
        .await
        .unwrap();

    assert!(reply.text.contains("⚠️ Board non aggiornata (Todo)"));
    assert!(harness
        .tracker
        .labels_of("progetto-casa", 5)
        .contains(&"ciccio".to_string()));
}

#[tokio::test]
async fn prompts_are_tracked_for_invalidation() {
    let harness = Harness::new(backlog(), FakeBoard::new());
    let triage = harness.dispatcher.triage();

    triage.record_prompt("10").await;
    triage.record_prompt("11").await;

    assert_eq!(triage.stale_prompts().await, vec!["10".to_string(), "11".to_string()]);
}
