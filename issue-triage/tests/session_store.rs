mod common;

use common::{from_operator, FakeBoard, FakeTracker, Harness};
use issue_triage::FileSessionStore;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn backlog() -> FakeTracker {
    FakeTracker::new()
        .with_issue("finn", 2, "Export PDF", &[])
        .with_issue("finn", 4, "Budget annuale", &["bug"])
}

fn harness_in(dir: &TempDir) -> Harness {
    Harness::with_store(
        backlog(),
        FakeBoard::new(),
        Arc::new(FileSessionStore::new(dir.path())),
    )
}

#[tokio::test]
async fn pending_issue_survives_a_restart() {
    let temp = TempDir::new().unwrap();

    harness_in(&temp).dispatcher.triage().start().await;

    let restarted = harness_in(&temp);
    let reply = restarted
        .dispatcher
        .handle_message(&from_operator("chiudi"))
        .await
        .unwrap();

    assert!(reply.text.starts_with("🔒 Chiusa `finn #4`"));
    assert!(reply.text.contains("📌 *Export PDF*"));
}

#[tokio::test]
async fn document_keeps_its_json_shape() {
    let temp = TempDir::new().unwrap();
    let harness = harness_in(&temp);

    harness.dispatcher.triage().start().await;
    harness.dispatcher.triage().record_prompt("77").await;

    let raw = fs::read_to_string(temp.path().join("triage_state.json")).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(document["active_message_id"], "77");
    assert_eq!(document["pending_issue"]["repo"], "ecologicaleaving/finn");
    assert_eq!(document["pending_issue"]["repo_short"], "finn");
    assert_eq!(document["pending_issue"]["number"], "4");
    assert_eq!(document["pending_issue"]["title"], "Budget annuale");
}

#[tokio::test]
async fn completed_walk_clears_pending_issue() {
    let temp = TempDir::new().unwrap();
    let harness = Harness::with_store(
        FakeTracker::new().with_issue("finn", 2, "Export PDF", &[]),
        FakeBoard::new(),
        Arc::new(FileSessionStore::new(temp.path())),
    );

    harness.dispatcher.triage().start().await;
    harness
        .dispatcher
        .handle_message(&from_operator("3"))
        .await
        .unwrap();

    let raw = fs::read_to_string(temp.path().join("triage_state.json")).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(document["pending_issue"], serde_json::json!({}));
}

#[tokio::test]
async fn corrupt_document_is_replaced_on_next_walk() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("triage_state.json"), "{ not json").unwrap();
    let harness = harness_in(&temp);

    let reply = harness.dispatcher.triage().start().await;

    assert!(reply.prompt);
    assert_eq!(harness.dispatcher.triage().pending().await.unwrap().number, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn walk_on_worker_threads_uses_file_store() {
    let temp = TempDir::new().unwrap();
    let harness = harness_in(&temp);

    harness.dispatcher.triage().start().await;
    harness.dispatcher.triage().record_prompt("5").await;
    let reply = harness
        .dispatcher
        .handle_message(&from_operator("salta"))
        .await
        .unwrap();

    assert!(reply.text.starts_with("⏭️ Saltata `finn #4`"));
    let pending = harness.dispatcher.triage().pending().await.unwrap();
    assert_eq!(pending.number, 2);
    assert_eq!(harness.dispatcher.triage().stale_prompts().await, vec!["5".to_string()]);
}
