//! Contract Tests for Name Collision Handling
//!
//! One batch-wide policy decision against a single snapshot of the live
//! sessions, then applied per request.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::path::Path;

use termlaunch::models::LaunchOutcome;
use termlaunch::session::{ConflictPolicy, PromptRecord, ScriptedPrompt};
use test_utils::*;

#[tokio::test]
async fn test_no_collision_does_not_prompt() {
    let mut h = harness_with_live(&["other"], ScriptedPrompt::new());

    let outcome = h
        .orchestrator
        .launch(&ungrouped(vec![terminal("A")]), None)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert!(h.prompt.asked().is_empty());
}

#[tokio::test]
async fn test_single_prompt_for_whole_batch() {
    let mut h = harness_with_live(&["A", "B", "C"], ScriptedPrompt::always(ConflictPolicy::Skip));
    let config = ungrouped(vec![terminal("A"), terminal("B"), terminal("C"), terminal("D")]);

    h.orchestrator.launch(&config, None).await.unwrap();

    assert_eq!(
        h.prompt.asked(),
        vec![PromptRecord::Conflict(vec![
            "A".to_string(),
            "B".to_string(),
            "C".to_string()
        ])]
    );
}

#[tokio::test]
async fn test_skip_creates_no_colliding_session() {
    let mut h = harness_with_live(&["X"], ScriptedPrompt::new().with_policy(ConflictPolicy::Skip));
    let config = ungrouped(vec![terminal("X"), terminal("Y")]);

    let outcome = h.orchestrator.launch(&config, None).await.unwrap();

    assert!(matches!(outcome, LaunchOutcome::Success { created: 1 }));
    assert_eq!(h.host.created_names(), vec!["Y"]);
    assert!(h.host.disposals().is_empty());
}

#[tokio::test]
async fn test_rename_picks_smallest_free_suffix() {
    let mut h = harness_with_live(
        &["X", "X (2)"],
        ScriptedPrompt::new().with_policy(ConflictPolicy::Rename),
    );

    h.orchestrator
        .launch(&ungrouped(vec![terminal("X")]), None)
        .await
        .unwrap();
    assert_eq!(h.host.created_names(), vec!["X (3)"]);
}

#[tokio::test]
async fn test_rename_accounts_for_names_created_in_batch() {
    let mut h = harness_with_live(&["X"], ScriptedPrompt::always(ConflictPolicy::Rename));

    h.orchestrator
        .launch(&ungrouped(vec![terminal("X"), terminal("X")]), None)
        .await
        .unwrap();
    assert_eq!(h.host.created_names(), vec!["X (2)", "X (3)"]);
}

#[tokio::test]
async fn test_rename_avoids_names_requested_later() {
    let mut h = harness_with_live(&["X"], ScriptedPrompt::always(ConflictPolicy::Rename));

    h.orchestrator
        .launch(&ungrouped(vec![terminal("X"), terminal("X (2)")]), None)
        .await
        .unwrap();
    assert_eq!(h.host.created_names(), vec!["X (3)", "X (2)"]);
}

#[tokio::test]
async fn test_replace_disposes_before_creating() {
    let mut h = harness_with_live(&["X"], ScriptedPrompt::always(ConflictPolicy::Replace));

    h.orchestrator
        .launch(&ungrouped(vec![terminal("X")]), None)
        .await
        .unwrap();

    let events = h.host.events();
    let disposed = events
        .iter()
        .position(|e| matches!(e, HostEvent::Disposed { id } if id == "live-1"))
        .unwrap();
    let created = events
        .iter()
        .position(|e| matches!(e, HostEvent::Created { name, .. } if name == "X"))
        .unwrap();
    assert!(disposed < created);
    assert_eq!(h.host.live_names(), vec!["X"]);
}

#[tokio::test]
async fn test_replace_disposes_each_live_session_once() {
    let mut h = harness_with_live(&["X", "X"], ScriptedPrompt::always(ConflictPolicy::Replace));

    h.orchestrator
        .launch(&ungrouped(vec![terminal("X"), terminal("X")]), None)
        .await
        .unwrap();

    assert_eq!(h.host.disposals(), vec!["live-1", "live-2"]);
    assert_eq!(h.host.created_names(), vec!["X", "X"]);
}

#[tokio::test]
async fn test_replace_survives_dispose_failure() {
    let clock = std::sync::Arc::new(termlaunch::session::ManualClock::new());
    let host = MockHost::new(clock.clone()).with_live(&["X"]).fail_dispose();
    let mut h = harness_with(host, clock, ScriptedPrompt::always(ConflictPolicy::Replace));

    let outcome = h
        .orchestrator
        .launch(&ungrouped(vec![terminal("X")]), None)
        .await
        .unwrap();
    assert!(outcome.is_success());
    assert_eq!(h.host.created_names(), vec!["X"]);
}

#[tokio::test]
async fn test_cancel_creates_nothing() {
    let mut h = harness_with_live(
        &["X"],
        ScriptedPrompt::new().with_policy(ConflictPolicy::Cancel),
    );
    let config = ungrouped(vec![terminal("X"), terminal("Y")]);

    let outcome = h.orchestrator.launch(&config, None).await.unwrap();

    assert!(matches!(outcome, LaunchOutcome::UserCancelled));
    assert_eq!(h.host.events(), vec![HostEvent::Listed]);
}

#[tokio::test]
async fn test_collision_uses_prefixed_name() {
    let mut h = harness_with_live(&["[shop] web"], ScriptedPrompt::always(ConflictPolicy::Skip));
    let config = ungrouped(vec![terminal("web")]);

    h.orchestrator
        .launch(&config, Some(Path::new("/src/shop")))
        .await
        .unwrap();
    assert_eq!(h.prompt.conflict_prompts(), 1);
    assert!(h.host.created_names().is_empty());

    // Unprefixed "web" does not collide with "[shop] web"
    h.orchestrator.launch(&config, None).await.unwrap();
    assert_eq!(h.prompt.conflict_prompts(), 1);
    assert_eq!(h.host.created_names(), vec!["web"]);
}

#[tokio::test]
async fn test_replacing_a_tracked_session_drops_its_handle() {
    let mut h = harness_with_live(&[], ScriptedPrompt::always(ConflictPolicy::Replace));
    let config = ungrouped(vec![terminal_with_command("X", "run")]);

    h.orchestrator.launch(&config, None).await.unwrap();
    let old_id = h.orchestrator.tracked()[0].id.clone();

    h.orchestrator.launch(&config, None).await.unwrap();
    assert_eq!(h.orchestrator.tracked().len(), 1);
    assert_ne!(h.orchestrator.tracked()[0].id, old_id);

    // The replaced session's queued text is dropped
    h.orchestrator.run_dispatches().await;
    let sent_to: Vec<String> = h.host.injections().into_iter().map(|i| i.id).collect();
    assert_eq!(sent_to, vec![h.orchestrator.tracked()[0].id.clone()]);
}
