//! Contract Tests for Batch Launching
//!
//! Flattening, naming, path resolution, session construction, dispatch
//! timing and per-request failure isolation, all driven against the mock
//! host on virtual time.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use termlaunch::config::loader::ConfigLoader;
use termlaunch::error::Error;
use termlaunch::models::{HostColor, LaunchOutcome, TerminalColor};
use termlaunch::session::{ManualClock, Orchestrator, ScriptedPrompt};
use test_utils::*;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[tokio::test]
async fn test_single_command_end_to_end() {
    let mut h = harness();
    let config = ConfigLoader::parse(r#"{ "terminals": [{ "name": "A", "command": "echo hi" }] }"#)
        .unwrap();

    let outcome = h.orchestrator.launch(&config, None).await.unwrap();
    assert!(matches!(outcome, LaunchOutcome::Success { created: 1 }));
    assert_eq!(h.host.created_names(), vec!["A"]);

    // Nothing is typed before the grace period
    assert!(h.host.injections().is_empty());

    h.orchestrator.run_dispatches().await;
    assert_eq!(h.host.injections_for("A"), vec![(ms(500), "echo hi".to_string())]);
    assert_eq!(h.host.injections().len(), 1);
}

#[tokio::test]
async fn test_groups_exclude_ungrouped_terminals() {
    let mut h = harness();
    let config = ConfigLoader::parse(
        r#"{
            "groups": [{ "name": "backend", "terminals": [{ "name": "G1" }, { "name": "G2" }] }],
            "terminals": [{ "name": "U" }]
        }"#,
    )
    .unwrap();

    let outcome = h.orchestrator.launch(&config, None).await.unwrap();
    assert_eq!(outcome.created(), 2);
    assert_eq!(h.host.created_names(), vec!["G1", "G2"]);
}

#[tokio::test]
async fn test_terminals_used_when_groups_empty() {
    let mut h = harness();
    let config =
        ConfigLoader::parse(r#"{ "groups": [], "terminals": [{ "name": "U" }] }"#).unwrap();

    h.orchestrator.launch(&config, None).await.unwrap();
    assert_eq!(h.host.created_names(), vec!["U"]);
}

#[tokio::test]
async fn test_group_order_then_terminal_order() {
    let mut h = harness();
    let config = grouped(vec![
        vec![terminal("a1"), terminal("a2")],
        vec![terminal("b1")],
    ]);

    h.orchestrator.launch(&config, None).await.unwrap();
    assert_eq!(h.host.created_names(), vec!["a1", "a2", "b1"]);
}

#[tokio::test]
async fn test_project_prefix() {
    let mut h = harness();
    let config = ungrouped(vec![terminal("web")]);

    h.orchestrator
        .launch(&config, Some(Path::new("/home/me/shop")))
        .await
        .unwrap();
    assert_eq!(h.host.created_names(), vec!["[shop] web"]);
}

#[tokio::test]
async fn test_script_takes_priority() {
    let mut h = harness();
    let mut term = terminal("all");
    term.script = Some(PathBuf::from("scripts/dev.sh"));
    term.commands = Some(vec!["one".to_string(), "two".to_string()]);
    term.command = Some("three".to_string());

    h.orchestrator
        .launch(&ungrouped(vec![term]), Some(Path::new("/proj")))
        .await
        .unwrap();
    h.orchestrator.run_dispatches().await;

    assert_eq!(
        h.host.injections_for("[proj] all"),
        vec![(ms(500), "/proj/scripts/dev.sh".to_string())]
    );
    assert_eq!(h.host.injections().len(), 1);
}

#[tokio::test]
async fn test_dotted_paths_reach_the_host_folded() {
    let mut h = harness();
    let mut term = terminal_with_cwd("svc", "./services/../api");
    term.script = Some(PathBuf::from("./scripts/dev.sh"));

    h.orchestrator
        .launch(&ungrouped(vec![term]), Some(Path::new("/proj")))
        .await
        .unwrap();
    h.orchestrator.run_dispatches().await;

    let creations = h.host.creations();
    let cwd = creations[0].spec.cwd.as_ref().map(|p| p.display().to_string());
    assert_eq!(cwd.as_deref(), Some("/proj/api"));
    assert_eq!(
        h.host.injections_for("[proj] svc"),
        vec![(ms(500), "/proj/scripts/dev.sh".to_string())]
    );
}

#[tokio::test]
async fn test_mistyped_json_field_still_launches() {
    let mut h = harness();
    let config = ConfigLoader::parse(
        r#"{"terminals":[{"name":"A","command":"echo hi","env":{"PORT":8080},
            "commandDelay":"200"}]}"#,
    )
    .unwrap();

    let outcome = h.orchestrator.launch(&config, None).await.unwrap();

    assert!(matches!(outcome, LaunchOutcome::Success { created: 1 }));
    let creations = h.host.creations();
    assert_eq!(creations[0].spec.env.get("PORT").map(String::as_str), Some("8080"));
}

#[tokio::test]
async fn test_commands_spaced_by_delay() {
    let mut h = harness();
    let mut term = terminal("build");
    term.commands = Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    term.command_delay = Some(250);

    h.orchestrator.launch(&ungrouped(vec![term]), None).await.unwrap();
    h.orchestrator.run_dispatches().await;

    assert_eq!(
        h.host.injections_for("build"),
        vec![
            (ms(500), "a".to_string()),
            (ms(750), "b".to_string()),
            (ms(1000), "c".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_commands_default_delay() {
    let mut h = harness();
    let mut term = terminal("build");
    term.commands = Some(vec!["a".to_string(), "b".to_string()]);

    h.orchestrator.launch(&ungrouped(vec![term]), None).await.unwrap();
    h.orchestrator.run_dispatches().await;

    let times: Vec<Duration> = h.host.injections_for("build").into_iter().map(|(t, _)| t).collect();
    assert_eq!(times, vec![ms(500), ms(600)]);
}

#[tokio::test]
async fn test_no_command_source_sends_nothing() {
    let mut h = harness();
    let mut term = terminal("quiet");
    term.commands = Some(Vec::new());
    term.command = Some(String::new());

    h.orchestrator.launch(&ungrouped(vec![term]), None).await.unwrap();
    h.orchestrator.run_dispatches().await;
    assert!(h.host.injections().is_empty());
}

#[tokio::test]
async fn test_group_creations_are_staggered() {
    let mut h = harness();
    let config = grouped(vec![vec![terminal("a"), terminal("b"), terminal("c")]]);

    h.orchestrator.launch(&config, None).await.unwrap();
    let times: Vec<Duration> = h.host.creations().iter().map(|c| c.at).collect();
    assert_eq!(times, vec![ms(0), ms(200), ms(400)]);
}

#[tokio::test]
async fn test_ungrouped_creations_are_back_to_back() {
    let mut h = harness();
    let config = ungrouped(vec![terminal("a"), terminal("b"), terminal("c")]);

    h.orchestrator.launch(&config, None).await.unwrap();
    assert!(h.host.creations().iter().all(|c| c.at == Duration::ZERO));
}

#[tokio::test]
async fn test_due_text_is_sent_during_stagger() {
    let mut h = harness();
    let config = grouped(vec![vec![
        terminal_with_command("a", "first"),
        terminal("b"),
        terminal("c"),
        terminal("d"),
    ]]);

    h.orchestrator.launch(&config, None).await.unwrap();

    // "a" is due at 500ms, between the creations at 400ms and 600ms
    let events = h.host.events();
    let sent = events
        .iter()
        .position(|e| matches!(e, HostEvent::Sent { text, .. } if text == "first"))
        .unwrap();
    let created_d = events
        .iter()
        .position(|e| matches!(e, HostEvent::Created { name, .. } if name == "d"))
        .unwrap();
    assert!(sent < created_d);
    assert_eq!(h.host.injections_for("a"), vec![(ms(500), "first".to_string())]);
    assert_eq!(h.orchestrator.pending_dispatches(), 0);
}

#[tokio::test]
async fn test_first_created_session_is_focused() {
    let clock = Arc::new(ManualClock::new());
    let host = MockHost::new(clock.clone()).fail_create("a");
    let mut h = harness_with(host, clock, ScriptedPrompt::new());
    let config = ungrouped(vec![terminal("a"), terminal("b"), terminal("c")]);

    h.orchestrator.launch(&config, None).await.unwrap();
    let focus: Vec<(String, bool)> = h
        .host
        .creations()
        .into_iter()
        .map(|c| (c.spec.name, c.spec.focus))
        .collect();
    assert_eq!(
        focus,
        vec![("b".to_string(), true), ("c".to_string(), false)]
    );
}

#[tokio::test]
async fn test_cwd_resolution() {
    let mut h = harness();
    let config = ungrouped(vec![
        terminal_with_cwd("rel", "./x"),
        terminal_with_cwd("abs", "/abs"),
        terminal("none"),
    ]);

    h.orchestrator
        .launch(&config, Some(Path::new("/root")))
        .await
        .unwrap();

    let cwds: Vec<Option<PathBuf>> = h.host.creations().into_iter().map(|c| c.spec.cwd).collect();
    assert_eq!(
        cwds,
        vec![
            Some(PathBuf::from("/root/x")),
            Some(PathBuf::from("/abs")),
            Some(PathBuf::from("/root")),
        ]
    );
}

#[tokio::test]
async fn test_cwd_falls_back_to_first_workspace_root() {
    let clock = Arc::new(ManualClock::new());
    let host = Arc::new(MockHost::new(clock.clone()));
    let mut orchestrator = Orchestrator::new(host.clone(), Arc::new(ScriptedPrompt::new()), clock)
        .with_workspace_roots(vec![PathBuf::from("/ws1"), PathBuf::from("/ws2")]);

    orchestrator
        .launch(&ungrouped(vec![terminal_with_cwd("t", "api"), terminal("u")]), None)
        .await
        .unwrap();

    let cwds: Vec<Option<PathBuf>> = host.creations().into_iter().map(|c| c.spec.cwd).collect();
    assert_eq!(
        cwds,
        vec![Some(PathBuf::from("/ws1/api")), Some(PathBuf::from("/ws1"))]
    );
}

#[tokio::test]
async fn test_unresolvable_cwd_fails_only_that_request() {
    let mut h = harness();
    let config = ungrouped(vec![
        terminal_with_cwd("lost", "relative/dir"),
        terminal_with_cwd("found", "/tmp"),
        terminal("plain"),
    ]);

    let outcome = h.orchestrator.launch(&config, None).await.unwrap();
    assert_eq!(outcome.created(), 2);
    let failures = outcome.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, "lost");
    assert!(matches!(failures[0].error, Error::PathResolution { .. }));

    // No base and no roots leaves the working directory to the host
    assert_eq!(h.host.creations()[1].spec.cwd, None);
}

#[tokio::test]
async fn test_unresolvable_script_creates_nothing() {
    let mut h = harness();
    let mut term = terminal("scripted");
    term.script = Some(PathBuf::from("run.sh"));

    let outcome = h.orchestrator.launch(&ungrouped(vec![term]), None).await.unwrap();
    assert!(matches!(outcome, LaunchOutcome::PartialFailure { created: 0, .. }));
    assert!(h.host.created_names().is_empty());
}

#[tokio::test]
async fn test_creation_failure_is_isolated() {
    let clock = Arc::new(ManualClock::new());
    let host = MockHost::new(clock.clone()).fail_create("b");
    let mut h = harness_with(host, clock, ScriptedPrompt::new());
    let config = ungrouped(vec![
        terminal_with_command("a", "x"),
        terminal_with_command("b", "y"),
        terminal_with_command("c", "z"),
    ]);

    let outcome = h.orchestrator.launch(&config, None).await.unwrap();
    assert_eq!(outcome.created(), 2);
    assert_eq!(outcome.failures()[0].name, "b");
    assert!(matches!(
        outcome.failures()[0].error,
        Error::SessionCreation { .. }
    ));
    assert!(outcome.summary().contains("1 failed"));

    h.orchestrator.run_dispatches().await;
    let texts: Vec<String> = h.host.injections().into_iter().map(|i| i.text).collect();
    assert_eq!(texts, vec!["x", "z"]);
}

#[tokio::test]
async fn test_session_construction() {
    let mut h = harness();
    let mut term = terminal("db");
    term.color = Some(TerminalColor::Orange);
    term.icon = Some("database".to_string());
    term.env.insert("PGPORT".to_string(), "5433".to_string());
    term.shell_path = Some(PathBuf::from("/bin/zsh"));
    term.shell_args = Some(vec!["-l".to_string()]);

    h.orchestrator.launch(&ungrouped(vec![term]), None).await.unwrap();

    let creations = h.host.creations();
    let spec = &creations[0].spec;
    assert_eq!(spec.color, Some(HostColor::Yellow));
    assert_eq!(spec.icon.as_deref(), Some("database"));
    assert_eq!(spec.env.get("PGPORT").map(String::as_str), Some("5433"));
    assert_eq!(spec.shell_path, Some(PathBuf::from("/bin/zsh")));
    assert_eq!(spec.shell_args, vec!["-l"]);
}

#[tokio::test]
async fn test_failed_injection_does_not_affect_outcome() {
    let clock = Arc::new(ManualClock::new());
    let host = MockHost::new(clock.clone()).fail_send();
    let mut h = harness_with(host, clock, ScriptedPrompt::new());

    let outcome = h
        .orchestrator
        .launch(&ungrouped(vec![terminal_with_command("a", "x")]), None)
        .await
        .unwrap();
    h.orchestrator.run_dispatches().await;

    assert!(outcome.is_success());
    assert!(h.host.events().iter().any(|e| matches!(e, HostEvent::Sent { .. })));
}

#[tokio::test]
async fn test_listing_failure_is_an_error() {
    let clock = Arc::new(ManualClock::new());
    let host = MockHost::new(clock.clone()).fail_listing();
    let mut h = harness_with(host, clock, ScriptedPrompt::new());

    let result = h.orchestrator.launch(&ungrouped(vec![terminal("a")]), None).await;
    assert!(matches!(result, Err(Error::Host { .. })));
    assert!(h.host.created_names().is_empty());
}

#[tokio::test]
async fn test_concurrent_batches_race_to_duplicate() {
    let clock = Arc::new(ManualClock::new());
    let host = Arc::new(MockHost::new(clock.clone()));
    let mut first =
        Orchestrator::new(host.clone(), Arc::new(ScriptedPrompt::new()), clock.clone());
    let mut second =
        Orchestrator::new(host.clone(), Arc::new(ScriptedPrompt::new()), clock.clone());

    let both = grouped(vec![vec![terminal("X1"), terminal("X2")]]);
    let only_x2 = ungrouped(vec![terminal("X2")]);

    // The second batch starts while the first waits out its stagger
    let (a, b) = tokio::join!(first.launch(&both, None), async {
        tokio::task::yield_now().await;
        second.launch(&only_x2, None).await
    });

    assert_eq!(a.unwrap().created(), 2);
    assert_eq!(b.unwrap().created(), 1);

    let x2_count = host.live_names().iter().filter(|n| *n == "X2").count();
    assert_eq!(x2_count, 2);
}
