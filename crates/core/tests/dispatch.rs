//! In-process dispatch through the registry built from configuration.

mod common;

use common::*;
use mini_core::agents::{AgentError, AgentManager, MockAgent};
use mini_core::MiniContext;
use mini_protocol::{AgentRequest, AgentResult, AgentStatus, DispatchMode, ServiceManagerKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_commit_through_context() {
    let home = tempfile::tempdir().unwrap();
    let project = git_project();
    let mut config = test_config(home.path(), project.path());
    config.service_manager = ServiceManagerKind::Systemd;
    let context = MiniContext::new(config).unwrap();
    context.manager().start_all().await.unwrap();

    let mut parameters = HashMap::new();
    parameters.insert("message".to_string(), "fix bug".to_string());
    let result = context
        .manager()
        .dispatch_action("repo", "commit", parameters)
        .await;

    assert_eq!(
        result,
        AgentResult {
            success: true,
            output: "✅ Committed: fix bug".to_string(),
            error: None,
        }
    );
    context.manager().stop_all().await;
}

#[tokio::test]
async fn test_memory_note_through_context() {
    let home = tempfile::tempdir().unwrap();
    let project = tempfile::tempdir().unwrap();
    let mut config = test_config(home.path(), project.path());
    config.service_manager = ServiceManagerKind::Systemd;
    let memory_path = config.memory_path.clone();
    let context = MiniContext::new(config).unwrap();
    context.manager().start_all().await.unwrap();

    let saved = context
        .manager()
        .dispatch(
            "memory",
            AgentRequest::new("save").with_param("note", "remember the socket dir"),
        )
        .await;
    let listed = context
        .manager()
        .dispatch("memory", AgentRequest::new("list"))
        .await;

    assert!(saved.success, "{saved:?}");
    assert!(saved.output.starts_with("✅ Note saved: "));
    assert!(listed.output.starts_with("📝 Memory Notes:"));
    assert_eq!(std::fs::read_dir(memory_path).unwrap().count(), 1);
}

#[tokio::test]
async fn test_project_missing_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let mut config = test_config(home.path(), &home.path().join("nowhere"));
    config.service_manager = ServiceManagerKind::Systemd;
    let context = MiniContext::new(config).unwrap();
    context.manager().start_all().await.unwrap();

    let result = context
        .manager()
        .dispatch("repo", AgentRequest::new("status"))
        .await;

    assert_well_formed(&result);
    assert!(result.error.unwrap().contains("Project not found at"));
}

#[tokio::test]
async fn test_in_process_is_the_default_mode() {
    let home = tempfile::tempdir().unwrap();
    let config = test_config(home.path(), home.path());

    assert_eq!(config.mode, DispatchMode::InProcess);
}

#[tokio::test]
async fn test_success_iff_handler_success() {
    let mut manager = AgentManager::new();
    manager
        .register("ok", Arc::new(MockAgent::success("ok", "done")))
        .unwrap();
    manager
        .register("bad", Arc::new(MockAgent::failing("bad", "❌ Build failed")))
        .unwrap();
    manager.start_all().await.unwrap();

    for name in ["ok", "bad", "missing"] {
        let result = manager.dispatch(name, AgentRequest::new("run")).await;
        assert_well_formed(&result);
        assert_eq!(result.success, name == "ok");
    }
}

#[tokio::test]
async fn test_lifecycle_events_are_emitted() {
    let (tx, mut rx) = mpsc::channel(64);
    let home = tempfile::tempdir().unwrap();
    let mut config = test_config(home.path(), home.path());
    config.service_manager = ServiceManagerKind::Systemd;
    let context = MiniContext::with_events(config, Some(tx)).unwrap();

    context.manager().start_all().await.unwrap();
    context.manager().stop_all().await;

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    for agent in context.manager().list_agents() {
        assert!(has_status_change(&events, &agent, AgentStatus::Running));
        assert!(has_status_change(&events, &agent, AgentStatus::Stopped));
    }
}

#[tokio::test]
async fn test_unknown_agent_error_text() {
    let manager = AgentManager::new();

    let result = manager.dispatch("nonexistent", AgentRequest::new("x")).await;

    assert_eq!(
        result.error,
        Some(AgentError::NotFound("nonexistent".to_string()).to_string())
    );
}
