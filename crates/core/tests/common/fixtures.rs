//! Test fixtures: configuration, projects and hosted agent services.

use mini_core::agents::Agent;
use mini_core::config::default_config;
use mini_core::transport::{AgentService, EndpointTable};
use mini_protocol::MiniConfig;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Defaults rooted in a temporary home, with the project in `project`.
#[allow(dead_code)]
pub fn test_config(home: &Path, project: &Path) -> MiniConfig {
    let mut config = default_config(home);
    config.project_path = project.to_path_buf();
    config
}

/// Endpoint table mapping each agent to `mini.agent.<agent>` in `socket_dir`.
#[allow(dead_code)]
pub fn endpoint_table(socket_dir: &Path, agents: &[&str]) -> EndpointTable {
    let services: BTreeMap<String, String> = agents
        .iter()
        .map(|agent| (agent.to_string(), format!("mini.agent.{agent}")))
        .collect();
    EndpointTable::new(services, socket_dir)
}

#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("git should be installed");
    assert!(status.success(), "git {args:?} failed");
}

/// An initialized git repository with one untracked file.
#[allow(dead_code)]
pub fn git_project() -> TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    git(temp_dir.path(), &["init", "-q"]);
    git(temp_dir.path(), &["config", "user.email", "mini@example.com"]);
    git(temp_dir.path(), &["config", "user.name", "mini"]);
    std::fs::write(temp_dir.path().join("main.rs"), "fn main() {}\n").unwrap();
    temp_dir
}

/// An agent hosted on its socket until the handle is shut down.
#[allow(dead_code)]
pub struct HostedService {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<anyhow::Result<()>>,
}

#[allow(dead_code)]
impl HostedService {
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        self.task.await.unwrap().unwrap();
    }
}

/// Host `agent` on the socket `table` assigns it and wait until it listens.
#[allow(dead_code)]
pub async fn host(table: &EndpointTable, agent: Arc<dyn Agent>) -> HostedService {
    let service = table.resolve(agent.name()).unwrap().to_string();
    let socket = table.socket_path(&service);
    let (shutdown, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(AgentService::new(agent, &socket).run(shutdown_rx));

    wait_for(|| socket.exists()).await;
    HostedService { shutdown, task }
}

/// Poll `condition` every 10ms for up to two seconds.
#[allow(dead_code)]
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 2s");
}
