//! Global configuration models for `~/.mini/config.toml`.
//!
//! This module defines the structure of the configuration file that controls
//! where agents work, how the CLI reaches them, and how the supervisor talks
//! to the host service manager.

use crate::agent_kind::AgentKind;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use ts_rs::TS;

/// Prefix for service identifiers in the default endpoint table.
pub const SERVICE_PREFIX: &str = "mini.agent";

/// How the CLI reaches agents.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchMode {
    /// Agents live inside the CLI process.
    #[default]
    InProcess,
    /// Every agent runs as a background service behind a local socket.
    Services,
}

/// Host service manager used to start, stop and probe agent services.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum ServiceManagerKind {
    Systemd,
    Launchd,
}

impl Default for ServiceManagerKind {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            ServiceManagerKind::Launchd
        } else {
            ServiceManagerKind::Systemd
        }
    }
}

/// Represents settings from `~/.mini/config.toml`.
///
/// # Example
///
/// ```toml
/// project_path = "/home/me/code/app"
/// logs_path = "/home/me/.mini/logs"
/// memory_path = "/home/me/.mini/memory"
/// socket_dir = "/home/me/.mini/run"
/// mode = "services"
/// request_timeout_secs = 30
///
/// [endpoints]
/// builder = "mini.agent.builder"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct MiniConfig {
    /// Working directory for builder, test, repo and terminal agents.
    pub project_path: PathBuf,

    /// Root of the per-agent `runtime.log` files.
    pub logs_path: PathBuf,

    /// Directory where the memory agent stores notes.
    pub memory_path: PathBuf,

    /// Directory holding one `<service>.sock` per agent service.
    pub socket_dir: PathBuf,

    #[serde(default)]
    pub mode: DispatchMode,

    /// Upper bound for one request that crosses a process boundary.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Interval between supervisor watchdog passes.
    #[serde(default = "default_supervisor_interval_secs")]
    pub supervisor_interval_secs: u64,

    #[serde(default)]
    pub service_manager: ServiceManagerKind,

    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,

    #[serde(default = "default_test_command")]
    pub test_command: Vec<String>,

    /// Agent name to service identifier.
    #[serde(default = "default_endpoints")]
    pub endpoints: BTreeMap<String, String>,
}

pub fn default_request_timeout_secs() -> u64 {
    30
}

pub fn default_supervisor_interval_secs() -> u64 {
    60
}

pub fn default_build_command() -> Vec<String> {
    vec!["cargo".to_string(), "build".to_string()]
}

pub fn default_test_command() -> Vec<String> {
    vec!["cargo".to_string(), "test".to_string()]
}

/// `"<agent>" -> "mini.agent.<agent>"` for every built-in agent.
pub fn default_endpoints() -> BTreeMap<String, String> {
    AgentKind::ALL
        .iter()
        .map(|kind| (kind.to_string(), format!("{SERVICE_PREFIX}.{kind}")))
        .collect()
}
