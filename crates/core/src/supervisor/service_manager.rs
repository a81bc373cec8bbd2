//! Host service-manager integrations used by the supervisor.
//!
//! The supervisor never talks to an agent to decide whether it is alive; it
//! asks the host's service manager. Two host managers ship: systemd user
//! units and launchd agents. When every agent lives in the current process,
//! [`InProcessServices`] answers from the agents' own lifecycles instead.

use crate::agents::base::Agent;
use crate::agents::cli_executor::{CliExecutor, ToolOutput};
use async_trait::async_trait;
use mini_protocol::AgentStatus;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("could not run {program}: {reason}")]
    Unavailable { program: String, reason: String },

    #[error("{program} {verb} {service} failed ({exit}): {output}")]
    CommandFailed {
        program: String,
        verb: String,
        service: String,
        exit: String,
        output: String,
    },

    #[error("no service definition for {service} at {}", .path.display())]
    MissingDefinition { service: String, path: PathBuf },

    #[error("{0} is not hosted in this process")]
    NotHosted(String),

    #[error("{service} failed to start: {reason}")]
    StartFailed { service: String, reason: String },
}

/// Start, stop and probe long-lived agent services.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Start `service`, returning the manager's output.
    async fn start_service(&self, service: &str) -> Result<String, ServiceError>;

    /// Stop `service`, returning the manager's output.
    async fn stop_service(&self, service: &str) -> Result<String, ServiceError>;

    /// Whether `service` currently has a live process.
    async fn is_running(&self, service: &str) -> Result<bool, ServiceError>;
}

async fn run(program: &str, args: &[&str]) -> Result<ToolOutput, ServiceError> {
    CliExecutor::run(program, args, None)
        .await
        .map_err(|err| ServiceError::Unavailable {
            program: program.to_string(),
            reason: err.to_string(),
        })
}

fn checked(
    program: &str,
    verb: &str,
    service: &str,
    output: ToolOutput,
) -> Result<String, ServiceError> {
    if output.succeeded() {
        Ok(output.combined())
    } else {
        Err(ServiceError::CommandFailed {
            program: program.to_string(),
            verb: verb.to_string(),
            service: service.to_string(),
            exit: output.exit_description(),
            output: output.combined(),
        })
    }
}

/// `systemctl --user` units named `<service>.service`.
#[derive(Debug, Clone, Default)]
pub struct SystemdUserManager;

impl SystemdUserManager {
    const PROGRAM: &'static str = "systemctl";

    fn unit(service: &str) -> String {
        format!("{service}.service")
    }

    async fn control(&self, verb: &str, service: &str) -> Result<String, ServiceError> {
        let unit = Self::unit(service);
        let output = run(Self::PROGRAM, &["--user", verb, unit.as_str()]).await?;
        checked(Self::PROGRAM, verb, service, output)
    }
}

#[async_trait]
impl ServiceManager for SystemdUserManager {
    async fn start_service(&self, service: &str) -> Result<String, ServiceError> {
        self.control("start", service).await
    }

    async fn stop_service(&self, service: &str) -> Result<String, ServiceError> {
        self.control("stop", service).await
    }

    async fn is_running(&self, service: &str) -> Result<bool, ServiceError> {
        let unit = Self::unit(service);
        let output = run(Self::PROGRAM, &["--user", "is-active", "--quiet", unit.as_str()]).await?;
        Ok(output.succeeded())
    }
}

/// launchd agents loaded from `<plist_dir>/<service>.plist`.
#[derive(Debug, Clone)]
pub struct LaunchdManager {
    plist_dir: PathBuf,
}

impl LaunchdManager {
    const PROGRAM: &'static str = "launchctl";

    pub fn new(plist_dir: impl Into<PathBuf>) -> Self {
        Self {
            plist_dir: plist_dir.into(),
        }
    }

    /// `~/Library/LaunchAgents`.
    pub fn for_user(home: &Path) -> Self {
        Self::new(home.join("Library").join("LaunchAgents"))
    }

    pub fn plist_path(&self, service: &str) -> PathBuf {
        self.plist_dir.join(format!("{service}.plist"))
    }

    async fn control(&self, verb: &str, service: &str) -> Result<String, ServiceError> {
        let plist = self.plist_path(service);
        if !plist.exists() {
            return Err(ServiceError::MissingDefinition {
                service: service.to_string(),
                path: plist,
            });
        }
        let plist = plist.to_string_lossy();
        let output = run(Self::PROGRAM, &[verb, &*plist]).await?;
        checked(Self::PROGRAM, verb, service, output)
    }
}

/// Whether `launchctl list <label>` output shows a live PID.
fn has_pid(listing: &str) -> bool {
    listing.lines().any(|line| {
        let Some(value) = line.trim().strip_prefix("\"PID\"") else {
            return false;
        };
        value
            .trim()
            .trim_start_matches('=')
            .trim_end_matches(';')
            .trim()
            .parse::<u32>()
            .is_ok()
    })
}

#[async_trait]
impl ServiceManager for LaunchdManager {
    async fn start_service(&self, service: &str) -> Result<String, ServiceError> {
        self.control("load", service).await
    }

    async fn stop_service(&self, service: &str) -> Result<String, ServiceError> {
        self.control("unload", service).await
    }

    async fn is_running(&self, service: &str) -> Result<bool, ServiceError> {
        let output = run(Self::PROGRAM, &["list", service]).await?;
        // Non-zero means the label is not loaded at all.
        Ok(output.succeeded() && has_pid(&output.stdout))
    }
}

/// Agents hosted by the current process, keyed by service identifier.
///
/// Liveness is the agent's lifecycle status; start and stop drive the agent
/// directly. No host service manager is consulted.
#[derive(Default)]
pub struct InProcessServices {
    agents: BTreeMap<String, Arc<dyn Agent>>,
}

impl InProcessServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, service: impl Into<String>, agent: Arc<dyn Agent>) -> Self {
        self.agents.insert(service.into(), agent);
        self
    }

    fn agent(&self, service: &str) -> Result<&Arc<dyn Agent>, ServiceError> {
        self.agents
            .get(service)
            .ok_or_else(|| ServiceError::NotHosted(service.to_string()))
    }
}

#[async_trait]
impl ServiceManager for InProcessServices {
    async fn start_service(&self, service: &str) -> Result<String, ServiceError> {
        self.agent(service)?
            .start()
            .await
            .map(|()| String::new())
            .map_err(|err| ServiceError::StartFailed {
                service: service.to_string(),
                reason: err.to_string(),
            })
    }

    async fn stop_service(&self, service: &str) -> Result<String, ServiceError> {
        self.agent(service)?.stop().await;
        Ok(String::new())
    }

    async fn is_running(&self, service: &str) -> Result<bool, ServiceError> {
        Ok(self.agent(service)?.status().await == AgentStatus::Running)
    }
}
