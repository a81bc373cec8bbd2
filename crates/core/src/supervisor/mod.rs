//! Supervisor: liveness probing and restart of agent services.
//!
//! The supervisor walks the endpoint table, asks the host [`ServiceManager`]
//! whether each agent's service is alive, and restarts the ones that are not.
//! It runs both on demand (`mini health`) and as a periodic watchdog inside
//! the supervisor service.

pub mod agent;
pub mod report;
pub mod service_manager;

use crate::transport::EndpointTable;
use chrono::Utc;
use mini_protocol::ipc::Event;
use mini_protocol::{AgentHealth, Liveness, StatusReport};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;

pub use agent::SupervisorActions;
pub use report::render_report;
pub use service_manager::{
    InProcessServices, LaunchdManager, ServiceError, ServiceManager, SystemdUserManager,
};

/// Name the supervisor itself is registered under. It never probes itself.
pub const SUPERVISOR_AGENT: &str = "supervisor";

/// Result of one restart attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartOutcome {
    /// Whether the start step succeeded.
    pub succeeded: bool,
    /// Text of both steps, as reported by the service manager.
    pub output: String,
}

pub struct Supervisor {
    endpoints: EndpointTable,
    services: Arc<dyn ServiceManager>,
    restart_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    events_tx: Option<Sender<Event>>,
}

impl Supervisor {
    pub fn new(endpoints: EndpointTable, services: Arc<dyn ServiceManager>) -> Self {
        Self {
            endpoints,
            services,
            restart_locks: Mutex::new(HashMap::new()),
            events_tx: None,
        }
    }

    /// Attach a channel that receives an [`Event::AgentRestarted`] per restart.
    pub fn with_events(mut self, events_tx: Sender<Event>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    pub fn heartbeat(&self) -> String {
        format!(
            "❤️ Supervisor heartbeat OK at {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )
    }

    /// Probe every watched agent and restart those that are down.
    ///
    /// A failing probe counts as not running; the probe error is kept in the
    /// entry. This never fails as a whole.
    pub async fn status_report(&self) -> StatusReport {
        let mut entries = Vec::new();

        for (agent, service) in self.endpoints.iter() {
            if agent == SUPERVISOR_AGENT {
                continue;
            }

            let (liveness, probe_error) = match self.services.is_running(service).await {
                Ok(true) => (Liveness::Running, None),
                Ok(false) => (Liveness::NotRunning, None),
                Err(err) => {
                    tracing::warn!(agent, service, error = %err, "liveness probe failed");
                    (Liveness::NotRunning, Some(err.to_string()))
                }
            };

            let mut entry = AgentHealth {
                agent: agent.to_string(),
                service: service.to_string(),
                liveness,
                probe_error,
                restarted: false,
                restart_output: String::new(),
            };

            if liveness == Liveness::NotRunning {
                tracing::error!(agent, service, "agent offline, attempting restart");
                let outcome = self.restart_agent(service).await;
                entry.restarted = true;
                entry.restart_output = outcome.output;
            }
            entries.push(entry);
        }

        StatusReport {
            generated_at: Utc::now(),
            entries,
        }
    }

    pub async fn full_status_report(&self) -> String {
        render_report(&self.status_report().await)
    }

    /// Stop then start `service`.
    ///
    /// Restarts of the same service never overlap; a second caller waits for
    /// the first restart to finish and then performs its own.
    pub async fn restart_agent(&self, service: &str) -> RestartOutcome {
        let lock = self.restart_lock(service).await;
        let _guard = lock.lock().await;

        tracing::info!(service, "restarting agent service");
        let stop = step_text(self.services.stop_service(service).await);
        let start = self.services.start_service(service).await;
        let succeeded = start.is_ok();
        let outcome = RestartOutcome {
            succeeded,
            output: format!("Restart Result:\nstop: {stop}\nstart: {}", step_text(start)),
        };

        if succeeded {
            tracing::info!(service, "agent service restarted");
        } else {
            tracing::error!(service, output = %outcome.output, "agent service restart failed");
        }

        if let Some(events_tx) = &self.events_tx {
            let agent = self.endpoints.agent_for(service).unwrap_or(service);
            let _ = events_tx
                .send(Event::AgentRestarted {
                    agent: agent.to_string(),
                    service: service.to_string(),
                    succeeded,
                    output: outcome.output.clone(),
                })
                .await;
        }
        outcome
    }

    /// Run [`Supervisor::status_report`] every `interval` until `shutdown`
    /// flips to `true`. The first pass runs immediately.
    pub async fn watch(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.status_report().await;
                    let restarted = report.restarted_agents();
                    if !restarted.is_empty() {
                        tracing::info!(agents = ?restarted, "watchdog restarted agents");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("watchdog stopped");
                        return;
                    }
                }
            }
        }
    }

    async fn restart_lock(&self, service: &str) -> Arc<Mutex<()>> {
        let mut locks = self.restart_locks.lock().await;
        Arc::clone(locks.entry(service.to_string()).or_default())
    }
}

fn step_text(step: Result<String, ServiceError>) -> String {
    match step {
        Ok(output) if output.trim().is_empty() => "ok".to_string(),
        Ok(output) => output.trim().to_string(),
        Err(err) => format!("failed: {err}"),
    }
}
