//! Agent factory for creating agent instances from configuration.

use crate::agents::adapters::{
    DebuggerActions, MemoryActions, TerminalProxyActions, ToolActions,
};
use crate::agents::base::Agent;
use crate::agents::local::{ActionHandler, LocalAgent};
use crate::agents::remote::RemoteAgent;
use crate::supervisor::{
    InProcessServices, LaunchdManager, ServiceManager, Supervisor, SupervisorActions,
    SystemdUserManager,
};
use crate::transport::{EndpointTable, Transport};
use anyhow::{Context, Result};
use mini_protocol::ipc::Event;
use mini_protocol::{AgentKind, MiniConfig, ServiceManagerKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;

/// Factory for creating agent instances based on configuration.
pub struct AgentFactory;

impl AgentFactory {
    /// Create the in-process realization of a built-in agent.
    ///
    /// # Arguments
    ///
    /// * `kind` - Which built-in agent to create
    /// * `config` - Paths and commands the agent works with
    /// * `events` - Optional sink for status and restart events
    ///
    /// # Errors
    ///
    /// Only the supervisor can fail to build: launchd needs the home
    /// directory to locate agent plists.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mini_core::agents::{AgentFactory, AgentKind};
    /// use mini_core::config::default_config;
    /// use std::path::Path;
    ///
    /// let config = default_config(Path::new("/home/me"));
    /// let agent = AgentFactory::create_local(AgentKind::Repo, &config, None).unwrap();
    /// assert_eq!(agent.name(), "repo");
    /// ```
    pub fn create_local(
        kind: AgentKind,
        config: &MiniConfig,
        events: Option<Sender<Event>>,
    ) -> Result<Arc<dyn Agent>> {
        let name = kind.name();
        let agent: Arc<dyn Agent> = match kind {
            AgentKind::Builder => Arc::new(attach(
                LocalAgent::new(
                    name,
                    ToolActions::builder(&config.project_path, &config.build_command),
                ),
                events,
            )),
            AgentKind::Test => Arc::new(attach(
                LocalAgent::new(
                    name,
                    ToolActions::tester(&config.project_path, &config.test_command),
                ),
                events,
            )),
            AgentKind::Repo => Arc::new(attach(
                LocalAgent::new(name, ToolActions::repo(&config.project_path)),
                events,
            )),
            AgentKind::Memory => Arc::new(attach(
                LocalAgent::new(name, MemoryActions::new(&config.memory_path)),
                events,
            )),
            AgentKind::TerminalProxy => Arc::new(attach(
                LocalAgent::new(name, TerminalProxyActions::new(&config.project_path)),
                events,
            )),
            AgentKind::Debugger => Arc::new(attach(
                LocalAgent::new(name, DebuggerActions::new(&config.project_path)),
                events,
            )),
            AgentKind::Supervisor => {
                let supervisor = Self::supervisor(config, events.clone())?;
                Arc::new(attach(
                    LocalAgent::new(name, SupervisorActions::new(Arc::new(supervisor))),
                    events,
                ))
            }
        };
        Ok(agent)
    }

    /// Create an agent that forwards to its service over `transport`.
    pub fn create_remote(
        name: &str,
        transport: Arc<Transport>,
        events: Option<Sender<Event>>,
    ) -> Arc<dyn Agent> {
        let agent = RemoteAgent::new(name, transport);
        match events {
            Some(events_tx) => Arc::new(agent.with_events(events_tx)),
            None => Arc::new(agent),
        }
    }

    pub fn endpoints(config: &MiniConfig) -> EndpointTable {
        EndpointTable::new(config.endpoints.clone(), &config.socket_dir)
    }

    pub fn transport(config: &MiniConfig) -> Transport {
        Transport::new(Self::endpoints(config))
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
    }

    pub fn service_manager(kind: ServiceManagerKind) -> Result<Arc<dyn ServiceManager>> {
        Ok(match kind {
            ServiceManagerKind::Systemd => Arc::new(SystemdUserManager),
            ServiceManagerKind::Launchd => {
                let home = dirs::home_dir().context("launchd needs a home directory")?;
                Arc::new(LaunchdManager::for_user(&home))
            }
        })
    }

    pub fn supervisor(config: &MiniConfig, events: Option<Sender<Event>>) -> Result<Supervisor> {
        let supervisor = Supervisor::new(
            Self::endpoints(config),
            Self::service_manager(config.service_manager)?,
        );
        Ok(match events {
            Some(events_tx) => supervisor.with_events(events_tx),
            None => supervisor,
        })
    }

    /// Create a supervisor agent that watches `hosted` agents of this
    /// process instead of host services.
    ///
    /// Agents are matched to services through the endpoint table; an agent
    /// without an endpoint is not watched.
    pub fn in_process_supervisor(
        config: &MiniConfig,
        hosted: &[Arc<dyn Agent>],
        events: Option<Sender<Event>>,
    ) -> Arc<dyn Agent> {
        let endpoints = Self::endpoints(config);
        let mut services = InProcessServices::new();
        for agent in hosted {
            match endpoints.resolve(agent.name()) {
                Ok(service) => services = services.host(service, Arc::clone(agent)),
                Err(err) => tracing::debug!(agent = agent.name(), error = %err, "not watched"),
            }
        }

        let supervisor = Supervisor::new(endpoints, Arc::new(services));
        let supervisor = match events.clone() {
            Some(events_tx) => supervisor.with_events(events_tx),
            None => supervisor,
        };
        Arc::new(attach(
            LocalAgent::new(
                AgentKind::Supervisor.name(),
                SupervisorActions::new(Arc::new(supervisor)),
            ),
            events,
        ))
    }
}

fn attach<H: ActionHandler>(
    agent: LocalAgent<H>,
    events: Option<Sender<Event>>,
) -> LocalAgent<H> {
    match events {
        Some(events_tx) => agent.with_events(events_tx),
        None => agent,
    }
}
