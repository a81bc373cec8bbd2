//! Process-wide context: configuration plus the agent registry built from it.

use crate::agents::{Agent, AgentError, AgentFactory, AgentKind, AgentManager};
use crate::transport::Transport;
use anyhow::{bail, Result};
use mini_protocol::ipc::Event;
use mini_protocol::{DispatchMode, MiniConfig};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

/// Everything a command needs to reach agents. Built once at startup and
/// passed down explicitly.
pub struct MiniContext {
    config: MiniConfig,
    manager: AgentManager,
    transport: Option<Arc<Transport>>,
}

impl MiniContext {
    /// Build the registry for every built-in agent.
    ///
    /// In [`DispatchMode::InProcess`] every agent is created locally and the
    /// supervisor probes those same agents. In
    /// [`DispatchMode::Services`] every agent forwards to its service; a
    /// built-in agent without an endpoint fails here rather than on first use.
    pub fn new(config: MiniConfig) -> Result<Self> {
        Self::with_events(config, None)
    }

    pub fn with_events(config: MiniConfig, events: Option<Sender<Event>>) -> Result<Self> {
        let mut manager = AgentManager::new();
        let mut transport = None;

        match config.mode {
            DispatchMode::InProcess => {
                let mut hosted = Vec::new();
                for kind in AgentKind::ALL {
                    if kind == AgentKind::Supervisor {
                        continue;
                    }
                    let agent = AgentFactory::create_local(kind, &config, events.clone())?;
                    manager.register(kind.name(), Arc::clone(&agent))?;
                    hosted.push(agent);
                }
                // The supervisor watches its siblings rather than host services.
                let supervisor =
                    AgentFactory::in_process_supervisor(&config, &hosted, events.clone());
                manager.register(AgentKind::Supervisor.name(), supervisor)?;
            }
            DispatchMode::Services => {
                let shared = Arc::new(AgentFactory::transport(&config));
                shared
                    .endpoints()
                    .ensure_covers(AgentKind::ALL.iter().map(AgentKind::name))?;
                for kind in AgentKind::ALL {
                    let agent =
                        AgentFactory::create_remote(kind.name(), Arc::clone(&shared), events.clone());
                    manager.register(kind.name(), agent)?;
                }
                transport = Some(shared);
            }
        }

        tracing::debug!(mode = ?config.mode, agents = manager.list_agents().len(), "context ready");
        Ok(Self {
            config,
            manager,
            transport,
        })
    }

    pub fn config(&self) -> &MiniConfig {
        &self.config
    }

    pub fn manager(&self) -> &AgentManager {
        &self.manager
    }

    /// The shared transport, present only in services mode.
    pub fn transport(&self) -> Option<&Arc<Transport>> {
        self.transport.as_ref()
    }

    /// Build the in-process agent named `name`, for hosting as a service.
    pub fn local_agent(&self, name: &str) -> Result<Arc<dyn Agent>> {
        let Some(kind) = AgentKind::from_name(name) else {
            bail!(AgentError::NotFound(name.to_string()));
        };
        AgentFactory::create_local(kind, &self.config, None)
    }
}
