//! Agent manager: the single dispatch point from agent name to result.
//!
//! The `AgentManager` is responsible for:
//! - Registering agents under unique names
//! - Starting and stopping every registered agent
//! - Dispatching requests by name, whether the agent is local or remote
//!
//! Registration takes `&mut self` and is expected to finish during startup.
//! After that the manager is shared immutably (typically behind an `Arc`), so
//! dispatch needs no locking.

use crate::agents::base::{Agent, AgentError};
use mini_protocol::{AgentRequest, AgentResult, AgentStatus};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Manages all registered agents.
#[derive(Default)]
pub struct AgentManager {
    agents: BTreeMap<String, Arc<dyn Agent>>,
}

impl AgentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `agent`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AlreadyRegistered`] if the name is taken; the
    /// existing binding is left untouched.
    pub fn register(&mut self, name: &str, agent: Arc<dyn Agent>) -> Result<(), AgentError> {
        if self.agents.contains_key(name) {
            return Err(AgentError::AlreadyRegistered(name.to_string()));
        }
        tracing::debug!(agent = name, "registered agent");
        self.agents.insert(name.to_string(), agent);
        Ok(())
    }

    /// Start every agent in name order.
    ///
    /// # Errors
    ///
    /// The first failing agent aborts the whole operation. Agents started
    /// before it keep running; there is no rollback.
    pub async fn start_all(&self) -> Result<(), AgentError> {
        for (name, agent) in &self.agents {
            if let Err(err) = agent.start().await {
                tracing::error!(agent = %name, error = %err, "agent failed to start");
                return Err(match err {
                    AgentError::StartFailed { .. } => err,
                    other => AgentError::StartFailed {
                        agent: name.clone(),
                        reason: other.to_string(),
                    },
                });
            }
        }
        Ok(())
    }

    /// Stop every agent, continuing past individual agents.
    pub async fn stop_all(&self) {
        for agent in self.agents.values() {
            agent.stop().await;
        }
    }

    /// Route `request` to the agent bound to `name`.
    ///
    /// Never fails: an unknown name yields a failed result carrying
    /// [`AgentError::NotFound`], and the agent's own result is returned as-is.
    pub async fn dispatch(&self, name: &str, request: AgentRequest) -> AgentResult {
        let Some(agent) = self.get_agent(name) else {
            tracing::warn!(agent = name, action = %request.action, "dispatch to unknown agent");
            return AgentError::NotFound(name.to_string()).into();
        };

        tracing::debug!(agent = name, action = %request.action, "dispatching request");
        agent.handle(request).await
    }

    /// Dispatch an action with its parameters.
    pub async fn dispatch_action(
        &self,
        name: &str,
        action: &str,
        parameters: HashMap<String, String>,
    ) -> AgentResult {
        self.dispatch(name, AgentRequest::with_parameters(action, parameters))
            .await
    }

    pub fn get_agent(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    /// Current status of `name`, or `None` if it is not registered.
    pub async fn status(&self, name: &str) -> Option<AgentStatus> {
        match self.agents.get(name) {
            Some(agent) => Some(agent.status().await),
            None => None,
        }
    }

    /// List all registered agent names in order.
    pub fn list_agents(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }

    pub fn has_agent(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }
}
