//! Agent status state machine.
//!
//! This module tracks the lifecycle of a single agent instance, validates
//! transitions and emits [`Event::AgentStatusChanged`] when an event sink is
//! attached.

use crate::agents::base::AgentError;
use mini_protocol::ipc::Event;
use mini_protocol::AgentStatus;
use tokio::sync::mpsc::Sender;
use tokio::sync::Mutex;

/// Status holder shared by every agent realization.
pub struct Lifecycle {
    agent: String,
    status: Mutex<AgentStatus>,
    events_tx: Option<Sender<Event>>,
}

impl Lifecycle {
    /// Create a lifecycle in the `Idle` state.
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            status: Mutex::new(AgentStatus::Idle),
            events_tx: None,
        }
    }

    /// Attach a channel that receives every status change.
    pub fn with_events(mut self, events_tx: Sender<Event>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub async fn status(&self) -> AgentStatus {
        *self.status.lock().await
    }

    /// Transition to `Running`. Returns `false` if the agent already was running.
    pub async fn mark_running(&self) -> bool {
        self.transition(AgentStatus::Running).await
    }

    /// Transition to `Stopped`. Returns `false` (and changes nothing) unless
    /// the agent was running.
    pub async fn mark_stopped(&self) -> bool {
        self.transition(AgentStatus::Stopped).await
    }

    /// Record an unrecoverable fault.
    pub async fn mark_error(&self, reason: &str) {
        tracing::error!(agent = %self.agent, reason, "agent entered error state");
        self.transition(AgentStatus::Error).await;
    }

    /// Fail with [`AgentError::NotRunning`] unless the agent accepts requests.
    pub async fn ensure_running(&self) -> Result<(), AgentError> {
        let status = self.status().await;
        if status.accepts_requests() {
            Ok(())
        } else {
            Err(AgentError::NotRunning {
                agent: self.agent.clone(),
                status,
            })
        }
    }

    async fn transition(&self, target: AgentStatus) -> bool {
        {
            let mut status = self.status.lock().await;
            let from = *status;
            if !from.can_transition_to(target) {
                tracing::debug!(agent = %self.agent, %from, to = %target, "ignored status transition");
                return false;
            }
            tracing::info!(agent = %self.agent, %from, to = %target, "agent status changed");
            *status = target;
        }

        if let Some(events_tx) = &self.events_tx {
            let _ = events_tx
                .send(Event::AgentStatusChanged {
                    agent: self.agent.clone(),
                    status: target,
                })
                .await;
        }
        true
    }
}
