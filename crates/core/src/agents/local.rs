//! In-process agent realization.
//!
//! A [`LocalAgent`] pairs a name and a [`Lifecycle`] with an
//! [`ActionHandler`] that knows how to perform the agent's actions. The
//! lifecycle rules (no work before `start`, failed initialization lands in
//! `Error`) live here once instead of in every handler.

use crate::agents::base::{Agent, AgentError};
use crate::agents::lifecycle::Lifecycle;
use async_trait::async_trait;
use mini_protocol::ipc::Event;
use mini_protocol::{AgentRequest, AgentResult, AgentStatus};
use tokio::sync::mpsc::Sender;

/// The action-specific half of an in-process agent.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Prepare resources before the agent accepts requests.
    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Release resources after the agent stopped accepting requests.
    async fn shutdown(&self) {}

    async fn perform(&self, request: &AgentRequest) -> AgentResult;
}

pub struct LocalAgent<H> {
    lifecycle: Lifecycle,
    handler: H,
}

impl<H: ActionHandler> LocalAgent<H> {
    pub fn new(name: impl Into<String>, handler: H) -> Self {
        Self {
            lifecycle: Lifecycle::new(name),
            handler,
        }
    }

    /// Attach a channel that receives this agent's status changes.
    pub fn with_events(mut self, events_tx: Sender<Event>) -> Self {
        self.lifecycle = self.lifecycle.with_events(events_tx);
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

#[async_trait]
impl<H: ActionHandler> Agent for LocalAgent<H> {
    fn name(&self) -> &str {
        self.lifecycle.agent()
    }

    async fn status(&self) -> AgentStatus {
        self.lifecycle.status().await
    }

    async fn start(&self) -> Result<(), AgentError> {
        if self.lifecycle.status().await == AgentStatus::Running {
            return Ok(());
        }

        match self.handler.initialize().await {
            Ok(()) => {
                self.lifecycle.mark_running().await;
                Ok(())
            }
            Err(err) => {
                let reason = format!("{err:#}");
                self.lifecycle.mark_error(&reason).await;
                Err(AgentError::StartFailed {
                    agent: self.name().to_string(),
                    reason,
                })
            }
        }
    }

    async fn stop(&self) {
        if self.lifecycle.mark_stopped().await {
            self.handler.shutdown().await;
        }
    }

    async fn handle(&self, request: AgentRequest) -> AgentResult {
        if let Err(err) = self.lifecycle.ensure_running().await {
            return err.into();
        }

        tracing::info!(agent = %self.name(), action = %request.action, "handling request");
        let result = self.handler.perform(&request).await;
        if !result.success {
            tracing::warn!(
                agent = %self.name(),
                action = %request.action,
                error = result.error.as_deref().unwrap_or_default(),
                "request failed"
            );
        }
        result
    }
}
