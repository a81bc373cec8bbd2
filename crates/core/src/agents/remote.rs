//! Agent realization backed by an out-of-process service.

use crate::agents::base::{Agent, AgentError};
use crate::agents::lifecycle::Lifecycle;
use crate::transport::Transport;
use async_trait::async_trait;
use mini_protocol::ipc::Event;
use mini_protocol::{AgentRequest, AgentResult, AgentStatus};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

/// Forwards every request to the service mapped to its name.
///
/// `start` does not contact the service: liveness is the supervisor's
/// concern, and a dead service surfaces as a connection failure on the
/// first request.
pub struct RemoteAgent {
    lifecycle: Lifecycle,
    transport: Arc<Transport>,
}

impl RemoteAgent {
    pub fn new(name: impl Into<String>, transport: Arc<Transport>) -> Self {
        Self {
            lifecycle: Lifecycle::new(name),
            transport,
        }
    }

    pub fn with_events(mut self, events_tx: Sender<Event>) -> Self {
        self.lifecycle = self.lifecycle.with_events(events_tx);
        self
    }
}

#[async_trait]
impl Agent for RemoteAgent {
    fn name(&self) -> &str {
        self.lifecycle.agent()
    }

    async fn status(&self) -> AgentStatus {
        self.lifecycle.status().await
    }

    async fn start(&self) -> Result<(), AgentError> {
        if let Err(err) = self.transport.endpoints().resolve(self.name()) {
            self.lifecycle.mark_error(&err.to_string()).await;
            return Err(err);
        }
        self.lifecycle.mark_running().await;
        Ok(())
    }

    async fn stop(&self) {
        self.lifecycle.mark_stopped().await;
    }

    async fn handle(&self, request: AgentRequest) -> AgentResult {
        if let Err(err) = self.lifecycle.ensure_running().await {
            return err.into();
        }
        self.transport.send(self.name(), request).await
    }
}
