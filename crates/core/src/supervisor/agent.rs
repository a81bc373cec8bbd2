//! The supervisor exposed as an agent.

use crate::agents::local::ActionHandler;
use crate::supervisor::Supervisor;
use async_trait::async_trait;
use mini_protocol::{AgentRequest, AgentResult};
use std::sync::Arc;

pub struct SupervisorActions {
    supervisor: Arc<Supervisor>,
}

impl SupervisorActions {
    pub fn new(supervisor: Arc<Supervisor>) -> Self {
        Self { supervisor }
    }

    pub fn supervisor(&self) -> &Arc<Supervisor> {
        &self.supervisor
    }

    async fn restart(&self, agent: &str) -> AgentResult {
        let service = match self.supervisor.endpoints().resolve(agent) {
            Ok(service) => service.to_string(),
            Err(err) => return err.into(),
        };

        let outcome = self.supervisor.restart_agent(&service).await;
        if outcome.succeeded {
            AgentResult::success(outcome.output)
        } else {
            AgentResult::failure_with_output(outcome.output, format!("❌ Restart of {service} failed"))
        }
    }
}

#[async_trait]
impl ActionHandler for SupervisorActions {
    async fn perform(&self, request: &AgentRequest) -> AgentResult {
        match request.action.as_str() {
            "heartbeat" => AgentResult::success(self.supervisor.heartbeat()),
            "status" => AgentResult::success(self.supervisor.full_status_report().await),
            "restart" => match request.param("agent") {
                Some(agent) if !agent.trim().is_empty() => self.restart(agent.trim()).await,
                _ => AgentResult::failure("No agent name provided"),
            },
            other => AgentResult::failure(format!("Unknown action: {other}")),
        }
    }
}
