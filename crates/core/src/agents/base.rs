//! Base Agent trait and supporting types.

use async_trait::async_trait;
use mini_protocol::{AgentRequest, AgentResult, AgentStatus};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Every failure that can happen between a caller and an agent.
///
/// Each variant renders as a single line naming the agent or endpoint and the
/// class of failure, so the CLI can print it as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("❌ Agent '{0}' not found")]
    NotFound(String),

    #[error("❌ Failed to connect to {service} ({reason}). Is the agent running? Try 'mini health' to check.")]
    ConnectionFailed { service: String, reason: String },

    #[error("⏱️  Timeout waiting for {service} after {}. The operation took too long.", describe_wait(.after))]
    Timeout { service: String, after: Duration },

    #[error("❌ Received invalid response from {service}: {reason}")]
    InvalidResponse { service: String, reason: String },

    #[error("{0}")]
    HandlerFailure(String),

    #[error("❌ No endpoint configured for agent '{0}'")]
    ConfigurationMissing(String),

    #[error("❌ Agent '{agent}' is {status}, not running")]
    NotRunning { agent: String, status: AgentStatus },

    #[error("❌ Agent '{agent}' failed to start: {reason}")]
    StartFailed { agent: String, reason: String },

    #[error("❌ Agent '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("📁 Project not found at: {}. Run 'mini init' to set up a project.", .0.display())]
    ProjectNotFound(PathBuf),
}

/// Whole seconds as `30s`, anything else as `250ms`.
fn describe_wait(after: &Duration) -> String {
    if after.subsec_nanos() == 0 && after.as_secs() > 0 {
        format!("{}s", after.as_secs())
    } else {
        format!("{}ms", after.as_millis())
    }
}

impl From<AgentError> for AgentResult {
    fn from(err: AgentError) -> Self {
        AgentResult::failure(err.to_string())
    }
}

/// The contract every agent implements, in-process or remote.
///
/// `handle` must only act while the agent is [`AgentStatus::Running`]; in any
/// other status it returns a failure naming the agent and its status.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable, unique name used for registry lookup and endpoint resolution.
    fn name(&self) -> &str;

    async fn status(&self) -> AgentStatus;

    /// Initialize the agent. Starting a running agent is a no-op.
    async fn start(&self) -> Result<(), AgentError>;

    /// Shut the agent down. Stopping an agent that is not running is a no-op.
    async fn stop(&self);

    async fn handle(&self, request: AgentRequest) -> AgentResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_convert_to_failed_results() {
        let result: AgentResult = AgentError::NotFound("ghost".to_string()).into();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("❌ Agent 'ghost' not found"));
        assert!(result.output.is_empty());
    }

    #[test]
    fn test_timeout_and_connection_messages_are_distinct() {
        let timeout = AgentError::Timeout {
            service: "mini.agent.builder".to_string(),
            after: Duration::from_secs(30),
        }
        .to_string();
        let refused = AgentError::ConnectionFailed {
            service: "mini.agent.builder".to_string(),
            reason: "connection refused".to_string(),
        }
        .to_string();

        assert!(timeout.contains("Timeout waiting for mini.agent.builder after 30s"));
        assert!(refused.contains("Failed to connect to mini.agent.builder"));
        assert_ne!(timeout, refused);
    }

    #[test]
    fn test_sub_second_timeout_is_shown_in_milliseconds() {
        let timeout = AgentError::Timeout {
            service: "mini.agent.repo".to_string(),
            after: Duration::from_millis(250),
        };

        assert!(timeout
            .to_string()
            .contains("Timeout waiting for mini.agent.repo after 250ms"));
        assert_eq!(describe_wait(&Duration::from_millis(1500)), "1500ms");
    }

    #[test]
    fn test_error_messages_are_single_line() {
        let errors = vec![
            AgentError::NotFound("x".to_string()),
            AgentError::InvalidResponse {
                service: "svc".to_string(),
                reason: "empty reply".to_string(),
            },
            AgentError::ConfigurationMissing("x".to_string()),
            AgentError::NotRunning {
                agent: "x".to_string(),
                status: AgentStatus::Idle,
            },
            AgentError::ProjectNotFound(PathBuf::from("/nope")),
        ];

        for err in errors {
            assert!(!err.to_string().contains('\n'), "multi-line: {err}");
        }
    }
}
