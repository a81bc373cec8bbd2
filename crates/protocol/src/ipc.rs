//! Inter-process communication protocol.
//!
//! This module defines the frames exchanged between a client and an agent
//! running as a background service, plus the lifecycle events emitted by
//! agents and the supervisor.
//!
//! Frames are newline-delimited JSON: the client writes one [`WireRequest`]
//! per line and the service answers each with one [`WireResponse`].
//!
//! ```json
//! {"id":"1b4e...","agent":"repo","request":{"action":"commit","parameters":{"message":"fix bug"}}}
//! {"id":"1b4e...","output":"✅ Committed: fix bug","error":null}
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::agent_models::{AgentRequest, AgentResult, AgentStatus};

/// A request addressed to a named agent service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct WireRequest {
    /// Correlation id echoed back in the response.
    #[ts(type = "string")]
    pub id: Uuid,

    /// Logical name of the agent the caller meant to reach.
    pub agent: String,

    pub request: AgentRequest,
}

impl WireRequest {
    pub fn new(agent: impl Into<String>, request: AgentRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent: agent.into(),
            request,
        }
    }
}

/// A service's answer to one [`WireRequest`].
///
/// `error` present means failure; `output` alone means success. A response
/// carrying neither is malformed and must be rejected by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct WireResponse {
    #[ts(type = "string")]
    pub id: Uuid,

    #[serde(default)]
    pub output: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

impl WireResponse {
    /// Wrap an agent's result as the reply to request `id`.
    pub fn from_result(id: Uuid, result: AgentResult) -> Self {
        Self {
            id,
            output: Some(result.output),
            error: if result.success { None } else { result.error },
        }
    }

    /// Unwrap into an [`AgentResult`], or `None` if neither field is populated.
    pub fn into_result(self) -> Option<AgentResult> {
        match (self.output, self.error) {
            (output, Some(error)) => Some(AgentResult::failure_with_output(
                output.unwrap_or_default(),
                error,
            )),
            (Some(output), None) => Some(AgentResult::success(output)),
            (None, None) => None,
        }
    }
}

/// Events emitted by agents and the supervisor.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "agentStatusChanged",
///   "payload": { "agent": "builder", "status": "running" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// An agent moved to a new lifecycle status.
    AgentStatusChanged { agent: String, status: AgentStatus },

    /// The supervisor restarted an agent's backing service.
    AgentRestarted {
        agent: String,
        service: String,
        succeeded: bool,
        output: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_with_neither_field_is_invalid() {
        let response = WireResponse {
            id: Uuid::new_v4(),
            output: None,
            error: None,
        };
        assert!(response.into_result().is_none());
    }

    #[test]
    fn test_response_error_wins() {
        let response = WireResponse {
            id: Uuid::new_v4(),
            output: Some(String::new()),
            error: Some("Git error: nothing to commit".to_string()),
        };
        let result = response.into_result().unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Git error: nothing to commit"));
    }

    #[test]
    fn test_success_result_round_trips_through_response() {
        let id = Uuid::new_v4();
        let response = WireResponse::from_result(id, AgentResult::success("ok"));
        assert_eq!(response.id, id);
        assert!(response.error.is_none());
        assert_eq!(response.into_result(), Some(AgentResult::success("ok")));
    }
}
