//! Request/result envelope exchanged between callers and agents.
//!
//! Every agent, whether it lives inside the caller's process or behind a
//! local socket, consumes an [`AgentRequest`] and produces an [`AgentResult`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use ts_rs::TS;

/// Error text used when a failure is constructed without a description.
const UNSPECIFIED_ERROR: &str = "unspecified agent error";

/// Identifies the operation an agent should perform and its arguments.
///
/// # Example
///
/// ```
/// use mini_protocol::AgentRequest;
///
/// let request = AgentRequest::new("commit").with_param("message", "fix bug");
/// assert_eq!(request.param("message"), Some("fix bug"));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct AgentRequest {
    /// The action name, e.g. `"build"` or `"commit"`.
    pub action: String,

    /// Named string arguments for the action.
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl AgentRequest {
    /// Create a request with no parameters.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            parameters: HashMap::new(),
        }
    }

    /// Create a request with the given parameter map.
    pub fn with_parameters(action: impl Into<String>, parameters: HashMap<String, String>) -> Self {
        Self {
            action: action.into(),
            parameters,
        }
    }

    /// Add a single parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Look up a parameter by name.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

/// Outcome of handling one [`AgentRequest`].
///
/// `error` is set if and only if `success` is false. Build values through
/// [`AgentResult::success`] and [`AgentResult::failure`] so the invariant holds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct AgentResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl AgentResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    /// A failed result. Blank error text is replaced so a failure always
    /// carries something printable.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::failure_with_output(String::new(), error)
    }

    /// A failed result that also carries partial output from the handler.
    pub fn failure_with_output(output: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            UNSPECIFIED_ERROR.to_string()
        } else {
            error
        };
        Self {
            success: false,
            output: output.into(),
            error: Some(error),
        }
    }

    /// The text a front-end should show: output on success, error otherwise.
    pub fn display_text(&self) -> &str {
        match (&self.error, self.success) {
            (Some(error), false) => error,
            _ => &self.output,
        }
    }
}

/// Lifecycle status of an agent instance.
///
/// Valid transitions:
/// - Idle -> Running (successful start)
/// - Stopped -> Running, Error -> Running (restart)
/// - Running -> Stopped (stop)
/// - any -> Error (unrecoverable initialization fault)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Created but not started yet.
    Idle,
    /// Initialized and accepting requests.
    Running,
    /// Shut down.
    Stopped,
    /// Initialization failed; the agent does not accept requests.
    Error,
}

impl AgentStatus {
    /// Check whether moving from `self` to `target` is allowed.
    pub fn can_transition_to(self, target: AgentStatus) -> bool {
        matches!(
            (self, target),
            (AgentStatus::Idle, AgentStatus::Running)
                | (AgentStatus::Stopped, AgentStatus::Running)
                | (AgentStatus::Error, AgentStatus::Running)
                | (AgentStatus::Running, AgentStatus::Stopped)
                | (_, AgentStatus::Error)
        )
    }

    /// Whether requests may be handled in this status.
    pub fn accepts_requests(self) -> bool {
        self == AgentStatus::Running
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Idle => write!(f, "idle"),
            AgentStatus::Running => write!(f, "running"),
            AgentStatus::Stopped => write!(f, "stopped"),
            AgentStatus::Error => write!(f, "error"),
        }
    }
}
