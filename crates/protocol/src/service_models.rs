//! Liveness and status report models.
//!
//! The supervisor produces a [`StatusReport`] for every agent service it
//! watches. The human-readable report is a rendering of this structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Whether an agent's backing service is currently alive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
pub enum Liveness {
    Running,
    NotRunning,
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Liveness::Running => write!(f, "RUNNING"),
            Liveness::NotRunning => write!(f, "NOT RUNNING"),
        }
    }
}

/// The supervisor's view of one agent service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct AgentHealth {
    /// Logical agent name, e.g. `"builder"`.
    pub agent: String,

    /// Service identifier the agent is registered under.
    pub service: String,

    /// Result of the liveness probe.
    pub liveness: Liveness,

    /// Set when the probe itself failed; the agent is then reported as not running.
    #[serde(default)]
    pub probe_error: Option<String>,

    /// Whether a restart was attempted during this report.
    pub restarted: bool,

    /// Combined text of the restart attempt, empty when no restart happened.
    #[serde(default)]
    pub restart_output: String,
}

/// One pass of the supervisor over every watched agent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StatusReport {
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<AgentHealth>,
}

impl StatusReport {
    /// Names of the agents that were restarted in this pass.
    pub fn restarted_agents(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.restarted)
            .map(|entry| entry.agent.as_str())
            .collect()
    }

    /// Look up the entry for a given agent.
    pub fn entry(&self, agent: &str) -> Option<&AgentHealth> {
        self.entries.iter().find(|entry| entry.agent == agent)
    }
}
