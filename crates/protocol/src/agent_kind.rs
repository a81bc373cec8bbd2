//! Built-in agents shipped with mini.agent, keyed by their registry name.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Builder,
    Test,
    Repo,
    Memory,
    TerminalProxy,
    Debugger,
    Supervisor,
}

impl AgentKind {
    pub const ALL: [AgentKind; 7] = [
        Self::Builder,
        Self::Test,
        Self::Repo,
        Self::Memory,
        Self::TerminalProxy,
        Self::Debugger,
        Self::Supervisor,
    ];

    /// Look up a built-in agent by registry name.
    ///
    /// # Examples
    ///
    /// ```
    /// use mini_protocol::AgentKind;
    ///
    /// assert_eq!(AgentKind::from_name("repo"), Some(AgentKind::Repo));
    /// assert_eq!(AgentKind::from_name("generator"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Registry name, also the last segment of the service identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Builder => "builder",
            Self::Test => "test",
            Self::Repo => "repo",
            Self::Memory => "memory",
            Self::TerminalProxy => "terminalproxy",
            Self::Debugger => "debugger",
            Self::Supervisor => "supervisor",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
