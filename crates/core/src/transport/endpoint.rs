//! Agent name to service endpoint resolution.

use crate::agents::base::AgentError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Static table from logical agent name to service identifier, plus the
/// directory where each service listens on `<service>.sock`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTable {
    services: BTreeMap<String, String>,
    socket_dir: PathBuf,
}

impl EndpointTable {
    pub fn new(services: BTreeMap<String, String>, socket_dir: impl Into<PathBuf>) -> Self {
        Self {
            services,
            socket_dir: socket_dir.into(),
        }
    }

    /// Service identifier for `agent`.
    ///
    /// # Errors
    ///
    /// [`AgentError::ConfigurationMissing`] if the agent has no mapping.
    pub fn resolve(&self, agent: &str) -> Result<&str, AgentError> {
        self.services
            .get(agent)
            .map(String::as_str)
            .ok_or_else(|| AgentError::ConfigurationMissing(agent.to_string()))
    }

    /// Reverse lookup: the agent registered under `service`.
    pub fn agent_for(&self, service: &str) -> Option<&str> {
        self.services
            .iter()
            .find(|(_, id)| id.as_str() == service)
            .map(|(agent, _)| agent.as_str())
    }

    pub fn socket_path(&self, service: &str) -> PathBuf {
        self.socket_dir.join(format!("{service}.sock"))
    }

    pub fn socket_dir(&self) -> &Path {
        &self.socket_dir
    }

    /// `(agent, service)` pairs in agent-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.services
            .iter()
            .map(|(agent, service)| (agent.as_str(), service.as_str()))
    }

    /// Fail on the first name in `agents` that has no mapping.
    pub fn ensure_covers<'a>(
        &self,
        agents: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), AgentError> {
        for agent in agents {
            self.resolve(agent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EndpointTable {
        let services = BTreeMap::from([
            ("builder".to_string(), "mini.agent.builder".to_string()),
            ("repo".to_string(), "mini.agent.repo".to_string()),
        ]);
        EndpointTable::new(services, "/tmp/mini")
    }

    #[test]
    fn test_resolve_known_agent() {
        assert_eq!(table().resolve("repo").unwrap(), "mini.agent.repo");
    }

    #[test]
    fn test_resolve_unknown_agent() {
        assert_eq!(
            table().resolve("ghost").unwrap_err(),
            AgentError::ConfigurationMissing("ghost".to_string())
        );
    }

    #[test]
    fn test_socket_path() {
        assert_eq!(
            table().socket_path("mini.agent.builder"),
            PathBuf::from("/tmp/mini/mini.agent.builder.sock")
        );
    }

    #[test]
    fn test_reverse_lookup_and_coverage() {
        let table = table();
        assert_eq!(table.agent_for("mini.agent.builder"), Some("builder"));
        assert_eq!(table.agent_for("mini.agent.nope"), None);
        assert!(table.ensure_covers(["builder", "repo"]).is_ok());
        assert!(table.ensure_covers(["builder", "memory"]).is_err());
    }
}
