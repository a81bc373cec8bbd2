//! Terminal proxy agent: runs filtered shell commands in the project directory.

use crate::agents::base::AgentError;
use crate::agents::cli_executor::CliExecutor;
use crate::agents::local::ActionHandler;
use async_trait::async_trait;
use mini_protocol::{AgentRequest, AgentResult};
use std::path::PathBuf;

const ALLOWED_PREFIXES: &[&str] = &[
    "ls", "cat", "cargo build", "cargo test", "cargo check", "swift build", "swift test", "git",
    "pwd", "echo", "cd", "du", "df", "ps", "kill -0", "whoami", "env",
];

const FORBIDDEN_FRAGMENTS: &[&str] = &[
    "rm -rf",
    "shutdown",
    "reboot",
    "mkfs",
    "diskutil erase",
    "kill -9",
    "> /",
    ":(){:|:&};:",
];

/// Shell syntax that would run a second command after the allowed one.
const CHAINING: &[&str] = &[";", "&", "|", "`", "$(", "\n", "\r"];

/// Allow-list filter for proxied shell commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandFilter;

impl CommandFilter {
    /// A command is allowed when it is a single command (no chaining,
    /// pipes or substitution), contains no forbidden fragment and starts
    /// with an allowed prefix as whole words.
    pub fn is_allowed(&self, command: &str) -> bool {
        let command = command.trim();
        if CHAINING.iter().any(|token| command.contains(token))
            || FORBIDDEN_FRAGMENTS
                .iter()
                .any(|fragment| command.contains(fragment))
        {
            return false;
        }
        ALLOWED_PREFIXES.iter().any(|prefix| {
            command
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        })
    }
}

pub struct TerminalProxyActions {
    project_path: PathBuf,
    filter: CommandFilter,
}

impl TerminalProxyActions {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            filter: CommandFilter,
        }
    }

    async fn shell(&self, command: &str) -> AgentResult {
        if !self.filter.is_allowed(command) {
            tracing::warn!(command, "rejected shell command");
            return AgentResult::failure(format!("⛔ Command not allowed: {command}"));
        }
        if !self.project_path.is_dir() {
            return AgentError::ProjectNotFound(self.project_path.clone()).into();
        }

        match CliExecutor::run("sh", &["-c", command], Some(&self.project_path)).await {
            Ok(output) if output.succeeded() => AgentResult::success(output.combined()),
            Ok(output) => AgentResult::failure_with_output(
                output.combined(),
                format!("❌ Command failed ({})", output.exit_description()),
            ),
            Err(err) => AgentResult::failure(format!("❌ Failed to run shell: {err}")),
        }
    }
}

#[async_trait]
impl ActionHandler for TerminalProxyActions {
    async fn perform(&self, request: &AgentRequest) -> AgentResult {
        match request.action.as_str() {
            "shell" => match request.param("command") {
                Some(command) if !command.trim().is_empty() => self.shell(command).await,
                _ => AgentResult::failure("TerminalProxyAgent received empty command"),
            },
            other => AgentResult::failure(format!("Unknown action: {other}")),
        }
    }
}
