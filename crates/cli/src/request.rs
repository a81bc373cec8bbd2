//! Maps agent-bound commands to `(agent, AgentRequest)` and renders results.

use crate::commands::Commands;
use mini_protocol::{AgentRequest, AgentResult};
use std::fmt;
use std::path::Path;

/// A command that goes through the agent registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub agent: &'static str,
    pub request: AgentRequest,
}

impl Dispatch {
    fn new(agent: &'static str, request: AgentRequest) -> Self {
        Self { agent, request }
    }
}

/// A required argument was missing; holds the usage line to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage(pub &'static str);

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "❌ Usage: {}", self.0)
    }
}

/// Build the request for an agent-bound command.
///
/// Returns `Ok(None)` for commands handled locally (`init`, `config`, `logs`,
/// `serve`).
pub fn build_request(command: &Commands) -> Result<Option<Dispatch>, Usage> {
    let dispatch = match command {
        Commands::Build => Dispatch::new("builder", AgentRequest::new("build")),
        Commands::Test => Dispatch::new("test", AgentRequest::new("test")),
        Commands::Commit { message } => {
            let message = joined(message).ok_or(Usage("mini commit \"message\""))?;
            Dispatch::new(
                "repo",
                AgentRequest::new("commit").with_param("message", message),
            )
        }
        Commands::Branch { name } => {
            let name = non_blank(name.as_deref()).ok_or(Usage("mini branch \"name\""))?;
            Dispatch::new("repo", AgentRequest::new("branch").with_param("name", name))
        }
        Commands::Status => Dispatch::new("repo", AgentRequest::new("status")),
        Commands::Memory { note } => {
            let note = joined(note).ok_or(Usage("mini memory \"note\""))?;
            Dispatch::new("memory", AgentRequest::new("save").with_param("note", note))
        }
        Commands::Notes => Dispatch::new("memory", AgentRequest::new("list")),
        Commands::Diff => Dispatch::new("memory", AgentRequest::new("diff")),
        Commands::Debug { log } => {
            let log = log
                .as_deref()
                .filter(|log| !log.as_os_str().is_empty())
                .ok_or(Usage("mini debug <crash-log>"))?;
            Dispatch::new(
                "debugger",
                AgentRequest::new("analyze").with_param("log", from_cwd(log)),
            )
        }
        Commands::Shell { command } => {
            let command = joined(command).ok_or(Usage("mini shell <command>"))?;
            Dispatch::new(
                "terminalproxy",
                AgentRequest::new("shell").with_param("command", command),
            )
        }
        Commands::Heartbeat => Dispatch::new("supervisor", AgentRequest::new("heartbeat")),
        Commands::Health => Dispatch::new("supervisor", AgentRequest::new("status")),
        Commands::Restart { agent } => {
            let agent = non_blank(agent.as_deref()).ok_or(Usage("mini restart <agent>"))?;
            Dispatch::new(
                "supervisor",
                AgentRequest::new("restart").with_param("agent", agent),
            )
        }
        Commands::Init { .. } | Commands::Config | Commands::Logs { .. } | Commands::Serve { .. } => {
            return Ok(None)
        }
    };
    Ok(Some(dispatch))
}

/// Paths given on the command line are relative to where `mini` runs.
fn from_cwd(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

fn joined(words: &[String]) -> Option<String> {
    let text = words.join(" ");
    non_blank(Some(text.as_str())).map(str::to_string)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// What to print for a finished request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub success: bool,
}

/// Output and error text are passed through verbatim.
pub fn render_result(result: &AgentResult, json: bool) -> Rendered {
    if json {
        return Rendered {
            stdout: serde_json::to_string_pretty(result).ok(),
            stderr: None,
            success: result.success,
        };
    }

    let stdout = (!result.output.is_empty()).then(|| result.output.clone());
    let stderr = if result.success {
        None
    } else {
        Some(
            result
                .error
                .clone()
                .unwrap_or_else(|| "❌ Request failed".to_string()),
        )
    };
    Rendered {
        stdout,
        stderr,
        success: result.success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(command: Commands) -> Dispatch {
        build_request(&command).unwrap().unwrap()
    }

    fn words(text: &str) -> Vec<String> {
        text.split(' ').map(str::to_string).collect()
    }

    #[test]
    fn test_commit_request() {
        let built = dispatch(Commands::Commit {
            message: words("fix bug"),
        });

        assert_eq!(built.agent, "repo");
        assert_eq!(built.request.action, "commit");
        assert_eq!(built.request.param("message"), Some("fix bug"));
    }

    #[test]
    fn test_simple_commands() {
        let cases = [
            (Commands::Build, "builder", "build"),
            (Commands::Test, "test", "test"),
            (Commands::Status, "repo", "status"),
            (Commands::Notes, "memory", "list"),
            (Commands::Diff, "memory", "diff"),
            (Commands::Heartbeat, "supervisor", "heartbeat"),
            (Commands::Health, "supervisor", "status"),
        ];
        for (command, agent, action) in cases {
            let built = dispatch(command);
            assert_eq!(built.agent, agent);
            assert_eq!(built.request.action, action);
            assert!(built.request.parameters.is_empty());
        }
    }

    #[test]
    fn test_parameterized_commands() {
        let built = dispatch(Commands::Branch {
            name: Some("feature/x".to_string()),
        });
        assert_eq!(built.request.param("name"), Some("feature/x"));

        let built = dispatch(Commands::Shell {
            command: words("git log --oneline"),
        });
        assert_eq!(built.agent, "terminalproxy");
        assert_eq!(built.request.param("command"), Some("git log --oneline"));

        let built = dispatch(Commands::Restart {
            agent: Some("repo".to_string()),
        });
        assert_eq!(built.request.param("agent"), Some("repo"));
    }

    #[test]
    fn test_debug_log_is_made_absolute() {
        let built = dispatch(Commands::Debug {
            log: Some("crash.log".into()),
        });

        assert_eq!(built.agent, "debugger");
        assert_eq!(built.request.action, "analyze");
        let expected = std::env::current_dir().unwrap().join("crash.log");
        assert_eq!(
            built.request.param("log"),
            Some(expected.to_string_lossy().as_ref())
        );
    }

    #[test]
    fn test_missing_arguments_yield_usage() {
        let cases = [
            (Commands::Commit { message: vec![] }, "❌ Usage: mini commit \"message\""),
            (Commands::Branch { name: None }, "❌ Usage: mini branch \"name\""),
            (Commands::Memory { note: words("  ") }, "❌ Usage: mini memory \"note\""),
            (Commands::Shell { command: vec![] }, "❌ Usage: mini shell <command>"),
            (Commands::Restart { agent: None }, "❌ Usage: mini restart <agent>"),
            (Commands::Debug { log: None }, "❌ Usage: mini debug <crash-log>"),
        ];
        for (command, usage) in cases {
            assert_eq!(build_request(&command).unwrap_err().to_string(), usage);
        }
    }

    #[test]
    fn test_local_commands_are_not_dispatched() {
        assert_eq!(build_request(&Commands::Config), Ok(None));
        assert_eq!(build_request(&Commands::Serve { agent: None }), Ok(None));
    }

    #[test]
    fn test_render_verbatim() {
        let rendered = render_result(&AgentResult::success("✅ Committed: fix bug"), false);
        assert_eq!(rendered.stdout.as_deref(), Some("✅ Committed: fix bug"));
        assert_eq!(rendered.stderr, None);
        assert!(rendered.success);

        let failed = AgentResult::failure_with_output("error[E0308]", "❌ Build failed");
        let rendered = render_result(&failed, false);
        assert_eq!(rendered.stdout.as_deref(), Some("error[E0308]"));
        assert_eq!(rendered.stderr.as_deref(), Some("❌ Build failed"));
        assert!(!rendered.success);
    }

    #[test]
    fn test_render_json() {
        let rendered = render_result(&AgentResult::success("ok"), true);
        let value: serde_json::Value =
            serde_json::from_str(rendered.stdout.as_deref().unwrap()).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["output"], "ok");
    }
}
