//! Agents that wrap command-line developer tools.
//!
//! [`ToolActions`] maps each action name to a sequence of command steps run in
//! the project directory. The builder, test and repo agents are presets of
//! this table.

use crate::agents::base::AgentError;
use crate::agents::cli_executor::CliExecutor;
use crate::agents::local::ActionHandler;
use async_trait::async_trait;
use mini_protocol::{AgentRequest, AgentResult};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// One program invocation. Arguments may contain `{param}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStep {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolStep {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    /// Build a step from a configured argv such as `["cargo", "build"]`.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

/// Steps and reply for one action.
#[derive(Debug, Clone, Default)]
pub struct ToolAction {
    steps: Vec<ToolStep>,
    required: Vec<String>,
    reply: Option<String>,
}

impl ToolAction {
    pub fn new(steps: Vec<ToolStep>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Reject requests that lack `param`.
    pub fn requires(mut self, param: &str) -> Self {
        self.required.push(param.to_string());
        self
    }

    /// Reply template; `{output}` is the last step's output, `{param}` a request parameter.
    pub fn reply(mut self, template: &str) -> Self {
        self.reply = Some(template.to_string());
        self
    }
}

pub struct ToolActions {
    project_path: PathBuf,
    actions: BTreeMap<String, ToolAction>,
}

impl ToolActions {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            actions: BTreeMap::new(),
        }
    }

    pub fn action(mut self, name: &str, action: ToolAction) -> Self {
        self.actions.insert(name.to_string(), action);
        self
    }

    /// `build` runs the configured build command.
    pub fn builder(project_path: impl Into<PathBuf>, build_command: &[String]) -> Self {
        let steps = ToolStep::from_argv(build_command).into_iter().collect();
        Self::new(project_path).action(
            "build",
            ToolAction::new(steps).reply("✅ Build completed successfully\n\n{output}"),
        )
    }

    /// `test` runs the configured test command.
    pub fn tester(project_path: impl Into<PathBuf>, test_command: &[String]) -> Self {
        let steps = ToolStep::from_argv(test_command).into_iter().collect();
        Self::new(project_path).action(
            "test",
            ToolAction::new(steps).reply("✅ Tests passed\n\n{output}"),
        )
    }

    /// `commit`, `branch` and `status` on the project's git repository.
    pub fn repo(project_path: impl Into<PathBuf>) -> Self {
        Self::new(project_path)
            .action(
                "commit",
                ToolAction::new(vec![
                    ToolStep::new("git", &["add", "-A"]),
                    ToolStep::new("git", &["commit", "-m", "{message}"]),
                ])
                .requires("message")
                .reply("✅ Committed: {message}"),
            )
            .action(
                "branch",
                ToolAction::new(vec![ToolStep::new("git", &["checkout", "-b", "{name}"])])
                    .requires("name")
                    .reply("✅ Created branch: {name}"),
            )
            .action(
                "status",
                ToolAction::new(vec![ToolStep::new("git", &["status", "--short"])]),
            )
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    async fn run_steps(
        &self,
        action: &ToolAction,
        params: &HashMap<String, String>,
    ) -> Result<String, AgentResult> {
        let mut last_output = String::new();
        for step in &action.steps {
            let args: Vec<String> = step.args.iter().map(|arg| fill(arg, params, None)).collect();
            let output = CliExecutor::run(&step.program, &args, Some(&self.project_path))
                .await
                .map_err(|err| {
                    AgentResult::failure(format!("❌ Failed to run {}: {err}", step.program))
                })?;

            if !output.succeeded() {
                return Err(AgentResult::failure(format!(
                    "❌ {} failed ({})\n\n{}",
                    step.program,
                    output.exit_description(),
                    output.combined()
                )));
            }
            last_output = output.combined();
        }
        Ok(last_output)
    }
}

#[async_trait]
impl ActionHandler for ToolActions {
    async fn initialize(&self) -> anyhow::Result<()> {
        for action in self.actions.values() {
            for step in &action.steps {
                if let Err(err) = which::which(&step.program) {
                    tracing::warn!(program = %step.program, error = %err, "tool not found on PATH");
                }
            }
        }
        Ok(())
    }

    async fn perform(&self, request: &AgentRequest) -> AgentResult {
        let Some(action) = self.actions.get(&request.action) else {
            return AgentResult::failure(format!("Unknown action: {}", request.action));
        };

        if let Some(missing) = action
            .required
            .iter()
            .find(|param| request.param(param).map_or(true, |v| v.trim().is_empty()))
        {
            return AgentResult::failure(format!("Parameter '{missing}' required"));
        }

        if action.steps.is_empty() {
            return AgentResult::failure(format!(
                "No command configured for action: {}",
                request.action
            ));
        }

        if !self.project_path.is_dir() {
            return AgentError::ProjectNotFound(self.project_path.clone()).into();
        }

        match self.run_steps(action, &request.parameters).await {
            Ok(output) => match &action.reply {
                Some(template) => {
                    let reply = fill(template, &request.parameters, Some(output.as_str()));
                    AgentResult::success(reply.trim_end().to_string())
                }
                None if output.is_empty() => AgentResult::success("✅ Done"),
                None => AgentResult::success(output),
            },
            Err(failure) => failure,
        }
    }
}

/// Replace every `{key}` in `template` with the matching parameter value, and
/// `{output}` with `output` when given.
///
/// Only the template is scanned; substituted values are copied as-is, so a
/// value containing `{output}` or another placeholder stays literal.
fn fill(template: &str, params: &HashMap<String, String>, output: Option<&str>) -> String {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        filled.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            let value = match key {
                "output" => output,
                _ => params.get(key).map(String::as_str),
            };
            value.map(|value| (value, close))
        });

        match value {
            Some((value, close)) => {
                filled.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                filled.push('{');
                rest = after;
            }
        }
    }
    filled.push_str(rest);
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::base::Agent;
    use crate::agents::local::LocalAgent;

    fn git(dir: &std::path::Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success());
    }

    fn init_repo() -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        git(temp_dir.path(), &["init", "-q"]);
        git(temp_dir.path(), &["config", "user.email", "mini@example.com"]);
        git(temp_dir.path(), &["config", "user.name", "mini"]);
        temp_dir
    }

    #[test]
    fn test_fill_replaces_placeholders() {
        let params = HashMap::from([("message".to_string(), "fix bug".to_string())]);
        assert_eq!(
            fill("✅ Committed: {message}", &params, None),
            "✅ Committed: fix bug"
        );
        assert_eq!(fill("{other}", &params, None), "{other}");
        assert_eq!(fill("{{message}}", &params, None), "{fix bug}");
        assert_eq!(fill("{output} / {message", &params, Some("done")), "done / {message");
    }

    #[test]
    fn test_fill_keeps_substituted_values_literal() {
        let params = HashMap::from([
            ("message".to_string(), "use {output} and {name}".to_string()),
            ("name".to_string(), "main".to_string()),
        ]);

        assert_eq!(
            fill("✅ Committed: {message}", &params, Some("[main 018893d] 2 files changed")),
            "✅ Committed: use {output} and {name}"
        );
        assert_eq!(fill("{message}", &params, None), "use {output} and {name}");
    }

    #[test]
    fn test_step_from_empty_argv() {
        assert!(ToolStep::from_argv(&[]).is_none());
        let step = ToolStep::from_argv(&["cargo".to_string(), "build".to_string()]).unwrap();
        assert_eq!(step, ToolStep::new("cargo", &["build"]));
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let actions = ToolActions::repo(".");
        let result = actions.perform(&AgentRequest::new("rebase")).await;
        assert_eq!(result.error.as_deref(), Some("Unknown action: rebase"));
    }

    #[tokio::test]
    async fn test_missing_parameter() {
        let actions = ToolActions::repo(".");
        let result = actions.perform(&AgentRequest::new("commit")).await;
        assert_eq!(result.error.as_deref(), Some("Parameter 'message' required"));
    }

    #[tokio::test]
    async fn test_missing_project_dir() {
        let actions = ToolActions::builder("/definitely/not/here", &["true".to_string()]);
        let result = actions.perform(&AgentRequest::new("build")).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("/definitely/not/here"));
    }

    #[tokio::test]
    async fn test_failing_step_reports_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        let command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo 'error[E0425]: cannot find value' >&2; exit 101".to_string(),
        ];
        let actions = ToolActions::builder(temp_dir.path(), &command);

        let result = actions.perform(&AgentRequest::new("build")).await;

        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.starts_with("❌ sh failed (exit status 101)"));
        assert!(error.contains("error[E0425]"));
    }

    #[tokio::test]
    async fn test_build_success_reply() {
        let temp_dir = tempfile::tempdir().unwrap();
        let command = vec!["echo".to_string(), "Finished".to_string()];
        let actions = ToolActions::builder(temp_dir.path(), &command);

        let result = actions.perform(&AgentRequest::new("build")).await;

        assert_eq!(
            result,
            AgentResult::success("✅ Build completed successfully\n\nFinished")
        );
    }

    #[tokio::test]
    async fn test_repo_commit_and_status() {
        let repo = init_repo();
        std::fs::write(repo.path().join("main.rs"), "fn main() {}\n").unwrap();

        let agent = LocalAgent::new("repo", ToolActions::repo(repo.path()));
        agent.start().await.unwrap();

        let status = agent.handle(AgentRequest::new("status")).await;
        assert!(status.success);
        assert!(status.output.contains("main.rs"));

        let commit = agent
            .handle(AgentRequest::new("commit").with_param("message", "fix bug"))
            .await;
        assert_eq!(commit, AgentResult::success("✅ Committed: fix bug"));

        let clean = agent.handle(AgentRequest::new("status")).await;
        assert_eq!(clean, AgentResult::success("✅ Done"));
    }

    #[tokio::test]
    async fn test_commit_message_with_placeholder_is_verbatim() {
        let repo = init_repo();
        std::fs::write(repo.path().join("main.rs"), "fn main() {}\n").unwrap();
        let actions = ToolActions::repo(repo.path());

        let result = actions
            .perform(&AgentRequest::new("commit").with_param("message", "use {output} token"))
            .await;

        assert_eq!(result, AgentResult::success("✅ Committed: use {output} token"));
        let output = std::process::Command::new("git")
            .args(["log", "-1", "--format=%s"])
            .current_dir(repo.path())
            .output()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "use {output} token");
    }

    #[tokio::test]
    async fn test_repo_branch() {
        let repo = init_repo();
        std::fs::write(repo.path().join("README.md"), "hi\n").unwrap();
        git(repo.path(), &["add", "-A"]);
        git(repo.path(), &["commit", "-q", "-m", "init"]);

        let actions = ToolActions::repo(repo.path());
        let result = actions
            .perform(&AgentRequest::new("branch").with_param("name", "feature/x"))
            .await;

        assert_eq!(result, AgentResult::success("✅ Created branch: feature/x"));
    }
}
