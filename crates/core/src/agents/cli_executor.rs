//! Common subprocess executor for agents and service managers.
//!
//! Agents that wrap developer tools (compilers, test runners, git, a shell)
//! and the supervisor's service-manager integrations all run a program to
//! completion and look at its exit status and combined output.

use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn succeeded(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout followed by stderr, trimmed.
    pub fn combined(&self) -> String {
        let mut text = self.stdout.trim_end().to_string();
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stderr);
        }
        text
    }

    /// Human-readable exit description, e.g. `"exit status 1"`.
    pub fn exit_description(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Subprocess executor.
pub struct CliExecutor;

impl CliExecutor {
    /// Run `program` with `args` to completion and capture its output.
    ///
    /// # Arguments
    ///
    /// * `program` - The program to execute (e.g., "git", "systemctl")
    /// * `args` - Command line arguments
    /// * `working_dir` - Working directory, or the caller's if `None`
    ///
    /// # Errors
    ///
    /// Returns the spawn error if the program could not be started. A
    /// non-zero exit is not an error; inspect [`ToolOutput::succeeded`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mini_core::agents::cli_executor::CliExecutor;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let output = CliExecutor::run("git", &["status", "--short"], None)
    ///         .await
    ///         .unwrap();
    ///     println!("{}", output.combined());
    /// }
    /// ```
    pub async fn run<S: AsRef<str>>(
        program: &str,
        args: &[S],
        working_dir: Option<&Path>,
    ) -> io::Result<ToolOutput> {
        let mut cmd = Command::new(program);
        for arg in args {
            let arg: &str = arg.as_ref();
            cmd.arg(arg);
        }
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(program, args = args.len(), "spawning tool");
        let output = cmd.output().await?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
