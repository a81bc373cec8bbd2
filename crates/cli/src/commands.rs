//! Command-line surface of `mini`.
//!
//! Every positional argument is optional at the clap level so a missing
//! argument produces our own usage line instead of a parser error.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mini")]
#[command(about = "mini.agent: build, test, git, notes and a safe shell through local agents")]
#[command(version)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print agent results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Build the current project
    Build,

    /// Run the project's tests
    Test,

    /// Stage everything and create a git commit
    Commit {
        /// Commit message (words are joined with spaces)
        message: Vec<String>,
    },

    /// Create and switch to a new git branch
    Branch { name: Option<String> },

    /// Show git status
    Status,

    /// Save a memory note
    Memory {
        /// Note text (words are joined with spaces)
        note: Vec<String>,
    },

    /// List saved memory notes, newest first
    Notes,

    /// Show lines added and removed between the two latest memory notes
    Diff,

    /// Summarize a crash log or panic backtrace
    Debug { log: Option<PathBuf> },

    /// Run an allow-listed shell command in the project directory
    Shell {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Ask the supervisor for a heartbeat
    Heartbeat,

    /// Probe every agent and restart the ones that are down
    Health,

    /// Restart one agent's service
    Restart { agent: Option<String> },

    /// Record a project directory in the configuration (default: current dir)
    Init { path: Option<PathBuf> },

    /// Show the effective configuration
    Config,

    /// List agents with logs, or print one agent's runtime log
    Logs { agent: Option<String> },

    /// Run one agent as a background service on its socket
    Serve { agent: Option<String> },
}
