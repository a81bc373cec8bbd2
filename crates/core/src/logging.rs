//! Logging setup for the `mini` binary and agent services.
//!
//! The CLI logs to stderr; a long-running agent service logs to
//! `<logs_path>/<agent>/runtime.log`. When `RUST_LOG` holds a valid filter it
//! replaces the default level entirely.

use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const RUNTIME_LOG: &str = "runtime.log";

/// Stderr logging for interactive commands. Default: WARN, or DEBUG when
/// `verbose` is set.
pub fn init(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter(env_directives().as_deref(), level))
        .try_init();
}

/// File logging for an agent service. Default: INFO.
///
/// Returns the path of the log file.
pub fn init_file(logs_path: &Path, agent: &str) -> io::Result<PathBuf> {
    let path = runtime_log_path(logs_path, agent);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    let _ = tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter(env_directives().as_deref(), tracing::Level::INFO))
        .with_ansi(false)
        .try_init();

    Ok(path)
}

fn env_directives() -> Option<String> {
    std::env::var(EnvFilter::DEFAULT_ENV).ok()
}

fn filter(directives: Option<&str>, default: tracing::Level) -> EnvFilter {
    directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(default.into()))
}

pub fn runtime_log_path(logs_path: &Path, agent: &str) -> PathBuf {
    logs_path.join(agent).join(RUNTIME_LOG)
}

/// Agents that have a `runtime.log` under `logs_path`, sorted by name.
pub fn agents_with_logs(logs_path: &Path) -> Vec<String> {
    let mut agents: Vec<String> = WalkDir::new(logs_path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir() && entry.path().join(RUNTIME_LOG).is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    agents.sort();
    agents
}
