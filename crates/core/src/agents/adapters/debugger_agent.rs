//! Debugger agent: summarizes crash logs and panic backtraces.

use crate::agents::local::ActionHandler;
use async_trait::async_trait;
use mini_protocol::{AgentRequest, AgentResult};
use std::path::{Path, PathBuf};

const RULE: &str = "------------------------";

/// What a crash log says about the crash itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashSummary {
    pub summary: String,
    pub signal: String,
}

/// Pull the exception and signal out of a crash report or panic message.
pub fn parse_crash(log: &str) -> CrashSummary {
    let mut summary = None;
    let mut signal = None;

    for line in log.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("Exception Type:") {
            summary = Some(rest.trim().to_string());
        } else if summary.is_none() && line.contains("panicked at") {
            summary = Some(line.to_string());
        }

        if let Some(rest) = line
            .strip_prefix("Exception Codes:")
            .or_else(|| line.strip_prefix("Termination Signal:"))
        {
            signal = Some(rest.trim().to_string());
        } else if signal.is_none() {
            signal = signal_name(line);
        }
    }

    CrashSummary {
        summary: summary.unwrap_or_else(|| "Unknown".to_string()),
        signal: signal.unwrap_or_else(|| "Unknown".to_string()),
    }
}

/// First `SIGxxx` token on the line, e.g. `SIGSEGV` in `(signal: 11, SIGSEGV: ...)`.
fn signal_name(line: &str) -> Option<String> {
    line.split(|c: char| !c.is_ascii_alphanumeric())
        .find(|word| {
            word.len() > 3
                && word.starts_with("SIG")
                && word[3..].chars().all(|c| c.is_ascii_uppercase())
        })
        .map(str::to_string)
}

/// Keep the stack frames: lines with an address, or numbered backtrace frames
/// such as `  3: core::panicking::panic`.
pub fn format_stacktrace(log: &str) -> String {
    let frames: Vec<String> = log
        .lines()
        .map(str::trim)
        .filter(|line| line.contains("0x") || is_numbered_frame(line))
        .map(|line| format!("  → {line}"))
        .collect();

    if frames.is_empty() {
        "No stack frames detected.".to_string()
    } else {
        frames.join("\n")
    }
}

fn is_numbered_frame(line: &str) -> bool {
    match line.split_once(':') {
        Some((index, symbol)) => {
            !index.is_empty()
                && index.chars().all(|c| c.is_ascii_digit())
                && !symbol.trim().is_empty()
        }
        None => false,
    }
}

pub fn analyze(log: &str) -> String {
    let crash = parse_crash(log);
    format!(
        "🐞 Debugger Output\n{RULE}\n\nCrash Summary:\n{}\n\nSignals:\n{}\n\nStacktrace (cleaned):\n{}\n\n{RULE}",
        crash.summary,
        crash.signal,
        format_stacktrace(log)
    )
}

pub struct DebuggerActions {
    project_path: PathBuf,
}

impl DebuggerActions {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
        }
    }

    /// Relative paths are taken from the project directory.
    fn resolve(&self, log: &str) -> PathBuf {
        let path = Path::new(log);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_path.join(path)
        }
    }

    async fn analyze_file(&self, log: &str) -> AgentResult {
        let path = self.resolve(log);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                tracing::info!(log = %path.display(), "analyzing crash log");
                AgentResult::success(analyze(&content))
            }
            Err(err) => AgentResult::failure(format!(
                "❌ Cannot read crash log {}: {err}",
                path.display()
            )),
        }
    }
}

#[async_trait]
impl ActionHandler for DebuggerActions {
    async fn perform(&self, request: &AgentRequest) -> AgentResult {
        match request.action.as_str() {
            "analyze" => {
                if let Some(text) = request.param("text").filter(|text| !text.trim().is_empty()) {
                    return AgentResult::success(analyze(text));
                }
                match request.param("log").map(str::trim) {
                    Some(log) if !log.is_empty() => self.analyze_file(log).await,
                    _ => AgentResult::failure("DebuggerAgent received empty payload"),
                }
            }
            other => AgentResult::failure(format!("Unknown action: {other}")),
        }
    }
}
