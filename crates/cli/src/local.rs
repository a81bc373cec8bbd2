//! Commands answered without dispatching to an agent.

use color_eyre::eyre::{eyre, Result, WrapErr};
use colored::Colorize;
use mini_core::config::{config_path, save_config};
use mini_core::logging::{agents_with_logs, runtime_log_path};
use mini_protocol::MiniConfig;
use std::path::{Path, PathBuf};

/// Record `path` (default: the current directory) as the project.
pub fn init(config: &mut MiniConfig, path: Option<PathBuf>) -> Result<String> {
    let requested = match path {
        Some(path) => path,
        None => std::env::current_dir().wrap_err("cannot read the current directory")?,
    };
    let project = requested.canonicalize().map_err(|err| {
        eyre!(
            "❌ Failed to initialize project: {} ({err})",
            requested.display()
        )
    })?;
    if !project.is_dir() {
        return Err(eyre!(
            "❌ Failed to initialize project: {} is not a directory",
            project.display()
        ));
    }

    config.project_path = project;
    let written = config_path()?;
    save_config(&written, config)?;

    Ok(format!(
        "✅ Project initialized!\n\nCurrent project: {}\nConfig written:  {}\n\nTry: {}",
        config.project_path.display(),
        written.display(),
        "mini status".bold()
    ))
}

pub fn show_config(config: &MiniConfig, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(config)?);
    }

    let mut text = format!(
        "{}\n---------------------------\n",
        "📝 mini.agent Configuration".bold()
    );
    let rows = [
        ("Project Path:", config.project_path.display().to_string()),
        ("Logs Path:", config.logs_path.display().to_string()),
        ("Memory Path:", config.memory_path.display().to_string()),
        ("Socket Dir:", config.socket_dir.display().to_string()),
        ("Mode:", serde_json::to_value(config.mode)?.as_str().unwrap_or_default().to_string()),
        ("Timeout:", format!("{}s", config.request_timeout_secs)),
    ];
    for (label, value) in rows {
        text.push_str(&format!("{label:<14} {value}\n"));
    }
    Ok(text.trim_end().to_string())
}

/// Without an agent, list the agents that have logs; with one, print its log.
pub fn logs(logs_path: &Path, agent: Option<&str>) -> Result<String> {
    let Some(agent) = agent else {
        let agents = agents_with_logs(logs_path);
        if agents.is_empty() {
            return Ok(format!("No logs found in {}", logs_path.display()));
        }
        let lines: Vec<String> = agents.iter().map(|agent| format!("  • {agent}")).collect();
        return Ok(format!("📜 Agent logs:\n{}", lines.join("\n")));
    };

    let path = runtime_log_path(logs_path, agent);
    std::fs::read_to_string(&path)
        .map(|content| content.trim_end().to_string())
        .map_err(|_| eyre!("❌ No logs for agent '{agent}' at {}", path.display()))
}
