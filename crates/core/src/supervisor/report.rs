//! Plain-text rendering of a [`StatusReport`].

use mini_protocol::{AgentHealth, StatusReport};
use std::fmt::Write;

const RULE: &str = "--------------------------------";

pub fn render_report(report: &StatusReport) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "🔎 mini.agent System Status");
    let _ = writeln!(text, "{RULE}");
    let _ = writeln!(
        text,
        "Timestamp: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    text.push('\n');

    for entry in &report.entries {
        render_entry(&mut text, entry);
    }
    text.push_str(RULE);
    text
}

fn render_entry(text: &mut String, entry: &AgentHealth) {
    let _ = writeln!(
        text,
        "• {} Agent: {}",
        capitalize(&entry.agent),
        entry.liveness
    );
    if let Some(probe_error) = &entry.probe_error {
        let _ = writeln!(text, "  probe error: {probe_error}");
    }
    if entry.restarted {
        let _ = writeln!(text, "  → Restarting...");
        for line in entry.restart_output.lines() {
            let _ = writeln!(text, "  {line}");
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
