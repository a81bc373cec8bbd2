//! Memory agent: stores free-form notes as Markdown files.
//!
//! Every saved note also leaves a JSON snapshot under `history/`, so the two
//! latest notes can be compared line by line.

use crate::agents::local::ActionHandler;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use mini_protocol::{AgentRequest, AgentResult};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

const HISTORY_DIR: &str = "history";

/// Notes saved within one second get `_02`, `_03`, ... suffixes up to this many.
const MAX_NOTES_PER_SECOND: usize = 99;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MemorySnapshot {
    /// Unix seconds.
    timestamp: i64,
    content: String,
}

pub struct MemoryActions {
    memory_path: PathBuf,
}

impl MemoryActions {
    pub fn new(memory_path: impl Into<PathBuf>) -> Self {
        Self {
            memory_path: memory_path.into(),
        }
    }

    pub fn memory_path(&self) -> &Path {
        &self.memory_path
    }

    fn history_path(&self) -> PathBuf {
        self.memory_path.join(HISTORY_DIR)
    }

    async fn save(&self, note: &str) -> AgentResult {
        let now = Local::now();
        let (stem, mut file) = match self.create_note_file(&now).await {
            Ok(created) => created,
            Err(err) => return AgentResult::failure(format!("Failed to save note: {err}")),
        };
        let filename = format!("{stem}.md");
        let content = format!(
            "# Memory Note\n**Date:** {}\n\n{}\n",
            now.format("%Y-%m-%d %H:%M:%S %z"),
            note
        );

        let written = match file.write_all(content.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            return AgentResult::failure(format!("Failed to save note: {err}"));
        }
        if let Err(err) = self.record_snapshot(&stem, &now, note).await {
            tracing::warn!(file = %filename, error = %err, "note saved without a history snapshot");
        }

        tracing::info!(file = %filename, "saved note");
        AgentResult::success(format!("✅ Note saved: {filename}"))
    }

    /// Create `<stamp>.md`, or the first free `<stamp>_NN.md`, without
    /// touching existing notes.
    async fn create_note_file(&self, now: &DateTime<Local>) -> io::Result<(String, File)> {
        let stamp = now.format("%Y-%m-%d_%H-%M-%S").to_string();
        for n in 1..=MAX_NOTES_PER_SECOND {
            let stem = if n == 1 {
                stamp.clone()
            } else {
                format!("{stamp}_{n:02}")
            };
            let opened = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.memory_path.join(format!("{stem}.md")))
                .await;
            match opened {
                Ok(file) => return Ok((stem, file)),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("more than {MAX_NOTES_PER_SECOND} notes at {stamp}"),
        ))
    }

    async fn record_snapshot(
        &self,
        stem: &str,
        now: &DateTime<Local>,
        note: &str,
    ) -> anyhow::Result<()> {
        let history = self.history_path();
        tokio::fs::create_dir_all(&history)
            .await
            .with_context(|| format!("cannot create {}", history.display()))?;
        let snapshot = MemorySnapshot {
            timestamp: now.timestamp(),
            content: note.to_string(),
        };
        let path = history.join(format!("{stem}.json"));
        tokio::fs::write(&path, serde_json::to_vec(&snapshot)?)
            .await
            .with_context(|| format!("cannot write {}", path.display()))
    }

    /// Line diff between the two most recent snapshots.
    fn diff(&self) -> AgentResult {
        let history = self.history_path();
        if !history.is_dir() {
            return AgentResult::success("No previous snapshots.");
        }

        let mut snapshots: Vec<PathBuf> = WalkDir::new(&history)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .map(walkdir::DirEntry::into_path)
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        snapshots.sort();

        let [.., previous, latest] = snapshots.as_slice() else {
            return AgentResult::success("Not enough snapshots to diff.");
        };
        match (read_snapshot(previous), read_snapshot(latest)) {
            (Some(previous), Some(latest)) => {
                AgentResult::success(diff_lines(&previous.content, &latest.content))
            }
            _ => AgentResult::failure("Unable to decode memory snapshots."),
        }
    }

    fn list(&self) -> AgentResult {
        let mut notes = Vec::new();
        for entry in WalkDir::new(&self.memory_path).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => return AgentResult::failure(format!("Failed to list notes: {err}")),
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".md") {
                notes.push(name);
            }
        }

        if notes.is_empty() {
            return AgentResult::success("No notes found");
        }

        notes.sort();
        notes.reverse();
        let lines: Vec<String> = notes.iter().map(|note| format!("  • {note}")).collect();
        AgentResult::success(format!("📝 Memory Notes:\n{}", lines.join("\n")))
    }
}

fn read_snapshot(path: &Path) -> Option<MemorySnapshot> {
    let bytes = std::fs::read(path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// `+ line` for lines only in `new`, then `- line` for lines only in `old`.
fn diff_lines(old: &str, new: &str) -> String {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let added = new_lines
        .iter()
        .filter(|line| !old_lines.contains(line))
        .map(|line| format!("+ {line}"));
    let removed = old_lines
        .iter()
        .filter(|line| !new_lines.contains(line))
        .map(|line| format!("- {line}"));
    let changes: Vec<String> = added.chain(removed).collect();

    if changes.is_empty() {
        "No meaningful changes.".to_string()
    } else {
        changes.join("\n")
    }
}

#[async_trait]
impl ActionHandler for MemoryActions {
    async fn initialize(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.memory_path)
            .await
            .with_context(|| format!("cannot create {}", self.memory_path.display()))
    }

    async fn perform(&self, request: &AgentRequest) -> AgentResult {
        match request.action.as_str() {
            "save" => match request.param("note") {
                Some(note) if !note.trim().is_empty() => self.save(note).await,
                _ => AgentResult::failure("Note content required"),
            },
            "list" => self.list(),
            "diff" => self.diff(),
            other => AgentResult::failure(format!("Unknown action: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::base::Agent;
    use crate::agents::local::LocalAgent;
    use mini_protocol::AgentStatus;

    #[tokio::test]
    async fn test_save_and_list() {
        let temp_dir = tempfile::tempdir().unwrap();
        let memory = temp_dir.path().join("memory");
        let agent = LocalAgent::new("memory", MemoryActions::new(&memory));
        agent.start().await.unwrap();

        let saved = agent
            .handle(AgentRequest::new("save").with_param("note", "use tokio::time::timeout"))
            .await;
        assert!(saved.success);
        assert!(saved.output.starts_with("✅ Note saved: "));

        let filename = saved.output.trim_start_matches("✅ Note saved: ");
        let content = std::fs::read_to_string(memory.join(filename)).unwrap();
        assert!(content.starts_with("# Memory Note\n"));
        assert!(content.contains("use tokio::time::timeout"));

        let listed = agent.handle(AgentRequest::new("list")).await;
        assert!(listed.output.starts_with("📝 Memory Notes:\n"));
        assert!(listed.output.contains(filename));
    }

    #[tokio::test]
    async fn test_saves_in_the_same_second_keep_both_notes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let actions = MemoryActions::new(temp_dir.path());
        let now = Local::now();

        let (first, _) = actions.create_note_file(&now).await.unwrap();
        let (second, _) = actions.create_note_file(&now).await.unwrap();
        let (third, _) = actions.create_note_file(&now).await.unwrap();

        let stamp = now.format("%Y-%m-%d_%H-%M-%S").to_string();
        assert_eq!(first, stamp);
        assert_eq!(second, format!("{stamp}_02"));
        assert_eq!(third, format!("{stamp}_03"));
    }

    #[tokio::test]
    async fn test_rapid_saves_never_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let actions = MemoryActions::new(temp_dir.path());

        let first = actions
            .perform(&AgentRequest::new("save").with_param("note", "first"))
            .await;
        let second = actions
            .perform(&AgentRequest::new("save").with_param("note", "second"))
            .await;

        assert!(first.success && second.success);
        assert_ne!(first.output, second.output);
        for (result, note) in [(&first, "first"), (&second, "second")] {
            let filename = result.output.trim_start_matches("✅ Note saved: ");
            let content = std::fs::read_to_string(temp_dir.path().join(filename)).unwrap();
            assert!(content.ends_with(&format!("\n\n{note}\n")));
        }
    }

    #[tokio::test]
    async fn test_diff_between_latest_notes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let actions = MemoryActions::new(temp_dir.path());
        let request = AgentRequest::new("diff");
        let diff = || actions.perform(&request);

        assert_eq!(diff().await, AgentResult::success("No previous snapshots."));

        actions
            .perform(&AgentRequest::new("save").with_param("note", "keep\nold idea"))
            .await;
        assert_eq!(diff().await, AgentResult::success("Not enough snapshots to diff."));

        actions
            .perform(&AgentRequest::new("save").with_param("note", "keep\nnew idea"))
            .await;
        assert_eq!(diff().await, AgentResult::success("+ new idea\n- old idea"));

        let listed = actions.perform(&AgentRequest::new("list")).await;
        assert_eq!(listed.output.lines().count(), 3);
    }

    #[test]
    fn test_diff_lines_without_changes() {
        assert_eq!(diff_lines("a\nb", "b\na"), "No meaningful changes.");
    }

    #[tokio::test]
    async fn test_list_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let actions = MemoryActions::new(temp_dir.path());

        let result = actions.perform(&AgentRequest::new("list")).await;

        assert_eq!(result, AgentResult::success("No notes found"));
    }

    #[tokio::test]
    async fn test_save_requires_note() {
        let temp_dir = tempfile::tempdir().unwrap();
        let actions = MemoryActions::new(temp_dir.path());

        let result = actions.perform(&AgentRequest::new("save")).await;

        assert_eq!(result.error.as_deref(), Some("Note content required"));
    }

    #[tokio::test]
    async fn test_unwritable_memory_dir_lands_in_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let agent = LocalAgent::new("memory", MemoryActions::new(blocker.join("memory")));

        assert!(agent.start().await.is_err());
        assert_eq!(agent.status().await, AgentStatus::Error);
    }
}
