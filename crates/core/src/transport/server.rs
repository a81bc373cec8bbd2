//! Service side of the socket transport: hosts one agent on one socket.

use crate::agents::base::Agent;
use crate::transport::codec::{read_frame, write_frame};
use anyhow::{Context, Result};
use mini_protocol::{AgentResult, WireRequest, WireResponse};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;

pub struct AgentService {
    agent: Arc<dyn Agent>,
    socket: PathBuf,
}

impl AgentService {
    pub fn new(agent: Arc<dyn Agent>, socket: impl Into<PathBuf>) -> Self {
        Self {
            agent,
            socket: socket.into(),
        }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Start the agent, then serve requests until `shutdown` flips to `true`.
    ///
    /// The agent is stopped and the socket file removed before returning.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        self.agent
            .start()
            .await
            .with_context(|| format!("starting agent '{}'", self.agent.name()))?;

        let listener = match self.bind() {
            Ok(listener) => listener,
            Err(err) => {
                self.agent.stop().await;
                return Err(err);
            }
        };
        tracing::info!(
            agent = self.agent.name(),
            socket = %self.socket.display(),
            "agent service listening"
        );

        let served = self.accept_loop(&listener, &mut shutdown).await;

        self.agent.stop().await;
        let _ = std::fs::remove_file(&self.socket);
        tracing::info!(agent = self.agent.name(), "agent service stopped");
        served
    }

    fn bind(&self) -> Result<UnixListener> {
        if let Some(dir) = self.socket.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating socket directory {}", dir.display()))?;
        }
        // A socket left behind by a crashed run blocks bind.
        let _ = std::fs::remove_file(&self.socket);

        UnixListener::bind(&self.socket)
            .with_context(|| format!("binding {}", self.socket.display()))
    }

    async fn accept_loop(
        &self,
        listener: &UnixListener,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, _) = accepted.context("accepting connection")?;
                    let agent = Arc::clone(&self.agent);
                    tokio::spawn(async move {
                        if let Err(err) = serve_connection(stream, agent).await {
                            tracing::warn!(error = %err, "agent connection error");
                        }
                    });
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Ok(());
                    }
                }
            }
        }
    }
}

async fn serve_connection(stream: UnixStream, agent: Arc<dyn Agent>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    while let Some(frame) = read_frame::<_, WireRequest>(&mut reader).await? {
        let result = if frame.agent == agent.name() {
            agent.handle(frame.request).await
        } else {
            AgentResult::failure(format!(
                "❌ Request for agent '{}' reached service for '{}'",
                frame.agent,
                agent.name()
            ))
        };
        write_frame(&mut writer, &WireResponse::from_result(frame.id, result)).await?;
    }
    Ok(())
}
