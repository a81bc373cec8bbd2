//! Client half of the socket transport.
//!
//! One [`Transport::send`] call opens one connection, writes one request,
//! waits for one response under a hard timeout, and closes the connection
//! on every exit path.

use crate::agents::base::AgentError;
use crate::transport::codec::{read_frame, write_frame, FrameError};
use crate::transport::endpoint::EndpointTable;
use mini_protocol::{AgentRequest, AgentResult, WireRequest, WireResponse};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Default bound on one round-trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Transport {
    endpoints: EndpointTable,
    timeout: Duration,
    open: Arc<AtomicUsize>,
}

impl Transport {
    pub fn new(endpoints: EndpointTable) -> Self {
        Self {
            endpoints,
            timeout: DEFAULT_TIMEOUT,
            open: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Connections currently held open by in-flight calls.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Send `request` to `agent` and return its result. Every transport
    /// fault is folded into a failed [`AgentResult`].
    pub async fn send(&self, agent: &str, request: AgentRequest) -> AgentResult {
        match self.round_trip(agent, request).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(agent, error = %err, "transport call failed");
                err.into()
            }
        }
    }

    /// Like [`Transport::send`] but keeps the failure class typed.
    pub async fn round_trip(
        &self,
        agent: &str,
        request: AgentRequest,
    ) -> Result<AgentResult, AgentError> {
        let service = self.endpoints.resolve(agent)?.to_string();
        let path = self.endpoints.socket_path(&service);

        let mut connection = Connection::open(&path, &service, Arc::clone(&self.open)).await?;
        let frame = WireRequest::new(agent, request);
        tracing::debug!(agent, service = %service, id = %frame.id, "sending request");

        let outcome = tokio::time::timeout(self.timeout, connection.exchange(&frame)).await;
        connection.close().await;

        let response = match outcome {
            Ok(response) => response?,
            Err(_) => {
                return Err(AgentError::Timeout {
                    service,
                    after: self.timeout,
                })
            }
        };

        if response.id != frame.id {
            return Err(AgentError::InvalidResponse {
                service,
                reason: format!("expected reply to {}, got {}", frame.id, response.id),
            });
        }
        response.into_result().ok_or(AgentError::InvalidResponse {
            service,
            reason: "reply carried neither output nor error".to_string(),
        })
    }
}

/// One open socket plus its slot in the open-connection counter.
struct Connection {
    stream: BufReader<UnixStream>,
    service: String,
    _slot: ConnectionSlot,
}

impl Connection {
    async fn open(path: &Path, service: &str, open: Arc<AtomicUsize>) -> Result<Self, AgentError> {
        let stream = UnixStream::connect(path)
            .await
            .map_err(|err| AgentError::ConnectionFailed {
                service: service.to_string(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            stream: BufReader::new(stream),
            service: service.to_string(),
            _slot: ConnectionSlot::acquire(open),
        })
    }

    async fn exchange(&mut self, frame: &WireRequest) -> Result<WireResponse, AgentError> {
        write_frame(&mut self.stream, frame)
            .await
            .map_err(|err| self.classify(err))?;

        match read_frame(&mut self.stream).await {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Err(AgentError::InvalidResponse {
                service: self.service.clone(),
                reason: "connection closed before a reply arrived".to_string(),
            }),
            Err(err) => Err(self.classify(err)),
        }
    }

    fn classify(&self, err: FrameError) -> AgentError {
        match err {
            FrameError::Io(err) => AgentError::ConnectionFailed {
                service: self.service.clone(),
                reason: err.to_string(),
            },
            other => AgentError::InvalidResponse {
                service: self.service.clone(),
                reason: other.to_string(),
            },
        }
    }

    /// Shut the socket down; the descriptor and counter slot go with `self`.
    async fn close(mut self) {
        let _ = self.stream.shutdown().await;
    }
}

struct ConnectionSlot(Arc<AtomicUsize>);

impl ConnectionSlot {
    fn acquire(open: Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self(open)
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
