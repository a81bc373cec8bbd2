//! Mock agent implementation for testing.

use crate::agents::base::{Agent, AgentError};
use crate::agents::lifecycle::Lifecycle;
use async_trait::async_trait;
use mini_protocol::{AgentRequest, AgentResult, AgentStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Behavior {
    Succeed(String),
    Fail(String),
    Delay(Duration, String),
    FailStart(String),
}

pub struct MockAgent {
    lifecycle: Lifecycle,
    behavior: Behavior,
    calls: AtomicUsize,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl MockAgent {
    fn with_behavior(name: &str, behavior: Behavior) -> Self {
        Self {
            lifecycle: Lifecycle::new(name),
            behavior,
            calls: AtomicUsize::new(0),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    /// Always succeeds with `output`.
    pub fn success(name: &str, output: &str) -> Self {
        Self::with_behavior(name, Behavior::Succeed(output.to_string()))
    }

    /// Always fails with `error`.
    pub fn failing(name: &str, error: &str) -> Self {
        Self::with_behavior(name, Behavior::Fail(error.to_string()))
    }

    /// Sleeps for `delay` before succeeding with `output`.
    pub fn delayed(name: &str, output: &str, delay: Duration) -> Self {
        Self::with_behavior(name, Behavior::Delay(delay, output.to_string()))
    }

    /// Refuses to start with `reason`.
    pub fn broken(name: &str, reason: &str) -> Self {
        Self::with_behavior(name, Behavior::FailStart(reason.to_string()))
    }

    /// Number of requests that reached the handler.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn name(&self) -> &str {
        self.lifecycle.agent()
    }

    async fn status(&self) -> AgentStatus {
        self.lifecycle.status().await
    }

    async fn start(&self) -> Result<(), AgentError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if let Behavior::FailStart(reason) = &self.behavior {
            self.lifecycle.mark_error(reason).await;
            return Err(AgentError::StartFailed {
                agent: self.name().to_string(),
                reason: reason.clone(),
            });
        }
        self.lifecycle.mark_running().await;
        Ok(())
    }

    async fn stop(&self) {
        if self.lifecycle.mark_stopped().await {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn handle(&self, _request: AgentRequest) -> AgentResult {
        if let Err(err) = self.lifecycle.ensure_running().await {
            return err.into();
        }
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            Behavior::Succeed(output) => AgentResult::success(output.clone()),
            Behavior::Fail(error) => AgentResult::failure(error.clone()),
            Behavior::Delay(delay, output) => {
                tokio::time::sleep(*delay).await;
                AgentResult::success(output.clone())
            }
            Behavior::FailStart(reason) => AgentResult::failure(reason.clone()),
        }
    }
}
