//! Custom assertion helpers for integration tests.

use mini_protocol::ipc::Event;
use mini_protocol::{AgentResult, AgentStatus};

/// A result is either a success without error or a failure with non-empty error.
#[allow(dead_code)]
pub fn assert_well_formed(result: &AgentResult) {
    if result.success {
        assert!(result.error.is_none(), "success carried an error: {result:?}");
    } else {
        let error = result.error.as_deref().unwrap_or_default();
        assert!(!error.is_empty(), "failure without error text: {result:?}");
    }
}

/// Whether `events` contains a status change of `agent` to `status`.
#[allow(dead_code)]
pub fn has_status_change(events: &[Event], agent: &str, status: AgentStatus) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            Event::AgentStatusChanged { agent: a, status: s } if a == agent && *s == status
        )
    })
}

/// Agents named in `AgentRestarted` events, in order.
#[allow(dead_code)]
pub fn restarted_agents(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::AgentRestarted { agent, .. } => Some(agent.clone()),
            _ => None,
        })
        .collect()
}
