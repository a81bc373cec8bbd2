//! Agent abstraction and management.
//!
//! This module provides the `Agent` trait, its in-process ([`LocalAgent`])
//! and out-of-process ([`RemoteAgent`]) realizations, and the
//! `AgentManager` that dispatches requests to them by name.

pub mod adapters;
pub mod base;
pub mod cli_executor;
pub mod factory;
pub mod lifecycle;
pub mod local;
pub mod manager;
pub mod remote;

pub use adapters::MockAgent;
pub use base::{Agent, AgentError};
pub use factory::AgentFactory;
pub use lifecycle::Lifecycle;
pub use local::{ActionHandler, LocalAgent};
pub use manager::AgentManager;
pub use mini_protocol::AgentKind;
pub use remote::RemoteAgent;
