//! # mini-core
//!
//! Agent naming, dispatch and supervision for mini.agent.
//!
//! This crate provides:
//! - The `Agent` contract and the registry that dispatches requests by name
//! - Concrete agents for builds, tests, git, notes, crash logs and a filtered shell
//! - A Unix-socket transport for agents running as background services
//! - A supervisor that probes and restarts those services
//!
//! ## Modules
//!
//! - [`agents`]: Agent trait, realizations and the `AgentManager`
//! - [`config`]: Loading and writing `~/.mini/config.toml`
//! - [`context`]: The registry built from configuration
//! - [`logging`]: `tracing` subscriber setup
//! - [`supervisor`]: Liveness probes and restarts
//! - [`transport`]: Socket client, server and framing

pub mod agents;
pub mod config;
pub mod context;
pub mod logging;
pub mod supervisor;
pub mod transport;

pub use context::MiniContext;
