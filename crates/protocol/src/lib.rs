//! # mini-protocol
//!
//! Core protocol definitions and data models for mini.agent.
//!
//! This crate defines all shared data structures used for:
//! - The request/result envelope exchanged between callers and agents
//! - The wire frames carried over an agent's local socket
//! - Supervisor status reports
//! - Configuration file parsing (`~/.mini/config.toml`)
//!
//! ## Modules
//!
//! - [`agent_kind`]: The built-in agents and their registry names
//! - [`agent_models`]: Request/result envelope and agent status
//! - [`config_models`]: Global configuration from config.toml
//! - [`ipc`]: Wire frames and lifecycle events
//! - [`service_models`]: Liveness and status report structures
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs, uuid and chrono
//! - TypeScript generation: All types derive `TS` for front-end compatibility
//! - Independent compilation: No dependencies on other mini crates

pub mod agent_kind;
pub mod agent_models;
pub mod config_models;
pub mod ipc;
pub mod service_models;

// Re-export all public types for convenience
pub use agent_kind::*;
pub use agent_models::*;
pub use config_models::*;
pub use ipc::*;
pub use service_models::*;
