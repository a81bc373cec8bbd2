//! Request/response transport between the CLI and out-of-process agents.
//!
//! Each agent service listens on a Unix socket named after its service
//! identifier. Frames are newline-delimited JSON ([`codec`]).

pub mod client;
pub mod codec;
pub mod endpoint;
pub mod server;

pub use client::Transport;
pub use endpoint::EndpointTable;
pub use server::AgentService;
