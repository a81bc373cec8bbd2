//! Common test utilities shared by the integration suites.
//!
//! This module provides:
//! - Fixtures (temporary homes, git projects, endpoint tables, hosted services)
//! - A scripted service manager for supervisor tests
//! - Event assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_services;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_services::*;
