//! Configuration loading and management.
//!
//! This module loads and writes `~/.mini/config.toml`.

pub mod error;
pub mod loader;

pub use error::{ConfigError, ConfigResult};
pub use loader::{config_path, default_config, load_config, load_user_config, mini_dir, save_config};
