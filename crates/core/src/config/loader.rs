//! Configuration file loader for `~/.mini/config.toml`.
//!
//! A missing file yields the defaults rooted under `~/.mini/`. A file that
//! exists but cannot be read, parsed or validated is an error; there is no
//! silent fallback to defaults.

use crate::config::error::{ConfigError, ConfigResult};
use mini_protocol::config_models::{
    default_build_command, default_endpoints, default_request_timeout_secs,
    default_supervisor_interval_secs, default_test_command, MiniConfig,
};
use std::path::{Path, PathBuf};

/// Directory holding configuration, logs, notes and sockets.
pub fn mini_dir(home: &Path) -> PathBuf {
    home.join(".mini")
}

/// `~/.mini/config.toml` for the current user.
pub fn config_path() -> ConfigResult<PathBuf> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(mini_dir(&home).join("config.toml"))
}

/// Defaults for a user whose home directory is `home`.
pub fn default_config(home: &Path) -> MiniConfig {
    let root = mini_dir(home);
    MiniConfig {
        project_path: root.join("projects").join("current"),
        logs_path: root.join("logs"),
        memory_path: root.join("memory"),
        socket_dir: root.join("run"),
        mode: Default::default(),
        request_timeout_secs: default_request_timeout_secs(),
        supervisor_interval_secs: default_supervisor_interval_secs(),
        service_manager: Default::default(),
        build_command: default_build_command(),
        test_command: default_test_command(),
        endpoints: default_endpoints(),
    }
}

/// Loads configuration from `path`, falling back to `defaults` only when the
/// file does not exist.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML or misses required fields
/// - A value fails validation (zero timeout, empty command)
///
/// # Example
///
/// ```rust,no_run
/// use mini_core::config::loader::{config_path, default_config, load_config};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let home = dirs::home_dir().unwrap();
/// let config = load_config(&config_path()?, default_config(&home))?;
/// println!("Project: {}", config.project_path.display());
/// # Ok(())
/// # }
/// ```
pub fn load_config(path: &Path, defaults: MiniConfig) -> ConfigResult<MiniConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(defaults);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let config: MiniConfig = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    validate(path, &config)?;
    Ok(config)
}

/// Loads the current user's configuration.
pub fn load_user_config() -> ConfigResult<MiniConfig> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    load_config(&mini_dir(&home).join("config.toml"), default_config(&home))
}

/// Writes `config` to `path`, creating parent directories.
pub fn save_config(path: &Path, config: &MiniConfig) -> ConfigResult<()> {
    validate(path, config)?;
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::FileWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn validate(path: &Path, config: &MiniConfig) -> ConfigResult<()> {
    let invalid = |reason: &str| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if config.request_timeout_secs == 0 {
        return Err(invalid("request_timeout_secs must be greater than zero"));
    }
    if config.supervisor_interval_secs == 0 {
        return Err(invalid("supervisor_interval_secs must be greater than zero"));
    }
    if config.build_command.is_empty() {
        return Err(invalid("build_command must name a program"));
    }
    if config.test_command.is_empty() {
        return Err(invalid("test_command must name a program"));
    }
    if let Some((agent, _)) = config
        .endpoints
        .iter()
        .find(|(_, service)| service.trim().is_empty())
    {
        return Err(invalid(&format!("endpoint for '{agent}' is empty")));
    }
    Ok(())
}
