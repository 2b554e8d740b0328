//! Bootstrap configuration
//!
//! Everything the server needs before it can open the database: where the
//! database lives, what to bind, how long requests may take, the logging
//! level and the staff allow-list. Runtime app settings (name, logo,
//! registration window) live in the database; see [`crate::settings`].

use crate::auth::StaffEntry;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "VIP_CONFIG";

pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Logging section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub request_timeout_ms: u64,
    /// Local copy of the app settings, read before the database answers
    pub settings_cache_path: PathBuf,
    pub logging: LoggingConfig,
    /// Staff allowed into the admin area
    pub staff: Vec<StaffEntry>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            database_path: data_dir.join("vip.db"),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            settings_cache_path: data_dir.join("settings-cache.toml"),
            logging: LoggingConfig::default(),
            staff: Vec::new(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Load using the priority order:
    /// 1. Command-line argument
    /// 2. `VIP_CONFIG` environment variable
    /// 3. `~/.config/vip/config.toml`
    /// 4. Compiled defaults
    ///
    /// An explicitly named file (1 or 2) must exist and parse. A missing
    /// user-level file only produces a warning.
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_arg {
            info!("Loading config from command line: {}", path.display());
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            info!("Loading config from {}: {}", CONFIG_ENV_VAR, path);
            return Self::from_file(Path::new(&path));
        }

        match user_config_path() {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => {
                warn!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `~/.config/vip/config.toml` (platform equivalent elsewhere)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vip").join("config.toml"))
}

/// OS-dependent data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("vip"))
        .unwrap_or_else(|| PathBuf::from("./vip_data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.port, 5780);
        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.logging.level, "info");
        assert!(config.staff.is_empty());
        assert_eq!(config.bind_address(), "127.0.0.1:5780");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
port = 8080

[logging]
level = "debug"

[[staff]]
email = "pastor@example.org"
role = "admin"

[[staff]]
email = "office@example.org"
role = "secretary"
"#
        )
        .unwrap();

        let config = TomlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.staff.len(), 2);
        assert_eq!(config.staff[1].role, Role::Secretary);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        let err = TomlConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    #[serial]
    fn test_cli_arg_beats_env_var() {
        let mut cli_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(cli_file, "port = 1111").unwrap();
        let mut env_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(env_file, "port = 2222").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, env_file.path());
        let from_cli = TomlConfig::load(Some(cli_file.path())).unwrap();
        let from_env = TomlConfig::load(None).unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(from_cli.port, 1111);
        assert_eq!(from_env.port, 2222);
    }

    #[test]
    #[serial]
    fn test_env_var_pointing_nowhere_fails() {
        std::env::set_var(CONFIG_ENV_VAR, "/nonexistent/vip/config.toml");
        let result = TomlConfig::load(None);
        std::env::remove_var(CONFIG_ENV_VAR);

        assert!(matches!(result, Err(Error::Io(_))));
    }
}
