//! Client settings
//!
//! Read from `config.yaml` under the user's config directory. Every key is
//! optional: a missing section or field takes the value the daemon ships
//! with (bus first, socket at `/var/run/abrt/abrt.socket`, 5 s timeout).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transport: TransportConfig,
    pub logging: LoggingConfig,
}

/// How the client reaches the daemon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Bus when the daemon answers there, socket otherwise
    #[default]
    Auto,
    /// Bus only; calls fail with `NotConnected` while it is unreachable
    Bus,
    /// Socket only, so only `create` works
    Socket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub mode: TransportMode,
    /// Where the daemon accepts new problems
    pub socket_path: PathBuf,
    /// Bound on each connect, write and read step of a socket exchange
    pub socket_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::Auto,
            socket_path: PathBuf::from("/var/run/abrt/abrt.socket"),
            socket_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// One rejected setting, keyed by its YAML path (`transport.socket_path`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Config {
    /// Parses the YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Like [`Config::load`], but an unreadable or malformed file gives the
    /// built-in settings.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// `problems/config.yaml` under the XDG config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("problems")
            .join("config.yaml")
    }

    /// Checks every setting, collecting all problems rather than stopping
    /// at the first.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let transport = &self.transport;

        if transport.socket_path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "transport.socket_path",
                "must not be empty",
            ));
        } else if !transport.socket_path.is_absolute() {
            errors.push(ValidationError::new(
                "transport.socket_path",
                format!(
                    "must be an absolute path: {}",
                    transport.socket_path.display()
                ),
            ));
        }

        if transport.socket_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "transport.socket_timeout_secs",
                "must be greater than 0",
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError::new(
                "logging.level",
                format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }

        errors
    }
}

/// Settings assembled in code, mostly for tests and embedders that do not
/// read a file.
///
/// ```rust,no_run
/// use problems_core::config::{ConfigBuilder, TransportMode};
///
/// let config = ConfigBuilder::new()
///     .transport_mode(TransportMode::Socket)
///     .socket_timeout_secs(2)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transport_mode(mut self, mode: TransportMode) -> Self {
        self.config.transport.mode = mode;
        self
    }

    pub fn socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.transport.socket_path = path.into();
        self
    }

    pub fn socket_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.transport.socket_timeout_secs = seconds;
        self
    }

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }

    /// Fails with every [`ValidationError`] when a setting is out of range.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        match self.config.validate() {
            errors if errors.is_empty() => Ok(self.config),
            errors => Err(errors),
        }
    }
}
