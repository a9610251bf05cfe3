//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/circleci-env/circleci-env.toml`
//! 3. Environment variables: `CIRCLECI_ENV_*` prefix
//! 4. Command-line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::VcsType;
use crate::infrastructure::{ClientOptions, CIRCLE_BASE_URL, DEFAULT_TIMEOUT};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "CIRCLECI_ENV";

const REDACTED: &str = "<redacted>";

const TEMPLATE: &str = r#"# circleci-env configuration
#
# Every key is optional. Environment variables prefixed with CIRCLECI_ENV_
# (e.g. CIRCLECI_ENV_TOKEN) override this file; command-line flags override both.

# API token (prefer CIRCLECI_TOKEN or a secret manager over storing it here)
# token = ""

# Default VCS host: "github" or "bitbucket"
vcs_type = "github"

# Default account (username or organization)
# username = ""

# API root
base_url = "https://circleci.com/api/v1.1"

# Timeouts in seconds
timeout_secs = 30
connect_timeout_secs = 30
"#;

/// Errors raised while loading or writing settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("config error: {message}")]
    Config { message: String },

    #[error("config file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("cannot determine the configuration directory")]
    NoConfigDir,

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn config_err(e: impl std::fmt::Display) -> SettingsError {
    SettingsError::Config {
        message: e.to_string(),
    }
}

/// Unified configuration for circleci-env.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// API token
    pub token: Option<String>,
    /// Default VCS host
    pub vcs_type: VcsType,
    /// Default account (username or organization)
    pub username: Option<String>,
    /// API root
    pub base_url: String,
    /// Overall request timeout in seconds
    pub timeout_secs: u64,
    /// Connect/TLS handshake timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: None,
            vcs_type: VcsType::default(),
            username: None,
            base_url: CIRCLE_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Get the XDG config directory for circleci-env.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "circleci-env").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("circleci-env.toml"))
}

impl Settings {
    /// Load settings from the global config file and the environment.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings from an explicit (optional) file and the environment.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load_from(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!("config file: {}", path.display());
            builder = builder.add_source(File::from(path.to_path_buf()).required(false));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        let config = builder.build().map_err(config_err)?;
        let settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make every request fail immediately.
    fn validate(&self) -> Result<(), SettingsError> {
        for (name, secs) in [
            ("timeout_secs", self.timeout_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
        ] {
            if secs == 0 {
                return Err(SettingsError::Config {
                    message: format!("{name} must be greater than zero"),
                });
            }
        }
        Ok(())
    }

    /// Transport settings derived from this configuration.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            use_system_proxy: true,
        }
    }

    /// Render as TOML with the token masked.
    pub fn to_redacted_toml(&self) -> Result<String, SettingsError> {
        let mut shown = self.clone();
        if shown.token.is_some() {
            shown.token = Some(REDACTED.to_string());
        }
        toml::to_string_pretty(&shown).map_err(config_err)
    }

    /// Write the commented template to `path`, creating parent directories.
    ///
    /// Never overwrites an existing file.
    pub fn write_template(path: &Path) -> Result<(), SettingsError> {
        if path.exists() {
            return Err(SettingsError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io {
                context: format!("create {}", parent.display()),
                source: e,
            })?;
        }
        std::fs::write(path, TEMPLATE).map_err(|e| SettingsError::Io {
            context: format!("write {}", path.display()),
            source: e,
        })
    }

    /// Write the template to the global config path and return that path.
    pub fn init_global() -> Result<PathBuf, SettingsError> {
        let path = global_config_path().ok_or(SettingsError::NoConfigDir)?;
        Self::write_template(&path)?;
        Ok(path)
    }
}
