//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TRAILER_DATA_FILE` - JSON snapshot holding lots, orders and customers
//!   (default: `trailer-data.json`)
//! - `TRAILER_OPERATOR` - Name of the person running commands, attached to
//!   every log line (default: `operator`)
//! - `TRAILER_LOG_JSON` - `true` for JSON log output (default: `false`)
//! - `RUST_LOG` - Log filter (default: `trailer_cli=info,trailer_core=info`)

use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_DATA_FILE: &str = "trailer-data.json";
const DEFAULT_OPERATOR: &str = "operator";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that cannot be parsed: name, then reason.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// The person running a command.
///
/// Passed explicitly into every command instead of being read from a global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Operator name.
    pub operator: String,
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Path of the JSON snapshot.
    pub data_file: PathBuf,
    /// Session context for this run.
    pub session: Session,
    /// Emit JSON logs instead of text.
    pub log_json: bool,
}

impl CliConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a lookup function (the environment in production).
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_file = match lookup("TRAILER_DATA_FILE") {
            Some(path) if path.trim().is_empty() => {
                return Err(ConfigError::InvalidEnvVar(
                    "TRAILER_DATA_FILE".to_string(),
                    "must not be empty".to_string(),
                ));
            }
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_DATA_FILE),
        };

        let operator = match lookup("TRAILER_OPERATOR") {
            Some(name) if name.trim().is_empty() => {
                return Err(ConfigError::InvalidEnvVar(
                    "TRAILER_OPERATOR".to_string(),
                    "must not be empty".to_string(),
                ));
            }
            Some(name) => name.trim().to_string(),
            None => DEFAULT_OPERATOR.to_string(),
        };

        let log_json = match lookup("TRAILER_LOG_JSON").as_deref() {
            None | Some("" | "0" | "false") => false,
            Some("1" | "true") => true,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "TRAILER_LOG_JSON".to_string(),
                    format!("expected true or false, got {other}"),
                ));
            }
        };

        Ok(Self {
            data_file,
            session: Session { operator },
            log_json,
        })
    }
}
