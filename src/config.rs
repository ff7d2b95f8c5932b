//! Startup configuration.
//!
//! The configuration lives in a small JSON document read exactly once at
//! process start and passed by reference into the conversation store and the
//! model gateway.  A missing or unparsable file is fatal: there is no
//! degraded mode, so the binary refuses to serve without it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Well-known path of the configuration file, relative to the working
/// directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Directory holding per-student history files.
pub const HISTORY_DIR: &str = "history";

fn default_student_id() -> String {
    "student001".to_string()
}

/// Startup configuration: `{ api_key, proxy, student_id }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Credential for the hosted chat-completion API.
    pub api_key: String,

    /// Optional HTTP proxy URL routed through the gateway's HTTP client.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Identifier selecting which history file belongs to this session.
    #[serde(default = "default_student_id")]
    pub student_id: String,
}

impl Config {
    /// Loads the configuration from [`DEFAULT_CONFIG_PATH`].
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads the configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigMissing`] when the file does not exist and
    /// [`Error::ConfigInvalid`] when it cannot be read or parsed.  Both are
    /// startup preconditions, not runtime errors to be caught per request.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::config_missing(path.display().to_string()));
        }
        let data = fs::read_to_string(path).map_err(|err| {
            Error::config_invalid(
                format!("failed to read {}: {err}", path.display()),
                Some(Box::new(err)),
            )
        })?;
        serde_json::from_str(&data).map_err(|err| {
            Error::config_invalid(
                format!("failed to parse {}: {err}", path.display()),
                Some(Box::new(err)),
            )
        })
    }

    /// Returns the history file path derived from the student identifier:
    /// `history/<student_id>.json`.
    pub fn history_file(&self) -> PathBuf {
        PathBuf::from(HISTORY_DIR).join(format!("{}.json", self.student_id))
    }
}
