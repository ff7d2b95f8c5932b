//! Error types for the EduLingo crate.
//!
//! The error set is deliberately closed: configuration failures are fatal at
//! startup, history I/O failures are recovered by the conversation store, and
//! gateway failures are recovered at the call site. Every variant keeps the
//! raw underlying detail for logging while [`Error::user_message`] supplies
//! the fixed string shown to the student.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::prompts;

/// The main error type for EduLingo.
#[derive(Clone, Debug)]
pub enum Error {
    /// The configuration file does not exist.
    ConfigMissing {
        /// Path that was probed.
        path: String,
    },

    /// The configuration file exists but could not be read or parsed.
    ConfigInvalid {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The history file could not be read or parsed.
    HistoryRead {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The history file could not be written.
    HistoryWrite {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The remote API rejected the credential.
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// The remote API throttled the request.
    RateLimit {
        /// Human-readable error message.
        message: String,
        /// Time to wait before retrying, in seconds.
        retry_after: Option<u64>,
    },

    /// The remote endpoint could not be reached, or the request timed out.
    Connection {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// An export format outside the supported set was requested.
    UnsupportedFormat {
        /// The format string that was rejected.
        format: String,
    },

    /// A role outside `system`/`user`/`assistant`, or a system message
    /// appended through the ordinary message path.
    InvalidRole {
        /// The offending role.
        role: String,
    },

    /// Any other failure, wrapping the original failure's description.
    Unknown {
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Creates a new missing-configuration error.
    pub fn config_missing(path: impl Into<String>) -> Self {
        Error::ConfigMissing { path: path.into() }
    }

    /// Creates a new invalid-configuration error.
    pub fn config_invalid(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::ConfigInvalid {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new history-read error.
    pub fn history_read(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HistoryRead {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new history-write error.
    pub fn history_write(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HistoryWrite {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new rate limit error.
    pub fn rate_limit(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Error::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new unsupported-format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Error::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates a new invalid-role error.
    pub fn invalid_role(role: impl Into<String>) -> Self {
        Error::InvalidRole { role: role.into() }
    }

    /// Creates a new unknown error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Error::Unknown {
            message: message.into(),
        }
    }

    /// Returns true if this error is fatal at startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigMissing { .. } | Error::ConfigInvalid { .. }
        )
    }

    /// Returns true if this error is related to authentication.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Returns true if this error is related to rate limiting.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimit { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns true if this error is a history persistence error.
    pub fn is_history_write(&self) -> bool {
        matches!(self, Error::HistoryWrite { .. })
    }

    /// Returns true if this error is an unsupported-format error.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Error::UnsupportedFormat { .. })
    }

    /// Returns the fixed user-presentable message for this error.
    ///
    /// The raw detail stays available through `Display` and
    /// [`std::error::Error::source`] for logging.
    pub fn user_message(&self) -> String {
        match self {
            Error::ConfigMissing { .. } | Error::ConfigInvalid { .. } => {
                prompts::CONFIG_ERROR.to_string()
            }
            Error::HistoryRead { message, .. } => {
                format!("历史记录加载失败: {message}")
            }
            Error::HistoryWrite { message, .. } => {
                format!("历史记录保存失败: {message}")
            }
            Error::Authentication { .. } => prompts::AUTH_ERROR.to_string(),
            Error::RateLimit { .. } => prompts::RATE_LIMIT_ERROR.to_string(),
            Error::Connection { .. } => prompts::NETWORK_ERROR.to_string(),
            Error::UnsupportedFormat { format } => {
                format!("不支持的导出格式: {format}")
            }
            Error::InvalidRole { role } => {
                format!("无效的消息角色: {role}")
            }
            Error::Unknown { message } => {
                format!("AI服务请求失败: {message}")
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigMissing { path } => {
                write!(f, "Configuration file not found: {path}")
            }
            Error::ConfigInvalid { message, .. } => {
                write!(f, "Configuration error: {message}")
            }
            Error::HistoryRead { message, .. } => {
                write!(f, "History read error: {message}")
            }
            Error::HistoryWrite { message, .. } => {
                write!(f, "History write error: {message}")
            }
            Error::Authentication { message } => {
                write!(f, "Authentication error: {message}")
            }
            Error::RateLimit {
                message,
                retry_after,
            } => {
                if let Some(retry_after) = retry_after {
                    write!(
                        f,
                        "Rate limit exceeded: {message} (retry after {retry_after} seconds)"
                    )
                } else {
                    write!(f, "Rate limit exceeded: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::UnsupportedFormat { format } => {
                write!(f, "Unsupported export format: {format}")
            }
            Error::InvalidRole { role } => {
                write!(f, "Invalid message role: {role}")
            }
            Error::Unknown { message } => {
                write!(f, "Unknown error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::ConfigInvalid { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HistoryRead { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HistoryWrite { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::unknown(format!("I/O error: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::unknown(format!("JSON error: {err}"))
    }
}

/// A specialized Result type for EduLingo operations.
pub type Result<T> = std::result::Result<T, Error>;
