//! Error types for refsort.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 3=not_found, 4=validation, etc.)
//! - Retryability flags so callers can decide whether to try again
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

/// Result type alias for refsort operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    DatabaseError,

    // Not Found (exit 3)
    ProjectNotFound,

    // Validation (exit 4)
    IndexOutOfRange,
    InvalidArgument,
    SessionBusy,

    // Auth (exit 5)
    AuthRequired,

    // Remote (exit 6)
    RemoteUnavailable,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::IndexOutOfRange => "INDEX_OUT_OF_RANGE",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::SessionBusy => "SESSION_BUSY",
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::RemoteUnavailable => "REMOTE_UNAVAILABLE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::DatabaseError => 2,
            Self::ProjectNotFound => 3,
            Self::IndexOutOfRange | Self::InvalidArgument | Self::SessionBusy => 4,
            Self::AuthRequired => 5,
            Self::RemoteUnavailable => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying the same request can succeed.
    ///
    /// True for transient store failures and for a save issued while a load
    /// was still in flight. The engine never retries on its own.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RemoteUnavailable | Self::SessionBusy | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in refsort operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Index {index} is out of range for a list of {len} references")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Project not found: {id}")]
    ProjectNotFound { id: String },

    #[error("Sign-in required: no owner identity available")]
    AuthRequired,

    #[error("Project store unavailable: {reason}")]
    RemoteUnavailable { reason: String },

    #[error("Session is busy ({state})")]
    SessionBusy { state: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a `RemoteUnavailable` error from any displayable failure.
    pub fn remote(reason: impl std::fmt::Display) -> Self {
        Self::RemoteUnavailable {
            reason: reason.to_string(),
        }
    }

    /// Re-classify infrastructure failures as store unavailability.
    ///
    /// Used at the `ProjectStore` boundary so callers see a single
    /// `RemoteUnavailable` category regardless of the backing store.
    /// Domain errors (`ProjectNotFound`, `AuthRequired`, ...) pass through.
    #[must_use]
    pub fn into_remote(self) -> Self {
        match self {
            Self::Database(e) => Self::remote(e),
            Self::Io(e) => Self::remote(e),
            Self::Json(e) => Self::remote(e),
            other => other,
        }
    }

    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            Self::ProjectNotFound { .. } => ErrorCode::ProjectNotFound,
            Self::AuthRequired => ErrorCode::AuthRequired,
            Self::RemoteUnavailable { .. } => ErrorCode::RemoteUnavailable,
            Self::SessionBusy { .. } => ErrorCode::SessionBusy,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::IndexOutOfRange { len, .. } => Some(if *len == 0 {
                "The list is empty. Add one with: refsort add \"reference\"".to_string()
            } else {
                format!("Valid positions are 1-{len}. Use `refsort list` to see them.")
            }),

            Self::ProjectNotFound { id } => Some(format!(
                "No project with ID '{id}' for this owner. Check the ID or save a new project with `refsort save`."
            )),

            Self::AuthRequired => Some(
                "Pass --owner <id> or set REFSORT_OWNER to save or open projects.".to_string(),
            ),

            Self::RemoteUnavailable { .. } => Some(
                "Local changes were kept. Run the same command again to retry.".to_string(),
            ),

            Self::SessionBusy { .. } => {
                Some("Wait for the current load to finish, then retry.".to_string())
            }

            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
