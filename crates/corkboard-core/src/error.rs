use std::fmt;

use crate::auth::AuthorizationError;
use crate::lock::LockError;

/// Machine-readable error codes for scripting and agent-friendly output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    InputParseError,
    IssueNotFound,
    EmptyTitle,
    NoDraft,
    IdCollision,
    PermissionDenied,
    BadSecret,
    Cancelled,
    FetchFailed,
    StorageCorrupt,
    StorageWriteFailed,
    LockContention,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InputParseError => "E1003",
            Self::IssueNotFound => "E2001",
            Self::EmptyTitle => "E2002",
            Self::NoDraft => "E2003",
            Self::IdCollision => "E2004",
            Self::PermissionDenied => "E3001",
            Self::BadSecret => "E3002",
            Self::Cancelled => "E3003",
            Self::FetchFailed => "E4001",
            Self::StorageCorrupt => "E5001",
            Self::StorageWriteFailed => "E5002",
            Self::LockContention => "E5003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Board not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::InputParseError => "Input is not valid JSON",
            Self::IssueNotFound => "Issue not found",
            Self::EmptyTitle => "Title must not be empty",
            Self::NoDraft => "No draft in progress",
            Self::IdCollision => "Issue id already in use",
            Self::PermissionDenied => "Permission denied",
            Self::BadSecret => "Maintainer secret rejected",
            Self::Cancelled => "Operation cancelled",
            Self::FetchFailed => "Remote fetch failed",
            Self::StorageCorrupt => "Stored board data is corrupt",
            Self::StorageWriteFailed => "Board write failed",
            Self::LockContention => "Lock contention",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `cb init` to create a board in this directory."),
            Self::ConfigParseError => Some("Fix syntax in .corkboard/config.toml and retry."),
            Self::InputParseError => Some("Check the payload is a JSON array or an object with an issues/items/bugs array."),
            Self::IssueNotFound | Self::IdCollision => None,
            Self::EmptyTitle => Some("Give the issue a title before saving."),
            Self::NoDraft => Some("Start a draft first."),
            Self::PermissionDenied => {
                Some("Only maintainers may change issues they did not create. Run `cb login`.")
            }
            Self::BadSecret => Some("Check the maintainer secret and try again."),
            Self::Cancelled => Some("Re-run and confirm, or pass --yes."),
            Self::FetchFailed => Some("Check the URL is reachable and returns JSON."),
            Self::StorageCorrupt => {
                Some("Inspect or remove .corkboard/issues.json, then run `cb sync`.")
            }
            Self::StorageWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `cb` process releases its lock."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage-layer failures raised by a [`crate::storage::StoragePort`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error while reading or writing a key.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Lock acquisition failed.
    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    /// A stored value could not be decoded.
    #[error("stored value for '{key}' is corrupt: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Write rejected by the backing store.
    #[error("write to '{key}' rejected: {reason}")]
    Rejected { key: &'static str, reason: String },
}

impl StorageError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Corrupt { .. } => ErrorCode::StorageCorrupt,
            Self::Lock(LockError::Timeout { .. }) => ErrorCode::LockContention,
            Self::Io(_) | Self::Lock(_) | Self::Encode { .. } | Self::Rejected { .. } => {
                ErrorCode::StorageWriteFailed
            }
        }
    }
}

/// Every failure the board core can report.
///
/// All variants are recoverable: the operation that produced one has left
/// the store, the draft and the session exactly as they were.
#[derive(Debug, thiserror::Error)]
pub enum CorkboardError {
    /// External input is not syntactically valid JSON.
    #[error("could not parse input as JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A draft could not be saved or edited.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The caller's role and the issue's provenance do not permit the change.
    #[error("{0}")]
    Authorization(#[from] AuthorizationError),

    /// A remote fetch failed (non-success status or transport failure).
    #[error("fetch from {url} failed: {detail}")]
    Network { url: String, detail: String },

    /// No issue with the given id exists.
    #[error("issue not found: {0}")]
    NotFound(String),

    /// The persistence port failed.
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// A destructive operation was not confirmed.
    #[error("cancelled: {0}")]
    Cancelled(&'static str),

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl CorkboardError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(_) => ErrorCode::InputParseError,
            Self::Validation(err) => err.code(),
            Self::Authorization(err) => err.code(),
            Self::Network { .. } => ErrorCode::FetchFailed,
            Self::NotFound(_) => ErrorCode::IssueNotFound,
            Self::Storage(err) => err.code(),
            Self::Cancelled(_) => ErrorCode::Cancelled,
            Self::Config(_) => ErrorCode::ConfigParseError,
        }
    }

    /// Optional remediation hint for the user.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// Draft workflow validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("no draft in progress")]
    NoDraft,

    #[error("issue id '{0}' is already in use")]
    IdCollision(String),
}

impl ValidationError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyTitle => ErrorCode::EmptyTitle,
            Self::NoDraft => ErrorCode::NoDraft,
            Self::IdCollision(_) => ErrorCode::IdCollision,
        }
    }
}

pub type Result<T, E = CorkboardError> = std::result::Result<T, E>;
