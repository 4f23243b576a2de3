// AxeProfiler - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; all errors keep the causal chain
// for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all AxeProfiler operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum AxeProfilerError {
    /// Profile data failed validation at creation or load time.
    Validation(ValidationError),

    /// Profile persistence failed.
    Store(StoreError),

    /// Device transport failed.
    Transport(TransportError),
}

impl fmt::Display for AxeProfilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "Validation error: {e}"),
            Self::Store(e) => write!(f, "Store error: {e}"),
            Self::Transport(e) => write!(f, "Transport error: {e}"),
        }
    }
}

impl std::error::Error for AxeProfilerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Transport(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Errors raised by profile validate-and-construct.
///
/// Validation is whole-or-nothing: the first failing field aborts
/// construction and no partial profile is ever produced.
#[derive(Debug)]
pub enum ValidationError {
    /// A required field is missing (or present but empty).
    MissingField { field: &'static str },

    /// A field is present but has the wrong JSON type.
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    /// The profile name cannot be used as a storage key.
    InvalidName { name: String, reason: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => {
                write!(f, "Missing required field '{field}'")
            }
            Self::WrongType { field, expected } => {
                write!(f, "Field '{field}' has the wrong type, expected {expected}")
            }
            Self::InvalidName { name, reason } => {
                write!(f, "Profile name '{name}' is not usable: {reason}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for AxeProfilerError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// Errors raised by the profile store.
#[derive(Debug)]
pub enum StoreError {
    /// No persisted record exists under the given name.
    NotFound { name: String },

    /// The record exists but is not parseable JSON.
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The record exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// The record parsed but failed profile validation.
    Validation {
        name: String,
        source: ValidationError,
    },

    /// The profile could not be serialised for writing.
    Serialize {
        name: String,
        source: serde_json::Error,
    },

    /// I/O failure during save/delete/list. The in-memory profile may
    /// already reflect the attempted change; callers must treat it as
    /// mutated but not durable.
    Persistence {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl StoreError {
    /// True when the error means the referenced record simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name } => {
                write!(f, "No saved profile named '{name}'")
            }
            Self::Corrupt { path, source } => {
                write!(
                    f,
                    "Profile record '{}' is not valid JSON: {source}",
                    path.display()
                )
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Profile record '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::Validation { name, source } => {
                write!(f, "Profile '{name}' failed validation: {source}")
            }
            Self::Serialize { name, source } => {
                write!(f, "Could not serialise profile '{name}': {source}")
            }
            Self::Persistence {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Corrupt { source, .. } => Some(source),
            Self::Validation { source, .. } => Some(source),
            Self::Serialize { source, .. } => Some(source),
            Self::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StoreError> for AxeProfilerError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Errors raised at the device transport boundary.
///
/// These are expected, recoverable failures: the session controller
/// reports them and returns to the menu, never terminating the process.
#[derive(Debug)]
pub enum TransportError {
    /// The device could not be reached (DNS, refused, reset, TLS, ...).
    Connection {
        address: String,
        source: Box<ureq::Error>,
    },

    /// The request timed out.
    Timeout { address: String },

    /// The device answered with a non-success HTTP status.
    Http { address: String, status: u16 },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection { address, source } => {
                write!(f, "Could not connect to '{address}': {source}")
            }
            Self::Timeout { address } => {
                write!(f, "Request to '{address}' timed out")
            }
            Self::Http { address, status } => {
                write!(f, "Device at '{address}' answered HTTP {status}")
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connection { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<TransportError> for AxeProfilerError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

/// Convenience type alias for AxeProfiler results.
pub type Result<T> = std::result::Result<T, AxeProfilerError>;

// =============================================================================
// Tests
// =============================================================================
