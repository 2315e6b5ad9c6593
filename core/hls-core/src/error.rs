//! Error types for hls-core operations.
//!
//! `HlsError::kind` maps every variant onto the four failure classes the
//! control surface distinguishes: configuration load, configuration save,
//! illegal lifecycle operation, and element validation.

use std::path::PathBuf;

use crate::lifecycle::{LifecycleState, Operation};

// ═══════════════════════════════════════════════════════════════════════════════
// Element Validation
// ═══════════════════════════════════════════════════════════════════════════════

/// Raised by a configuration element when a settings value falls outside the
/// domain it accepts. The element is left exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid value for {element}.{field}: {reason}")]
pub struct ValidationError {
    pub element: String,
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(
        element: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            element: element.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Crate Error
// ═══════════════════════════════════════════════════════════════════════════════

/// Failure classes surfaced to the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigLoad,
    ConfigSave,
    InvalidOperation,
    Validation,
    Registry,
    Worker,
}

/// All errors that can occur in hls-core operations.
#[derive(Debug, thiserror::Error)]
pub enum HlsError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Load Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration file unreadable: {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Configuration file rejected: {path}: {source}")]
    ConfigRejected {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Configuration Save Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration directory not found: {0}")]
    ConfigDirNotFound(String),

    #[error("Configuration write failed: {path}: {source}")]
    ConfigWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration serialization failed: {0}")]
    ConfigSerialize(#[source] serde_json::Error),

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Cannot {operation} while {state}")]
    InvalidOperation {
        operation: Operation,
        state: LifecycleState,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Element Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Configuration element already registered: {0}")]
    DuplicateElement(String),

    #[error("Configuration element not registered: {0}")]
    UnknownElement(String),

    // ─────────────────────────────────────────────────────────────────────
    // Worker Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Worker parameters unavailable: {element}: {details}")]
    Parameters { element: String, details: String },

    #[error("Worker construction failed: {0}")]
    WorkerBuild(String),

    #[error("Worker failed to start: {0}")]
    WorkerStart(String),
}

impl HlsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HlsError::ConfigRead { .. }
            | HlsError::ConfigMalformed { .. }
            | HlsError::ConfigRejected { .. } => ErrorKind::ConfigLoad,
            HlsError::ConfigDirNotFound(_)
            | HlsError::ConfigWriteFailed { .. }
            | HlsError::ConfigSerialize(_) => ErrorKind::ConfigSave,
            HlsError::InvalidOperation { .. } => ErrorKind::InvalidOperation,
            HlsError::Validation(_) => ErrorKind::Validation,
            HlsError::DuplicateElement(_) | HlsError::UnknownElement(_) => ErrorKind::Registry,
            HlsError::Parameters { .. } | HlsError::WorkerBuild(_) | HlsError::WorkerStart(_) => {
                ErrorKind::Worker
            }
        }
    }

    /// Persistence failures are shown as warnings and never stop the process.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::ConfigLoad | ErrorKind::ConfigSave)
    }
}

/// Convenience type alias for Results using HlsError.
pub type Result<T> = std::result::Result<T, HlsError>;
