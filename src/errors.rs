//! Unified error type for the rental ledger core.
//!
//! Store-level failures inside a multi-statement mutation are collapsed into
//! [`Error::TransactionFailed`] so callers only ever see a human-readable summary.

use crate::entities::user::Role;
use sea_orm::DbErr;
use std::fmt;
use thiserror::Error;

/// A single violated field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending input field
    pub field: &'static str,
    /// What is wrong with it
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every error the core can report to its caller.
#[derive(Debug, Error)]
pub enum Error {
    /// The entity does not exist or is not owned by the caller.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of row that was looked up
        entity: &'static str,
        /// Id the caller asked for
        id: i64,
    },

    /// One or more field rules were violated; all of them are listed.
    #[error("Validation failed: {}", join_violations(.errors))]
    ValidationFailed {
        /// Every violated rule, in check order
        errors: Vec<ValidationError>,
    },

    /// The request is well-formed but conflicts with the current state.
    #[error("Conflict: {message}")]
    ConflictRejected {
        /// Which state the request collided with
        message: String,
    },

    /// The caller's role may not perform writes.
    #[error("Permission denied for role {role:?}")]
    PermissionDenied {
        /// Role of the rejected caller
        role: Role,
    },

    /// A multi-statement mutation failed and was rolled back.
    #[error("Transaction failed: {summary}")]
    TransactionFailed {
        /// Operation that was rolled back, without store detail
        summary: String,
    },

    /// Settings could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the settings
        message: String,
    },

    /// A store error outside a multi-statement mutation.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// A filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::ConflictRejected {
            message: message.into(),
        }
    }

    /// Wraps a store error raised while `summary` was in progress.
    ///
    /// The store detail is logged here and never leaves the crate.
    pub(crate) fn transaction(summary: &str, err: &DbErr) -> Self {
        tracing::error!(error = %err, "{summary} failed, rolling back");
        Self::TransactionFailed {
            summary: format!("{summary} failed; no changes were made"),
        }
    }
}

fn join_violations(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// Convenience `Result` type
/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

/// Attaches a [`Error::TransactionFailed`] summary to raw store results.
pub(crate) trait TxnContext<T> {
    fn in_txn(self, summary: &str) -> Result<T>;
}

impl<T> TxnContext<T> for std::result::Result<T, DbErr> {
    fn in_txn(self, summary: &str) -> Result<T> {
        self.map_err(|e| Error::transaction(summary, &e))
    }
}
