//! Error types for planaudit

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed driver error, kept opaque so this crate does not depend on a driver
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error type for planaudit operations
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Malformed log line {line_number} ({reason}): {line}")]
    MalformedLine {
        line_number: usize,
        line: String,
        reason: MalformedReason,
    },

    #[error("Database error for query `{query}`: {source}")]
    Database {
        query: String,
        #[source]
        source: DriverError,
    },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    /// Builds a database error from any driver error
    pub fn database(
        query: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Database {
            query: query.into(),
            source: Box::new(source),
        }
    }

    /// Returns true if the log itself was malformed
    pub fn is_malformed_line(&self) -> bool {
        matches!(self, Self::MalformedLine { .. })
    }

    /// Returns true if the reference database rejected a query
    pub fn is_database(&self) -> bool {
        matches!(self, Self::Database { .. })
    }

    /// Returns true if this error concerns a single log entry.
    ///
    /// Only these can be skipped when the run continues past errors.
    pub fn is_per_entry(&self) -> bool {
        self.is_malformed_line() || self.is_database()
    }
}

/// Why a log line did not match `Query: <sql> was executed <n> times`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// Line does not start with `Query: `
    MissingPrefix,
    /// Line does not end with `times`
    MissingSuffix,
    /// Splitting on ` was executed ` gave this many parts instead of two
    SeparatorCount(usize),
    /// The execution count is not a non-negative integer
    InvalidCount(String),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrefix => write!(f, "missing `Query: ` prefix"),
            Self::MissingSuffix => write!(f, "missing `times` suffix"),
            Self::SeparatorCount(parts) => write!(
                f,
                "expected one ` was executed ` separator, found {}",
                parts.saturating_sub(1)
            ),
            Self::InvalidCount(count) => write!(f, "invalid execution count `{}`", count),
        }
    }
}

/// Result type alias for planaudit operations
pub type Result<T> = std::result::Result<T, AuditError>;
