//! Audit run configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default query log, relative to the working directory
pub const DEFAULT_LOG_PATH: &str = "queries.log";

/// Default reference database, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "test.db";

/// What to do when a single log entry cannot be checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the run at the first malformed line or database error
    #[default]
    Abort,
    /// Log the error, skip the entry and keep going
    Continue,
}

impl ErrorPolicy {
    /// Returns the policy as a display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Continue => "continue",
        }
    }
}

/// Configuration for one audit run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Query log to read
    pub log_path: PathBuf,
    /// Reference database to explain queries against
    pub database_path: PathBuf,
    /// Schema script to build an in-memory reference database from, used
    /// instead of `database_path` when set
    pub schema_path: Option<PathBuf>,
    /// Per-entry error handling
    pub error_policy: ErrorPolicy,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            schema_path: None,
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl AuditConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query log path
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Sets the reference database path
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Builds the reference database from a schema script instead of a file
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// Sets the error policy
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}
