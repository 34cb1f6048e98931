//! Test fixtures for end-to-end audit runs.
//!
//! A [`TestWorkspace`] is a temporary directory holding a `test.db` with a
//! messaging-app schema and, optionally, a `queries.log`. It is removed when
//! dropped.
//!
//! # Usage
//!
//! ```rust,ignore
//! use planaudit_driver_tests::fixtures::TestWorkspace;
//!
//! let workspace = TestWorkspace::new()?;
//! workspace.write_log(&[("SELECT * FROM messages WHERE session_id = ?", 42)])?;
//! let (summary, report) = workspace.audit(&workspace.config())?;
//! ```

use anyhow::{Context, Result};
use planaudit_core::{AuditConfig, read_log};
use planaudit_driver_sqlite::ReferenceDatabase;
use planaudit_services::{AuditSummary, Auditor};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Reference schema used by every end-to-end test.
///
/// `messages.session_id` is deliberately left without an index.
pub const SCHEMA: &str = "
    CREATE TABLE recipients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        e164 VARCHAR(25) UNIQUE,
        uuid VARCHAR(36) UNIQUE,
        profile_joined_name TEXT,
        is_blocked BOOLEAN NOT NULL DEFAULT 0
    );

    CREATE TABLE sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        direct_message_recipient_id INTEGER REFERENCES recipients(id),
        is_archived BOOLEAN NOT NULL DEFAULT 0,
        is_pinned BOOLEAN NOT NULL DEFAULT 0
    );

    CREATE TABLE messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id INTEGER NOT NULL REFERENCES sessions(id),
        sender_recipient_id INTEGER REFERENCES recipients(id),
        server_timestamp TIMESTAMP NOT NULL,
        is_read BOOLEAN NOT NULL DEFAULT 0,
        text TEXT
    );
    CREATE INDEX message_server_timestamp ON messages(server_timestamp);

    CREATE TABLE attachments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        message_id INTEGER NOT NULL REFERENCES messages(id),
        content_type TEXT NOT NULL
    );
    CREATE INDEX attachment_message ON attachments(message_id);

    CREATE TABLE reactions (
        reaction_id INTEGER PRIMARY KEY AUTOINCREMENT,
        message_id INTEGER NOT NULL REFERENCES messages(id),
        author INTEGER NOT NULL REFERENCES recipients(id),
        emoji TEXT NOT NULL
    );
";

/// Initialize logging for tests if not already initialized
pub fn initialize_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Formats one query log line the way the application writes it
pub fn log_line(query: &str, count: u64) -> String {
    format!("Query: {} was executed {} times", query, count)
}

/// Temporary directory with a reference database and a query log
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Creates the directory and a `test.db` with [`SCHEMA`]
    pub fn new() -> Result<Self> {
        initialize_logging();

        let dir = tempfile::tempdir().context("Failed to create temp dir")?;
        let workspace = Self { dir };

        let conn = rusqlite::Connection::open(workspace.database_path())
            .context("Failed to create test.db")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to apply test schema")?;

        Ok(workspace)
    }

    /// Directory root
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the reference database
    pub fn database_path(&self) -> PathBuf {
        self.path().join("test.db")
    }

    /// Path of the query log
    pub fn log_path(&self) -> PathBuf {
        self.path().join("queries.log")
    }

    /// Writes `queries.log` from `(query, count)` pairs
    pub fn write_log(&self, entries: &[(&str, u64)]) -> Result<()> {
        let text: String = entries
            .iter()
            .map(|(query, count)| log_line(query, *count) + "\n")
            .collect();
        self.write_raw_log(&text)
    }

    /// Writes `queries.log` verbatim
    pub fn write_raw_log(&self, text: &str) -> Result<()> {
        std::fs::write(self.log_path(), text).context("Failed to write queries.log")
    }

    /// Config pointing at this workspace's files
    pub fn config(&self) -> AuditConfig {
        AuditConfig::new()
            .with_log_path(self.log_path())
            .with_database_path(self.database_path())
    }

    /// Runs a full audit as the binary does and returns the summary and report
    pub fn audit(&self, config: &AuditConfig) -> planaudit_core::Result<(AuditSummary, String)> {
        let log_text = read_log(&config.log_path)?;
        let db = ReferenceDatabase::from_config(config)?;
        let auditor = Auditor::new(db).with_error_policy(config.error_policy);

        let mut out = Vec::new();
        let summary = auditor.run(&log_text, &mut out)?;
        Ok((summary, String::from_utf8_lossy(&out).into_owned()))
    }
}
