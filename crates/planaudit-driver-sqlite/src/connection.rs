//! SQLite reference database connection

use crate::plan_row::{PlanCheck, PlanRow};
use planaudit_core::{AuditConfig, AuditError, Result, dummy_bindings};
use rusqlite::{Connection as RusqliteConnection, OpenFlags, params_from_iter};
use std::path::{Path, PathBuf};

/// Read-only connection to a database whose schema matches the application's.
///
/// Queries are never executed here, only explained.
pub struct ReferenceDatabase {
    conn: RusqliteConnection,
    path: Option<PathBuf>,
}

impl ReferenceDatabase {
    /// Open an existing SQLite database file read-only
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening reference database");

        // A read-only open never creates the file, but the error for a
        // missing file is less helpful than this one
        if !path.is_file() {
            return Err(AuditError::MissingInput(path.to_path_buf()));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = RusqliteConnection::open_with_flags(path, flags).map_err(|e| {
            AuditError::Connection(format!(
                "Failed to open SQLite database at '{}': {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(path = %path.display(), "reference database connection established");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Build an in-memory reference database from a schema script
    ///
    /// The script is typically a `.schema` dump of the application database.
    pub fn from_schema(schema_sql: &str) -> Result<Self> {
        tracing::info!("building in-memory reference database from schema");
        let conn = RusqliteConnection::open_in_memory().map_err(|e| {
            AuditError::Connection(format!("Failed to open in-memory database: {}", e))
        })?;

        conn.execute_batch(schema_sql)
            .map_err(|e| AuditError::Connection(format!("Failed to apply schema: {}", e)))?;

        Ok(Self { conn, path: None })
    }

    /// Open the reference database an audit run is configured for
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        match &config.schema_path {
            Some(schema_path) => {
                if !schema_path.is_file() {
                    return Err(AuditError::MissingInput(schema_path.clone()));
                }
                let schema_sql = std::fs::read_to_string(schema_path)?;
                Self::from_schema(&schema_sql)
            }
            None => Self::open(&config.database_path),
        }
    }

    /// Path of the database file, `None` for a schema-built database
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the plan SQLite would use for `query` with the given bindings
    pub fn explain(&self, query: &str, bindings: &[i64]) -> Result<Vec<PlanRow>> {
        tracing::debug!(placeholders = bindings.len(), "explaining query");
        let sql = format!("EXPLAIN QUERY PLAN {}", query);

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| AuditError::database(query, e))?;

        let rows = stmt
            .query_map(params_from_iter(bindings.iter()), |row| {
                Ok(PlanRow {
                    id: row.get(0)?,
                    parent: row.get(1)?,
                    notused: row.get(2)?,
                    detail: row.get(3)?,
                })
            })
            .map_err(|e| AuditError::database(query, e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AuditError::database(query, e))?;

        Ok(rows)
    }

    /// Explains `query` with one dummy binding per placeholder and looks for full scans
    pub fn check(&self, query: &str) -> Result<PlanCheck> {
        let bindings = dummy_bindings(query);
        let rows = self.explain(query, &bindings)?;
        let check = PlanCheck::new(rows);

        tracing::debug!(
            rows = check.rows.len(),
            has_full_scan = check.has_full_scan,
            "query checked"
        );
        Ok(check)
    }
}

#[cfg(test)]
mod tests;
