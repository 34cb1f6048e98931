//! Query log parser
//!
//! Parses the query log written by the application's statement
//! instrumentation. Each non-blank line has the shape:
//!
//! ```text
//! Query: SELECT * FROM messages WHERE session_id = ? was executed 42 times
//! ```
//!
//! # Examples
//!
//! ```
//! use planaudit_core::log_entry::parse_log;
//!
//! let log = "Query: SELECT 1 was executed 3 times\n\n";
//! let entries: Vec<_> = parse_log(log).collect::<Result<_, _>>().unwrap();
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].execution_count, 3);
//! ```

use crate::error::{AuditError, MalformedReason, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const PREFIX: &str = "Query: ";
const SUFFIX: &str = "times";
const SEPARATOR: &str = " was executed ";

/// One parsed line of the query log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 1-based line number in the log file
    pub line_number: usize,
    /// SQL text as the application executed it
    pub query_text: String,
    /// How often the application executed this query
    pub execution_count: u64,
}

impl LogEntry {
    /// Creates a new entry
    pub fn new(line_number: usize, query_text: impl Into<String>, execution_count: u64) -> Self {
        Self {
            line_number,
            query_text: query_text.into(),
            execution_count,
        }
    }
}

/// Reads a query log from disk
pub fn read_log(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(AuditError::MissingInput(path.to_path_buf()));
    }

    let text = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "read query log");
    Ok(text)
}

/// Parses every non-blank line of a query log, lazily and in order
pub fn parse_log(text: &str) -> impl Iterator<Item = Result<LogEntry>> + '_ {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_line(index + 1, line))
}

/// Parses a single log line
///
/// `times` is stripped together with the one character in front of it,
/// whatever that is, so `... was executed 42 times` leaves `42` as the count
/// text and `... was executed 42times` loses the count's last digit.
pub fn parse_line(line_number: usize, line: &str) -> Result<LogEntry> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let malformed = |reason| AuditError::MalformedLine {
        line_number,
        line: line.to_string(),
        reason,
    };

    let rest = line
        .strip_prefix(PREFIX)
        .ok_or_else(|| malformed(MalformedReason::MissingPrefix))?;
    let rest = rest
        .strip_suffix(SUFFIX)
        .ok_or_else(|| malformed(MalformedReason::MissingSuffix))?;
    let mut chars = rest.chars();
    chars.next_back();
    let rest = chars.as_str();

    let parts: Vec<&str> = rest.split(SEPARATOR).collect();
    let [query_text, count_text] = parts[..] else {
        return Err(malformed(MalformedReason::SeparatorCount(parts.len())));
    };

    let execution_count = count_text
        .trim()
        .parse::<u64>()
        .map_err(|_| malformed(MalformedReason::InvalidCount(count_text.to_string())))?;

    tracing::trace!(line_number, execution_count, "parsed log line");
    Ok(LogEntry::new(line_number, query_text, execution_count))
}
