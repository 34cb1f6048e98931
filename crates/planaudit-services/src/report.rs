//! Console report for queries whose plan contains a full scan
//!
//! Each flagged query produces one block:
//!
//! ```text
//! Query with SCAN: SELECT * FROM messages WHERE session_id = ? is executed times: 42
//! 42 [(2, 0, 0, 'SCAN messages')]
//!
//! ```

use planaudit_core::LogEntry;
use planaudit_driver_sqlite::{PlanRow, format_plan_rows};
use std::io::{self, Write};

/// Writes the report block for one flagged entry
pub fn write_report<W: Write>(out: &mut W, entry: &LogEntry, rows: &[PlanRow]) -> io::Result<()> {
    writeln!(
        out,
        "Query with SCAN: {} is executed times: {}",
        entry.query_text, entry.execution_count
    )?;
    writeln!(out, "{} {}", entry.execution_count, format_plan_rows(rows))?;
    writeln!(out)
}

#[cfg(test)]
mod tests;
