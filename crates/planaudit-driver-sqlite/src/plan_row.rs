//! Plan rows returned by `EXPLAIN QUERY PLAN`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Substring of a plan row's detail that marks a full scan. Case-sensitive.
pub const FULL_SCAN_MARKER: &str = "SCAN";

/// One row of SQLite's `EXPLAIN QUERY PLAN` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRow {
    pub id: i64,
    /// `id` of the parent row, `0` for top-level steps
    pub parent: i64,
    pub notused: i64,
    /// Human-readable step description, e.g. `SCAN messages`
    pub detail: String,
}

impl PlanRow {
    pub fn new(id: i64, parent: i64, notused: i64, detail: impl Into<String>) -> Self {
        Self {
            id,
            parent,
            notused,
            detail: detail.into(),
        }
    }

    /// Returns true if this step reads a table without an index lookup
    pub fn is_full_scan(&self) -> bool {
        self.detail.contains(FULL_SCAN_MARKER)
    }
}

/// Formats as a tuple: `(2, 0, 0, 'SCAN messages')`
impl fmt::Display for PlanRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, ", self.id, self.parent, self.notused)?;
        write_quoted(f, &self.detail)?;
        write!(f, ")")
    }
}

/// Writes `text` as a quoted string literal, the way Python's `repr` does
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    write!(f, "{}", quote)?;
    for c in text.chars() {
        match c {
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            c if c == quote => write!(f, "\\{}", c)?,
            c if c.is_control() || (c.is_whitespace() && c != ' ') => {
                let code = u32::from(c);
                if code < 0x100 {
                    write!(f, "\\x{:02x}", code)?;
                } else if code < 0x10000 {
                    write!(f, "\\u{:04x}", code)?;
                } else {
                    write!(f, "\\U{:08x}", code)?;
                }
            }
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "{}", quote)
}

/// Formats plan rows as a bracketed list: `[(2, 0, 0, 'SCAN messages')]`
pub fn format_plan_rows(rows: &[PlanRow]) -> String {
    let rows: Vec<String> = rows.iter().map(PlanRow::to_string).collect();
    format!("[{}]", rows.join(", "))
}

/// Returns true if any row's detail contains `SCAN`
pub fn has_full_scan(rows: &[PlanRow]) -> bool {
    rows.iter().any(PlanRow::is_full_scan)
}

/// Outcome of checking one query against the reference database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCheck {
    /// Every plan row, in the order SQLite returned them
    pub rows: Vec<PlanRow>,
    pub has_full_scan: bool,
}

impl PlanCheck {
    pub fn new(rows: Vec<PlanRow>) -> Self {
        let has_full_scan = has_full_scan(&rows);
        Self {
            rows,
            has_full_scan,
        }
    }
}
