//! SQLite reference database driver

mod connection;
mod plan_row;

pub use connection::ReferenceDatabase;
pub use plan_row::{FULL_SCAN_MARKER, PlanCheck, PlanRow, format_plan_rows, has_full_scan};
