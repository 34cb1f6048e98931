//! planaudit services
//!
//! Runs a query log through the reference database and writes the
//! full-scan report.

pub mod auditor;
pub mod report;

pub use auditor::{AuditSummary, Auditor};
pub use report::write_report;
