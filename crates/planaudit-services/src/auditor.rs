//! Query log auditor
//!
//! Checks every entry of a query log against the reference database, in log
//! order, and writes a report block for each entry whose plan contains a
//! full scan.

use crate::report::write_report;
use planaudit_analyzer::parse_plan_rows;
use planaudit_core::{ErrorPolicy, LogEntry, Result, parse_log};
use planaudit_driver_sqlite::{PlanCheck, ReferenceDatabase};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

/// Totals for one audit run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Log entries checked against the reference database
    pub entries: usize,
    /// Entries whose plan contains a full scan
    pub flagged: usize,
    /// Entries skipped because of an error (only with `ErrorPolicy::Continue`)
    pub skipped: usize,
    /// Executions of flagged queries per sequentially scanned table
    pub scanned_tables: BTreeMap<String, u64>,
}

impl AuditSummary {
    /// Returns scanned tables, most executed first
    pub fn hottest_tables(&self) -> Vec<(&str, u64)> {
        let mut tables: Vec<_> = self
            .scanned_tables
            .iter()
            .map(|(table, executions)| (table.as_str(), *executions))
            .collect();
        tables.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tables
    }

    fn record_scans(&mut self, entry: &LogEntry, check: &PlanCheck) {
        let rows = check
            .rows
            .iter()
            .map(|row| (row.id, row.parent, row.detail.as_str()));

        match parse_plan_rows(rows) {
            Ok(plan) => {
                let tables = plan.scanned_tables();
                tracing::info!(
                    line = entry.line_number,
                    executions = entry.execution_count,
                    tables = ?tables,
                    "full scan detected"
                );
                for table in tables {
                    *self.scanned_tables.entry(table).or_default() += entry.execution_count;
                }
            }
            Err(e) => {
                tracing::warn!(line = entry.line_number, error = %e, "could not attribute scan to a table");
            }
        }
    }
}

/// Runs query logs through a reference database
pub struct Auditor {
    db: ReferenceDatabase,
    policy: ErrorPolicy,
}

impl Auditor {
    /// Creates an auditor that aborts on the first error
    pub fn new(db: ReferenceDatabase) -> Self {
        Self {
            db,
            policy: ErrorPolicy::default(),
        }
    }

    /// Sets what happens when an entry cannot be checked
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Audits every entry of `log_text`, writing report blocks to `out`
    ///
    /// Blocks are written as entries are checked, so an aborted run keeps
    /// whatever was reported before the failing entry.
    #[tracing::instrument(skip_all, fields(policy = self.policy.as_str()))]
    pub fn run<W: Write>(&self, log_text: &str, out: &mut W) -> Result<AuditSummary> {
        let mut summary = AuditSummary::default();

        for item in parse_log(log_text) {
            let outcome = item.and_then(|entry| self.audit_entry(&entry, out, &mut summary));

            match outcome {
                Ok(()) => {}
                Err(e) if self.policy == ErrorPolicy::Continue && e.is_per_entry() => {
                    tracing::error!(error = %e, "skipping log entry");
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            entries = summary.entries,
            flagged = summary.flagged,
            skipped = summary.skipped,
            "audit complete"
        );
        for (table, executions) in summary.hottest_tables() {
            tracing::info!(table, executions, "full scans by table");
        }

        Ok(summary)
    }

    fn audit_entry<W: Write>(
        &self,
        entry: &LogEntry,
        out: &mut W,
        summary: &mut AuditSummary,
    ) -> Result<()> {
        let check = self.db.check(&entry.query_text)?;
        summary.entries += 1;

        if check.has_full_scan {
            write_report(out, entry, &check.rows)?;
            summary.flagged += 1;
            summary.record_scans(entry, &check);
        }

        Ok(())
    }
}
