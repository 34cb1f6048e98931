//! planaudit core - shared types for auditing logged queries
//!
//! This crate provides:
//! - The query log format (`Query: <sql> was executed <n> times`) and its parser
//! - Dummy placeholder bindings used to prepare logged statements
//! - The error type shared by every planaudit crate

pub mod bindings;
pub mod config;
pub mod error;
pub mod log_entry;

pub use bindings::{dummy_bindings, placeholder_count};
pub use config::{AuditConfig, ErrorPolicy};
pub use error::{AuditError, MalformedReason, Result};
pub use log_entry::{LogEntry, parse_line, parse_log, read_log};
