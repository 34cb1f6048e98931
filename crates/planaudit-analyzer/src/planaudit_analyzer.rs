//! planaudit Analyzer - EXPLAIN QUERY PLAN parsing
//!
//! This crate turns the plan rows SQLite reports for a statement into a
//! plan tree, so full scans can be attributed to the tables they read.

pub mod explain;

pub use explain::*;
