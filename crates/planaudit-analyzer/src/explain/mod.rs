//! Query EXPLAIN Parser Module
//!
//! # Example
//!
//! ```
//! use planaudit_analyzer::explain::{parse_plan_rows, NodeType};
//!
//! let plan = parse_plan_rows([(2, 0, "SCAN messages")]).unwrap();
//! assert_eq!(plan.root.node_type, NodeType::SeqScan);
//! ```

pub mod plan;
pub mod sqlite;

pub use plan::{JoinType, NodeType, PlanNode, PlanNodeIterator, QueryPlan};
pub use sqlite::{SqliteExplainError, parse_detail, parse_plan_rows};
