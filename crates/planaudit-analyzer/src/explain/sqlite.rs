//! SQLite EXPLAIN QUERY PLAN Parser
//!
//! Builds a [`QueryPlan`] from the rows SQLite returns for
//! `EXPLAIN QUERY PLAN <stmt>`. Each row carries `id`, `parent`, `notused`
//! and `detail`; `parent` refers to the `id` of an earlier row, or is `0`
//! for a top-level step.
//!
//! ```text
//! id | parent | notused | detail
//!  2 |      0 |       0 | SCAN sessions
//!  5 |      0 |       0 | SEARCH messages USING INDEX message_session_id (session_id=?)
//!  9 |      0 |       0 | USE TEMP B-TREE FOR ORDER BY
//! ```
//!
//! # Examples
//!
//! ```
//! use planaudit_analyzer::explain::sqlite::parse_plan_rows;
//!
//! let plan = parse_plan_rows([
//!     (2, 0, "SCAN sessions"),
//!     (5, 0, "SEARCH messages USING INDEX message_session_id (session_id=?)"),
//! ])
//! .unwrap();
//! assert_eq!(plan.scanned_tables(), vec!["sessions"]);
//! ```

use crate::explain::plan::{JoinType, NodeType, PlanNode, QueryPlan};
use thiserror::Error;

/// Errors that can occur when parsing SQLite EXPLAIN QUERY PLAN output
#[derive(Debug, Error)]
pub enum SqliteExplainError {
    #[error("Empty EXPLAIN output")]
    EmptyOutput,

    #[error("Invalid plan structure: {0}")]
    InvalidStructure(String),
}

/// Result type for SQLite EXPLAIN parsing
pub type Result<T> = std::result::Result<T, SqliteExplainError>;

/// Parses `(id, parent, detail)` plan rows into a plan tree
///
/// Rows must come in the order SQLite returns them: a parent row always
/// precedes its children. Multiple top-level rows are wrapped in an
/// `Append` node.
pub fn parse_plan_rows<'a, I>(rows: I) -> Result<QueryPlan>
where
    I: IntoIterator<Item = (i64, i64, &'a str)>,
{
    let mut pending: Vec<(i64, i64, PlanNode)> = rows
        .into_iter()
        .map(|(id, parent, detail)| {
            let mut node = parse_detail(detail);
            node.id = Some(id);
            (id, parent, node)
        })
        .collect();

    if pending.is_empty() {
        return Err(SqliteExplainError::EmptyOutput);
    }

    // Attach from the back so every child finds its (earlier) parent still pending
    let mut roots: Vec<PlanNode> = Vec::new();
    while let Some((id, parent, node)) = pending.pop() {
        if parent == 0 {
            roots.push(node);
            continue;
        }

        let Some((_, _, parent_node)) = pending.iter_mut().rev().find(|(pid, _, _)| *pid == parent)
        else {
            return Err(SqliteExplainError::InvalidStructure(format!(
                "row {} refers to unknown parent {}",
                id, parent
            )));
        };
        parent_node.children.insert(0, node);
    }
    roots.reverse();

    let root = if roots.len() == 1 {
        roots.remove(0)
    } else {
        let mut append = PlanNode::new(NodeType::Append);
        append.children = roots;
        append
    };

    Ok(QueryPlan::new(root))
}

/// Parses a detail string into a PlanNode
pub fn parse_detail(detail: &str) -> PlanNode {
    let detail = detail.trim();
    let detail_upper = detail.to_ascii_uppercase();

    if detail_upper.starts_with("SCAN") {
        parse_scan_operation(detail)
    } else if detail_upper.starts_with("SEARCH") {
        parse_search_operation(detail)
    } else if detail_upper.starts_with("USE TEMP B-TREE")
        || detail_upper.starts_with("USING TEMP B-TREE")
    {
        parse_temp_btree_operation(detail)
    } else if detail_upper.starts_with("COMPOUND QUERY") || detail_upper.starts_with("COMPOUND SUBQUERIES")
    {
        described(NodeType::SetOp, detail)
    } else if detail_upper.starts_with("LIST SUBQUERY") {
        let mut node = described(NodeType::SubqueryScan, detail);
        node.extra
            .insert("list_subquery".to_string(), serde_json::Value::Bool(true));
        node
    } else if detail_upper.starts_with("CORRELATED") || detail_upper.starts_with("SCALAR SUBQUERY")
    {
        parse_subquery_operation(detail)
    } else if detail_upper.starts_with("CO-ROUTINE") {
        parse_coroutine_operation(detail)
    } else if detail_upper.starts_with("MATERIALIZE") {
        parse_materialize_operation(detail)
    } else if detail_upper.starts_with("UNION ALL") {
        described(NodeType::Append, detail)
    } else if detail_upper.starts_with("UNION")
        || detail_upper.starts_with("INTERSECT")
        || detail_upper.starts_with("EXCEPT")
    {
        described(NodeType::SetOp, detail)
    } else if detail_upper.starts_with("MERGE") {
        described(NodeType::MergeAppend, detail)
    } else if detail_upper.starts_with("LEFT") || detail_upper.starts_with("RIGHT") {
        parse_join_operation(detail)
    } else if detail_upper.starts_with("BLOOM FILTER") {
        let mut node = described(NodeType::Hash, detail);
        node.extra
            .insert("bloom_filter".to_string(), serde_json::Value::Bool(true));
        node
    } else {
        described(NodeType::Unknown, detail)
    }
}

fn described(node_type: NodeType, detail: &str) -> PlanNode {
    let mut node = PlanNode::new(node_type);
    node.description = Some(detail.to_string());
    node
}

/// Parses SCAN operation
/// Examples:
/// - SCAN sessions
/// - SCAN TABLE sessions (SQLite < 3.36)
/// - SCAN messages USING COVERING INDEX message_session_id
/// - SCAN CONSTANT ROW
fn parse_scan_operation(detail: &str) -> PlanNode {
    let mut node = described(NodeType::SeqScan, detail);
    let detail_upper = detail.to_ascii_uppercase();

    if detail_upper.contains("USING COVERING INDEX") {
        node.node_type = NodeType::IndexOnlyScan;
        node.index_name = extract_index_name(detail, "COVERING INDEX");
    } else if detail_upper.contains("USING INDEX") {
        node.node_type = NodeType::IndexScan;
        node.index_name = extract_index_name(detail, "INDEX");
    }

    node.relation = extract_table_name(detail, "SCAN");

    if detail_upper.contains("CONSTANT ROW") {
        node.node_type = NodeType::ValuesScan;
    } else if detail_upper.contains("SUBQUERY") {
        node.node_type = NodeType::SubqueryScan;
    }

    node
}

/// Parses SEARCH operation (index lookup)
/// Examples:
/// - SEARCH messages USING INDEX message_session_id (session_id=?)
/// - SEARCH reactions USING COVERING INDEX reaction_message (message_id=?)
/// - SEARCH sessions USING INTEGER PRIMARY KEY (rowid=?)
/// - SEARCH messages USING AUTOMATIC COVERING INDEX (session_id=?)
fn parse_search_operation(detail: &str) -> PlanNode {
    let mut node = described(NodeType::IndexScan, detail);
    let detail_upper = detail.to_ascii_uppercase();

    if detail_upper.contains("AUTOMATIC") || detail_upper.contains("AUTO-INDEX") {
        node.node_type = NodeType::IndexOnlyScan;
        node.index_name = Some("AUTO-INDEX".to_string());
        node.extra
            .insert("auto_index".to_string(), serde_json::Value::Bool(true));
    } else if detail_upper.contains("USING COVERING INDEX") {
        node.node_type = NodeType::IndexOnlyScan;
        node.index_name = extract_index_name(detail, "COVERING INDEX");
    } else if detail_upper.contains("USING INDEX") {
        node.index_name = extract_index_name(detail, "INDEX");
    } else if detail_upper.contains("PRIMARY KEY") || detail_upper.contains("ROWID") {
        node.index_name = Some("PRIMARY KEY".to_string());
    }

    node.relation = extract_table_name(detail, "SEARCH");
    node.index_cond = extract_index_condition(detail);

    node
}

/// Parses USE TEMP B-TREE operations
fn parse_temp_btree_operation(detail: &str) -> PlanNode {
    let detail_upper = detail.to_ascii_uppercase();

    let node_type = if detail_upper.contains("DISTINCT") {
        NodeType::Unique
    } else if detail_upper.contains("GROUP BY") {
        NodeType::HashAggregate
    } else {
        // ORDER BY, and the LEFT/RIGHT PART OF compound sorts
        NodeType::Sort
    };

    let mut node = described(node_type, detail);
    node.extra.insert(
        "using_temp_btree".to_string(),
        serde_json::Value::Bool(true),
    );
    node
}

/// Parses subquery operations
fn parse_subquery_operation(detail: &str) -> PlanNode {
    let mut node = described(NodeType::SubqueryScan, detail);

    if detail.to_ascii_uppercase().contains("CORRELATED") {
        node.extra
            .insert("correlated".to_string(), serde_json::Value::Bool(true));
    }

    node
}

/// Parses CO-ROUTINE operations (CTEs and views)
/// Format: CO-ROUTINE cte_name
fn parse_coroutine_operation(detail: &str) -> PlanNode {
    let mut node = described(NodeType::CteScan, detail);
    node.relation = detail.split_whitespace().nth(1).map(str::to_string);
    node
}

/// Parses MATERIALIZE operations
/// Format: MATERIALIZE view_name
fn parse_materialize_operation(detail: &str) -> PlanNode {
    let mut node = described(NodeType::Materialize, detail);
    node.relation = detail.split_whitespace().nth(1).map(str::to_string);
    node
}

/// Parses join operations
fn parse_join_operation(detail: &str) -> PlanNode {
    let detail_upper = detail.to_ascii_uppercase();
    let mut node = described(NodeType::NestedLoop, detail);

    node.join_type = if detail_upper.starts_with("LEFT") {
        Some(JoinType::Left)
    } else if detail_upper.starts_with("RIGHT") {
        Some(JoinType::Right)
    } else {
        Some(JoinType::Inner)
    };

    node
}

/// Extracts table name from detail string
/// Handles formats like:
/// - SCAN table_name
/// - SCAN TABLE table_name
/// - SCAN table_name AS alias
/// - SEARCH table_name USING INDEX ...
fn extract_table_name(detail: &str, operation: &str) -> Option<String> {
    // ASCII-only uppercasing keeps byte offsets valid for slicing `detail`
    let detail_upper = detail.to_ascii_uppercase();
    let start = detail_upper.find(&operation.to_ascii_uppercase())? + operation.len();
    let remaining = detail[start..].trim();

    // Skip optional "TABLE" keyword
    let remaining = if remaining.to_ascii_uppercase().starts_with("TABLE ") {
        remaining[6..].trim()
    } else {
        remaining
    };

    let table_name = remaining.split_whitespace().next()?;

    match table_name.to_ascii_uppercase().as_str() {
        "CONSTANT" | "SUBQUERY" => None,
        _ => Some(table_name.to_string()),
    }
}

/// Extracts index name from detail string
fn extract_index_name(detail: &str, index_type: &str) -> Option<String> {
    let detail_upper = detail.to_ascii_uppercase();
    let start = detail_upper.find(&index_type.to_ascii_uppercase())? + index_type.len();
    let remaining = detail[start..].trim();

    // Index name is the next word, up to an opening parenthesis
    let idx_name = remaining.split_whitespace().next()?.split('(').next()?;

    if idx_name.is_empty() {
        return None;
    }

    Some(idx_name.to_string())
}

/// Extracts index condition from parentheses
fn extract_index_condition(detail: &str) -> Option<String> {
    let start = detail.find('(')?;
    let end = detail.rfind(')')?;

    (start < end).then(|| detail[start + 1..end].to_string())
}
