//! Query Plan Model - Data structures for representing query execution plans
//!
//! A `QueryPlan` is the tree SQLite describes through the `id`/`parent`
//! columns of `EXPLAIN QUERY PLAN`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Represents a complete query execution plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryPlan {
    /// Root node of the plan tree
    pub root: PlanNode,
}

impl QueryPlan {
    /// Creates a new query plan with the given root node
    pub fn new(root: PlanNode) -> Self {
        Self { root }
    }

    /// Returns an iterator over all nodes in the plan (depth-first)
    pub fn iter_nodes(&self) -> PlanNodeIterator<'_> {
        PlanNodeIterator::new(&self.root)
    }

    /// Returns the distinct tables read by a sequential scan, sorted by name
    pub fn scanned_tables(&self) -> Vec<String> {
        self.iter_nodes()
            .filter(|n| n.node_type == NodeType::SeqScan)
            .filter_map(|n| n.relation.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns the total number of nodes in the plan
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}

/// Represents a single node in the query plan tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanNode {
    /// Type of operation this node performs
    pub node_type: NodeType,
    /// Plan row id this node was built from, if any
    pub id: Option<i64>,
    /// Human-readable description of the operation
    pub description: Option<String>,
    /// Relation/table name (if applicable)
    pub relation: Option<String>,
    /// Index name used (for index scans)
    pub index_name: Option<String>,
    /// Index condition (for index scans)
    pub index_cond: Option<String>,
    /// Join type (for joins)
    pub join_type: Option<JoinType>,
    /// Child nodes
    pub children: Vec<PlanNode>,
    /// Additional properties not captured by specific fields
    pub extra: HashMap<String, serde_json::Value>,
}

impl PlanNode {
    /// Creates a new plan node with the given type
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            id: None,
            description: None,
            relation: None,
            index_name: None,
            index_cond: None,
            join_type: None,
            children: Vec::new(),
            extra: HashMap::new(),
        }
    }

    /// Sets the relation/table name
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    /// Adds a child node
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the total number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}

/// Type of join operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

/// Type of operation performed by a plan node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    // Scan operations
    SeqScan,
    IndexScan,
    IndexOnlyScan,
    SubqueryScan,
    ValuesScan,
    CteScan,

    // Join operations
    NestedLoop,

    // Temp b-tree operations
    Sort,
    Unique,
    HashAggregate,

    // Set operations
    SetOp,
    Append,
    MergeAppend,

    Materialize,

    // Bloom filter
    Hash,

    Unknown,
}

/// Iterator for traversing plan nodes depth-first
pub struct PlanNodeIterator<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> PlanNodeIterator<'a> {
    fn new(root: &'a PlanNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for PlanNodeIterator<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
