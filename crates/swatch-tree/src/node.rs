//! Node identity and the stored node record.

use std::fmt;

/// Identifier of a tree node, unique for the node's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A node stored in a [`Tree`](crate::Tree).
///
/// `parent` is the ownership edge (absent for roots) and `index` is the
/// fractional key ordering the node among its siblings. The payload `meta` is
/// opaque to the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<M> {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub index: String,
    pub meta: M,
}

impl<M> TreeNode<M> {
    pub fn new(id: NodeId, parent: Option<NodeId>, index: impl Into<String>, meta: M) -> Self {
        Self {
            id,
            parent,
            index: index.into(),
            meta,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Source of fresh node identifiers.
///
/// Injected wherever nodes are created so that callers choose between
/// deterministic ids (tests, snapshots) and globally unique ones.
///
/// Any `FnMut() -> NodeId` closure is a generator.
pub trait IdGenerator {
    fn next_id(&mut self) -> NodeId;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> NodeId,
{
    fn next_id(&mut self) -> NodeId {
        self()
    }
}

/// Deterministic ids: `n1`, `n2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::with_prefix("n")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> NodeId {
        let id = NodeId(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

/// Random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> NodeId {
        NodeId(uuid::Uuid::new_v4().to_string())
    }
}
