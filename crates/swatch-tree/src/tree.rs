//! The ordered tree store.
//!
//! [`Tree`] keeps nodes in an arena keyed by [`NodeId`], a child index per
//! parent, and a memoized sorted view of each parent's children. All writes go
//! through [`Tree::transact`] (or [`Tree::try_transact`]), which applies a
//! batch of operations and then notifies subscribers exactly once.
//!
//! # Example
//!
//! ```rust
//! use swatch_tree::{NodeId, Position, Tree};
//!
//! let mut tree: Tree<&str> = Tree::new();
//! tree.try_transact(|tx| {
//!     tx.insert(NodeId::from("a"), None, Position::Last, "first")?;
//!     tx.insert(NodeId::from("b"), None, Position::Last, "second")?;
//!     tx.insert(NodeId::from("c"), None, Position::After(NodeId::from("a")), "between")
//! })
//! .unwrap();
//!
//! let roots = tree.roots();
//! let order: Vec<&str> = roots.iter().map(|id| id.as_str()).collect();
//! assert_eq!(order, ["a", "c", "b"]);
//! ```

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::index::{key_between, IndexError};
use crate::node::{NodeId, TreeNode};

/// Errors from tree mutations and invariant checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The node would become its own ancestor.
    #[error("node '{0}' cannot become its own ancestor")]
    Cycle(NodeId),
    /// A non-root node references a parent that is not stored.
    #[error("node '{node}' references missing parent '{parent}'")]
    DanglingParent { node: NodeId, parent: NodeId },
    /// The operation names a node that is not stored.
    #[error("node '{0}' does not exist")]
    UnknownNode(NodeId),
    /// A sibling position is not a child of the target parent.
    #[error("node '{sibling}' is not a child of the target parent")]
    NotASibling { sibling: NodeId },
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Where to place a node among its new siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    First,
    Last,
    Before(NodeId),
    After(NodeId),
}

/// Ids touched by one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Nodes created or replaced, and still present after the batch.
    pub updated: BTreeSet<NodeId>,
    /// Nodes removed by the batch.
    pub deleted: BTreeSet<NodeId>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.deleted.is_empty()
    }
}

/// Handle returned by [`Tree::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ChangeSet)>;

/// A keyed tree whose siblings are ordered by fractional index.
pub struct Tree<M> {
    nodes: HashMap<NodeId, TreeNode<M>>,
    children: HashMap<Option<NodeId>, HashSet<NodeId>>,
    cache: RefCell<HashMap<Option<NodeId>, Rc<[NodeId]>>>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<M> Tree<M> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            children: HashMap::new(),
            cache: RefCell::new(HashMap::new()),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Builds a tree from a set of nodes in a single transaction.
    pub fn from_nodes<I>(nodes: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = TreeNode<M>>,
    {
        let mut tree = Self::new();
        tree.try_transact(|tx| {
            for node in nodes {
                tx.set_unchecked(node);
            }
            Ok::<(), TreeError>(())
        })?;
        tree.validate()?;
        Ok(tree)
    }

    pub fn get(&self, id: &NodeId) -> Option<&TreeNode<M>> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode<M>> {
        self.nodes.values()
    }

    /// All nodes in pre-order, siblings sorted by index.
    pub fn values(&self) -> Vec<&TreeNode<M>> {
        self.pre_order()
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Ids of every node reachable from the roots, in pre-order.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in self.roots().iter() {
            out.push(root.clone());
            self.collect_descendants(root, &mut out);
        }
        out
    }

    /// Ids of the root nodes, sorted by index.
    pub fn roots(&self) -> Rc<[NodeId]> {
        self.children(None)
    }

    /// Children of `parent` (roots for `None`), sorted by index.
    ///
    /// The result is memoized until a write touches that parent.
    pub fn children(&self, parent: Option<&NodeId>) -> Rc<[NodeId]> {
        let key = parent.cloned();
        if let Some(hit) = self.cache.borrow().get(&key) {
            return Rc::clone(hit);
        }
        let sorted = self.sorted_children(parent);
        self.cache.borrow_mut().insert(key, Rc::clone(&sorted));
        sorted
    }

    pub fn parent(&self, id: &NodeId) -> Option<&TreeNode<M>> {
        let parent = self.nodes.get(id)?.parent.as_ref()?;
        self.nodes.get(parent)
    }

    pub fn prev_sibling(&self, id: &NodeId) -> Option<NodeId> {
        let (siblings, pos) = self.sibling_position(id)?;
        pos.checked_sub(1).map(|p| siblings[p].clone())
    }

    pub fn next_sibling(&self, id: &NodeId) -> Option<NodeId> {
        let (siblings, pos) = self.sibling_position(id)?;
        siblings.get(pos + 1).cloned()
    }

    /// Descendants of `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    /// Checks the structural invariants: every parent exists and no node is
    /// its own ancestor.
    pub fn validate(&self) -> Result<(), TreeError> {
        for node in self.nodes.values() {
            let mut steps = 0;
            let mut current = node.parent.as_ref();
            while let Some(parent_id) = current {
                if parent_id == &node.id || steps > self.nodes.len() {
                    return Err(TreeError::Cycle(node.id.clone()));
                }
                let parent = self
                    .nodes
                    .get(parent_id)
                    .ok_or_else(|| TreeError::DanglingParent {
                        node: node.id.clone(),
                        parent: parent_id.clone(),
                    })?;
                current = parent.parent.as_ref();
                steps += 1;
            }
        }
        Ok(())
    }

    /// Registers a callback run once after every transaction.
    pub fn subscribe(&mut self, callback: impl FnMut(&ChangeSet) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Runs a batch of mutations and notifies subscribers once afterwards.
    pub fn transact<R>(&mut self, f: impl FnOnce(&mut Transaction<'_, M>) -> R) -> R {
        let mut tx = Transaction::new(self);
        let result = f(&mut tx);
        let changes = tx.commit();
        self.notify(&changes);
        result
    }

    /// Like [`transact`](Self::transact), but rolls every operation back when
    /// the batch returns `Err`. Subscribers are only notified on success.
    pub fn try_transact<R, E>(
        &mut self,
        f: impl FnOnce(&mut Transaction<'_, M>) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut tx = Transaction::new(self);
        match f(&mut tx) {
            Ok(result) => {
                let changes = tx.commit();
                self.notify(&changes);
                Ok(result)
            }
            Err(err) => {
                tx.rollback();
                Err(err)
            }
        }
    }

    fn notify(&mut self, changes: &ChangeSet) {
        tracing::trace!(
            updated = changes.updated.len(),
            deleted = changes.deleted.len(),
            subscribers = self.subscribers.len(),
            "tree transaction committed"
        );
        for (_, callback) in self.subscribers.iter_mut() {
            callback(changes);
        }
    }

    fn sorted_children(&self, parent: Option<&NodeId>) -> Rc<[NodeId]> {
        let Some(ids) = self.children.get(&parent.cloned()) else {
            return Rc::from(Vec::new());
        };
        let mut nodes: Vec<&TreeNode<M>> = ids.iter().filter_map(|id| self.nodes.get(id)).collect();
        nodes.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.id.cmp(&b.id)));
        nodes.into_iter().map(|n| n.id.clone()).collect()
    }

    fn sibling_position(&self, id: &NodeId) -> Option<(Rc<[NodeId]>, usize)> {
        let node = self.nodes.get(id)?;
        let siblings = self.children(node.parent.as_ref());
        let pos = siblings.iter().position(|s| s == id)?;
        Some((siblings, pos))
    }

    fn collect_descendants(&self, id: &NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(Some(id)).iter() {
            out.push(child.clone());
            self.collect_descendants(child, out);
        }
    }

    fn invalidate(&self, parent: &Option<NodeId>) {
        self.cache.borrow_mut().remove(parent);
    }

    /// Stores a node, keeping the child index and cache consistent.
    /// Returns the node previously stored under the same id.
    fn put(&mut self, node: TreeNode<M>) -> Option<TreeNode<M>> {
        let old = self.nodes.remove(&node.id);
        if let Some(old) = &old {
            if old.parent != node.parent {
                if let Some(set) = self.children.get_mut(&old.parent) {
                    set.remove(&old.id);
                }
                self.invalidate(&old.parent);
            }
        }
        self.children
            .entry(node.parent.clone())
            .or_default()
            .insert(node.id.clone());
        self.invalidate(&node.parent);
        self.nodes.insert(node.id.clone(), node);
        old
    }

    fn take(&mut self, id: &NodeId) -> Option<TreeNode<M>> {
        let node = self.nodes.remove(id)?;
        if let Some(set) = self.children.get_mut(&node.parent) {
            set.remove(id);
        }
        self.invalidate(&node.parent);
        Some(node)
    }
}

impl<M> Default for Tree<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: fmt::Debug> fmt::Debug for Tree<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.values())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// A batch of mutations in progress.
///
/// Reads through the transaction see every write made so far in the batch;
/// reads through the tree are impossible until the batch ends.
pub struct Transaction<'t, M> {
    tree: &'t mut Tree<M>,
    changes: ChangeSet,
    undo: Vec<UndoEntry<M>>,
}

enum UndoEntry<M> {
    /// Drop whatever is stored under `id`, then restore `previous`.
    Replace {
        id: NodeId,
        previous: Option<TreeNode<M>>,
    },
    /// Put a moved node back where it was.
    Reposition {
        id: NodeId,
        parent: Option<NodeId>,
        index: String,
    },
}

impl<'t, M> Transaction<'t, M> {
    fn new(tree: &'t mut Tree<M>) -> Self {
        Self {
            tree,
            changes: ChangeSet::default(),
            undo: Vec::new(),
        }
    }

    pub fn get(&self, id: &NodeId) -> Option<&TreeNode<M>> {
        self.tree.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.tree.contains(id)
    }

    pub fn children(&self, parent: Option<&NodeId>) -> Rc<[NodeId]> {
        self.tree.children(parent)
    }

    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        self.tree.descendants(id)
    }

    /// Creates or replaces a node.
    ///
    /// Re-parenting moves the node between child indices. Placing a node
    /// under itself or one of its descendants fails with [`TreeError::Cycle`],
    /// and a parent that is not stored fails with [`TreeError::UnknownNode`].
    pub fn set(&mut self, node: TreeNode<M>) -> Result<(), TreeError> {
        if let Some(parent) = &node.parent {
            if self.is_self_or_descendant(parent, &node.id) {
                return Err(TreeError::Cycle(node.id));
            }
            if !self.tree.contains(parent) {
                return Err(TreeError::UnknownNode(parent.clone()));
            }
        }
        self.set_unchecked(node);
        Ok(())
    }

    /// Removes a leaf node. Returns `false` (and does nothing) for a missing
    /// id or a node that still has children; use
    /// [`delete_subtree`](Self::delete_subtree) to drop those.
    pub fn delete(&mut self, id: &NodeId) -> bool {
        if !self.tree.children(Some(id)).is_empty() {
            return false;
        }
        self.remove(id)
    }

    fn remove(&mut self, id: &NodeId) -> bool {
        let Some(node) = self.tree.take(id) else {
            return false;
        };
        self.changes.updated.remove(id);
        self.changes.deleted.insert(id.clone());
        self.undo.push(UndoEntry::Replace {
            id: id.clone(),
            previous: Some(node),
        });
        true
    }

    /// Removes a node and all of its descendants. Returns how many were removed.
    pub fn delete_subtree(&mut self, id: &NodeId) -> usize {
        let mut doomed = self.tree.descendants(id);
        doomed.insert(0, id.clone());
        doomed
            .iter()
            .rev()
            .filter(|node_id| self.remove(node_id))
            .count()
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        let ids: Vec<NodeId> = self.tree.nodes.keys().cloned().collect();
        for id in &ids {
            self.remove(id);
        }
    }

    /// Computes a fresh index for a node placed at `position` under `parent`.
    ///
    /// `exclude` is left out of the sibling list, so a node can be positioned
    /// relative to its current neighbours while it is being moved.
    pub fn index_at(
        &self,
        parent: Option<&NodeId>,
        position: &Position,
        exclude: Option<&NodeId>,
    ) -> Result<String, TreeError> {
        let siblings: Vec<NodeId> = self
            .tree
            .children(parent)
            .iter()
            .filter(|id| Some(*id) != exclude)
            .cloned()
            .collect();
        let locate = |sibling: &NodeId| -> Result<usize, TreeError> {
            siblings
                .iter()
                .position(|id| id == sibling)
                .ok_or_else(|| TreeError::NotASibling {
                    sibling: sibling.clone(),
                })
        };

        let (lower, upper) = match position {
            Position::First => (None, siblings.first()),
            Position::Last => (siblings.last(), None),
            Position::Before(sibling) => {
                let pos = locate(sibling)?;
                (pos.checked_sub(1).map(|p| &siblings[p]), Some(&siblings[pos]))
            }
            Position::After(sibling) => {
                let pos = locate(sibling)?;
                (Some(&siblings[pos]), siblings.get(pos + 1))
            }
        };
        let lower = lower.map(|id| self.index_of(id)).transpose()?;
        let upper = upper.map(|id| self.index_of(id)).transpose()?;
        Ok(key_between(lower, upper)?)
    }

    /// Creates a node at `position` under `parent`, generating its index.
    pub fn insert(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        position: Position,
        meta: M,
    ) -> Result<NodeId, TreeError> {
        if let Some(parent_id) = &parent {
            if !self.tree.contains(parent_id) {
                return Err(TreeError::UnknownNode(parent_id.clone()));
            }
        }
        let index = self.index_at(parent.as_ref(), &position, None)?;
        self.set(TreeNode::new(id.clone(), parent, index, meta))?;
        Ok(id)
    }

    /// Re-parents and repositions an existing node, keeping its payload.
    pub fn move_node(
        &mut self,
        id: &NodeId,
        parent: Option<NodeId>,
        position: Position,
    ) -> Result<(), TreeError> {
        if let Some(parent_id) = &parent {
            if !self.tree.contains(parent_id) {
                return Err(TreeError::UnknownNode(parent_id.clone()));
            }
            if self.is_self_or_descendant(parent_id, id) {
                return Err(TreeError::Cycle(id.clone()));
            }
        }
        let index = self.index_at(parent.as_ref(), &position, Some(id))?;
        let mut node = self
            .tree
            .take(id)
            .ok_or_else(|| TreeError::UnknownNode(id.clone()))?;
        let previous_parent = std::mem::replace(&mut node.parent, parent);
        let previous_index = std::mem::replace(&mut node.index, index);
        self.tree.put(node);

        self.changes.deleted.remove(id);
        self.changes.updated.insert(id.clone());
        self.undo.push(UndoEntry::Reposition {
            id: id.clone(),
            parent: previous_parent,
            index: previous_index,
        });
        Ok(())
    }

    pub(crate) fn set_unchecked(&mut self, node: TreeNode<M>) {
        let id = node.id.clone();
        let previous = self.tree.put(node);
        self.changes.deleted.remove(&id);
        self.changes.updated.insert(id.clone());
        self.undo.push(UndoEntry::Replace { id, previous });
    }

    fn index_of(&self, id: &NodeId) -> Result<&str, TreeError> {
        self.tree
            .get(id)
            .map(|n| n.index.as_str())
            .ok_or_else(|| TreeError::UnknownNode(id.clone()))
    }

    /// True if `candidate` is `node` or lies below it.
    fn is_self_or_descendant(&self, candidate: &NodeId, node: &NodeId) -> bool {
        let mut current = Some(candidate);
        let mut steps = 0;
        while let Some(id) = current {
            if id == node {
                return true;
            }
            if steps > self.tree.nodes.len() {
                return false;
            }
            current = self.tree.get(id).and_then(|n| n.parent.as_ref());
            steps += 1;
        }
        false
    }

    fn commit(self) -> ChangeSet {
        self.changes
    }

    fn rollback(mut self) {
        tracing::trace!(operations = self.undo.len(), "rolling back tree transaction");
        while let Some(entry) = self.undo.pop() {
            match entry {
                UndoEntry::Replace { id, previous } => {
                    self.tree.take(&id);
                    if let Some(node) = previous {
                        self.tree.put(node);
                    }
                }
                UndoEntry::Reposition { id, parent, index } => {
                    if let Some(mut node) = self.tree.take(&id) {
                        node.parent = parent;
                        node.index = index;
                        self.tree.put(node);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn node(id: &str, parent: Option<&str>, index: &str) -> TreeNode<&'static str> {
        TreeNode::new(NodeId::from(id), parent.map(NodeId::from), index, "meta")
    }

    fn ids(list: &[NodeId]) -> Vec<&str> {
        list.iter().map(|id| id.as_str()).collect()
    }

    fn sample() -> Tree<&'static str> {
        Tree::from_nodes(vec![
            node("root", None, "a0"),
            node("c", Some("root"), "a2"),
            node("a", Some("root"), "a0"),
            node("b", Some("root"), "a1"),
            node("a1", Some("a"), "a0"),
        ])
        .unwrap()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    #[test]
    fn test_children_sorted_by_index() {
        let tree = sample();
        assert_eq!(ids(&tree.children(Some(&NodeId::from("root")))), ["a", "b", "c"]);
        assert_eq!(ids(&tree.roots()), ["root"]);
        assert!(tree.children(Some(&NodeId::from("c"))).is_empty());
    }

    #[test]
    fn test_children_memoized_until_write() {
        let mut tree = sample();
        let root = NodeId::from("root");
        let first = tree.children(Some(&root));
        let second = tree.children(Some(&root));
        assert!(Rc::ptr_eq(&first, &second));

        tree.transact(|tx| tx.set(node("d", Some("root"), "a3")).unwrap());
        let third = tree.children(Some(&root));
        assert!(!Rc::ptr_eq(&first, &third));
        assert_eq!(ids(&third), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_siblings_and_parent() {
        let tree = sample();
        let b = NodeId::from("b");
        assert_eq!(tree.prev_sibling(&b), Some(NodeId::from("a")));
        assert_eq!(tree.next_sibling(&b), Some(NodeId::from("c")));
        assert_eq!(tree.prev_sibling(&NodeId::from("a")), None);
        assert_eq!(tree.next_sibling(&NodeId::from("c")), None);
        assert_eq!(tree.parent(&b).map(|n| n.id.as_str()), Some("root"));
        assert!(tree.parent(&NodeId::from("root")).is_none());
    }

    #[test]
    fn test_pre_order_values() {
        let tree = sample();
        let order: Vec<&str> = tree.values().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, ["root", "a", "a1", "b", "c"]);
        assert_eq!(ids(&tree.descendants(&NodeId::from("root"))), ["a", "a1", "b", "c"]);
    }

    // =========================================================================
    // Writes
    // =========================================================================

    #[test]
    fn test_reparent_migrates_between_child_indices() {
        let mut tree = sample();
        let root = NodeId::from("root");
        let a = NodeId::from("a");
        // Prime both caches.
        assert_eq!(tree.children(Some(&root)).len(), 3);
        assert_eq!(tree.children(Some(&a)).len(), 1);

        tree.transact(|tx| tx.set(node("c", Some("a"), "a1")).unwrap());

        assert_eq!(ids(&tree.children(Some(&root))), ["a", "b"]);
        assert_eq!(ids(&tree.children(Some(&a))), ["a1", "c"]);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut tree = sample();
        let removed = tree.transact(|tx| tx.delete(&NodeId::from("nope")));
        assert!(!removed);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_delete_subtree() {
        let mut tree = sample();
        let removed = tree.transact(|tx| tx.delete_subtree(&NodeId::from("a")));
        assert_eq!(removed, 2);
        assert!(!tree.contains(&NodeId::from("a1")));
        assert_eq!(ids(&tree.children(Some(&NodeId::from("root")))), ["b", "c"]);
    }

    #[test]
    fn test_set_rejects_cycle() {
        let mut tree = sample();
        let result = tree.transact(|tx| tx.set(node("root", Some("a1"), "a0")));
        assert_eq!(result, Err(TreeError::Cycle(NodeId::from("root"))));
        let result = tree.transact(|tx| tx.set(node("b", Some("b"), "a0")));
        assert_eq!(result, Err(TreeError::Cycle(NodeId::from("b"))));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_set_rejects_unknown_parent() {
        let mut tree = sample();
        let result = tree.transact(|tx| tx.set(node("d", Some("ghost"), "a0")));
        assert_eq!(result, Err(TreeError::UnknownNode(NodeId::from("ghost"))));
        assert!(!tree.contains(&NodeId::from("d")));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_delete_keeps_nodes_with_children() {
        let mut tree = sample();
        let removed = tree.transact(|tx| tx.delete(&NodeId::from("a")));
        assert!(!removed);
        assert!(tree.contains(&NodeId::from("a")));

        let removed = tree.transact(|tx| tx.delete(&NodeId::from("a1")) && tx.delete(&NodeId::from("a")));
        assert!(removed);
        assert_eq!(ids(&tree.children(Some(&NodeId::from("root")))), ["b", "c"]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_dangling_parent() {
        let result = Tree::from_nodes(vec![node("orphan", Some("ghost"), "a0")]);
        assert_eq!(
            result.unwrap_err(),
            TreeError::DanglingParent {
                node: NodeId::from("orphan"),
                parent: NodeId::from("ghost"),
            }
        );
    }

    #[test]
    fn test_insert_positions() {
        let mut tree: Tree<&str> = Tree::new();
        tree.try_transact(|tx| {
            tx.insert(NodeId::from("m"), None, Position::Last, "m")?;
            tx.insert(NodeId::from("z"), None, Position::Last, "z")?;
            tx.insert(NodeId::from("a"), None, Position::First, "a")?;
            tx.insert(NodeId::from("n"), None, Position::After(NodeId::from("m")), "n")?;
            tx.insert(NodeId::from("l"), None, Position::Before(NodeId::from("m")), "l")
        })
        .unwrap();
        assert_eq!(ids(&tree.roots()), ["a", "l", "m", "n", "z"]);
    }

    #[test]
    fn test_insert_relative_to_stranger_fails() {
        let mut tree = sample();
        let result = tree.try_transact(|tx| {
            tx.insert(
                NodeId::from("x"),
                Some(NodeId::from("root")),
                Position::After(NodeId::from("a1")),
                "x",
            )
        });
        assert!(matches!(result, Err(TreeError::NotASibling { .. })));
    }

    #[test]
    fn test_move_node() {
        let mut tree = sample();
        tree.try_transact(|tx| {
            tx.move_node(&NodeId::from("c"), Some(NodeId::from("root")), Position::First)?;
            tx.move_node(&NodeId::from("a1"), None, Position::Last)
        })
        .unwrap();
        assert_eq!(ids(&tree.children(Some(&NodeId::from("root")))), ["c", "a", "b"]);
        assert_eq!(ids(&tree.roots()), ["root", "a1"]);

        let result = tree.try_transact(|tx| {
            tx.move_node(&NodeId::from("root"), Some(NodeId::from("b")), Position::Last)
        });
        assert_eq!(result, Err(TreeError::Cycle(NodeId::from("root"))));
    }

    // =========================================================================
    // Transactions and notification
    // =========================================================================

    #[test]
    fn test_one_notification_per_transaction() {
        let mut tree: Tree<&str> = Tree::new();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        tree.subscribe(move |_| seen.set(seen.get() + 1));

        tree.transact(|tx| {
            for (id, key) in [("n0", "a0"), ("n1", "a1"), ("n2", "a2")] {
                tx.set(node(id, None, key)).unwrap();
            }
            tx.delete(&NodeId::from("n1"));
        });
        assert_eq!(calls.get(), 1);

        tree.transact(|_| {});
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_change_set_contents() {
        let mut tree = sample();
        let last = Rc::new(RefCell::new(ChangeSet::default()));
        let sink = Rc::clone(&last);
        tree.subscribe(move |changes| *sink.borrow_mut() = changes.clone());

        tree.transact(|tx| {
            tx.set(node("d", Some("root"), "a3")).unwrap();
            tx.set(node("e", Some("root"), "a4")).unwrap();
            tx.delete(&NodeId::from("e"));
            tx.delete(&NodeId::from("b"));
        });

        let changes = last.borrow();
        assert_eq!(ids(&changes.updated.iter().cloned().collect::<Vec<_>>()), ["d"]);
        assert_eq!(
            ids(&changes.deleted.iter().cloned().collect::<Vec<_>>()),
            ["b", "e"]
        );
    }

    #[test]
    fn test_reads_inside_transaction_see_batch() {
        let mut tree = sample();
        tree.transact(|tx| {
            tx.set(node("d", Some("root"), "a0V")).unwrap();
            let children = tx.children(Some(&NodeId::from("root")));
            assert_eq!(ids(&children), ["a", "d", "b", "c"]);
        });
    }

    #[test]
    fn test_unsubscribe() {
        let mut tree: Tree<&str> = Tree::new();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let id = tree.subscribe(move |_| seen.set(seen.get() + 1));
        assert!(tree.unsubscribe(id));
        assert!(!tree.unsubscribe(id));
        tree.transact(|tx| tx.clear());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_failed_transaction_rolls_back_without_notifying() {
        let mut tree = sample();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        tree.subscribe(move |_| seen.set(seen.get() + 1));
        let root = NodeId::from("root");
        let before = ids(&tree.children(Some(&root)))
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();

        let result: Result<(), TreeError> = tree.try_transact(|tx| {
            tx.set(node("d", Some("root"), "a3"))?;
            tx.delete(&NodeId::from("b"));
            tx.move_node(&NodeId::from("c"), None, Position::First)?;
            tx.set(node("b", Some("b"), "a0"))
        });

        assert!(result.is_err());
        assert_eq!(calls.get(), 0);
        assert_eq!(ids(&tree.children(Some(&root))), before);
        assert_eq!(tree.len(), 5);
        assert!(tree.get(&NodeId::from("c")).is_some_and(|n| n.index == "a2"));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_clear() {
        let mut tree = sample();
        tree.transact(|tx| tx.clear());
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
    }
}
