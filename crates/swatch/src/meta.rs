//! Node payloads stored in the token tree.
//!
//! Every node in a [`TokenTree`] carries a [`NodeMeta`]:
//!
//! - [`GroupMeta`]: a named container of tokens, optionally typed
//! - [`TokenMeta`]: a named, typed value (literal or alias)
//! - [`ContainerMeta`]: resolver scaffolding (sets, modifiers), transparent
//!   for naming and stripped from canonical JSON
//!
//! Aliases are stored as [`NodeRef`] edges to the target node's id, never as
//! inlined values, so emitters can still see and preserve them.

use serde_json::{Map, Value};
use swatch_tree::{NodeId, Tree, TreeError, TreeNode};

use crate::path::ROOT_NAME;
use crate::types::TokenType;
use crate::value::TokenValue;

/// A tree node holding token metadata.
pub type TokenNode = TreeNode<NodeMeta>;

/// The ordered tree of one open document.
pub type TokenTree = Tree<NodeMeta>;

/// An edge meaning "use the resolved value of node `target`".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub target: NodeId,
}

impl NodeRef {
    pub fn new(target: NodeId) -> Self {
        Self { target }
    }
}

/// Either a literal value or a reference to another token.
#[derive(Debug, Clone, PartialEq)]
pub enum Aliasable<T> {
    Literal(T),
    Ref(NodeRef),
}

impl<T> Aliasable<T> {
    pub fn as_literal(&self) -> Option<&T> {
        match self {
            Aliasable::Literal(value) => Some(value),
            Aliasable::Ref(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&NodeRef> {
        match self {
            Aliasable::Literal(_) => None,
            Aliasable::Ref(node_ref) => Some(node_ref),
        }
    }
}

/// `$deprecated`: a flag or an explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deprecated {
    Flag(bool),
    Reason(String),
}

impl Deprecated {
    pub(crate) fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(Deprecated::Flag(*flag)),
            Value::String(reason) => Some(Deprecated::Reason(reason.clone())),
            _ => None,
        }
    }

    pub(crate) fn to_json(&self) -> Value {
        match self {
            Deprecated::Flag(flag) => Value::Bool(*flag),
            Deprecated::Reason(reason) => Value::String(reason.clone()),
        }
    }
}

/// A group of tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMeta {
    pub name: String,
    /// The group's own `$type`, inherited by descendants that declare none.
    pub token_type: Option<TokenType>,
    pub description: Option<String>,
    pub deprecated: Option<Deprecated>,
    pub extensions: Option<Map<String, Value>>,
}

impl GroupMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token_type: None,
            description: None,
            deprecated: None,
            extensions: None,
        }
    }

    pub fn with_type(mut self, token_type: TokenType) -> Self {
        self.token_type = Some(token_type);
        self
    }
}

/// A token: a named value with a resolved type.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenMeta {
    pub name: String,
    pub token_type: TokenType,
    pub value: Aliasable<TokenValue>,
    pub description: Option<String>,
    pub deprecated: Option<Deprecated>,
    pub extensions: Option<Map<String, Value>>,
}

impl TokenMeta {
    pub fn new(name: impl Into<String>, token_type: TokenType, value: Aliasable<TokenValue>) -> Self {
        Self {
            name: name.into(),
            token_type,
            value,
            description: None,
            deprecated: None,
            extensions: None,
        }
    }

    /// True if this token sits at its group's own path.
    pub fn is_group_root(&self) -> bool {
        self.name == ROOT_NAME
    }

    /// Every node this token references, at the top level or in sub-fields.
    pub fn references(&self) -> Vec<&NodeId> {
        match &self.value {
            Aliasable::Ref(node_ref) => vec![&node_ref.target],
            Aliasable::Literal(value) => value.references(),
        }
    }
}

/// Kind of a resolver container node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Set,
    Modifier,
    ModifierContext,
}

/// A resolver container: groups nodes for ordering, contributes no name.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerMeta {
    pub kind: ContainerKind,
    pub name: String,
    pub description: Option<String>,
    pub extensions: Option<Map<String, Value>>,
}

/// Payload of a [`TokenNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeMeta {
    Group(GroupMeta),
    Token(TokenMeta),
    Container(ContainerMeta),
}

impl NodeMeta {
    pub fn name(&self) -> &str {
        match self {
            NodeMeta::Group(group) => &group.name,
            NodeMeta::Token(token) => &token.name,
            NodeMeta::Container(container) => &container.name,
        }
    }

    /// Groups and tokens contribute to paths; containers do not.
    pub fn is_naming(&self) -> bool {
        !self.is_container()
    }

    pub fn is_container(&self) -> bool {
        matches!(self, NodeMeta::Container(_))
    }

    pub fn as_token(&self) -> Option<&TokenMeta> {
        match self {
            NodeMeta::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupMeta> {
        match self {
            NodeMeta::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerMeta> {
        match self {
            NodeMeta::Container(container) => Some(container),
            _ => None,
        }
    }
}

/// Token-aware helpers on [`TokenTree`].
pub trait TokenTreeExt {
    /// Replaces the whole tree with `nodes` in one transaction.
    fn load(&mut self, nodes: Vec<TokenNode>) -> Result<(), TreeError>;

    /// Committed nodes in pre-order.
    fn snapshot(&self) -> Vec<TokenNode>;

    /// Dot path of a group or token, skipping containers.
    fn path_of(&self, id: &NodeId) -> Option<String>;

    /// Finds the first group or token (in pre-order) at `path`.
    fn find_by_path(&self, path: &str) -> Option<NodeId>;

    /// Type of the token a reference points at, or `None` if the target is
    /// missing or not a token.
    fn referenced_type(&self, node_ref: &NodeRef) -> Option<TokenType>;
}

impl TokenTreeExt for TokenTree {
    fn load(&mut self, nodes: Vec<TokenNode>) -> Result<(), TreeError> {
        // staged first so parents are set before their children
        let staged: TokenTree = Tree::from_nodes(nodes)?;
        self.try_transact(|tx| {
            tx.clear();
            for node in staged.values() {
                tx.set(node.clone())?;
            }
            Ok::<(), TreeError>(())
        })?;
        tracing::debug!(nodes = staged.len(), "token tree loaded");
        Ok(())
    }

    fn snapshot(&self) -> Vec<TokenNode> {
        self.values().into_iter().cloned().collect()
    }

    fn path_of(&self, id: &NodeId) -> Option<String> {
        let node = self.get(id)?;
        if node.meta.is_container() {
            return None;
        }
        let mut segments = vec![node.meta.name()];
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent.meta.is_naming() {
                segments.push(parent.meta.name());
            }
            current = self.parent(&parent.id);
        }
        segments.reverse();
        Some(segments.join("."))
    }

    fn find_by_path(&self, path: &str) -> Option<NodeId> {
        crate::naming::naming_paths(self)
            .into_iter()
            .find(|(_, segments)| segments.join(".") == path)
            .map(|(id, _)| id)
    }

    fn referenced_type(&self, node_ref: &NodeRef) -> Option<TokenType> {
        self.get(&node_ref.target)?
            .meta
            .as_token()
            .map(|token| token.token_type)
    }
}
