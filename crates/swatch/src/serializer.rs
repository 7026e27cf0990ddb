//! Tree nodes back to a canonical token document.
//!
//! Paths are recomputed from the tree, so references are written with the
//! names in force at serialization time. `$type` is written only where it
//! differs from what the node would inherit.

use serde_json::{Map, Value};
use swatch_tree::{NodeId, Tree, TreeError};

use crate::error::SerializeError;
use crate::meta::{Aliasable, NodeMeta, TokenMeta, TokenNode, TokenTree, TokenTreeExt};
use crate::naming::token_paths;
use crate::resolver::deep_merge;
use crate::types::TokenType;
use crate::value::{json::alias_json, PathMap};

/// Serializes a node set into a nested token document.
///
/// The nodes must not contain resolver containers; see
/// [`strip_containers`](crate::strip_containers).
pub fn serialize(nodes: &[TokenNode]) -> Result<Value, SerializeError> {
    let tree = Tree::from_nodes(nodes.iter().cloned())?;
    serialize_tree(&tree)
}

/// Serializes a committed tree.
pub fn serialize_tree(tree: &TokenTree) -> Result<Value, SerializeError> {
    serialize_document(tree).map(Value::Object)
}

pub(crate) fn serialize_document(tree: &TokenTree) -> Result<Map<String, Value>, SerializeError> {
    let paths = token_paths(tree);
    let mut root = Map::new();
    for id in tree.roots().iter() {
        write_node(tree, id, None, &paths, &mut root)?;
    }
    Ok(root)
}

fn write_node(
    tree: &TokenTree,
    id: &NodeId,
    inherited: Option<TokenType>,
    paths: &PathMap,
    out: &mut Map<String, Value>,
) -> Result<(), SerializeError> {
    let node = tree
        .get(id)
        .ok_or_else(|| TreeError::UnknownNode(id.clone()))?;

    match &node.meta {
        NodeMeta::Container(_) => Err(SerializeError::UnexpectedContainer(id.clone())),
        NodeMeta::Group(group) => {
            let mut obj = Map::new();
            if let Some(ty) = group.token_type.filter(|ty| Some(*ty) != inherited) {
                obj.insert("$type".into(), Value::String(ty.as_str().into()));
            }
            write_common(&mut obj, &group.description, &group.deprecated, &group.extensions);

            let child_inherited = group.token_type.or(inherited);
            for child in tree.children(Some(id)).iter() {
                write_node(tree, child, child_inherited, paths, &mut obj)?;
            }
            insert_group(out, &group.name, obj);
            Ok(())
        }
        NodeMeta::Token(token) => {
            let mut obj = Map::new();
            if !type_is_implied(tree, token, inherited) {
                obj.insert("$type".into(), Value::String(token.token_type.as_str().into()));
            }
            let value = match &token.value {
                Aliasable::Literal(value) => value.to_json(paths)?,
                Aliasable::Ref(node_ref) => alias_json(node_ref, paths)?,
            };
            obj.insert("$value".into(), value);
            write_common(&mut obj, &token.description, &token.deprecated, &token.extensions);
            out.insert(token.name.clone(), Value::Object(obj));
            Ok(())
        }
    }
}

/// Whether a reparse would arrive at the token's type without `$type`.
///
/// An alias takes its target's type ahead of the inherited one, so both
/// have to agree before `$type` can be left out.
fn type_is_implied(tree: &TokenTree, token: &TokenMeta, inherited: Option<TokenType>) -> bool {
    if Some(token.token_type) != inherited {
        return false;
    }
    match &token.value {
        Aliasable::Literal(_) => true,
        Aliasable::Ref(node_ref) => tree.referenced_type(node_ref) == Some(token.token_type),
    }
}

fn write_common(
    obj: &mut Map<String, Value>,
    description: &Option<String>,
    deprecated: &Option<crate::meta::Deprecated>,
    extensions: &Option<Map<String, Value>>,
) {
    if let Some(description) = description {
        obj.insert("$description".into(), Value::String(description.clone()));
    }
    if let Some(deprecated) = deprecated {
        obj.insert("$deprecated".into(), deprecated.to_json());
    }
    if let Some(extensions) = extensions {
        obj.insert("$extensions".into(), Value::Object(extensions.clone()));
    }
}

/// Sibling groups sharing a name (possible once resolver sets are flattened)
/// are merged, the later one winning.
fn insert_group(out: &mut Map<String, Value>, name: &str, group: Map<String, Value>) {
    match out.get_mut(name) {
        Some(Value::Object(existing)) if !existing.contains_key("$value") => {
            deep_merge(existing, &group)
        }
        _ => {
            out.insert(name.to_string(), Value::Object(group));
        }
    }
}
