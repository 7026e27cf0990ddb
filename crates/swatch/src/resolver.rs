//! Resolver documents: ordered sets of token sources.
//!
//! A resolver document lists Sets and Modifiers in `resolutionOrder`. Each
//! Set's `sources` are deep-merged in order and parsed as one token document;
//! the parsed roots are placed under a [`ContainerKind::Set`] node so the sets
//! keep their order and identity in the tree. Modifiers are checked for shape
//! and then dropped.
//!
//! ```rust
//! use serde_json::json;
//! use swatch::{parse_resolver, serialize_resolver, ResolverMetadata, SequentialIds};
//!
//! let doc = json!({
//!     "version": "2025.10",
//!     "resolutionOrder": [
//!         { "type": "set", "name": "base", "sources": [
//!             { "size": { "$type": "number", "$value": 1 } }
//!         ] }
//!     ]
//! });
//! let output = parse_resolver(&doc, &mut SequentialIds::new());
//! assert!(output.is_ok());
//!
//! let back = serialize_resolver(&output.nodes, &ResolverMetadata::new()).unwrap();
//! assert_eq!(back, doc);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use swatch_tree::{key_between, IdGenerator, NodeId, Tree, TreeError};

use crate::error::{ParseError, SerializeError};
use crate::meta::{ContainerKind, ContainerMeta, NodeMeta, TokenNode};
use crate::parser::{parse, ParseOutput};
use crate::serializer::serialize_document;

/// The resolver format version this crate reads and writes.
pub const RESOLVER_VERSION: &str = "2025.10";

/// Document-level fields written by [`serialize_resolver`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ResolverMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Reads the metadata fields of a resolver document.
    pub fn from_document(doc: &Value) -> Self {
        let text = |key: &str| doc.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: text("name"),
            description: text("description"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct ResolverDocument {
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "resolutionOrder")]
    resolution_order: Vec<ResolutionItem>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ResolutionItem {
    Set(SetDefinition),
    Modifier(ModifierDefinition),
}

#[derive(Debug, Deserialize, Serialize)]
struct SetDefinition {
    name: String,
    sources: Vec<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "$extensions", default, skip_serializing_if = "Option::is_none")]
    extensions: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ModifierDefinition {
    name: String,
    contexts: BTreeMap<String, Vec<Map<String, Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    #[serde(rename = "$extensions", default, skip_serializing_if = "Option::is_none")]
    extensions: Option<Map<String, Value>>,
}

/// Merges `source` into `target`.
///
/// Plain groups merge key by key; a token (an object with `$value`) on either
/// side replaces the other wholesale. Existing keys keep their position.
pub fn deep_merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, incoming) in source {
        let merge = matches!(
            (target.get(key), incoming),
            (Some(Value::Object(existing)), Value::Object(incoming))
                if !is_token(existing) && !is_token(incoming)
        );
        if merge {
            if let (Some(Value::Object(existing)), Value::Object(incoming)) =
                (target.get_mut(key), incoming)
            {
                deep_merge(existing, incoming);
            }
        } else {
            target.insert(key.clone(), incoming.clone());
        }
    }
}

fn is_token(obj: &Map<String, Value>) -> bool {
    obj.contains_key("$value")
}

/// True if `doc` has the shape of a resolver document rather than a plain
/// token document.
pub fn is_resolver_document(doc: &Value) -> bool {
    doc.get("resolutionOrder").is_some() || doc.get("version").is_some_and(Value::is_string)
}

/// Parses a resolver document.
///
/// Envelope problems (wrong version, missing or malformed `resolutionOrder`,
/// invalid modifiers, external `$ref` sources) abort with a single
/// structural error. Problems inside a set's tokens are reported per node,
/// with the set name prefixed to the path (`light/colors.bad`).
pub fn parse_resolver(doc: &Value, ids: &mut dyn IdGenerator) -> ParseOutput {
    let document = match check_envelope(doc) {
        Ok(document) => document,
        Err(error) => {
            tracing::debug!(error = %error, "rejected resolver document");
            return ParseOutput::failed(error);
        }
    };

    let mut output = ParseOutput::default();
    let mut last_index: Option<String> = None;
    for item in document.resolution_order {
        let set = match item {
            ResolutionItem::Set(set) => set,
            ResolutionItem::Modifier(modifier) => {
                tracing::debug!(
                    modifier = %modifier.name,
                    contexts = modifier.contexts.len(),
                    "skipping resolver modifier"
                );
                continue;
            }
        };

        let index = match key_between(last_index.as_deref(), None) {
            Ok(index) => index,
            Err(e) => {
                output.errors.push(ParseError::structural(set.name, e.to_string()));
                continue;
            }
        };
        last_index = Some(index.clone());

        let mut merged = Map::new();
        for source in &set.sources {
            deep_merge(&mut merged, source);
        }

        let container_id = ids.next_id();
        let parsed = parse(&Value::Object(merged), ids);
        output
            .errors
            .extend(parsed.errors.into_iter().map(|e| e.within(&set.name)));
        output.nodes.push(TokenNode::new(
            container_id.clone(),
            None,
            index,
            NodeMeta::Container(ContainerMeta {
                kind: ContainerKind::Set,
                name: set.name,
                description: set.description,
                extensions: set.extensions,
            }),
        ));
        output.nodes.extend(parsed.nodes.into_iter().map(|mut node| {
            if node.parent.is_none() {
                node.parent = Some(container_id.clone());
            }
            node
        }));
    }

    tracing::debug!(
        nodes = output.nodes.len(),
        errors = output.errors.len(),
        "parsed resolver document"
    );
    output
}

fn check_envelope(doc: &Value) -> Result<ResolverDocument, ParseError> {
    if !doc.is_object() {
        return Err(ParseError::structural("", "a resolver document must be a JSON object"));
    }
    match doc.get("version") {
        Some(Value::String(version)) if version == RESOLVER_VERSION => {}
        Some(other) => {
            return Err(ParseError::structural(
                "version",
                format!("unsupported resolver version {}, expected \"{}\"", other, RESOLVER_VERSION),
            ))
        }
        None => return Err(ParseError::structural("version", "missing version")),
    }
    if doc.get("resolutionOrder").is_none() {
        return Err(ParseError::structural("resolutionOrder", "missing resolutionOrder"));
    }

    let document: ResolverDocument = serde_json::from_value(doc.clone())
        .map_err(|e| ParseError::structural("resolutionOrder", e.to_string()))?;

    for (i, item) in document.resolution_order.iter().enumerate() {
        let at = format!("resolutionOrder[{}]", i);
        match item {
            ResolutionItem::Set(set) => {
                if set.sources.iter().any(|source| source.contains_key("$ref")) {
                    return Err(ParseError::structural(
                        at,
                        format!("set '{}' uses a $ref source, which is not supported", set.name),
                    ));
                }
            }
            ResolutionItem::Modifier(modifier) => {
                if modifier.contexts.is_empty() {
                    return Err(ParseError::structural(
                        at,
                        format!("modifier '{}' has no contexts", modifier.name),
                    ));
                }
                if let Some(default) = &modifier.default {
                    if !modifier.contexts.contains_key(default) {
                        return Err(ParseError::structural(
                            at,
                            format!(
                                "modifier '{}' defaults to unknown context '{}'",
                                modifier.name, default
                            ),
                        ));
                    }
                }
            }
        }
    }
    Ok(document)
}

/// Serializes a tree of Set containers back into a resolver document.
///
/// Each root Set becomes one `resolutionOrder` entry with a single merged
/// source. Roots that are not Sets are skipped with a warning.
pub fn serialize_resolver(
    nodes: &[TokenNode],
    metadata: &ResolverMetadata,
) -> Result<Value, SerializeError> {
    let tree = Tree::from_nodes(nodes.iter().cloned())?;

    let mut resolution_order = Vec::new();
    for root in tree.roots().iter() {
        let node = tree
            .get(root)
            .ok_or_else(|| TreeError::UnknownNode(root.clone()))?;
        let set = match &node.meta {
            NodeMeta::Container(container) if container.kind == ContainerKind::Set => container,
            other => {
                tracing::warn!(node = %root, name = other.name(), "skipping non-set root");
                continue;
            }
        };

        let source = Tree::from_nodes(rerooted(&tree, root))?;
        resolution_order.push(ResolutionItem::Set(SetDefinition {
            name: set.name.clone(),
            sources: vec![serialize_document(&source)?],
            description: set.description.clone(),
            extensions: set.extensions.clone(),
        }));
    }

    let document = ResolverDocument {
        version: RESOLVER_VERSION.to_string(),
        name: metadata.name.clone(),
        description: metadata.description.clone(),
        resolution_order,
    };
    serde_json::to_value(&document).map_err(|e| SerializeError::Encode(e.to_string()))
}

/// The subtree under `root`, with `root`'s children turned into roots.
fn rerooted(tree: &Tree<NodeMeta>, root: &NodeId) -> Vec<TokenNode> {
    tree.descendants(root)
        .iter()
        .filter_map(|id| tree.get(id))
        .map(|node| {
            let mut node = node.clone();
            if node.parent.as_ref() == Some(root) {
                node.parent = None;
            }
            node
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use swatch_tree::SequentialIds;

    fn light_dark() -> Value {
        json!({
            "version": "2025.10",
            "name": "themes",
            "resolutionOrder": [
                { "type": "set", "name": "light", "sources": [
                    { "bg": { "$type": "color", "$value": "#ffffff" } }
                ] },
                { "type": "modifier", "name": "contrast",
                  "contexts": { "normal": [], "high": [{ "bg": { "$value": "#000000" } }] },
                  "default": "normal" },
                { "type": "set", "name": "dark", "sources": [
                    { "bg": { "$type": "color", "$value": "#000000" } }
                ] }
            ]
        })
    }

    // =========================================================================
    // deep_merge
    // =========================================================================

    #[test]
    fn test_deep_merge_recurses_into_groups() {
        let mut target = json!({ "a": { "x": { "$value": 1 } }, "b": 1 })
            .as_object()
            .cloned()
            .unwrap();
        let source = json!({ "a": { "y": { "$value": 2 } }, "c": 3 });
        deep_merge(&mut target, source.as_object().unwrap());
        assert_eq!(
            Value::Object(target),
            json!({ "a": { "x": { "$value": 1 }, "y": { "$value": 2 } }, "b": 1, "c": 3 })
        );
    }

    #[test]
    fn test_deep_merge_replaces_tokens_wholesale() {
        let mut target = json!({ "t": { "$type": "number", "$value": 1, "$description": "old" } })
            .as_object()
            .cloned()
            .unwrap();
        let source = json!({ "t": { "$value": 2 } });
        deep_merge(&mut target, source.as_object().unwrap());
        assert_eq!(Value::Object(target), json!({ "t": { "$value": 2 } }));
    }

    #[test]
    fn test_deep_merge_keeps_key_position() {
        let mut target = json!({ "a": 1, "b": 2 }).as_object().cloned().unwrap();
        deep_merge(&mut target, json!({ "a": 3 }).as_object().unwrap());
        let keys: Vec<&String> = target.keys().collect();
        assert_eq!(keys, ["a", "b"]);
    }

    // =========================================================================
    // parse_resolver
    // =========================================================================

    #[test]
    fn test_sets_become_ordered_containers() {
        let output = parse_resolver(&light_dark(), &mut SequentialIds::new());
        assert!(output.is_ok(), "{:?}", output.errors);

        let tree: Tree<NodeMeta> = Tree::from_nodes(output.nodes.clone()).unwrap();
        let names: Vec<String> = tree
            .roots()
            .iter()
            .map(|id| tree.get(id).unwrap().meta.name().to_string())
            .collect();
        assert_eq!(names, ["light", "dark"]);
        for root in tree.roots().iter() {
            assert_eq!(tree.children(Some(root)).len(), 1);
        }
    }

    #[test]
    fn test_sources_merge_in_order() {
        let doc = json!({
            "version": "2025.10",
            "resolutionOrder": [
                { "type": "set", "name": "base", "sources": [
                    { "c": { "$type": "color", "a": { "$value": "#111111" }, "b": { "$value": "#222222" } } },
                    { "c": { "b": { "$value": "#333333" } } }
                ] }
            ]
        });
        let output = parse_resolver(&doc, &mut SequentialIds::new());
        assert!(output.is_ok(), "{:?}", output.errors);
        let back = serialize_resolver(&output.nodes, &ResolverMetadata::new()).unwrap();
        assert_eq!(
            back["resolutionOrder"][0]["sources"][0],
            json!({ "c": { "$type": "color", "a": { "$value": "#111111" }, "b": { "$value": "#333333" } } })
        );
    }

    #[test]
    fn test_round_trip_drops_modifiers() {
        let doc = light_dark();
        let output = parse_resolver(&doc, &mut SequentialIds::new());
        let metadata = ResolverMetadata::from_document(&doc);
        let back = serialize_resolver(&output.nodes, &metadata).unwrap();
        assert_eq!(
            back,
            json!({
                "version": "2025.10",
                "name": "themes",
                "resolutionOrder": [
                    { "type": "set", "name": "light", "sources": [
                        { "bg": { "$type": "color", "$value": "#ffffff" } }
                    ] },
                    { "type": "set", "name": "dark", "sources": [
                        { "bg": { "$type": "color", "$value": "#000000" } }
                    ] }
                ]
            })
        );
    }

    #[test]
    fn test_token_errors_are_prefixed_with_set_name() {
        let doc = json!({
            "version": "2025.10",
            "resolutionOrder": [
                { "type": "set", "name": "light", "sources": [ { "$bad": { "$value": 1 } } ] }
            ]
        });
        let output = parse_resolver(&doc, &mut SequentialIds::new());
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].kind, ErrorKind::NameViolation);
        assert_eq!(output.errors[0].path, "light/$bad");
        // the set itself survives, empty
        assert_eq!(output.nodes.len(), 1);
    }

    #[test]
    fn test_envelope_violations_abort() {
        let cases = [
            json!({ "resolutionOrder": [] }),
            json!({ "version": "2024.01", "resolutionOrder": [] }),
            json!({ "version": "2025.10" }),
            json!({ "version": "2025.10", "resolutionOrder": [{ "type": "layer" }] }),
            json!({ "version": "2025.10", "resolutionOrder": [
                { "type": "set", "name": "x", "sources": [{ "$ref": "base.json" }] }
            ] }),
            json!({ "version": "2025.10", "resolutionOrder": [
                { "type": "modifier", "name": "m", "contexts": {} }
            ] }),
            json!({ "version": "2025.10", "resolutionOrder": [
                { "type": "modifier", "name": "m", "contexts": { "a": [] }, "default": "b" }
            ] }),
        ];
        for doc in cases {
            let output = parse_resolver(&doc, &mut SequentialIds::new());
            assert!(output.nodes.is_empty(), "{}", doc);
            assert_eq!(output.errors.len(), 1, "{}", doc);
            assert_eq!(output.errors[0].kind, ErrorKind::StructuralViolation, "{}", doc);
        }
    }

    #[test]
    fn test_is_resolver_document() {
        assert!(is_resolver_document(&light_dark()));
        assert!(is_resolver_document(&json!({ "version": "2025.10" })));
        assert!(!is_resolver_document(&json!({ "version": { "$type": "number", "$value": 1 } })));
        assert!(!is_resolver_document(&json!({ "a": { "$value": 1 } })));
    }

    #[test]
    fn test_non_set_roots_are_skipped() {
        let output = parse_resolver(&light_dark(), &mut SequentialIds::new());
        let mut nodes = output.nodes;
        nodes.push(TokenNode::new(
            NodeId::from("stray"),
            None,
            "b00",
            NodeMeta::Group(crate::meta::GroupMeta::new("stray")),
        ));
        let back = serialize_resolver(&nodes, &ResolverMetadata::new()).unwrap();
        assert_eq!(back["resolutionOrder"].as_array().unwrap().len(), 2);
    }
}
