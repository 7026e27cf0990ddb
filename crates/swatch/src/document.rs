//! Whole-document entry points: format detection, text input, export.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use swatch_tree::{key_between, IdGenerator, NodeId, Tree};

use crate::emit::{emit_css_tree, emit_scss_tree, EmitOptions};
use crate::error::{ParseError, SerializeError};
use crate::meta::{Aliasable, NodeMeta, TokenNode, TokenTree};
use crate::parser::{parse, ParseOutput};
use crate::resolver::{is_resolver_document, parse_resolver, serialize_resolver, ResolverMetadata};
use crate::serializer::serialize_tree;
use crate::value::TokenValue;

/// Parses either a resolver document or a plain token document.
pub fn parse_any(doc: &Value, ids: &mut dyn IdGenerator) -> ParseOutput {
    if is_resolver_document(doc) {
        parse_resolver(doc, ids)
    } else {
        parse(doc, ids)
    }
}

/// Parses JSON text. Malformed text yields a single structural error.
pub fn parse_str(text: &str, ids: &mut dyn IdGenerator) -> ParseOutput {
    match serde_json::from_str::<Value>(text) {
        Ok(doc) => parse_any(&doc, ids),
        Err(e) => ParseOutput::failed(ParseError::structural("", format!("invalid JSON: {}", e))),
    }
}

/// Parses YAML text with the same document shapes as JSON.
pub fn parse_yaml(text: &str, ids: &mut dyn IdGenerator) -> ParseOutput {
    match serde_yaml::from_str::<Value>(text) {
        Ok(doc) => parse_any(&doc, ids),
        Err(e) => ParseOutput::failed(ParseError::structural("", format!("invalid YAML: {}", e))),
    }
}

/// Removes resolver containers, lifting their children into the container's
/// place.
///
/// Lifted nodes get fresh indices so that the children of consecutive sets
/// keep their relative order under the new parent.
pub fn strip_containers(nodes: &[TokenNode]) -> Result<Vec<TokenNode>, SerializeError> {
    let tree: TokenTree = Tree::from_nodes(nodes.iter().cloned())?;

    let mut out = Vec::with_capacity(tree.len());
    let mut last_index: HashMap<Option<NodeId>, String> = HashMap::new();
    for node in tree.values() {
        if node.meta.is_container() {
            continue;
        }
        let mut parent = node.parent.clone();
        while let Some(container) = parent
            .as_ref()
            .and_then(|id| tree.get(id))
            .filter(|p| p.meta.is_container())
        {
            parent = container.parent.clone();
        }

        let index = key_between(last_index.get(&parent).map(String::as_str), None)
            .map_err(swatch_tree::TreeError::from)?;
        last_index.insert(parent.clone(), index.clone());
        out.push(TokenNode::new(node.id.clone(), parent, index, node.meta.clone()));
    }
    Ok(out)
}

/// Follows top-level alias hops from `id` to a literal value.
///
/// Returns `None` for groups, missing nodes and alias cycles.
pub fn resolve_value<'a>(nodes: &'a [TokenNode], id: &NodeId) -> Option<&'a TokenValue> {
    let by_id: HashMap<&NodeId, &NodeMeta> = nodes.iter().map(|n| (&n.id, &n.meta)).collect();
    let mut visited = HashSet::new();
    let mut current = id;
    loop {
        if !visited.insert(current) {
            return None;
        }
        let meta: &'a NodeMeta = by_id.get(current).copied()?;
        match &meta.as_token()?.value {
            Aliasable::Literal(value) => return Some(value),
            Aliasable::Ref(node_ref) => current = &node_ref.target,
        }
    }
}

/// Output formats understood by [`export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Canonical token JSON. Resolver containers are flattened first.
    Json,
    /// A resolver document, one set per root container.
    Resolver,
    Css,
    Scss,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Json, Format::Resolver, Format::Css, Format::Scss];

    /// Usual file extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "tokens.json",
            Format::Resolver => "resolver.json",
            Format::Css => "css",
            Format::Scss => "scss",
        }
    }
}

/// Settings for [`export`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub emit: EmitOptions,
    pub metadata: ResolverMetadata,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(mut self, emit: EmitOptions) -> Self {
        self.emit = emit;
        self
    }

    pub fn metadata(mut self, metadata: ResolverMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Exports a node set as text in the given format.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use swatch::{export, parse, ExportOptions, Format, SequentialIds};
///
/// let doc = json!({ "red": { "$type": "color", "$value": "#ff0000" } });
/// let nodes = parse(&doc, &mut SequentialIds::new()).nodes;
///
/// let css = export(&nodes, Format::Css, &ExportOptions::default()).unwrap();
/// assert_eq!(css, ":root {\n  --red: #ff0000;\n}\n");
/// ```
pub fn export(nodes: &[TokenNode], format: Format, options: &ExportOptions) -> Result<String, SerializeError> {
    let text = match format {
        Format::Json => {
            let tree: TokenTree = Tree::from_nodes(strip_containers(nodes)?)?;
            pretty(&serialize_tree(&tree)?)?
        }
        Format::Resolver => pretty(&serialize_resolver(nodes, &options.metadata)?)?,
        Format::Css => emit_css_tree(&Tree::from_nodes(nodes.iter().cloned())?, &options.emit)?,
        Format::Scss => emit_scss_tree(&Tree::from_nodes(nodes.iter().cloned())?, &options.emit)?,
    };
    tracing::debug!(?format, bytes = text.len(), "exported token document");
    Ok(text)
}

fn pretty(value: &Value) -> Result<String, SerializeError> {
    serde_json::to_string_pretty(value)
        .map(|mut text| {
            text.push('\n');
            text
        })
        .map_err(|e| SerializeError::Encode(e.to_string()))
}
