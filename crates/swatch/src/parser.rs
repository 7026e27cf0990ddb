//! Token documents to tree nodes.
//!
//! Parsing runs in two passes:
//!
//! 1. A depth-first walk validates names and shapes, threads the inherited
//!    `$type` down explicitly, assigns ids and sibling indices, and records
//!    every token path. Nothing is resolved yet, so aliases may point forward.
//! 2. Each token is resolved: aliases become [`NodeRef`] edges typed through
//!    the alias chain, literals run through their type's validator.
//!
//! A rejected node never reaches the output. Its error is collected and its
//! siblings carry on.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use swatch::{parse, SequentialIds};
//!
//! let doc = json!({
//!     "spacing": {
//!         "$type": "dimension",
//!         "base": { "$value": { "value": 8, "unit": "px" } }
//!     },
//!     "gap": { "$type": "dimension", "$value": "{spacing.base}" }
//! });
//!
//! let output = parse(&doc, &mut SequentialIds::new());
//! assert!(output.is_ok());
//! assert_eq!(output.nodes.len(), 3);
//! ```

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use swatch_tree::{key_between, IdGenerator, NodeId};

use crate::error::{ErrorKind, ParseError};
use crate::meta::{Aliasable, Deprecated, GroupMeta, NodeMeta, NodeRef, TokenMeta, TokenNode};
use crate::path::{join_path, parse_alias, validate_name, RESERVED_PROPERTIES, ROOT_NAME};
use crate::types::TokenType;
use crate::value::{self, ValueErrorKind};

/// Accepted nodes (in pre-order) and every problem found on the way.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub nodes: Vec<TokenNode>,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub(crate) fn failed(error: ParseError) -> Self {
        Self {
            nodes: Vec::new(),
            errors: vec![error],
        }
    }

    /// True if the document parsed without a single error.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors of one kind.
    pub fn errors_of(&self, kind: ErrorKind) -> impl Iterator<Item = &ParseError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }
}

/// Parses a token document.
///
/// Ids come from `ids`; pass [`SequentialIds`](swatch_tree::SequentialIds) for
/// deterministic output.
pub fn parse(doc: &Value, ids: &mut dyn IdGenerator) -> ParseOutput {
    let Some(root) = doc.as_object() else {
        return ParseOutput::failed(ParseError::structural(
            "",
            "a token document must be a JSON object",
        ));
    };

    let mut walk = Walk {
        ids,
        entries: Vec::new(),
        tokens: HashMap::new(),
        errors: Vec::new(),
    };
    walk.children(root, None, "", None);

    let Walk {
        entries,
        tokens,
        mut errors,
        ..
    } = walk;

    let resolved = resolve(&entries, &tokens, &mut errors);
    let nodes: Vec<TokenNode> = entries
        .into_iter()
        .zip(resolved)
        .filter_map(|(entry, meta)| {
            meta.map(|meta| TokenNode::new(entry.id, entry.parent, entry.index, meta))
        })
        .collect();

    tracing::debug!(nodes = nodes.len(), errors = errors.len(), "parsed token document");
    ParseOutput { nodes, errors }
}

// =============================================================================
// Pass 1: walk
// =============================================================================

struct Entry {
    id: NodeId,
    parent: Option<NodeId>,
    index: String,
    path: String,
    kind: EntryKind,
}

enum EntryKind {
    Group(GroupMeta),
    Token(PendingToken),
}

struct PendingToken {
    name: String,
    own_type: Option<TokenType>,
    inherited: Option<TokenType>,
    raw: Value,
    description: Option<String>,
    deprecated: Option<Deprecated>,
    extensions: Option<Map<String, Value>>,
}

impl PendingToken {
    fn alias(&self) -> Option<&str> {
        self.raw.as_str().and_then(parse_alias)
    }
}

/// Properties shared by groups and tokens.
struct Common {
    own_type: Option<TokenType>,
    description: Option<String>,
    deprecated: Option<Deprecated>,
    extensions: Option<Map<String, Value>>,
}

struct Walk<'a> {
    ids: &'a mut dyn IdGenerator,
    entries: Vec<Entry>,
    /// Token path to entry position.
    tokens: HashMap<String, usize>,
    errors: Vec<ParseError>,
}

impl Walk<'_> {
    fn children(
        &mut self,
        obj: &Map<String, Value>,
        parent: Option<&NodeId>,
        parent_path: &str,
        inherited: Option<TokenType>,
    ) {
        let mut last_index: Option<String> = None;
        for (key, value) in obj {
            let path = join_path(parent_path, key);

            if key.starts_with('$') && key != ROOT_NAME {
                if RESERVED_PROPERTIES.contains(&key.as_str()) {
                    continue;
                }
                if !value.is_object() {
                    tracing::warn!(path = %path, "ignoring unknown property");
                    continue;
                }
            }
            if let Err(message) = validate_name(key) {
                tracing::debug!(path = %path, "rejected name");
                self.errors.push(ParseError::name(path, message));
                continue;
            }
            let Some(node) = value.as_object() else {
                self.errors.push(ParseError::schema(
                    path,
                    format!("'{}' must be a token or group object", key),
                ));
                continue;
            };

            let index = match key_between(last_index.as_deref(), None) {
                Ok(index) => index,
                Err(e) => {
                    self.errors.push(ParseError::structural(path, e.to_string()));
                    continue;
                }
            };
            if self.node(key, node, parent, path, inherited, &index) {
                last_index = Some(index);
            }
        }
    }

    /// Records one group or token. Returns false if it was rejected.
    fn node(
        &mut self,
        name: &str,
        obj: &Map<String, Value>,
        parent: Option<&NodeId>,
        path: String,
        inherited: Option<TokenType>,
        index: &str,
    ) -> bool {
        let common = match self.common(obj, &path) {
            Ok(common) => common,
            Err(error) => {
                self.errors.push(error);
                return false;
            }
        };

        match obj.get("$value") {
            Some(raw) => {
                if let Some(child) = obj.keys().find(|k| !k.starts_with('$')) {
                    self.errors.push(ParseError::schema(
                        path,
                        format!("a token cannot contain '{}'", child),
                    ));
                    return false;
                }
                let id = self.ids.next_id();
                self.tokens.insert(path.clone(), self.entries.len());
                self.entries.push(Entry {
                    id,
                    parent: parent.cloned(),
                    index: index.to_string(),
                    path,
                    kind: EntryKind::Token(PendingToken {
                        name: name.to_string(),
                        own_type: common.own_type,
                        inherited,
                        raw: raw.clone(),
                        description: common.description,
                        deprecated: common.deprecated,
                        extensions: common.extensions,
                    }),
                });
            }
            None => {
                if name == ROOT_NAME {
                    self.errors.push(ParseError::schema(path, "'$root' must have a $value"));
                    return false;
                }
                let id = self.ids.next_id();
                let group = GroupMeta {
                    name: name.to_string(),
                    token_type: common.own_type,
                    description: common.description,
                    deprecated: common.deprecated,
                    extensions: common.extensions,
                };
                self.entries.push(Entry {
                    id: id.clone(),
                    parent: parent.cloned(),
                    index: index.to_string(),
                    path: path.clone(),
                    kind: EntryKind::Group(group),
                });
                self.children(obj, Some(&id), &path, common.own_type.or(inherited));
            }
        }
        true
    }

    fn common(&self, obj: &Map<String, Value>, path: &str) -> Result<Common, ParseError> {
        let own_type = match obj.get("$type") {
            None => None,
            Some(Value::String(s)) => Some(TokenType::parse(s).ok_or_else(|| {
                ParseError::schema(path, format!("unrecognized $type '{}'", s))
            })?),
            Some(_) => return Err(ParseError::schema(path, "$type must be a string")),
        };
        let description = match obj.get("$description") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(ParseError::schema(path, "$description must be a string")),
        };
        let deprecated = match obj.get("$deprecated") {
            None => None,
            Some(v) => Some(Deprecated::from_json(v).ok_or_else(|| {
                ParseError::schema(path, "$deprecated must be a boolean or a string")
            })?),
        };
        let extensions = match obj.get("$extensions") {
            None => None,
            Some(Value::Object(map)) => Some(map.clone()),
            Some(_) => return Err(ParseError::schema(path, "$extensions must be an object")),
        };
        Ok(Common {
            own_type,
            description,
            deprecated,
            extensions,
        })
    }
}

// =============================================================================
// Pass 2: resolve
// =============================================================================

/// Resolves every entry, returning its final payload or `None` if rejected.
fn resolve(
    entries: &[Entry],
    tokens: &HashMap<String, usize>,
    errors: &mut Vec<ParseError>,
) -> Vec<Option<NodeMeta>> {
    let lookup: HashMap<String, NodeId> = tokens
        .iter()
        .map(|(path, &pos)| (path.clone(), entries[pos].id.clone()))
        .collect();

    let mut resolved: Vec<Option<NodeMeta>> = entries
        .iter()
        .map(|entry| match &entry.kind {
            EntryKind::Group(group) => Some(NodeMeta::Group(group.clone())),
            EntryKind::Token(token) => match resolve_token(entry, token, entries, tokens, &lookup) {
                Ok(meta) => Some(NodeMeta::Token(meta)),
                Err(error) => {
                    tracing::debug!(path = %error.path, kind = %error.kind, "rejected token");
                    errors.push(error);
                    None
                }
            },
        })
        .collect();

    reject_alias_cycles(entries, &mut resolved, errors);
    drop_broken_references(entries, &mut resolved, errors);
    resolved
}

fn resolve_token(
    entry: &Entry,
    token: &PendingToken,
    entries: &[Entry],
    tokens: &HashMap<String, usize>,
    lookup: &HashMap<String, NodeId>,
) -> Result<TokenMeta, ParseError> {
    let path = entry.path.as_str();

    let (token_type, value) = match token.alias() {
        Some(alias) => {
            let target = lookup.get(alias).ok_or_else(|| {
                ParseError::new(
                    ErrorKind::TypeUndetermined,
                    path,
                    format!("reference {} does not resolve to a token", alias),
                )
            })?;
            let token_type = token
                .own_type
                .or_else(|| chain_type(alias, path, entries, tokens))
                .or(token.inherited)
                .ok_or_else(|| ParseError::type_undetermined(path))?;
            (token_type, Aliasable::Ref(NodeRef::new(target.clone())))
        }
        None => {
            let token_type = token
                .own_type
                .or(token.inherited)
                .ok_or_else(|| ParseError::type_undetermined(path))?;
            let value = value::validate(token_type, &token.raw, lookup).map_err(|e| match e.kind {
                ValueErrorKind::UnresolvedAlias => {
                    tracing::debug!(path, field = %e.path, "unresolved alias in composite value");
                    ParseError::type_undetermined(path)
                }
                ValueErrorKind::Invalid => ParseError::schema(path, e.to_string()),
            })?;
            (token_type, Aliasable::Literal(value))
        }
    };

    Ok(TokenMeta {
        name: token.name.clone(),
        token_type,
        value,
        description: token.description.clone(),
        deprecated: token.deprecated.clone(),
        extensions: token.extensions.clone(),
    })
}

/// Follows an alias chain to find its type.
///
/// Stops at the first hop with an explicit `$type`, or at the literal token at
/// the end, whose inherited type is used. Revisiting a path (a cycle) or a
/// missing hop yields `None`.
fn chain_type(
    alias: &str,
    own_path: &str,
    entries: &[Entry],
    tokens: &HashMap<String, usize>,
) -> Option<TokenType> {
    let mut visited: HashSet<&str> = HashSet::from([own_path]);
    let mut current = alias;
    loop {
        if !visited.insert(current) {
            tracing::debug!(path = own_path, at = current, "alias cycle");
            return None;
        }
        let EntryKind::Token(hop) = &entries[*tokens.get(current)?].kind else {
            return None;
        };
        if let Some(own) = hop.own_type {
            return Some(own);
        }
        match hop.alias() {
            Some(next) => current = next,
            None => return hop.inherited,
        }
    }
}

/// Rejects every token that can reach itself through references, whatever
/// types its members declare.
fn reject_alias_cycles(
    entries: &[Entry],
    resolved: &mut [Option<NodeMeta>],
    errors: &mut Vec<ParseError>,
) {
    let edges: HashMap<NodeId, Vec<NodeId>> = entries
        .iter()
        .zip(resolved.iter())
        .filter_map(|(entry, meta)| {
            let token = meta.as_ref()?.as_token()?;
            Some((entry.id.clone(), token.references().into_iter().cloned().collect()))
        })
        .collect();

    for (entry, slot) in entries.iter().zip(resolved.iter_mut()) {
        if slot.is_some() && reaches_itself(&edges, &entry.id) {
            tracing::debug!(path = %entry.path, "alias cycle");
            *slot = None;
            errors.push(ParseError::new(
                ErrorKind::TypeUndetermined,
                entry.path.clone(),
                "token is part of an alias cycle",
            ));
        }
    }
}

fn reaches_itself(edges: &HashMap<NodeId, Vec<NodeId>>, start: &NodeId) -> bool {
    let mut stack: Vec<&NodeId> = edges.get(start).into_iter().flatten().collect();
    let mut seen: HashSet<&NodeId> = HashSet::new();
    while let Some(id) = stack.pop() {
        if id == start {
            return true;
        }
        if seen.insert(id) {
            stack.extend(edges.get(id).into_iter().flatten());
        }
    }
    false
}

/// Rejects tokens that reference rejected tokens, until nothing changes.
fn drop_broken_references(
    entries: &[Entry],
    resolved: &mut [Option<NodeMeta>],
    errors: &mut Vec<ParseError>,
) {
    let mut rejected: HashSet<NodeId> = entries
        .iter()
        .zip(resolved.iter())
        .filter(|(_, meta)| meta.is_none())
        .map(|(entry, _)| entry.id.clone())
        .collect();
    if rejected.is_empty() {
        return;
    }

    loop {
        let mut changed = false;
        for (entry, slot) in entries.iter().zip(resolved.iter_mut()) {
            let broken = match slot.as_ref().and_then(NodeMeta::as_token) {
                Some(token) => token.references().into_iter().find(|r| rejected.contains(*r)).cloned(),
                None => None,
            };
            if let Some(target) = broken {
                *slot = None;
                rejected.insert(entry.id.clone());
                errors.push(ParseError::new(
                    ErrorKind::TypeUndetermined,
                    entry.path.clone(),
                    format!("references rejected token '{}'", target),
                ));
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}
