//! Paths and output identifiers computed from tree order.
//!
//! Paths are never stored on nodes. They are recomputed from the current tree
//! on demand, so moving or renaming a group is reflected everywhere at once.

use std::collections::HashMap;

use swatch_tree::NodeId;

use crate::meta::{NodeMeta, TokenTree};
use crate::path::ROOT_NAME;
use crate::value::PathMap;

/// Every group and token with its naming segments, in pre-order.
///
/// Containers are walked through but contribute no segment.
pub(crate) fn naming_paths(tree: &TokenTree) -> Vec<(NodeId, Vec<String>)> {
    let mut out = Vec::with_capacity(tree.len());
    let mut prefix = Vec::new();
    for root in tree.roots().iter() {
        collect(tree, root, &mut prefix, &mut out);
    }
    out
}

fn collect(
    tree: &TokenTree,
    id: &NodeId,
    prefix: &mut Vec<String>,
    out: &mut Vec<(NodeId, Vec<String>)>,
) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let naming = node.meta.is_naming();
    if naming {
        prefix.push(node.meta.name().to_string());
        out.push((id.clone(), prefix.clone()));
    }
    for child in tree.children(Some(id)).iter() {
        collect(tree, child, prefix, out);
    }
    if naming {
        prefix.pop();
    }
}

/// Dot paths of every token, keyed by id.
pub(crate) fn token_paths(tree: &TokenTree) -> PathMap {
    naming_paths(tree)
        .into_iter()
        .filter(|(id, _)| matches!(tree.get(id).map(|n| &n.meta), Some(NodeMeta::Token(_))))
        .map(|(id, segments)| (id, segments.join(".")))
        .collect()
}

/// Output identifiers of every token, keyed by id.
///
/// A non-empty `prefix` is prepended as its own word. A token whose segments
/// yield no words (a root-level `$root`) is named `root`.
pub(crate) fn token_identifiers(tree: &TokenTree, prefix: Option<&str>) -> HashMap<NodeId, String> {
    let prefix = prefix.map(kebab).filter(|p| !p.is_empty());
    naming_paths(tree)
        .into_iter()
        .filter(|(id, _)| matches!(tree.get(id).map(|n| &n.meta), Some(NodeMeta::Token(_))))
        .map(|(id, segments)| {
            let mut name = identifier(&segments);
            if name.is_empty() {
                name = "root".to_string();
            }
            let name = match &prefix {
                Some(prefix) => format!("{}-{}", prefix, name),
                None => name,
            };
            (id, name)
        })
        .collect()
}

/// Tokens sharing an identifier: `(identifier, first, later)` in pre-order.
///
/// Tokens in different resolver sets may share a name, since each set
/// redefines the same variables.
pub(crate) fn identifier_collisions(
    tree: &TokenTree,
    idents: &HashMap<NodeId, String>,
) -> Vec<(String, NodeId, NodeId)> {
    let mut seen: HashMap<(Option<NodeId>, &str), &NodeId> = HashMap::new();
    let mut out = Vec::new();
    for node in tree.values() {
        let Some(ident) = idents.get(&node.id) else {
            continue;
        };
        let scope = enclosing_container(tree, &node.id);
        match seen.get(&(scope.clone(), ident.as_str())) {
            Some(first) => out.push((ident.clone(), (*first).clone(), node.id.clone())),
            None => {
                seen.insert((scope, ident.as_str()), &node.id);
            }
        }
    }
    out
}

fn enclosing_container(tree: &TokenTree, id: &NodeId) -> Option<NodeId> {
    let mut current = tree.parent(id);
    while let Some(parent) = current {
        if parent.meta.is_container() {
            return Some(parent.id.clone());
        }
        current = tree.parent(&parent.id);
    }
    None
}

/// Joins naming segments into a kebab-case identifier.
///
/// ```rust
/// use swatch::identifier;
///
/// let segments = ["colors", "brandPrimary", "$root"].map(String::from);
/// assert_eq!(identifier(&segments), "colors-brand-primary");
/// ```
pub fn identifier(segments: &[String]) -> String {
    segments
        .iter()
        .filter(|s| s.as_str() != ROOT_NAME)
        .map(|s| kebab(s))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Kebab-cases one name: transliterate, split words, lower-case.
fn kebab(name: &str) -> String {
    words(&deunicode::deunicode(name)).join("-")
}

fn words(ascii: &str) -> Vec<String> {
    let chars: Vec<char> = ascii.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            // brandPrimary, size2Xl, HTMLParser
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(segments: &[&str]) -> String {
        identifier(&segments.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_identifier_word_splitting() {
        assert_eq!(ident(&["spacing", "base"]), "spacing-base");
        assert_eq!(ident(&["brandPrimary"]), "brand-primary");
        assert_eq!(ident(&["HTMLParser"]), "html-parser");
        assert_eq!(ident(&["font size", "XL"]), "font-size-xl");
        assert_eq!(ident(&["space_2"]), "space-2");
        assert_eq!(ident(&["100"]), "100");
    }

    #[test]
    fn test_identifier_transliterates() {
        assert_eq!(ident(&["größe", "klein"]), "grosse-klein");
        assert_eq!(ident(&["café"]), "cafe");
    }

    fn collisions(doc: serde_json::Value) -> Vec<String> {
        let output = crate::parse_any(&doc, &mut swatch_tree::SequentialIds::new());
        assert!(output.is_ok(), "{:?}", output.errors);
        let tree: TokenTree = swatch_tree::Tree::from_nodes(output.nodes).unwrap();
        let idents = token_identifiers(&tree, None);
        identifier_collisions(&tree, &idents)
            .into_iter()
            .map(|(ident, _, _)| ident)
            .collect()
    }

    #[test]
    fn test_identifier_collisions() {
        use serde_json::json;

        let clashing = collisions(json!({
            "brandPrimary": { "$type": "number", "$value": 1 },
            "brand-primary": { "$type": "number", "$value": 2 },
            "$root": { "$type": "number", "$value": 3 },
            "root": { "$type": "number", "$value": 4 },
            "other": { "$type": "number", "$value": 5 }
        }));
        assert_eq!(clashing, ["brand-primary", "root"]);

        let per_set = collisions(json!({
            "version": "2025.10",
            "resolutionOrder": [
                { "type": "set", "name": "light", "sources": [{ "bg": { "$type": "color", "$value": "#ffffff" } }] },
                { "type": "set", "name": "dark", "sources": [{ "bg": { "$type": "color", "$value": "#000000" } }] }
            ]
        }));
        assert!(per_set.is_empty());
    }

    #[test]
    fn test_identifier_skips_root_sentinel() {
        assert_eq!(ident(&["colors", "$root"]), "colors");
        assert_eq!(ident(&["$root"]), "");
    }
}
