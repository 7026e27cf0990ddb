//! CSS custom properties and SCSS variables.
//!
//! Both emitters walk tokens in tree pre-order and produce one declaration per
//! token (several for custom stroke styles and typography). Resolver
//! containers are walked through without adding to names.
//!
//! A token whose whole value is an alias is written as a binding to the
//! target's variable, so alias relationships stay visible in the output:
//!
//! ```rust
//! use serde_json::json;
//! use swatch::{emit_scss, parse, EmitOptions, SequentialIds};
//!
//! let doc = json!({
//!     "spacing": {
//!         "$type": "dimension",
//!         "base": { "$value": { "value": 8, "unit": "px" } }
//!     },
//!     "gap": { "$type": "dimension", "$value": "{spacing.base}" }
//! });
//! let nodes = parse(&doc, &mut SequentialIds::new()).nodes;
//!
//! let scss = emit_scss(&nodes, &EmitOptions::default()).unwrap();
//! assert_eq!(scss, "$spacing-base: 8px;\n$gap: $spacing-base;\n");
//! ```

mod css;
mod render;
mod scss;

use swatch_tree::Tree;

use crate::error::SerializeError;
use crate::meta::{TokenNode, TokenTree};

use render::{declarations, Dialect};

/// Output settings shared by the emitters.
///
/// # Example
///
/// ```rust
/// use swatch::EmitOptions;
///
/// let options = EmitOptions::new().prefix("ds").selector("[data-theme=dark]");
/// assert_eq!(options.indent, "  ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Prepended to every variable name (`ds` gives `--ds-color-red`).
    pub prefix: Option<String>,
    /// Selector wrapping the CSS block. Ignored by SCSS.
    pub selector: String,
    /// Indentation of CSS declarations. Ignored by SCSS.
    pub indent: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            prefix: None,
            selector: ":root".to_string(),
            indent: "  ".to_string(),
        }
    }
}

impl EmitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }
}

/// Emits a `:root { --name: value; }` block.
pub fn emit_css(nodes: &[TokenNode], options: &EmitOptions) -> Result<String, SerializeError> {
    let tree = Tree::from_nodes(nodes.iter().cloned())?;
    emit_css_tree(&tree, options)
}

/// Emits bare `$name: value;` lines.
pub fn emit_scss(nodes: &[TokenNode], options: &EmitOptions) -> Result<String, SerializeError> {
    let tree = Tree::from_nodes(nodes.iter().cloned())?;
    emit_scss_tree(&tree, options)
}

pub fn emit_css_tree(tree: &TokenTree, options: &EmitOptions) -> Result<String, SerializeError> {
    let decls = declarations(tree, Dialect::Css, options.prefix.as_deref())?;
    Ok(css::write(&decls, options))
}

pub fn emit_scss_tree(tree: &TokenTree, options: &EmitOptions) -> Result<String, SerializeError> {
    let decls = declarations(tree, Dialect::Scss, options.prefix.as_deref())?;
    Ok(scss::write(&decls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use serde_json::{json, Value};
    use swatch_tree::SequentialIds;

    fn nodes(doc: Value) -> Vec<TokenNode> {
        let output = parse(&doc, &mut SequentialIds::new());
        assert!(output.is_ok(), "{:?}", output.errors);
        output.nodes
    }

    fn spacing() -> Vec<TokenNode> {
        nodes(json!({
            "spacing": {
                "$type": "dimension",
                "base": { "$value": { "value": 8, "unit": "px" } }
            },
            "gap": { "$type": "dimension", "$value": "{spacing.base}" }
        }))
    }

    #[test]
    fn test_scss_binding() {
        let scss = emit_scss(&spacing(), &EmitOptions::default()).unwrap();
        assert!(scss.contains("$spacing-base: 8px;"));
        assert!(scss.contains("$gap: $spacing-base;"));
    }

    #[test]
    fn test_css_block() {
        let css = emit_css(&spacing(), &EmitOptions::default()).unwrap();
        assert_eq!(
            css,
            ":root {\n  --spacing-base: 8px;\n  --gap: var(--spacing-base);\n}\n"
        );
    }

    #[test]
    fn test_options_apply() {
        let options = EmitOptions::new()
            .prefix("ds")
            .selector(".theme")
            .indent("\t");
        let css = emit_css(&spacing(), &options).unwrap();
        assert_eq!(
            css,
            ".theme {\n\t--ds-spacing-base: 8px;\n\t--ds-gap: var(--ds-spacing-base);\n}\n"
        );
        let scss = emit_scss(&spacing(), &options).unwrap();
        assert_eq!(scss, "$ds-spacing-base: 8px;\n$ds-gap: $ds-spacing-base;\n");
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(emit_css(&[], &EmitOptions::default()).unwrap(), ":root {\n}\n");
        assert_eq!(emit_scss(&[], &EmitOptions::default()).unwrap(), "");
    }
}
