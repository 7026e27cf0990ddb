//! # Swatch - design token engine
//!
//! Swatch reads design token documents (the DTCG `$value`/`$type` format and
//! resolver documents built on it) into an ordered tree, keeps aliases as
//! typed edges between nodes, and writes the tree back out as canonical JSON,
//! a resolver document, CSS custom properties or SCSS variables.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use swatch::{emit_css, parse, serialize, EmitOptions, SequentialIds};
//!
//! let doc = json!({
//!     "color": {
//!         "$type": "color",
//!         "brand": { "$value": "#3366ff" },
//!         "link": { "$value": "{color.brand}" }
//!     }
//! });
//!
//! let output = parse(&doc, &mut SequentialIds::new());
//! assert!(output.is_ok());
//!
//! // Canonical JSON round-trips
//! assert_eq!(serialize(&output.nodes).unwrap(), doc);
//!
//! // Aliases stay visible as variable bindings
//! let css = emit_css(&output.nodes, &EmitOptions::default()).unwrap();
//! assert!(css.contains("--color-link: var(--color-brand);"));
//! ```
//!
//! ## Core Concepts
//!
//! - [`TokenNode`]: a tree node carrying a [`NodeMeta`] (group, token or
//!   resolver container)
//! - [`TokenValue`]: one variant per [`TokenType`], composite sub-fields each
//!   [`Aliasable`]
//! - [`NodeRef`]: an alias, stored as the target's id rather than its path
//! - [`ParseOutput`]: accepted nodes plus [`ParseError`]s; bad input never
//!   aborts a parse
//!
//! ## Entry Points
//!
//! | Direction | Token documents | Resolver documents |
//! |-----------|-----------------|--------------------|
//! | in        | [`parse`]       | [`parse_resolver`] |
//! | out       | [`serialize`]   | [`serialize_resolver`] |
//!
//! [`parse_any`], [`parse_str`] and [`parse_yaml`] detect the document kind;
//! [`emit_css`], [`emit_scss`] and [`export`] produce text.

mod document;
mod emit;
mod error;
mod meta;
mod naming;
mod parser;
mod path;
mod resolver;
mod serializer;
mod types;
pub mod value;

pub use document::{
    export, parse_any, parse_str, parse_yaml, resolve_value, strip_containers, ExportOptions, Format,
};
pub use emit::{emit_css, emit_css_tree, emit_scss, emit_scss_tree, EmitOptions};
pub use error::{ErrorKind, ParseError, SerializeError, TYPE_UNDETERMINED};
pub use meta::{
    Aliasable, ContainerKind, ContainerMeta, Deprecated, GroupMeta, NodeMeta, NodeRef, TokenMeta,
    TokenNode, TokenTree, TokenTreeExt,
};
pub use naming::identifier;
pub use parser::{parse, ParseOutput};
pub use path::{format_alias, parse_alias, validate_name, ROOT_NAME};
pub use resolver::{
    deep_merge, is_resolver_document, parse_resolver, serialize_resolver, ResolverMetadata,
    RESOLVER_VERSION,
};
pub use serializer::{serialize, serialize_tree};
pub use types::TokenType;
pub use value::TokenValue;

// Tree store types used in this crate's public API
pub use swatch_tree::{IdGenerator, NodeId, RandomIds, SequentialIds};
