//! Error types for parsing and serializing token documents.
//!
//! Input problems never abort a parse: they are collected as [`ParseError`]
//! values next to the nodes that were accepted. Only a malformed resolver
//! document envelope stops parsing early, with a single
//! [`ErrorKind::StructuralViolation`].
//!
//! [`SerializeError`] is different in kind: serializers assume a tree built by
//! the parser, so hitting one means the caller broke a tree invariant.

use std::fmt;

use swatch_tree::{NodeId, TreeError};
use thiserror::Error;

/// Message shared by every type-inference failure.
///
/// Unresolved aliases inside composite values are reported with this same
/// message; the offending sub-field path is only logged.
pub const TYPE_UNDETERMINED: &str = "unable to determine token type";

/// Category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A node name uses a reserved prefix or character.
    NameViolation,
    /// A value fails its type's validator, or `$type` is unrecognized.
    SchemaViolation,
    /// No explicit, inherited or alias-derived type could be found.
    TypeUndetermined,
    /// A resolver document fails its top-level shape checks.
    StructuralViolation,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NameViolation => "name violation",
            ErrorKind::SchemaViolation => "schema violation",
            ErrorKind::TypeUndetermined => "type undetermined",
            ErrorKind::StructuralViolation => "structural violation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem found in the input, located by its dot path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at '{path}': {message}")]
pub struct ParseError {
    pub path: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ErrorKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn name(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NameViolation, path, message)
    }

    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaViolation, path, message)
    }

    pub fn type_undetermined(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeUndetermined, path, TYPE_UNDETERMINED)
    }

    pub fn structural(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StructuralViolation, path, message)
    }

    /// Returns the error with `prefix` prepended to its path.
    pub(crate) fn within(mut self, prefix: &str) -> Self {
        self.path = if self.path.is_empty() {
            prefix.to_string()
        } else {
            format!("{}/{}", prefix, self.path)
        };
        self
    }
}

/// Failure to serialize or emit a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// A reference points at a node that is missing or not a token.
    #[error("reference to unknown token '{0}'")]
    DanglingReference(NodeId),
    /// Resolver containers must be stripped before canonical export.
    #[error("container node '{0}' cannot appear in a canonical token document")]
    UnexpectedContainer(NodeId),
    /// The node set violates a tree invariant.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// The output could not be encoded as text.
    #[error("failed to encode output: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::name("colors.$bad", "names must not start with '$'");
        let msg = err.to_string();
        assert!(msg.contains("name violation"));
        assert!(msg.contains("colors.$bad"));
        assert!(msg.contains("must not start"));
    }

    #[test]
    fn test_type_undetermined_uses_shared_message() {
        let err = ParseError::type_undetermined("a.b");
        assert_eq!(err.kind, ErrorKind::TypeUndetermined);
        assert_eq!(err.message, TYPE_UNDETERMINED);
    }

    #[test]
    fn test_within_prefixes_path() {
        let err = ParseError::schema("a.b", "bad").within("light");
        assert_eq!(err.path, "light/a.b");
        let err = ParseError::structural("", "bad").within("light");
        assert_eq!(err.path, "light");
    }

    #[test]
    fn test_serialize_error_display() {
        let err = SerializeError::DanglingReference(NodeId::from("n7"));
        assert!(err.to_string().contains("n7"));
    }
}
