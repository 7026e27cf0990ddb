//! # Swatch Tree - ordered keyed tree store
//!
//! A generic tree whose nodes live in an arena addressed by [`NodeId`] and
//! whose siblings are ordered by fractional index keys. It is the storage
//! layer underneath the `swatch` token engine, but knows nothing about tokens:
//! the node payload is a type parameter.
//!
//! ## Core Types
//!
//! - [`Tree`]: the store, with sorted and memoized child lookups
//! - [`Transaction`]: a batch of writes applied through [`Tree::transact`]
//! - [`ChangeSet`]: what a transaction touched, delivered to subscribers
//! - [`TreeNode`]: `{id, parent, index, meta}`
//!
//! ## Ordering
//!
//! - [`key_between`]: a key strictly between two keys (or past an open end)
//! - [`keys_between`]: several evenly spread keys at once
//!
//! Inserting or moving a node only ever generates one new key, so siblings
//! are never renumbered.
//!
//! ## Identity
//!
//! Node ids come from an injected [`IdGenerator`]: [`SequentialIds`] for
//! deterministic output, [`RandomIds`] for globally unique ids.

mod index;
mod node;
mod tree;

pub use index::{key_between, keys_between, validate_key, IndexError, DIGITS};
pub use node::{IdGenerator, NodeId, RandomIds, SequentialIds, TreeNode};
pub use tree::{ChangeSet, Position, SubscriptionId, Transaction, Tree, TreeError};
