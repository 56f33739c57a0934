//! Dynamic R-tree over padded job locations.
//!
//! Nodes live in an arena and point at their parents by id. Inserts descend to
//! a leaf, and overflowing nodes are split with Guttman's linear algorithm. The
//! split propagates upwards in an explicit loop, which ends when a parent absorbs
//! both halves or the root grows.

mod node;
mod rect;
mod split;
mod tree;

pub use node::Entry;
pub use rect::Rect;
pub use tree::{RTree, TreeStats};
