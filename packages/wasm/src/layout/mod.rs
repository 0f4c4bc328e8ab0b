//! Layout of the normalized family tree.
//!
//! CPU-side layout computing target positions for every slot of a
//! [`FlatTree`](crate::tree::FlatTree). The renderer draws nodes at these
//! positions; the same positions feed the spatial index for hit testing.

pub mod tidy_tree;

pub use tidy_tree::{TidyTreeLayout, TreeLayout};
