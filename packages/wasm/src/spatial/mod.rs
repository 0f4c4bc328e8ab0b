//! Spatial indexing for O(log n) hit testing.
//!
//! An R-tree over the person glyphs drawn by the renderer, so a click or
//! hover can be mapped back to a person without scanning every node.

mod rtree;

pub use rtree::SpatialIndex;
