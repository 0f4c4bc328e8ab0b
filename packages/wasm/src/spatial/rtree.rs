//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) spatial queries for:
//! - Nearest glyph within a radius
//! - Rectangle intersection

use rstar::{AABB, PointDistance, RTree, RTreeObject};

/// A glyph center in the spatial index, tagged with its glyph number.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GlyphPoint {
    glyph: usize,
    x: f32,
    y: f32,
}

impl RTreeObject for GlyphPoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for GlyphPoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over glyph centers.
///
/// Built once per layout with [`SpatialIndex::rebuild`]; the tree never
/// moves after layout, so there is no incremental insert.
pub struct SpatialIndex {
    tree: RTree<GlyphPoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load the index from `(glyph, x, y)` tuples.
    pub fn rebuild(&mut self, points: &[(usize, f32, f32)]) {
        let glyphs: Vec<_> = points
            .iter()
            .map(|&(glyph, x, y)| GlyphPoint { glyph, x, y })
            .collect();

        self.tree = RTree::bulk_load(glyphs);
    }

    /// Find the nearest glyph within a maximum distance.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<usize> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.glyph)
    }

    /// All glyphs inside a rectangle, sorted by glyph number.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<usize> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut glyphs: Vec<usize> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|point| point.glyph)
            .collect();
        glyphs.sort_unstable();
        glyphs
    }

    /// Get the number of glyphs in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
