//! Buchheim-Junger-Leipert tidy tree layout algorithm.
//!
//! Implements the O(n) algorithm from "Improving Walker's Algorithm to Run in
//! Linear Time" (Buchheim, Junger, Leipert, 2002) over a normalized
//! [`FlatTree`]. Output matches `d3.tree().nodeSize([w, h])`: the root sits at
//! the origin, x grows to the right, y grows downward one level per depth.
//!
//! # Algorithm Overview
//!
//! 1. **First walk (bottom-up):** Recursively assign preliminary x-coordinates
//!    to each node by merging subtree contours. Uses threads for O(1) amortized
//!    contour traversal.
//! 2. **Second walk (top-down):** Apply accumulated modifiers to convert
//!    preliminary x-coordinates to final positions.
//! 3. **Scale:** Multiply x by the node width and depth by the level height.

use crate::config::LayoutConfig;
use crate::tree::FlatTree;

/// Per-slot state used during the walks. Indexed by flat-tree slot.
#[derive(Debug, Clone)]
struct WalkState {
    /// Preliminary x-coordinate (from first walk).
    prelim: f32,
    /// Modifier for subtree shift (accumulated in first walk, applied in second).
    modifier: f32,
    /// Contour thread for leaves (next node on the left or right contour).
    thread: Option<usize>,
    /// Ancestor pointer (for the "default ancestor" in apportion).
    ancestor: usize,
    /// Shift value for even spacing of intermediate children.
    shift: f32,
    /// Change value for even spacing of intermediate children.
    change: f32,
}

/// Final positions, one per flat-tree slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeLayout {
    pub positions_x: Vec<f32>,
    pub positions_y: Vec<f32>,
}

impl TreeLayout {
    pub fn position(&self, slot: usize) -> Option<(f32, f32)> {
        Some((*self.positions_x.get(slot)?, *self.positions_y.get(slot)?))
    }

    pub fn len(&self) -> usize {
        self.positions_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions_x.is_empty()
    }

    /// Positions as `[x0, y0, x1, y1, ...]`.
    pub fn interleaved(&self) -> Vec<f32> {
        self.positions_x
            .iter()
            .zip(&self.positions_y)
            .flat_map(|(&x, &y)| [x, y])
            .collect()
    }
}

/// The tidy tree layout engine.
pub struct TidyTreeLayout {
    config: LayoutConfig,
}

impl TidyTreeLayout {
    /// Create a new tidy tree layout with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Create a tidy tree layout with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    /// Lay out every slot of `tree`.
    pub fn compute(&self, tree: &FlatTree) -> TreeLayout {
        if tree.is_empty() {
            return TreeLayout::default();
        }

        let mut walk = Walk {
            tree,
            state: (0..tree.len())
                .map(|slot| WalkState {
                    prelim: 0.0,
                    modifier: 0.0,
                    thread: None,
                    ancestor: slot,
                    shift: 0.0,
                    change: 0.0,
                })
                .collect(),
            sibling_separation: self.config.sibling_separation,
            subtree_separation: self.config.subtree_separation,
        };

        walk.first_walk(0);

        // Offset the whole tree so the root lands on x = 0.
        let mut final_x = vec![0.0; tree.len()];
        let root_offset = -walk.state[0].prelim;
        walk.second_walk(0, root_offset, &mut final_x);

        TreeLayout {
            positions_x: final_x
                .into_iter()
                .map(|x| x * self.config.node_width)
                .collect(),
            positions_y: tree
                .nodes()
                .iter()
                .map(|node| node.depth as f32 * self.config.level_height)
                .collect(),
        }
    }
}

struct Walk<'a> {
    tree: &'a FlatTree,
    state: Vec<WalkState>,
    sibling_separation: f32,
    subtree_separation: f32,
}

impl<'a> Walk<'a> {
    fn children(&self, v: usize) -> &'a [usize] {
        let tree: &'a FlatTree = self.tree;
        tree.nodes()[v].children.as_slice()
    }

    fn parent(&self, v: usize) -> Option<usize> {
        self.tree.nodes()[v].parent
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let siblings = self.children(self.parent(v)?);
        let position = siblings.iter().position(|&s| s == v)?;
        position.checked_sub(1).map(|i| siblings[i])
    }

    /// Left-to-right index among siblings.
    fn number(&self, v: usize) -> usize {
        self.parent(v)
            .and_then(|p| self.children(p).iter().position(|&s| s == v))
            .unwrap_or(0)
    }

    /// Siblings sit closer together than cousins.
    fn separation(&self, a: usize, b: usize) -> f32 {
        if self.parent(a).is_some() && self.parent(a) == self.parent(b) {
            self.sibling_separation
        } else {
            self.subtree_separation
        }
    }

    /// Get the next node on the left contour of a subtree.
    fn next_left(&self, v: usize) -> Option<usize> {
        self.children(v).first().copied().or(self.state[v].thread)
    }

    /// Get the next node on the right contour of a subtree.
    fn next_right(&self, v: usize) -> Option<usize> {
        self.children(v).last().copied().or(self.state[v].thread)
    }

    /// Buchheim first walk: bottom-up assignment of preliminary x-coordinates.
    fn first_walk(&mut self, v: usize) {
        let children = self.children(v);

        if children.is_empty() {
            // Leaf node: position relative to left sibling
            self.state[v].prelim = match self.left_sibling(v) {
                Some(w) => self.state[w].prelim + self.separation(v, w),
                None => 0.0,
            };
            return;
        }

        let mut default_ancestor = children[0];
        for &child in children {
            self.first_walk(child);
            default_ancestor = self.apportion(child, default_ancestor);
        }

        // Distribute extra space evenly among intermediate children
        self.execute_shifts(v);

        // Center parent over first and last children
        let first = self.state[children[0]].prelim;
        let last = self.state[children[children.len() - 1]].prelim;
        let midpoint = (first + last) / 2.0;

        match self.left_sibling(v) {
            Some(w) => {
                let prelim = self.state[w].prelim + self.separation(v, w);
                self.state[v].prelim = prelim;
                self.state[v].modifier = prelim - midpoint;
            }
            None => self.state[v].prelim = midpoint,
        }
    }

    /// Apportion: push `v`'s subtree right until it clears every subtree to
    /// its left, spreading the shift over intermediate siblings. This is the
    /// core of Buchheim's linear-time improvement over Walker's algorithm.
    fn apportion(&mut self, v: usize, mut default_ancestor: usize) -> usize {
        let Some(w) = self.left_sibling(v) else {
            return default_ancestor;
        };
        let Some(leftmost) = self.parent(v).and_then(|p| self.children(p).first().copied())
        else {
            return default_ancestor;
        };

        // inner/outer contours on the right (of v) and left (of w) sides
        let mut v_inner_right = v;
        let mut v_outer_right = v;
        let mut v_inner_left = w;
        let mut v_outer_left = leftmost;

        let mut s_inner_right = self.state[v_inner_right].modifier;
        let mut s_outer_right = self.state[v_outer_right].modifier;
        let mut s_inner_left = self.state[v_inner_left].modifier;
        let mut s_outer_left = self.state[v_outer_left].modifier;

        while let (Some(il), Some(ir)) = (self.next_right(v_inner_left), self.next_left(v_inner_right))
        {
            v_inner_left = il;
            v_inner_right = ir;
            if let Some(next) = self.next_left(v_outer_left) {
                v_outer_left = next;
            }
            if let Some(next) = self.next_right(v_outer_right) {
                v_outer_right = next;
            }

            self.state[v_outer_right].ancestor = v;

            let shift = (self.state[v_inner_left].prelim + s_inner_left)
                - (self.state[v_inner_right].prelim + s_inner_right)
                + self.separation(v_inner_left, v_inner_right);

            if shift > 0.0 {
                let ancestor = self.greatest_distinct_ancestor(v_inner_left, v, default_ancestor);
                self.move_subtree(ancestor, v, shift);
                s_inner_right += shift;
                s_outer_right += shift;
            }

            s_inner_left += self.state[v_inner_left].modifier;
            s_inner_right += self.state[v_inner_right].modifier;
            s_outer_left += self.state[v_outer_left].modifier;
            s_outer_right += self.state[v_outer_right].modifier;
        }

        // Thread the shallower side onto the deeper one
        if let Some(next) = self.next_right(v_inner_left) {
            if self.next_right(v_outer_right).is_none() {
                self.state[v_outer_right].thread = Some(next);
                self.state[v_outer_right].modifier += s_inner_left - s_outer_right;
            }
        }

        if let Some(next) = self.next_left(v_inner_right) {
            if self.next_left(v_outer_left).is_none() {
                self.state[v_outer_left].thread = Some(next);
                self.state[v_outer_left].modifier += s_inner_right - s_outer_left;
                default_ancestor = v;
            }
        }

        default_ancestor
    }

    /// The sibling of `v` whose subtree contains `v_inner_left`, or the
    /// default ancestor when the recorded one is stale.
    fn greatest_distinct_ancestor(&self, v_inner_left: usize, v: usize, default_ancestor: usize) -> usize {
        let ancestor = self.state[v_inner_left].ancestor;
        if self.parent(ancestor) == self.parent(v) {
            ancestor
        } else {
            default_ancestor
        }
    }

    /// Move subtree: shift `wr` right and spread the shift over the siblings
    /// between `wl` and `wr`.
    fn move_subtree(&mut self, wl: usize, wr: usize, shift: f32) {
        let subtrees = (self.number(wr) as f32 - self.number(wl) as f32).max(1.0);
        let per_subtree = shift / subtrees;

        self.state[wr].change -= per_subtree;
        self.state[wr].shift += shift;
        self.state[wl].change += per_subtree;
        self.state[wr].prelim += shift;
        self.state[wr].modifier += shift;
    }

    /// Execute accumulated shifts for children of node v.
    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0f32;
        let mut change = 0.0f32;

        for &child in self.children(v).iter().rev() {
            self.state[child].prelim += shift;
            self.state[child].modifier += shift;
            change += self.state[child].change;
            shift += self.state[child].shift + change;
        }
    }

    /// Second walk: apply accumulated modifiers to get final x-coordinates.
    fn second_walk(&self, v: usize, modifier_sum: f32, final_x: &mut [f32]) {
        final_x[v] = self.state[v].prelim + modifier_sum;

        for &child in self.children(v) {
            self.second_walk(child, modifier_sum + self.state[v].modifier, final_x);
        }
    }
}
