//! Configuration passed in from JS.
//!
//! Every section derives `Default` and deserializes with `#[serde(default)]`,
//! so callers may pass `undefined`, `{}`, or any partial object.

use serde::Deserialize;

use crate::person::Gender;

/// Top-level configuration for one build of the family tree.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeConfig {
    pub layout: LayoutConfig,
    pub images: ImageConfig,
    pub glyphs: GlyphConfig,
    pub normalize: NormalizeConfig,
}

/// Spacing for the tidy tree layout.
///
/// Defaults match `d3.tree().nodeSize([180, 200])` with d3's default
/// separation (1 for siblings, 2 otherwise).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Horizontal distance between adjacent siblings, in pixels.
    pub node_width: f32,
    /// Vertical distance between generations, in pixels.
    pub level_height: f32,
    /// Separation (in node widths) between siblings.
    pub sibling_separation: f32,
    /// Separation (in node widths) between neighbouring subtrees.
    pub subtree_separation: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            level_height: 200.0,
            sibling_separation: 1.0,
            subtree_separation: 2.0,
        }
    }
}

/// How image tokens become asset URLs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageConfig {
    pub base_url: String,
    pub extension: String,
    pub fallback_prefix: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: "assets/images/".to_owned(),
            extension: "jpg".to_owned(),
            fallback_prefix: "def".to_owned(),
        }
    }
}

impl ImageConfig {
    /// URL for an explicit image token.
    pub fn resolve(&self, token: &str) -> String {
        format!("{}{}", self.base_url, token)
    }

    /// Deterministic per-gender fallback, e.g. `assets/images/defFemale.jpg`.
    pub fn fallback_url(&self, gender: Gender) -> String {
        format!(
            "{}{}{}.{}",
            self.base_url,
            self.fallback_prefix,
            gender.fallback_label(),
            self.extension
        )
    }
}

/// Geometry of the person glyphs drawn by the renderer, used for hit testing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlyphConfig {
    /// Radius of a person circle.
    pub node_radius: f32,
    /// Horizontal offset of each partner from its marriage node.
    pub spouse_offset: f32,
    /// Partners sit this far above their marriage node.
    pub spouse_lift: f32,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            node_radius: 32.0,
            spouse_offset: 80.0,
            spouse_lift: 50.0,
        }
    }
}

/// Order in which a person's marriages become children of their node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarriageOrder {
    /// First-discovered order while scanning the input.
    #[default]
    Discovery,
    /// By `YearOfMarriage`, undated marriages last, ties in discovery order.
    Year,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizeConfig {
    pub marriage_order: MarriageOrder,
}
