//! FamilyTreeEngine - one snapshot, fully processed.
//!
//! The engine runs the whole pipeline once per input snapshot:
//! records → people → family index → normalized tree → flat arena → layout
//! → glyphs → spatial index. Everything is immutable afterwards; a new
//! snapshot means a new engine.

use serde::Serialize;
use tracing::info;

use crate::config::TreeConfig;
use crate::error::{FamilyTreeError, TreeWarning};
use crate::family::FamilyIndex;
use crate::layout::{TidyTreeLayout, TreeLayout};
use crate::person::{Person, PersonId, PersonRecord, people_from_records};
use crate::spatial::SpatialIndex;
use crate::tree::{FamilyTree, FlatTree, SlotKind, normalize};

/// One person circle as the renderer draws it.
///
/// Spouses are drawn beside their marriage node rather than at their own
/// person node, so a person may have several glyphs or none at their slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Glyph {
    pub person: PersonId,
    /// Flat-tree slot the glyph hangs off.
    pub slot: usize,
    pub x: f32,
    pub y: f32,
}

/// The processed family tree.
///
/// This struct owns:
/// - The family index (people, marriages, memberships)
/// - The normalized tree and its pre-order arena
/// - Slot positions from the tidy tree layout
/// - Person glyphs and the spatial index over them for hit testing
pub struct FamilyTreeEngine {
    config: TreeConfig,
    index: FamilyIndex,
    tree: FamilyTree,
    flat: FlatTree,
    layout: TreeLayout,
    glyphs: Vec<Glyph>,
    spatial: SpatialIndex,
}

impl FamilyTreeEngine {
    /// Build from raw sheet rows.
    pub fn build(records: Vec<PersonRecord>, config: TreeConfig) -> Result<Self, FamilyTreeError> {
        let people = people_from_records(records, &config.images)?;
        Self::from_people(people, config)
    }

    /// Build from already-typed people.
    pub fn from_people(people: Vec<Person>, config: TreeConfig) -> Result<Self, FamilyTreeError> {
        let index = FamilyIndex::build(people)?;
        let tree = normalize(&index, &config.normalize)?;
        let flat = FlatTree::from_root(&tree.root);
        let layout = TidyTreeLayout::new(config.layout.clone()).compute(&flat);
        let glyphs = place_glyphs(&flat, &layout, &config);

        let mut spatial = SpatialIndex::new();
        let points: Vec<_> = glyphs
            .iter()
            .enumerate()
            .map(|(i, glyph)| (i, glyph.x, glyph.y))
            .collect();
        spatial.rebuild(&points);

        info!(
            people = index.len(),
            marriages = index.marriages().len(),
            slots = flat.len(),
            glyphs = glyphs.len(),
            "family tree built"
        );

        Ok(Self {
            config,
            index,
            tree,
            flat,
            layout,
            glyphs,
            spatial,
        })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn index(&self) -> &FamilyIndex {
        &self.index
    }

    pub fn tree(&self) -> &FamilyTree {
        &self.tree
    }

    pub fn flat(&self) -> &FlatTree {
        &self.flat
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn warnings(&self) -> &[TreeWarning] {
        &self.tree.warnings
    }

    pub fn root_id(&self) -> &PersonId {
        &self.tree.root.person.id
    }

    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.index.person(id).map(|person| person.as_ref())
    }

    /// Every person-node slot for `id`, in pre-order.
    pub fn slots_for_person(&self, id: &PersonId) -> &[usize] {
        self.flat.slots_for_person(id)
    }

    /// The slot to focus when the interaction layer selects `id`.
    pub fn find_node_for_person(&self, id: &PersonId) -> Option<usize> {
        self.flat.first_slot_for_person(id)
    }

    pub fn position(&self, slot: usize) -> Option<(f32, f32)> {
        self.layout.position(slot)
    }

    /// The glyph under `(x, y)`, if any lies within the node radius.
    pub fn person_at(&self, x: f32, y: f32) -> Option<&Glyph> {
        self.spatial
            .nearest_within(x, y, self.config.glyphs.node_radius)
            .and_then(|i| self.glyphs.get(i))
    }

    /// Glyphs whose centers lie inside the rectangle.
    pub fn glyphs_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<&Glyph> {
        self.spatial
            .in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .filter_map(|i| self.glyphs.get(i))
            .collect()
    }

    /// Bounding box of all glyph centers as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        if self.glyphs.is_empty() {
            return None;
        }

        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for glyph in &self.glyphs {
            min_x = min_x.min(glyph.x);
            max_x = max_x.max(glyph.x);
            min_y = min_y.min(glyph.y);
            max_y = max_y.max(glyph.y);
        }

        Some((min_x, min_y, max_x, max_y))
    }
}

/// Glyph placement, in slot order: partners flank their marriage node and sit
/// slightly above it; non-spouse person nodes draw themselves.
fn place_glyphs(flat: &FlatTree, layout: &TreeLayout, config: &TreeConfig) -> Vec<Glyph> {
    let offset = config.glyphs.spouse_offset;
    let lift = config.glyphs.spouse_lift;
    let mut glyphs = Vec::new();

    for (slot, node) in flat.nodes().iter().enumerate() {
        let Some((x, y)) = layout.position(slot) else {
            continue;
        };
        match &node.kind {
            SlotKind::Person { id, is_spouse } => {
                if !is_spouse {
                    glyphs.push(Glyph {
                        person: id.clone(),
                        slot,
                        x,
                        y,
                    });
                }
            }
            SlotKind::Marriage { partners, .. } => {
                for (partner, dx) in partners.iter().zip([-offset, offset]) {
                    glyphs.push(Glyph {
                        person: partner.clone(),
                        slot,
                        x: x + dx,
                        y: y - lift,
                    });
                }
            }
        }
    }

    glyphs
}
