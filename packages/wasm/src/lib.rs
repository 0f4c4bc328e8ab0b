//! Family Tree - WASM Module
//!
//! This module turns a genealogy snapshot (tabular person records linked by
//! parent and spouse ids) into a strict rooted tree, lays it out, and exposes
//! the result to the browser renderer via wasm-bindgen.
//!
//! # Architecture
//!
//! - `person`: Typed person records and lenient row loading
//! - `family`: Relationship indexing (marriages, memberships, ancestry check)
//! - `tree`: Graph → tree normalization and the flat pre-order arena
//! - `layout`: Tidy tree layout (Buchheim's O(n) algorithm)
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//! - `engine`: The whole pipeline, run once per snapshot
//! - `logging`: `tracing` subscriber writing to the browser console

use js_sys::Float32Array;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod engine;
pub mod error;
pub mod family;
pub mod layout;
pub mod logging;
pub mod person;
pub mod spatial;
pub mod tree;

#[cfg(test)]
mod test_support;

use config::TreeConfig;
use engine::FamilyTreeEngine;
use person::{PersonId, PersonRecord};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(LevelFilter::INFO);
}

/// Main entry point for the family tree.
///
/// This struct wraps the internal FamilyTreeEngine and provides the public
/// API exposed to JavaScript. Slots are indices into the pre-order arena of
/// the normalized tree; slot 0 is the root.
#[wasm_bindgen]
pub struct FamilyTreeWasm {
    engine: FamilyTreeEngine,
}

#[wasm_bindgen]
impl FamilyTreeWasm {
    /// Build the tree from an array of sheet rows.
    ///
    /// `config` may be `undefined`, `null`, or a partial `TreeConfig`.
    /// Structural errors (duplicate ids, no root, ancestry cycles) are thrown.
    #[wasm_bindgen(constructor)]
    pub fn new(records: JsValue, config: JsValue) -> Result<FamilyTreeWasm, JsError> {
        let records: Vec<PersonRecord> = serde_wasm_bindgen::from_value(records)?;
        let config: TreeConfig = if config.is_undefined() || config.is_null() {
            TreeConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        Ok(Self {
            engine: FamilyTreeEngine::build(records, config)?,
        })
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// The root person's id.
    #[wasm_bindgen(js_name = rootId)]
    pub fn root_id(&self) -> String {
        self.engine.root_id().to_string()
    }

    /// The normalized tree as nested objects, ready for `d3.hierarchy`.
    pub fn tree(&self) -> Result<JsValue, JsError> {
        to_js(&self.engine.tree().root)
    }

    /// Non-fatal warnings raised while building.
    pub fn warnings(&self) -> Vec<String> {
        self.engine.warnings().iter().map(ToString::to_string).collect()
    }

    /// Ids of people that appear nowhere in the tree.
    pub fn unreachable(&self) -> Vec<String> {
        self.engine
            .tree()
            .unreachable
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Get the number of slots in the tree, marriage nodes included.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.engine.flat().len() as u32
    }

    /// Directed parent → child slot pairs as [parent0, child0, parent1, child1, ...].
    #[wasm_bindgen(js_name = getEdges)]
    pub fn get_edges(&self) -> Vec<u32> {
        self.engine
            .flat()
            .edges()
            .into_iter()
            .flat_map(|(parent, child)| [parent as u32, child as u32])
            .collect()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Every person-node slot for `id`. A person appears once per marriage
    /// that reaches them.
    #[wasm_bindgen(js_name = nodesForPerson)]
    pub fn nodes_for_person(&self, id: &str) -> Vec<u32> {
        self.engine
            .slots_for_person(&PersonId::from(id))
            .iter()
            .map(|&slot| slot as u32)
            .collect()
    }

    /// The slot to focus when `id` is selected, falling back to the first
    /// marriage they are drawn beside.
    #[wasm_bindgen(js_name = findNodeForPerson)]
    pub fn find_node_for_person(&self, id: &str) -> Option<u32> {
        self.engine
            .find_node_for_person(&PersonId::from(id))
            .map(|slot| slot as u32)
    }

    /// Attributes of one person, or `undefined`.
    #[wasm_bindgen(js_name = personDetails)]
    pub fn person_details(&self, id: &str) -> Result<JsValue, JsError> {
        match self.engine.person(&PersonId::from(id)) {
            Some(person) => to_js(person),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Slot positions as a Float32Array [x0, y0, x1, y1, ...].
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Float32Array {
        Float32Array::from(&self.engine.layout().interleaved()[..])
    }

    /// Person glyphs as `[{ person, slot, x, y }, ...]`.
    #[wasm_bindgen(js_name = getGlyphs)]
    pub fn get_glyphs(&self) -> Result<JsValue, JsError> {
        to_js(self.engine.glyphs())
    }

    /// Get the bounding box of all glyphs.
    ///
    /// Returns [min_x, min_y, max_x, max_y], or None if nothing is drawn.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f32>> {
        self.engine
            .bounds()
            .map(|(min_x, min_y, max_x, max_y)| vec![min_x, min_y, max_x, max_y])
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// The person drawn under a point, or None.
    #[wasm_bindgen(js_name = personAt)]
    pub fn person_at(&self, x: f32, y: f32) -> Option<String> {
        self.engine.person_at(x, y).map(|glyph| glyph.person.to_string())
    }

    /// Ids of people drawn inside a rectangular region, in glyph order.
    #[wasm_bindgen(js_name = peopleInRect)]
    pub fn people_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<String> {
        self.engine
            .glyphs_in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(|glyph| glyph.person.to_string())
            .collect()
    }
}

/// Plain JS objects rather than `Map`s, so the renderer can use dot access.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

#[cfg(test)]
mod integration_tests {
    use serde_json::json;

    use super::*;
    use crate::config::MarriageOrder;
    use crate::error::{FamilyTreeError, TreeWarning};
    use crate::test_support::three_generations;
    use crate::tree::{SlotKind, TreeNode};

    fn id(s: &str) -> PersonId {
        PersonId::from(s)
    }

    fn build(records: Vec<PersonRecord>) -> FamilyTreeEngine {
        FamilyTreeEngine::build(records, TreeConfig::default()).unwrap()
    }

    #[test]
    fn test_rows_from_json_to_positions() {
        let records: Vec<PersonRecord> = serde_json::from_value(json!([
            { "ID": "P1", "Name": "Ravi", "Gender": "Male", "MarriedToID": "P2" },
            { "ID": "P2", "Name": "Asha", "Gender": "Female", "YearOfMarriage": "1958" },
            { "ID": "C1", "Name": "Kiran", "FatherID": "P1", "MotherID": "P2", "Image": "kiran.png" },
        ]))
        .unwrap();
        let engine = build(records);

        // The explicit spouse link and the co-parent pair give one marriage
        assert_eq!(engine.index().marriages().len(), 1);
        assert_eq!(engine.flat().len(), 3);
        assert_eq!(engine.layout().interleaved(), vec![0.0, 0.0, 0.0, 200.0, 0.0, 400.0]);
        assert_eq!(
            engine.person(&id("C1")).unwrap().image,
            "assets/images/kiran.png"
        );
    }

    #[test]
    fn test_tree_serializes_for_renderer() {
        let engine = build(vec![
            PersonRecord::new("P1").named("Ravi"),
            PersonRecord::new("P2").named("Asha"),
            PersonRecord::new("C1").named("Kiran").child_of("P1", "P2"),
        ]);
        let value = serde_json::to_value(&engine.tree().root).unwrap();

        assert_eq!(value["type"], "person");
        assert_eq!(value["key"], "P1");
        assert_eq!(value["isSpouse"], true);
        assert_eq!(value["person"]["Name"], "Ravi");

        let family = &value["children"][0];
        assert_eq!(family["type"], "family");
        assert_eq!(family["ID"], "FAM_P1_P2");
        assert_eq!(family["partners"][1]["ID"], "P2");
        assert_eq!(family["key"], "P1/FAM_P1_P2");
        assert_eq!(family["children"][0]["key"], "P1/FAM_P1_P2/C1");
        assert_eq!(family["children"][0]["children"], json!([]));
    }

    #[test]
    fn test_every_slot_has_one_parent() {
        let engine = build(three_generations());
        let flat = engine.flat();

        let mut incoming = vec![0; flat.len()];
        for (_, child) in flat.edges() {
            incoming[child] += 1;
        }
        assert_eq!(incoming[0], 0);
        assert!(incoming[1..].iter().all(|&n| n == 1));
    }

    #[test]
    fn test_remarried_person_duplicated_per_marriage() {
        // Cousins B1 and B2 marry; their child sits under both lineages.
        let engine = build(vec![
            PersonRecord::new("G1"),
            PersonRecord::new("G2"),
            PersonRecord::new("A1").child_of("G1", "G2"),
            PersonRecord::new("A2").child_of("G1", "G2"),
            PersonRecord::new("S1"),
            PersonRecord::new("S2"),
            PersonRecord::new("B1").child_of("A1", "S1"),
            PersonRecord::new("B2").child_of("A2", "S2"),
            PersonRecord::new("K").child_of("B1", "B2"),
        ]);

        let slots = engine.slots_for_person(&id("K"));
        assert_eq!(slots.len(), 2);
        let keys: Vec<&str> = slots
            .iter()
            .map(|&slot| engine.flat().nodes()[slot].key.as_str())
            .collect();
        assert_eq!(
            keys,
            vec![
                "G1/FAM_G1_G2/A1/FAM_A1_S1/B1/FAM_B1_B2/K",
                "G1/FAM_G1_G2/A2/FAM_A2_S2/B2/FAM_B1_B2/K",
            ]
        );

        // Each appearance hangs off a different marriage node
        let parents: Vec<_> = slots
            .iter()
            .map(|&slot| engine.flat().nodes()[slot].parent)
            .collect();
        assert_ne!(parents[0], parents[1]);
        assert_eq!(engine.tree().find_person(&id("K")).len(), 2);
    }

    #[test]
    fn test_ambiguous_root_and_unreachable() {
        let engine = build(vec![
            PersonRecord::new("P1"),
            PersonRecord::new("P2"),
            PersonRecord::new("C1").child_of("P1", "P2"),
            PersonRecord::new("X1"),
            PersonRecord::new("O1").father("P1"),
        ]);

        assert_eq!(engine.root_id(), &id("P1"));
        assert_eq!(
            engine.warnings(),
            &[TreeWarning::AmbiguousRoot {
                chosen: id("P1"),
                others: vec![id("P2"), id("X1")],
            }]
        );
        assert_eq!(engine.tree().unreachable, vec![id("X1"), id("O1")]);
    }

    #[test]
    fn test_structural_errors_abort() {
        let cycle = vec![
            PersonRecord::new("R"),
            PersonRecord::new("A").child_of("B", "R"),
            PersonRecord::new("B").child_of("A", "R"),
        ];
        assert!(matches!(
            FamilyTreeEngine::build(cycle, TreeConfig::default()),
            Err(FamilyTreeError::AncestryCycle { .. })
        ));

        let rootless = vec![
            PersonRecord::new("A").child_of("B", "C"),
            PersonRecord::new("B").child_of("A", "C"),
            PersonRecord::new("C").child_of("A", "B"),
        ];
        assert!(FamilyTreeEngine::build(rootless, TreeConfig::default()).is_err());
    }

    #[test]
    fn test_marriage_year_order() {
        let records = || {
            vec![
                PersonRecord::new("P1"),
                PersonRecord::new("W1").married_to("P1").married_in(1980),
                PersonRecord::new("W2").married_to("P1").married_in(1960),
            ]
        };
        let marriage_ids = |engine: &FamilyTreeEngine| -> Vec<String> {
            engine.flat().nodes()[0]
                .children
                .iter()
                .filter_map(|&slot| match &engine.flat().nodes()[slot].kind {
                    SlotKind::Marriage { id, .. } => Some(id.to_string()),
                    SlotKind::Person { .. } => None,
                })
                .collect()
        };

        let discovery = build(records());
        assert_eq!(marriage_ids(&discovery), vec!["FAM_P1_W1", "FAM_P1_W2"]);

        let mut config = TreeConfig::default();
        config.normalize.marriage_order = MarriageOrder::Year;
        let by_year = FamilyTreeEngine::build(records(), config).unwrap();
        assert_eq!(marriage_ids(&by_year), vec!["FAM_P1_W2", "FAM_P1_W1"]);
    }

    #[test]
    fn test_tree_walk_matches_flat_order() {
        let engine = build(three_generations());
        let mut keys = Vec::new();
        TreeNode::from(&engine.tree().root).walk(&mut |node| keys.push(node.key().to_owned()));

        let flat_keys: Vec<String> = engine.flat().nodes().iter().map(|n| n.key.clone()).collect();
        assert_eq!(keys, flat_keys);
    }
}
