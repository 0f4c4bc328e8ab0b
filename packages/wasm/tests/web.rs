//! Browser tests for the JS surface. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use family_tree_wasm::FamilyTreeWasm;
use js_sys::{JSON, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn family() -> JsValue {
    JSON::parse(
        r#"[
            { "ID": "P1", "Name": "Ravi", "Gender": "Male" },
            { "ID": "P2", "Name": "Asha", "Gender": "Female" },
            { "ID": "C1", "Name": "Kiran", "FatherID": "P1", "MotherID": "P2", "YearOfBirth": 1960 },
            { "ID": "C2", "Name": "Latha", "FatherID": "P1", "MotherID": "P2" }
        ]"#,
    )
    .unwrap()
}

fn build(rows: JsValue, config: JsValue) -> FamilyTreeWasm {
    FamilyTreeWasm::new(rows, config).map_err(JsValue::from).unwrap()
}

fn get(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn builds_with_default_config() {
    let tree = build(family(), JsValue::UNDEFINED);

    assert_eq!(tree.root_id(), "P1");
    assert_eq!(tree.node_count(), 4);
    assert_eq!(tree.get_edges(), vec![0, 1, 1, 2, 1, 3]);
    assert_eq!(tree.warnings().len(), 1);

    let positions = tree.get_positions().to_vec();
    assert_eq!(positions.len(), 8);
    assert_eq!(&positions[..4], &[0.0, 0.0, 0.0, 200.0]);
    assert_eq!(&positions[4..], &[-90.0, 400.0, 90.0, 400.0]);
}

#[wasm_bindgen_test]
fn partial_config_overrides_spacing() {
    let config = JSON::parse(r#"{ "layout": { "nodeWidth": 100, "levelHeight": 50 } }"#).unwrap();
    let tree = build(family(), config);

    let positions = tree.get_positions().to_vec();
    assert_eq!(&positions[4..], &[-50.0, 100.0, 50.0, 100.0]);
}

#[wasm_bindgen_test]
fn tree_is_plain_objects() {
    let tree = build(family(), JsValue::NULL);
    let root = tree.tree().map_err(JsValue::from).unwrap();

    assert_eq!(get(&root, "type"), "person");
    let family = Reflect::get_u32(&get(&root, "children"), 0).unwrap();
    assert_eq!(get(&family, "type"), "family");
    assert_eq!(get(&family, "ID"), "FAM_P1_P2");
}

#[wasm_bindgen_test]
fn lookup_and_hit_testing() {
    let tree = build(family(), JsValue::UNDEFINED);

    assert_eq!(tree.nodes_for_person("C2"), vec![3]);
    assert_eq!(tree.find_node_for_person("P2"), Some(1));
    assert_eq!(tree.person_at(90.0, 400.0), Some("C2".to_string()));
    assert_eq!(tree.person_at(-80.0, 150.0), Some("P1".to_string()));
    assert_eq!(tree.person_at(1000.0, 1000.0), None);

    let details = tree.person_details("C1").map_err(JsValue::from).unwrap();
    assert_eq!(get(&details, "YearOfBirth"), 1960);
    assert!(tree.person_details("nobody").map_err(JsValue::from).unwrap().is_undefined());
}

#[wasm_bindgen_test]
fn duplicate_ids_throw() {
    let rows = JSON::parse(r#"[{ "ID": "P9" }, { "ID": "P9" }]"#).unwrap();
    assert!(FamilyTreeWasm::new(rows, JsValue::UNDEFINED).is_err());
}
