// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Browser-side smoke tests (`wasm-pack test --headless --chrome`)

#![cfg(target_arch = "wasm32")]

use ifc_ar_wasm::ArViewer;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn new_viewer_is_idle() {
    let viewer = ArViewer::new(JsValue::UNDEFINED).unwrap();
    assert_eq!(viewer.placement_state(), "idle");
    assert!(!viewer.has_model());
    assert_eq!(viewer.model_transform().len(), 16);
}

#[wasm_bindgen_test]
fn alignment_needs_a_model() {
    let viewer = ArViewer::new(JsValue::NULL).unwrap();
    assert!(viewer.start_alignment().is_err());
    assert_eq!(viewer.placement_state(), "idle");
}

#[wasm_bindgen_test]
fn projects_flat_quad() {
    let viewer = ArViewer::new(JsValue::UNDEFINED).unwrap();
    let positions = vec![
        -0.1, -0.1, 0.0, 0.1, -0.1, 0.0, 0.1, 0.1, 0.0, -0.1, 0.1, 0.0,
    ];
    let normals = [0.0f32, 0.0, 1.0].repeat(4);
    let patch = viewer
        .project(
            positions,
            normals,
            Some(vec![0, 1, 2, 0, 2, 3]),
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
            vec![0.5, 0.5, 0.5],
        )
        .unwrap();
    assert_eq!(patch.triangle_count(), 2);
}
