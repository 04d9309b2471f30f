// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element info, selection styling, model visibility, the plane overlay
//! and standalone decal projection

use super::events::{AppearanceJs, ElementInfoJs};
use super::{to_js, ArViewer};
use crate::decal_js::DecalPatchJs;
use crate::utils::{pose_matrix, to_point, to_rotation, to_vector};
use ifc_ar_geometry::{project, DecalBox, Mesh, SceneNode};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct PlaneJs {
    id: f64,
    matrix: Vec<f64>,
}

#[wasm_bindgen]
impl ArViewer {
    /// Project a decal onto world-space mesh buffers.
    ///
    /// `center` is `[x, y, z]`, `quaternion` is `[x, y, z, w]`, `size` the
    /// full box extents. Malformed buffers produce an empty patch.
    pub fn project(
        &self,
        positions: Vec<f32>,
        normals: Vec<f32>,
        indices: Option<Vec<u32>>,
        center: Vec<f64>,
        quaternion: Vec<f64>,
        size: Vec<f64>,
    ) -> Result<DecalPatchJs, JsValue> {
        let decal = DecalBox::new(
            to_point("center", &center)?,
            to_rotation("quaternion", &quaternion)?,
            to_vector("size", &size)?,
        );
        let source = SceneNode::mesh(
            "source",
            Mesh {
                positions,
                normals,
                indices,
            },
        );
        Ok(DecalPatchJs::from(project(&source, &decal)))
    }

    /// Info panel content for an element
    #[wasm_bindgen(js_name = elementInfo)]
    pub fn element_info(&self, global_id: &str) -> JsValue {
        let info = self.viewer.borrow().element_info(global_id);
        to_js(&ElementInfoJs::from(info))
    }

    /// GlobalId of the selected element
    #[wasm_bindgen(getter, js_name = selectedId)]
    pub fn selected_id(&self) -> Option<String> {
        self.viewer
            .borrow()
            .selection()
            .global_id()
            .map(str::to_string)
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&self) {
        self.viewer.borrow_mut().clear_selection();
    }

    /// `[{ path, mode, opacity }]` for every mesh node
    pub fn appearances(&self) -> JsValue {
        let viewer = self.viewer.borrow();
        let list: Vec<AppearanceJs> = viewer
            .appearances()
            .iter()
            .map(|(path, appearance)| AppearanceJs::new(path, *appearance))
            .collect();
        to_js(&list)
    }

    #[wasm_bindgen(js_name = setModelVisible)]
    pub fn set_model_visible(&self, visible: bool) {
        self.viewer.borrow_mut().set_model_visible(visible);
    }

    #[wasm_bindgen(getter, js_name = modelVisible)]
    pub fn model_visible(&self) -> bool {
        self.viewer.borrow().model_visible()
    }

    /// Model opacity, clamped to `0..=1`
    #[wasm_bindgen(js_name = setModelOpacity)]
    pub fn set_model_opacity(&self, opacity: f32) {
        self.viewer.borrow_mut().set_model_opacity(opacity);
    }

    #[wasm_bindgen(getter, js_name = modelOpacity)]
    pub fn model_opacity(&self) -> f32 {
        self.viewer.borrow().model_opacity()
    }

    #[wasm_bindgen(js_name = setDebugPlanes)]
    pub fn set_debug_planes(&self, enabled: bool) {
        self.viewer.borrow_mut().set_debug_planes(enabled);
        crate::utils::console_debug(&format!("[ifc-ar] plane overlay {enabled}"));
    }

    /// Tracked planes as `[{ id, matrix }]`
    #[wasm_bindgen(js_name = debugPlanes)]
    pub fn debug_planes(&self) -> JsValue {
        let viewer = self.viewer.borrow();
        let planes: Vec<PlaneJs> = viewer
            .planes()
            .iter()
            .map(|(id, pose)| PlaneJs {
                id: *id as f64,
                matrix: pose_matrix(pose),
            })
            .collect();
        to_js(&planes)
    }
}
