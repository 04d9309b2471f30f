// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decal buffers handed to three.js

use ifc_ar_engine::DecalInstance;
use ifc_ar_geometry::DecalPatch;
use wasm_bindgen::prelude::*;

/// Projected decal geometry in decal-local space (matches a
/// `BufferGeometry` with position, normal and uv attributes)
#[wasm_bindgen]
pub struct DecalPatchJs {
    patch: DecalPatch,
}

#[wasm_bindgen]
impl DecalPatchJs {
    /// Get positions as Float32Array (copy to JS)
    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.patch.positions[..])
    }

    /// Get normals as Float32Array (copy to JS)
    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.patch.normals[..])
    }

    /// Get UVs as Float32Array (copy to JS)
    #[wasm_bindgen(getter)]
    pub fn uvs(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.patch.uvs[..])
    }

    #[wasm_bindgen(getter, js_name = triangleCount)]
    pub fn triangle_count(&self) -> usize {
        self.patch.triangle_count()
    }

    #[wasm_bindgen(getter, js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.patch.is_empty()
    }
}

impl From<DecalPatch> for DecalPatchJs {
    fn from(patch: DecalPatch) -> Self {
        Self { patch }
    }
}

/// A defect photo decal: geometry plus its world placement
#[wasm_bindgen]
pub struct DecalJs {
    defect_id: u64,
    position: [f64; 3],
    quaternion: [f64; 4],
    patch: DecalPatch,
}

#[wasm_bindgen]
impl DecalJs {
    #[wasm_bindgen(getter, js_name = defectId)]
    pub fn defect_id(&self) -> f64 {
        self.defect_id as f64
    }

    /// World position of the decal frame
    #[wasm_bindgen(getter)]
    pub fn position(&self) -> Vec<f64> {
        self.position.to_vec()
    }

    /// World orientation as `[x, y, z, w]`
    #[wasm_bindgen(getter)]
    pub fn quaternion(&self) -> Vec<f64> {
        self.quaternion.to_vec()
    }

    /// Geometry buffers
    #[wasm_bindgen(getter)]
    pub fn patch(&self) -> DecalPatchJs {
        DecalPatchJs::from(self.patch.clone())
    }
}

impl From<&DecalInstance> for DecalJs {
    fn from(decal: &DecalInstance) -> Self {
        let q = decal.orientation.quaternion();
        Self {
            defect_id: decal.defect_id,
            position: [decal.center.x, decal.center.y, decal.center.z],
            quaternion: [q.i, q.j, q.k, q.w],
            patch: decal.patch.clone(),
        }
    }
}
