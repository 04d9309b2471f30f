// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Defect log and photo decals

use super::events::{DefectFormJs, DefectSummaryJs};
use super::{js_error, to_js, ArViewer};
use crate::decal_js::DecalJs;
use crate::utils::BindingError;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
impl ArViewer {
    /// Defect log lines in creation order
    pub fn defects(&self) -> JsValue {
        let viewer = self.viewer.borrow();
        let summaries: Vec<DefectSummaryJs> = viewer
            .defect_summaries()
            .into_iter()
            .map(|summary| {
                let marker = viewer.defect_marker(summary.id);
                DefectSummaryJs::new(summary, marker)
            })
            .collect();
        to_js(&summaries)
    }

    /// Save the edit form, given as JSON
    /// (`{"description", "type", "criticality", "photo"}`). Resolves to the
    /// projected decal when the defect has a photo, otherwise `undefined`.
    #[wasm_bindgen(js_name = saveDefect)]
    pub fn save_defect(&self, id: f64, form_json: &str) -> Result<Option<DecalJs>, JsValue> {
        let form: DefectFormJs = serde_json::from_str(form_json).map_err(|e| BindingError::Invalid {
            name: "defect form",
            reason: e.to_string(),
        })?;

        let mut viewer = self.viewer.borrow_mut();
        let decal = viewer
            .save_defect(id as u64, form.into())
            .map_err(js_error)?;
        Ok(decal.map(DecalJs::from))
    }

    /// Close the edit form without saving. Returns `true` when the blank
    /// defect (and its marker) was removed.
    #[wasm_bindgen(js_name = cancelDefect)]
    pub fn cancel_defect(&self, id: f64) -> Result<bool, JsValue> {
        self.viewer
            .borrow_mut()
            .cancel_defect(id as u64)
            .map_err(js_error)
    }

    /// Radius of the defect marker spheres, in metres
    #[wasm_bindgen(getter, js_name = markerRadius)]
    pub fn marker_radius(&self) -> f64 {
        self.viewer.borrow().config().marker_radius
    }

    #[wasm_bindgen(getter, js_name = decalCount)]
    pub fn decal_count(&self) -> usize {
        self.viewer.borrow().decals().len()
    }

    /// Decal at index
    pub fn decal(&self, index: usize) -> Option<DecalJs> {
        self.viewer.borrow().decals().get(index).map(DecalJs::from)
    }
}
