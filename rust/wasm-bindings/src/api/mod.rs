// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JavaScript API for the AR viewer
//!
//! The page owns the WebXR session and the three.js scene; [`ArViewer`] owns
//! the viewer state. Each XR frame the page samples the hit-test result and
//! the controller ray and calls `onFrame`; select events go to
//! `selectStart` / `selectEnd`.

mod defects;
mod events;
mod inspection;
mod loading;
mod session;

use crate::utils::JsClock;
use ifc_ar_core::ViewerConfig;
use ifc_ar_engine::Viewer;
use ifc_ar_geometry::Pose;
use ifc_ar_placement::{HitTestHost, PlaneId, SourceTicket};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Collects hit-test source requests so they can be handed back to the page
/// from `onFrame`
#[derive(Debug, Default)]
struct PendingSourceRequest {
    ticket: Option<SourceTicket>,
}

impl HitTestHost for PendingSourceRequest {
    fn request_hit_test_source(&mut self, ticket: SourceTicket) {
        self.ticket = Some(ticket);
    }
}

/// Main AR viewer API
#[wasm_bindgen]
pub struct ArViewer {
    // Shared with in-flight load promises
    viewer: Rc<RefCell<Viewer>>,
    source_request: PendingSourceRequest,
    frame_planes: Option<Vec<(PlaneId, Option<Pose>)>>,
}

#[wasm_bindgen]
impl ArViewer {
    /// Create a viewer. `config` is an optional (partial) config object:
    ///
    /// ```javascript
    /// const viewer = new ArViewer({ longPressMs: 600, decalSize: [0.3, 0.3, 0.3] });
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ArViewer, JsValue> {
        crate::utils::set_panic_hook();

        let config: ViewerConfig = if config.is_undefined() || config.is_null() {
            ViewerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        let viewer = Viewer::new(config, Box::new(JsClock))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self {
            viewer: Rc::new(RefCell::new(viewer)),
            source_request: PendingSourceRequest::default(),
            frame_planes: None,
        })
    }

    /// Latest status line for the info banner
    #[wasm_bindgen(getter, js_name = statusText)]
    pub fn status_text(&self) -> String {
        self.viewer.borrow().status().to_string()
    }

    #[wasm_bindgen(getter, js_name = hasModel)]
    pub fn has_model(&self) -> bool {
        self.viewer.borrow().has_model()
    }

    /// Get version string
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Convert any displayable error into a rejected JS value
fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Serialize with plain objects for maps, falling back to `null`
fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).unwrap_or(JsValue::NULL)
}
