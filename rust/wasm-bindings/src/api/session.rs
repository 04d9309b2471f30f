// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XR session, per-frame and gesture entry points

use super::events::{EventJs, FrameResultJs};
use super::{js_error, to_js, ArViewer};
use crate::utils::{pose_matrix, to_point, to_pose, to_vector};
use ifc_ar_engine::{FrameInput, Viewer, ViewerEvent};
use ifc_ar_geometry::Ray;
use ifc_ar_placement::SourceTicket;
use wasm_bindgen::prelude::*;

fn ticket(value: f64) -> SourceTicket {
    SourceTicket {
        session: value as u64,
    }
}

fn event_to_js(viewer: &Viewer, event: Option<ViewerEvent>) -> Option<EventJs> {
    event.map(|event| EventJs::from_event(event, |id| viewer.defect(id).zip(viewer.defect_marker(id))))
}

#[wasm_bindgen]
impl ArViewer {
    /// Enter two-point alignment (floor, then wall)
    #[wasm_bindgen(js_name = startAlignment)]
    pub fn start_alignment(&self) -> Result<(), JsValue> {
        self.viewer.borrow_mut().start_alignment().map_err(js_error)
    }

    #[wasm_bindgen(js_name = cancelAlignment)]
    pub fn cancel_alignment(&self) {
        self.viewer.borrow_mut().cancel_alignment();
    }

    /// Advance placement as if the user tapped; returns the event object
    pub fn confirm(&self) -> JsValue {
        let outcome = self.viewer.borrow_mut().confirm();
        to_js(&EventJs::placement(outcome))
    }

    /// `"idle"`, `"waitingForFloor"` or `"waitingForWall"`
    #[wasm_bindgen(js_name = placementState)]
    pub fn placement_state(&self) -> String {
        self.viewer.borrow().placement_state().to_string()
    }

    #[wasm_bindgen(getter, js_name = isPlaced)]
    pub fn is_placed(&self) -> bool {
        self.viewer.borrow().placement().is_placed()
    }

    /// Column-major model root matrix (16 numbers)
    #[wasm_bindgen(js_name = modelTransform)]
    pub fn model_transform(&self) -> Vec<f64> {
        self.viewer.borrow().model_transform().to_column_major().to_vec()
    }

    /// Rotation slider, radians about the vertical axis
    #[wasm_bindgen(js_name = rotateModel)]
    pub fn rotate_model(&self, radians: f64) {
        self.viewer.borrow_mut().rotate_model(radians);
    }

    /// Scale slider
    #[wasm_bindgen(js_name = scaleModel)]
    pub fn scale_model(&self, scale: f64) {
        self.viewer.borrow_mut().scale_model(scale);
    }

    #[wasm_bindgen(js_name = sessionStart)]
    pub fn session_start(&mut self) {
        self.source_request.ticket = None;
        self.frame_planes = None;
        self.viewer.borrow_mut().session_started();
    }

    #[wasm_bindgen(js_name = sessionEnd)]
    pub fn session_end(&mut self) {
        self.source_request.ticket = None;
        self.frame_planes = None;
        self.viewer.borrow_mut().session_ended();
    }

    /// Report the hit-test source negotiated for `ticket`
    #[wasm_bindgen(js_name = resolveHitTestSource)]
    pub fn resolve_hit_test_source(&self, ticket_id: f64, source_id: u32) -> Result<(), JsValue> {
        self.viewer
            .borrow_mut()
            .resolve_hit_test_source(ticket(ticket_id), Ok(source_id))
            .map_err(js_error)
    }

    /// Report that negotiation for `ticket` failed. Placement stays inert
    /// until the next session.
    #[wasm_bindgen(js_name = rejectHitTestSource)]
    pub fn reject_hit_test_source(&self, ticket_id: f64, message: String) -> Result<(), JsValue> {
        crate::utils::console_warn(&format!("[ifc-ar] hit-test source failed: {message}"));
        self.viewer
            .borrow_mut()
            .resolve_hit_test_source(ticket(ticket_id), Err(message))
            .map_err(js_error)
    }

    /// Detected planes for the next frame: ids plus 16 numbers per plane
    /// (NaN-filled when the pose is unavailable this frame)
    #[wasm_bindgen(js_name = setFramePlanes)]
    pub fn set_frame_planes(&mut self, ids: Vec<f64>, matrices: Vec<f64>) -> Result<(), JsValue> {
        if matrices.len() != ids.len() * 16 {
            return Err(JsValue::from_str("setFramePlanes: expected 16 numbers per plane"));
        }
        let planes = ids
            .iter()
            .zip(matrices.chunks_exact(16))
            .map(|(&id, m)| (id as u64, to_pose("plane matrix", m).ok()))
            .collect();
        self.frame_planes = Some(planes);
        Ok(())
    }

    /// Per-frame step.
    ///
    /// `hitPoseMatrix` is the best viewer-space hit (column-major), the ray
    /// arguments describe the controller target ray in world space. Returns a
    /// frame result object with a hit-test source request, the reticle and
    /// any gesture event that fired.
    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(
        &mut self,
        hit_pose_matrix: Option<Vec<f64>>,
        ray_origin: Option<Vec<f64>>,
        ray_direction: Option<Vec<f64>>,
    ) -> Result<JsValue, JsValue> {
        let hit_pose = hit_pose_matrix
            .map(|m| to_pose("hitPoseMatrix", &m))
            .transpose()?;
        let controller_ray = match (ray_origin, ray_direction) {
            (Some(origin), Some(direction)) => Ray::new(
                to_point("rayOrigin", &origin)?,
                to_vector("rayDir", &direction)?,
            ),
            _ => None,
        };
        let frame = FrameInput {
            hit_pose,
            controller_ray,
            planes: self.frame_planes.take(),
        };

        let mut viewer = self.viewer.borrow_mut();
        let event = viewer.on_frame(&mut self.source_request, &frame);

        let reticle = *viewer.placement().reticle();
        let result = FrameResultJs {
            request_hit_test_source: FrameResultJs::ticket(self.source_request.ticket.take()),
            reticle_visible: reticle.visible,
            reticle_matrix: reticle
                .valid_pose()
                .map(|pose| pose_matrix(&pose)),
            model_matrix: viewer.model_transform().to_column_major().to_vec(),
            event: event_to_js(&viewer, event),
        };
        Ok(to_js(&result))
    }

    /// Controller `selectstart`; returns an event object or `null`
    #[wasm_bindgen(js_name = selectStart)]
    pub fn select_start(&self) -> JsValue {
        let mut viewer = self.viewer.borrow_mut();
        let event = viewer.select_start();
        event_to_js(&viewer, event)
            .map(|e| to_js(&e))
            .unwrap_or(JsValue::NULL)
    }

    /// Controller `selectend`; returns an event object or `null`
    #[wasm_bindgen(js_name = selectEnd)]
    pub fn select_end(&self) -> JsValue {
        let mut viewer = self.viewer.borrow_mut();
        let event = viewer.select_end();
        event_to_js(&viewer, event)
            .map(|e| to_js(&e))
            .unwrap_or(JsValue::NULL)
    }
}
