// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The viewer context
//!
//! [`Viewer`] owns every piece of mutable state: the loaded model and its
//! metadata, placement, gestures, selection, defects and decals. The host
//! calls into it from exactly two places, the per-frame callback
//! ([`Viewer::on_frame`]) and input handlers, both on one thread. The frame
//! path never awaits; only [`Viewer::load_bundle`] is async.

use crate::annotations::{project_defect_decal, upsert_decal, DecalInstance, DefectMarker};
use crate::error::{Error, Result};
use crate::loader::{prepare_bundle, LoadTicket, LoadedModel, SceneDecoder};
use crate::selection::{Appearance, Selection, SelectionChange};
use ifc_ar_core::{
    Attachment, BimMetadata, BundleEntry, DefectEdit, DefectLog, DefectRecord, DefectSummary,
    ElementInfo, ViewerConfig,
};
use ifc_ar_geometry::{raycast, ModelTransform, NodePath, Pose, Ray, RayHit, SceneNode, Vector3};
use ifc_ar_placement::{
    Clock, ConfirmOutcome, Gesture, GestureRecognizer, HitTestFrame, HitTestHost,
    PlacementController, PlacementState, PlaneChanges, PlaneId, PlaneTracker, SourceId,
    SourceTicket,
};

const STATUS_READY: &str = "Load a model to begin.";
const STATUS_LOADED: &str = "Model loaded. Start AR and tap a surface to place it.";

/// What the host sampled for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Best hit of the viewer-space hit-test source, if any
    pub hit_pose: Option<Pose>,
    /// Controller target ray in world space
    pub controller_ray: Option<Ray>,
    /// Detected planes, when the runtime reports them
    pub planes: Option<Vec<(PlaneId, Option<Pose>)>>,
}

impl HitTestFrame for FrameInput {
    fn best_hit(&self, _source: SourceId) -> Option<Pose> {
        self.hit_pose
    }
}

/// Something the UI should react to
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    Placement(ConfirmOutcome),
    /// Result of a double tap; `info` describes the element under the ray
    Selection {
        change: SelectionChange,
        info: Option<ElementInfo>,
    },
    /// A long press created a defect; open its edit form
    DefectOpened(u64),
}

/// Single owner of the viewer state
pub struct Viewer {
    config: ViewerConfig,
    clock: Box<dyn Clock>,
    model: Option<SceneNode>,
    metadata: BimMetadata,
    load_generation: u64,
    placement: PlacementController,
    gestures: GestureRecognizer,
    selection: Selection,
    defects: DefectLog,
    decals: Vec<DecalInstance>,
    planes: PlaneTracker,
    debug_planes: bool,
    model_visible: bool,
    model_opacity: f32,
    controller_ray: Option<Ray>,
    status: String,
}

impl Viewer {
    pub fn new(config: ViewerConfig, clock: Box<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            placement: PlacementController::new(config.degenerate_epsilon),
            gestures: GestureRecognizer::new(config.long_press_ms, config.double_tap_ms),
            config,
            clock,
            model: None,
            metadata: BimMetadata::default(),
            load_generation: 0,
            selection: Selection::default(),
            defects: DefectLog::new(),
            decals: Vec::new(),
            planes: PlaneTracker::new(),
            debug_planes: false,
            model_visible: true,
            model_opacity: 1.0,
            controller_ray: None,
            status: STATUS_READY.to_string(),
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Latest user-facing status line
    pub fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        if !status.is_empty() {
            self.status = status;
        }
    }

    // ---- model ----------------------------------------------------------

    /// Load an unpacked bundle. On failure the current model stays and the
    /// status reports the error.
    pub async fn load_bundle<D>(&mut self, entries: Vec<BundleEntry>, decoder: &D) -> Result<()>
    where
        D: SceneDecoder + ?Sized,
    {
        let ticket = self.begin_load();
        match prepare_bundle(entries, decoder).await {
            Ok(loaded) => {
                self.install(ticket, loaded);
                Ok(())
            }
            Err(err) => {
                self.load_failed(ticket, &err);
                Err(err)
            }
        }
    }

    /// Start a load request and show the transient loading status. Any
    /// request still in flight is superseded.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        self.set_status("Loading model...");
        LoadTicket {
            generation: self.load_generation,
        }
    }

    fn is_current_load(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.load_generation
    }

    /// Report a failed load; the current model is left alone. Returns `false`
    /// (and changes nothing) for a superseded request.
    pub fn load_failed(&mut self, ticket: LoadTicket, err: &Error) -> bool {
        if !self.is_current_load(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                error = %err,
                "Ignoring failure of superseded load"
            );
            return false;
        }
        tracing::warn!(error = %err, "Bundle load failed");
        self.set_status(format!("Failed to load model: {err}"));
        true
    }

    /// Swap in a decoded model. Selection, placement, defects and decals of
    /// the previous model are dropped. A superseded request is discarded and
    /// `false` returned.
    pub fn install(&mut self, ticket: LoadTicket, loaded: LoadedModel) -> bool {
        if !self.is_current_load(ticket) {
            tracing::debug!(generation = ticket.generation, "Discarding superseded load");
            return false;
        }
        let LoadedModel {
            scene, metadata, ..
        } = loaded;
        self.model = Some(scene);
        self.metadata = metadata;
        self.selection.clear();
        self.defects.clear();
        self.decals.clear();
        self.model_visible = true;
        self.model_opacity = 1.0;
        self.placement.model_loaded();
        self.set_status(STATUS_LOADED);
        true
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Model in its local (recentred) space
    pub fn model(&self) -> Option<&SceneNode> {
        self.model.as_ref()
    }

    pub fn metadata(&self) -> &BimMetadata {
        &self.metadata
    }

    /// Model with the root transform and all node transforms baked in
    pub fn world_model(&self) -> Option<SceneNode> {
        self.model
            .as_ref()
            .map(|model| model.to_world(&self.placement.transform().to_matrix()))
    }

    pub fn model_visible(&self) -> bool {
        self.model_visible
    }

    pub fn set_model_visible(&mut self, visible: bool) {
        self.model_visible = visible;
    }

    /// Global model opacity in `0..=1`
    pub fn model_opacity(&self) -> f32 {
        self.model_opacity
    }

    pub fn set_model_opacity(&mut self, opacity: f32) {
        if opacity.is_finite() {
            self.model_opacity = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.model_opacity < 1.0
    }

    // ---- placement ------------------------------------------------------

    pub fn placement(&self) -> &PlacementController {
        &self.placement
    }

    pub fn placement_state(&self) -> PlacementState {
        self.placement.state()
    }

    pub fn model_transform(&self) -> &ModelTransform {
        self.placement.transform()
    }

    /// Slider input: yaw about the vertical axis
    pub fn rotate_model(&mut self, radians: f64) {
        self.placement.transform_mut().rotate_yaw(radians);
    }

    /// Slider input: uniform scale
    pub fn scale_model(&mut self, scale: f64) {
        self.placement.transform_mut().set_scale(scale);
    }

    pub fn start_alignment(&mut self) -> Result<()> {
        match self.placement.start_alignment() {
            Ok(()) => {
                self.set_status("Point at the floor and tap.");
                Ok(())
            }
            Err(err) => {
                self.set_status("Load a model first.");
                Err(err.into())
            }
        }
    }

    pub fn cancel_alignment(&mut self) {
        self.placement.cancel_alignment();
    }

    /// Advance placement (single tap)
    pub fn confirm(&mut self) -> ConfirmOutcome {
        let outcome = self.placement.confirm();
        self.set_status(outcome.status());
        outcome
    }

    pub fn session_started(&mut self) {
        self.gestures.reset();
        self.placement.session_started();
        if self.placement.is_placed() {
            self.set_status("Model restored to its previous position.");
        } else if self.has_model() {
            self.set_status("Move the device to find a surface, then tap to place.");
        }
    }

    pub fn session_ended(&mut self) {
        self.placement.session_ended();
        self.gestures.reset();
        self.planes.clear();
        self.controller_ray = None;
    }

    /// Deliver the hit-test source negotiation outcome
    pub fn resolve_hit_test_source(
        &mut self,
        ticket: SourceTicket,
        outcome: std::result::Result<SourceId, String>,
    ) -> Result<()> {
        self.placement
            .resolve_hit_test_source(ticket, outcome)
            .map_err(|err| {
                self.set_status("Surface detection is unavailable. Restart AR to try again.");
                err.into()
            })
    }

    // ---- frame + gestures -----------------------------------------------

    /// Per-frame step: hit-testing, the debug plane overlay and the
    /// long-press timer.
    pub fn on_frame<H>(&mut self, host: &mut H, frame: &FrameInput) -> Option<ViewerEvent>
    where
        H: HitTestHost + ?Sized,
    {
        self.controller_ray = frame.controller_ray;
        self.placement.on_frame(host, frame);

        if self.debug_planes {
            if let Some(planes) = &frame.planes {
                let PlaneChanges { added, removed } = self.planes.update(planes.iter().copied());
                if !added.is_empty() || !removed.is_empty() {
                    tracing::debug!(?added, ?removed, "Detected planes changed");
                }
            }
        }

        let now = self.clock.now_ms();
        self.gestures
            .poll(now)
            .and_then(|gesture| self.dispatch(gesture))
    }

    pub fn select_start(&mut self) -> Option<ViewerEvent> {
        let now = self.clock.now_ms();
        self.gestures
            .select_start(now)
            .and_then(|gesture| self.dispatch(gesture))
    }

    pub fn select_end(&mut self) -> Option<ViewerEvent> {
        let now = self.clock.now_ms();
        self.gestures
            .select_end(now)
            .and_then(|gesture| self.dispatch(gesture))
    }

    fn dispatch(&mut self, gesture: Gesture) -> Option<ViewerEvent> {
        tracing::debug!(?gesture, "Gesture recognized");
        match gesture {
            Gesture::SingleTap => match self.confirm() {
                ConfirmOutcome::Ignored => None,
                outcome => Some(ViewerEvent::Placement(outcome)),
            },
            Gesture::DoubleTap => Some(self.pick_element()),
            Gesture::LongPress => match self.create_defect_at_controller() {
                Ok(Some(id)) => Some(ViewerEvent::DefectOpened(id)),
                Ok(None) => None,
                Err(err) => {
                    tracing::debug!(error = %err, "Long press ignored");
                    None
                }
            },
        }
    }

    /// Nearest model hit of the current controller ray. The model only
    /// takes part once it is visible in the room.
    fn controller_hit(&self) -> Option<RayHit> {
        if !self.model_visible || !self.placement.is_placed() {
            return None;
        }
        let ray = self.controller_ray?;
        let world = self.world_model()?;
        raycast(&world, &ray)
    }

    /// Double tap: select or toggle the element under the controller
    pub fn pick_element(&mut self) -> ViewerEvent {
        let hit = self.controller_hit();
        let Some(model) = self.model.as_ref() else {
            return ViewerEvent::Selection {
                change: SelectionChange::Unchanged,
                info: None,
            };
        };

        let info = hit
            .as_ref()
            .and_then(|h| model.element_at(&h.path))
            .map(|(_, id)| self.metadata.element_info(id));
        let change = self
            .selection
            .pick(model, hit.as_ref().map(|h| h.path.as_slice()));

        tracing::debug!(?change, "Selection changed");
        ViewerEvent::Selection { change, info }
    }

    /// Long press: drop a blank defect where the controller ray meets the
    /// model. `Ok(None)` when the ray misses.
    pub fn create_defect_at_controller(&mut self) -> Result<Option<u64>> {
        let model = self.model.as_ref().ok_or(Error::NoModel)?;
        let Some(hit) = self.controller_hit() else {
            self.set_status("Point at the model to mark a defect.");
            return Ok(None);
        };

        let global_id = model.element_at(&hit.path).map(|(_, id)| id.to_string());
        let attachment = Attachment {
            point: hit.point,
            normal: hit.normal,
            node_path: hit.path.to_vec(),
        };
        let now = self.clock.now_ms().max(0.0) as u64;
        let id = self.defects.create(attachment, global_id, now);

        tracing::info!(id, distance = hit.distance, "Defect marker placed");
        self.set_status("Describe the defect.");
        Ok(Some(id))
    }

    // ---- selection ------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Info panel content for an element
    pub fn element_info(&self, global_id: &str) -> ElementInfo {
        self.metadata.element_info(global_id)
    }

    /// How to draw the node at `path`
    pub fn appearance(&self, path: &[usize]) -> Appearance {
        self.selection
            .appearance(path, self.config.selection_dim_opacity)
    }

    /// Appearance of every mesh node
    pub fn appearances(&self) -> Vec<(NodePath, Appearance)> {
        let Some(model) = &self.model else {
            return Vec::new();
        };
        model
            .mesh_paths()
            .into_iter()
            .map(|path| {
                let appearance = self.appearance(&path);
                (path, appearance)
            })
            .collect()
    }

    // ---- defects --------------------------------------------------------

    pub fn defects(&self) -> impl Iterator<Item = &DefectRecord> {
        self.defects.iter()
    }

    pub fn defect(&self, id: u64) -> Option<&DefectRecord> {
        self.defects.get(id)
    }

    /// Marker sphere for a defect, sized by `markerRadius`
    pub fn defect_marker(&self, id: u64) -> Option<DefectMarker> {
        self.defects
            .get(id)
            .map(|record| DefectMarker::new(record, self.config.marker_radius))
    }

    pub fn defect_markers(&self) -> Vec<DefectMarker> {
        self.defects
            .iter()
            .map(|record| DefectMarker::new(record, self.config.marker_radius))
            .collect()
    }

    pub fn defect_summaries(&self) -> Vec<DefectSummary> {
        self.defects.summaries()
    }

    pub fn decals(&self) -> &[DecalInstance] {
        &self.decals
    }

    /// Save the edit form. A defect with a photo gets a decal projected onto
    /// the mesh it sits on.
    pub fn save_defect(&mut self, id: u64, edit: DefectEdit) -> Result<Option<&DecalInstance>> {
        let record = self.defects.save(id, edit)?.clone();
        if record.photo.is_none() {
            self.decals.retain(|d| d.defect_id != id);
            self.set_status("Defect saved.");
            return Ok(None);
        }

        let world = self.world_model().ok_or(Error::NoModel)?;
        let size = Vector3::from(self.config.decal_size);
        let Some(decal) = project_defect_decal(&world, &record, size)? else {
            return Ok(None);
        };
        upsert_decal(&mut self.decals, decal);
        self.set_status("Defect saved with photo.");
        Ok(self.decals.iter().find(|d| d.defect_id == id))
    }

    /// Close the edit form without saving; blank defects disappear
    pub fn cancel_defect(&mut self, id: u64) -> Result<bool> {
        let removed = self.defects.cancel(id)?;
        if removed {
            self.decals.retain(|d| d.defect_id != id);
        }
        Ok(removed)
    }

    // ---- debug planes ---------------------------------------------------

    pub fn debug_planes(&self) -> bool {
        self.debug_planes
    }

    pub fn set_debug_planes(&mut self, enabled: bool) {
        self.debug_planes = enabled;
        if !enabled {
            self.planes.clear();
        }
    }

    pub fn planes(&self) -> &PlaneTracker {
        &self.planes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_ar_placement::ManualClock;
    use std::rc::Rc;

    fn viewer() -> (Viewer, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(1_000.0));
        let viewer = Viewer::new(ViewerConfig::default(), Box::new(clock.clone())).unwrap();
        (viewer, clock)
    }

    fn loaded(name: &str) -> LoadedModel {
        LoadedModel {
            scene: SceneNode::group(name, Vec::new()),
            metadata: BimMetadata::default(),
            center_offset: None,
        }
    }

    #[test]
    fn test_newest_load_wins() {
        let (mut viewer, _) = viewer();
        let first = viewer.begin_load();
        let second = viewer.begin_load();

        // The newer request finishes first; the older one must not replace it
        assert!(viewer.install(second, loaded("second")));
        assert!(!viewer.install(first, loaded("first")));
        assert_eq!(viewer.model().map(|m| m.name.as_str()), Some("second"));
        assert_eq!(viewer.status(), STATUS_LOADED);

        let third = viewer.begin_load();
        assert!(!viewer.load_failed(second, &Error::NoModel));
        assert_eq!(viewer.status(), "Loading model...");
        assert!(viewer.load_failed(third, &Error::NoModel));
        assert!(viewer.status().starts_with("Failed to load model"));
        assert_eq!(viewer.model().map(|m| m.name.as_str()), Some("second"));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ViewerConfig {
            long_press_ms: 0.0,
            ..ViewerConfig::default()
        };
        let result = Viewer::new(config, Box::new(ManualClock::new(0.0)));
        assert!(matches!(result, Err(Error::Core(_))));
    }

    #[test]
    fn test_start_alignment_without_model() {
        let (mut viewer, _) = viewer();
        assert!(matches!(
            viewer.start_alignment(),
            Err(Error::Placement(ifc_ar_placement::Error::NoModel))
        ));
        assert_eq!(viewer.placement_state(), PlacementState::Idle);
        assert_eq!(viewer.status(), "Load a model first.");
    }

    #[test]
    fn test_opacity_is_clamped() {
        let (mut viewer, _) = viewer();
        viewer.set_model_opacity(1.7);
        assert_eq!(viewer.model_opacity(), 1.0);
        assert!(!viewer.is_transparent());
        viewer.set_model_opacity(0.4);
        assert!(viewer.is_transparent());
        viewer.set_model_opacity(f32::NAN);
        assert_eq!(viewer.model_opacity(), 0.4);
    }

    #[test]
    fn test_long_press_without_model_does_nothing() {
        let (mut viewer, clock) = viewer();
        assert_eq!(viewer.select_start(), None);
        clock.advance(600.0);
        let mut host = NoHost;
        assert_eq!(viewer.on_frame(&mut host, &FrameInput::default()), None);
        assert_eq!(viewer.defects().count(), 0);
    }

    struct NoHost;

    impl HitTestHost for NoHost {
        fn request_hit_test_source(&mut self, _ticket: SourceTicket) {}
    }
}
