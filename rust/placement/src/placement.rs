// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement / alignment state machine
//!
//! Turns hit-test poses into the model root transform. Three ways to place:
//!
//! - **Direct**: a confirm while idle with an unplaced model drops the model
//!   at the reticle.
//! - **Two-point**: `start_alignment` → confirm on the floor → confirm on a
//!   wall, then [`solve_alignment`].
//! - **Restore**: a placement made in one session is reapplied when the next
//!   session starts, once.
//!
//! A confirm without a valid reticle is refused and changes nothing.

use crate::alignment::solve_alignment;
use crate::error::{Error, Result};
use crate::hit_test::{HitTestFrame, HitTestHost, HitTestTracker, Reticle, SourceId, SourceTicket};
use ifc_ar_geometry::{ModelTransform, Point3, Pose};
use std::fmt;

/// Active step of the placement flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlacementState {
    /// No flow running; the model is placed or inert
    #[default]
    Idle,
    WaitingForFloor,
    WaitingForWall,
}

impl PlacementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementState::Idle => "idle",
            PlacementState::WaitingForFloor => "waitingForFloor",
            PlacementState::WaitingForWall => "waitingForWall",
        }
    }
}

impl fmt::Display for PlacementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the current placement came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementOrigin {
    Direct,
    Aligned,
    /// Reapplied from the previous session's snapshot
    Restored,
}

/// Why a confirm was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Refusal {
    /// No valid surface fix under the reticle
    NoSurface,
    NoModel,
}

/// Result of a confirm gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfirmOutcome {
    /// Model dropped at the reticle
    Placed,
    /// Floor pose captured; now waiting for the wall
    FloorCaptured,
    /// Alignment solved; `degenerate` when the previous heading was kept
    Aligned { degenerate: bool },
    /// State unchanged
    Refused(Refusal),
    /// Nothing to do (model already placed, no flow running)
    Ignored,
}

impl ConfirmOutcome {
    /// User-facing status line
    pub fn status(&self) -> &'static str {
        match self {
            ConfirmOutcome::Placed => "Model placed. Interact with it.",
            ConfirmOutcome::FloorCaptured => "Floor captured. Now point at a wall and tap.",
            ConfirmOutcome::Aligned { degenerate: false } => "Model aligned to floor and wall.",
            ConfirmOutcome::Aligned { degenerate: true } => {
                "Model aligned; wall direction unclear, heading kept."
            }
            ConfirmOutcome::Refused(Refusal::NoSurface) => {
                "No surface found. Move the device slowly and try again."
            }
            ConfirmOutcome::Refused(Refusal::NoModel) => "Load a model first.",
            ConfirmOutcome::Ignored => "",
        }
    }
}

/// Owns the model root transform and everything that may write it
#[derive(Debug, Clone)]
pub struct PlacementController {
    state: PlacementState,
    model_loaded: bool,
    placed: Option<PlacementOrigin>,
    transform: ModelTransform,
    floor: Option<Pose>,
    wall: Option<Pose>,
    restore: Option<ModelTransform>,
    hit_test: HitTestTracker,
    degenerate_epsilon: f64,
}

impl Default for PlacementController {
    fn default() -> Self {
        Self::new(1e-6)
    }
}

impl PlacementController {
    pub fn new(degenerate_epsilon: f64) -> Self {
        Self {
            state: PlacementState::Idle,
            model_loaded: false,
            placed: None,
            transform: ModelTransform::default(),
            floor: None,
            wall: None,
            restore: None,
            hit_test: HitTestTracker::new(),
            degenerate_epsilon,
        }
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn transform(&self) -> &ModelTransform {
        &self.transform
    }

    /// Direct user adjustment (sliders)
    pub fn transform_mut(&mut self) -> &mut ModelTransform {
        &mut self.transform
    }

    pub fn is_placed(&self) -> bool {
        self.placed.is_some()
    }

    pub fn placement_origin(&self) -> Option<PlacementOrigin> {
        self.placed
    }

    pub fn has_model(&self) -> bool {
        self.model_loaded
    }

    pub fn reticle(&self) -> &Reticle {
        self.hit_test.reticle()
    }

    pub fn hit_test(&self) -> &HitTestTracker {
        &self.hit_test
    }

    pub fn floor_pose(&self) -> Option<&Pose> {
        self.floor.as_ref()
    }

    pub fn wall_pose(&self) -> Option<&Pose> {
        self.wall.as_ref()
    }

    pub fn has_restore_snapshot(&self) -> bool {
        self.restore.is_some()
    }

    /// Hit-testing runs until the model is placed, and during alignment
    pub fn needs_hit_test(&self) -> bool {
        self.hit_test.in_session() && (!self.is_placed() || self.state != PlacementState::Idle)
    }

    /// A new model replaced the previous one: everything placement-related
    /// starts over.
    pub fn model_loaded(&mut self) {
        self.model_loaded = true;
        self.state = PlacementState::Idle;
        self.placed = None;
        self.transform = ModelTransform::default();
        self.floor = None;
        self.wall = None;
        self.restore = None;
        tracing::debug!("Placement reset for new model");
    }

    /// Enter two-point alignment
    pub fn start_alignment(&mut self) -> Result<()> {
        if !self.model_loaded {
            return Err(Error::NoModel);
        }
        self.floor = None;
        self.wall = None;
        self.state = PlacementState::WaitingForFloor;
        tracing::info!("Alignment started; waiting for floor");
        Ok(())
    }

    /// Leave a running alignment without touching the transform
    pub fn cancel_alignment(&mut self) {
        if self.state != PlacementState::Idle {
            self.state = PlacementState::Idle;
            self.floor = None;
            self.wall = None;
            tracing::info!("Alignment cancelled");
        }
    }

    /// Advance the state machine on a user confirm (single tap)
    pub fn confirm(&mut self) -> ConfirmOutcome {
        let fix = self.hit_test.reticle().valid_pose();

        let outcome = match self.state {
            PlacementState::WaitingForFloor => match fix {
                Some(pose) => {
                    self.floor = Some(pose);
                    self.state = PlacementState::WaitingForWall;
                    ConfirmOutcome::FloorCaptured
                }
                None => ConfirmOutcome::Refused(Refusal::NoSurface),
            },
            PlacementState::WaitingForWall => match (fix, self.floor) {
                (Some(wall), Some(floor)) => {
                    self.wall = Some(wall);
                    let solution = solve_alignment(
                        &floor,
                        &wall,
                        &self.transform.orientation,
                        self.degenerate_epsilon,
                    );
                    self.transform.position = solution.position;
                    self.transform.orientation = solution.orientation;
                    self.state = PlacementState::Idle;
                    self.placed = Some(PlacementOrigin::Aligned);
                    self.hit_test.hide_reticle();
                    ConfirmOutcome::Aligned {
                        degenerate: solution.degenerate,
                    }
                }
                _ => ConfirmOutcome::Refused(Refusal::NoSurface),
            },
            PlacementState::Idle if self.is_placed() => ConfirmOutcome::Ignored,
            PlacementState::Idle if !self.model_loaded => ConfirmOutcome::Refused(Refusal::NoModel),
            PlacementState::Idle => match fix {
                Some(pose) => {
                    self.transform.position = Point3::from(pose.translation.vector);
                    self.placed = Some(PlacementOrigin::Direct);
                    self.hit_test.hide_reticle();
                    ConfirmOutcome::Placed
                }
                None => ConfirmOutcome::Refused(Refusal::NoSurface),
            },
        };

        tracing::debug!(state = %self.state, ?outcome, "Confirm handled");
        outcome
    }

    /// Per-frame step. Runs the hit-test loop while placement is open and
    /// keeps the reticle hidden otherwise.
    pub fn on_frame<H, F>(&mut self, host: &mut H, frame: &F)
    where
        H: HitTestHost + ?Sized,
        F: HitTestFrame + ?Sized,
    {
        if self.needs_hit_test() {
            self.hit_test.update(host, frame);
        } else {
            self.hit_test.hide_reticle();
        }
    }

    /// Deliver an asynchronous hit-test source negotiation outcome
    pub fn resolve_hit_test_source(
        &mut self,
        ticket: SourceTicket,
        outcome: std::result::Result<SourceId, String>,
    ) -> Result<()> {
        self.hit_test.resolve(ticket, outcome)
    }

    /// AR session began. A pending snapshot is applied here, before any
    /// hit-testing, and consumed.
    pub fn session_started(&mut self) {
        self.hit_test.session_started();

        if let Some(snapshot) = self.restore.take() {
            if self.model_loaded {
                self.transform = snapshot;
                self.placed = Some(PlacementOrigin::Restored);
                tracing::info!(
                    x = snapshot.position.x,
                    y = snapshot.position.y,
                    z = snapshot.position.z,
                    "Restored model placement from previous session"
                );
            }
        }
    }

    /// AR session ended. A placement made during this session is
    /// snapshotted; state drops back to idle with the reticle hidden and the
    /// hit-test source released.
    pub fn session_ended(&mut self) {
        if matches!(
            self.placed,
            Some(PlacementOrigin::Direct | PlacementOrigin::Aligned)
        ) {
            self.restore = Some(self.transform);
        }
        self.hit_test.session_ended();
        self.state = PlacementState::Idle;
        self.floor = None;
        self.wall = None;
        self.placed = None;
        tracing::info!(snapshot = self.restore.is_some(), "Session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_ar_geometry::Isometry3;

    struct NullHost;

    impl HitTestHost for NullHost {
        fn request_hit_test_source(&mut self, _ticket: SourceTicket) {}
    }

    struct Hit(Option<Pose>);

    impl HitTestFrame for Hit {
        fn best_hit(&self, _source: SourceId) -> Option<Pose> {
            self.0
        }
    }

    /// Controller in a session with a ready source and a loaded model
    fn ready() -> PlacementController {
        let mut controller = PlacementController::default();
        controller.model_loaded();
        controller.session_started();
        controller.on_frame(&mut NullHost, &Hit(None));
        let ticket = SourceTicket { session: 1 };
        controller.resolve_hit_test_source(ticket, Ok(1)).unwrap();
        controller
    }

    #[test]
    fn test_direct_placement_uses_reticle_position() {
        let mut controller = ready();
        controller.on_frame(&mut NullHost, &Hit(Some(Isometry3::translation(1.0, -1.5, -2.0))));
        assert!(controller.reticle().visible);

        assert_eq!(controller.confirm(), ConfirmOutcome::Placed);
        assert_eq!(controller.transform().position, Point3::new(1.0, -1.5, -2.0));
        assert!(controller.is_placed());
        assert!(!controller.reticle().visible);
        assert!(!controller.needs_hit_test());

        assert_eq!(controller.confirm(), ConfirmOutcome::Ignored);
    }

    #[test]
    fn test_confirm_without_model_is_refused() {
        let mut controller = PlacementController::default();
        controller.session_started();
        assert_eq!(
            controller.confirm(),
            ConfirmOutcome::Refused(Refusal::NoModel)
        );
        assert!(matches!(controller.start_alignment(), Err(Error::NoModel)));
        assert_eq!(controller.state(), PlacementState::Idle);
    }

    #[test]
    fn test_start_alignment_resets_captures() {
        let mut controller = ready();
        controller.start_alignment().unwrap();
        controller.on_frame(&mut NullHost, &Hit(Some(Isometry3::translation(0.0, -1.0, 0.0))));
        controller.confirm();
        assert!(controller.floor_pose().is_some());

        controller.start_alignment().unwrap();
        assert_eq!(controller.state(), PlacementState::WaitingForFloor);
        assert!(controller.floor_pose().is_none());
    }

    #[test]
    fn test_cancel_alignment_keeps_transform() {
        let mut controller = ready();
        controller.on_frame(&mut NullHost, &Hit(Some(Isometry3::translation(1.0, 0.0, 0.0))));
        controller.confirm();
        controller.start_alignment().unwrap();
        assert!(controller.needs_hit_test());
        controller.cancel_alignment();
        assert_eq!(controller.state(), PlacementState::Idle);
        assert_eq!(controller.transform().position, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_session_end_resets_to_safe_default() {
        let mut controller = ready();
        controller.start_alignment().unwrap();
        controller.on_frame(&mut NullHost, &Hit(Some(Isometry3::identity())));
        controller.session_ended();

        assert_eq!(controller.state(), PlacementState::Idle);
        assert!(!controller.reticle().visible);
        assert_eq!(controller.hit_test().source(), None);
        assert!(!controller.has_restore_snapshot());
    }

    #[test]
    fn test_status_messages() {
        assert!(ConfirmOutcome::Refused(Refusal::NoSurface)
            .status()
            .contains("No surface"));
        assert_eq!(ConfirmOutcome::Ignored.status(), "");
        assert_eq!(PlacementState::WaitingForWall.to_string(), "waitingForWall");
    }
}
