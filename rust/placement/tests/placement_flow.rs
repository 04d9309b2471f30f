// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end placement flows across frames and sessions

use approx::assert_relative_eq;
use ifc_ar_geometry::{Isometry3, Point3, Pose, UnitQuaternion, Vector3};
use ifc_ar_placement::{
    ConfirmOutcome, Error, HitTestFrame, HitTestHost, PlacementController, PlacementOrigin,
    PlacementState, Refusal, SourceId, SourceTicket,
};
use std::f64::consts::FRAC_PI_2;

#[derive(Default)]
struct RecordingHost {
    tickets: Vec<SourceTicket>,
}

impl HitTestHost for RecordingHost {
    fn request_hit_test_source(&mut self, ticket: SourceTicket) {
        self.tickets.push(ticket);
    }
}

struct Surface(Option<Pose>);

impl HitTestFrame for Surface {
    fn best_hit(&self, _source: SourceId) -> Option<Pose> {
        self.0
    }
}

fn wall_facing(normal_yaw: f64, x: f64, y: f64, z: f64) -> Pose {
    Isometry3::from_parts(
        Vector3::new(x, y, z).into(),
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), normal_yaw),
    )
}

/// Start a session and complete source negotiation
fn begin_session(controller: &mut PlacementController, host: &mut RecordingHost) {
    controller.session_started();
    controller.on_frame(host, &Surface(None));
    let ticket = *host.tickets.last().expect("source requested on first frame");
    controller
        .resolve_hit_test_source(ticket, Ok(7))
        .expect("negotiation succeeds");
}

#[test]
fn invalid_confirms_change_nothing() {
    let mut controller = PlacementController::default();
    let mut host = RecordingHost::default();
    controller.model_loaded();
    begin_session(&mut controller, &mut host);
    controller.start_alignment().unwrap();

    for _ in 0..5 {
        controller.on_frame(&mut host, &Surface(None));
        assert_eq!(
            controller.confirm(),
            ConfirmOutcome::Refused(Refusal::NoSurface)
        );
    }

    assert_eq!(controller.state(), PlacementState::WaitingForFloor);
    assert!(controller.floor_pose().is_none());
    assert!(!controller.is_placed());
    assert_eq!(controller.transform().position, Point3::origin());
}

#[test]
fn floor_then_wall_alignment() {
    let mut controller = PlacementController::default();
    let mut host = RecordingHost::default();
    controller.model_loaded();
    begin_session(&mut controller, &mut host);
    controller.start_alignment().unwrap();

    controller.on_frame(&mut host, &Surface(Some(Isometry3::translation(0.0, -1.4, -1.0))));
    assert_eq!(controller.confirm(), ConfirmOutcome::FloorCaptured);
    assert_eq!(controller.state(), PlacementState::WaitingForWall);

    // Losing the surface between the two taps refuses the wall tap
    controller.on_frame(&mut host, &Surface(None));
    assert_eq!(
        controller.confirm(),
        ConfirmOutcome::Refused(Refusal::NoSurface)
    );
    assert_eq!(controller.state(), PlacementState::WaitingForWall);

    // Wall normal pointing along +X
    let wall = wall_facing(FRAC_PI_2, 0.5, 0.2, -3.0);
    controller.on_frame(&mut host, &Surface(Some(wall)));
    assert_eq!(
        controller.confirm(),
        ConfirmOutcome::Aligned { degenerate: false }
    );

    let transform = controller.transform();
    assert_relative_eq!(transform.position.x, 0.5, epsilon = 1e-12);
    assert_relative_eq!(transform.position.y, -1.4, epsilon = 1e-12);
    assert_relative_eq!(transform.position.z, -3.0, epsilon = 1e-12);

    let forward = transform.orientation * Vector3::z();
    assert_relative_eq!(forward, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-9);

    assert_eq!(controller.state(), PlacementState::Idle);
    assert_eq!(controller.placement_origin(), Some(PlacementOrigin::Aligned));
    assert!(!controller.reticle().visible);
}

#[test]
fn vertical_wall_normal_keeps_previous_heading() {
    let mut controller = PlacementController::default();
    let mut host = RecordingHost::default();
    controller.model_loaded();
    begin_session(&mut controller, &mut host);
    controller.transform_mut().rotate_yaw(0.3);
    let before = controller.transform().orientation;

    controller.start_alignment().unwrap();
    controller.on_frame(&mut host, &Surface(Some(Isometry3::translation(0.0, -1.0, 0.0))));
    controller.confirm();

    let ceiling = Isometry3::from_parts(
        Vector3::new(1.0, 1.2, -2.0).into(),
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2),
    );
    controller.on_frame(&mut host, &Surface(Some(ceiling)));
    assert_eq!(
        controller.confirm(),
        ConfirmOutcome::Aligned { degenerate: true }
    );
    assert_relative_eq!(controller.transform().orientation, before, epsilon = 1e-12);
    assert_relative_eq!(controller.transform().position.y, -1.0, epsilon = 1e-12);
}

#[test]
fn placement_restored_exactly_once() {
    let mut controller = PlacementController::default();
    let mut host = RecordingHost::default();
    controller.model_loaded();

    begin_session(&mut controller, &mut host);
    controller.on_frame(&mut host, &Surface(Some(Isometry3::translation(2.0, -1.0, -4.0))));
    assert_eq!(controller.confirm(), ConfirmOutcome::Placed);
    controller.session_ended();
    assert!(controller.has_restore_snapshot());
    assert!(!controller.is_placed());

    // Second session: restored without any hit-testing
    controller.session_started();
    assert_eq!(controller.placement_origin(), Some(PlacementOrigin::Restored));
    assert_eq!(controller.transform().position, Point3::new(2.0, -1.0, -4.0));
    assert!(!controller.has_restore_snapshot());
    assert!(!controller.needs_hit_test());
    controller.session_ended();

    // Third session: nothing left to restore
    controller.session_started();
    assert!(!controller.is_placed());
    assert!(controller.needs_hit_test());
}

#[test]
fn reloading_model_discards_snapshot() {
    let mut controller = PlacementController::default();
    let mut host = RecordingHost::default();
    controller.model_loaded();
    begin_session(&mut controller, &mut host);
    controller.on_frame(&mut host, &Surface(Some(Isometry3::translation(1.0, 0.0, 0.0))));
    controller.confirm();
    controller.session_ended();

    controller.model_loaded();
    controller.session_started();
    assert!(!controller.is_placed());
    assert_eq!(controller.transform().position, Point3::origin());
}

#[test]
fn stale_source_resolution_is_ignored() {
    let mut controller = PlacementController::default();
    let mut host = RecordingHost::default();
    controller.model_loaded();

    controller.session_started();
    controller.on_frame(&mut host, &Surface(None));
    let stale = host.tickets[0];
    controller.session_ended();

    controller.session_started();
    controller.on_frame(&mut host, &Surface(None));
    let fresh = host.tickets[1];
    assert_ne!(stale, fresh);

    controller.resolve_hit_test_source(stale, Ok(1)).unwrap();
    assert_eq!(controller.hit_test().source(), None);

    controller.resolve_hit_test_source(fresh, Ok(2)).unwrap();
    assert_eq!(controller.hit_test().source(), Some(2));
}

#[test]
fn failed_negotiation_leaves_placement_inert() {
    let mut controller = PlacementController::default();
    let mut host = RecordingHost::default();
    controller.model_loaded();
    controller.session_started();
    controller.on_frame(&mut host, &Surface(None));

    let result = controller.resolve_hit_test_source(host.tickets[0], Err("no viewer space".into()));
    assert!(matches!(result, Err(Error::NegotiationFailed(_))));

    for _ in 0..3 {
        controller.on_frame(&mut host, &Surface(Some(Isometry3::identity())));
    }
    assert_eq!(host.tickets.len(), 1);
    assert!(!controller.reticle().visible);
    assert_eq!(
        controller.confirm(),
        ConfirmOutcome::Refused(Refusal::NoSurface)
    );
}
