// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Full viewer sessions driven through a fake scene decoder

use approx::assert_relative_eq;
use futures_util::future::LocalBoxFuture;
use ifc_ar_core::{BundleEntry, DefectEdit, ViewerConfig};
use ifc_ar_engine::{
    Appearance, Error, FrameInput, SceneDecoder, SelectionChange, Viewer, ViewerEvent,
};
use ifc_ar_geometry::{
    project, DecalBox, Isometry3, Mesh, Point3, Ray, SceneNode, UnitQuaternion, Vector3,
};
use ifc_ar_placement::{
    ConfirmOutcome, HitTestHost, ManualClock, PlacementState, SourceTicket,
};
use std::rc::Rc;

const METADATA: &str = r#"{
    "cube-1": {"Name": "Column C1", "IfcType": "IfcColumn", "Properties": {"Material": "Concrete"}}
}"#;

/// Cube centred at the origin: 8 shared vertices, 12 triangles, outward
/// corner normals
fn cube(half: f64) -> Mesh {
    let mut mesh = Mesh::with_capacity(8, 36);
    for i in 0..8 {
        let p = Point3::new(
            if i & 4 != 0 { half } else { -half },
            if i & 2 != 0 { half } else { -half },
            if i & 1 != 0 { half } else { -half },
        );
        mesh.add_vertex(p, p.coords.normalize());
    }
    let faces: [[u32; 4]; 6] = [
        [0, 1, 3, 2],
        [4, 6, 7, 5],
        [0, 4, 5, 1],
        [2, 3, 7, 6],
        [0, 2, 6, 4],
        [1, 5, 7, 3],
    ];
    for [a, b, c, d] in faces {
        mesh.add_triangle(a, b, c);
        mesh.add_triangle(a, c, d);
    }
    mesh
}

/// Stands in for the host glTF loader
struct CubeDecoder;

impl SceneDecoder for CubeDecoder {
    fn decode<'a>(&'a self, bytes: &'a [u8]) -> LocalBoxFuture<'a, Result<SceneNode, String>> {
        Box::pin(async move {
            if !bytes.starts_with(b"glTF") {
                return Err("not a binary glTF".to_string());
            }
            Ok(SceneNode::group(
                "Scene",
                vec![SceneNode::mesh("cube", cube(0.25)).with_global_id("cube-1")],
            ))
        })
    }
}

#[derive(Default)]
struct Host {
    tickets: Vec<SourceTicket>,
}

impl HitTestHost for Host {
    fn request_hit_test_source(&mut self, ticket: SourceTicket) {
        self.tickets.push(ticket);
    }
}

fn bundle(glb: &[u8]) -> Vec<BundleEntry> {
    vec![
        BundleEntry::new("cube.glb", glb.to_vec()),
        BundleEntry::new("cube_data.json", METADATA.as_bytes().to_vec()),
        BundleEntry::new("readme.txt", b"ignored".to_vec()),
    ]
}

fn viewer_with(config: ViewerConfig) -> (Viewer, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new(50_000.0));
    let viewer = Viewer::new(config, Box::new(clock.clone())).unwrap();
    (viewer, clock)
}

/// Load the cube, start a session and place the model at the origin with a
/// single tap
async fn placed_cube(config: ViewerConfig) -> (Viewer, Rc<ManualClock>, Host) {
    let (mut viewer, clock) = viewer_with(config);
    viewer.load_bundle(bundle(b"glTF-cube"), &CubeDecoder).await.unwrap();

    let mut host = Host::default();
    viewer.session_started();
    viewer.on_frame(&mut host, &FrameInput::default());
    viewer
        .resolve_hit_test_source(host.tickets[0], Ok(3))
        .unwrap();

    let frame = FrameInput {
        hit_pose: Some(Isometry3::identity()),
        ..FrameInput::default()
    };
    viewer.on_frame(&mut host, &frame);

    assert_eq!(viewer.select_start(), None);
    clock.advance(40.0);
    assert_eq!(
        viewer.select_end(),
        Some(ViewerEvent::Placement(ConfirmOutcome::Placed))
    );
    clock.advance(1_000.0);

    (viewer, clock, host)
}

fn aim(origin: Point3<f64>, direction: Vector3<f64>) -> FrameInput {
    FrameInput {
        controller_ray: Ray::new(origin, direction),
        ..FrameInput::default()
    }
}

#[tokio::test]
async fn cube_face_decal_yields_two_triangles() {
    let (viewer, _, _) = placed_cube(ViewerConfig::default()).await;
    let world = viewer.world_model().unwrap();

    let decal = DecalBox::new(
        Point3::new(0.0, 0.0, 0.25),
        UnitQuaternion::identity(),
        Vector3::new(0.5, 0.5, 0.5),
    );
    let patch = project(&world, &decal);

    assert_eq!(patch.triangle_count(), 2);
    for n in patch.normals.chunks_exact(3) {
        let normal = Vector3::new(n[0] as f64, n[1] as f64, n[2] as f64);
        assert!(normal.dot(&Vector3::z()) > 0.9);
    }
}

#[tokio::test]
async fn failed_load_keeps_previous_model() {
    let (mut viewer, _) = viewer_with(ViewerConfig::default());
    viewer.load_bundle(bundle(b"glTF-cube"), &CubeDecoder).await.unwrap();

    let result = viewer.load_bundle(bundle(b"PK\x03\x04"), &CubeDecoder).await;
    assert!(matches!(result, Err(Error::SceneDecode(_))));
    assert!(viewer.has_model());
    assert_eq!(viewer.metadata().len(), 1);
    assert!(viewer.status().starts_with("Failed to load model"));

    let missing = vec![BundleEntry::new("cube.glb", b"glTF".to_vec())];
    assert!(viewer.load_bundle(missing, &CubeDecoder).await.is_err());
    assert!(viewer.has_model());
}

#[tokio::test]
async fn double_tap_toggles_selection() {
    let (mut viewer, clock, mut host) = placed_cube(ViewerConfig::default()).await;
    viewer.on_frame(&mut host, &aim(Point3::new(0.05, -0.1, 2.0), -Vector3::z()));

    viewer.select_start();
    clock.advance(60.0);
    assert_eq!(viewer.select_end(), None);
    clock.advance(100.0);
    let event = viewer.select_start().unwrap();
    let ViewerEvent::Selection { change, info } = event else {
        panic!("expected a selection event, got {event:?}");
    };
    assert_eq!(change, SelectionChange::Selected("cube-1".to_string()));
    assert_eq!(info.unwrap().title, "Column C1");
    assert_eq!(viewer.appearance(&[0]), Appearance::Highlighted);
    viewer.select_end();

    // Second double tap on the same element deselects
    clock.advance(1_000.0);
    viewer.select_start();
    clock.advance(50.0);
    viewer.select_end();
    clock.advance(50.0);
    let event = viewer.select_start();
    assert!(matches!(
        event,
        Some(ViewerEvent::Selection {
            change: SelectionChange::Deselected,
            ..
        })
    ));
    assert_eq!(viewer.appearance(&[0]), Appearance::Normal);
}

#[tokio::test]
async fn long_press_defect_with_photo_gets_decal() {
    let config = ViewerConfig {
        decal_size: [1.0, 1.0, 1.0],
        marker_radius: 0.08,
        ..ViewerConfig::default()
    };
    let (mut viewer, clock, mut host) = placed_cube(config).await;
    let aim_front = aim(Point3::new(0.05, -0.1, 2.0), -Vector3::z());

    viewer.on_frame(&mut host, &aim_front);
    assert_eq!(viewer.select_start(), None);
    clock.advance(300.0);
    assert_eq!(viewer.on_frame(&mut host, &aim_front), None);
    clock.advance(250.0);
    let Some(ViewerEvent::DefectOpened(id)) = viewer.on_frame(&mut host, &aim_front) else {
        panic!("long press should open a defect");
    };
    assert_eq!(viewer.select_end(), None);

    let defect = viewer.defect(id).unwrap();
    assert_eq!(defect.global_id.as_deref(), Some("cube-1"));
    assert_relative_eq!(defect.attachment.point.z, 0.25, epsilon = 1e-9);
    assert!(defect.attachment.normal.dot(&Vector3::z()) > 0.999);

    let marker = viewer.defect_marker(id).unwrap();
    assert_eq!(marker.radius, 0.08);
    assert_eq!(marker.center, defect.attachment.point);
    assert_eq!(viewer.defect_markers(), vec![marker]);

    let decal = viewer
        .save_defect(
            id,
            DefectEdit {
                description: "Spalling at column base".to_string(),
                defect_type: "Structural".to_string(),
                criticality: "High".to_string(),
                photo: Some("data:image/jpeg;base64,AAAA".to_string()),
            },
        )
        .unwrap()
        .expect("photo defects get a decal");
    assert_eq!(decal.defect_id, id);
    assert!(decal.patch.triangle_count() >= 2);
    assert_eq!(viewer.decals().len(), 1);

    // Saved defects survive a cancelled edit
    assert!(!viewer.cancel_defect(id).unwrap());
    let summaries = viewer.defect_summaries();
    assert_eq!(summaries[0].label, "Structural (High)");
}

#[tokio::test]
async fn blank_defect_is_discarded_on_cancel() {
    let (mut viewer, clock, mut host) = placed_cube(ViewerConfig::default()).await;
    let aim_front = aim(Point3::new(0.05, -0.1, 2.0), -Vector3::z());

    viewer.on_frame(&mut host, &aim_front);
    viewer.select_start();
    clock.advance(600.0);
    let Some(ViewerEvent::DefectOpened(id)) = viewer.on_frame(&mut host, &aim_front) else {
        panic!("long press should open a defect");
    };

    assert!(viewer.cancel_defect(id).unwrap());
    assert_eq!(viewer.defects().count(), 0);
}

#[tokio::test]
async fn long_press_into_empty_space_creates_nothing() {
    let (mut viewer, clock, mut host) = placed_cube(ViewerConfig::default()).await;
    let aim_away = aim(Point3::new(0.0, 0.0, 2.0), Vector3::z());

    viewer.on_frame(&mut host, &aim_away);
    viewer.select_start();
    clock.advance(700.0);
    assert_eq!(viewer.on_frame(&mut host, &aim_away), None);
    assert_eq!(viewer.defects().count(), 0);
}

#[tokio::test]
async fn session_restart_restores_placement() {
    let (mut viewer, _, mut host) = placed_cube(ViewerConfig::default()).await;
    viewer.rotate_model(0.5);
    let before = *viewer.model_transform();

    viewer.session_ended();
    assert_eq!(viewer.placement_state(), PlacementState::Idle);
    assert!(!viewer.placement().reticle().visible);

    viewer.session_started();
    assert_eq!(*viewer.model_transform(), before);
    assert!(viewer.placement().is_placed());

    // No hit-test source is needed for a restored model
    viewer.on_frame(&mut host, &FrameInput::default());
    assert_eq!(host.tickets.len(), 1);
}

#[tokio::test]
async fn reload_resets_placement_and_defects() {
    let (mut viewer, clock, mut host) = placed_cube(ViewerConfig::default()).await;
    let aim_front = aim(Point3::new(0.05, -0.1, 2.0), -Vector3::z());
    viewer.on_frame(&mut host, &aim_front);
    viewer.select_start();
    clock.advance(600.0);
    viewer.on_frame(&mut host, &aim_front);
    assert_eq!(viewer.defects().count(), 1);

    viewer.load_bundle(bundle(b"glTF-cube"), &CubeDecoder).await.unwrap();
    assert!(!viewer.placement().is_placed());
    assert_eq!(viewer.defects().count(), 0);
    assert!(viewer.selection().global_id().is_none());
}
