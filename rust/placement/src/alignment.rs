// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Two-point (floor + wall) alignment solve

use ifc_ar_geometry::{Point3, Pose, UnitQuaternion, Vector3};

/// Result of combining a floor and a wall hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentSolution {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
    /// The wall normal was (nearly) vertical and `orientation` is the
    /// previous one
    pub degenerate: bool,
}

/// Place the model against a wall, standing on the floor.
///
/// Horizontal position comes from the wall contact, height from the floor
/// contact. The model's +Z (its forward axis) is turned towards the negated
/// wall normal (the wall pose's local +Z), flattened onto the horizontal
/// plane. When the flattened direction is shorter than `epsilon` there is no
/// usable heading and `previous` is kept.
pub fn solve_alignment(
    floor: &Pose,
    wall: &Pose,
    previous: &UnitQuaternion<f64>,
    epsilon: f64,
) -> AlignmentSolution {
    let floor_position = floor.translation.vector;
    let wall_position = wall.translation.vector;
    let position = Point3::new(wall_position.x, floor_position.y, wall_position.z);

    let look = -(wall.rotation * Vector3::z());
    let flat = Vector3::new(look.x, 0.0, look.z);

    if flat.norm() < epsilon {
        tracing::warn!(
            normal_y = -look.y,
            "Wall normal is vertical; keeping previous orientation"
        );
        return AlignmentSolution {
            position,
            orientation: *previous,
            degenerate: true,
        };
    }

    // Yaw that carries +Z onto the flattened look direction
    let yaw = flat.x.atan2(flat.z);
    AlignmentSolution {
        position,
        orientation: UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw),
        degenerate: false,
    }
}
