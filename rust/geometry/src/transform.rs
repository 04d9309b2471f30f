// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rigid poses and the model root transform
//!
//! Hit-test poses arrive from the AR runtime as column-major 4x4 matrices
//! (the WebGL/WebXR layout). They are rigid, so they are kept as
//! [`Isometry3`]; the model root additionally carries a uniform scale.

use nalgebra::{Isometry3, Matrix3, Matrix4, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};

/// Rigid transform sampled from the hit-test stream
pub type Pose = Isometry3<f64>;

/// Build a pose from a column-major 4x4 matrix.
///
/// The rotation block is re-orthonormalized so small drift in the runtime's
/// matrices does not leak into the model transform. Returns `None` for
/// non-finite input.
pub fn pose_from_column_major(m: &[f64; 16]) -> Option<Pose> {
    if m.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let matrix = Matrix4::from_column_slice(m);
    let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    let rotation = Rotation3::from_matrix(&linear);
    let translation = Translation3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);
    Some(Isometry3::from_parts(
        translation,
        UnitQuaternion::from_rotation_matrix(&rotation),
    ))
}

/// Column-major 4x4 matrix of a pose
pub fn pose_to_column_major(pose: &Pose) -> [f64; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(pose.to_homogeneous().as_slice());
    out
}

/// Position, orientation and uniform scale of the loaded model's root
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub scale: f64,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            orientation: UnitQuaternion::identity(),
            scale: 1.0,
        }
    }
}

impl ModelTransform {
    /// Translation * rotation * scale
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.position.coords)
            * self.orientation.to_homogeneous()
            * Matrix4::new_scaling(self.scale)
    }

    /// Column-major matrix for the renderer
    pub fn to_column_major(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.to_matrix().as_slice());
        out
    }

    /// Rotate about the world vertical axis (slider input)
    pub fn rotate_yaw(&mut self, radians: f64) {
        self.orientation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), radians) * self.orientation;
    }

    /// Set the uniform scale (slider input); non-positive values are ignored
    pub fn set_scale(&mut self, scale: f64) {
        if scale > 0.0 && scale.is_finite() {
            self.scale = scale;
        }
    }
}
