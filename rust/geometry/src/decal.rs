// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decal projection
//!
//! Builds a texture-mapped surface patch by flattening the triangles of a
//! target mesh onto the plane through the decal box centre and keeping the
//! ones that fit inside the box footprint.
//!
//! Per source triangle:
//!
//! 1. Face direction = unit sum of the three corner normals.
//! 2. Each corner is pushed along that direction onto the plane through the
//!    box centre perpendicular to it.
//! 3. Corners are moved into decal space (inverse of the box pose).
//! 4. The triangle is dropped whole if any corner has `|x|` or `|y|` above
//!    `size.x / 2`. Depth is not clipped.
//! 5. Kept triangles get the face direction as flat normal and UVs
//!    `0.5 + x / size.x`, `0.5 + y / size.y`.
//!
//! The footprint test reads only `size.x`, for both axes. Non-square decals
//! therefore clip against a square; UVs still use both components.

use crate::error::{Error, Result};
use crate::mesh::{Mesh, Triangle};
use crate::scene::SceneNode;
use nalgebra::{Isometry3, Matrix3, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};

/// Above this |normal.y| the look-at up vector switches from +Y to +X
const UP_SWITCH_THRESHOLD: f64 = 0.99;

/// Oriented box the decal is projected through
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecalBox {
    /// World-space centre (usually the surface hit point)
    pub center: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
    /// Full extents along the decal's local axes
    pub size: Vector3<f64>,
}

impl DecalBox {
    pub fn new(center: Point3<f64>, orientation: UnitQuaternion<f64>, size: Vector3<f64>) -> Self {
        Self {
            center,
            orientation,
            size,
        }
    }

    /// Decal frame in world space
    pub fn pose(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.center.coords), self.orientation)
    }
}

/// Output buffers of a projection, in decal-local space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecalPatch {
    /// Three positions per emitted triangle (x, y, z)
    pub positions: Vec<f32>,
    /// Flat face direction, repeated for each corner
    pub normals: Vec<f32>,
    /// Texture coordinates (u, v)
    pub uvs: Vec<f32>,
}

impl DecalPatch {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 9
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn push_triangle(&mut self, corners: &[Point3<f64>; 3], normal: &Vector3<f64>, size: &Vector3<f64>) {
        for corner in corners {
            self.positions
                .extend_from_slice(&[corner.x as f32, corner.y as f32, corner.z as f32]);
            self.normals
                .extend_from_slice(&[normal.x as f32, normal.y as f32, normal.z as f32]);
            self.uvs.extend_from_slice(&[
                (0.5 + corner.x / size.x) as f32,
                (0.5 + corner.y / size.y) as f32,
            ]);
        }
    }
}

/// Project every visible mesh under `source` into a decal patch.
///
/// Mesh buffers are taken as world space; bake node transforms first with
/// [`SceneNode::to_world`]. Meshes without usable position or normal data are
/// skipped. Output order follows traversal order.
pub fn project(source: &SceneNode, decal: &DecalBox) -> DecalPatch {
    let mut patch = DecalPatch::new();

    source.visit_visible_meshes(&mut |path, node, mesh| {
        if let Err(err) = project_mesh(mesh, decal, &mut patch) {
            tracing::debug!(
                node = %node.name,
                path = ?path.as_slice(),
                error = %err,
                "Skipping mesh in decal projection"
            );
        }
    });

    patch
}

/// Project one mesh, appending to `patch`. Fails without touching `patch`
/// when the mesh is malformed.
pub fn project_mesh(mesh: &Mesh, decal: &DecalBox, patch: &mut DecalPatch) -> Result<()> {
    let projector_inverse = decal.pose().inverse();
    for triangle in mesh.triangles()? {
        if let Some((corners, normal)) = project_triangle(&triangle, decal, &projector_inverse) {
            patch.push_triangle(&corners, &normal, &decal.size);
        }
    }
    Ok(())
}

/// Flatten, transform and clip one triangle. Returns decal-space corners and
/// the flat normal, or `None` if the triangle is outside the footprint (or
/// its corner normals cancel out).
fn project_triangle(
    triangle: &Triangle,
    decal: &DecalBox,
    projector_inverse: &Isometry3<f64>,
) -> Option<([Point3<f64>; 3], Vector3<f64>)> {
    let normal = triangle.face_direction()?;

    let plane = -normal;
    let distance = plane.dot(&decal.center.coords);

    let corners = triangle.positions.map(|p| {
        let flattened = p + plane * (distance - plane.dot(&p.coords));
        projector_inverse.transform_point(&flattened)
    });

    let limit = 0.5 * decal.size.x.abs();
    if corners
        .iter()
        .any(|c| c.x.abs() > limit || c.y.abs() > limit)
    {
        return None;
    }

    Some((corners, normal))
}

/// Orientation for a decal placed on a surface with world normal `normal`.
///
/// Look-at from the hit point towards `point + normal`: the decal's local +Z
/// points into the surface, up is world +Y unless the surface is nearly
/// horizontal, then +X.
pub fn decal_orientation(normal: &Vector3<f64>) -> Result<UnitQuaternion<f64>> {
    let normal = normal
        .try_normalize(f64::EPSILON)
        .ok_or_else(|| Error::DegenerateDirection("zero surface normal".to_string()))?;

    let up = if normal.y.abs() < UP_SWITCH_THRESHOLD {
        Vector3::y()
    } else {
        Vector3::x()
    };

    let z_axis = -normal;
    let x_axis = up
        .cross(&z_axis)
        .try_normalize(f64::EPSILON)
        .ok_or_else(|| Error::DegenerateDirection("up vector parallel to normal".to_string()))?;
    let y_axis = z_axis.cross(&x_axis);

    let basis = Matrix3::from_columns(&[x_axis, y_axis, z_axis]);
    Ok(UnitQuaternion::from_rotation_matrix(
        &Rotation3::from_matrix_unchecked(basis),
    ))
}
