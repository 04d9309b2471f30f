// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray casting against the scene graph
//!
//! Used to resolve controller rays into picked elements and defect anchor
//! points. The scene must already be in world space (see
//! [`SceneNode::to_world`]).

use crate::scene::{NodePath, SceneNode};
use nalgebra::{Point3, Unit, Vector3};

const PARALLEL_EPSILON: f64 = 1e-12;

/// A ray with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Unit<Vector3<f64>>,
}

impl Ray {
    /// `None` for a zero-length direction
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        Unit::try_new(direction, PARALLEL_EPSILON).map(|direction| Self { origin, direction })
    }

    pub fn at(&self, distance: f64) -> Point3<f64> {
        self.origin + self.direction.into_inner() * distance
    }
}

/// Nearest intersection found by [`raycast`]
#[derive(Debug, Clone, PartialEq)]
pub struct RayHit {
    pub point: Point3<f64>,
    /// Geometric face normal of the hit triangle
    pub normal: Vector3<f64>,
    pub distance: f64,
    /// Path of the hit mesh node
    pub path: NodePath,
}

/// Möller–Trumbore ray-triangle intersection.
///
/// Returns the distance along the ray; both faces count as hits.
pub fn intersect_triangle(
    ray: &Ray,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> Option<f64> {
    let dir = ray.direction.into_inner();
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);

    if a.abs() < PARALLEL_EPSILON {
        return None; // ray parallel to triangle
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(&h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    (t > PARALLEL_EPSILON).then_some(t)
}

/// Nearest hit of `ray` against all visible meshes under `root`.
///
/// Malformed meshes are skipped.
pub fn raycast(root: &SceneNode, ray: &Ray) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;

    root.visit_visible_meshes(&mut |path, node, mesh| {
        let triangles = match mesh.triangles() {
            Ok(triangles) => triangles,
            Err(err) => {
                tracing::debug!(node = %node.name, error = %err, "Skipping mesh during raycast");
                return;
            }
        };

        for triangle in triangles {
            let [v0, v1, v2] = triangle.positions;
            let Some(distance) = intersect_triangle(ray, &v0, &v1, &v2) else {
                continue;
            };
            if best.as_ref().is_some_and(|b| b.distance <= distance) {
                continue;
            }
            let Some(normal) = triangle.geometric_normal() else {
                continue;
            };
            best = Some(RayHit {
                point: ray.at(distance),
                normal,
                distance,
                path: path.clone(),
            });
        }
    });

    best
}
