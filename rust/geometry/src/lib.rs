// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-AR Geometry
//!
//! Scene graph, ray casting and decal projection for the AR viewer, using
//! nalgebra for all math.

pub mod decal;
pub mod error;
pub mod mesh;
pub mod raycast;
pub mod scene;
pub mod transform;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Matrix4, Point3, Quaternion, UnitQuaternion, Vector3};

pub use decal::{decal_orientation, project, project_mesh, DecalBox, DecalPatch};
pub use error::{Error, Result};
pub use mesh::{Mesh, Triangle};
pub use raycast::{intersect_triangle, raycast, Ray, RayHit};
pub use scene::{NodeKind, NodePath, SceneNode};
pub use transform::{pose_from_column_major, pose_to_column_major, ModelTransform, Pose};
