// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Photo decals attached to saved defects

use crate::error::Result;
use ifc_ar_core::DefectRecord;
use ifc_ar_geometry::{
    decal_orientation, project, DecalBox, DecalPatch, Point3, SceneNode, UnitQuaternion, Vector3,
};

/// A projected photo patch, placed in world space by `center` and
/// `orientation`
#[derive(Debug, Clone, PartialEq)]
pub struct DecalInstance {
    pub defect_id: u64,
    pub center: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub patch: DecalPatch,
}

/// Sphere marking where a defect was dropped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefectMarker {
    pub defect_id: u64,
    pub center: Point3<f64>,
    pub radius: f64,
}

impl DefectMarker {
    pub fn new(defect: &DefectRecord, radius: f64) -> Self {
        Self {
            defect_id: defect.id,
            center: defect.attachment.point,
            radius,
        }
    }
}

/// Project a defect's photo decal onto the mesh it was dropped on.
///
/// `world` is the model baked to world space. Returns `Ok(None)` when the
/// attached node no longer exists.
pub fn project_defect_decal(
    world: &SceneNode,
    defect: &DefectRecord,
    size: Vector3<f64>,
) -> Result<Option<DecalInstance>> {
    let attachment = &defect.attachment;
    let Some(target) = world.node_at(&attachment.node_path) else {
        tracing::warn!(
            id = defect.id,
            path = ?attachment.node_path,
            "Defect target mesh not found; decal skipped"
        );
        return Ok(None);
    };

    let orientation = decal_orientation(&attachment.normal)?;
    let decal = DecalBox::new(attachment.point, orientation, size);
    let patch = project(target, &decal);

    tracing::debug!(
        id = defect.id,
        triangles = patch.triangle_count(),
        "Projected defect decal"
    );

    Ok(Some(DecalInstance {
        defect_id: defect.id,
        center: attachment.point,
        orientation,
        patch,
    }))
}

/// Keep at most one decal per defect; a re-save replaces the old patch
pub(crate) fn upsert_decal(decals: &mut Vec<DecalInstance>, decal: DecalInstance) {
    match decals.iter_mut().find(|d| d.defect_id == decal.defect_id) {
        Some(existing) => *existing = decal,
        None => decals.push(decal),
    }
}
