// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ifc_ar_geometry::{
    pose_from_column_major, pose_to_column_major, Point3, Pose, Quaternion, UnitQuaternion, Vector3,
};
use ifc_ar_placement::Clock;
use wasm_bindgen::JsValue;

/// Set panic hook for better error messages in the browser
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Wall-clock milliseconds from `Date.now()`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Argument errors raised by the bindings before anything reaches the viewer
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("{name} must have {expected} numbers, got {actual}")]
    WrongLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{0} is not a rigid transform")]
    NotRigid(&'static str),

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl From<BindingError> for JsValue {
    fn from(err: BindingError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn expect_len(name: &'static str, values: &[f64], expected: usize) -> Result<(), BindingError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(BindingError::WrongLength {
            name,
            expected,
            actual: values.len(),
        })
    }
}

pub fn to_point(name: &'static str, values: &[f64]) -> Result<Point3<f64>, BindingError> {
    expect_len(name, values, 3)?;
    Ok(Point3::new(values[0], values[1], values[2]))
}

pub fn to_vector(name: &'static str, values: &[f64]) -> Result<Vector3<f64>, BindingError> {
    expect_len(name, values, 3)?;
    Ok(Vector3::new(values[0], values[1], values[2]))
}

/// `[x, y, z, w]` as used by three.js
pub fn to_rotation(name: &'static str, values: &[f64]) -> Result<UnitQuaternion<f64>, BindingError> {
    expect_len(name, values, 4)?;
    let q = Quaternion::new(values[3], values[0], values[1], values[2]);
    UnitQuaternion::try_new(q, f64::EPSILON).ok_or(BindingError::Invalid {
        name,
        reason: "zero quaternion".to_string(),
    })
}

/// Column-major 4x4 matrix (`XRRigidTransform.matrix`)
pub fn to_pose(name: &'static str, values: &[f64]) -> Result<Pose, BindingError> {
    expect_len(name, values, 16)?;
    let mut matrix = [0.0; 16];
    matrix.copy_from_slice(values);
    pose_from_column_major(&matrix).ok_or(BindingError::NotRigid(name))
}

pub fn pose_matrix(pose: &Pose) -> Vec<f64> {
    pose_to_column_major(pose).to_vec()
}

pub fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

pub fn console_debug(message: &str) {
    web_sys::console::debug_1(&JsValue::from_str(message));
}
