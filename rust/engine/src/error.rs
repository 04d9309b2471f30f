// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the viewer controller.

/// Result type alias for viewer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the host by the viewer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bundle, metadata, config or defect log error.
    #[error(transparent)]
    Core(#[from] ifc_ar_core::Error),

    #[error(transparent)]
    Geometry(#[from] ifc_ar_geometry::Error),

    #[error(transparent)]
    Placement(#[from] ifc_ar_placement::Error),

    /// The host decoder rejected the scene file.
    #[error("scene decode failed: {0}")]
    SceneDecode(String),

    #[error("no model loaded")]
    NoModel,
}
