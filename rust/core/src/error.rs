// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for bundle, metadata and defect operations.

use crate::bundle::BundleEntryKind;
use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading bundles or editing defects.
#[derive(Error, Debug)]
pub enum Error {
    /// The bundle is missing a required file.
    #[error("asset bundle has no {0} entry")]
    MissingBundleEntry(BundleEntryKind),

    /// The metadata file is not a JSON object of element records.
    #[error("invalid BIM metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// A defect id that is not (or no longer) in the log.
    #[error("defect not found: {0}")]
    DefectNotFound(u64),

    /// Viewer configuration values out of range.
    #[error("invalid viewer config: {0}")]
    InvalidConfig(String),
}
