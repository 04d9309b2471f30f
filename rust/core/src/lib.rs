// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-AR Core
//!
//! Data model shared by the AR viewer crates.
//!
//! ## Overview
//!
//! - **Asset bundles**: locate the binary scene (`.glb`) and the BIM metadata
//!   (`_data.json`) inside an unpacked container
//! - **BIM metadata**: element records keyed by IFC `GlobalId`, flattened into
//!   displayable rows
//! - **Defect log**: session-only annotations attached to model surfaces
//! - **Viewer config**: gesture thresholds, decal size and selection styling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_ar_core::{AssetBundle, BimMetadata, BundleEntry};
//!
//! let bundle = AssetBundle::from_entries(entries)?;
//! let metadata = BimMetadata::from_slice(&bundle.metadata.bytes)?;
//! let info = metadata.element_info("2O2Fr$t4X7Zf8NOew3FLOH");
//! println!("{}", info.title);
//! ```

pub mod bundle;
pub mod config;
pub mod defect;
pub mod error;
pub mod metadata;

pub use bundle::{AssetBundle, BundleEntry, BundleEntryKind};
pub use config::ViewerConfig;
pub use defect::{
    Attachment, DefectEdit, DefectLog, DefectRecord, DefectSummary, DEFAULT_CRITICALITY,
    DEFAULT_DEFECT_TYPE,
};
pub use error::{Error, Result};
pub use metadata::{BimMetadata, ElementInfo, ElementRecord, InfoRow};
