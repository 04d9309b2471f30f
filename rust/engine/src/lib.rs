// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-AR Engine
//!
//! Backend-neutral viewer controller. Ties the bundle loader, the placement
//! state machine, gesture recognition, element picking and the defect log
//! together behind one context object, [`Viewer`].
//!
//! ```rust,ignore
//! use ifc_ar_engine::{FrameInput, Viewer};
//!
//! let mut viewer = Viewer::new(config, Box::new(clock))?;
//! viewer.load_bundle(entries, &decoder).await?;
//! viewer.session_started();
//! // every frame:
//! if let Some(event) = viewer.on_frame(&mut host, &frame) {
//!     ui.handle(event);
//! }
//! ```

pub mod annotations;
pub mod error;
pub mod loader;
pub mod selection;
pub mod viewer;

pub use annotations::{project_defect_decal, DecalInstance, DefectMarker};
pub use error::{Error, Result};
pub use loader::{prepare_bundle, LoadTicket, LoadedModel, SceneDecoder};
pub use selection::{Appearance, Selection, SelectionChange};
pub use viewer::{FrameInput, Viewer, ViewerEvent};
