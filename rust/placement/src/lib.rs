// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-AR Placement
//!
//! Everything that decides where the model sits in the room: the hit-test
//! source lifecycle and reticle, the direct / two-point placement state
//! machine, session-to-session restore, tap gesture recognition and
//! detected-plane bookkeeping.
//!
//! Nothing here talks to a browser. Hosts implement [`HitTestHost`] and
//! [`HitTestFrame`] and feed events in.

pub mod alignment;
pub mod error;
pub mod gesture;
pub mod placement;
pub mod planes;

pub use alignment::{solve_alignment, AlignmentSolution};
pub use error::{Error, Result};
pub use gesture::{Clock, Gesture, GestureRecognizer, ManualClock};
pub use hit_test::{HitTestFrame, HitTestHost, HitTestTracker, Reticle, SourceId, SourceTicket};
pub use placement::{ConfirmOutcome, PlacementController, PlacementOrigin, PlacementState, Refusal};
pub use planes::{PlaneChanges, PlaneId, PlaneTracker};
