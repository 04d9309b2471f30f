// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detected-plane debug overlay bookkeeping

use ifc_ar_geometry::Pose;
use rustc_hash::FxHashMap;

/// Runtime identifier of a detected plane
pub type PlaneId = u64;

/// What changed in one update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaneChanges {
    pub added: Vec<PlaneId>,
    pub removed: Vec<PlaneId>,
}

/// Last known pose of each plane the runtime currently reports
#[derive(Debug, Clone, Default)]
pub struct PlaneTracker {
    planes: FxHashMap<PlaneId, Pose>,
}

impl PlaneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sync with this frame's detected planes.
    ///
    /// A plane without a pose this frame keeps its previous pose (and is not
    /// added if it was unknown). Planes missing from the frame are dropped.
    pub fn update<I>(&mut self, frame_planes: I) -> PlaneChanges
    where
        I: IntoIterator<Item = (PlaneId, Option<Pose>)>,
    {
        let mut changes = PlaneChanges::default();
        let mut seen: Vec<PlaneId> = Vec::new();

        for (id, pose) in frame_planes {
            seen.push(id);
            let Some(pose) = pose else {
                continue;
            };
            if let Some(existing) = self.planes.get_mut(&id) {
                *existing = pose;
            } else {
                self.planes.insert(id, pose);
                changes.added.push(id);
            }
        }

        self.planes.retain(|id, _| {
            let keep = seen.contains(id);
            if !keep {
                changes.removed.push(*id);
            }
            keep
        });
        changes.removed.sort_unstable();

        changes
    }

    pub fn pose(&self, id: PlaneId) -> Option<&Pose> {
        self.planes.get(&id)
    }

    /// Tracked planes in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&PlaneId, &Pose)> {
        self.planes.iter()
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn clear(&mut self) {
        self.planes.clear();
    }
}
