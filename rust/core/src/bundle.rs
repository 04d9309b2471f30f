// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Asset bundle layout
//!
//! A bundle is a compressed container holding one binary scene file and one
//! JSON metadata file. Inflating the container is left to the host; this
//! module only classifies the unpacked entries.

use crate::error::{Error, Result};
use std::fmt;

/// Suffix of the binary scene entry (lowercase comparison)
const SCENE_SUFFIX: &str = ".glb";
/// Suffix of the metadata entry (lowercase comparison)
const METADATA_SUFFIX: &str = "_data.json";

/// A single file unpacked from the bundle container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Path relative to the container root
    pub path: String,
    /// Raw file content
    pub bytes: Vec<u8>,
}

impl BundleEntry {
    pub fn new(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }

    /// Classify this entry by its file name
    pub fn kind(&self) -> Option<BundleEntryKind> {
        let lower = self.path.to_lowercase();
        if lower.ends_with(SCENE_SUFFIX) {
            Some(BundleEntryKind::Scene)
        } else if lower.ends_with(METADATA_SUFFIX) {
            Some(BundleEntryKind::Metadata)
        } else {
            None
        }
    }
}

/// The two required members of a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleEntryKind {
    /// Binary glTF scene
    Scene,
    /// Element metadata keyed by GlobalId
    Metadata,
}

impl fmt::Display for BundleEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleEntryKind::Scene => write!(f, "{SCENE_SUFFIX} scene"),
            BundleEntryKind::Metadata => write!(f, "{METADATA_SUFFIX} metadata"),
        }
    }
}

/// A validated bundle with both required entries present
#[derive(Debug, Clone)]
pub struct AssetBundle {
    pub scene: BundleEntry,
    pub metadata: BundleEntry,
}

impl AssetBundle {
    /// Pick the scene and metadata entries out of an unpacked container.
    ///
    /// Entries are visited in container order; when several files match the
    /// same suffix the last one wins. Unrelated files are ignored.
    pub fn from_entries(entries: impl IntoIterator<Item = BundleEntry>) -> Result<Self> {
        let mut scene = None;
        let mut metadata = None;

        for entry in entries {
            match entry.kind() {
                Some(BundleEntryKind::Scene) => scene = Some(entry),
                Some(BundleEntryKind::Metadata) => metadata = Some(entry),
                None => {}
            }
        }

        let scene = scene.ok_or(Error::MissingBundleEntry(BundleEntryKind::Scene))?;
        let metadata = metadata.ok_or(Error::MissingBundleEntry(BundleEntryKind::Metadata))?;

        tracing::debug!(
            scene = %scene.path,
            scene_size = scene.bytes.len(),
            metadata = %metadata.path,
            "Classified asset bundle"
        );

        Ok(Self { scene, metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_entries_case_insensitively() {
        let bundle = AssetBundle::from_entries(vec![
            BundleEntry::new("readme.txt", b"hi".to_vec()),
            BundleEntry::new("House.GLB", vec![1, 2, 3]),
            BundleEntry::new("House_DATA.json", b"{}".to_vec()),
        ])
        .unwrap();

        assert_eq!(bundle.scene.path, "House.GLB");
        assert_eq!(bundle.metadata.path, "House_DATA.json");
    }

    #[test]
    fn test_missing_scene_is_reported() {
        let err = AssetBundle::from_entries(vec![BundleEntry::new("a_data.json", b"{}".to_vec())])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingBundleEntry(BundleEntryKind::Scene)
        ));
    }

    #[test]
    fn test_missing_metadata_is_reported() {
        let err =
            AssetBundle::from_entries(vec![BundleEntry::new("a.glb", vec![0])]).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingBundleEntry(BundleEntryKind::Metadata)
        ));
        assert_eq!(err.to_string(), "asset bundle has no _data.json metadata entry");
    }

    #[test]
    fn test_plain_json_is_not_metadata() {
        let entry = BundleEntry::new("model.json", b"{}".to_vec());
        assert_eq!(entry.kind(), None);
    }

    #[test]
    fn test_last_match_wins() {
        let bundle = AssetBundle::from_entries(vec![
            BundleEntry::new("a.glb", vec![1]),
            BundleEntry::new("b.glb", vec![2]),
            BundleEntry::new("x_data.json", b"{}".to_vec()),
        ])
        .unwrap();
        assert_eq!(bundle.scene.bytes, vec![2]);
    }
}
