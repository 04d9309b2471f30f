// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Asynchronous model loading
//!
//! Decoding the binary scene belongs to the host (a glTF loader on the JS
//! side, a fixture in tests); it is reached through [`SceneDecoder`]. The
//! metadata JSON is parsed here, concurrently with the decode. Nothing touches
//! the viewer until both halves have succeeded, so a failed load leaves the
//! previous model in place.

use crate::error::{Error, Result};
use futures_util::future::{join, LocalBoxFuture};
use ifc_ar_core::{AssetBundle, BimMetadata, BundleEntry};
use ifc_ar_geometry::{SceneNode, Vector3};

/// Host capability turning scene file bytes into a node tree.
///
/// Nodes carry the IFC GlobalId from the file's per-node extras.
pub trait SceneDecoder {
    fn decode<'a>(&'a self, bytes: &'a [u8]) -> LocalBoxFuture<'a, std::result::Result<SceneNode, String>>;
}

/// Stamp of one load request. Only the newest request may install its
/// model or report its failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub generation: u64,
}

/// A fully decoded model, ready to be installed
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// Root node, already recentred on its bounding-box centre
    pub scene: SceneNode,
    pub metadata: BimMetadata,
    /// Offset removed by the recentring (`None` for a model without geometry)
    pub center_offset: Option<Vector3<f64>>,
}

/// Classify, decode and parse an unpacked bundle.
///
/// Runs the scene decode and the metadata parse side by side and fails if
/// either fails.
pub async fn prepare_bundle<D>(entries: Vec<BundleEntry>, decoder: &D) -> Result<LoadedModel>
where
    D: SceneDecoder + ?Sized,
{
    let bundle = AssetBundle::from_entries(entries)?;

    let (scene, metadata) = join(decoder.decode(&bundle.scene.bytes), async {
        BimMetadata::from_slice(&bundle.metadata.bytes)
    })
    .await;

    let mut scene = scene.map_err(Error::SceneDecode)?;
    let metadata = metadata?;

    let center_offset = scene.center_at_origin();
    if center_offset.is_none() {
        tracing::warn!(scene = %bundle.scene.path, "Loaded scene has no geometry");
    }

    tracing::info!(
        scene = %bundle.scene.path,
        meshes = scene.mesh_paths().len(),
        elements = metadata.len(),
        "Bundle decoded"
    );

    Ok(LoadedModel {
        scene,
        metadata,
        center_offset,
    })
}
