// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bundle loading through a page-supplied glTF decoder

use super::{js_error, ArViewer};
use futures_util::future::{FutureExt, LocalBoxFuture};
use ifc_ar_core::BundleEntry;
use ifc_ar_engine::{prepare_bundle, SceneDecoder};
use ifc_ar_geometry::{Matrix4, Mesh, SceneNode};
use js_sys::{Array, Function, Promise, Reflect, Uint8Array};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};

/// Node tree produced by the page's decoder (GLTFLoader output flattened to
/// plain objects). A node with `positions` is a mesh, otherwise a group.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeJs {
    #[serde(default)]
    name: String,
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default)]
    global_id: Option<String>,
    /// Column-major local matrix
    #[serde(default)]
    matrix: Option<Vec<f64>>,
    #[serde(default)]
    positions: Option<Vec<f32>>,
    #[serde(default)]
    normals: Option<Vec<f32>>,
    #[serde(default)]
    indices: Option<Vec<u32>>,
    #[serde(default)]
    children: Vec<NodeJs>,
}

fn default_visible() -> bool {
    true
}

impl NodeJs {
    fn into_scene_node(self) -> SceneNode {
        let node = match self.positions {
            Some(positions) => SceneNode::mesh(
                self.name,
                Mesh {
                    positions,
                    // Missing normals make the mesh malformed; projection
                    // and picking skip it.
                    normals: self.normals.unwrap_or_default(),
                    indices: self.indices,
                },
            ),
            None => SceneNode::group(
                self.name,
                self.children
                    .into_iter()
                    .map(NodeJs::into_scene_node)
                    .collect(),
            ),
        };

        let node = match self.matrix {
            Some(m) if m.len() == 16 => node.with_transform(Matrix4::from_column_slice(&m)),
            _ => node,
        };
        let node = node.with_visible(self.visible);
        match self.global_id {
            Some(id) => node.with_global_id(id),
            None => node,
        }
    }
}

/// `decode(bytes: Uint8Array) => Promise<NodeJs>`
struct JsSceneDecoder {
    decode: Function,
}

impl SceneDecoder for JsSceneDecoder {
    fn decode<'a>(&'a self, bytes: &'a [u8]) -> LocalBoxFuture<'a, Result<SceneNode, String>> {
        async move {
            let array = Uint8Array::from(bytes);
            let returned = self
                .decode
                .call1(&JsValue::NULL, &array)
                .map_err(|e| format!("{e:?}"))?;
            let resolved = JsFuture::from(Promise::resolve(&returned))
                .await
                .map_err(|e| format!("{e:?}"))?;
            let root: NodeJs = serde_wasm_bindgen::from_value(resolved).map_err(|e| e.to_string())?;
            Ok(root.into_scene_node())
        }
        .boxed_local()
    }
}

/// Read `[{ path, bytes }]` produced by the page's archive reader
fn read_entries(entries: &JsValue) -> Result<Vec<BundleEntry>, JsValue> {
    let array = Array::from(entries);
    let mut out = Vec::with_capacity(array.length() as usize);
    for item in array.iter() {
        let path = Reflect::get(&item, &JsValue::from_str("path"))?
            .as_string()
            .ok_or_else(|| JsValue::from_str("bundle entry without a path"))?;
        let bytes = Reflect::get(&item, &JsValue::from_str("bytes"))?;
        out.push(BundleEntry::new(path, Uint8Array::new(&bytes).to_vec()));
    }
    Ok(out)
}

#[wasm_bindgen]
impl ArViewer {
    /// Load an unpacked bundle. Resolves with the status text; rejects with
    /// the error message and keeps the current model.
    ///
    /// Example:
    /// ```javascript
    /// const entries = await unzip(file);            // [{ path, bytes }]
    /// await viewer.loadBundle(entries, decodeGlb);  // decodeGlb(bytes) => Promise<node>
    /// ```
    #[wasm_bindgen(js_name = loadBundle)]
    pub fn load_bundle(&self, entries: JsValue, decode: Function) -> Promise {
        let viewer = self.viewer.clone();

        Promise::new(&mut |resolve, reject| {
            let viewer = viewer.clone();
            let decoder = JsSceneDecoder {
                decode: decode.clone(),
            };
            let entries = read_entries(&entries);

            spawn_local(async move {
                let entries = match entries {
                    Ok(entries) => entries,
                    Err(e) => {
                        let _ = reject.call1(&JsValue::NULL, &e);
                        return;
                    }
                };

                let ticket = viewer.borrow_mut().begin_load();
                // No borrow is held across the await
                let loaded = prepare_bundle(entries, &decoder).await;

                let mut viewer = viewer.borrow_mut();
                match loaded {
                    Ok(model) => {
                        if !viewer.install(ticket, model) {
                            crate::utils::console_debug("[ifc-ar] load superseded by a newer request");
                        }
                        let status = JsValue::from_str(viewer.status());
                        if let Err(e) = resolve.call1(&JsValue::NULL, &status) {
                            let _ = reject.call1(&JsValue::NULL, &e);
                        }
                    }
                    Err(err) => {
                        viewer.load_failed(ticket, &err);
                        crate::utils::console_warn(&format!("[ifc-ar] load failed: {err}"));
                        let _ = reject.call1(&JsValue::NULL, &js_error(&err));
                    }
                }
            });
        })
    }
}
