// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene graph
//!
//! A node is either a mesh leaf or a group of child nodes. Traversal
//! dispatches on [`NodeKind`]; nodes are addressed by the child-index path
//! from the root ([`NodePath`]), which stays valid as long as the tree is not
//! restructured.

use crate::mesh::Mesh;
use nalgebra::{Matrix4, Point3, Vector3};
use smallvec::SmallVec;

/// Child indices from the root to a node (empty = the root itself)
pub type NodePath = SmallVec<[usize; 8]>;

/// What a node carries
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh(Mesh),
    Group(Vec<SceneNode>),
}

/// A node of the loaded model
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Hidden nodes (and their subtrees) are skipped by projection and picking
    pub visible: bool,
    /// IFC GlobalId from the node's extras, linking it to the BIM metadata
    pub global_id: Option<String>,
    /// Local transform relative to the parent
    pub transform: Matrix4<f64>,
    pub kind: NodeKind,
}

impl SceneNode {
    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            visible: true,
            global_id: None,
            transform: Matrix4::identity(),
            kind: NodeKind::Mesh(mesh),
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<SceneNode>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            global_id: None,
            transform: Matrix4::identity(),
            kind: NodeKind::Group(children),
        }
    }

    pub fn with_global_id(mut self, global_id: impl Into<String>) -> Self {
        self.global_id = Some(global_id.into());
        self
    }

    pub fn with_transform(mut self, transform: Matrix4<f64>) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Children of a group; empty for meshes
    pub fn children(&self) -> &[SceneNode] {
        match &self.kind {
            NodeKind::Group(children) => children,
            NodeKind::Mesh(_) => &[],
        }
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&SceneNode> {
        let mut node = self;
        for &index in path {
            node = node.children().get(index)?;
        }
        Some(node)
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut SceneNode> {
        let mut node = self;
        for &index in path {
            node = match &mut node.kind {
                NodeKind::Group(children) => children.get_mut(index)?,
                NodeKind::Mesh(_) => return None,
            };
        }
        Some(node)
    }

    /// World-space copy of this subtree.
    ///
    /// Every mesh has `parent * local` baked into its buffers and all
    /// transforms of the copy are identity, so the result can be handed to
    /// the decal projector or the ray caster directly.
    pub fn to_world(&self, parent: &Matrix4<f64>) -> SceneNode {
        let world = parent * self.transform;
        let kind = match &self.kind {
            NodeKind::Mesh(mesh) => NodeKind::Mesh(mesh.transformed(&world)),
            NodeKind::Group(children) => {
                NodeKind::Group(children.iter().map(|c| c.to_world(&world)).collect())
            }
        };
        SceneNode {
            name: self.name.clone(),
            visible: self.visible,
            global_id: self.global_id.clone(),
            transform: Matrix4::identity(),
            kind,
        }
    }

    /// Visit every mesh reachable through visible nodes, depth first, in
    /// child order. Transforms are not applied.
    pub fn visit_visible_meshes<F>(&self, f: &mut F)
    where
        F: FnMut(&NodePath, &SceneNode, &Mesh),
    {
        let mut path = NodePath::new();
        self.visit_visible_inner(&mut path, f);
    }

    fn visit_visible_inner<F>(&self, path: &mut NodePath, f: &mut F)
    where
        F: FnMut(&NodePath, &SceneNode, &Mesh),
    {
        if !self.visible {
            return;
        }
        match &self.kind {
            NodeKind::Mesh(mesh) => f(path, self, mesh),
            NodeKind::Group(children) => {
                for (index, child) in children.iter().enumerate() {
                    path.push(index);
                    child.visit_visible_inner(path, f);
                    path.pop();
                }
            }
        }
    }

    /// World-space bounding box over all meshes, hidden ones included
    pub fn world_bounds(&self, parent: &Matrix4<f64>) -> Option<(Point3<f64>, Point3<f64>)> {
        let world = parent * self.transform;
        match &self.kind {
            NodeKind::Mesh(mesh) => mesh.transformed(&world).bounds(),
            NodeKind::Group(children) => children
                .iter()
                .filter_map(|c| c.world_bounds(&world))
                .reduce(|(amin, amax), (bmin, bmax)| {
                    (amin.inf(&bmin), amax.sup(&bmax))
                }),
        }
    }

    /// Shift the root so the bounding-box centre sits at the origin.
    /// Returns the offset that was removed.
    pub fn center_at_origin(&mut self) -> Option<Vector3<f64>> {
        let (min, max) = self.world_bounds(&Matrix4::identity())?;
        let center = nalgebra::center(&min, &max).coords;
        self.transform = Matrix4::new_translation(&-center) * self.transform;
        Some(center)
    }

    /// Nearest node on `path` (the target itself or an ancestor) carrying a
    /// GlobalId, with its path.
    pub fn element_at(&self, path: &[usize]) -> Option<(NodePath, &str)> {
        let mut found = self.global_id.as_deref().map(|id| (NodePath::new(), id));
        let mut node = self;
        for (depth, &index) in path.iter().enumerate() {
            node = node.children().get(index)?;
            if let Some(id) = node.global_id.as_deref() {
                found = Some((NodePath::from_slice(&path[..=depth]), id));
            }
        }
        found
    }

    /// Path of the first node (pre-order) tagged with `global_id`
    pub fn find_global_id(&self, global_id: &str) -> Option<NodePath> {
        if self.global_id.as_deref() == Some(global_id) {
            return Some(NodePath::new());
        }
        for (index, child) in self.children().iter().enumerate() {
            if let Some(mut sub) = child.find_global_id(global_id) {
                sub.insert(0, index);
                return Some(sub);
            }
        }
        None
    }

    /// Paths of every mesh node, hidden ones included
    pub fn mesh_paths(&self) -> Vec<NodePath> {
        let mut out = Vec::new();
        let mut path = NodePath::new();
        self.collect_mesh_paths(&mut path, &mut out);
        out
    }

    fn collect_mesh_paths(&self, path: &mut NodePath, out: &mut Vec<NodePath>) {
        match &self.kind {
            NodeKind::Mesh(_) => out.push(path.clone()),
            NodeKind::Group(children) => {
                for (index, child) in children.iter().enumerate() {
                    path.push(index);
                    child.collect_mesh_paths(path, out);
                    path.pop();
                }
            }
        }
    }
}
