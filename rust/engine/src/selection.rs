// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element selection and the per-node appearance it implies

use ifc_ar_geometry::{NodePath, SceneNode};

/// How the renderer should draw a mesh node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Appearance {
    /// Original material
    Normal,
    /// Part of the selected element
    Highlighted,
    /// Everything else while a selection is active, at the given opacity
    Dimmed(f32),
}

/// The selected element, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    current: Option<(NodePath, String)>,
}

/// What a pick did to the selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Selected(String),
    Deselected,
    /// Nothing was selected and nothing was hit
    Unchanged,
}

impl Selection {
    pub fn global_id(&self) -> Option<&str> {
        self.current.as_ref().map(|(_, id)| id.as_str())
    }

    pub fn path(&self) -> Option<&NodePath> {
        self.current.as_ref().map(|(path, _)| path)
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn clear(&mut self) -> SelectionChange {
        match self.current.take() {
            Some(_) => SelectionChange::Deselected,
            None => SelectionChange::Unchanged,
        }
    }

    /// Apply a pick at `hit` (the path of the hit mesh, or `None` for a miss).
    ///
    /// A miss or a mesh outside any tagged element clears the selection,
    /// picking the selected element again toggles it off.
    pub fn pick(&mut self, scene: &SceneNode, hit: Option<&[usize]>) -> SelectionChange {
        let Some((path, global_id)) = hit.and_then(|path| scene.element_at(path)) else {
            return self.clear();
        };

        if self.global_id() == Some(global_id) {
            return self.clear();
        }

        let global_id = global_id.to_string();
        self.current = Some((path, global_id.clone()));
        SelectionChange::Selected(global_id)
    }

    /// Appearance of the node at `path`
    pub fn appearance(&self, path: &[usize], dim_opacity: f32) -> Appearance {
        match &self.current {
            None => Appearance::Normal,
            Some((selected, _)) if path.starts_with(selected) => Appearance::Highlighted,
            Some(_) => Appearance::Dimmed(dim_opacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_ar_geometry::Mesh;

    fn scene() -> SceneNode {
        SceneNode::group(
            "root",
            vec![
                SceneNode::group(
                    "wall",
                    vec![SceneNode::mesh("a", Mesh::new()), SceneNode::mesh("b", Mesh::new())],
                )
                .with_global_id("wall-1"),
                SceneNode::mesh("untagged", Mesh::new()),
            ],
        )
    }

    #[test]
    fn test_pick_selects_owning_element() {
        let scene = scene();
        let mut selection = Selection::default();

        let change = selection.pick(&scene, Some(&[0, 1]));
        assert_eq!(change, SelectionChange::Selected("wall-1".to_string()));
        assert_eq!(selection.path().map(|p| p.as_slice()), Some(&[0usize][..]));

        assert_eq!(selection.appearance(&[0, 0], 0.1), Appearance::Highlighted);
        assert_eq!(selection.appearance(&[1], 0.1), Appearance::Dimmed(0.1));
    }

    #[test]
    fn test_pick_same_element_toggles_off() {
        let scene = scene();
        let mut selection = Selection::default();
        selection.pick(&scene, Some(&[0, 0]));
        assert_eq!(selection.pick(&scene, Some(&[0, 1])), SelectionChange::Deselected);
        assert_eq!(selection.appearance(&[1], 0.1), Appearance::Normal);
    }

    #[test]
    fn test_miss_and_untagged_clear() {
        let scene = scene();
        let mut selection = Selection::default();
        assert_eq!(selection.pick(&scene, None), SelectionChange::Unchanged);

        selection.pick(&scene, Some(&[0, 0]));
        assert_eq!(selection.pick(&scene, Some(&[1])), SelectionChange::Deselected);
        assert!(!selection.is_active());
    }
}
