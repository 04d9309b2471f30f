// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::error::{Error, Result};
use nalgebra::{Matrix4, Point3, Vector3};

/// Triangle mesh as decoded from the scene file.
///
/// Buffers are flat `f32` triples like the GPU attributes they come from.
/// `indices` is `None` for non-indexed geometry, where every three consecutive
/// vertices form a triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Option<Vec<u32>>,
}

/// One triangle with per-corner normals, in f64
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub positions: [Point3<f64>; 3],
    pub normals: [Vector3<f64>; 3],
}

impl Triangle {
    /// Unit-length sum of the corner normals (flat shading estimate, not area
    /// weighted). `None` when the corner normals cancel out.
    pub fn face_direction(&self) -> Option<Vector3<f64>> {
        (self.normals[0] + self.normals[1] + self.normals[2]).try_normalize(f64::EPSILON)
    }

    /// Normal from the winding of the positions
    pub fn geometric_normal(&self) -> Option<Vector3<f64>> {
        let edge1 = self.positions[1] - self.positions[0];
        let edge2 = self.positions[2] - self.positions[0];
        edge1.cross(&edge2).try_normalize(f64::EPSILON)
    }
}

impl Mesh {
    /// Create a new empty, non-indexed mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an indexed mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Some(Vec::with_capacity(index_count)),
        }
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    /// Add a triangle (turns the mesh into an indexed one)
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        let indices = self.indices.get_or_insert_with(Vec::new);
        indices.push(i0);
        indices.push(i1);
        indices.push(i2);
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check that position and normal data exist and that every index is in
    /// range. Nodes failing this contribute nothing to projection or picking.
    pub fn validate(&self) -> Result<()> {
        if self.positions.is_empty() {
            return Err(Error::MalformedMesh("no position data".to_string()));
        }
        if self.normals.is_empty() {
            return Err(Error::MalformedMesh("no normal data".to_string()));
        }
        if self.positions.len() % 3 != 0 {
            return Err(Error::MalformedMesh(format!(
                "position buffer length {} is not a multiple of 3",
                self.positions.len()
            )));
        }
        if self.normals.len() != self.positions.len() {
            return Err(Error::MalformedMesh(format!(
                "{} normal components for {} position components",
                self.normals.len(),
                self.positions.len()
            )));
        }
        if let Some(indices) = &self.indices {
            let vertex_count = self.vertex_count();
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Error::MalformedMesh(format!(
                    "index {bad} out of range for {vertex_count} vertices"
                )));
            }
        }
        Ok(())
    }

    #[inline]
    fn position(&self, i: usize) -> Point3<f64> {
        Point3::new(
            self.positions[i * 3] as f64,
            self.positions[i * 3 + 1] as f64,
            self.positions[i * 3 + 2] as f64,
        )
    }

    #[inline]
    fn normal(&self, i: usize) -> Vector3<f64> {
        Vector3::new(
            self.normals[i * 3] as f64,
            self.normals[i * 3 + 1] as f64,
            self.normals[i * 3 + 2] as f64,
        )
    }

    fn triangle_at(&self, a: usize, b: usize, c: usize) -> Triangle {
        Triangle {
            positions: [self.position(a), self.position(b), self.position(c)],
            normals: [self.normal(a), self.normal(b), self.normal(c)],
        }
    }

    /// Iterate triangles in buffer order: indexed triples when an index is
    /// present, sequential triples otherwise. Trailing partial triples are
    /// ignored.
    pub fn triangles(&self) -> Result<impl Iterator<Item = Triangle> + '_> {
        self.validate()?;

        let corners: Box<dyn Iterator<Item = (usize, usize, usize)> + '_> = match &self.indices {
            Some(indices) => Box::new(
                indices
                    .chunks_exact(3)
                    .map(|t| (t[0] as usize, t[1] as usize, t[2] as usize)),
            ),
            None => Box::new((0..self.vertex_count() / 3).map(|t| (t * 3, t * 3 + 1, t * 3 + 2))),
        };

        Ok(corners.map(move |(a, b, c)| self.triangle_at(a, b, c)))
    }

    /// Copy of this mesh with positions transformed by `matrix` and normals by
    /// its rotation/scale part, renormalized.
    pub fn transformed(&self, matrix: &Matrix4<f64>) -> Mesh {
        let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();

        let mut positions = Vec::with_capacity(self.positions.len());
        for chunk in self.positions.chunks_exact(3) {
            let p = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let t = matrix.transform_point(&p);
            positions.extend_from_slice(&[t.x as f32, t.y as f32, t.z as f32]);
        }

        let mut normals = Vec::with_capacity(self.normals.len());
        for chunk in self.normals.chunks_exact(3) {
            let n = Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let t = (linear * n).try_normalize(f64::EPSILON).unwrap_or(n);
            normals.extend_from_slice(&[t.x as f32, t.y as f32, t.z as f32]);
        }

        Mesh {
            positions,
            normals,
            indices: self.indices.clone(),
        }
    }

    /// Calculate bounds (min, max) in f64; `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        if self.is_empty() {
            return None;
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        Some((min, max))
    }
}
