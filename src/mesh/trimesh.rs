//! Triangulated surface mesh.
//!
//! The mesh stores:
//! - Vertex coordinates `[x, y, z]`
//! - Triangle connectivity (three 0-based vertex indices per face)
//!
//! Connectivity is held in an `Arc` so that the flattened (z = 0) and
//! reprojected copies of a mesh share one face array with the original.

use std::sync::Arc;

use thiserror::Error;

use crate::types::{Bounds2D, FaceIndex};

/// Error type for invalid mesh arrays.
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {vertex}, but the mesh has {n_vertices} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        vertex: usize,
        n_vertices: usize,
    },

    /// Connectivity rows are not triangles.
    #[error("faces must have exactly 3 vertices, found {0}")]
    NonTriangularFace(usize),

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteVertex(usize),
}

/// Triangle mesh of a surface.
#[derive(Clone, Debug)]
pub struct TriMesh {
    vertices: Vec<[f64; 3]>,
    faces: Arc<[[usize; 3]]>,
}

impl TriMesh {
    /// Build a mesh from vertex and triangle arrays.
    ///
    /// Every face index must be in bounds and every coordinate finite.
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[usize; 3]>) -> Result<Self, MeshError> {
        Self::with_shared_faces(vertices, Arc::from(faces))
    }

    /// Build a mesh from rows of arbitrary length, rejecting anything that
    /// is not a triangle.
    pub fn from_rows(vertices: Vec<[f64; 3]>, rows: &[Vec<usize>]) -> Result<Self, MeshError> {
        let mut faces = Vec::with_capacity(rows.len());
        for row in rows {
            match row.as_slice() {
                &[a, b, c] => faces.push([a, b, c]),
                other => return Err(MeshError::NonTriangularFace(other.len())),
            }
        }
        Self::new(vertices, faces)
    }

    fn with_shared_faces(
        vertices: Vec<[f64; 3]>,
        faces: Arc<[[usize; 3]]>,
    ) -> Result<Self, MeshError> {
        let n_vertices = vertices.len();

        if let Some(v) = vertices
            .iter()
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(MeshError::NonFiniteVertex(v));
        }

        for (face, tri) in faces.iter().enumerate() {
            if let Some(&vertex) = tri.iter().find(|&&v| v >= n_vertices) {
                return Err(MeshError::FaceIndexOutOfRange {
                    face,
                    vertex,
                    n_vertices,
                });
            }
        }

        Ok(Self { vertices, faces })
    }

    /// Replace the vertex coordinates, keeping the shared connectivity.
    ///
    /// The new vertex array must have the same length as the current one.
    pub(crate) fn with_vertices(&self, vertices: Vec<[f64; 3]>) -> Self {
        debug_assert_eq!(vertices.len(), self.vertices.len());
        Self {
            vertices,
            faces: Arc::clone(&self.faces),
        }
    }

    /// Copy of this mesh with every z-coordinate set to zero.
    ///
    /// The face array is shared, not copied.
    pub fn flatten(&self) -> Self {
        self.with_vertices(self.vertices.iter().map(|&[x, y, _]| [x, y, 0.0]).collect())
    }

    /// Vertex coordinates.
    #[inline]
    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    /// Triangle connectivity.
    #[inline]
    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    /// Whether `other` shares this mesh's face array (same allocation).
    pub fn shares_faces_with(&self, other: &TriMesh) -> bool {
        Arc::ptr_eq(&self.faces, &other.faces)
    }

    /// Number of vertices.
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// Planar (x, y) coordinates of the three corners of a face.
    #[inline]
    pub fn face_corners_2d(&self, face: FaceIndex) -> [(f64, f64); 3] {
        let [a, b, c] = self.faces[face.get()];
        let p = |v: usize| (self.vertices[v][0], self.vertices[v][1]);
        [p(a), p(b), p(c)]
    }

    /// Vertex z-coordinates (bathymetry / topography for surface output).
    pub fn elevations(&self) -> Vec<f64> {
        self.vertices.iter().map(|v| v[2]).collect()
    }

    /// Planar bounding rectangle, or `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<Bounds2D> {
        Bounds2D::enclosing(self.vertices.iter().map(|v| (v[0], v[1])))
    }
}
