//! Vertex-to-face adjacency.
//!
//! Flat (CSR) layout: the faces incident to vertex `v` are
//! `faces[offsets[v]..offsets[v + 1]]`, listed in ascending face order.
//! Built once per mesh with two passes over the connectivity.

use crate::types::{FaceIndex, VertexIndex};

/// Incident-face lists for every vertex of a triangle mesh.
#[derive(Clone, Debug)]
pub struct VertexFaces {
    offsets: Vec<usize>,
    faces: Vec<FaceIndex>,
}

impl VertexFaces {
    /// Build the adjacency from triangle connectivity.
    ///
    /// A vertex that appears twice in one (degenerate) triangle is listed
    /// once for that face.
    pub fn build(n_vertices: usize, triangles: &[[usize; 3]]) -> Self {
        let mut counts = vec![0usize; n_vertices + 1];
        for tri in triangles {
            for (i, &v) in tri.iter().enumerate() {
                if !tri[..i].contains(&v) {
                    counts[v + 1] += 1;
                }
            }
        }

        // Prefix sum: counts becomes offsets
        for v in 0..n_vertices {
            counts[v + 1] += counts[v];
        }
        let offsets = counts;

        let mut cursor = offsets[..n_vertices].to_vec();
        let mut faces = vec![FaceIndex::new(0); offsets[n_vertices]];
        for (f, tri) in triangles.iter().enumerate() {
            for (i, &v) in tri.iter().enumerate() {
                if !tri[..i].contains(&v) {
                    faces[cursor[v]] = FaceIndex::new(f);
                    cursor[v] += 1;
                }
            }
        }

        Self { offsets, faces }
    }

    /// Faces incident to a vertex.
    #[inline]
    pub fn faces_of(&self, vertex: VertexIndex) -> &[FaceIndex] {
        let v = vertex.get();
        &self.faces[self.offsets[v]..self.offsets[v + 1]]
    }

    /// Number of vertices covered.
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Vertices that no face references.
    pub fn isolated_vertices(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        VertexIndex::iter(self.n_vertices()).filter(|&v| self.faces_of(v).is_empty())
    }
}
