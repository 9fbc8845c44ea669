//! Face-to-node aggregation.
//!
//! Simulation output on a surface mesh is cell-centred: one sample per
//! triangle. Interpolation needs one value per vertex. The node value is
//! the area-weighted mean of the samples of all faces incident to it:
//!
//! ```text
//! value(v) = Σ_{f ∋ v} area(f) · sample(f) / Σ_{f ∋ v} area(f)
//! ```
//!
//! Face areas (in 3D) and the vertex-to-face adjacency are computed once
//! when the aggregator is built and reused for every variable and instant.

use thiserror::Error;

use super::adjacency::VertexFaces;
use super::trimesh::TriMesh;
use crate::types::VertexIndex;

/// Error type for meshes on which aggregation is undefined.
#[derive(Debug, Error, PartialEq)]
pub enum DegenerateMeshError {
    /// No face references this vertex.
    #[error("vertex {0} has no incident faces")]
    IsolatedVertex(VertexIndex),

    /// All faces around this vertex have zero area.
    #[error("faces incident to vertex {0} have zero total area")]
    ZeroArea(VertexIndex),

    /// Sample array does not match the face count.
    #[error("expected {expected} face samples, got {found}")]
    SampleCountMismatch { expected: usize, found: usize },
}

/// Area-weighted face-to-node aggregator for one mesh.
#[derive(Clone, Debug)]
pub struct NodeAggregator {
    areas: Vec<f64>,
    adjacency: VertexFaces,
}

impl NodeAggregator {
    /// Precompute face areas and adjacency.
    ///
    /// Fails if any vertex has no incident faces or only zero-area ones,
    /// since its node value would be 0/0.
    pub fn new(mesh: &TriMesh) -> Result<Self, DegenerateMeshError> {
        let areas = face_areas(mesh);
        let adjacency = VertexFaces::build(mesh.n_vertices(), mesh.faces());

        for v in VertexIndex::iter(mesh.n_vertices()) {
            let faces = adjacency.faces_of(v);
            if faces.is_empty() {
                return Err(DegenerateMeshError::IsolatedVertex(v));
            }
            let total: f64 = faces.iter().map(|&f| areas[f]).sum();
            if total <= 0.0 {
                return Err(DegenerateMeshError::ZeroArea(v));
            }
        }

        Ok(Self { areas, adjacency })
    }

    /// Face areas, indexed by face.
    #[inline]
    pub fn areas(&self) -> &[f64] {
        &self.areas
    }

    /// Vertex-to-face adjacency.
    #[inline]
    pub fn adjacency(&self) -> &VertexFaces {
        &self.adjacency
    }

    /// Aggregate per-face samples into per-vertex values.
    pub fn aggregate(&self, samples: &[f64]) -> Result<Vec<f64>, DegenerateMeshError> {
        if samples.len() != self.areas.len() {
            return Err(DegenerateMeshError::SampleCountMismatch {
                expected: self.areas.len(),
                found: samples.len(),
            });
        }

        let n = self.adjacency.n_vertices();

        #[cfg(feature = "parallel")]
        let values = {
            use rayon::prelude::*;
            (0..n)
                .into_par_iter()
                .map(|v| self.node_value(VertexIndex::new(v), samples))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let values = (0..n)
            .map(|v| self.node_value(VertexIndex::new(v), samples))
            .collect();

        Ok(values)
    }

    #[inline]
    fn node_value(&self, v: VertexIndex, samples: &[f64]) -> f64 {
        let mut weighted = 0.0;
        let mut total_area = 0.0;
        for &f in self.adjacency.faces_of(v) {
            weighted += self.areas[f] * samples[f];
            total_area += self.areas[f];
        }
        weighted / total_area
    }
}

/// Area of every triangle, measured in 3D.
pub fn face_areas(mesh: &TriMesh) -> Vec<f64> {
    let verts = mesh.vertices();
    mesh.faces()
        .iter()
        .map(|&[a, b, c]| {
            let (pa, pb, pc) = (verts[a], verts[b], verts[c]);
            let ab = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
            let ac = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];
            let cross = [
                ab[1] * ac[2] - ab[2] * ac[1],
                ab[2] * ac[0] - ab[0] * ac[2],
                ab[0] * ac[1] - ab[1] * ac[0],
            ];
            0.5 * (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt()
        })
        .collect()
}
