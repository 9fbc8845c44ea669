//! Triangulated surface meshes.
//!
//! - [`TriMesh`]: validated vertex and triangle arrays with shared connectivity
//! - [`VertexFaces`]: vertex → incident face adjacency (CSR layout)
//! - [`NodeAggregator`]: area-weighted face-to-node averaging

mod adjacency;
mod aggregate;
mod trimesh;

pub use adjacency::VertexFaces;
pub use aggregate::{DegenerateMeshError, NodeAggregator, face_areas};
pub use trimesh::{MeshError, TriMesh};
