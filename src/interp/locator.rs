//! Triangle point location with an R-tree.
//!
//! The tree stores the bounding box of every non-degenerate triangle. A
//! query collects the boxes containing the point and runs the exact
//! barycentric test on each candidate. When several triangles accept the
//! point (shared edges and vertices), the lowest face index wins so results
//! do not depend on tree layout.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use super::barycentric::{barycentric, is_inside, signed_area2};
use crate::mesh::TriMesh;
use crate::types::FaceIndex;

/// Default tolerance on barycentric weights for the inside test.
pub const DEFAULT_INSIDE_TOL: f64 = 1e-12;

/// Bounding box of one triangle.
#[derive(Clone, Debug)]
struct TriangleEnvelope {
    face: usize,
    min: [f64; 2],
    max: [f64; 2],
}

impl TriangleEnvelope {
    fn new(face: usize, corners: &[(f64, f64); 3]) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for &(x, y) in corners {
            min[0] = min[0].min(x);
            min[1] = min[1].min(y);
            max[0] = max[0].max(x);
            max[1] = max[1].max(y);
        }
        Self { face, min, max }
    }
}

impl RTreeObject for TriangleEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for TriangleEnvelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = (self.min[0] - point[0]).max(point[0] - self.max[0]).max(0.0);
        let dy = (self.min[1] - point[1]).max(point[1] - self.max[1]).max(0.0);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }
}

/// A located point: containing face and barycentric weights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    pub face: FaceIndex,
    pub weights: [f64; 3],
}

/// Spatial index over the triangles of a planar mesh.
///
/// Built once; read-only and shareable across threads afterwards.
#[derive(Debug)]
pub struct TriangleLocator {
    tree: RTree<TriangleEnvelope>,
    corners: Vec<[(f64, f64); 3]>,
    inside_tol: f64,
    n_degenerate: usize,
}

impl TriangleLocator {
    /// Index the triangles of `mesh` (z ignored) with the default tolerance.
    pub fn new(mesh: &TriMesh) -> Self {
        Self::with_tolerance(mesh, DEFAULT_INSIDE_TOL)
    }

    /// Index the triangles of `mesh` with a custom inside tolerance.
    pub fn with_tolerance(mesh: &TriMesh, inside_tol: f64) -> Self {
        let corners: Vec<_> = FaceIndex::iter(mesh.n_faces())
            .map(|f| mesh.face_corners_2d(f))
            .collect();

        let envelopes: Vec<_> = corners
            .iter()
            .enumerate()
            .filter(|(_, [a, b, c])| signed_area2(*a, *b, *c) != 0.0)
            .map(|(face, c)| TriangleEnvelope::new(face, c))
            .collect();
        let n_degenerate = corners.len() - envelopes.len();

        Self {
            tree: RTree::bulk_load(envelopes),
            corners,
            inside_tol,
            n_degenerate,
        }
    }

    /// Number of indexed faces, including degenerate ones.
    pub fn n_faces(&self) -> usize {
        self.corners.len()
    }

    /// Number of zero-area faces left out of the index.
    pub fn n_degenerate(&self) -> usize {
        self.n_degenerate
    }

    /// Tolerance of the inside test.
    pub fn inside_tol(&self) -> f64 {
        self.inside_tol
    }

    /// Face containing `(x, y)`, if any.
    pub fn locate(&self, x: f64, y: f64) -> Option<FaceIndex> {
        self.locate_with_weights(x, y).map(|loc| loc.face)
    }

    /// Face containing `(x, y)` together with the barycentric weights.
    pub fn locate_with_weights(&self, x: f64, y: f64) -> Option<Location> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        let mut best: Option<Location> = None;
        for candidate in self.tree.locate_all_at_point(&[x, y]) {
            if best.is_some_and(|b| b.face.get() < candidate.face) {
                continue;
            }
            let [a, b, c] = self.corners[candidate.face];
            let weights = barycentric((x, y), a, b, c);
            if is_inside(&weights, self.inside_tol) {
                best = Some(Location {
                    face: FaceIndex::new(candidate.face),
                    weights,
                });
            }
        }
        best
    }
}
