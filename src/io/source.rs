//! Geometry sources: read-only access to simulation surface output.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::mesh::{MeshError, TriMesh};

/// Error type for malformed or missing simulation output.
#[derive(Debug, Error)]
pub enum SourceDataError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing companion file {0}")]
    MissingFile(PathBuf),

    #[error("XML error: {0}")]
    Xml(String),

    /// Structurally invalid metadata or arrays.
    #[error("malformed source data: {0}")]
    Malformed(String),

    #[error("unsupported data format: {0}")]
    UnsupportedFormat(String),

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("instant {instant} out of range (source has {n_time_steps} time steps)")]
    InstantOutOfRange { instant: usize, n_time_steps: usize },

    #[error("{path}: expected {expected} bytes, found {found}")]
    Truncated {
        path: PathBuf,
        expected: u64,
        found: u64,
    },

    #[error("field '{variable}' has {found} values, mesh has {expected} faces")]
    FieldLength {
        variable: String,
        expected: usize,
        found: usize,
    },

    #[error("vertex rows must have 2 or 3 components, found {0}")]
    VertexDimension(usize),

    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),
}

/// Read-only handle to simulation surface output.
///
/// Fields are cell-centred: one value per face for every time step.
pub trait GeometrySource {
    /// Vertex coordinates; 2D inputs are returned with z = 0.
    fn vertices(&self) -> Result<Vec<[f64; 3]>, SourceDataError>;

    /// Triangle connectivity (0-based).
    fn faces(&self) -> Result<Vec<[usize; 3]>, SourceDataError>;

    /// Number of time steps.
    fn n_time_steps(&self) -> usize;

    /// Names of the available fields.
    fn variables(&self) -> Vec<String>;

    /// Per-face values of `name` at time step `instant`.
    fn read_field(&self, name: &str, instant: usize) -> Result<Vec<f64>, SourceDataError>;
}

/// Load and validate the mesh of a source.
pub fn load_mesh(source: &dyn GeometrySource) -> Result<TriMesh, SourceDataError> {
    let mesh = TriMesh::new(source.vertices()?, source.faces()?)?;
    debug!(
        n_vertices = mesh.n_vertices(),
        n_faces = mesh.n_faces(),
        "loaded mesh"
    );
    Ok(mesh)
}

/// Read a field and check it against the variable list, time range and face
/// count.
pub fn read_face_field(
    source: &dyn GeometrySource,
    name: &str,
    instant: usize,
    n_faces: usize,
) -> Result<Vec<f64>, SourceDataError> {
    if !source.variables().iter().any(|v| v == name) {
        return Err(SourceDataError::UnknownVariable(name.to_string()));
    }
    let n_time_steps = source.n_time_steps();
    if instant >= n_time_steps {
        return Err(SourceDataError::InstantOutOfRange {
            instant,
            n_time_steps,
        });
    }
    let values = source.read_field(name, instant)?;
    if values.len() != n_faces {
        return Err(SourceDataError::FieldLength {
            variable: name.to_string(),
            expected: n_faces,
            found: values.len(),
        });
    }
    Ok(values)
}

/// Convert N×2 or N×3 rows to 3D vertices.
pub fn vertices_from_rows(rows: &[Vec<f64>]) -> Result<Vec<[f64; 3]>, SourceDataError> {
    rows.iter()
        .map(|row| match row.as_slice() {
            &[x, y] => Ok([x, y, 0.0]),
            &[x, y, z] => Ok([x, y, z]),
            other => Err(SourceDataError::VertexDimension(other.len())),
        })
        .collect()
}

/// In-memory geometry source.
///
/// # Example
///
/// ```
/// use seisgrid::io::{GeometrySource, MemorySource, load_mesh};
///
/// let source = MemorySource::new(
///     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
///     vec![[0, 1, 2]],
/// )
/// .with_field("u3", vec![vec![0.5], vec![0.7]]);
///
/// assert_eq!(source.n_time_steps(), 2);
/// assert_eq!(source.read_field("u3", 1).unwrap(), vec![0.7]);
/// assert_eq!(load_mesh(&source).unwrap().n_faces(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    vertices: Vec<[f64; 3]>,
    faces: Vec<[usize; 3]>,
    /// `(name, [instant][face])`, in insertion order
    fields: Vec<(String, Vec<Vec<f64>>)>,
}

impl MemorySource {
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            fields: Vec::new(),
        }
    }

    /// Build from N×2 / N×3 vertex rows and arbitrary-length face rows.
    pub fn from_rows(
        vertex_rows: &[Vec<f64>],
        face_rows: &[Vec<usize>],
    ) -> Result<Self, SourceDataError> {
        let vertices = vertices_from_rows(vertex_rows)?;
        let faces = face_rows
            .iter()
            .map(|row| match row.as_slice() {
                &[a, b, c] => Ok([a, b, c]),
                other => Err(MeshError::NonTriangularFace(other.len()).into()),
            })
            .collect::<Result<Vec<_>, SourceDataError>>()?;
        Ok(Self::new(vertices, faces))
    }

    /// Add (or replace) a field given as `[instant][face]`.
    pub fn with_field(mut self, name: impl Into<String>, steps: Vec<Vec<f64>>) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = steps,
            None => self.fields.push((name, steps)),
        }
        self
    }
}

impl GeometrySource for MemorySource {
    fn vertices(&self) -> Result<Vec<[f64; 3]>, SourceDataError> {
        Ok(self.vertices.clone())
    }

    fn faces(&self) -> Result<Vec<[usize; 3]>, SourceDataError> {
        Ok(self.faces.clone())
    }

    fn n_time_steps(&self) -> usize {
        self.fields
            .iter()
            .map(|(_, steps)| steps.len())
            .min()
            .unwrap_or(0)
    }

    fn variables(&self) -> Vec<String> {
        self.fields.iter().map(|(n, _)| n.clone()).collect()
    }

    fn read_field(&self, name: &str, instant: usize) -> Result<Vec<f64>, SourceDataError> {
        let (_, steps) = self
            .fields
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| SourceDataError::UnknownVariable(name.to_string()))?;
        steps
            .get(instant)
            .cloned()
            .ok_or(SourceDataError::InstantOutOfRange {
                instant,
                n_time_steps: steps.len(),
            })
    }
}
