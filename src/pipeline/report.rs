//! Conversion outcome and errors.

use std::fmt;

use thiserror::Error;

use crate::crs::ProjectionError;
use crate::grid::{GridError, UnresolvedPoint};
use crate::io::{CacheError, CacheKey, SourceDataError, WriteError};
use crate::mesh::DegenerateMeshError;

/// Pipeline stage, used to attribute errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Load,
    Aggregate,
    Reproject,
    Sample,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Aggregate => "aggregate",
            Stage::Reproject => "reproject",
            Stage::Sample => "sample",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// Error type for a conversion run.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{stage}: {source}")]
    Source {
        stage: Stage,
        #[source]
        source: SourceDataError,
    },

    #[error("aggregate: {0}")]
    Degenerate(#[from] DegenerateMeshError),

    #[error("{stage}: cache: {source}")]
    Cache {
        stage: Stage,
        #[source]
        source: CacheError,
    },

    /// An entry stored during aggregation is gone at write time.
    #[error("write: no cached node values for {0}")]
    MissingCacheEntry(CacheKey),

    #[error("reproject: {0}")]
    Projection(#[from] ProjectionError),

    #[error("sample: {0}")]
    Grid(#[from] GridError),

    #[error("write: {0}")]
    Write(#[from] WriteError),
}

impl ConversionError {
    /// Stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            ConversionError::Source { stage, .. } | ConversionError::Cache { stage, .. } => *stage,
            ConversionError::Degenerate(_) => Stage::Aggregate,
            ConversionError::Projection(_) => Stage::Reproject,
            ConversionError::Grid(_) => Stage::Sample,
            ConversionError::MissingCacheEntry(_) | ConversionError::Write(_) => Stage::Write,
        }
    }

    pub(crate) fn source_at(stage: Stage) -> impl FnOnce(SourceDataError) -> Self {
        move |source| ConversionError::Source { stage, source }
    }

    pub(crate) fn cache_at(stage: Stage) -> impl FnOnce(CacheError) -> Self {
        move |source| ConversionError::Cache { stage, source }
    }
}

/// Grid points of one slice that could not be located in the mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct SliceUnresolved {
    pub variable: String,
    /// `None` for static grids
    pub instant: Option<usize>,
    pub points: Vec<UnresolvedPoint>,
}

/// Summary of a conversion run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversionReport {
    /// Slices written in full
    pub slices_written: usize,
    /// Whether the run stopped early on the abort flag
    pub aborted: bool,
    /// Time steps selected for output
    pub instants: Vec<usize>,
    /// Output grid `(rows, cols)`
    pub grid_shape: (usize, usize),
    /// Slices with unresolved points only
    pub unresolved: Vec<SliceUnresolved>,
}

impl ConversionReport {
    /// Total unresolved points over all slices.
    pub fn total_unresolved(&self) -> usize {
        self.unresolved.iter().map(|s| s.points.len()).sum()
    }
}
