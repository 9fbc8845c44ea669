//! Grid output.
//!
//! A [`GridWriter`] receives the axes once, then whole 2D slices. Each
//! `write_slice` call carries a complete, fully computed grid, so a slice
//! is either written entirely or not at all.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::grid::StructuredGrid;

/// Units written for geographic axes.
pub const DEGREES_EAST: &str = "degrees east";
pub const DEGREES_NORTH: &str = "degrees north";
/// Units for projected axes and for field values.
pub const METERS: &str = "meters";

/// Error type for grid output.
#[derive(Debug, Error)]
pub enum WriteError {
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("writer has not been created")]
    NotCreated,

    #[error("writer was already created")]
    AlreadyCreated,

    #[error("writer is finished")]
    Finished,

    #[error("variable '{0}' is not part of the output layout")]
    UnknownVariable(String),

    /// Time-series slices need a time index, static slices must not have one.
    #[error("time index {time_index:?} does not match the output layout for '{variable}'")]
    TimeIndexMismatch {
        variable: String,
        time_index: Option<usize>,
    },

    /// The slice axes differ from the axes the output was created with.
    #[error("slice for '{0}' does not match the output axes")]
    AxisMismatch(String),
}

/// Descriptive metadata of an output grid.
#[derive(Clone, Debug)]
pub struct GridHeader {
    pub title: String,
    pub history: String,
    /// Free text; defaults to the creation date.
    pub description: Option<String>,
    pub gmt_version: String,
    pub x_units: String,
    pub y_units: String,
    pub value_units: String,
    pub created: DateTime<Utc>,
}

impl Default for GridHeader {
    fn default() -> Self {
        Self {
            title: "SeisSol model outputs converted from triangular mesh to structured mesh by interpolation"
                .to_string(),
            history: format!("File written by seisgrid {}", env!("CARGO_PKG_VERSION")),
            description: None,
            gmt_version: "6.1.0".to_string(),
            x_units: DEGREES_EAST.to_string(),
            y_units: DEGREES_NORTH.to_string(),
            value_units: METERS.to_string(),
            created: Utc::now(),
        }
    }
}

impl GridHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_history(mut self, history: impl Into<String>) -> Self {
        self.history = history.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Axis units for geographic (degrees) or projected (meters) targets.
    pub fn with_geographic_axes(mut self, geographic: bool) -> Self {
        if geographic {
            self.x_units = DEGREES_EAST.to_string();
            self.y_units = DEGREES_NORTH.to_string();
        } else {
            self.x_units = METERS.to_string();
            self.y_units = METERS.to_string();
        }
        self
    }

    /// Description text, `Created dd/mm/yy` unless set explicitly.
    pub fn description_text(&self) -> String {
        match &self.description {
            Some(d) => d.clone(),
            None => format!("Created {}", self.created.format("%d/%m/%y")),
        }
    }
}

/// Which variables are written and whether they carry a time dimension.
#[derive(Clone, Debug, PartialEq)]
pub enum GridLayout {
    /// `(y, x)` variables, one slice each
    Static { variables: Vec<String> },
    /// `(time, y, x)` variables along an unlimited time dimension
    TimeSeries { variables: Vec<String> },
}

impl GridLayout {
    pub fn variables(&self) -> &[String] {
        match self {
            GridLayout::Static { variables } | GridLayout::TimeSeries { variables } => variables,
        }
    }

    pub fn is_time_series(&self) -> bool {
        matches!(self, GridLayout::TimeSeries { .. })
    }

    /// Check a slice request against this layout.
    pub fn check_slice(&self, variable: &str, time_index: Option<usize>) -> Result<(), WriteError> {
        if !self.variables().iter().any(|v| v == variable) {
            return Err(WriteError::UnknownVariable(variable.to_string()));
        }
        if self.is_time_series() != time_index.is_some() {
            return Err(WriteError::TimeIndexMismatch {
                variable: variable.to_string(),
                time_index,
            });
        }
        Ok(())
    }
}

/// Sink for structured grids.
pub trait GridWriter {
    /// Define the output: header, axes and variables.
    fn create(
        &mut self,
        header: &GridHeader,
        x: &[f64],
        y: &[f64],
        layout: &GridLayout,
    ) -> Result<(), WriteError>;

    /// Write one complete 2D slice. Unresolved (NaN) cells are written as
    /// missing values.
    fn write_slice(
        &mut self,
        variable: &str,
        time_index: Option<usize>,
        grid: &StructuredGrid,
    ) -> Result<(), WriteError>;

    /// Flush and close the output.
    fn finish(&mut self) -> Result<(), WriteError>;
}

/// Axes and layout shared by writer implementations.
#[derive(Clone, Debug)]
pub(crate) struct OutputDefinition {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub layout: GridLayout,
}

impl OutputDefinition {
    /// Validate a slice against the definition.
    pub fn check(
        &self,
        variable: &str,
        time_index: Option<usize>,
        grid: &StructuredGrid,
    ) -> Result<(), WriteError> {
        self.layout.check_slice(variable, time_index)?;
        if grid.x() != self.x.as_slice() || grid.y() != self.y.as_slice() {
            return Err(WriteError::AxisMismatch(variable.to_string()));
        }
        Ok(())
    }
}

/// Writer that keeps every slice in memory.
#[derive(Debug, Default)]
pub struct MemoryGridWriter {
    header: Option<GridHeader>,
    definition: Option<OutputDefinition>,
    slices: BTreeMap<(String, Option<usize>), StructuredGrid>,
    finished: bool,
}

impl MemoryGridWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> Option<&GridHeader> {
        self.header.as_ref()
    }

    pub fn x(&self) -> Option<&[f64]> {
        self.definition.as_ref().map(|d| d.x.as_slice())
    }

    pub fn y(&self) -> Option<&[f64]> {
        self.definition.as_ref().map(|d| d.y.as_slice())
    }

    pub fn layout(&self) -> Option<&GridLayout> {
        self.definition.as_ref().map(|d| &d.layout)
    }

    /// A written slice.
    pub fn slice(&self, variable: &str, time_index: Option<usize>) -> Option<&StructuredGrid> {
        self.slices.get(&(variable.to_string(), time_index))
    }

    /// Keys of all written slices, ordered by variable then time.
    pub fn slice_keys(&self) -> impl Iterator<Item = (&str, Option<usize>)> {
        self.slices.keys().map(|(v, t)| (v.as_str(), *t))
    }

    pub fn n_slices(&self) -> usize {
        self.slices.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl GridWriter for MemoryGridWriter {
    fn create(
        &mut self,
        header: &GridHeader,
        x: &[f64],
        y: &[f64],
        layout: &GridLayout,
    ) -> Result<(), WriteError> {
        if self.definition.is_some() {
            return Err(WriteError::AlreadyCreated);
        }
        self.header = Some(header.clone());
        self.definition = Some(OutputDefinition {
            x: x.to_vec(),
            y: y.to_vec(),
            layout: layout.clone(),
        });
        Ok(())
    }

    fn write_slice(
        &mut self,
        variable: &str,
        time_index: Option<usize>,
        grid: &StructuredGrid,
    ) -> Result<(), WriteError> {
        if self.finished {
            return Err(WriteError::Finished);
        }
        let definition = self.definition.as_ref().ok_or(WriteError::NotCreated)?;
        definition.check(variable, time_index, grid)?;
        self.slices
            .insert((variable.to_string(), time_index), grid.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), WriteError> {
        if self.definition.is_none() {
            return Err(WriteError::NotCreated);
        }
        self.finished = true;
        Ok(())
    }
}
