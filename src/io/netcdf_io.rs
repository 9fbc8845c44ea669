//! NetCDF grid I/O.
//!
//! - **Writer**: GMT-compatible NetCDF-4 grids, static `(y, x)` or
//!   time-indexed `(time, y, x)`
//! - **Reader**: coordinate axes of an existing grid, used as sample points
//!
//! Requires the `netcdf` feature (links the system NetCDF library).
//!
//! # Example
//!
//! ```rust,ignore
//! use seisgrid::io::{GridHeader, GridLayout, GridWriter, NetCdfGridWriter};
//!
//! let mut writer = NetCdfGridWriter::new("displacement.nc");
//! writer.create(&GridHeader::new(), &x, &y, &GridLayout::TimeSeries {
//!     variables: vec!["u3".into()],
//! })?;
//! writer.write_slice("u3", Some(0), &grid)?;
//! writer.finish()?;
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::writer::{GridHeader, GridLayout, GridWriter, OutputDefinition, WriteError};
use crate::grid::{GridError, RasterAxes, StructuredGrid};

/// Fill value for unresolved cells (CF-conventions default for doubles).
pub const FILL_VALUE_F64: f64 = 9.969_209_968_386_869e36;

/// Names recognised for the x (longitude) coordinate.
pub const X_NAMES: [&str; 3] = ["lon", "x", "longitude"];
/// Names recognised for the y (latitude) coordinate.
pub const Y_NAMES: [&str; 3] = ["lat", "y", "latitude"];

/// Error type for reading NetCDF axes.
#[derive(Debug, Error)]
pub enum NetCdfError {
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// None of the candidate names exist in the file.
    #[error("missing coordinate variable (tried {0:?})")]
    MissingVariable(Vec<String>),

    #[error("coordinate variable '{0}' is not one-dimensional")]
    NotOneDimensional(String),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Read the first present coordinate variable among `names`.
fn read_coord(file: &netcdf::File, names: &[&str]) -> Result<Vec<f64>, NetCdfError> {
    for name in names {
        if let Some(var) = file.variable(name) {
            if var.dimensions().len() != 1 {
                return Err(NetCdfError::NotOneDimensional(name.to_string()));
            }
            return Ok(var.get_values::<f64, _>(..)?);
        }
    }
    Err(NetCdfError::MissingVariable(
        names.iter().map(|s| s.to_string()).collect(),
    ))
}

/// Read the x / y coordinate axes of a NetCDF grid.
///
/// Descending axes are reversed so both are ascending.
pub fn read_netcdf_axes<P: AsRef<Path>>(path: P) -> Result<RasterAxes, NetCdfError> {
    let file = netcdf::open(path.as_ref())?;
    let x = read_coord(&file, &X_NAMES)?;
    let y = read_coord(&file, &Y_NAMES)?;
    debug!(
        path = %path.as_ref().display(),
        nx = x.len(),
        ny = y.len(),
        "read NetCDF axes"
    );
    Ok(RasterAxes::new(x, y)?)
}

/// [`GridWriter`] producing a NetCDF-4 file.
pub struct NetCdfGridWriter {
    path: PathBuf,
    file: Option<netcdf::FileMut>,
    definition: Option<OutputDefinition>,
    finished: bool,
}

impl NetCdfGridWriter {
    /// Writer for `path`; the file is created by [`GridWriter::create`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            definition: None,
            finished: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GridWriter for NetCdfGridWriter {
    fn create(
        &mut self,
        header: &GridHeader,
        x: &[f64],
        y: &[f64],
        layout: &GridLayout,
    ) -> Result<(), WriteError> {
        if self.file.is_some() || self.finished {
            return Err(WriteError::AlreadyCreated);
        }

        let mut file = netcdf::create(&self.path)?;

        if layout.is_time_series() {
            file.add_unlimited_dimension("time")?;
        }
        file.add_dimension("y", y.len())?;
        file.add_dimension("x", x.len())?;

        if layout.is_time_series() {
            let mut time_var = file.add_variable::<f32>("time", &["time"])?;
            time_var.put_attribute("units", "time step")?;
        }

        {
            let mut x_var = file.add_variable::<f64>("x", &["x"])?;
            x_var.put_attribute("units", header.x_units.as_str())?;
            x_var.put_values(x, ..)?;
        }
        {
            let mut y_var = file.add_variable::<f64>("y", &["y"])?;
            y_var.put_attribute("units", header.y_units.as_str())?;
            y_var.put_values(y, ..)?;
        }

        let dims: &[&str] = if layout.is_time_series() {
            &["time", "y", "x"]
        } else {
            &["y", "x"]
        };
        for name in layout.variables() {
            let mut var = file.add_variable::<f64>(name, dims)?;
            var.put_attribute("units", header.value_units.as_str())?;
            var.put_attribute("_FillValue", FILL_VALUE_F64)?;
        }

        file.add_attribute("Conventions", " ")?;
        file.add_attribute("title", header.title.as_str())?;
        file.add_attribute("history", header.history.as_str())?;
        file.add_attribute("description", header.description_text().as_str())?;
        file.add_attribute("GMT_version", header.gmt_version.as_str())?;

        info!(
            path = %self.path.display(),
            nx = x.len(),
            ny = y.len(),
            variables = ?layout.variables(),
            "created NetCDF grid"
        );

        self.file = Some(file);
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
        let (file, definition) = match (self.file.as_mut(), self.definition.as_ref()) {
            (Some(f), Some(d)) => (f, d),
            _ => return Err(WriteError::NotCreated),
        };
        definition.check(variable, time_index, grid)?;

        let data: Vec<f64> = grid
            .values()
            .iter()
            .map(|&v| if v.is_nan() { FILL_VALUE_F64 } else { v })
            .collect();

        {
            let mut var = file
                .variable_mut(variable)
                .ok_or_else(|| WriteError::UnknownVariable(variable.to_string()))?;
            match time_index {
                Some(t) => var.put_values(&data, (t, .., ..))?,
                None => var.put_values(&data, (.., ..))?,
            }
        }
        if let Some(t) = time_index {
            let mut time_var = file
                .variable_mut("time")
                .ok_or_else(|| WriteError::UnknownVariable("time".to_string()))?;
            time_var.put_value(t as f32, [t])?;
        }

        debug!(variable, ?time_index, "wrote NetCDF slice");
        Ok(())
    }

    fn finish(&mut self) -> Result<(), WriteError> {
        // Dropping the handle closes the file
        let file = self.file.take().ok_or(WriteError::NotCreated)?;
        drop(file);
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_back_axes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.nc");

        let x = vec![25.0, 25.5, 26.0];
        let y = vec![36.0, 36.5];
        let grid =
            StructuredGrid::new(x.clone(), y.clone(), vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0])
                .unwrap();

        let mut writer = NetCdfGridWriter::new(&path);
        writer
            .create(
                &GridHeader::new(),
                &x,
                &y,
                &GridLayout::TimeSeries {
                    variables: vec!["u3".into()],
                },
            )
            .unwrap();
        writer.write_slice("u3", Some(2), &grid).unwrap();
        writer.finish().unwrap();

        let axes = read_netcdf_axes(&path).unwrap();
        assert_eq!(axes.x(), x.as_slice());
        assert_eq!(axes.y(), y.as_slice());

        let file = netcdf::open(&path).unwrap();
        let u3 = file.variable("u3").unwrap();
        let values: Vec<f64> = u3.get_values((2, .., ..)).unwrap();
        assert_eq!(values[0], 1.0);
        assert_eq!(values[2], FILL_VALUE_F64);
        assert_eq!(values[5], 6.0);
    }

    #[test]
    fn test_static_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bathy.nc");

        let grid = StructuredGrid::new(vec![0.0, 1.0], vec![0.0], vec![-10.0, -20.0]).unwrap();
        let mut writer = NetCdfGridWriter::new(&path);
        writer
            .create(
                &GridHeader::new().with_geographic_axes(false),
                grid.x(),
                grid.y(),
                &GridLayout::Static {
                    variables: vec!["z".into()],
                },
            )
            .unwrap();
        writer.write_slice("z", None, &grid).unwrap();
        writer.finish().unwrap();

        let file = netcdf::open(&path).unwrap();
        assert!(file.variable("time").is_none());
        let z: Vec<f64> = file.variable("z").unwrap().get_values(..).unwrap();
        assert_eq!(z, vec![-10.0, -20.0]);
    }
}
