//! Conversion configuration.

use crate::crs::{Crs, ProjectionError};
use crate::grid::{PointSources, RasterAxes};
use crate::interp::{
    DEFAULT_EPSILON, DEFAULT_INSIDE_TOL, DEFAULT_MAX_RETRIES, DEFAULT_PROJECTED_EPSILON,
};
use crate::io::GridHeader;

/// Fields written when no variable list is given.
pub const DEFAULT_VARIABLES: [&str; 3] = ["u1", "u2", "u3"];

/// Field holding the vertical displacement.
pub const VERTICAL_VARIABLE: &str = "u3";

/// Name of the bathymetry grid variable.
pub const BATHYMETRY_VARIABLE: &str = "z";

/// Configuration for a mesh-to-grid conversion.
///
/// # Example
///
/// ```
/// use seisgrid::pipeline::ConversionConfig;
///
/// let config = ConversionConfig::from_definitions("EPSG:32635", "EPSG:4326")
///     .unwrap()
///     .only_vertical()
///     .with_instants(vec![0, 5, 10])
///     .with_resolution(1.0 / 60.0, 1.0 / 60.0);
///
/// assert_eq!(config.variables, vec!["u3".to_string()]);
/// ```
#[derive(Clone, Debug)]
pub struct ConversionConfig {
    /// CRS of the mesh coordinates
    pub source_crs: Crs,
    /// CRS of the output grid
    pub target_crs: Crs,
    /// Fields to convert, in output order
    pub variables: Vec<String>,
    /// Time steps to convert; `None` for all of them
    pub instants: Option<Vec<usize>>,
    /// Where the grid points come from
    pub points: PointSources,
    /// Edge sampling step (source CRS units) for the inscribed rectangle
    pub edge_step: f64,
    /// Shift applied to grid points that miss the mesh; `None` picks a
    /// default in target CRS units (see [`ConversionConfig::retry_shift`])
    pub epsilon: Option<f64>,
    /// Number of shifted retries per point
    pub max_retries: usize,
    /// Barycentric tolerance of the point-in-triangle test
    pub inside_tol: f64,
    /// Output metadata; derived from the target CRS when unset
    pub header: Option<GridHeader>,
}

impl ConversionConfig {
    /// Defaults: WGS84 output, `u1`, `u2`, `u3`, every time step.
    pub fn new(source_crs: Crs) -> Self {
        Self {
            source_crs,
            target_crs: Crs::wgs84(),
            variables: DEFAULT_VARIABLES.iter().map(|v| v.to_string()).collect(),
            instants: None,
            points: PointSources::default(),
            edge_step: 1.0,
            epsilon: None,
            max_retries: DEFAULT_MAX_RETRIES,
            inside_tol: DEFAULT_INSIDE_TOL,
            header: None,
        }
    }

    /// Parse both CRS definitions.
    pub fn from_definitions(source: &str, target: &str) -> Result<Self, ProjectionError> {
        Ok(Self::new(Crs::parse(source)?).with_target_crs(Crs::parse(target)?))
    }

    pub fn with_target_crs(mut self, crs: Crs) -> Self {
        self.target_crs = crs;
        self
    }

    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    /// Convert only the vertical displacement.
    pub fn only_vertical(self) -> Self {
        self.with_variables([VERTICAL_VARIABLE])
    }

    pub fn with_instants(mut self, instants: Vec<usize>) -> Self {
        self.instants = Some(instants);
        self
    }

    pub fn with_points(mut self, points: PointSources) -> Self {
        self.points = points;
        self
    }

    /// Regular grid spacing in target CRS units.
    pub fn with_resolution(mut self, dx: f64, dy: f64) -> Self {
        self.points = self.points.with_resolution(dx, dy);
        self
    }

    pub fn with_explicit_axes(mut self, x: Vec<f64>, y: Vec<f64>) -> Self {
        self.points = self.points.with_explicit(x, y);
        self
    }

    pub fn with_raster_axes(mut self, axes: RasterAxes) -> Self {
        self.points = self.points.with_raster(axes);
        self
    }

    pub fn with_edge_step(mut self, step: f64) -> Self {
        self.edge_step = step;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    /// Retry shift in target CRS units: the configured epsilon, or about
    /// 10 m (1/10800 degree on a geographic target).
    pub fn retry_shift(&self) -> f64 {
        match self.epsilon {
            Some(eps) => eps,
            None if self.target_crs.is_geographic() => DEFAULT_EPSILON,
            None => DEFAULT_PROJECTED_EPSILON,
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_inside_tol(mut self, tol: f64) -> Self {
        self.inside_tol = tol;
        self
    }

    pub fn with_header(mut self, header: GridHeader) -> Self {
        self.header = Some(header);
        self
    }

    /// Header to write: the configured one, or defaults with axis units
    /// matching the target CRS.
    pub fn output_header(&self) -> GridHeader {
        match &self.header {
            Some(h) => h.clone(),
            None => GridHeader::new().with_geographic_axes(self.target_crs.is_geographic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{DEGREES_EAST, METERS};

    #[test]
    fn test_defaults() {
        let config = ConversionConfig::new(Crs::parse("EPSG:32635").unwrap());
        assert_eq!(config.variables, vec!["u1", "u2", "u3"]);
        assert!(config.target_crs.is_geographic());
        assert!(config.instants.is_none());
        assert_eq!(config.edge_step, 1.0);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.output_header().x_units, DEGREES_EAST);
    }

    #[test]
    fn test_projected_target_uses_meters() {
        let config = ConversionConfig::from_definitions("EPSG:4326", "EPSG:32635").unwrap();
        assert_eq!(config.output_header().x_units, METERS);
    }

    #[test]
    fn test_retry_shift_follows_target_units() {
        let geographic = ConversionConfig::from_definitions("EPSG:32635", "EPSG:4326").unwrap();
        assert_eq!(geographic.retry_shift(), 1.0 / 10_800.0);

        let projected = ConversionConfig::from_definitions("EPSG:4326", "EPSG:32635").unwrap();
        assert_eq!(projected.retry_shift(), 10.0);

        // Explicit values survive a later change of target
        let explicit = ConversionConfig::new(Crs::wgs84())
            .with_epsilon(0.5)
            .with_target_crs(Crs::parse("EPSG:32635").unwrap());
        assert_eq!(explicit.retry_shift(), 0.5);
    }

    #[test]
    fn test_invalid_crs() {
        assert!(matches!(
            ConversionConfig::from_definitions("EPSG:32635", "not a crs"),
            Err(ProjectionError::InvalidCrs { .. })
        ));
    }

    #[test]
    fn test_point_sources_accumulate() {
        let config = ConversionConfig::new(Crs::wgs84())
            .with_resolution(0.1, 0.1)
            .with_explicit_axes(vec![0.0, 1.0], vec![0.0]);
        assert!(config.points.resolution.is_some());
        assert!(config.points.explicit.is_some());
    }
}
