//! Conversion runner.
//!
//! Drives one conversion through its stages:
//!
//! 1. **Load**: mesh from the geometry source
//! 2. **Aggregate**: face samples to node values, for every
//!    `(variable, instant)` not yet in the cache
//! 3. **Reproject**: flattened mesh to the target CRS, plus the rectangle
//!    inscribed in the reprojected footprint
//! 4. **Sample**: grid axes and the point locator, built once
//! 5. **Write**: one slice per `(instant, variable)`
//!
//! The abort flag is checked before every aggregation and every slice.
//! Slices already handed to the writer stay complete.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use super::config::{BATHYMETRY_VARIABLE, ConversionConfig};
use super::report::{ConversionError, ConversionReport, SliceUnresolved, Stage};
use crate::crs::{CrsTransform, inscribed_rectangle, reproject_mesh};
use crate::grid::{GridSampler, SampledGrid};
use crate::interp::{MeshInterpolator, TriangleLocator};
use crate::io::{
    CacheKey, GeometrySource, GridLayout, GridWriter, MemoryCache, NodeValueCache,
    SourceDataError, load_mesh, read_face_field,
};
use crate::mesh::{NodeAggregator, TriMesh};

/// Grid sampler and interpolator for one reprojected mesh.
struct SamplingSetup {
    sampler: GridSampler,
    interp: MeshInterpolator,
}

impl SamplingSetup {
    fn sample(&self, values: &[f64]) -> Result<SampledGrid, ConversionError> {
        Ok(self.sampler.sample(&self.interp, values)?)
    }
}

/// Mesh-to-grid converter.
///
/// # Example
///
/// ```
/// use seisgrid::io::{MemoryGridWriter, MemorySource};
/// use seisgrid::pipeline::{ConversionConfig, Converter};
///
/// let source = MemorySource::new(
///     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
///     vec![[0, 1, 2], [1, 3, 2]],
/// )
/// .with_field("u3", vec![vec![1.0, 1.0]]);
///
/// let config = ConversionConfig::from_definitions("EPSG:4326", "EPSG:4326")
///     .unwrap()
///     .only_vertical()
///     .with_edge_step(0.5)
///     .with_resolution(0.25, 0.25);
///
/// let mut writer = MemoryGridWriter::new();
/// let report = Converter::new(config).run(&source, &mut writer).unwrap();
///
/// assert_eq!(report.slices_written, 1);
/// assert_eq!(report.grid_shape, (4, 4));
/// ```
pub struct Converter {
    config: ConversionConfig,
    cache: Arc<dyn NodeValueCache>,
    abort: Arc<AtomicBool>,
}

impl Converter {
    /// Converter with an in-memory cache and a fresh abort flag.
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            cache: Arc::new(MemoryCache::new()),
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use `cache` for node values, e.g. a persistent
    /// [`NpyDirectoryCache`](crate::io::NpyDirectoryCache).
    pub fn with_cache(mut self, cache: Arc<dyn NodeValueCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Share an abort flag with the caller.
    pub fn with_abort_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = flag;
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<dyn NodeValueCache> {
        &self.cache
    }

    /// Handle for requesting an abort from another thread.
    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Request an abort; takes effect before the next slice.
    pub fn abort(&self) {
        self.abort.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }

    /// Convert the configured fields to a time series of grids.
    pub fn run(
        &self,
        source: &dyn GeometrySource,
        writer: &mut dyn GridWriter,
    ) -> Result<ConversionReport, ConversionError> {
        // Load
        let mesh = load_mesh(source).map_err(ConversionError::source_at(Stage::Load))?;
        self.check_variables(source)?;
        let instants = self.select_instants(source.n_time_steps());
        info!(
            n_vertices = mesh.n_vertices(),
            n_faces = mesh.n_faces(),
            variables = ?self.config.variables,
            n_instants = instants.len(),
            "loaded source"
        );

        let mut report = ConversionReport {
            instants: instants.clone(),
            ..Default::default()
        };

        // Aggregate
        if !self.aggregate(source, &mesh, &instants)? {
            warn!("conversion aborted during aggregation");
            report.aborted = true;
            return Ok(report);
        }

        // Reproject and sample setup
        let setup = self.prepare_sampling(&mesh)?;
        report.grid_shape = (setup.sampler.y().len(), setup.sampler.x().len());

        // Write
        let layout = GridLayout::TimeSeries {
            variables: self.config.variables.clone(),
        };
        writer.create(
            &self.config.output_header(),
            setup.sampler.x(),
            setup.sampler.y(),
            &layout,
        )?;

        'slices: for &instant in &instants {
            for variable in &self.config.variables {
                if self.is_aborted() {
                    warn!(
                        slices_written = report.slices_written,
                        "conversion aborted"
                    );
                    report.aborted = true;
                    break 'slices;
                }

                let key = CacheKey::new(variable.as_str(), instant);
                let values = self
                    .cache
                    .get(&key)
                    .map_err(ConversionError::cache_at(Stage::Write))?
                    .ok_or_else(|| ConversionError::MissingCacheEntry(key.clone()))?;

                let sampled = setup.sample(&values)?;
                writer.write_slice(variable, Some(instant), &sampled.grid)?;
                report.slices_written += 1;

                info!(
                    variable = variable.as_str(),
                    instant,
                    unresolved = sampled.unresolved.len(),
                    "wrote slice"
                );
                if !sampled.unresolved.is_empty() {
                    report.unresolved.push(SliceUnresolved {
                        variable: variable.clone(),
                        instant: Some(instant),
                        points: sampled.unresolved,
                    });
                }
            }
        }

        writer.finish()?;
        info!(
            slices_written = report.slices_written,
            aborted = report.aborted,
            unresolved = report.total_unresolved(),
            "conversion finished"
        );
        Ok(report)
    }

    /// Grid the mesh's own vertex elevations as a static `z` variable.
    ///
    /// No field data or cache is involved; the source only provides the mesh.
    pub fn convert_bathymetry(
        &self,
        source: &dyn GeometrySource,
        writer: &mut dyn GridWriter,
    ) -> Result<ConversionReport, ConversionError> {
        let mesh = load_mesh(source).map_err(ConversionError::source_at(Stage::Load))?;
        let elevations = mesh.elevations();

        let setup = self.prepare_sampling(&mesh)?;
        let mut report = ConversionReport {
            grid_shape: (setup.sampler.y().len(), setup.sampler.x().len()),
            ..Default::default()
        };

        if self.is_aborted() {
            report.aborted = true;
            return Ok(report);
        }

        let sampled = setup.sample(&elevations)?;
        writer.create(
            &self.config.output_header(),
            setup.sampler.x(),
            setup.sampler.y(),
            &GridLayout::Static {
                variables: vec![BATHYMETRY_VARIABLE.to_string()],
            },
        )?;
        writer.write_slice(BATHYMETRY_VARIABLE, None, &sampled.grid)?;
        writer.finish()?;
        report.slices_written = 1;

        if !sampled.unresolved.is_empty() {
            report.unresolved.push(SliceUnresolved {
                variable: BATHYMETRY_VARIABLE.to_string(),
                instant: None,
                points: sampled.unresolved,
            });
        }
        info!(
            rows = report.grid_shape.0,
            cols = report.grid_shape.1,
            unresolved = report.total_unresolved(),
            "wrote bathymetry"
        );
        Ok(report)
    }

    /// Fail before any work if a requested field is absent.
    fn check_variables(&self, source: &dyn GeometrySource) -> Result<(), ConversionError> {
        let available = source.variables();
        match self
            .config
            .variables
            .iter()
            .find(|v| !available.contains(v))
        {
            Some(missing) => Err(ConversionError::Source {
                stage: Stage::Load,
                source: SourceDataError::UnknownVariable(missing.clone()),
            }),
            None => Ok(()),
        }
    }

    /// Requested instants that exist, without duplicates, in request order.
    fn select_instants(&self, n_time_steps: usize) -> Vec<usize> {
        let Some(requested) = &self.config.instants else {
            return (0..n_time_steps).collect();
        };

        let mut selected = Vec::with_capacity(requested.len());
        for &instant in requested {
            if instant >= n_time_steps {
                warn!(instant, n_time_steps, "dropping out-of-range instant");
            } else if !selected.contains(&instant) {
                selected.push(instant);
            }
        }
        selected
    }

    /// Fill the cache. Returns `false` if aborted.
    fn aggregate(
        &self,
        source: &dyn GeometrySource,
        mesh: &TriMesh,
        instants: &[usize],
    ) -> Result<bool, ConversionError> {
        let mut missing = Vec::new();
        for &instant in instants {
            for variable in &self.config.variables {
                let key = CacheKey::new(variable.as_str(), instant);
                if self.cache.contains(&key) {
                    debug!(%key, "cache hit");
                } else {
                    missing.push(key);
                }
            }
        }
        if missing.is_empty() {
            return Ok(true);
        }

        let aggregator = NodeAggregator::new(mesh)?;
        let computed = missing.len();
        for key in missing {
            if self.is_aborted() {
                return Ok(false);
            }
            let samples = read_face_field(source, &key.variable, key.instant, mesh.n_faces())
                .map_err(ConversionError::source_at(Stage::Aggregate))?;
            let values = aggregator.aggregate(&samples)?;
            self.cache
                .put(&key, &values)
                .map_err(ConversionError::cache_at(Stage::Aggregate))?;
            debug!(%key, "cache miss, aggregated");
        }

        info!(computed, "node values ready");
        Ok(true)
    }

    /// Reproject the mesh and build the sampler for its inscribed window.
    fn prepare_sampling(&self, mesh: &TriMesh) -> Result<SamplingSetup, ConversionError> {
        let transform = CrsTransform::new(&self.config.source_crs, &self.config.target_crs);

        let source_bounds = mesh.bounds().ok_or_else(|| ConversionError::Source {
            stage: Stage::Reproject,
            source: SourceDataError::Malformed("mesh has no vertices".to_string()),
        })?;
        let reprojected = reproject_mesh(&mesh.flatten(), &transform)?;
        let window = inscribed_rectangle(&source_bounds, &transform, self.config.edge_step)?;
        debug!(
            x_min = window.x_min,
            x_max = window.x_max,
            y_min = window.y_min,
            y_max = window.y_max,
            "inscribed window"
        );

        let spec = self.config.points.resolve()?;
        let sampler = GridSampler::from_spec(&spec, &window)?;

        let locator = TriangleLocator::with_tolerance(&reprojected, self.config.inside_tol);
        if locator.n_degenerate() > 0 {
            warn!(
                n_degenerate = locator.n_degenerate(),
                "degenerate triangles excluded from point location"
            );
        }
        let interp = MeshInterpolator::new(Arc::new(reprojected), Arc::new(locator))
            .with_epsilon(self.config.retry_shift())
            .with_max_retries(self.config.max_retries);

        Ok(SamplingSetup { sampler, interp })
    }
}
