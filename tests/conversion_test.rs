//! Integration tests for the mesh-to-grid conversion.
//!
//! These tests verify:
//! - Two-triangle interpolation at the mesh vertices
//! - Full pipeline runs on projected (UTM) input
//! - Node value caching across runs (`.npy` directory cache)
//! - Abort handling between slices
//! - Conversion of SeisSol XDMF binary output

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use approx::assert_relative_eq;
use seisgrid::crs::{Crs, CrsTransform, reproject_mesh};
use seisgrid::grid::{GridSampler, StructuredGrid};
use seisgrid::interp::{MeshInterpolator, TriangleLocator};
use seisgrid::io::{
    GeometrySource, GridHeader, GridLayout, GridWriter, MemoryGridWriter, MemorySource,
    NodeValueCache, NpyDirectoryCache, WriteError, XdmfSource,
};
use seisgrid::mesh::TriMesh;
use seisgrid::pipeline::{ConversionConfig, Converter, Stage};

/// Regular triangulation of `[x0, x0 + n·h] × [y0, y0 + n·h]`.
fn grid_mesh(x0: f64, y0: f64, h: f64, n: usize) -> (Vec<[f64; 3]>, Vec<[usize; 3]>) {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            vertices.push([x0 + i as f64 * h, y0 + j as f64 * h, -100.0 - j as f64]);
        }
    }
    let mut faces = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let v0 = j * (n + 1) + i;
            let v1 = v0 + 1;
            let v2 = v0 + n + 1;
            let v3 = v2 + 1;
            faces.push([v0, v1, v2]);
            faces.push([v1, v3, v2]);
        }
    }
    (vertices, faces)
}

#[test]
fn test_two_triangles_sampled_at_vertices() {
    let mesh = Arc::new(
        TriMesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
            ],
            vec![[0, 1, 2], [1, 3, 2]],
        )
        .unwrap(),
    );
    let locator = Arc::new(TriangleLocator::new(&mesh));
    let interp = MeshInterpolator::new(mesh, locator);

    let sampler = GridSampler::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
    let sampled = sampler.sample(&interp, &[0.0, 0.0, 0.0, 10.0]).unwrap();

    assert!(sampled.unresolved.is_empty());
    // Row-major: (x0,y0) (x1,y0) (x0,y1) (x1,y1)
    let values = sampled.grid.values();
    for (got, want) in values.iter().zip([0.0, 0.0, 0.0, 10.0]) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }
}

#[test]
fn test_utm_mesh_to_geographic_grid() {
    // 200 km square in UTM zone 35N, around 26-28°E, 36-38°N
    let (vertices, faces) = grid_mesh(400_000.0, 4_000_000.0, 20_000.0, 10);
    let n_faces = faces.len();
    let source = MemorySource::new(vertices, faces)
        .with_field("u3", vec![vec![0.5; n_faces], vec![-1.25; n_faces]]);

    let config = ConversionConfig::from_definitions("EPSG:32635", "EPSG:4326")
        .unwrap()
        .only_vertical()
        .with_edge_step(1000.0)
        .with_resolution(0.05, 0.05);

    let mut writer = MemoryGridWriter::new();
    let report = Converter::new(config).run(&source, &mut writer).unwrap();

    assert_eq!(report.slices_written, 2);
    let (rows, cols) = report.grid_shape;
    assert!(rows > 20 && cols > 20);

    let x = writer.x().unwrap();
    let y = writer.y().unwrap();
    assert!(x[0] > 25.8 && x[x.len() - 1] < 28.3);
    assert!(y[0] > 36.0 && y[y.len() - 1] < 38.0);

    for (instant, expected) in [(0, 0.5), (1, -1.25)] {
        let grid = writer.slice("u3", Some(instant)).unwrap();
        let resolved: Vec<f64> = grid.values().iter().copied().filter(|v| !v.is_nan()).collect();
        assert!(resolved.len() * 10 >= grid.values().len() * 9);
        for v in resolved {
            assert_relative_eq!(v, expected, epsilon = 1e-9);
        }
    }

    let header = writer.header().unwrap();
    assert_eq!(header.x_units, "degrees east");
}

#[test]
fn test_grid_points_lie_in_reprojected_footprint() {
    let (vertices, faces) = grid_mesh(500_000.0, 6_600_000.0, 5_000.0, 8);
    let mesh = TriMesh::new(vertices, faces).unwrap();
    let transform = CrsTransform::new(
        &Crs::parse("+proj=utm +zone=32 +datum=WGS84").unwrap(),
        &Crs::wgs84(),
    );
    let reprojected = reproject_mesh(&mesh.flatten(), &transform).unwrap();
    assert!(reprojected.shares_faces_with(&mesh));

    let footprint = reprojected.bounds().unwrap();
    let window =
        seisgrid::crs::inscribed_rectangle(&mesh.bounds().unwrap(), &transform, 500.0).unwrap();
    assert!(footprint.contains_bounds(&window));
    assert!(window.width() > 0.5 * footprint.width());
}

#[test]
fn test_npy_cache_is_reused_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("nodes_arrays");

    let (vertices, faces) = grid_mesh(0.0, 0.0, 0.25, 4);
    let n_faces = faces.len();
    let first = MemorySource::new(vertices.clone(), faces.clone())
        .with_field("u3", vec![vec![2.0; n_faces]]);
    let config = ConversionConfig::new(Crs::wgs84())
        .only_vertical()
        .with_edge_step(0.25)
        .with_resolution(0.1, 0.1);

    let cache = Arc::new(NpyDirectoryCache::new(&cache_dir).unwrap());
    let mut writer = MemoryGridWriter::new();
    Converter::new(config.clone())
        .with_cache(cache.clone())
        .run(&first, &mut writer)
        .unwrap();
    assert!(cache_dir.join("node_values_u3_timestep0.npy").is_file());

    // Different field data, same key: the cached node values win
    let second = MemorySource::new(vertices, faces).with_field("u3", vec![vec![9.0; n_faces]]);
    let reopened = Arc::new(NpyDirectoryCache::new(&cache_dir).unwrap());
    let mut writer = MemoryGridWriter::new();
    Converter::new(config)
        .with_cache(reopened.clone())
        .run(&second, &mut writer)
        .unwrap();

    let grid = writer.slice("u3", Some(0)).unwrap();
    assert!(grid.values().iter().all(|&v| (v - 2.0).abs() < 1e-12));
    assert_eq!(
        reopened.get(&seisgrid::io::CacheKey::new("u3", 0)).unwrap().map(|v| v.len()),
        Some(25)
    );
}

/// Writer that raises the abort flag once it has received `limit` slices.
struct AbortingWriter {
    inner: MemoryGridWriter,
    flag: Arc<AtomicBool>,
    limit: usize,
}

impl GridWriter for AbortingWriter {
    fn create(
        &mut self,
        header: &GridHeader,
        x: &[f64],
        y: &[f64],
        layout: &GridLayout,
    ) -> Result<(), WriteError> {
        self.inner.create(header, x, y, layout)
    }

    fn write_slice(
        &mut self,
        variable: &str,
        time_index: Option<usize>,
        grid: &StructuredGrid,
    ) -> Result<(), WriteError> {
        self.inner.write_slice(variable, time_index, grid)?;
        if self.inner.n_slices() >= self.limit {
            self.flag.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), WriteError> {
        self.inner.finish()
    }
}

#[test]
fn test_abort_between_slices() {
    let (vertices, faces) = grid_mesh(0.0, 0.0, 0.5, 2);
    let n_faces = faces.len();
    let steps: Vec<Vec<f64>> = (0..5).map(|t| vec![t as f64; n_faces]).collect();
    let source = MemorySource::new(vertices, faces)
        .with_field("u1", steps.clone())
        .with_field("u3", steps);

    let flag = Arc::new(AtomicBool::new(false));
    let config = ConversionConfig::new(Crs::wgs84())
        .with_variables(["u1", "u3"])
        .with_edge_step(0.5)
        .with_resolution(0.5, 0.5);
    let converter = Converter::new(config).with_abort_flag(flag.clone());

    let mut writer = AbortingWriter {
        inner: MemoryGridWriter::new(),
        flag,
        limit: 3,
    };
    let report = converter.run(&source, &mut writer).unwrap();

    assert!(report.aborted);
    assert_eq!(report.slices_written, 3);
    assert!(writer.inner.is_finished());
    let keys: Vec<_> = writer.inner.slice_keys().collect();
    assert_eq!(keys, vec![("u1", Some(0)), ("u1", Some(1)), ("u3", Some(0))]);
    // Written slices are complete
    let grid = writer.inner.slice("u1", Some(1)).unwrap();
    assert!(grid.values().iter().all(|&v| (v - 1.0).abs() < 1e-12));
}

fn write_xdmf_case(dir: &Path, ndt: usize) -> PathBuf {
    let (vertices, faces) = grid_mesh(0.0, 0.0, 0.5, 2);
    let n_faces = faces.len();

    let geometry: Vec<u8> = vertices
        .iter()
        .flatten()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    std::fs::write(dir.join("geometry.bin"), geometry).unwrap();

    let connect: Vec<u8> = faces
        .iter()
        .flatten()
        .flat_map(|&v| (v as i32).to_le_bytes())
        .collect();
    std::fs::write(dir.join("connect.bin"), connect).unwrap();

    let u3: Vec<u8> = (0..ndt)
        .flat_map(|t| std::iter::repeat(t as f64 * 0.1).take(n_faces))
        .flat_map(|v| v.to_le_bytes())
        .collect();
    std::fs::write(dir.join("u3.bin"), u3).unwrap();

    let grids: String = (0..ndt)
        .map(|t| {
            format!(
                r#"
   <Grid Name="step_{t}" GridType="Uniform">
    <Topology TopologyType="Triangle" NumberOfElements="{n_faces}">
     <DataItem NumberType="Int" Precision="4" Format="Binary" Dimensions="{n_faces} 3">connect.bin</DataItem>
    </Topology>
    <Geometry name="geo" GeometryType="XYZ" NumberOfElements="{n_vertices}">
     <DataItem NumberType="Float" Precision="8" Format="Binary" Dimensions="{n_vertices} 3">geometry.bin</DataItem>
    </Geometry>
    <Time Value="{t}"/>
    <Attribute Name="u3" Center="Cell">
     <DataItem ItemType="HyperSlab" Dimensions="{n_faces}">
      <DataItem NumberType="UInt" Precision="4" Format="XML" Dimensions="3 2">{t} 0 1 1 1 {n_faces}</DataItem>
      <DataItem NumberType="Float" Precision="8" Format="Binary" Dimensions="{ndt} {n_faces}">u3.bin</DataItem>
     </DataItem>
    </Attribute>
   </Grid>"#,
                t = t,
                ndt = ndt,
                n_faces = n_faces,
                n_vertices = vertices.len(),
            )
        })
        .collect();

    let path = dir.join("surface.xdmf");
    std::fs::write(
        &path,
        format!(
            r#"<?xml version="1.0" ?>
<Xdmf Version="2.0">
 <Domain>
  <Grid Name="TimeSeries" GridType="Collection" CollectionType="Temporal">{}
  </Grid>
 </Domain>
</Xdmf>
"#,
            grids
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_xdmf_source_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_xdmf_case(dir.path(), 3);
    let source = XdmfSource::open(&path).unwrap();
    assert_eq!(source.n_time_steps(), 3);
    assert_eq!(source.variables(), vec!["u3".to_string()]);

    let config = ConversionConfig::new(Crs::wgs84())
        .only_vertical()
        .with_instants(vec![2, 1, 5])
        .with_edge_step(0.5)
        .with_resolution(0.25, 0.25);

    let mut writer = MemoryGridWriter::new();
    let report = Converter::new(config).run(&source, &mut writer).unwrap();

    assert_eq!(report.instants, vec![2, 1]);
    assert_eq!(report.slices_written, 2);
    let grid = writer.slice("u3", Some(2)).unwrap();
    assert_eq!(grid.shape(), (4, 4));
    for &v in grid.values() {
        assert_relative_eq!(v, 0.2, epsilon = 1e-12);
    }

    // Bathymetry from the same output: z = -100 - row index of the vertex
    let mut writer = MemoryGridWriter::new();
    Converter::new(
        ConversionConfig::new(Crs::wgs84())
            .with_edge_step(0.5)
            .with_resolution(0.5, 0.5),
    )
    .convert_bathymetry(&source, &mut writer)
    .unwrap();
    let z = writer.slice("z", None).unwrap();
    assert_relative_eq!(z.value(0, 0), -100.0, epsilon = 1e-12);
    assert_relative_eq!(z.value(1, 0), -101.0, epsilon = 1e-12);
}

#[test]
fn test_missing_field_reports_load_stage() {
    let (vertices, faces) = grid_mesh(0.0, 0.0, 1.0, 1);
    let source = MemorySource::new(vertices, faces).with_field("u3", vec![vec![0.0, 0.0]]);
    let config = ConversionConfig::new(Crs::wgs84()).with_resolution(0.5, 0.5);

    let err = Converter::new(config)
        .run(&source, &mut MemoryGridWriter::new())
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Load);
}
