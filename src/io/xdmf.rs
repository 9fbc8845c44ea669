//! SeisSol surface output in XDMF format.
//!
//! The XDMF file is a light XML index; heavy data lives in raw binary
//! companion files referenced relative to the XDMF file:
//!
//! ```text
//! Domain
//! └── Grid (Collection, Temporal)
//!     └── Grid (Uniform)            one per time step
//!         ├── Topology  Triangle    → connect.bin   (n_faces × 3, Int)
//!         ├── Geometry  XYZ | XY    → geometry.bin  (n_vertices × 3, Float)
//!         ├── Time      Value="t"
//!         └── Attribute Center=Cell → u1.bin        (ndt × n_faces, Float)
//!                       optionally selected through a HyperSlab
//! ```
//!
//! Only `Format="Binary"` data items are read. HDF5-backed output is
//! reported as unsupported.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node, ParsingOptions};
use tracing::{debug, info};

use super::source::{GeometrySource, SourceDataError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NumberType {
    Float,
    Int,
    UInt,
}

/// A raw binary array on disk.
#[derive(Clone, Debug)]
struct BinaryItem {
    path: PathBuf,
    number_type: NumberType,
    precision: usize,
    big_endian: bool,
    dims: Vec<usize>,
}

impl BinaryItem {
    fn n_values(&self) -> usize {
        self.dims.iter().product()
    }

    /// Read `count` values starting at element `offset`, as raw bytes.
    fn read_bytes(&self, offset: usize, count: usize) -> Result<Vec<u8>, SourceDataError> {
        let io_err = |source| SourceDataError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = File::open(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceDataError::MissingFile(self.path.clone()),
            _ => io_err(e),
        })?;

        let start = (offset * self.precision) as u64;
        let len = (count * self.precision) as u64;
        let file_len = file.metadata().map_err(io_err)?.len();
        if file_len < start + len {
            return Err(SourceDataError::Truncated {
                path: self.path.clone(),
                expected: start + len,
                found: file_len,
            });
        }

        file.seek(SeekFrom::Start(start)).map_err(io_err)?;
        let mut buf = vec![0u8; len as usize];
        file.read_exact(&mut buf).map_err(io_err)?;
        Ok(buf)
    }

    fn read_f64(&self, offset: usize, count: usize) -> Result<Vec<f64>, SourceDataError> {
        let bytes = self.read_bytes(offset, count)?;
        let be = self.big_endian;
        let values: Vec<f64> = match (self.number_type, self.precision) {
            (NumberType::Float, 8) => decode::<8, _>(&bytes, be, f64::from_le_bytes, f64::from_be_bytes),
            (NumberType::Float, 4) => decode::<4, _>(&bytes, be, f32::from_le_bytes, f32::from_be_bytes)
                .into_iter()
                .map(f64::from)
                .collect(),
            _ => self
                .decode_integers(&bytes)?
                .into_iter()
                .map(|v| v as f64)
                .collect(),
        };
        Ok(values)
    }

    fn read_indices(&self, offset: usize, count: usize) -> Result<Vec<usize>, SourceDataError> {
        let bytes = self.read_bytes(offset, count)?;
        self.decode_integers(&bytes)?
            .into_iter()
            .map(|v| {
                usize::try_from(v).map_err(|_| {
                    SourceDataError::Malformed(format!(
                        "negative index {} in {}",
                        v,
                        self.path.display()
                    ))
                })
            })
            .collect()
    }

    fn decode_integers(&self, bytes: &[u8]) -> Result<Vec<i128>, SourceDataError> {
        let be = self.big_endian;
        let values: Vec<i128> = match (self.number_type, self.precision) {
            (NumberType::Int, 4) => decode::<4, _>(bytes, be, i32::from_le_bytes, i32::from_be_bytes)
                .into_iter()
                .map(i128::from)
                .collect(),
            (NumberType::Int, 8) => decode::<8, _>(bytes, be, i64::from_le_bytes, i64::from_be_bytes)
                .into_iter()
                .map(i128::from)
                .collect(),
            (NumberType::UInt, 4) => decode::<4, _>(bytes, be, u32::from_le_bytes, u32::from_be_bytes)
                .into_iter()
                .map(i128::from)
                .collect(),
            (NumberType::UInt, 8) => decode::<8, _>(bytes, be, u64::from_le_bytes, u64::from_be_bytes)
                .into_iter()
                .map(i128::from)
                .collect(),
            (t, p) => {
                return Err(SourceDataError::UnsupportedFormat(format!(
                    "{:?} with precision {} in {}",
                    t,
                    p,
                    self.path.display()
                )));
            }
        };
        Ok(values)
    }
}

fn decode<const N: usize, T>(
    bytes: &[u8],
    big_endian: bool,
    le: fn([u8; N]) -> T,
    be: fn([u8; N]) -> T,
) -> Vec<T> {
    bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut arr = [0u8; N];
            arr.copy_from_slice(chunk);
            if big_endian { be(arr) } else { le(arr) }
        })
        .collect()
}

/// Part of a binary item holding one field at one time step.
#[derive(Clone, Debug)]
struct FieldSlice {
    item: BinaryItem,
    offset: usize,
    count: usize,
}

#[derive(Clone, Debug)]
struct TimeStep {
    time: Option<f64>,
    attributes: Vec<(String, FieldSlice)>,
}

/// [`GeometrySource`] over a SeisSol XDMF surface output.
#[derive(Clone, Debug)]
pub struct XdmfSource {
    path: PathBuf,
    topology: BinaryItem,
    geometry: BinaryItem,
    steps: Vec<TimeStep>,
}

impl XdmfSource {
    /// Parse the XDMF index. Binary data is read lazily.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceDataError> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceDataError::MissingFile(path.clone()),
            _ => SourceDataError::Io {
                path: path.clone(),
                source: e,
            },
        })?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let source = Self::parse(&text, &base, path)?;

        info!(
            path = %source.path.display(),
            n_time_steps = source.steps.len(),
            variables = ?source.variables(),
            "opened XDMF output"
        );
        Ok(source)
    }

    fn parse(text: &str, base: &Path, path: PathBuf) -> Result<Self, SourceDataError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(text, options)
            .map_err(|e| SourceDataError::Xml(e.to_string()))?;

        let domain = child(doc.root_element(), "Domain")
            .ok_or_else(|| malformed("no <Domain> element"))?;
        let top = child(domain, "Grid").ok_or_else(|| malformed("no <Grid> element"))?;

        let grids: Vec<Node> = if top.attribute("GridType") == Some("Collection") {
            children(top, "Grid").collect()
        } else {
            vec![top]
        };
        let first = *grids
            .first()
            .ok_or_else(|| malformed("temporal collection has no grids"))?;

        let topology_node =
            child(first, "Topology").ok_or_else(|| malformed("no <Topology> element"))?;
        match topology_node.attribute("TopologyType") {
            Some(t) if t.eq_ignore_ascii_case("triangle") => {}
            other => {
                return Err(malformed(format!(
                    "topology must be Triangle, found {:?}",
                    other.unwrap_or("none")
                )));
            }
        }
        let topology = binary_item(data_item(topology_node)?, base)?;
        if topology.dims.len() != 2 || topology.dims[1] != 3 {
            return Err(malformed(format!(
                "connectivity dimensions {:?} are not N x 3",
                topology.dims
            )));
        }
        if topology.number_type == NumberType::Float {
            return Err(malformed("connectivity must be integer"));
        }

        let geometry_node =
            child(first, "Geometry").ok_or_else(|| malformed("no <Geometry> element"))?;
        let components = match geometry_node.attribute("GeometryType").unwrap_or("XYZ") {
            "XYZ" => 3,
            "XY" => 2,
            other => {
                return Err(SourceDataError::UnsupportedFormat(format!(
                    "geometry type {}",
                    other
                )));
            }
        };
        let geometry = binary_item(data_item(geometry_node)?, base)?;
        if geometry.dims.len() != 2 || geometry.dims[1] != components {
            return Err(malformed(format!(
                "geometry dimensions {:?} do not match {} components",
                geometry.dims, components
            )));
        }

        let n_faces = topology.dims[0];
        let steps = grids
            .iter()
            .map(|&grid| time_step(grid, base, n_faces))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            path,
            topology,
            geometry,
            steps,
        })
    }

    /// Path of the XDMF file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of faces declared by the topology.
    pub fn n_faces(&self) -> usize {
        self.topology.dims[0]
    }

    /// Simulation time of every step; steps without a `<Time>` use their index.
    pub fn times(&self) -> Vec<f64> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, s)| s.time.unwrap_or(i as f64))
            .collect()
    }
}

impl GeometrySource for XdmfSource {
    fn vertices(&self) -> Result<Vec<[f64; 3]>, SourceDataError> {
        let components = self.geometry.dims[1];
        let flat = self.geometry.read_f64(0, self.geometry.n_values())?;
        Ok(flat
            .chunks_exact(components)
            .map(|c| [c[0], c[1], if components == 3 { c[2] } else { 0.0 }])
            .collect())
    }

    fn faces(&self) -> Result<Vec<[usize; 3]>, SourceDataError> {
        let flat = self.topology.read_indices(0, self.topology.n_values())?;
        Ok(flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
    }

    fn n_time_steps(&self) -> usize {
        self.steps.len()
    }

    fn variables(&self) -> Vec<String> {
        self.steps
            .first()
            .map(|s| s.attributes.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    }

    fn read_field(&self, name: &str, instant: usize) -> Result<Vec<f64>, SourceDataError> {
        let step = self
            .steps
            .get(instant)
            .ok_or(SourceDataError::InstantOutOfRange {
                instant,
                n_time_steps: self.steps.len(),
            })?;
        let (_, slice) = step
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| SourceDataError::UnknownVariable(name.to_string()))?;

        debug!(variable = name, instant, file = %slice.item.path.display(), "reading field");
        slice.item.read_f64(slice.offset, slice.count)
    }
}

fn malformed(msg: impl Into<String>) -> SourceDataError {
    SourceDataError::Malformed(msg.into())
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn child<'a, 'input: 'a>(node: Node<'a, 'input>, tag: &'a str) -> Option<Node<'a, 'input>> {
    children(node, tag).next()
}

fn data_item<'a, 'input: 'a>(node: Node<'a, 'input>) -> Result<Node<'a, 'input>, SourceDataError> {
    child(node, "DataItem").ok_or_else(|| {
        malformed(format!(
            "<{}> has no <DataItem>",
            node.tag_name().name()
        ))
    })
}

fn parse_dims(node: Node) -> Result<Vec<usize>, SourceDataError> {
    let text = node
        .attribute("Dimensions")
        .ok_or_else(|| malformed("<DataItem> without Dimensions"))?;
    text.split_whitespace()
        .map(|d| {
            d.parse::<usize>()
                .map_err(|_| malformed(format!("bad dimension '{}'", d)))
        })
        .collect()
}

/// Describe a `Format="Binary"` data item.
fn binary_item(node: Node, base: &Path) -> Result<BinaryItem, SourceDataError> {
    let format = node.attribute("Format").unwrap_or("XML");
    if !format.eq_ignore_ascii_case("binary") {
        return Err(SourceDataError::UnsupportedFormat(format!(
            "{} data item ({})",
            format,
            node.text().unwrap_or("").trim()
        )));
    }

    let number_type = match node
        .attribute("NumberType")
        .or_else(|| node.attribute("DataType"))
        .unwrap_or("Float")
    {
        "Float" => NumberType::Float,
        "Int" => NumberType::Int,
        "UInt" => NumberType::UInt,
        other => {
            return Err(SourceDataError::UnsupportedFormat(format!(
                "number type {}",
                other
            )));
        }
    };
    let precision = match node.attribute("Precision").unwrap_or("4") {
        "4" => 4,
        "8" => 8,
        other => {
            return Err(SourceDataError::UnsupportedFormat(format!(
                "precision {}",
                other
            )));
        }
    };
    let big_endian = node
        .attribute("Endian")
        .is_some_and(|e| e.eq_ignore_ascii_case("big"));

    let file = node
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| malformed("binary <DataItem> without a file name"))?;

    Ok(BinaryItem {
        path: base.join(file),
        number_type,
        precision,
        big_endian,
        dims: parse_dims(node)?,
    })
}

/// Attributes and time of one uniform grid.
fn time_step(grid: Node, base: &Path, n_faces: usize) -> Result<TimeStep, SourceDataError> {
    let time = match child(grid, "Time").and_then(|t| t.attribute("Value")) {
        Some(v) => Some(
            v.trim()
                .parse::<f64>()
                .map_err(|_| malformed(format!("bad time value '{}'", v)))?,
        ),
        None => None,
    };

    let mut attributes = Vec::new();
    for attr in children(grid, "Attribute") {
        let name = attr
            .attribute("Name")
            .ok_or_else(|| malformed("<Attribute> without Name"))?;
        if attr.attribute("Center").is_some_and(|c| c != "Cell") {
            continue;
        }
        attributes.push((name.to_string(), field_slice(data_item(attr)?, base, n_faces)?));
    }

    Ok(TimeStep { time, attributes })
}

/// Locate one field: a plain binary item or a HyperSlab row of one.
fn field_slice(item: Node, base: &Path, n_faces: usize) -> Result<FieldSlice, SourceDataError> {
    if item.attribute("ItemType") != Some("HyperSlab") {
        let item = binary_item(item, base)?;
        if item.n_values() != n_faces {
            return Err(malformed(format!(
                "{} holds {} values, expected {}",
                item.path.display(),
                item.n_values(),
                n_faces
            )));
        }
        return Ok(FieldSlice {
            item,
            offset: 0,
            count: n_faces,
        });
    }

    let mut inner = children(item, "DataItem");
    let (selection, data) = match (inner.next(), inner.next()) {
        (Some(s), Some(d)) => (s, d),
        _ => return Err(malformed("HyperSlab needs a selection and a data item")),
    };

    // start, stride, count rows of a 3 x rank table
    let params: Vec<usize> = selection
        .text()
        .unwrap_or("")
        .split_whitespace()
        .map(|v| {
            v.parse::<usize>()
                .map_err(|_| malformed(format!("bad HyperSlab value '{}'", v)))
        })
        .collect::<Result<_, _>>()?;

    let data = binary_item(data, base)?;
    let (row_len, rank) = match data.dims.as_slice() {
        &[n] => (n, 1),
        &[_, n] => (n, 2),
        dims => return Err(malformed(format!("unsupported HyperSlab rank {:?}", dims))),
    };
    if params.len() != 3 * rank {
        return Err(malformed(format!(
            "HyperSlab selection has {} values, expected {}",
            params.len(),
            3 * rank
        )));
    }

    let start = &params[..rank];
    let stride = &params[rank..2 * rank];
    let count = &params[2 * rank..];
    if stride.iter().any(|&s| s != 1) {
        return Err(malformed(format!("unsupported HyperSlab stride {:?}", stride)));
    }
    // Several rows are only one contiguous run when each spans a full row
    if rank == 2 && count[0] > 1 && (start[1] != 0 || count[1] != row_len) {
        return Err(malformed(format!(
            "HyperSlab {:?} x {:?} is not contiguous in rows of {}",
            start, count, row_len
        )));
    }
    let offset = if rank == 2 {
        start[0] * row_len + start[1]
    } else {
        start[0]
    };
    let n: usize = count.iter().product();
    if n != n_faces {
        return Err(malformed(format!(
            "HyperSlab selects {} values, mesh has {} faces",
            n, n_faces
        )));
    }

    Ok(FieldSlice {
        item: data,
        offset,
        count: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_bytes(dir: &Path, name: &str, bytes: &[u8]) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(bytes).unwrap();
    }

    fn grid_xml(t: usize, ndt: usize) -> String {
        format!(
            r#"
   <Grid Name="step_{t}" GridType="Uniform">
    <Topology TopologyType="Triangle" NumberOfElements="2">
     <DataItem NumberType="Int" Precision="8" Format="Binary" Dimensions="2 3">out_cell/connect.bin</DataItem>
    </Topology>
    <Geometry name="geo" GeometryType="XYZ" NumberOfElements="4">
     <DataItem NumberType="Float" Precision="8" Format="Binary" Dimensions="4 3">out_vertex/geometry.bin</DataItem>
    </Geometry>
    <Time Value="{time}"/>
    <Attribute Name="u3" Center="Cell">
     <DataItem ItemType="HyperSlab" Dimensions="2">
      <DataItem NumberType="UInt" Precision="4" Format="XML" Dimensions="3 2">{t} 0 1 1 1 2</DataItem>
      <DataItem NumberType="Float" Precision="8" Format="Binary" Dimensions="{ndt} 2">out_cell/u3.bin</DataItem>
     </DataItem>
    </Attribute>
    <Attribute Name="u1" Center="Cell">
     <DataItem ItemType="HyperSlab" Dimensions="2">
      <DataItem NumberType="UInt" Precision="4" Format="XML" Dimensions="3 2">{t} 0 1 1 1 2</DataItem>
      <DataItem NumberType="Float" Precision="4" Endian="Big" Format="Binary" Dimensions="{ndt} 2">out_cell/u1.bin</DataItem>
     </DataItem>
    </Attribute>
   </Grid>"#,
            t = t,
            ndt = ndt,
            time = t as f64 * 2.5
        )
    }

    fn write_case(dir: &Path, ndt: usize) -> PathBuf {
        std::fs::create_dir_all(dir.join("out_cell")).unwrap();
        std::fs::create_dir_all(dir.join("out_vertex")).unwrap();

        let geometry: Vec<u8> = [
            0.0f64, 0.0, -10.0, 1.0, 0.0, -20.0, 0.0, 1.0, -30.0, 1.0, 1.0, -40.0,
        ]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
        write_bytes(dir, "out_vertex/geometry.bin", &geometry);

        let connect: Vec<u8> = [0i64, 1, 2, 1, 3, 2]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        write_bytes(dir, "out_cell/connect.bin", &connect);

        let u3: Vec<u8> = (0..ndt * 2)
            .flat_map(|i| (i as f64 * 10.0).to_le_bytes())
            .collect();
        write_bytes(dir, "out_cell/u3.bin", &u3);

        let u1: Vec<u8> = (0..ndt * 2)
            .flat_map(|i| (i as f32 + 0.5).to_be_bytes())
            .collect();
        write_bytes(dir, "out_cell/u1.bin", &u1);

        let grids: String = (0..ndt).map(|t| grid_xml(t, ndt)).collect();
        let xml = format!(
            r#"<?xml version="1.0" ?>
<!DOCTYPE Xdmf SYSTEM "Xdmf.dtd" []>
<Xdmf Version="2.0">
 <Domain>
  <Grid Name="TimeSeries" GridType="Collection" CollectionType="Temporal">{}
  </Grid>
 </Domain>
</Xdmf>
"#,
            grids
        );
        let path = dir.join("out-surface.xdmf");
        std::fs::write(&path, xml).unwrap();
        path
    }

    #[test]
    fn test_read_binary_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_case(dir.path(), 3);
        let source = XdmfSource::open(&path).unwrap();

        assert_eq!(source.n_time_steps(), 3);
        assert_eq!(source.n_faces(), 2);
        assert_eq!(source.variables(), vec!["u3".to_string(), "u1".to_string()]);
        assert_eq!(source.times(), vec![0.0, 2.5, 5.0]);

        let vertices = source.vertices().unwrap();
        assert_eq!(vertices[3], [1.0, 1.0, -40.0]);
        assert_eq!(source.faces().unwrap(), vec![[0, 1, 2], [1, 3, 2]]);

        assert_eq!(source.read_field("u3", 0).unwrap(), vec![0.0, 10.0]);
        assert_eq!(source.read_field("u3", 2).unwrap(), vec![40.0, 50.0]);
        assert_eq!(source.read_field("u1", 1).unwrap(), vec![2.5, 3.5]);
    }

    fn rewrite_selection(path: &Path, from: &str, to: &str) {
        let xml = std::fs::read_to_string(path).unwrap().replace(from, to);
        std::fs::write(path, xml).unwrap();
    }

    #[test]
    fn test_hyperslab_stride_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_case(dir.path(), 1);
        rewrite_selection(&path, ">0 0 1 1 1 2<", ">0 0 1 2 1 2<");

        let err = XdmfSource::open(&path).unwrap_err();
        assert!(matches!(err, SourceDataError::Malformed(m) if m.contains("stride")));
    }

    #[test]
    fn test_hyperslab_column_block_rejected() {
        // Two rows of one column each: two values, but not adjacent in the file
        let dir = tempfile::tempdir().unwrap();
        let path = write_case(dir.path(), 2);
        rewrite_selection(&path, ">0 0 1 1 1 2<", ">0 0 1 1 2 1<");

        let err = XdmfSource::open(&path).unwrap_err();
        assert!(matches!(err, SourceDataError::Malformed(m) if m.contains("contiguous")));
    }

    #[test]
    fn test_unknown_variable_and_instant() {
        let dir = tempfile::tempdir().unwrap();
        let source = XdmfSource::open(write_case(dir.path(), 2)).unwrap();
        assert!(matches!(
            source.read_field("u2", 0),
            Err(SourceDataError::UnknownVariable(_))
        ));
        assert!(matches!(
            source.read_field("u3", 2),
            Err(SourceDataError::InstantOutOfRange { instant: 2, .. })
        ));
    }

    #[test]
    fn test_missing_companion_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_case(dir.path(), 1);
        std::fs::remove_file(dir.path().join("out_vertex/geometry.bin")).unwrap();

        let source = XdmfSource::open(&path).unwrap();
        assert!(matches!(
            source.vertices(),
            Err(SourceDataError::MissingFile(p)) if p.ends_with("geometry.bin")
        ));
    }

    #[test]
    fn test_truncated_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_case(dir.path(), 2);
        write_bytes(dir.path(), "out_cell/u3.bin", &[0u8; 20]);

        let source = XdmfSource::open(&path).unwrap();
        assert!(source.read_field("u3", 0).is_ok());
        assert!(matches!(
            source.read_field("u3", 1),
            Err(SourceDataError::Truncated {
                expected: 32,
                found: 20,
                ..
            })
        ));
    }

    #[test]
    fn test_hdf5_is_unsupported() {
        let xml = r#"<Xdmf><Domain><Grid GridType="Uniform">
            <Topology TopologyType="Triangle">
              <DataItem NumberType="Int" Precision="8" Format="HDF" Dimensions="2 3">out.h5:/connect</DataItem>
            </Topology>
        </Grid></Domain></Xdmf>"#;
        let err = XdmfSource::parse(xml, Path::new("."), PathBuf::from("x.xdmf")).unwrap_err();
        assert!(matches!(err, SourceDataError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_non_triangle_topology() {
        let xml = r#"<Xdmf><Domain><Grid GridType="Uniform">
            <Topology TopologyType="Tetrahedron">
              <DataItem NumberType="Int" Precision="8" Format="Binary" Dimensions="2 4">c.bin</DataItem>
            </Topology>
        </Grid></Domain></Xdmf>"#;
        let err = XdmfSource::parse(xml, Path::new("."), PathBuf::from("x.xdmf")).unwrap_err();
        assert!(matches!(err, SourceDataError::Malformed(_)));
    }

    #[test]
    fn test_missing_xdmf() {
        assert!(matches!(
            XdmfSource::open("/nonexistent/out.xdmf"),
            Err(SourceDataError::MissingFile(_))
        ));
    }
}
