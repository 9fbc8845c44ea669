//! Node value cache.
//!
//! Aggregated node values are deterministic per `(variable, instant)`, so
//! they can be stored and reused across runs. The pipeline takes any
//! [`NodeValueCache`]:
//!
//! - [`MemoryCache`]: process-local map
//! - [`NpyDirectoryCache`]: one NumPy `.npy` file per key in a directory,
//!   named `node_values_{variable}_timestep{instant}.npy`

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

/// Error type for cache storage.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid .npy file {path}: {reason}")]
    Format { path: PathBuf, reason: String },
}

/// Cache key: one field at one time step.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub variable: String,
    pub instant: usize,
}

impl CacheKey {
    pub fn new(variable: impl Into<String>, instant: usize) -> Self {
        Self {
            variable: variable.into(),
            instant,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_values_{}_timestep{}", self.variable, self.instant)
    }
}

/// Key → node value array store.
pub trait NodeValueCache: Send + Sync {
    /// Stored values for `key`, if any.
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<f64>>, CacheError>;

    /// Store values for `key`, replacing any previous entry.
    fn put(&self, key: &CacheKey, values: &[f64]) -> Result<(), CacheError>;

    /// Whether `key` is present.
    fn contains(&self, key: &CacheKey) -> bool;
}

/// In-memory cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, Vec<f64>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl NodeValueCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<f64>>, CacheError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &CacheKey, values: &[f64]) -> Result<(), CacheError> {
        self.entries.write().insert(key.clone(), values.to_vec());
        Ok(())
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().contains_key(key)
    }
}

const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Directory of `.npy` files, one per key.
///
/// Files are written to a temporary name and renamed into place, so an
/// interrupted write never leaves a partial entry under the final name.
#[derive(Clone, Debug)]
pub struct NpyDirectoryCache {
    dir: PathBuf,
}

impl NpyDirectoryCache {
    /// Use (and create if needed) `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CacheError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `key`.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.npy", key))
    }
}

impl NodeValueCache for NpyDirectoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<f64>>, CacheError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        decode_npy(&bytes)
            .map(Some)
            .map_err(|reason| CacheError::Format { path, reason })
    }

    fn put(&self, key: &CacheKey, values: &[f64]) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let tmp = self
            .dir
            .join(format!(".{}.npy.{}.tmp", key, std::process::id()));
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| CacheError::Io { path, source }
        };

        let mut file = fs::File::create(&tmp).map_err(io_err(&tmp))?;
        file.write_all(&encode_npy(values)).map_err(io_err(&tmp))?;
        file.sync_all().map_err(io_err(&tmp))?;
        drop(file);
        fs::rename(&tmp, &path).map_err(io_err(&path))?;

        debug!(path = %path.display(), n = values.len(), "cached node values");
        Ok(())
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }
}

/// Serialise a 1-D `<f8` array as NPY version 1.0.
pub fn encode_npy(values: &[f64]) -> Vec<u8> {
    let header = npy_header(values.len());

    let mut out = Vec::with_capacity(10 + header.len() + values.len() * 8);
    out.extend_from_slice(NPY_MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Version 1.0 header dictionary for `n` float64 values, newline-terminated.
fn npy_header(n: usize) -> String {
    let mut header = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({},), }}",
        n
    );
    // magic(6) + version(2) + header_len(2) + header, padded to 64 bytes
    let unpadded = 10 + header.len() + 1;
    let padding = (64 - unpadded % 64) % 64;
    header.push_str(&" ".repeat(padding));
    header.push('\n');
    header
}

/// Parse a 1-D little-endian float64 NPY file (version 1.x or 2.x).
pub fn decode_npy(bytes: &[u8]) -> Result<Vec<f64>, String> {
    if bytes.len() < 10 || &bytes[..6] != NPY_MAGIC {
        return Err("missing NPY magic".to_string());
    }
    let (header_len, header_start) = match bytes[6] {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 if bytes.len() >= 12 => (
            u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
            12,
        ),
        v => return Err(format!("unsupported NPY version {}", v)),
    };
    let data_start = header_start + header_len;
    let header = bytes
        .get(header_start..data_start)
        .and_then(|h| std::str::from_utf8(h).ok())
        .ok_or("truncated or non-UTF-8 header")?;

    if !header.contains("'descr': '<f8'") {
        return Err(format!("expected dtype '<f8', header is {}", header.trim()));
    }
    let n = parse_1d_shape(header)?;

    let n_bytes = n
        .checked_mul(8)
        .ok_or_else(|| format!("shape ({},) is too large", n))?;
    let data = &bytes[data_start..];
    if data.len() != n_bytes {
        return Err(format!("expected {} data bytes, found {}", n_bytes, data.len()));
    }
    Ok(data
        .chunks_exact(8)
        .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect())
}

fn parse_1d_shape(header: &str) -> Result<usize, String> {
    let start = header
        .find("'shape':")
        .ok_or("header has no shape")?
        + "'shape':".len();
    let rest = header[start..].trim_start();
    let inner = rest
        .strip_prefix('(')
        .and_then(|r| r.split_once(')'))
        .map(|(inner, _)| inner)
        .ok_or("malformed shape")?;
    let dims: Vec<&str> = inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    match dims.as_slice() {
        [n] => n.parse().map_err(|_| format!("bad shape value '{}'", n)),
        _ => Err(format!("expected a 1-D array, shape is ({})", inner)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name() {
        assert_eq!(CacheKey::new("u3", 12).to_string(), "node_values_u3_timestep12");
    }

    #[test]
    fn test_memory_cache() {
        let cache = MemoryCache::new();
        let key = CacheKey::new("u1", 0);
        assert!(!cache.contains(&key));
        assert_eq!(cache.get(&key).unwrap(), None);

        cache.put(&key, &[1.0, 2.0]).unwrap();
        assert!(cache.contains(&key));
        assert_eq!(cache.get(&key).unwrap(), Some(vec![1.0, 2.0]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_npy_header_is_aligned() {
        // Shapes with 1 to 19 digits shift the unpadded header length
        for n in [0, 7, 1000, 123_456_789, 1 << 40, usize::MAX] {
            let header = npy_header(n);
            assert_eq!((10 + header.len()) % 64, 0, "shape {}", n);
            assert!(header.ends_with('\n'));
            assert!(header.contains(&format!("'shape': ({},)", n)));
        }

        let bytes = encode_npy(&[0.0; 3]);
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % 64, 0);
        assert_eq!(bytes.len(), 10 + header_len + 24);
    }

    #[test]
    fn test_npy_decode_rejects_oversized_shape() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(NPY_MAGIC);
        bytes.extend_from_slice(&[1, 0]);
        let header = npy_header(4_611_686_018_427_387_905);
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&1.0f64.to_le_bytes());

        assert!(decode_npy(&bytes).unwrap_err().contains("too large"));
    }

    #[test]
    fn test_npy_decode_rejects_bad_input() {
        assert!(decode_npy(b"not an npy").is_err());

        let mut bytes = encode_npy(&[1.0, 2.0]);
        bytes.pop();
        assert!(decode_npy(&bytes).unwrap_err().contains("data bytes"));

        let f4 = encode_npy(&[1.0]);
        let text = String::from_utf8_lossy(&f4).replace("<f8", "<f4");
        assert!(decode_npy(text.as_bytes()).is_err());
    }

    #[test]
    fn test_npy_known_bytes() {
        // Header written by numpy.save(np.array([1.5]))
        let header = "{'descr': '<f8', 'fortran_order': False, 'shape': (1,), }";
        let mut bytes = Vec::new();
        bytes.extend_from_slice(NPY_MAGIC);
        bytes.extend_from_slice(&[1, 0]);
        let padded = format!("{:<117}\n", header);
        bytes.extend_from_slice(&(padded.len() as u16).to_le_bytes());
        bytes.extend_from_slice(padded.as_bytes());
        bytes.extend_from_slice(&1.5f64.to_le_bytes());

        assert_eq!(decode_npy(&bytes).unwrap(), vec![1.5]);
    }

    #[test]
    fn test_directory_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NpyDirectoryCache::new(dir.path().join("nodes_arrays")).unwrap();
        let key = CacheKey::new("u3", 4);

        assert!(!cache.contains(&key));
        assert_eq!(cache.get(&key).unwrap(), None);

        let values = vec![0.25, -1.0, 1e-300, f64::MAX];
        cache.put(&key, &values).unwrap();
        assert!(cache.contains(&key));
        assert!(cache.path_for(&key).ends_with("node_values_u3_timestep4.npy"));
        assert_eq!(cache.get(&key).unwrap(), Some(values));

        // Only the final file remains
        let names: Vec<_> = fs::read_dir(cache.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_directory_cache_corrupt_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NpyDirectoryCache::new(dir.path()).unwrap();
        let key = CacheKey::new("u1", 0);
        fs::write(cache.path_for(&key), b"garbage").unwrap();
        assert!(matches!(cache.get(&key), Err(CacheError::Format { .. })));
    }
}
