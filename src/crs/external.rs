//! PROJ-backed CRS for definitions the built-in projections do not cover.
//!
//! Only compiled with the `proj` feature (requires libproj). Each CRS keeps
//! two transformers to and from WGS84 lon/lat, created once at parse time.

use std::fmt;

use parking_lot::Mutex;
use proj::Proj;

use super::error::ProjectionError;

const LONLAT: &str = "EPSG:4326";

/// PROJ transformers between a CRS and WGS84 lon/lat.
pub struct ExternalCrs {
    to_geographic: Mutex<Proj>,
    from_geographic: Mutex<Proj>,
    geographic: bool,
}

impl ExternalCrs {
    /// Build both transformers; fails if PROJ does not know `definition`.
    pub fn new(definition: &str) -> Result<Self, ProjectionError> {
        let create = |from: &str, to: &str| {
            Proj::new_known_crs(from, to, None)
                .map_err(|e| ProjectionError::invalid(definition, format!("PROJ: {}", e)))
        };
        Ok(Self {
            to_geographic: Mutex::new(create(definition, LONLAT)?),
            from_geographic: Mutex::new(create(LONLAT, definition)?),
            geographic: is_lonlat(definition),
        })
    }

    pub fn is_geographic(&self) -> bool {
        self.geographic
    }

    pub fn to_geographic(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        convert(&self.to_geographic, x, y)
    }

    pub fn from_geographic(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        convert(&self.from_geographic, lon, lat)
    }
}

impl fmt::Debug for ExternalCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalCrs")
            .field("geographic", &self.geographic)
            .finish_non_exhaustive()
    }
}

fn convert(proj: &Mutex<Proj>, x: f64, y: f64) -> Option<(f64, f64)> {
    let (u, v) = proj.lock().convert((x, y)).ok()?;
    (u.is_finite() && v.is_finite()).then_some((u, v))
}

/// Lon/lat PROJ strings; every other definition is treated as projected.
fn is_lonlat(definition: &str) -> bool {
    let lower = definition.to_ascii_lowercase();
    ["longlat", "latlong", "lonlat", "latlon"]
        .iter()
        .any(|p| lower.contains(&format!("+proj={}", p)))
}
