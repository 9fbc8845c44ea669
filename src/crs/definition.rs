//! CRS definitions parsed from EPSG codes and PROJ-style strings.
//!
//! Recognised forms:
//!
//! | Definition | Meaning |
//! |---|---|
//! | `EPSG:4326`, `EPSG:4258`, `+proj=longlat` | geographic lon/lat degrees |
//! | `EPSG:326zz`, `EPSG:327zz`, `EPSG:258zz` | UTM zone zz (WGS84 N/S, ETRS89) |
//! | `+proj=utm +zone=zz [+south]` | UTM |
//! | `+proj=tmerc +lat_0 +lon_0 +k_0 +x_0 +y_0` | transverse Mercator |
//! | `EPSG:3857`, `+proj=merc` | Mercator |
//!
//! Ellipsoids are chosen with `+ellps`, `+datum`, `+R` or `+a` together with
//! `+b`, `+rf` or `+f`. Datum shifts are not applied.
//!
//! With the `proj` feature, any other definition PROJ understands is accepted
//! and transformed by PROJ.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "proj")]
use std::sync::Arc;

use super::error::ProjectionError;
#[cfg(feature = "proj")]
use super::external::ExternalCrs;
use super::projection::{Ellipsoid, Mercator, Projection, TransverseMercator};

/// Projection family of a [`Crs`].
#[derive(Debug, Clone, Copy)]
pub enum CrsKind {
    /// Longitude / latitude in degrees
    Geographic(Ellipsoid),
    /// Transverse Mercator (including UTM)
    TransverseMercator(TransverseMercator),
    /// Normal-aspect Mercator
    Mercator(Mercator),
    /// Transformed by PROJ
    #[cfg(feature = "proj")]
    External,
}

/// A coordinate reference system.
///
/// Immutable once parsed; the original definition string is kept for
/// error messages and output metadata.
///
/// # Example
///
/// ```
/// use seisgrid::crs::Crs;
///
/// let utm = Crs::parse("+proj=utm +zone=35 +datum=WGS84").unwrap();
/// assert!(!utm.is_geographic());
///
/// let (lon, lat) = utm.to_geographic(500_000.0, 0.0).unwrap();
/// assert!((lon - 27.0).abs() < 1e-9);
/// assert!(lat.abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct Crs {
    definition: String,
    kind: CrsKind,
    #[cfg(feature = "proj")]
    external: Option<Arc<ExternalCrs>>,
}

impl Crs {
    /// Parse a CRS definition.
    pub fn parse(definition: &str) -> Result<Self, ProjectionError> {
        let trimmed = definition.trim();
        if trimmed.is_empty() {
            return Err(ProjectionError::invalid(definition, "empty definition"));
        }

        let builtin = match epsg_code(trimmed) {
            Some(code) => code
                .map_err(|reason| ProjectionError::invalid(definition, reason))
                .and_then(|code| from_epsg(definition, code)),
            None => from_proj_string(definition, trimmed),
        };

        match builtin {
            Ok(kind) => Ok(Self::builtin(trimmed, kind)),
            #[cfg(feature = "proj")]
            Err(builtin_err) => match ExternalCrs::new(trimmed) {
                Ok(external) => {
                    tracing::debug!(definition = trimmed, "using PROJ for CRS");
                    Ok(Self {
                        definition: trimmed.to_string(),
                        kind: CrsKind::External,
                        external: Some(Arc::new(external)),
                    })
                }
                Err(_) => Err(builtin_err),
            },
            #[cfg(not(feature = "proj"))]
            Err(e) => Err(e),
        }
    }

    fn builtin(definition: &str, kind: CrsKind) -> Self {
        Self {
            definition: definition.to_string(),
            kind,
            #[cfg(feature = "proj")]
            external: None,
        }
    }

    /// WGS84 geographic coordinates (EPSG:4326).
    pub fn wgs84() -> Self {
        Self::builtin("EPSG:4326", CrsKind::Geographic(Ellipsoid::WGS84))
    }

    /// The definition string this CRS was parsed from.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Projection family.
    pub fn kind(&self) -> &CrsKind {
        &self.kind
    }

    /// Whether coordinates are longitude / latitude degrees.
    pub fn is_geographic(&self) -> bool {
        match &self.kind {
            CrsKind::Geographic(_) => true,
            #[cfg(feature = "proj")]
            CrsKind::External => self.external.as_ref().is_some_and(|e| e.is_geographic()),
            _ => false,
        }
    }

    /// Convert native coordinates to geographic (lon, lat) degrees.
    pub fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        let result = match &self.kind {
            CrsKind::Geographic(_) => check_geographic(x, y),
            CrsKind::TransverseMercator(tm) => tm.inverse(x, y),
            CrsKind::Mercator(m) => m.inverse(x, y),
            #[cfg(feature = "proj")]
            CrsKind::External => self.external.as_ref().and_then(|e| e.to_geographic(x, y)),
        };
        result.ok_or_else(|| self.out_of_domain(x, y))
    }

    /// Convert geographic (lon, lat) degrees to native coordinates.
    pub fn from_geographic(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        let result = match &self.kind {
            CrsKind::Geographic(_) => check_geographic(lon, lat),
            CrsKind::TransverseMercator(tm) => tm.forward(lon, lat),
            CrsKind::Mercator(m) => m.forward(lon, lat),
            #[cfg(feature = "proj")]
            CrsKind::External => self
                .external
                .as_ref()
                .and_then(|e| e.from_geographic(lon, lat)),
        };
        result.ok_or_else(|| self.out_of_domain(lon, lat))
    }

    fn out_of_domain(&self, x: f64, y: f64) -> ProjectionError {
        ProjectionError::OutOfDomain {
            x,
            y,
            crs: self.definition.clone(),
        }
    }
}

impl FromStr for Crs {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.definition)
    }
}

fn check_geographic(lon: f64, lat: f64) -> Option<(f64, f64)> {
    (lon.is_finite() && lat.is_finite() && lat.abs() <= 90.0).then_some((lon, lat))
}

/// `Some` if the definition is an EPSG reference (`EPSG:n` or `+init=epsg:n`).
fn epsg_code(def: &str) -> Option<Result<u32, String>> {
    let lower = def.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("epsg:")
        .or_else(|| lower.strip_prefix("+init=epsg:"))?;
    Some(
        rest.trim()
            .parse::<u32>()
            .map_err(|_| format!("'{}' is not an EPSG code", rest.trim())),
    )
}

fn from_epsg(definition: &str, code: u32) -> Result<CrsKind, ProjectionError> {
    let kind = match code {
        4326 => CrsKind::Geographic(Ellipsoid::WGS84),
        4258 | 4269 => CrsKind::Geographic(Ellipsoid::GRS80),
        3857 | 900913 => CrsKind::Mercator(Mercator::web()),
        32601..=32660 => utm_kind((code - 32600) as u8, true, Ellipsoid::WGS84),
        32701..=32760 => utm_kind((code - 32700) as u8, false, Ellipsoid::WGS84),
        25801..=25860 => utm_kind((code - 25800) as u8, true, Ellipsoid::GRS80),
        _ => {
            return Err(ProjectionError::invalid(
                definition,
                format!("unsupported EPSG code {}", code),
            ));
        }
    };
    Ok(kind)
}

fn utm_kind(zone: u8, north: bool, ellipsoid: Ellipsoid) -> CrsKind {
    CrsKind::TransverseMercator(TransverseMercator::utm(zone, north, ellipsoid))
}

/// Parsed `+key=value` / `+flag` tokens.
struct ProjParams<'a> {
    definition: &'a str,
    params: HashMap<&'a str, Option<&'a str>>,
}

impl<'a> ProjParams<'a> {
    fn parse(definition: &'a str, text: &'a str) -> Result<Self, ProjectionError> {
        let mut params = HashMap::new();
        for token in text.split_whitespace() {
            let token = token.strip_prefix('+').ok_or_else(|| {
                ProjectionError::invalid(definition, format!("unexpected token '{}'", token))
            })?;
            match token.split_once('=') {
                Some((key, value)) => params.insert(key, Some(value)),
                None => params.insert(token, None),
            };
        }
        Ok(Self { definition, params })
    }

    fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    fn text(&self, key: &str) -> Option<&'a str> {
        self.params.get(key).copied().flatten()
    }

    fn number(&self, key: &str) -> Result<Option<f64>, ProjectionError> {
        match self.params.get(key) {
            None => Ok(None),
            Some(None) => Err(ProjectionError::invalid(
                self.definition,
                format!("+{} needs a value", key),
            )),
            Some(Some(v)) => v.parse::<f64>().map(Some).map_err(|_| {
                ProjectionError::invalid(self.definition, format!("+{}={} is not a number", key, v))
            }),
        }
    }

    fn number_or(&self, key: &str, default: f64) -> Result<f64, ProjectionError> {
        Ok(self.number(key)?.unwrap_or(default))
    }

    fn ellipsoid(&self) -> Result<Ellipsoid, ProjectionError> {
        if let Some(r) = self.number("R")? {
            return Ok(Ellipsoid::sphere(r));
        }

        if let Some(a) = self.number("a")? {
            let f = if let Some(b) = self.number("b")? {
                (a - b) / a
            } else if let Some(rf) = self.number("rf")? {
                if rf == 0.0 { 0.0 } else { 1.0 / rf }
            } else {
                self.number_or("f", 0.0)?
            };
            if !(a > 0.0) || !(0.0..1.0).contains(&f) {
                return Err(ProjectionError::invalid(self.definition, "invalid ellipsoid axes"));
            }
            return Ok(Ellipsoid { a, f });
        }

        let name = self.text("ellps").or_else(|| self.text("datum"));
        match name.map(str::to_ascii_uppercase).as_deref() {
            None | Some("WGS84") => Ok(Ellipsoid::WGS84),
            Some("GRS80") | Some("NAD83") | Some("ETRS89") => Ok(Ellipsoid::GRS80),
            Some("INTL") => Ok(Ellipsoid::INTL),
            Some("CLRK66") | Some("NAD27") => Ok(Ellipsoid::CLARKE_1866),
            Some(other) => Err(ProjectionError::invalid(
                self.definition,
                format!("unknown ellipsoid '{}'", other),
            )),
        }
    }
}

fn from_proj_string(definition: &str, text: &str) -> Result<CrsKind, ProjectionError> {
    let p = ProjParams::parse(definition, text)?;
    let ellipsoid = p.ellipsoid()?;

    let proj = p
        .text("proj")
        .ok_or_else(|| ProjectionError::invalid(definition, "missing +proj"))?;

    let kind = match proj {
        "longlat" | "latlong" | "lonlat" | "latlon" => CrsKind::Geographic(ellipsoid),
        "utm" => {
            let zone = p
                .number("zone")?
                .ok_or_else(|| ProjectionError::invalid(definition, "+proj=utm needs +zone"))?;
            if zone.fract() != 0.0 || !(1.0..=60.0).contains(&zone) {
                return Err(ProjectionError::invalid(
                    definition,
                    format!("UTM zone {} is not in 1..=60", zone),
                ));
            }
            utm_kind(zone as u8, !p.has("south"), ellipsoid)
        }
        "tmerc" => {
            let k0 = match p.number("k_0")? {
                Some(k) => k,
                None => p.number_or("k", 1.0)?,
            };
            CrsKind::TransverseMercator(TransverseMercator::new(
                ellipsoid,
                p.number_or("lon_0", 0.0)?,
                p.number_or("lat_0", 0.0)?,
                k0,
                p.number_or("x_0", 0.0)?,
                p.number_or("y_0", 0.0)?,
            ))
        }
        "merc" => {
            let lon_0 = p.number_or("lon_0", 0.0)?;
            let x_0 = p.number_or("x_0", 0.0)?;
            let y_0 = p.number_or("y_0", 0.0)?;
            let merc = match p.number("lat_ts")? {
                Some(lat_ts) => Mercator::with_true_scale(ellipsoid, lon_0, lat_ts, x_0, y_0),
                None => {
                    let k0 = match p.number("k_0")? {
                        Some(k) => k,
                        None => p.number_or("k", 1.0)?,
                    };
                    Mercator::new(ellipsoid, lon_0, k0, x_0, y_0)
                }
            };
            CrsKind::Mercator(merc)
        }
        other => {
            return Err(ProjectionError::invalid(
                definition,
                format!("unsupported projection '{}'", other),
            ));
        }
    };

    Ok(kind)
}
