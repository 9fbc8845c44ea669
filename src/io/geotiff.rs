//! GeoTIFF coordinate axes.
//!
//! Only the georeferencing is read: the pixel-centre x and y axes of a
//! north-up raster, used as grid points. Pixel data is not decoded.
//! Uses the pure Rust `tiff` crate.
//!
//! The geotransform comes from either
//! - ModelPixelScale (tag 33550) + ModelTiepoint (tag 33922), or
//! - ModelTransformation (tag 34264) without rotation terms.
//!
//! Files whose GTRasterTypeGeoKey is PixelIsPoint anchor that transform at
//! pixel centres; it is shifted back to the corner convention on read.
//!
//! # Example
//!
//! ```ignore
//! use seisgrid::io::read_geotiff_axes;
//!
//! let axes = read_geotiff_axes("data/hysea_grid.tif")?;
//! println!("{} x {} pixels", axes.x().len(), axes.y().len());
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use thiserror::Error;
use tiff::decoder::Decoder;
use tiff::tags::Tag;
use tracing::debug;

use crate::grid::{GridError, RasterAxes};

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;

const GT_RASTER_TYPE_KEY: u32 = 1025;
const RASTER_PIXEL_IS_POINT: u32 = 2;

/// Error type for reading raster axes.
#[derive(Debug, Error)]
pub enum RasterAxesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF error: {0}")]
    Tiff(String),

    /// Missing or unusable geotransform tags
    #[error("missing geotransform: {0}")]
    MissingGeotransform(String),

    /// The affine transform has rotation or shear terms.
    #[error("rotated or sheared rasters are not supported")]
    Rotated,

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl From<tiff::TiffError> for RasterAxesError {
    fn from(e: tiff::TiffError) -> Self {
        RasterAxesError::Tiff(e.to_string())
    }
}

/// North-up geotransform: top-left corner and positive pixel size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// From ModelTiepoint `[I, J, K, X, Y, Z]` and ModelPixelScale `[SX, SY, SZ]`.
    ///
    /// The tiepoint may reference any raster position `(I, J)`; the origin
    /// is moved back to pixel corner (0, 0).
    pub fn from_tiepoint(tiepoint: &[f64], scale: &[f64]) -> Option<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return None;
        }
        let (sx, sy) = (scale[0], scale[1].abs());
        Some(Self {
            origin_x: tiepoint[3] - tiepoint[0] * sx,
            origin_y: tiepoint[4] + tiepoint[1] * sy,
            pixel_width: sx,
            pixel_height: sy,
        })
    }

    /// From the 4×4 row-major ModelTransformation matrix.
    pub fn from_matrix(m: &[f64]) -> Result<Self, RasterAxesError> {
        if m.len() < 8 {
            return Err(RasterAxesError::MissingGeotransform(format!(
                "ModelTransformation has {} entries",
                m.len()
            )));
        }
        if m[1] != 0.0 || m[4] != 0.0 {
            return Err(RasterAxesError::Rotated);
        }
        Ok(Self {
            origin_x: m[3],
            origin_y: m[7],
            pixel_width: m[0],
            pixel_height: -m[5],
        })
    }

    /// Move a pixel-centre anchored transform to the top-left pixel corner.
    pub fn anchored_at_corner(self) -> Self {
        Self {
            origin_x: self.origin_x - 0.5 * self.pixel_width,
            origin_y: self.origin_y + 0.5 * self.pixel_height,
            ..self
        }
    }

    /// Pixel-centre axes for a raster of the given size.
    pub fn axes(&self, width: usize, height: usize) -> Result<RasterAxes, GridError> {
        RasterAxes::from_affine(
            (self.origin_x, self.origin_y),
            (self.pixel_width, self.pixel_height),
            width,
            height,
        )
    }
}

/// Read the pixel-centre coordinate axes of a GeoTIFF.
///
/// Both axes are returned ascending (y is reversed from row order).
pub fn read_geotiff_axes<P: AsRef<Path>>(path: P) -> Result<RasterAxes, RasterAxesError> {
    let file = File::open(&path)?;
    let mut decoder = Decoder::new(BufReader::new(file))?;
    let (width, height) = decoder.dimensions()?;

    let scale = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE)).ok();
    let tiepoint = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT)).ok();

    let transform = match (scale, tiepoint) {
        (Some(scale), Some(tiepoint)) => GeoTransform::from_tiepoint(&tiepoint, &scale)
            .ok_or_else(|| {
                RasterAxesError::MissingGeotransform("malformed tiepoint or pixel scale".into())
            })?,
        _ => match decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TRANSFORMATION)) {
            Ok(matrix) => GeoTransform::from_matrix(&matrix)?,
            Err(_) => {
                return Err(RasterAxesError::MissingGeotransform(
                    "no ModelTiepoint/ModelPixelScale or ModelTransformation tags".into(),
                ));
            }
        },
    };

    let point_anchored = decoder
        .get_tag_u32_vec(Tag::from_u16_exhaustive(GEO_KEY_DIRECTORY))
        .is_ok_and(|keys| pixel_is_point(&keys));
    let transform = if point_anchored {
        transform.anchored_at_corner()
    } else {
        transform
    };

    debug!(
        path = %path.as_ref().display(),
        width,
        height,
        point_anchored,
        ?transform,
        "read GeoTIFF geotransform"
    );

    Ok(transform.axes(width as usize, height as usize)?)
}

/// Whether the GeoKey directory sets GTRasterTypeGeoKey to PixelIsPoint.
///
/// The directory is a 4-value header followed by one
/// `[key, location, count, value]` entry per key.
fn pixel_is_point(directory: &[u32]) -> bool {
    let n_keys = directory.get(3).copied().unwrap_or(0) as usize;
    directory
        .get(4..)
        .unwrap_or(&[])
        .chunks_exact(4)
        .take(n_keys)
        .any(|k| k[0] == GT_RASTER_TYPE_KEY && k[1] == 0 && k[3] == RASTER_PIXEL_IS_POINT)
}
