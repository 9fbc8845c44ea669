//! Map projections between geographic (lon, lat) and planar (x, y).
//!
//! # Supported Projections
//!
//! - **TransverseMercator**: ellipsoidal transverse Mercator (`+proj=tmerc`,
//!   UTM zones) using the third-order Krüger series, sub-millimetre within
//!   the usual ±3° belt and well under a metre far outside it
//! - **Mercator**: ellipsoidal or spherical Mercator (`+proj=merc`,
//!   EPSG:3857)
//!
//! Coordinates follow the x/y axis order: longitude first, latitude second.
//! Functions return `None` where the projection is undefined.
//!
//! # Example
//!
//! ```
//! use seisgrid::crs::{Ellipsoid, Projection, TransverseMercator};
//!
//! let utm = TransverseMercator::utm(31, true, Ellipsoid::WGS84);
//! let (x, y) = utm.forward(3.0, 0.0).unwrap();
//! assert!((x - 500_000.0).abs() < 1e-6);
//! assert!(y.abs() < 1e-6);
//! ```

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Equatorial radius in meters
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    /// WGS84
    pub const WGS84: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// GRS80 (ETRS89, NAD83)
    pub const GRS80: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// International 1924 (Hayford)
    pub const INTL: Self = Self {
        a: 6_378_388.0,
        f: 1.0 / 297.0,
    };

    /// Clarke 1866
    pub const CLARKE_1866: Self = Self {
        a: 6_378_206.4,
        f: 1.0 / 294.978_698_2,
    };

    /// Sphere of radius `r`.
    pub const fn sphere(r: f64) -> Self {
        Self { a: r, f: 0.0 }
    }

    /// First eccentricity squared.
    #[inline]
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }

    /// First eccentricity.
    #[inline]
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Third flattening n = f / (2 - f).
    #[inline]
    pub fn n(&self) -> f64 {
        self.f / (2.0 - self.f)
    }
}

/// Planar map projection.
pub trait Projection {
    /// Geographic (lon, lat) in degrees to projected (x, y).
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Projected (x, y) to geographic (lon, lat) in degrees.
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)>;
}

/// Wrap a longitude difference into [-180, 180).
#[inline]
fn wrap_degrees(d: f64) -> f64 {
    (d + 180.0).rem_euclid(360.0) - 180.0
}

#[inline]
fn finite_pair(p: (f64, f64)) -> Option<(f64, f64)> {
    (p.0.is_finite() && p.1.is_finite()).then_some(p)
}

/// Ellipsoidal transverse Mercator.
#[derive(Debug, Clone, Copy)]
pub struct TransverseMercator {
    lon_0: f64,
    lat_0: f64,
    k0: f64,
    x_0: f64,
    y_0: f64,
    ellipsoid: Ellipsoid,
    /// Eccentricity
    e: f64,
    /// Rectifying radius
    big_a: f64,
    /// Krüger forward coefficients
    alpha: [f64; 3],
    /// Krüger inverse coefficients
    beta: [f64; 3],
    /// Conformal-to-geodetic latitude coefficients
    delta: [f64; 3],
    /// Scaled meridian distance of lat_0
    m0: f64,
}

impl TransverseMercator {
    /// Create a transverse Mercator projection.
    ///
    /// # Arguments
    /// * `lon_0`, `lat_0` - Projection origin in degrees
    /// * `k0` - Scale factor on the central meridian
    /// * `x_0`, `y_0` - False easting / northing in meters
    pub fn new(ellipsoid: Ellipsoid, lon_0: f64, lat_0: f64, k0: f64, x_0: f64, y_0: f64) -> Self {
        let n = ellipsoid.n();
        let n2 = n * n;
        let n3 = n2 * n;

        let big_a = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);
        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
            61.0 * n3 / 240.0,
        ];
        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
            n2 / 48.0 + n3 / 15.0,
            17.0 * n3 / 480.0,
        ];
        let delta = [
            2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
            7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
            56.0 * n3 / 15.0,
        ];

        let mut tm = Self {
            lon_0,
            lat_0,
            k0,
            x_0,
            y_0,
            ellipsoid,
            e: ellipsoid.e(),
            big_a,
            alpha,
            beta,
            delta,
            m0: 0.0,
        };

        // Meridian distance of the origin latitude, on the central meridian
        let (xi0, _) = tm.forward_series(lat_0.to_radians(), 0.0);
        tm.m0 = big_a * xi0;
        tm
    }

    /// UTM zone (1-60) on the given ellipsoid.
    pub fn utm(zone: u8, north: bool, ellipsoid: Ellipsoid) -> Self {
        let central_meridian = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;
        let false_northing = if north { 0.0 } else { 10_000_000.0 };
        Self::new(ellipsoid, central_meridian, 0.0, 0.9996, 500_000.0, false_northing)
    }

    /// Central meridian in degrees.
    pub fn lon_0(&self) -> f64 {
        self.lon_0
    }

    /// Origin latitude in degrees.
    pub fn lat_0(&self) -> f64 {
        self.lat_0
    }

    /// Ellipsoid of the projection.
    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// Gauss-Krüger (ξ, η) for latitude `phi` and longitude offset `lam`, radians.
    fn forward_series(&self, phi: f64, lam: f64) -> (f64, f64) {
        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - self.e * (self.e * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(lam.cos());
        let eta_p = (lam.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }
        (xi, eta)
    }
}

impl Projection for TransverseMercator {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 {
            return None;
        }
        let dlon = wrap_degrees(lon - self.lon_0);
        // The series diverges at 90° from the central meridian
        if dlon.abs() >= 90.0 {
            return None;
        }

        let phi = lat.clamp(-90.0, 90.0).to_radians();
        let (xi, eta) = self.forward_series(phi, dlon.to_radians());

        let x = self.x_0 + self.k0 * self.big_a * eta;
        let y = self.y_0 + self.k0 * (self.big_a * xi - self.m0);
        finite_pair((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        let xi = (y - self.y_0 + self.k0 * self.m0) / (self.k0 * self.big_a);
        let eta = (x - self.x_0) / (self.k0 * self.big_a);

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let s = xi_p.sin() / eta_p.cosh();
        if s.abs() > 1.0 {
            return None;
        }
        let chi = s.asin();

        let mut phi = chi;
        for (j, d) in self.delta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            phi += d * (k * chi).sin();
        }
        let lam = eta_p.sinh().atan2(xi_p.cos());

        let lon = wrap_degrees(self.lon_0 + lam.to_degrees());
        finite_pair((lon, phi.to_degrees()))
    }
}

/// Mercator projection (normal aspect).
#[derive(Debug, Clone, Copy)]
pub struct Mercator {
    lon_0: f64,
    k0: f64,
    x_0: f64,
    y_0: f64,
    ellipsoid: Ellipsoid,
    e: f64,
}

impl Mercator {
    /// Maximum number of iterations for the inverse latitude.
    const MAX_ITER: usize = 20;

    /// Create a Mercator projection.
    pub fn new(ellipsoid: Ellipsoid, lon_0: f64, k0: f64, x_0: f64, y_0: f64) -> Self {
        Self {
            lon_0,
            k0,
            x_0,
            y_0,
            ellipsoid,
            e: ellipsoid.e(),
        }
    }

    /// Mercator with the scale set by a latitude of true scale (`+lat_ts`).
    pub fn with_true_scale(ellipsoid: Ellipsoid, lon_0: f64, lat_ts: f64, x_0: f64, y_0: f64) -> Self {
        let sin_ts = lat_ts.to_radians().sin();
        let k0 = lat_ts.to_radians().cos() / (1.0 - ellipsoid.e2() * sin_ts * sin_ts).sqrt();
        Self::new(ellipsoid, lon_0, k0, x_0, y_0)
    }

    /// Spherical Web Mercator (EPSG:3857).
    pub fn web() -> Self {
        Self::new(Ellipsoid::sphere(6_378_137.0), 0.0, 1.0, 0.0, 0.0)
    }
}

impl Projection for Mercator {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() >= 90.0 {
            return None;
        }
        let phi = lat.to_radians();
        let lam = wrap_degrees(lon - self.lon_0).to_radians();
        let ka = self.k0 * self.ellipsoid.a;

        let es = self.e * phi.sin();
        let iso = (FRAC_PI_4 + phi / 2.0).tan() * ((1.0 - es) / (1.0 + es)).powf(self.e / 2.0);

        finite_pair((self.x_0 + ka * lam, self.y_0 + ka * iso.ln()))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let ka = self.k0 * self.ellipsoid.a;
        let t = (-(y - self.y_0) / ka).exp();

        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..Self::MAX_ITER {
            let es = self.e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(self.e / 2.0)).atan();
            let done = (next - phi).abs() < 1e-14;
            phi = next;
            if done {
                break;
            }
        }

        let lon = wrap_degrees(self.lon_0 + ((x - self.x_0) / ka).to_degrees());
        finite_pair((lon, phi.to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_utm_central_meridian_equator() {
        let proj = TransverseMercator::utm(31, true, Ellipsoid::WGS84);
        let (x, y) = proj.forward(3.0, 0.0).unwrap();
        assert_relative_eq!(x, 500_000.0, epsilon = 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_utm_zone_32n_bergen() {
        let proj = TransverseMercator::utm(32, true, Ellipsoid::WGS84);

        // Bergen (60.39°N, 5.32°E): approximately 297000 E, 6700000 N
        let (x, y) = proj.forward(5.32, 60.39).unwrap();
        assert!((x - 297_000.0).abs() < 1000.0, "UTM easting for Bergen: {}", x);
        assert!((y - 6_700_000.0).abs() < 10_000.0, "UTM northing for Bergen: {}", y);

        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lon, 5.32, epsilon = 1e-8);
        assert_relative_eq!(lat, 60.39, epsilon = 1e-8);
    }

    #[test]
    fn test_utm_meridian_arc_length() {
        // 1° of latitude along the central meridian near 45°N ≈ 111.13 km, scaled by k0
        let proj = TransverseMercator::utm(31, true, Ellipsoid::WGS84);
        let (_, y44) = proj.forward(3.0, 44.5).unwrap();
        let (_, y45) = proj.forward(3.0, 45.5).unwrap();
        let arc = (y45 - y44) / 0.9996;
        assert!((arc - 111_132.0).abs() < 20.0, "arc = {}", arc);
    }

    #[test]
    fn test_tmerc_with_origin_latitude() {
        // Origin maps to the false easting / northing
        let proj = TransverseMercator::new(Ellipsoid::WGS84, 26.25, 37.75, 0.9996, 0.0, 0.0);
        let (x, y) = proj.forward(26.25, 37.75).unwrap();
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);

        let (lon, lat) = proj.inverse(-50_000.0, 80_000.0).unwrap();
        let (x2, y2) = proj.forward(lon, lat).unwrap();
        assert_relative_eq!(x2, -50_000.0, epsilon = 1e-4);
        assert_relative_eq!(y2, 80_000.0, epsilon = 1e-4);
    }

    #[test]
    fn test_tmerc_out_of_domain() {
        let proj = TransverseMercator::utm(31, true, Ellipsoid::WGS84);
        assert!(proj.forward(95.0, 10.0).is_none());
        assert!(proj.forward(3.0, 91.0).is_none());
        assert!(proj.forward(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_mercator_roundtrip() {
        let proj = Mercator::new(Ellipsoid::WGS84, 0.0, 1.0, 0.0, 0.0);
        for (lon, lat) in [(0.0, 0.0), (10.0, 45.0), (-120.0, -60.0), (179.0, 80.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        }
        assert!(proj.forward(0.0, 90.0).is_none());
    }

    #[test]
    fn test_web_mercator_known_value() {
        let proj = Mercator::web();
        let (x, _) = proj.forward(180.0 - 1e-9, 0.0).unwrap();
        assert_relative_eq!(x.abs(), 20_037_508.342789244, epsilon = 1e-3);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_relative_eq!(wrap_degrees(190.0), -170.0);
        assert_relative_eq!(wrap_degrees(-190.0), 170.0);
        assert_relative_eq!(wrap_degrees(45.0), 45.0);
    }
}
