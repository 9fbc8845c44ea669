//! Barycentric coordinates in a planar triangle.
//!
//! For triangle A, B, C and point p:
//!
//! ```text
//! β = ((p − A) · n_AC) / ((B − A) · n_AC),   n_AC = (A.y − C.y, C.x − A.x)
//! γ = ((p − A) · n_AB) / ((C − A) · n_AB),   n_AB = (A.y − B.y, B.x − A.x)
//! α = 1 − β − γ
//! ```
//!
//! `n_AC` is perpendicular to AC, so β measures the distance of p from the
//! line AC relative to that of B; likewise for γ. Weights are not clamped.

/// Barycentric weights `[α, β, γ]` of `p` with respect to `a`, `b`, `c`.
///
/// The weights sum to one for any `p`. For a degenerate (collinear)
/// triangle the result is non-finite.
///
/// # Example
///
/// ```
/// use seisgrid::interp::barycentric;
///
/// let w = barycentric((0.25, 0.25), (0.0, 0.0), (1.0, 0.0), (0.0, 1.0));
/// assert!((w[0] - 0.5).abs() < 1e-15);
/// assert!((w[1] - 0.25).abs() < 1e-15);
/// assert!((w[2] - 0.25).abs() < 1e-15);
/// ```
#[inline]
pub fn barycentric(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> [f64; 3] {
    let ap = (p.0 - a.0, p.1 - a.1);
    let ab = (b.0 - a.0, b.1 - a.1);
    let ac = (c.0 - a.0, c.1 - a.1);

    let n_ac = (a.1 - c.1, c.0 - a.0);
    let n_ab = (a.1 - b.1, b.0 - a.0);

    let beta = dot(ap, n_ac) / dot(ab, n_ac);
    let gamma = dot(ap, n_ab) / dot(ac, n_ab);
    [1.0 - beta - gamma, beta, gamma]
}

/// Whether all weights are at least `-tol`.
#[inline]
pub fn is_inside(weights: &[f64; 3], tol: f64) -> bool {
    weights.iter().all(|&w| w >= -tol)
}

/// Twice the signed area of triangle A, B, C (positive when counter-clockwise).
#[inline]
pub fn signed_area2(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1)
}

#[inline]
fn dot(u: (f64, f64), v: (f64, f64)) -> f64 {
    u.0 * v.0 + u.1 * v.1
}
