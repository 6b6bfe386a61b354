//! Affine transform algebra.
//!
//! All matrices are `kurbo::Affine` values, whose coefficient layout
//! `[a, b, c, d, e, f]` is the usual 2x3 form (linear part + translation).
//! Angles are degrees at this module's boundary and radians internally.

use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};

/// Decomposed form of an affine matrix.
///
/// By convention `skew_y` is always 0: [`decompose`] folds all shear into
/// `skew_x` plus the rotation angle, so recomposition is single-valued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformComponents {
    /// Rotation angle in degrees.
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Horizontal shear in degrees.
    pub skew_x: f64,
    /// Always 0 after decomposition.
    pub skew_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for TransformComponents {
    fn default() -> Self {
        Self {
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

/// Options accepted by [`compose`]. Unlike [`TransformComponents`] this
/// carries the flip flags, which fold into the scale signs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComposeOptions {
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub skew_x: f64,
    pub skew_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            flip_x: false,
            flip_y: false,
            skew_x: 0.0,
            skew_y: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl From<TransformComponents> for ComposeOptions {
    fn from(c: TransformComponents) -> Self {
        Self {
            angle: c.angle,
            scale_x: c.scale_x,
            scale_y: c.scale_y,
            skew_x: c.skew_x,
            skew_y: c.skew_y,
            translate_x: c.translate_x,
            translate_y: c.translate_y,
            ..Self::default()
        }
    }
}

/// Pure translation matrix.
pub fn translate_matrix(x: f64, y: f64) -> Affine {
    Affine::translate((x, y))
}

/// Rotation by `angle` degrees about `center`.
pub fn rotate_about_matrix(angle: f64, center: Point) -> Affine {
    Affine::rotate_about(angle.to_radians(), center)
}

/// Pure scale matrix.
pub fn scale_matrix(scale_x: f64, scale_y: f64) -> Affine {
    Affine::new([scale_x, 0.0, 0.0, scale_y, 0.0, 0.0])
}

/// Horizontal shear by `skew_x` degrees.
pub fn skew_x_matrix(skew_x: f64) -> Affine {
    Affine::new([1.0, 0.0, skew_x.to_radians().tan(), 1.0, 0.0, 0.0])
}

/// Vertical shear by `skew_y` degrees.
pub fn skew_y_matrix(skew_y: f64) -> Affine {
    Affine::new([1.0, skew_y.to_radians().tan(), 0.0, 1.0, 0.0, 0.0])
}

/// Compose two matrices so that applying the result equals applying `b`
/// then `a` (`a` is the outer transform).
///
/// With `linear_only` the translation component of the result is forced to
/// zero; used when combining pure linear transforms (scale/skew) without
/// accumulating translation.
pub fn multiply(a: Affine, b: Affine, linear_only: bool) -> Affine {
    let product = a * b;
    if linear_only {
        let mut c = product.as_coeffs();
        c[4] = 0.0;
        c[5] = 0.0;
        Affine::new(c)
    } else {
        product
    }
}

/// Right-to-left fold over a sequence of matrices, equivalent to
/// `M1(M2(M3(...)))`. `None` entries are skipped as identity.
pub fn multiply_chain(matrices: &[Option<Affine>], linear_only: bool) -> Affine {
    matrices
        .iter()
        .rev()
        .flatten()
        .fold(Affine::IDENTITY, |product, &m| {
            multiply(m, product, linear_only)
        })
}

/// Algebraic inverse, or `None` when the determinant `a*d - b*c` is zero.
///
/// The linear part is the reciprocal-determinant cofactor matrix; the new
/// translation is the original translation pushed through that inverse and
/// negated.
pub fn invert(m: Affine) -> Option<Affine> {
    let [a, b, c, d, e, f] = m.as_coeffs();
    let det = a * d - b * c;
    if det == 0.0 {
        return None;
    }
    let r = 1.0 / det;
    let (ia, ib, ic, id) = (d * r, -b * r, -c * r, a * r);
    Some(Affine::new([
        ia,
        ib,
        ic,
        id,
        -(ia * e + ic * f),
        -(ib * e + id * f),
    ]))
}

/// QR-style decomposition into rotation, scale, shear and translation.
///
/// All shear is attributed to `skew_x`; `skew_y` comes back 0, which keeps
/// `compose(decompose(m)) ≈ m` single-valued for any invertible `m`.
pub fn decompose(m: Affine) -> TransformComponents {
    let [a, b, c, d, e, f] = m.as_coeffs();
    let denom = a * a + b * b;
    let angle = b.atan2(a);
    let scale_x = denom.sqrt();
    let scale_y = (a * d - c * b) / scale_x;
    let skew_x = (a * c + b * d).atan2(denom);
    TransformComponents {
        angle: angle.to_degrees(),
        scale_x,
        scale_y,
        skew_x: skew_x.to_degrees(),
        skew_y: 0.0,
        translate_x: e,
        translate_y: f,
    }
}

/// Build a matrix as `Translate · Rotate · Scale(flip) · SkewX · SkewY`
/// (translation outermost). Flips negate the corresponding scale factor.
pub fn compose(options: &ComposeOptions) -> Affine {
    let sx = options.scale_x * if options.flip_x { -1.0 } else { 1.0 };
    let sy = options.scale_y * if options.flip_y { -1.0 } else { 1.0 };
    translate_matrix(options.translate_x, options.translate_y)
        * Affine::rotate(options.angle.to_radians())
        * scale_matrix(sx, sy)
        * skew_x_matrix(options.skew_x)
        * skew_y_matrix(options.skew_y)
}

/// Rotate `point` by `angle` degrees about `origin`.
pub fn rotate_point(point: Point, origin: Point, angle: f64) -> Point {
    rotate_about_matrix(angle, origin) * point
}

/// Coefficient-wise approximate equality, used by callers that compare
/// derived matrices under floating-point tolerance.
pub fn approx_eq(a: Affine, b: Affine, tolerance: f64) -> bool {
    a.as_coeffs()
        .iter()
        .zip(b.as_coeffs().iter())
        .all(|(x, y)| (x - y).abs() <= tolerance)
}
