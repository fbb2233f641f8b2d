//! Affine transformation matrix.
//!
//! 2D affine transformations: translation, scaling, shearing, rotation
//! (with exact quadrant rotations), composition in both orders, inversion,
//! and bulk point transformation that tolerates overlapping ranges.

use std::cell::Cell;
use std::fmt;

use bitflags::bitflags;

use crate::basics::{is_equal_eps, Scalar};
use crate::error::{Error, Result};
use crate::path::Path2D;
use crate::point::Point2D;
use crate::shape::Shape;

/// Epsilon for affine matrix comparisons.
pub const AFFINE_EPSILON: f64 = 1e-14;

bitflags! {
    /// Classification of a transform, as reported by
    /// [`AffineTransform::get_type`].
    ///
    /// The empty set is the identity transform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TransformType: u32 {
        const TRANSLATION = 1;
        const UNIFORM_SCALE = 2;
        const GENERAL_SCALE = 4;
        const QUADRANT_ROTATION = 8;
        const GENERAL_ROTATION = 16;
        const GENERAL_TRANSFORM = 32;
        const FLIP = 64;

        const MASK_SCALE = Self::UNIFORM_SCALE.bits() | Self::GENERAL_SCALE.bits();
        const MASK_ROTATION = Self::QUADRANT_ROTATION.bits() | Self::GENERAL_ROTATION.bits();
    }
}

impl TransformType {
    pub const IDENTITY: TransformType = TransformType::empty();
}

// Which terms of the matrix take part in `transform`. Kept in sync with the
// coefficients by `set_coefficients`.
const APPLY_IDENTITY: u8 = 0;
const APPLY_TRANSLATE: u8 = 1;
const APPLY_SCALE: u8 = 2;
const APPLY_SHEAR: u8 = 4;

/// 2D affine transformation matrix.
///
/// Stores six coefficients representing the matrix:
///
/// ```text
///   | m00  m01  m02 |
///   | m10  m11  m12 |
///   |  0    0    1  |
/// ```
///
/// Transform: `x' = m00*x + m01*y + m02`, `y' = m10*x + m11*y + m12`.
///
/// The classification returned by [`get_type`](Self::get_type) is computed
/// lazily and cached; every mutation clears the cache.
#[derive(Clone)]
pub struct AffineTransform {
    m00: f64,
    m10: f64,
    m01: f64,
    m11: f64,
    m02: f64,
    m12: f64,
    state: u8,
    cached_type: Cell<Option<TransformType>>,
}

impl AffineTransform {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Identity matrix.
    pub fn new() -> Self {
        Self {
            m00: 1.0,
            m10: 0.0,
            m01: 0.0,
            m11: 1.0,
            m02: 0.0,
            m12: 0.0,
            state: APPLY_IDENTITY,
            cached_type: Cell::new(Some(TransformType::IDENTITY)),
        }
    }

    /// Custom matrix from six coefficients, in column order.
    pub fn from_matrix(m00: f64, m10: f64, m01: f64, m11: f64, m02: f64, m12: f64) -> Self {
        let mut at = Self::new();
        at.set_coefficients(m00, m10, m01, m11, m02, m12);
        at
    }

    /// Construct from a flat matrix `[m00, m10, m01, m11]` or
    /// `[m00, m10, m01, m11, m02, m12]`.
    pub fn from_flat_matrix(m: &[f64]) -> Result<Self> {
        match m.len() {
            4 => Ok(Self::from_matrix(m[0], m[1], m[2], m[3], 0.0, 0.0)),
            6 => Ok(Self::from_matrix(m[0], m[1], m[2], m[3], m[4], m[5])),
            n => Err(Error::illegal(format!(
                "flat matrix must have 4 or 6 entries, got {n}"
            ))),
        }
    }

    /// Translation matrix.
    pub fn translation(tx: f64, ty: f64) -> Self {
        let mut at = Self::new();
        at.set_to_translation(tx, ty);
        at
    }

    /// Rotation matrix (radians). Quadrant angles produce exact coefficients.
    pub fn rotation(theta: f64) -> Self {
        let mut at = Self::new();
        at.set_to_rotation(theta);
        at
    }

    /// Rotation by `theta` about the anchor point `(ax, ay)`.
    pub fn rotation_around(theta: f64, ax: f64, ay: f64) -> Self {
        let mut at = Self::new();
        at.set_to_rotation_around(theta, ax, ay);
        at
    }

    /// Rotation that turns the positive x axis towards the vector `(vx, vy)`.
    pub fn rotation_vector(vx: f64, vy: f64) -> Self {
        let mut at = Self::new();
        at.set_to_rotation_vector(vx, vy);
        at
    }

    /// Rotation towards the vector `(vx, vy)` about the anchor `(ax, ay)`.
    pub fn rotation_vector_around(vx: f64, vy: f64, ax: f64, ay: f64) -> Self {
        let mut at = Self::new();
        at.set_to_rotation_vector_around(vx, vy, ax, ay);
        at
    }

    /// Rotation by `numquadrants` multiples of 90 degrees.
    pub fn quadrant_rotation(numquadrants: i32) -> Self {
        let mut at = Self::new();
        at.set_to_quadrant_rotation(numquadrants);
        at
    }

    /// Quadrant rotation about the anchor point `(ax, ay)`.
    pub fn quadrant_rotation_around(numquadrants: i32, ax: f64, ay: f64) -> Self {
        let mut at = Self::new();
        at.set_to_quadrant_rotation_around(numquadrants, ax, ay);
        at
    }

    /// Non-uniform scaling matrix.
    pub fn scaling(sx: f64, sy: f64) -> Self {
        let mut at = Self::new();
        at.set_to_scale(sx, sy);
        at
    }

    /// Shearing matrix.
    pub fn shearing(shx: f64, shy: f64) -> Self {
        let mut at = Self::new();
        at.set_to_shear(shx, shy);
        at
    }

    // ====================================================================
    // State management
    // ====================================================================

    /// Single entry point for every coefficient change: stores the matrix,
    /// recomputes the application state and drops the cached type.
    fn set_coefficients(&mut self, m00: f64, m10: f64, m01: f64, m11: f64, m02: f64, m12: f64) {
        self.m00 = m00;
        self.m10 = m10;
        self.m01 = m01;
        self.m11 = m11;
        self.m02 = m02;
        self.m12 = m12;
        self.update_state();
    }

    fn update_state(&mut self) {
        let translate = if self.m02 != 0.0 || self.m12 != 0.0 {
            APPLY_TRANSLATE
        } else {
            APPLY_IDENTITY
        };
        if self.m01 == 0.0 && self.m10 == 0.0 {
            if self.m00 == 1.0 && self.m11 == 1.0 {
                self.state = translate;
                self.cached_type.set(Some(if translate == APPLY_IDENTITY {
                    TransformType::IDENTITY
                } else {
                    TransformType::TRANSLATION
                }));
                return;
            }
            self.state = APPLY_SCALE | translate;
        } else if self.m00 == 0.0 && self.m11 == 0.0 {
            self.state = APPLY_SHEAR | translate;
        } else {
            self.state = APPLY_SHEAR | APPLY_SCALE | translate;
        }
        self.cached_type.set(None);
    }

    /// Classification of this transform.
    ///
    /// The result is cached until the next mutation.
    pub fn get_type(&self) -> TransformType {
        if let Some(t) = self.cached_type.get() {
            return t;
        }
        let t = self.calculate_type();
        log::trace!("classified transform {} as {:?}", self, t);
        self.cached_type.set(Some(t));
        t
    }

    fn calculate_type(&self) -> TransformType {
        let mut ret = TransformType::IDENTITY;
        if self.state & APPLY_TRANSLATE != 0 {
            ret |= TransformType::TRANSLATION;
        }
        let (m00, m01, m10, m11) = (self.m00, self.m01, self.m10, self.m11);
        match self.state & !APPLY_TRANSLATE {
            APPLY_IDENTITY => {}
            APPLY_SCALE => {
                let sgn0 = m00 >= 0.0;
                let sgn1 = m11 >= 0.0;
                if sgn0 == sgn1 {
                    if !sgn0 {
                        ret |= TransformType::QUADRANT_ROTATION;
                    }
                    let unit = if sgn0 { 1.0 } else { -1.0 };
                    if m00 != m11 {
                        ret |= TransformType::GENERAL_SCALE;
                    } else if m00 != unit {
                        ret |= TransformType::UNIFORM_SCALE;
                    }
                } else {
                    ret |= TransformType::FLIP;
                    if m00 != -m11 {
                        ret |= TransformType::GENERAL_SCALE;
                    } else if m00 != 1.0 && m00 != -1.0 {
                        ret |= TransformType::UNIFORM_SCALE;
                    }
                }
            }
            APPLY_SHEAR => {
                ret |= TransformType::QUADRANT_ROTATION;
                let sgn0 = m01 >= 0.0;
                let sgn1 = m10 >= 0.0;
                if sgn0 == sgn1 {
                    // Same signs: a quarter turn combined with an axis flip.
                    ret |= TransformType::FLIP;
                    if m01 != m10 {
                        ret |= TransformType::GENERAL_SCALE;
                    } else if m01 != 1.0 && m01 != -1.0 {
                        ret |= TransformType::UNIFORM_SCALE;
                    }
                } else if m01 != -m10 {
                    ret |= TransformType::GENERAL_SCALE;
                } else if m01 != 1.0 && m01 != -1.0 {
                    ret |= TransformType::UNIFORM_SCALE;
                }
            }
            _ => {
                if m00 * m01 + m10 * m11 != 0.0 {
                    // Transformed unit vectors are not perpendicular.
                    return TransformType::GENERAL_TRANSFORM;
                }
                let sgn0 = m00 >= 0.0;
                let sgn1 = m11 >= 0.0;
                ret |= TransformType::GENERAL_ROTATION;
                let det = m00 * m11 - m01 * m10;
                if sgn0 == sgn1 {
                    if m00 != m11 || m01 != -m10 {
                        ret |= TransformType::GENERAL_SCALE;
                    } else if det != 1.0 {
                        ret |= TransformType::UNIFORM_SCALE;
                    }
                } else {
                    ret |= TransformType::FLIP;
                    if m00 != -m11 || m01 != m10 {
                        ret |= TransformType::GENERAL_SCALE;
                    } else if det != -1.0 {
                        ret |= TransformType::UNIFORM_SCALE;
                    }
                }
            }
        }
        ret
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    #[inline]
    pub fn scale_x(&self) -> f64 {
        self.m00
    }

    #[inline]
    pub fn scale_y(&self) -> f64 {
        self.m11
    }

    #[inline]
    pub fn shear_x(&self) -> f64 {
        self.m01
    }

    #[inline]
    pub fn shear_y(&self) -> f64 {
        self.m10
    }

    #[inline]
    pub fn translate_x(&self) -> f64 {
        self.m02
    }

    #[inline]
    pub fn translate_y(&self) -> f64 {
        self.m12
    }

    /// The six coefficients as `[m00, m10, m01, m11, m02, m12]`.
    pub fn to_flat_matrix(&self) -> [f64; 6] {
        [self.m00, self.m10, self.m01, self.m11, self.m02, self.m12]
    }

    /// Determinant of the 2x2 portion.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.m00 * self.m11 - self.m01 * self.m10
    }

    pub fn is_identity(&self) -> bool {
        self.state == APPLY_IDENTITY
    }

    /// Check if two matrices are equal within epsilon.
    pub fn approx_eq(&self, other: &AffineTransform, epsilon: f64) -> bool {
        self.to_flat_matrix()
            .iter()
            .zip(other.to_flat_matrix().iter())
            .all(|(a, b)| (a - b).abs() <= epsilon || is_equal_eps(*a, *b, epsilon))
    }

    // ====================================================================
    // Replacing operations
    // ====================================================================

    pub fn set_to_identity(&mut self) {
        self.set_coefficients(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    }

    pub fn set_to_translation(&mut self, tx: f64, ty: f64) {
        self.set_coefficients(1.0, 0.0, 0.0, 1.0, tx, ty);
    }

    /// Replace with a rotation by `theta` radians.
    ///
    /// When the sine or cosine of `theta` is exactly ±1 the other term is
    /// forced to zero, so π/2, π and 3π/2 become exact quadrant rotations.
    pub fn set_to_rotation(&mut self, theta: f64) {
        let (sin, cos) = snapped_sin_cos(theta);
        self.set_coefficients(cos, sin, -sin, cos, 0.0, 0.0);
    }

    pub fn set_to_rotation_around(&mut self, theta: f64, ax: f64, ay: f64) {
        self.set_to_rotation(theta);
        let sin = self.m10;
        let one_minus_cos = 1.0 - self.m00;
        let m02 = ax * one_minus_cos + ay * sin;
        let m12 = ay * one_minus_cos - ax * sin;
        self.set_coefficients(self.m00, self.m10, self.m01, self.m11, m02, m12);
    }

    pub fn set_to_rotation_vector(&mut self, vx: f64, vy: f64) {
        let (sin, cos) = vector_sin_cos(vx, vy);
        self.set_coefficients(cos, sin, -sin, cos, 0.0, 0.0);
    }

    pub fn set_to_rotation_vector_around(&mut self, vx: f64, vy: f64, ax: f64, ay: f64) {
        let (sin, cos) = vector_sin_cos(vx, vy);
        let one_minus_cos = 1.0 - cos;
        self.set_coefficients(
            cos,
            sin,
            -sin,
            cos,
            ax * one_minus_cos + ay * sin,
            ay * one_minus_cos - ax * sin,
        );
    }

    pub fn set_to_quadrant_rotation(&mut self, numquadrants: i32) {
        let (sin, cos) = quadrant_sin_cos(numquadrants);
        self.set_coefficients(cos, sin, -sin, cos, 0.0, 0.0);
    }

    pub fn set_to_quadrant_rotation_around(&mut self, numquadrants: i32, ax: f64, ay: f64) {
        let (sin, cos) = quadrant_sin_cos(numquadrants);
        let one_minus_cos = 1.0 - cos;
        self.set_coefficients(
            cos,
            sin,
            -sin,
            cos,
            ax * one_minus_cos + ay * sin,
            ay * one_minus_cos - ax * sin,
        );
    }

    pub fn set_to_scale(&mut self, sx: f64, sy: f64) {
        self.set_coefficients(sx, 0.0, 0.0, sy, 0.0, 0.0);
    }

    pub fn set_to_shear(&mut self, shx: f64, shy: f64) {
        self.set_coefficients(1.0, shy, shx, 1.0, 0.0, 0.0);
    }

    /// Copy another transform into this one.
    pub fn set_transform(&mut self, tx: &AffineTransform) {
        *self = tx.clone();
    }

    /// Replace all six coefficients.
    pub fn set_matrix(&mut self, m00: f64, m10: f64, m01: f64, m11: f64, m02: f64, m12: f64) {
        self.set_coefficients(m00, m10, m01, m11, m02, m12);
    }

    // ====================================================================
    // Concatenating operations (mutate self)
    // ====================================================================

    /// Concatenate a translation: points are translated first.
    pub fn translate(&mut self, tx: f64, ty: f64) {
        let m02 = tx * self.m00 + ty * self.m01 + self.m02;
        let m12 = tx * self.m10 + ty * self.m11 + self.m12;
        self.set_coefficients(self.m00, self.m10, self.m01, self.m11, m02, m12);
    }

    /// Concatenate a rotation by `theta` radians.
    pub fn rotate(&mut self, theta: f64) {
        let sin = theta.sin();
        if sin == 1.0 {
            self.rotate90();
        } else if sin == -1.0 {
            self.rotate270();
        } else {
            let cos = theta.cos();
            if cos == -1.0 {
                self.rotate180();
            } else if cos != 1.0 {
                self.rotate_sin_cos(sin, cos);
            }
        }
    }

    /// Concatenate a rotation by `theta` about the anchor point `(ax, ay)`.
    pub fn rotate_around(&mut self, theta: f64, ax: f64, ay: f64) {
        self.translate(ax, ay);
        self.rotate(theta);
        self.translate(-ax, -ay);
    }

    /// Concatenate a rotation towards the vector `(vx, vy)`.
    pub fn rotate_vector(&mut self, vx: f64, vy: f64) {
        if vy == 0.0 {
            if vx < 0.0 {
                self.rotate180();
            }
        } else if vx == 0.0 {
            if vy > 0.0 {
                self.rotate90();
            } else {
                self.rotate270();
            }
        } else {
            let len = (vx * vx + vy * vy).sqrt();
            self.rotate_sin_cos(vy / len, vx / len);
        }
    }

    pub fn rotate_vector_around(&mut self, vx: f64, vy: f64, ax: f64, ay: f64) {
        self.translate(ax, ay);
        self.rotate_vector(vx, vy);
        self.translate(-ax, -ay);
    }

    /// Concatenate a rotation by `numquadrants` multiples of 90 degrees.
    pub fn quadrant_rotate(&mut self, numquadrants: i32) {
        match numquadrants & 3 {
            1 => self.rotate90(),
            2 => self.rotate180(),
            3 => self.rotate270(),
            _ => {}
        }
    }

    pub fn quadrant_rotate_around(&mut self, numquadrants: i32, ax: f64, ay: f64) {
        self.translate(ax, ay);
        self.quadrant_rotate(numquadrants);
        self.translate(-ax, -ay);
    }

    fn rotate_sin_cos(&mut self, sin: f64, cos: f64) {
        let (m00, m01, m10, m11) = (self.m00, self.m01, self.m10, self.m11);
        self.set_coefficients(
            cos * m00 + sin * m01,
            cos * m10 + sin * m11,
            -sin * m00 + cos * m01,
            -sin * m10 + cos * m11,
            self.m02,
            self.m12,
        );
    }

    fn rotate90(&mut self) {
        let (m00, m01, m10, m11) = (self.m00, self.m01, self.m10, self.m11);
        self.set_coefficients(m01, m11, -m00, -m10, self.m02, self.m12);
    }

    fn rotate180(&mut self) {
        let (m00, m01, m10, m11) = (self.m00, self.m01, self.m10, self.m11);
        self.set_coefficients(-m00, -m10, -m01, -m11, self.m02, self.m12);
    }

    fn rotate270(&mut self) {
        let (m00, m01, m10, m11) = (self.m00, self.m01, self.m10, self.m11);
        self.set_coefficients(-m01, -m11, m00, m10, self.m02, self.m12);
    }

    /// Concatenate a scale.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.set_coefficients(
            self.m00 * sx,
            self.m10 * sx,
            self.m01 * sy,
            self.m11 * sy,
            self.m02,
            self.m12,
        );
    }

    /// Concatenate a shear.
    pub fn shear(&mut self, shx: f64, shy: f64) {
        let (m00, m01, m10, m11) = (self.m00, self.m01, self.m10, self.m11);
        self.set_coefficients(
            m00 + m01 * shy,
            m10 + m11 * shy,
            m00 * shx + m01,
            m10 * shx + m11,
            self.m02,
            self.m12,
        );
    }

    /// `self = self · tx`: points are mapped by `tx` first, then by the
    /// original `self`.
    pub fn concatenate(&mut self, tx: &AffineTransform) {
        let (m00, m01, m02) = (self.m00, self.m01, self.m02);
        let (m10, m11, m12) = (self.m10, self.m11, self.m12);
        self.set_coefficients(
            m00 * tx.m00 + m01 * tx.m10,
            m10 * tx.m00 + m11 * tx.m10,
            m00 * tx.m01 + m01 * tx.m11,
            m10 * tx.m01 + m11 * tx.m11,
            m00 * tx.m02 + m01 * tx.m12 + m02,
            m10 * tx.m02 + m11 * tx.m12 + m12,
        );
    }

    /// `self = tx · self`: points are mapped by the original `self` first,
    /// then by `tx`.
    pub fn pre_concatenate(&mut self, tx: &AffineTransform) {
        let (m00, m01, m02) = (self.m00, self.m01, self.m02);
        let (m10, m11, m12) = (self.m10, self.m11, self.m12);
        self.set_coefficients(
            tx.m00 * m00 + tx.m01 * m10,
            tx.m10 * m00 + tx.m11 * m10,
            tx.m00 * m01 + tx.m01 * m11,
            tx.m10 * m01 + tx.m11 * m11,
            tx.m00 * m02 + tx.m01 * m12 + tx.m02,
            tx.m10 * m02 + tx.m11 * m12 + tx.m12,
        );
    }

    // ====================================================================
    // Inversion
    // ====================================================================

    /// Return the inverse transform.
    ///
    /// Fails with [`Error::NoninvertibleTransform`] when the determinant is
    /// zero or too small to divide by.
    pub fn create_inverse(&self) -> Result<AffineTransform> {
        let state = self.state & !APPLY_TRANSLATE;
        let (m00, m01, m02, m10, m11, m12) =
            (self.m00, self.m01, self.m02, self.m10, self.m11, self.m12);
        let inv = match state {
            APPLY_IDENTITY => AffineTransform::translation(-m02, -m12),
            APPLY_SCALE => {
                if m00 == 0.0 || m11 == 0.0 {
                    return Err(self.noninvertible());
                }
                AffineTransform::from_matrix(
                    1.0 / m00,
                    0.0,
                    0.0,
                    1.0 / m11,
                    -m02 / m00,
                    -m12 / m11,
                )
            }
            APPLY_SHEAR => {
                if m01 == 0.0 || m10 == 0.0 {
                    return Err(self.noninvertible());
                }
                AffineTransform::from_matrix(
                    0.0,
                    1.0 / m01,
                    1.0 / m10,
                    0.0,
                    -m12 / m10,
                    -m02 / m01,
                )
            }
            _ => {
                let det = self.determinant();
                if det.abs() < f64::MIN_POSITIVE {
                    return Err(self.noninvertible());
                }
                AffineTransform::from_matrix(
                    m11 / det,
                    -m10 / det,
                    -m01 / det,
                    m00 / det,
                    (m01 * m12 - m11 * m02) / det,
                    (m10 * m02 - m00 * m12) / det,
                )
            }
        };
        Ok(inv)
    }

    /// Invert the matrix in place. Leaves `self` untouched on failure.
    pub fn invert(&mut self) -> Result<()> {
        *self = self.create_inverse()?;
        Ok(())
    }

    fn noninvertible(&self) -> Error {
        let det = self.determinant();
        log::trace!("transform {} is not invertible (det = {})", self, det);
        Error::NoninvertibleTransform(format!("determinant is {det}"))
    }

    // ====================================================================
    // Transformations
    // ====================================================================

    /// Forward transform of a coordinate pair.
    #[inline]
    pub fn transform_xy(&self, x: f64, y: f64) -> (f64, f64) {
        match self.state {
            APPLY_IDENTITY => (x, y),
            APPLY_TRANSLATE => (x + self.m02, y + self.m12),
            APPLY_SCALE => (x * self.m00, y * self.m11),
            s if s == APPLY_SCALE | APPLY_TRANSLATE => {
                (x * self.m00 + self.m02, y * self.m11 + self.m12)
            }
            APPLY_SHEAR => (y * self.m01, x * self.m10),
            s if s == APPLY_SHEAR | APPLY_TRANSLATE => {
                (y * self.m01 + self.m02, x * self.m10 + self.m12)
            }
            _ => (
                x * self.m00 + y * self.m01 + self.m02,
                x * self.m10 + y * self.m11 + self.m12,
            ),
        }
    }

    /// Forward transform of a point, preserving its precision.
    pub fn transform<T: Scalar>(&self, p: &Point2D<T>) -> Point2D<T> {
        let (x, y) = self.transform_xy(p.get_x(), p.get_y());
        Point2D::from_f64(x, y)
    }

    /// Transform without the translation terms (for direction vectors).
    pub fn delta_transform_xy(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.m00 + y * self.m01, x * self.m10 + y * self.m11)
    }

    pub fn delta_transform<T: Scalar>(&self, p: &Point2D<T>) -> Point2D<T> {
        let (x, y) = self.delta_transform_xy(p.get_x(), p.get_y());
        Point2D::from_f64(x, y)
    }

    /// Inverse transform of a coordinate pair without building the inverse.
    pub fn inverse_transform_xy(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let x = x - self.m02;
        let y = y - self.m12;
        match self.state & !APPLY_TRANSLATE {
            APPLY_IDENTITY => Ok((x, y)),
            APPLY_SCALE => {
                if self.m00 == 0.0 || self.m11 == 0.0 {
                    return Err(self.noninvertible());
                }
                Ok((x / self.m00, y / self.m11))
            }
            APPLY_SHEAR => {
                if self.m01 == 0.0 || self.m10 == 0.0 {
                    return Err(self.noninvertible());
                }
                Ok((y / self.m10, x / self.m01))
            }
            _ => {
                let det = self.determinant();
                if det.abs() < f64::MIN_POSITIVE {
                    return Err(self.noninvertible());
                }
                Ok((
                    (x * self.m11 - y * self.m01) / det,
                    (y * self.m00 - x * self.m10) / det,
                ))
            }
        }
    }

    pub fn inverse_transform<T: Scalar>(&self, p: &Point2D<T>) -> Result<Point2D<T>> {
        let (x, y) = self.inverse_transform_xy(p.get_x(), p.get_y())?;
        Ok(Point2D::from_f64(x, y))
    }

    /// Transform every `(x, y)` pair of `coords` in place.
    ///
    /// A trailing odd value is left untouched.
    pub fn transform_coords(&self, coords: &mut [f64]) {
        if self.state == APPLY_IDENTITY {
            return;
        }
        for pt in coords.chunks_exact_mut(2) {
            let (x, y) = self.transform_xy(pt[0], pt[1]);
            pt[0] = x;
            pt[1] = y;
        }
    }

    /// Transform `num_pts` points starting at `src_off` within `pts`, writing
    /// them starting at `dst_off` of the same array.
    ///
    /// The ranges may overlap. Each point's two components are read into a
    /// scratch pair before its destination is written; when the destination
    /// starts after the source the points are processed back to front so no
    /// source point is overwritten before it is read.
    pub fn transform_within(
        &self,
        pts: &mut [f64],
        src_off: usize,
        dst_off: usize,
        num_pts: usize,
    ) -> Result<()> {
        let len = pts.len();
        let fits = |off: usize| {
            num_pts
                .checked_mul(2)
                .and_then(|span| span.checked_add(off))
                .is_some_and(|end| end <= len)
        };
        if !fits(src_off) || !fits(dst_off) {
            return Err(Error::out_of_bounds(format!(
                "{num_pts} points at offsets {src_off}/{dst_off} exceed array of {len}"
            )));
        }
        let mut step = |i: usize| {
            let (x, y) = self.transform_xy(pts[src_off + 2 * i], pts[src_off + 2 * i + 1]);
            pts[dst_off + 2 * i] = x;
            pts[dst_off + 2 * i + 1] = y;
        };
        if dst_off > src_off {
            (0..num_pts).rev().for_each(&mut step);
        } else {
            (0..num_pts).for_each(&mut step);
        }
        Ok(())
    }

    /// Transform points from `src` into `dst`; both are flat `(x, y)` arrays.
    /// Transforms `min(src.len(), dst.len()) / 2` points.
    pub fn transform_slice(&self, src: &[f64], dst: &mut [f64]) {
        for (s, d) in src.chunks_exact(2).zip(dst.chunks_exact_mut(2)) {
            let (x, y) = self.transform_xy(s[0], s[1]);
            d[0] = x;
            d[1] = y;
        }
    }

    /// Single-precision bulk transform; arithmetic is done in double.
    pub fn transform_slice_f32(&self, src: &[f32], dst: &mut [f32]) {
        for (s, d) in src.chunks_exact(2).zip(dst.chunks_exact_mut(2)) {
            let (x, y) = self.transform_xy(s[0] as f64, s[1] as f64);
            d[0] = x as f32;
            d[1] = y as f32;
        }
    }

    /// Widening bulk transform.
    pub fn transform_slice_f32_to_f64(&self, src: &[f32], dst: &mut [f64]) {
        for (s, d) in src.chunks_exact(2).zip(dst.chunks_exact_mut(2)) {
            let (x, y) = self.transform_xy(s[0] as f64, s[1] as f64);
            d[0] = x;
            d[1] = y;
        }
    }

    /// Narrowing bulk transform.
    pub fn transform_slice_f64_to_f32(&self, src: &[f64], dst: &mut [f32]) {
        for (s, d) in src.chunks_exact(2).zip(dst.chunks_exact_mut(2)) {
            let (x, y) = self.transform_xy(s[0], s[1]);
            d[0] = x as f32;
            d[1] = y as f32;
        }
    }

    /// Inverse transform every `(x, y)` pair of `coords` in place.
    pub fn inverse_transform_coords(&self, coords: &mut [f64]) -> Result<()> {
        let inv = self.create_inverse()?;
        inv.transform_coords(coords);
        Ok(())
    }

    /// Outline of `shape` mapped through this transform.
    pub fn create_transformed_shape(&self, shape: &dyn Shape) -> Result<Path2D> {
        Path2D::from_shape(shape, Some(self))
    }
}

// ============================================================================
// Angle helpers
// ============================================================================

fn snapped_sin_cos(theta: f64) -> (f64, f64) {
    let sin = theta.sin();
    if sin == 1.0 || sin == -1.0 {
        return (sin, 0.0);
    }
    let cos = theta.cos();
    if cos == 1.0 || cos == -1.0 {
        return (0.0, cos);
    }
    (sin, cos)
}

fn vector_sin_cos(vx: f64, vy: f64) -> (f64, f64) {
    if vy == 0.0 {
        (0.0, if vx < 0.0 { -1.0 } else { 1.0 })
    } else if vx == 0.0 {
        (if vy > 0.0 { 1.0 } else { -1.0 }, 0.0)
    } else {
        let len = (vx * vx + vy * vy).sqrt();
        (vy / len, vx / len)
    }
}

fn quadrant_sin_cos(numquadrants: i32) -> (f64, f64) {
    match numquadrants & 3 {
        1 => (1.0, 0.0),
        2 => (0.0, -1.0),
        3 => (-1.0, 0.0),
        _ => (0.0, 1.0),
    }
}

// ============================================================================
// Trait impls
// ============================================================================

impl Default for AffineTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for AffineTransform {
    fn eq(&self, other: &Self) -> bool {
        self.to_flat_matrix() == other.to_flat_matrix()
    }
}

impl fmt::Debug for AffineTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AffineTransform")
            .field("m00", &self.m00)
            .field("m10", &self.m10)
            .field("m01", &self.m01)
            .field("m11", &self.m11)
            .field("m02", &self.m02)
            .field("m12", &self.m12)
            .finish()
    }
}

impl fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AffineTransform[[{}, {}, {}], [{}, {}, {}]]",
            self.m00, self.m01, self.m02, self.m10, self.m11, self.m12
        )
    }
}

/// Matrix product: `(a * b)` maps points through `b` first, then `a`.
impl std::ops::Mul for AffineTransform {
    type Output = AffineTransform;
    fn mul(self, rhs: AffineTransform) -> AffineTransform {
        let mut result = self;
        result.concatenate(&rhs);
        result
    }
}

impl std::ops::MulAssign for AffineTransform {
    fn mul_assign(&mut self, rhs: AffineTransform) {
        self.concatenate(&rhs);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Point2DD, Point2DF};
    use crate::rectangle::Rectangle2DD;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-10;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < EPS && (a.1 - b.1).abs() < EPS
    }

    #[test]
    fn test_identity() {
        let m = AffineTransform::new();
        assert!(m.is_identity());
        assert_eq!(m.get_type(), TransformType::IDENTITY);
        assert_eq!(m.determinant(), 1.0);
        assert_eq!(m.transform_xy(3.0, 4.0), (3.0, 4.0));
    }

    #[test]
    fn test_translation() {
        let m = AffineTransform::translation(10.0, 20.0);
        assert_eq!(m.transform_xy(5.0, 3.0), (15.0, 23.0));
        assert_eq!(m.get_type(), TransformType::TRANSLATION);
    }

    #[test]
    fn test_scaling() {
        let m = AffineTransform::scaling(2.0, 3.0);
        assert_eq!(m.transform_xy(5.0, 4.0), (10.0, 12.0));
        assert_eq!(m.get_type(), TransformType::GENERAL_SCALE);

        let u = AffineTransform::scaling(5.0, 5.0);
        assert_eq!(u.get_type(), TransformType::UNIFORM_SCALE);
    }

    #[test]
    fn test_flip_classification() {
        let m = AffineTransform::scaling(1.0, -1.0);
        assert_eq!(m.get_type(), TransformType::FLIP);

        let m = AffineTransform::scaling(2.0, -2.0);
        assert_eq!(m.get_type(), TransformType::FLIP | TransformType::UNIFORM_SCALE);
    }

    #[test]
    fn test_quadrant_rotations_are_exact() {
        for (theta, expect) in [
            (PI / 2.0, [0.0, 1.0, -1.0, 0.0]),
            (PI, [-1.0, 0.0, 0.0, -1.0]),
            (3.0 * PI / 2.0, [0.0, -1.0, 1.0, 0.0]),
        ] {
            let m = AffineTransform::rotation(theta);
            assert_eq!(&m.to_flat_matrix()[..4], &expect);
            assert_eq!(m.get_type(), TransformType::QUADRANT_ROTATION, "theta={theta}");
        }
        // A full turn collapses to the exact identity.
        let m = AffineTransform::rotation(2.0 * PI);
        assert!(m.is_identity());
        assert!(!m.get_type().contains(TransformType::GENERAL_ROTATION));
    }

    #[test]
    fn test_general_rotation() {
        let m = AffineTransform::rotation(PI / 4.0);
        let t = m.get_type();
        assert!(t.contains(TransformType::GENERAL_ROTATION));
        assert!(!t.intersects(TransformType::FLIP | TransformType::GENERAL_SCALE));
        let (x, y) = m.transform_xy(1.0, 0.0);
        assert!((x - y).abs() < EPS);
    }

    #[test]
    fn test_rotate_in_place_quadrants() {
        let mut m = AffineTransform::translation(5.0, 0.0);
        m.rotate(PI / 2.0);
        assert_eq!(
            m.get_type(),
            TransformType::TRANSLATION | TransformType::QUADRANT_ROTATION
        );
        // rotate 90 first: (1,0) -> (0,1), then translate -> (5,1)
        assert_eq!(m.transform_xy(1.0, 0.0), (5.0, 1.0));

        let mut q = AffineTransform::new();
        q.quadrant_rotate(2);
        assert_eq!(q, AffineTransform::rotation(PI));
        q.quadrant_rotate(-2);
        assert!(q.is_identity());
    }

    #[test]
    fn test_shear_only_classification() {
        let m = AffineTransform::from_matrix(0.0, 2.0, 2.0, 0.0, 0.0, 0.0);
        assert_eq!(
            m.get_type(),
            TransformType::QUADRANT_ROTATION | TransformType::FLIP | TransformType::UNIFORM_SCALE
        );
        let m = AffineTransform::from_matrix(0.0, 1.0, -3.0, 0.0, 0.0, 0.0);
        assert_eq!(
            m.get_type(),
            TransformType::QUADRANT_ROTATION | TransformType::GENERAL_SCALE
        );
    }

    #[test]
    fn test_general_transform() {
        let m = AffineTransform::shearing(0.5, 0.0);
        assert_eq!(m.get_type(), TransformType::GENERAL_TRANSFORM);
    }

    #[test]
    fn test_type_cache_invalidated() {
        let mut m = AffineTransform::scaling(2.0, 2.0);
        assert_eq!(m.get_type(), TransformType::UNIFORM_SCALE);
        m.scale(1.0, 3.0);
        assert_eq!(m.get_type(), TransformType::GENERAL_SCALE);
        m.set_to_identity();
        assert_eq!(m.get_type(), TransformType::IDENTITY);
    }

    #[test]
    fn test_translate_concatenates() {
        let mut m = AffineTransform::scaling(2.0, 2.0);
        m.translate(5.0, 0.0);
        // translate first, then scale: (3 + 5) * 2
        assert_eq!(m.transform_xy(3.0, 0.0), (16.0, 0.0));
    }

    #[test]
    fn test_concatenate_order() {
        let a = AffineTransform::translation(10.0, 0.0);
        let b = AffineTransform::scaling(2.0, 2.0);
        let mut ab = a.clone();
        ab.concatenate(&b);
        // b first, then a: 1*2 + 10
        assert_eq!(ab.transform_xy(1.0, 0.0), (12.0, 0.0));

        let mut pre = a.clone();
        pre.pre_concatenate(&b);
        // a first, then b: (1 + 10) * 2
        assert_eq!(pre.transform_xy(1.0, 0.0), (22.0, 0.0));

        assert_eq!(a * b, ab);
    }

    #[test]
    fn test_concatenate_composes_point_maps() {
        let mut a = AffineTransform::rotation(0.3);
        a.translate(4.0, -2.0);
        let mut b = AffineTransform::shearing(0.2, 0.7);
        b.scale(1.5, 0.5);
        let p = (3.0, 7.0);

        let mut ab = a.clone();
        ab.concatenate(&b);
        let (bx, by) = b.transform_xy(p.0, p.1);
        assert!(close(ab.transform_xy(p.0, p.1), a.transform_xy(bx, by)));
    }

    #[test]
    fn test_inverse_round_trip() {
        let mut m = AffineTransform::rotation(0.7);
        m.scale(2.0, 3.0);
        m.translate(10.0, 20.0);
        let inv = m.create_inverse().unwrap();
        let (x, y) = m.transform_xy(5.0, 4.0);
        assert!(close(inv.transform_xy(x, y), (5.0, 4.0)));
        assert!(close(m.inverse_transform_xy(x, y).unwrap(), (5.0, 4.0)));

        let result = m.clone() * inv;
        assert!(result.approx_eq(&AffineTransform::new(), 1e-9));
    }

    #[test]
    fn test_inverse_fast_paths_exact() {
        let t = AffineTransform::translation(3.0, -4.0);
        assert_eq!(t.create_inverse().unwrap(), AffineTransform::translation(-3.0, 4.0));

        let s = AffineTransform::scaling(4.0, 0.5);
        assert_eq!(s.create_inverse().unwrap(), AffineTransform::scaling(0.25, 2.0));

        let r = AffineTransform::quadrant_rotation(1);
        assert_eq!(r.create_inverse().unwrap(), AffineTransform::quadrant_rotation(3));
    }

    #[test]
    fn test_noninvertible() {
        let m = AffineTransform::from_matrix(1.0, 2.0, 2.0, 4.0, 0.0, 0.0);
        assert_eq!(m.determinant(), 0.0);
        assert!(matches!(
            m.create_inverse(),
            Err(Error::NoninvertibleTransform(_))
        ));
        assert!(m.inverse_transform_xy(1.0, 1.0).is_err());

        let mut z = AffineTransform::scaling(0.0, 1.0);
        assert!(z.invert().is_err());
        // Failed invert leaves the matrix untouched.
        assert_eq!(z, AffineTransform::scaling(0.0, 1.0));
    }

    #[test]
    fn test_rotation_around_anchor() {
        let m = AffineTransform::rotation_around(PI, 5.0, 5.0);
        assert!(close(m.transform_xy(0.0, 0.0), (10.0, 10.0)));
        let q = AffineTransform::quadrant_rotation_around(1, 1.0, 1.0);
        assert_eq!(q.transform_xy(2.0, 1.0), (1.0, 2.0));

        let mut r = AffineTransform::new();
        r.rotate_around(PI / 2.0, 1.0, 1.0);
        assert_eq!(r.transform_xy(2.0, 1.0), (1.0, 2.0));
    }

    #[test]
    fn test_rotation_vector() {
        let m = AffineTransform::rotation_vector(0.0, 3.0);
        assert_eq!(m, AffineTransform::quadrant_rotation(1));
        let m = AffineTransform::rotation_vector(-2.0, 0.0);
        assert_eq!(m.get_type(), TransformType::QUADRANT_ROTATION);
        let m = AffineTransform::rotation_vector_around(0.0, 1.0, 1.0, 1.0);
        assert_eq!(m, AffineTransform::quadrant_rotation_around(1, 1.0, 1.0));
        let mut n = AffineTransform::new();
        n.rotate_vector_around(0.0, 1.0, 1.0, 1.0);
        assert_eq!(n.transform_xy(2.0, 1.0), (1.0, 2.0));
        let m = AffineTransform::rotation_vector(1.0, 1.0);
        assert!(close(m.transform_xy(1.0, 0.0), (0.5f64.sqrt(), 0.5f64.sqrt())));
    }

    #[test]
    fn test_shear() {
        let m = AffineTransform::shearing(1.0, 0.0);
        assert_eq!(m.transform_xy(0.0, 1.0), (1.0, 1.0));
        let mut n = AffineTransform::new();
        n.shear(1.0, 0.0);
        assert_eq!(m, n);
    }

    #[test]
    fn test_delta_transform_ignores_translation() {
        let m = AffineTransform::from_matrix(2.0, 0.0, 0.0, 3.0, 100.0, 200.0);
        assert_eq!(m.delta_transform_xy(5.0, 4.0), (10.0, 12.0));
        let p = m.delta_transform(&Point2DF::new(1.0, 1.0));
        assert_eq!(p, Point2DF::new(2.0, 3.0));
    }

    #[test]
    fn test_point_transform_preserves_precision() {
        let m = AffineTransform::translation(0.5, 0.25);
        let p = m.transform(&Point2DD::new(1.0, 1.0));
        assert_eq!(p, Point2DD::new(1.5, 1.25));
        let back = m.inverse_transform(&p).unwrap();
        assert_eq!(back, Point2DD::new(1.0, 1.0));
    }

    #[test]
    fn test_transform_within_overlapping_forward() {
        let m = AffineTransform::translation(100.0, 0.0);
        let mut pts = [0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0];
        // Destination after source: must run back to front.
        m.transform_within(&mut pts, 0, 2, 3).unwrap();
        assert_eq!(pts, [0.0, 0.0, 100.0, 0.0, 101.0, 1.0, 102.0, 2.0]);
    }

    #[test]
    fn test_transform_within_overlapping_backward() {
        let m = AffineTransform::scaling(10.0, 10.0);
        let mut pts = [0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0];
        m.transform_within(&mut pts, 2, 0, 3).unwrap();
        assert_eq!(pts, [10.0, 10.0, 20.0, 20.0, 30.0, 30.0, 3.0, 3.0]);
    }

    #[test]
    fn test_transform_within_odd_offset() {
        let m = AffineTransform::translation(1.0, 1.0);
        let mut pts = [1.0, 2.0, 3.0, 4.0, 0.0];
        m.transform_within(&mut pts, 0, 1, 2).unwrap();
        assert_eq!(pts, [1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_transform_within_bounds_checked() {
        let m = AffineTransform::new();
        let mut pts = [0.0; 4];
        assert!(matches!(
            m.transform_within(&mut pts, 1, 0, 2),
            Err(Error::IndexOutOfBounds(_))
        ));
    }

    #[test]
    fn test_transform_within_huge_counts_checked() {
        let m = AffineTransform::translation(1.0, 0.0);
        let mut pts = [0.0; 4];
        for (src, dst, n) in [
            (0, 0, usize::MAX / 2 + 1),
            (usize::MAX, 0, 1),
            (0, usize::MAX - 1, 1),
        ] {
            assert!(matches!(
                m.transform_within(&mut pts, src, dst, n),
                Err(Error::IndexOutOfBounds(_))
            ));
        }
        assert_eq!(pts, [0.0; 4]);
    }

    #[test]
    fn test_bulk_slices() {
        let m = AffineTransform::scaling(2.0, 3.0);
        let src = [1.0_f32, 1.0, 2.0, 2.0];
        let mut dst = [0.0_f64; 4];
        m.transform_slice_f32_to_f64(&src, &mut dst);
        assert_eq!(dst, [2.0, 3.0, 4.0, 6.0]);

        let mut back = [0.0_f32; 4];
        m.transform_slice_f64_to_f32(&[1.0, 1.0, 0.5, 0.5], &mut back);
        assert_eq!(back, [2.0, 3.0, 1.0, 1.5]);

        let mut f = [0.0_f32; 2];
        m.transform_slice_f32(&[1.0, 2.0], &mut f);
        assert_eq!(f, [2.0, 6.0]);

        let mut coords = [1.0, 1.0, 7.0];
        m.transform_coords(&mut coords);
        assert_eq!(coords, [2.0, 3.0, 7.0]);
        m.inverse_transform_coords(&mut coords).unwrap();
        assert_eq!(coords, [1.0, 1.0, 7.0]);
    }

    #[test]
    fn test_flat_matrix() {
        let m = AffineTransform::from_flat_matrix(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.to_flat_matrix(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.scale_x(), 1.0);
        assert_eq!(m.shear_y(), 2.0);
        assert_eq!(m.shear_x(), 3.0);
        assert_eq!(m.scale_y(), 4.0);
        assert_eq!(m.translate_x(), 5.0);
        assert_eq!(m.translate_y(), 6.0);
        assert_eq!(m.determinant(), 4.0 - 6.0);

        let m4 = AffineTransform::from_flat_matrix(&[1.0, 0.0, 0.0, 1.0]).unwrap();
        assert!(m4.is_identity());
        assert!(AffineTransform::from_flat_matrix(&[1.0; 5]).is_err());
    }

    #[test]
    fn test_display() {
        let m = AffineTransform::translation(1.0, 2.0);
        assert_eq!(m.to_string(), "AffineTransform[[1, 0, 1], [0, 1, 2]]");
    }

    #[test]
    fn test_transformed_shape_bounds() {
        let r = Rectangle2DD::new(0.0, 0.0, 10.0, 5.0);
        let m = AffineTransform::quadrant_rotation(1);
        let p = m.create_transformed_shape(&r).unwrap();
        let b = p.bounds_2d();
        assert_eq!(b, Rectangle2DD::new(-5.0, 0.0, 5.0, 10.0));
    }
}
