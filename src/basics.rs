//! Foundation types shared by the geometry modules.
//!
//! The [`Scalar`] trait lets points, lines, rectangles and ellipses store
//! their coordinates in single or double precision. [`WindingRule`] decides
//! the interior of a path. The remaining helpers snap real coordinates to
//! the integer grid and compare coefficients with a tolerance.

use core::fmt;

// ============================================================================
// Scalar
// ============================================================================

/// Coordinate storage type for the geometry primitives.
///
/// Implemented for `f32` and `f64`. Arithmetic is always carried out in
/// double precision; the storage type only decides how values are kept.
pub trait Scalar: Copy + PartialEq + PartialOrd + Default + fmt::Debug + 'static {
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
}

impl Scalar for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Scalar for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

// ============================================================================
// Winding rule
// ============================================================================

/// Rule deciding which regions of a self-intersecting path are "inside".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindingRule {
    /// A point is inside when a ray from it crosses the path an odd number
    /// of times.
    EvenOdd,
    /// A point is inside when the signed crossing count is non-zero.
    #[default]
    NonZero,
}

impl WindingRule {
    /// Decide insideness from a signed crossing count.
    #[inline]
    pub fn is_inside(self, crossings: i32) -> bool {
        match self {
            WindingRule::EvenOdd => crossings & 1 != 0,
            WindingRule::NonZero => crossings != 0,
        }
    }
}

// ============================================================================
// Grid snapping
// ============================================================================

/// Largest integer not above `v`, saturated to the `i32` range.
#[inline]
pub fn floor_to_i32(v: f64) -> i32 {
    v.floor() as i32
}

/// Smallest integer not below `v`, saturated to the `i32` range.
#[inline]
pub fn ceil_to_i32(v: f64) -> i32 {
    v.ceil() as i32
}

// ============================================================================
// Approximate equality
// ============================================================================

/// `true` when `v1` and `v2` differ by at most `epsilon` relative to the
/// larger magnitude. Values of opposite sign only match when both are
/// within `epsilon` of zero.
pub fn is_equal_eps(v1: f64, v2: f64, epsilon: f64) -> bool {
    if (v1 < 0.0) != (v2 < 0.0) {
        return v1.abs() <= epsilon && v2.abs() <= epsilon;
    }
    let scale = v1.abs().max(v2.abs()).max(1.0);
    (v1 - v2).abs() <= epsilon * scale
}
