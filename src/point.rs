//! 2D points in single or double precision.

use crate::basics::Scalar;
use crate::math::{calc_distance, calc_sq_distance};

/// A point in 2D user space.
///
/// Coordinates are stored as `T` (`f32` or `f64`) and read back as `f64`.
/// Points have no identity beyond their value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D<T: Scalar> {
    pub x: T,
    pub y: T,
}

pub type Point2DF = Point2D<f32>;
pub type Point2DD = Point2D<f64>;

impl<T: Scalar> Point2D<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Build a point from double-precision coordinates, narrowing if needed.
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self {
            x: T::from_f64(x),
            y: T::from_f64(y),
        }
    }

    #[inline]
    pub fn get_x(&self) -> f64 {
        self.x.to_f64()
    }

    #[inline]
    pub fn get_y(&self) -> f64 {
        self.y.to_f64()
    }

    pub fn set_location(&mut self, x: f64, y: f64) {
        self.x = T::from_f64(x);
        self.y = T::from_f64(y);
    }

    /// Copy the location of another point, whatever its precision.
    pub fn set_location_from<U: Scalar>(&mut self, p: &Point2D<U>) {
        self.set_location(p.get_x(), p.get_y());
    }

    pub fn distance_sq(&self, px: f64, py: f64) -> f64 {
        calc_sq_distance(self.get_x(), self.get_y(), px, py)
    }

    pub fn distance(&self, px: f64, py: f64) -> f64 {
        calc_distance(self.get_x(), self.get_y(), px, py)
    }

    pub fn distance_sq_to<U: Scalar>(&self, p: &Point2D<U>) -> f64 {
        self.distance_sq(p.get_x(), p.get_y())
    }

    pub fn distance_to<U: Scalar>(&self, p: &Point2D<U>) -> f64 {
        self.distance(p.get_x(), p.get_y())
    }

    /// Widen to a double-precision point.
    pub fn to_f64(&self) -> Point2DD {
        Point2DD::new(self.get_x(), self.get_y())
    }
}

impl<T: Scalar> From<(T, T)> for Point2D<T> {
    fn from((x, y): (T, T)) -> Self {
        Self::new(x, y)
    }
}
