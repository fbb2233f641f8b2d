//! Ellipses framed by a rectangle.
//!
//! The outline is emitted as four cubic Bézier arcs, one per quadrant,
//! using the standard control-point distance for a circular quarter arc.

use crate::affine_transform::AffineTransform;
use crate::basics::{Scalar, WindingRule};
use crate::path_iterator::{FixedPathIterator, PathIterator, Segment};
use crate::rectangle::{Rectangle2D, Rectangle2DD};
use crate::shape::Shape;

/// Distance of a quarter-arc Bézier control point from its end point, as a
/// fraction of the radius: `4/3 * (sqrt(2) - 1)`.
pub const ELLIPSE_CTRL_VAL: f64 = 0.5522847498307933;

const PCV: f64 = 0.5 + ELLIPSE_CTRL_VAL * 0.5;
const NCV: f64 = 0.5 - ELLIPSE_CTRL_VAL * 0.5;

// Control points of each quadrant in unit-frame coordinates, starting from
// the rightmost point and turning towards +y.
const CTRL_PTS: [[f64; 6]; 4] = [
    [1.0, PCV, PCV, 1.0, 0.5, 1.0],
    [NCV, 1.0, 0.0, PCV, 0.0, 0.5],
    [0.0, NCV, NCV, 0.0, 0.5, 0.0],
    [PCV, 0.0, 1.0, NCV, 1.0, 0.5],
];

/// Ellipse inscribed in the frame `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ellipse2D<T: Scalar> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

pub type Ellipse2DF = Ellipse2D<f32>;
pub type Ellipse2DD = Ellipse2D<f64>;

impl<T: Scalar> Ellipse2D<T> {
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Ellipse inscribed in `r`.
    pub fn from_frame<U: Scalar>(r: &Rectangle2D<U>) -> Self {
        let mut e = Self::default();
        e.set_frame(r.get_x(), r.get_y(), r.get_width(), r.get_height());
        e
    }

    pub fn set_frame(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.x = T::from_f64(x);
        self.y = T::from_f64(y);
        self.width = T::from_f64(w);
        self.height = T::from_f64(h);
    }

    #[inline]
    pub fn get_x(&self) -> f64 {
        self.x.to_f64()
    }

    #[inline]
    pub fn get_y(&self) -> f64 {
        self.y.to_f64()
    }

    #[inline]
    pub fn get_width(&self) -> f64 {
        self.width.to_f64()
    }

    #[inline]
    pub fn get_height(&self) -> f64 {
        self.height.to_f64()
    }

    pub fn is_empty(&self) -> bool {
        self.get_width() <= 0.0 || self.get_height() <= 0.0
    }

    pub fn frame(&self) -> Rectangle2DD {
        Rectangle2DD::new(self.get_x(), self.get_y(), self.get_width(), self.get_height())
    }

    /// Outline iterator: move-to, four cubics and a close.
    pub fn ellipse_iterator(&self, at: Option<&AffineTransform>) -> FixedPathIterator {
        let (x, y, w, h) = (self.get_x(), self.get_y(), self.get_width(), self.get_height());
        let mut segments = Vec::with_capacity(6);
        if w >= 0.0 && h >= 0.0 {
            let map = |c: &[f64; 6]| {
                [
                    x + c[0] * w,
                    y + c[1] * h,
                    x + c[2] * w,
                    y + c[3] * h,
                    x + c[4] * w,
                    y + c[5] * h,
                ]
            };
            let start = map(&CTRL_PTS[3]);
            segments.push((Segment::MoveTo, [start[4], start[5], 0.0, 0.0, 0.0, 0.0]));
            segments.extend(CTRL_PTS.iter().map(|c| (Segment::CubicTo, map(c))));
            segments.push((Segment::Close, [0.0; 6]));
        }
        FixedPathIterator::new("ellipse", WindingRule::NonZero, segments, at)
    }
}

impl<T: Scalar> Shape for Ellipse2D<T> {
    fn bounds_2d(&self) -> Rectangle2DD {
        self.frame()
    }

    fn contains(&self, px: f64, py: f64) -> bool {
        let w = self.get_width();
        let h = self.get_height();
        if w <= 0.0 || h <= 0.0 {
            return false;
        }
        let nx = (px - self.get_x()) / w - 0.5;
        let ny = (py - self.get_y()) / h - 0.5;
        nx * nx + ny * ny < 0.25
    }

    fn contains_rect(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        self.contains(x, y)
            && self.contains(x + w, y)
            && self.contains(x, y + h)
            && self.contains(x + w, y + h)
    }

    fn intersects(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        if w <= 0.0 || h <= 0.0 || self.is_empty() {
            return false;
        }
        let ew = self.get_width();
        let eh = self.get_height();
        let nx0 = (x - self.get_x()) / ew - 0.5;
        let nx1 = nx0 + w / ew;
        let ny0 = (y - self.get_y()) / eh - 0.5;
        let ny1 = ny0 + h / eh;
        // Closest point of the normalized rectangle to the ellipse center.
        let near_x = if nx0 > 0.0 {
            nx0
        } else if nx1 < 0.0 {
            nx1
        } else {
            0.0
        };
        let near_y = if ny0 > 0.0 {
            ny0
        } else if ny1 < 0.0 {
            ny1
        } else {
            0.0
        };
        near_x * near_x + near_y * near_y < 0.25
    }

    fn path_iterator<'a>(&'a self, at: Option<&AffineTransform>) -> Box<dyn PathIterator + 'a> {
        Box::new(self.ellipse_iterator(at))
    }
}
