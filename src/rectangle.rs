//! Axis-aligned rectangles.
//!
//! [`Rectangle2D`] is the real-valued rectangle in single or double
//! precision. [`Rectangle`] is the integer rectangle produced when a shape
//! is snapped to pixel bounds.

use bitflags::bitflags;

use crate::affine_transform::AffineTransform;
use crate::basics::{ceil_to_i32, floor_to_i32, Scalar, WindingRule};
use crate::path_iterator::{FixedPathIterator, PathIterator, Segment};
use crate::shape::Shape;

// ============================================================================
// Integer rectangle
// ============================================================================

/// Integer rectangle `(x, y, width, height)`.
///
/// Arithmetic on corners is done in 64 bits and clamped back, so extreme
/// coordinates never wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    fn x2(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    fn y2(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        if self.width < 0 || self.height < 0 {
            return false;
        }
        x >= self.x && y >= self.y && (x as i64) < self.x2() && (y as i64) < self.y2()
    }

    pub fn contains_rect(&self, r: &Rectangle) -> bool {
        if self.is_empty() || r.width < 0 || r.height < 0 {
            return false;
        }
        r.x >= self.x && r.y >= self.y && r.x2() <= self.x2() && r.y2() <= self.y2()
    }

    pub fn intersects(&self, r: &Rectangle) -> bool {
        if self.is_empty() || r.is_empty() {
            return false;
        }
        (r.x as i64) < self.x2()
            && (r.y as i64) < self.y2()
            && r.x2() > self.x as i64
            && r.y2() > self.y as i64
    }

    /// Overlap of the two rectangles. Disjoint inputs give a negative width
    /// or height.
    pub fn intersection(&self, r: &Rectangle) -> Rectangle {
        let x1 = self.x.max(r.x);
        let y1 = self.y.max(r.y);
        let x2 = self.x2().min(r.x2());
        let y2 = self.y2().min(r.y2());
        Rectangle::new(
            x1,
            y1,
            clamp_i32(x2 - x1 as i64),
            clamp_i32(y2 - y1 as i64),
        )
    }

    /// Smallest rectangle containing both. A rectangle with negative size
    /// does not contribute.
    pub fn union(&self, r: &Rectangle) -> Rectangle {
        if self.width < 0 || self.height < 0 {
            return *r;
        }
        if r.width < 0 || r.height < 0 {
            return *self;
        }
        let x1 = self.x.min(r.x);
        let y1 = self.y.min(r.y);
        let x2 = self.x2().max(r.x2());
        let y2 = self.y2().max(r.y2());
        Rectangle::new(
            x1,
            y1,
            clamp_i32(x2 - x1 as i64),
            clamp_i32(y2 - y1 as i64),
        )
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }

    pub fn to_rectangle_2d(&self) -> Rectangle2DD {
        Rectangle2DD::new(
            self.x as f64,
            self.y as f64,
            self.width as f64,
            self.height as f64,
        )
    }
}

// ============================================================================
// Outcode
// ============================================================================

bitflags! {
    /// Sides of a rectangle a point lies beyond.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Outcode: u32 {
        const LEFT = 1;
        const TOP = 2;
        const RIGHT = 4;
        const BOTTOM = 8;
    }
}

// ============================================================================
// Real-valued rectangle
// ============================================================================

/// Rectangle `(x, y, width, height)` stored in precision `T`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle2D<T: Scalar> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

pub type Rectangle2DF = Rectangle2D<f32>;
pub type Rectangle2DD = Rectangle2D<f64>;

impl<T: Scalar> Rectangle2D<T> {
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_f64(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(T::from_f64(x), T::from_f64(y), T::from_f64(w), T::from_f64(h))
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

    pub fn get_min_x(&self) -> f64 {
        self.get_x()
    }

    pub fn get_min_y(&self) -> f64 {
        self.get_y()
    }

    pub fn get_max_x(&self) -> f64 {
        self.get_x() + self.get_width()
    }

    pub fn get_max_y(&self) -> f64 {
        self.get_y() + self.get_height()
    }

    pub fn get_center_x(&self) -> f64 {
        self.get_x() + self.get_width() / 2.0
    }

    pub fn get_center_y(&self) -> f64 {
        self.get_y() + self.get_height() / 2.0
    }

    /// `true` when the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        self.get_width() <= 0.0 || self.get_height() <= 0.0
    }

    pub fn set_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        *self = Self::from_f64(x, y, w, h);
    }

    pub fn set_rect_from<U: Scalar>(&mut self, r: &Rectangle2D<U>) {
        self.set_rect(r.get_x(), r.get_y(), r.get_width(), r.get_height());
    }

    pub fn set_frame(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.set_rect(x, y, w, h);
    }

    /// Frame spanned by two opposite corners, in any order.
    pub fn set_frame_from_diagonal(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let (x1, x2) = if x2 < x1 { (x2, x1) } else { (x1, x2) };
        let (y1, y2) = if y2 < y1 { (y2, y1) } else { (y1, y2) };
        self.set_frame(x1, y1, x2 - x1, y2 - y1);
    }

    /// Frame centered on `(cx, cy)` with one corner at `(corner_x, corner_y)`.
    pub fn set_frame_from_center(&mut self, cx: f64, cy: f64, corner_x: f64, corner_y: f64) {
        let hw = (corner_x - cx).abs();
        let hh = (corner_y - cy).abs();
        self.set_frame(cx - hw, cy - hh, hw * 2.0, hh * 2.0);
    }

    /// Sides of this rectangle that `(px, py)` lies beyond.
    ///
    /// An axis with non-positive extent reports both of its sides.
    pub fn outcode(&self, px: f64, py: f64) -> Outcode {
        let mut out = Outcode::empty();
        if self.get_width() <= 0.0 {
            out |= Outcode::LEFT | Outcode::RIGHT;
        } else if px < self.get_x() {
            out |= Outcode::LEFT;
        } else if px > self.get_max_x() {
            out |= Outcode::RIGHT;
        }
        if self.get_height() <= 0.0 {
            out |= Outcode::TOP | Outcode::BOTTOM;
        } else if py < self.get_y() {
            out |= Outcode::TOP;
        } else if py > self.get_max_y() {
            out |= Outcode::BOTTOM;
        }
        out
    }

    /// `true` if the segment `(x1,y1)→(x2,y2)` touches this rectangle.
    pub fn intersects_line(&self, mut x1: f64, mut y1: f64, x2: f64, y2: f64) -> bool {
        let out2 = self.outcode(x2, y2);
        if out2.is_empty() {
            return true;
        }
        loop {
            let out1 = self.outcode(x1, y1);
            if out1.is_empty() {
                return true;
            }
            if out1.intersects(out2) {
                return false;
            }
            if out1.intersects(Outcode::LEFT | Outcode::RIGHT) {
                let x = if out1.contains(Outcode::RIGHT) {
                    self.get_max_x()
                } else {
                    self.get_x()
                };
                y1 += (x - x1) * (y2 - y1) / (x2 - x1);
                x1 = x;
            } else {
                let y = if out1.contains(Outcode::BOTTOM) {
                    self.get_max_y()
                } else {
                    self.get_y()
                };
                x1 += (y - y1) * (x2 - x1) / (y2 - y1);
                y1 = y;
            }
        }
    }

    /// Write the overlap of `src1` and `src2` into `dest`.
    ///
    /// Disjoint inputs give a negative width or height.
    pub fn intersect<A: Scalar, B: Scalar>(
        src1: &Rectangle2D<A>,
        src2: &Rectangle2D<B>,
        dest: &mut Rectangle2D<T>,
    ) {
        let x1 = src1.get_min_x().max(src2.get_min_x());
        let y1 = src1.get_min_y().max(src2.get_min_y());
        let x2 = src1.get_max_x().min(src2.get_max_x());
        let y2 = src1.get_max_y().min(src2.get_max_y());
        dest.set_frame(x1, y1, x2 - x1, y2 - y1);
    }

    /// Write the smallest rectangle containing both inputs into `dest`.
    pub fn union<A: Scalar, B: Scalar>(
        src1: &Rectangle2D<A>,
        src2: &Rectangle2D<B>,
        dest: &mut Rectangle2D<T>,
    ) {
        let x1 = src1.get_min_x().min(src2.get_min_x());
        let y1 = src1.get_min_y().min(src2.get_min_y());
        let x2 = src1.get_max_x().max(src2.get_max_x());
        let y2 = src1.get_max_y().max(src2.get_max_y());
        dest.set_frame_from_diagonal(x1, y1, x2, y2);
    }

    /// In-place intersection: `self = self ∩ other`.
    pub fn intersect_with<U: Scalar>(&mut self, other: &Rectangle2D<U>) {
        let src = *self;
        Self::intersect(&src, other, self);
    }

    /// In-place union: `self = self ∪ other`.
    pub fn union_with<U: Scalar>(&mut self, other: &Rectangle2D<U>) {
        let src = *self;
        Self::union(&src, other, self);
    }

    pub fn create_intersection<U: Scalar>(&self, r: &Rectangle2D<U>) -> Rectangle2DD {
        let mut dest = Rectangle2DD::default();
        Rectangle2DD::intersect(self, r, &mut dest);
        dest
    }

    pub fn create_union<U: Scalar>(&self, r: &Rectangle2D<U>) -> Rectangle2DD {
        let mut dest = Rectangle2DD::default();
        Rectangle2DD::union(self, r, &mut dest);
        dest
    }

    /// Grow to include the point `(px, py)`.
    pub fn add_point(&mut self, px: f64, py: f64) {
        let x1 = self.get_min_x().min(px);
        let x2 = self.get_max_x().max(px);
        let y1 = self.get_min_y().min(py);
        let y2 = self.get_max_y().max(py);
        self.set_rect(x1, y1, x2 - x1, y2 - y1);
    }

    /// Grow to include `r`.
    pub fn add_rect<U: Scalar>(&mut self, r: &Rectangle2D<U>) {
        let x1 = self.get_min_x().min(r.get_min_x());
        let x2 = self.get_max_x().max(r.get_max_x());
        let y1 = self.get_min_y().min(r.get_min_y());
        let y2 = self.get_max_y().max(r.get_max_y());
        self.set_rect(x1, y1, x2 - x1, y2 - y1);
    }

    /// Integer rectangle enclosing this one: min corner floored, max corner
    /// ceiled. A negative width or height gives an empty rectangle.
    pub fn to_bounds(&self) -> Rectangle {
        let w = self.get_width();
        let h = self.get_height();
        if w < 0.0 || h < 0.0 {
            return Rectangle::default();
        }
        let x = floor_to_i32(self.get_x());
        let y = floor_to_i32(self.get_y());
        let x2 = ceil_to_i32(self.get_x() + w);
        let y2 = ceil_to_i32(self.get_y() + h);
        Rectangle::new(x, y, x2.saturating_sub(x), y2.saturating_sub(y))
    }

    pub fn to_f64(&self) -> Rectangle2DD {
        Rectangle2DD::new(self.get_x(), self.get_y(), self.get_width(), self.get_height())
    }

    /// Outline iterator: move-to, three line-tos and a close.
    ///
    /// A rectangle with negative width or height yields no segments.
    pub fn rect_iterator(&self, at: Option<&AffineTransform>) -> FixedPathIterator {
        let (x, y, w, h) = (self.get_x(), self.get_y(), self.get_width(), self.get_height());
        let segments = if w < 0.0 || h < 0.0 {
            Vec::new()
        } else {
            vec![
                (Segment::MoveTo, [x, y, 0.0, 0.0, 0.0, 0.0]),
                (Segment::LineTo, [x + w, y, 0.0, 0.0, 0.0, 0.0]),
                (Segment::LineTo, [x + w, y + h, 0.0, 0.0, 0.0, 0.0]),
                (Segment::LineTo, [x, y + h, 0.0, 0.0, 0.0, 0.0]),
                (Segment::Close, [0.0; 6]),
            ]
        };
        FixedPathIterator::new("rect", WindingRule::NonZero, segments, at)
    }
}

impl<T: Scalar> Shape for Rectangle2D<T> {
    fn bounds_2d(&self) -> Rectangle2DD {
        self.to_f64()
    }

    fn contains(&self, px: f64, py: f64) -> bool {
        let x0 = self.get_x();
        let y0 = self.get_y();
        px >= x0 && py >= y0 && px < x0 + self.get_width() && py < y0 + self.get_height()
    }

    fn contains_rect(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        if self.is_empty() || w <= 0.0 || h <= 0.0 {
            return false;
        }
        let x0 = self.get_x();
        let y0 = self.get_y();
        x >= x0 && y >= y0 && (x + w) <= x0 + self.get_width() && (y + h) <= y0 + self.get_height()
    }

    fn intersects(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        if self.is_empty() || w <= 0.0 || h <= 0.0 {
            return false;
        }
        let x0 = self.get_x();
        let y0 = self.get_y();
        x + w > x0 && y + h > y0 && x < x0 + self.get_width() && y < y0 + self.get_height()
    }

    fn path_iterator<'a>(&'a self, at: Option<&AffineTransform>) -> Box<dyn PathIterator + 'a> {
        Box::new(self.rect_iterator(at))
    }
}

// ============================================================================
// Tests
// ============================================================================
