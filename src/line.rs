//! Line segments.

use crate::affine_transform::AffineTransform;
use crate::basics::{Scalar, WindingRule};
use crate::math::{
    lines_intersect, pt_line_dist, pt_line_dist_sq, pt_seg_dist, pt_seg_dist_sq, relative_ccw,
};
use crate::path_iterator::{FixedPathIterator, PathIterator, Segment};
use crate::point::{Point2D, Point2DD};
use crate::rectangle::Rectangle2DD;
use crate::shape::Shape;

/// Segment from `(x1, y1)` to `(x2, y2)` stored in precision `T`.
///
/// A line encloses no area: [`Shape::contains`] is always `false`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Line2D<T: Scalar> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

pub type Line2DF = Line2D<f32>;
pub type Line2DD = Line2D<f64>;

impl<T: Scalar> Line2D<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_points<U: Scalar>(p1: &Point2D<U>, p2: &Point2D<U>) -> Self {
        let mut l = Self::default();
        l.set_line(p1.get_x(), p1.get_y(), p2.get_x(), p2.get_y());
        l
    }

    pub fn set_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.x1 = T::from_f64(x1);
        self.y1 = T::from_f64(y1);
        self.x2 = T::from_f64(x2);
        self.y2 = T::from_f64(y2);
    }

    #[inline]
    pub fn get_x1(&self) -> f64 {
        self.x1.to_f64()
    }

    #[inline]
    pub fn get_y1(&self) -> f64 {
        self.y1.to_f64()
    }

    #[inline]
    pub fn get_x2(&self) -> f64 {
        self.x2.to_f64()
    }

    #[inline]
    pub fn get_y2(&self) -> f64 {
        self.y2.to_f64()
    }

    pub fn get_p1(&self) -> Point2DD {
        Point2DD::new(self.get_x1(), self.get_y1())
    }

    pub fn get_p2(&self) -> Point2DD {
        Point2DD::new(self.get_x2(), self.get_y2())
    }

    /// Side of this segment on which `(px, py)` lies. See
    /// [`relative_ccw`](crate::math::relative_ccw).
    pub fn relative_ccw(&self, px: f64, py: f64) -> i32 {
        relative_ccw(self.get_x1(), self.get_y1(), self.get_x2(), self.get_y2(), px, py)
    }

    pub fn intersects_line<U: Scalar>(&self, l: &Line2D<U>) -> bool {
        lines_intersect(
            self.get_x1(),
            self.get_y1(),
            self.get_x2(),
            self.get_y2(),
            l.get_x1(),
            l.get_y1(),
            l.get_x2(),
            l.get_y2(),
        )
    }

    pub fn pt_seg_dist_sq(&self, px: f64, py: f64) -> f64 {
        pt_seg_dist_sq(self.get_x1(), self.get_y1(), self.get_x2(), self.get_y2(), px, py)
    }

    pub fn pt_seg_dist(&self, px: f64, py: f64) -> f64 {
        pt_seg_dist(self.get_x1(), self.get_y1(), self.get_x2(), self.get_y2(), px, py)
    }

    pub fn pt_line_dist_sq(&self, px: f64, py: f64) -> f64 {
        pt_line_dist_sq(self.get_x1(), self.get_y1(), self.get_x2(), self.get_y2(), px, py)
    }

    pub fn pt_line_dist(&self, px: f64, py: f64) -> f64 {
        pt_line_dist(self.get_x1(), self.get_y1(), self.get_x2(), self.get_y2(), px, py)
    }

    pub fn line_iterator(&self, at: Option<&AffineTransform>) -> FixedPathIterator {
        FixedPathIterator::new(
            "line",
            WindingRule::NonZero,
            vec![
                (Segment::MoveTo, [self.get_x1(), self.get_y1(), 0.0, 0.0, 0.0, 0.0]),
                (Segment::LineTo, [self.get_x2(), self.get_y2(), 0.0, 0.0, 0.0, 0.0]),
            ],
            at,
        )
    }
}

impl<T: Scalar> Shape for Line2D<T> {
    fn bounds_2d(&self) -> Rectangle2DD {
        let (x1, x2) = (self.get_x1().min(self.get_x2()), self.get_x1().max(self.get_x2()));
        let (y1, y2) = (self.get_y1().min(self.get_y2()), self.get_y1().max(self.get_y2()));
        Rectangle2DD::new(x1, y1, x2 - x1, y2 - y1)
    }

    fn contains(&self, _x: f64, _y: f64) -> bool {
        false
    }

    fn contains_rect(&self, _x: f64, _y: f64, _w: f64, _h: f64) -> bool {
        false
    }

    fn intersects(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        Rectangle2DD::new(x, y, w, h).intersects_line(
            self.get_x1(),
            self.get_y1(),
            self.get_x2(),
            self.get_y2(),
        )
    }

    fn path_iterator<'a>(&'a self, at: Option<&AffineTransform>) -> Box<dyn PathIterator + 'a> {
        Box::new(self.line_iterator(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_normalized() {
        let l = Line2DD::new(10.0, 2.0, 4.0, 8.0);
        assert_eq!(l.bounds_2d(), Rectangle2DD::new(4.0, 2.0, 6.0, 6.0));
    }

    #[test]
    fn test_side_and_distance() {
        let l = Line2DF::new(0.0, 0.0, 10.0, 0.0);
        assert_eq!(l.relative_ccw(5.0, 5.0), -1);
        assert_eq!(l.relative_ccw(5.0, 0.0), 0);
        assert_eq!(l.pt_seg_dist(13.0, 4.0), 5.0);
        assert_eq!(l.pt_line_dist(13.0, 4.0), 4.0);
        assert_eq!(l.pt_seg_dist_sq(5.0, 3.0), 9.0);
    }

    #[test]
    fn test_intersects_line() {
        let a = Line2DD::new(0.0, 0.0, 10.0, 10.0);
        let b = Line2DF::new(0.0, 10.0, 10.0, 0.0);
        assert!(a.intersects_line(&b));
        let c = Line2DD::new(20.0, 0.0, 30.0, 0.0);
        assert!(!a.intersects_line(&c));
    }

    #[test]
    fn test_intersects_rect() {
        let l = Line2DD::new(-5.0, 5.0, 15.0, 5.0);
        assert!(l.intersects(0.0, 0.0, 10.0, 10.0));
        assert!(!l.intersects(0.0, 6.0, 10.0, 10.0));
        assert!(!l.contains(0.0, 5.0));
    }

    #[test]
    fn test_line_iterator() {
        let l = Line2DD::from_points(&Point2DD::new(1.0, 2.0), &Point2DD::new(3.0, 4.0));
        let segs: Vec<_> = l.line_iterator(None).segments().collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].0, Segment::MoveTo);
        assert_eq!(&segs[1].1[..2], &[3.0, 4.0]);
        assert_eq!(l.get_p2(), Point2DD::new(3.0, 4.0));
    }
}
