//! Curve flattening.
//!
//! [`FlatteningPathIterator`] wraps any [`PathIterator`] and replaces its
//! quadratic and cubic segments with runs of line segments, subdividing at
//! `t = 0.5` until the control points lie within the requested flatness of
//! the chord or the recursion limit is reached.

use std::collections::VecDeque;

use crate::basics::WindingRule;
use crate::error::{Error, Result};
use crate::math::{cubic_flatness_sq, quad_flatness_sq, subdivide_cubic, subdivide_quad};
use crate::path_iterator::{exhausted, PathIterator, Segment};

/// Default maximum number of recursive subdivisions per curve.
pub const DEFAULT_FLATTEN_LIMIT: usize = 10;

/// Largest accepted recursion limit. A curve can expand into up to
/// `2^limit` line segments, all queued at once.
pub const MAX_FLATTEN_LIMIT: usize = 16;

/// Path iterator that only emits move-to, line-to and close segments.
pub struct FlatteningPathIterator<I> {
    src: I,
    flatness: f64,
    squared_flat: f64,
    limit: usize,
    pending: VecDeque<(Segment, [f64; 6])>,
    cur_x: f64,
    cur_y: f64,
    move_x: f64,
    move_y: f64,
}

impl<I: PathIterator> FlatteningPathIterator<I> {
    /// Flatten `src` with the default recursion limit.
    pub fn new(src: I, flatness: f64) -> Result<Self> {
        Self::with_limit(src, flatness, DEFAULT_FLATTEN_LIMIT)
    }

    /// Flatten `src`, subdividing each curve at most `limit` times deep.
    ///
    /// Fails with [`Error::IllegalArgument`] when `flatness` is negative or
    /// `limit` exceeds [`MAX_FLATTEN_LIMIT`].
    pub fn with_limit(src: I, flatness: f64, limit: usize) -> Result<Self> {
        if flatness < 0.0 || flatness.is_nan() {
            return Err(Error::illegal(format!("flatness must be >= 0, got {flatness}")));
        }
        if limit > MAX_FLATTEN_LIMIT {
            return Err(Error::illegal(format!(
                "recursion limit {limit} exceeds {MAX_FLATTEN_LIMIT}"
            )));
        }
        let mut it = Self {
            src,
            flatness,
            squared_flat: flatness * flatness,
            limit,
            pending: VecDeque::new(),
            cur_x: 0.0,
            cur_y: 0.0,
            move_x: 0.0,
            move_y: 0.0,
        };
        it.fill()?;
        Ok(it)
    }

    pub fn flatness(&self) -> f64 {
        self.flatness
    }

    pub fn recursion_limit(&self) -> usize {
        self.limit
    }

    /// Pull source segments until at least one output segment is queued or
    /// the source runs dry.
    fn fill(&mut self) -> Result<()> {
        while self.pending.is_empty() && !self.src.is_done() {
            let mut c = [0.0; 6];
            let seg = self.src.current_segment(&mut c)?;
            match seg {
                Segment::MoveTo => {
                    self.move_x = c[0];
                    self.move_y = c[1];
                    self.cur_x = c[0];
                    self.cur_y = c[1];
                    self.pending.push_back((seg, c));
                }
                Segment::LineTo => {
                    self.cur_x = c[0];
                    self.cur_y = c[1];
                    self.pending.push_back((seg, c));
                }
                Segment::Close => {
                    self.cur_x = self.move_x;
                    self.cur_y = self.move_y;
                    self.pending.push_back((seg, c));
                }
                Segment::QuadTo => {
                    let curve = [self.cur_x, self.cur_y, c[0], c[1], c[2], c[3]];
                    self.flatten_quad(curve);
                    self.cur_x = c[2];
                    self.cur_y = c[3];
                }
                Segment::CubicTo => {
                    let curve = [self.cur_x, self.cur_y, c[0], c[1], c[2], c[3], c[4], c[5]];
                    self.flatten_cubic(curve);
                    self.cur_x = c[4];
                    self.cur_y = c[5];
                }
            }
            self.src.next()?;
        }
        Ok(())
    }

    fn push_line(&mut self, x: f64, y: f64) {
        self.pending
            .push_back((Segment::LineTo, [x, y, 0.0, 0.0, 0.0, 0.0]));
    }

    fn flatten_quad(&mut self, curve: [f64; 6]) {
        let mut stack = vec![(curve, 0usize)];
        while let Some((c, level)) = stack.pop() {
            if level < self.limit && quad_flatness_sq(&c) >= self.squared_flat {
                let (left, right) = subdivide_quad(&c);
                stack.push((right, level + 1));
                stack.push((left, level + 1));
            } else {
                self.push_line(c[4], c[5]);
            }
        }
    }

    fn flatten_cubic(&mut self, curve: [f64; 8]) {
        let mut stack = vec![(curve, 0usize)];
        while let Some((c, level)) = stack.pop() {
            if level < self.limit && cubic_flatness_sq(&c) >= self.squared_flat {
                let (left, right) = subdivide_cubic(&c);
                stack.push((right, level + 1));
                stack.push((left, level + 1));
            } else {
                self.push_line(c[6], c[7]);
            }
        }
    }
}

impl<I: PathIterator> PathIterator for FlatteningPathIterator<I> {
    fn winding_rule(&self) -> WindingRule {
        self.src.winding_rule()
    }

    fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    fn next(&mut self) -> Result<()> {
        if self.pending.pop_front().is_none() {
            return Err(exhausted("flattening"));
        }
        self.fill()
    }

    fn current_segment(&self, coords: &mut [f64; 6]) -> Result<Segment> {
        let (seg, c) = self.pending.front().ok_or_else(|| exhausted("flattening"))?;
        let n = seg.coord_count();
        coords[..n].copy_from_slice(&c[..n]);
        Ok(*seg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ellipse::Ellipse2DD;
    use crate::path::Path2D;
    use crate::shape::Shape;

    #[test]
    fn test_negative_flatness_rejected() {
        let p = Path2D::new();
        assert!(matches!(
            FlatteningPathIterator::new(p.path_iterator(None), -1.0),
            Err(Error::IllegalArgument(_))
        ));
    }

    #[test]
    fn test_recursion_limit_bounded() {
        let mut p = Path2D::new();
        p.move_to(0.0, 0.0);
        p.curve_to(0.0, 10.0, 10.0, 10.0, 10.0, 0.0).unwrap();
        assert!(matches!(
            FlatteningPathIterator::with_limit(p.path_iterator(None), 0.0, usize::MAX),
            Err(Error::IllegalArgument(_))
        ));
        let it = FlatteningPathIterator::with_limit(p.path_iterator(None), 0.0, MAX_FLATTEN_LIMIT)
            .unwrap();
        assert_eq!(it.segments().count(), 1 + (1 << MAX_FLATTEN_LIMIT));
    }

    #[test]
    fn test_lines_pass_through() {
        let mut p = Path2D::new();
        p.move_to(0.0, 0.0);
        p.line_to(5.0, 0.0).unwrap();
        p.close_path();
        let flat = FlatteningPathIterator::new(p.path_iterator(None), 0.1).unwrap();
        let kinds: Vec<_> = flat.segments().map(|s| s.0).collect();
        assert_eq!(kinds, vec![Segment::MoveTo, Segment::LineTo, Segment::Close]);
    }

    #[test]
    fn test_quad_subdivided_within_flatness() {
        let mut p = Path2D::new();
        p.move_to(0.0, 0.0);
        p.quad_to(50.0, 100.0, 100.0, 0.0).unwrap();
        let flat = FlatteningPathIterator::new(p.path_iterator(None), 0.5).unwrap();
        let segs: Vec<_> = flat.segments().collect();
        assert!(segs.len() > 3);
        assert!(segs[1..].iter().all(|s| s.0 == Segment::LineTo));
        let last = segs[segs.len() - 1].1;
        assert_eq!(&last[..2], &[100.0, 0.0]);
        // Every emitted vertex lies on the parabola y = x(100 - x) / 50.
        for (_, c) in &segs {
            let expected = c[0] * (100.0 - c[0]) / 50.0;
            assert!((c[1] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_limit_caps_subdivision() {
        let mut p = Path2D::new();
        p.move_to(0.0, 0.0);
        p.curve_to(0.0, 100.0, 100.0, 100.0, 100.0, 0.0).unwrap();
        let flat = FlatteningPathIterator::with_limit(p.path_iterator(None), 0.0, 3).unwrap();
        assert_eq!(flat.recursion_limit(), 3);
        assert_eq!(flat.flatness(), 0.0);
        // 2^3 lines after the move-to.
        assert_eq!(flat.segments().count(), 1 + 8);
    }

    #[test]
    fn test_ellipse_flattened_is_done_and_errors() {
        let e = Ellipse2DD::new(0.0, 0.0, 20.0, 10.0);
        let mut flat = e.flattened_path_iterator(None, 0.1).unwrap();
        let mut coords = [0.0; 6];
        let mut lines = 0;
        while !flat.is_done() {
            match flat.current_segment(&mut coords).unwrap() {
                Segment::LineTo => {
                    lines += 1;
                    assert!(coords[0] >= -1e-9 && coords[0] <= 20.0 + 1e-9);
                }
                Segment::QuadTo | Segment::CubicTo => panic!("curve leaked through"),
                _ => {}
            }
            flat.next().unwrap();
        }
        assert!(lines >= 8);
        assert!(matches!(flat.next(), Err(Error::NoSuchElement(_))));
        assert!(flat.current_segment(&mut coords).is_err());
    }
}
