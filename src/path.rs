//! General paths.
//!
//! [`Path2D`] stores an outline as a list of segment opcodes plus a flat
//! coordinate array, in the layout produced by [`PathIterator`]. It can be
//! built segment by segment or by appending any other iterator, and answers
//! containment queries by counting edge crossings of its flattened outline.

use crate::affine_transform::AffineTransform;
use crate::basics::WindingRule;
use crate::error::{Error, Result};
use crate::flatten::FlatteningPathIterator;
use crate::path_iterator::{exhausted, PathIterator, Segment};
use crate::point::Point2DD;
use crate::rectangle::Rectangle2DD;
use crate::shape::Shape;

// Flattening used by the hit tests.
const HIT_FLATNESS: f64 = 0.005;
const HIT_LIMIT: usize = 16;

/// Growable outline of move/line/quad/cubic/close segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path2D {
    types: Vec<Segment>,
    coords: Vec<f64>,
    winding_rule: WindingRule,
}

impl Path2D {
    /// Empty path with the non-zero winding rule.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_winding_rule(winding_rule: WindingRule) -> Self {
        Self {
            winding_rule,
            ..Self::default()
        }
    }

    /// Path holding the outline of `shape`, optionally transformed. The
    /// winding rule is taken from the shape's iterator.
    pub fn from_shape(shape: &dyn Shape, at: Option<&AffineTransform>) -> Result<Self> {
        let it = shape.path_iterator(at);
        let mut path = Self::with_winding_rule(it.winding_rule());
        path.append(it, false)?;
        Ok(path)
    }

    pub fn winding_rule(&self) -> WindingRule {
        self.winding_rule
    }

    pub fn set_winding_rule(&mut self, rule: WindingRule) {
        self.winding_rule = rule;
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Remove every segment; the winding rule is kept.
    pub fn reset(&mut self) {
        self.types.clear();
        self.coords.clear();
    }

    // ====================================================================
    // Building
    // ====================================================================

    /// Start a new subpath. A move-to directly after another move-to
    /// replaces it.
    pub fn move_to(&mut self, x: f64, y: f64) {
        if self.types.last() == Some(&Segment::MoveTo) {
            let n = self.coords.len();
            self.coords[n - 2] = x;
            self.coords[n - 1] = y;
        } else {
            self.types.push(Segment::MoveTo);
            self.coords.extend_from_slice(&[x, y]);
        }
    }

    fn require_move_to(&self) -> Result<()> {
        if self.types.is_empty() {
            return Err(Error::IllegalPathState(
                "missing initial moveto in path definition".to_string(),
            ));
        }
        Ok(())
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.require_move_to()?;
        self.types.push(Segment::LineTo);
        self.coords.extend_from_slice(&[x, y]);
        Ok(())
    }

    pub fn quad_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        self.require_move_to()?;
        self.types.push(Segment::QuadTo);
        self.coords.extend_from_slice(&[x1, y1, x2, y2]);
        Ok(())
    }

    pub fn curve_to(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    ) -> Result<()> {
        self.require_move_to()?;
        self.types.push(Segment::CubicTo);
        self.coords.extend_from_slice(&[x1, y1, x2, y2, x3, y3]);
        Ok(())
    }

    /// Close the current subpath. Does nothing on an empty path or right
    /// after another close.
    pub fn close_path(&mut self) {
        match self.types.last() {
            None | Some(Segment::Close) => {}
            Some(_) => self.types.push(Segment::Close),
        }
    }

    /// Append the segments of `it`.
    ///
    /// With `connect`, a leading move-to of `it` becomes a line-to from the
    /// current point (and is dropped if it lands on the current point).
    pub fn append<I: PathIterator>(&mut self, mut it: I, mut connect: bool) -> Result<()> {
        let mut c = [0.0; 6];
        while !it.is_done() {
            let seg = it.current_segment(&mut c)?;
            match seg {
                Segment::MoveTo => {
                    let joinable =
                        connect && self.types.last().is_some_and(|t| *t != Segment::Close);
                    if !joinable {
                        self.move_to(c[0], c[1]);
                    } else if self.last_coords() != Some((c[0], c[1])) {
                        self.line_to(c[0], c[1])?;
                    }
                }
                Segment::LineTo => self.line_to(c[0], c[1])?,
                Segment::QuadTo => self.quad_to(c[0], c[1], c[2], c[3])?,
                Segment::CubicTo => self.curve_to(c[0], c[1], c[2], c[3], c[4], c[5])?,
                Segment::Close => self.close_path(),
            }
            connect = false;
            it.next()?;
        }
        Ok(())
    }

    /// Append the outline of `shape`.
    pub fn append_shape(&mut self, shape: &dyn Shape, connect: bool) -> Result<()> {
        self.append(shape.path_iterator(None), connect)
    }

    fn last_coords(&self) -> Option<(f64, f64)> {
        let n = self.coords.len();
        (n >= 2).then(|| (self.coords[n - 2], self.coords[n - 1]))
    }

    /// Point the next segment starts from, or `None` for an empty path.
    /// After a close this is the start of the closed subpath.
    pub fn current_point(&self) -> Option<Point2DD> {
        if self.types.last() != Some(&Segment::Close) {
            return self.last_coords().map(|(x, y)| Point2DD::new(x, y));
        }
        // Walk back to the move-to that opened the closed subpath.
        let mut end = self.coords.len();
        for seg in self.types.iter().rev() {
            if *seg == Segment::MoveTo {
                return Some(Point2DD::new(self.coords[end - 2], self.coords[end - 1]));
            }
            end -= seg.coord_count();
        }
        None
    }

    // ====================================================================
    // Transforming
    // ====================================================================

    /// Map every stored coordinate through `at`.
    pub fn transform(&mut self, at: &AffineTransform) {
        at.transform_coords(&mut self.coords);
    }

    pub fn create_transformed_shape(&self, at: &AffineTransform) -> Path2D {
        let mut p = self.clone();
        p.transform(at);
        p
    }

    /// Iterator over the stored segments.
    pub fn path_iter(&self, at: Option<&AffineTransform>) -> Path2DIterator<'_> {
        Path2DIterator {
            path: self,
            type_index: 0,
            coord_index: 0,
            at: at.cloned(),
        }
    }

    // ====================================================================
    // Hit testing
    // ====================================================================

    /// Edges of the flattened outline, each subpath closed implicitly.
    fn flattened_edges(&self) -> Vec<[f64; 4]> {
        let flat = match FlatteningPathIterator::with_limit(
            self.path_iter(None),
            HIT_FLATNESS,
            HIT_LIMIT,
        ) {
            Ok(flat) => flat,
            Err(_) => return Vec::new(),
        };
        let mut edges = Vec::new();
        let (mut mx, mut my, mut cx, mut cy) = (0.0, 0.0, 0.0, 0.0);
        for (seg, c) in flat.segments() {
            match seg {
                Segment::MoveTo => {
                    if cx != mx || cy != my {
                        edges.push([cx, cy, mx, my]);
                    }
                    mx = c[0];
                    my = c[1];
                    cx = mx;
                    cy = my;
                }
                Segment::LineTo => {
                    edges.push([cx, cy, c[0], c[1]]);
                    cx = c[0];
                    cy = c[1];
                }
                Segment::Close => {
                    if cx != mx || cy != my {
                        edges.push([cx, cy, mx, my]);
                    }
                    cx = mx;
                    cy = my;
                }
                Segment::QuadTo | Segment::CubicTo => {}
            }
        }
        if cx != mx || cy != my {
            edges.push([cx, cy, mx, my]);
        }
        edges
    }

    fn point_crossings(edges: &[[f64; 4]], px: f64, py: f64) -> i32 {
        edges
            .iter()
            .map(|e| point_crossings_for_line(px, py, e[0], e[1], e[2], e[3]))
            .sum()
    }
}

/// Signed crossing of a ray cast from `(px, py)` towards +x with the edge
/// `(x0,y0)→(x1,y1)`. Upward edges count `+1`, downward `-1`.
fn point_crossings_for_line(px: f64, py: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> i32 {
    if (py < y0 && py < y1) || (py >= y0 && py >= y1) {
        return 0;
    }
    if px >= x0 && px >= x1 {
        return 0;
    }
    let dir = if y0 < y1 { 1 } else { -1 };
    if px < x0 && px < x1 {
        return dir;
    }
    let x_intercept = x0 + (py - y0) * (x1 - x0) / (y1 - y0);
    if px >= x_intercept {
        0
    } else {
        dir
    }
}

/// `true` when part of the segment lies strictly inside the rectangle.
///
/// Clips the segment with Liang–Barsky and tests the midpoint of what is
/// left, so edges running along the border do not count.
fn segment_enters_interior(e: &[f64; 4], rx: f64, ry: f64, rw: f64, rh: f64) -> bool {
    let (x0, y0, x1, y1) = (e[0], e[1], e[2], e[3]);
    let dx = x1 - x0;
    let dy = y1 - y0;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, x0 - rx),
        (dx, rx + rw - x0),
        (-dy, y0 - ry),
        (dy, ry + rh - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return false;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return false;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return false;
                }
                t1 = t1.min(r);
            }
        }
    }
    let tm = (t0 + t1) / 2.0;
    let mx = x0 + tm * dx;
    let my = y0 + tm * dy;
    mx > rx && mx < rx + rw && my > ry && my < ry + rh
}

impl Shape for Path2D {
    fn bounds_2d(&self) -> Rectangle2DD {
        let mut pts = self.coords.chunks_exact(2);
        let Some(first) = pts.next() else {
            return Rectangle2DD::default();
        };
        let (mut x1, mut y1, mut x2, mut y2) = (first[0], first[1], first[0], first[1]);
        for p in pts {
            x1 = x1.min(p[0]);
            y1 = y1.min(p[1]);
            x2 = x2.max(p[0]);
            y2 = y2.max(p[1]);
        }
        Rectangle2DD::new(x1, y1, x2 - x1, y2 - y1)
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        if self.types.len() < 2 {
            return false;
        }
        let edges = self.flattened_edges();
        self.winding_rule.is_inside(Self::point_crossings(&edges, x, y))
    }

    fn contains_rect(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        if w <= 0.0 || h <= 0.0 || self.types.len() < 2 {
            return false;
        }
        let edges = self.flattened_edges();
        if edges.iter().any(|e| segment_enters_interior(e, x, y, w, h)) {
            return false;
        }
        self.winding_rule
            .is_inside(Self::point_crossings(&edges, x + w / 2.0, y + h / 2.0))
    }

    fn intersects(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        if w <= 0.0 || h <= 0.0 || self.types.len() < 2 {
            return false;
        }
        let edges = self.flattened_edges();
        if edges.iter().any(|e| segment_enters_interior(e, x, y, w, h)) {
            return true;
        }
        self.winding_rule
            .is_inside(Self::point_crossings(&edges, x + w / 2.0, y + h / 2.0))
    }

    fn path_iterator<'a>(&'a self, at: Option<&AffineTransform>) -> Box<dyn PathIterator + 'a> {
        Box::new(self.path_iter(at))
    }
}

/// Iterator over the segments of a [`Path2D`].
pub struct Path2DIterator<'a> {
    path: &'a Path2D,
    type_index: usize,
    coord_index: usize,
    at: Option<AffineTransform>,
}

impl PathIterator for Path2DIterator<'_> {
    fn winding_rule(&self) -> WindingRule {
        self.path.winding_rule
    }

    fn is_done(&self) -> bool {
        self.type_index >= self.path.types.len()
    }

    fn next(&mut self) -> Result<()> {
        let seg = self
            .path
            .types
            .get(self.type_index)
            .ok_or_else(|| exhausted("path"))?;
        self.coord_index += seg.coord_count();
        self.type_index += 1;
        Ok(())
    }

    fn current_segment(&self, coords: &mut [f64; 6]) -> Result<Segment> {
        let seg = *self
            .path
            .types
            .get(self.type_index)
            .ok_or_else(|| exhausted("path"))?;
        let n = seg.coord_count();
        coords[..n].copy_from_slice(&self.path.coords[self.coord_index..self.coord_index + n]);
        if let Some(at) = &self.at {
            at.transform_coords(&mut coords[..n]);
        }
        Ok(seg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ellipse::Ellipse2DD;

    fn square(x: f64, y: f64, s: f64) -> Path2D {
        let mut p = Path2D::new();
        p.move_to(x, y);
        p.line_to(x + s, y).unwrap();
        p.line_to(x + s, y + s).unwrap();
        p.line_to(x, y + s).unwrap();
        p.close_path();
        p
    }

    #[test]
    fn test_requires_initial_move_to() {
        let mut p = Path2D::new();
        assert!(matches!(p.line_to(1.0, 1.0), Err(Error::IllegalPathState(_))));
        assert!(p.quad_to(1.0, 1.0, 2.0, 2.0).is_err());
        assert!(p.curve_to(1.0, 1.0, 2.0, 2.0, 3.0, 3.0).is_err());
        p.close_path();
        assert!(p.is_empty());
    }

    #[test]
    fn test_consecutive_move_to_replaced() {
        let mut p = Path2D::new();
        p.move_to(1.0, 1.0);
        p.move_to(2.0, 3.0);
        assert_eq!(p.len(), 1);
        assert_eq!(p.current_point(), Some(Point2DD::new(2.0, 3.0)));
    }

    #[test]
    fn test_current_point_after_close() {
        let p = square(1.0, 2.0, 4.0);
        assert_eq!(p.current_point(), Some(Point2DD::new(1.0, 2.0)));
        assert_eq!(Path2D::new().current_point(), None);
    }

    #[test]
    fn test_iterator_round_trip() {
        let p = square(0.0, 0.0, 2.0);
        let segs: Vec<_> = p.path_iter(None).segments().collect();
        assert_eq!(segs.len(), 5);
        assert_eq!(segs[4].0, Segment::Close);
        let mut it = p.path_iter(None);
        for _ in 0..5 {
            it.next().unwrap();
        }
        assert!(it.is_done());
        assert!(matches!(it.next(), Err(Error::NoSuchElement(_))));
    }

    #[test]
    fn test_bounds_and_transform() {
        let mut p = square(0.0, 0.0, 2.0);
        p.transform(&AffineTransform::translation(3.0, 4.0));
        assert_eq!(p.bounds_2d(), Rectangle2DD::new(3.0, 4.0, 2.0, 2.0));
        let q = p.create_transformed_shape(&AffineTransform::scaling(2.0, 1.0));
        assert_eq!(q.bounds_2d(), Rectangle2DD::new(6.0, 4.0, 4.0, 2.0));
        assert_eq!(Path2D::new().bounds_2d(), Rectangle2DD::default());
    }

    #[test]
    fn test_contains_square() {
        let p = square(0.0, 0.0, 10.0);
        assert!(p.contains(5.0, 5.0));
        assert!(p.contains(0.0, 0.0));
        assert!(!p.contains(10.0, 5.0));
        assert!(!p.contains(-1.0, 5.0));
    }

    #[test]
    fn test_winding_rules_on_nested_squares() {
        let mut p = square(0.0, 0.0, 10.0);
        p.append(square(3.0, 3.0, 4.0).path_iter(None), false).unwrap();
        assert!(p.contains(5.0, 5.0));
        p.set_winding_rule(WindingRule::EvenOdd);
        assert!(!p.contains(5.0, 5.0));
        assert!(p.contains(1.0, 1.0));
    }

    #[test]
    fn test_append_connect() {
        let mut p = Path2D::new();
        p.move_to(0.0, 0.0);
        p.line_to(5.0, 0.0).unwrap();
        let mut tail = Path2D::new();
        tail.move_to(5.0, 0.0);
        tail.line_to(5.0, 5.0).unwrap();
        p.append(tail.path_iter(None), true).unwrap();
        // The joining move-to lands on the current point and is dropped.
        assert_eq!(p.len(), 3);

        let mut other = Path2D::new();
        other.move_to(9.0, 9.0);
        p.append(other.path_iter(None), true).unwrap();
        assert_eq!(p.len(), 4);
        assert_eq!(p.current_point(), Some(Point2DD::new(9.0, 9.0)));
    }

    #[test]
    fn test_transformed_iterator() {
        let p = square(0.0, 0.0, 1.0);
        let at = AffineTransform::scaling(3.0, 3.0);
        let mut it = p.path_iter(Some(&at));
        it.next().unwrap();
        it.next().unwrap();
        let mut c = [0.0; 6];
        assert_eq!(it.current_segment(&mut c).unwrap(), Segment::LineTo);
        assert_eq!(&c[..2], &[3.0, 3.0]);
    }

    #[test]
    fn test_rect_queries() {
        let p = square(0.0, 0.0, 10.0);
        assert!(p.contains_rect(2.0, 2.0, 3.0, 3.0));
        assert!(p.contains_rect(0.0, 0.0, 10.0, 10.0));
        assert!(!p.contains_rect(5.0, 5.0, 10.0, 1.0));
        assert!(p.intersects(5.0, 5.0, 10.0, 1.0));
        assert!(p.intersects(-5.0, -5.0, 20.0, 20.0));
        assert!(!p.intersects(10.0, 0.0, 5.0, 5.0));
        assert!(!p.intersects(20.0, 20.0, 1.0, 1.0));
    }

    #[test]
    fn test_curved_outline_contains() {
        let p = Path2D::from_shape(&Ellipse2DD::new(0.0, 0.0, 10.0, 10.0), None).unwrap();
        assert_eq!(p.winding_rule(), WindingRule::NonZero);
        assert!(p.contains(5.0, 5.0));
        assert!(p.contains(9.5, 5.0));
        assert!(!p.contains(0.5, 0.5));
        assert!(p.intersects(8.0, 8.0, 5.0, 5.0));
        assert!(!p.intersects(0.0, 0.0, 1.0, 1.0));
    }
}
