//! Path iteration protocol.
//!
//! A [`PathIterator`] is a forward-only cursor over the segments of a shape's
//! outline. Callers drive it in lockstep:
//!
//! ```text
//! while !it.is_done() {
//!     let seg = it.current_segment(&mut coords)?;
//!     ...
//!     it.next()?;
//! }
//! ```
//!
//! Iterators are single pass; obtain a fresh one from the shape to traverse
//! the outline again. The winding rule is fixed when the iterator is built.

use crate::affine_transform::AffineTransform;
use crate::basics::WindingRule;
use crate::error::{Error, Result};

/// Segment opcode reported by [`PathIterator::current_segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Start a new subpath at one point.
    MoveTo,
    /// Straight line to one point.
    LineTo,
    /// Quadratic Bézier: control point, end point.
    QuadTo,
    /// Cubic Bézier: two control points, end point.
    CubicTo,
    /// Close the current subpath back to its move-to point.
    Close,
}

impl Segment {
    /// Number of coordinate values written for this segment.
    #[inline]
    pub fn coord_count(self) -> usize {
        match self {
            Segment::MoveTo | Segment::LineTo => 2,
            Segment::QuadTo => 4,
            Segment::CubicTo => 6,
            Segment::Close => 0,
        }
    }

    /// Number of points carried by this segment.
    #[inline]
    pub fn point_count(self) -> usize {
        self.coord_count() / 2
    }
}

/// Forward-only cursor over path segments.
pub trait PathIterator {
    /// Winding rule used to decide the interior of the path.
    fn winding_rule(&self) -> WindingRule;

    /// `true` once every segment has been consumed.
    fn is_done(&self) -> bool;

    /// Advance to the next segment.
    ///
    /// Fails with [`Error::NoSuchElement`] if the iterator is already done.
    fn next(&mut self) -> Result<()>;

    /// Write the current segment's coordinates into `coords` and return its
    /// opcode. Only the first [`Segment::coord_count`] entries are written.
    ///
    /// Fails with [`Error::NoSuchElement`] once the iterator is done.
    fn current_segment(&self, coords: &mut [f64; 6]) -> Result<Segment>;

    /// Single-precision variant of [`PathIterator::current_segment`].
    fn current_segment_f32(&self, coords: &mut [f32; 6]) -> Result<Segment> {
        let mut tmp = [0.0; 6];
        let seg = self.current_segment(&mut tmp)?;
        for (dst, src) in coords.iter_mut().zip(tmp.iter()).take(seg.coord_count()) {
            *dst = *src as f32;
        }
        Ok(seg)
    }

    /// Consume the iterator as a Rust [`Iterator`] of segments.
    fn segments(self) -> Segments<Self>
    where
        Self: Sized,
    {
        Segments { inner: self }
    }
}

impl<I: PathIterator + ?Sized> PathIterator for Box<I> {
    fn winding_rule(&self) -> WindingRule {
        (**self).winding_rule()
    }

    fn is_done(&self) -> bool {
        (**self).is_done()
    }

    fn next(&mut self) -> Result<()> {
        (**self).next()
    }

    fn current_segment(&self, coords: &mut [f64; 6]) -> Result<Segment> {
        (**self).current_segment(coords)
    }
}

impl<I: PathIterator + ?Sized> PathIterator for &mut I {
    fn winding_rule(&self) -> WindingRule {
        (**self).winding_rule()
    }

    fn is_done(&self) -> bool {
        (**self).is_done()
    }

    fn next(&mut self) -> Result<()> {
        (**self).next()
    }

    fn current_segment(&self, coords: &mut [f64; 6]) -> Result<Segment> {
        (**self).current_segment(coords)
    }
}

/// Adapter returned by [`PathIterator::segments`].
pub struct Segments<I> {
    inner: I,
}

impl<I: PathIterator> Segments<I> {
    pub fn winding_rule(&self) -> WindingRule {
        self.inner.winding_rule()
    }
}

impl<I: PathIterator> Iterator for Segments<I> {
    type Item = (Segment, [f64; 6]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.inner.is_done() {
            return None;
        }
        let mut coords = [0.0; 6];
        let seg = self.inner.current_segment(&mut coords).ok()?;
        PathIterator::next(&mut self.inner).ok()?;
        Some((seg, coords))
    }
}

// ============================================================================
// Helpers shared by the shape iterators
// ============================================================================

pub(crate) fn exhausted(what: &str) -> Error {
    Error::NoSuchElement(format!("{what} iterator out of bounds"))
}

/// Run the optional transform over the points written for `seg`.
#[inline]
pub(crate) fn apply_transform(at: Option<&AffineTransform>, seg: Segment, coords: &mut [f64; 6]) {
    if let Some(at) = at {
        at.transform_coords(&mut coords[..seg.coord_count()]);
    }
}

/// Iterator over a fixed, precomputed list of segments.
///
/// Used by shapes whose outline is short enough to lay out up front.
#[derive(Debug, Clone)]
pub struct FixedPathIterator {
    segments: Vec<(Segment, [f64; 6])>,
    winding_rule: WindingRule,
    index: usize,
    name: &'static str,
}

impl FixedPathIterator {
    pub(crate) fn new(
        name: &'static str,
        winding_rule: WindingRule,
        mut segments: Vec<(Segment, [f64; 6])>,
        at: Option<&AffineTransform>,
    ) -> Self {
        for (seg, coords) in segments.iter_mut() {
            apply_transform(at, *seg, coords);
        }
        Self {
            segments,
            winding_rule,
            index: 0,
            name,
        }
    }
}

impl PathIterator for FixedPathIterator {
    fn winding_rule(&self) -> WindingRule {
        self.winding_rule
    }

    fn is_done(&self) -> bool {
        self.index >= self.segments.len()
    }

    fn next(&mut self) -> Result<()> {
        if self.is_done() {
            return Err(exhausted(self.name));
        }
        self.index += 1;
        Ok(())
    }

    fn current_segment(&self, coords: &mut [f64; 6]) -> Result<Segment> {
        let (seg, src) = self
            .segments
            .get(self.index)
            .ok_or_else(|| exhausted(self.name))?;
        let n = seg.coord_count();
        coords[..n].copy_from_slice(&src[..n]);
        Ok(*seg)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> FixedPathIterator {
        FixedPathIterator::new(
            "test",
            WindingRule::EvenOdd,
            vec![
                (Segment::MoveTo, [0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
                (Segment::LineTo, [4.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
                (Segment::LineTo, [0.0, 3.0, 0.0, 0.0, 0.0, 0.0]),
                (Segment::Close, [0.0; 6]),
            ],
            None,
        )
    }

    #[test]
    fn test_coord_counts() {
        assert_eq!(Segment::MoveTo.coord_count(), 2);
        assert_eq!(Segment::LineTo.coord_count(), 2);
        assert_eq!(Segment::QuadTo.coord_count(), 4);
        assert_eq!(Segment::CubicTo.coord_count(), 6);
        assert_eq!(Segment::Close.coord_count(), 0);
        assert_eq!(Segment::CubicTo.point_count(), 3);
    }

    #[test]
    fn test_lockstep_protocol() {
        let mut it = triangle();
        assert_eq!(it.winding_rule(), WindingRule::EvenOdd);
        let mut coords = [0.0; 6];
        let mut seen = Vec::new();
        while !it.is_done() {
            seen.push(it.current_segment(&mut coords).unwrap());
            it.next().unwrap();
        }
        assert_eq!(
            seen,
            vec![Segment::MoveTo, Segment::LineTo, Segment::LineTo, Segment::Close]
        );
        assert!(matches!(
            it.current_segment(&mut coords),
            Err(Error::NoSuchElement(_))
        ));
        assert!(matches!(it.next(), Err(Error::NoSuchElement(_))));
    }

    #[test]
    fn test_current_segment_does_not_touch_unused_slots() {
        let it = triangle();
        let mut coords = [9.0; 6];
        it.current_segment(&mut coords).unwrap();
        assert_eq!(coords, [0.0, 0.0, 9.0, 9.0, 9.0, 9.0]);
    }

    #[test]
    fn test_f32_variant() {
        let mut it = triangle();
        it.next().unwrap();
        let mut coords = [0.0_f32; 6];
        assert_eq!(it.current_segment_f32(&mut coords).unwrap(), Segment::LineTo);
        assert_eq!(coords[0], 4.0);
    }

    #[test]
    fn test_segments_adapter() {
        let segs: Vec<_> = triangle().segments().collect();
        assert_eq!(segs.len(), 4);
        assert_eq!(segs[2].0, Segment::LineTo);
        assert_eq!(segs[2].1[1], 3.0);
    }

    #[test]
    fn test_transform_applied() {
        let at = AffineTransform::translation(10.0, 20.0);
        let it = FixedPathIterator::new(
            "test",
            WindingRule::NonZero,
            vec![(Segment::MoveTo, [1.0, 2.0, 0.0, 0.0, 0.0, 0.0])],
            Some(&at),
        );
        let mut coords = [0.0; 6];
        it.current_segment(&mut coords).unwrap();
        assert_eq!(&coords[..2], &[11.0, 22.0]);
    }

    #[test]
    fn test_boxed_iterator() {
        let mut it: Box<dyn PathIterator> = Box::new(triangle());
        let mut n = 0;
        while !it.is_done() {
            n += 1;
            it.next().unwrap();
        }
        assert_eq!(n, 4);
    }
}
