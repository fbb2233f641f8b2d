//! Common interface for geometric shapes.

use crate::affine_transform::AffineTransform;
use crate::flatten::FlatteningPathIterator;
use crate::path_iterator::PathIterator;
use crate::rectangle::{Rectangle, Rectangle2DD};

/// A closed or open outline that can be queried for containment and
/// walked as a sequence of path segments.
pub trait Shape {
    /// Tight real-valued bounding box.
    fn bounds_2d(&self) -> Rectangle2DD;

    /// Integer bounding box that fully encloses [`Shape::bounds_2d`].
    fn bounds(&self) -> Rectangle {
        self.bounds_2d().to_bounds()
    }

    fn contains(&self, x: f64, y: f64) -> bool;

    /// `true` if the whole rectangle lies inside the shape.
    fn contains_rect(&self, x: f64, y: f64, w: f64, h: f64) -> bool;

    /// `true` if the interior of the shape and the rectangle overlap.
    fn intersects(&self, x: f64, y: f64, w: f64, h: f64) -> bool;

    fn intersects_rect(&self, r: &Rectangle2DD) -> bool {
        self.intersects(r.get_x(), r.get_y(), r.get_width(), r.get_height())
    }

    /// Outline of the shape, optionally mapped through `at`.
    fn path_iterator<'a>(&'a self, at: Option<&AffineTransform>) -> Box<dyn PathIterator + 'a>;

    /// Outline with curves replaced by line segments no further than
    /// `flatness` from the true curve.
    fn flattened_path_iterator<'a>(
        &'a self,
        at: Option<&AffineTransform>,
        flatness: f64,
    ) -> crate::error::Result<FlatteningPathIterator<Box<dyn PathIterator + 'a>>> {
        FlatteningPathIterator::new(self.path_iterator(at), flatness)
    }
}
