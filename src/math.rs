//! Geometric math utilities.
//!
//! Distances, segment side classification, segment intersection, and the
//! curve flatness measures used by path flattening.

// ============================================================================
// Distance calculations
// ============================================================================

/// Euclidean distance between two points.
#[inline]
pub fn calc_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    calc_sq_distance(x1, y1, x2, y2).sqrt()
}

/// Squared Euclidean distance between two points.
#[inline]
pub fn calc_sq_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    dx * dx + dy * dy
}

/// Squared distance from `(px, py)` to the closest point on the segment
/// `(x1,y1)→(x2,y2)`.
///
/// Projects the point onto the segment from both ends so that the result
/// is exactly zero for points lying on the segment.
pub fn pt_seg_dist_sq(x1: f64, y1: f64, x2: f64, y2: f64, px: f64, py: f64) -> f64 {
    let x2 = x2 - x1;
    let y2 = y2 - y1;
    let mut px = px - x1;
    let mut py = py - y1;
    let mut dot = px * x2 + py * y2;
    let proj_len_sq;
    if dot <= 0.0 {
        proj_len_sq = 0.0;
    } else {
        px = x2 - px;
        py = y2 - py;
        dot = px * x2 + py * y2;
        if dot <= 0.0 {
            proj_len_sq = 0.0;
        } else {
            proj_len_sq = dot * dot / (x2 * x2 + y2 * y2);
        }
    }
    let len_sq = px * px + py * py - proj_len_sq;
    len_sq.max(0.0)
}

/// Distance from `(px, py)` to the closest point on the segment.
#[inline]
pub fn pt_seg_dist(x1: f64, y1: f64, x2: f64, y2: f64, px: f64, py: f64) -> f64 {
    pt_seg_dist_sq(x1, y1, x2, y2, px, py).sqrt()
}

/// Squared distance from `(px, py)` to the infinite line through
/// `(x1,y1)` and `(x2,y2)`.
pub fn pt_line_dist_sq(x1: f64, y1: f64, x2: f64, y2: f64, px: f64, py: f64) -> f64 {
    let x2 = x2 - x1;
    let y2 = y2 - y1;
    let px = px - x1;
    let py = py - y1;
    let dot = px * x2 + py * y2;
    let len = x2 * x2 + y2 * y2;
    let proj_len_sq = if len == 0.0 { 0.0 } else { dot * dot / len };
    let len_sq = px * px + py * py - proj_len_sq;
    len_sq.max(0.0)
}

/// Distance from `(px, py)` to the infinite line.
#[inline]
pub fn pt_line_dist(x1: f64, y1: f64, x2: f64, y2: f64, px: f64, py: f64) -> f64 {
    pt_line_dist_sq(x1, y1, x2, y2, px, py).sqrt()
}

// ============================================================================
// Side classification and intersection
// ============================================================================

/// Classify `(px, py)` against the directed segment `(x1,y1)→(x2,y2)`.
///
/// Returns `1` when turning from the segment towards the point is a
/// counter-clockwise turn in a y-down coordinate space, `-1` when it is
/// clockwise, and `0` when the point lies on the segment.
/// Collinear points beyond the ends are reported as `-1` behind the start
/// and `1` past the end, so that the result is never `0` off the segment.
pub fn relative_ccw(x1: f64, y1: f64, x2: f64, y2: f64, px: f64, py: f64) -> i32 {
    let x2 = x2 - x1;
    let y2 = y2 - y1;
    let mut px = px - x1;
    let mut py = py - y1;
    let mut ccw = px * y2 - py * x2;
    if ccw == 0.0 {
        ccw = px * x2 + py * y2;
        if ccw > 0.0 {
            px -= x2;
            py -= y2;
            ccw = px * x2 + py * y2;
            if ccw < 0.0 {
                ccw = 0.0;
            }
        }
    }
    if ccw < 0.0 {
        -1
    } else if ccw > 0.0 {
        1
    } else {
        0
    }
}

/// Returns `true` if segment `(x1,y1)→(x2,y2)` intersects segment
/// `(x3,y3)→(x4,y4)`, including touching endpoints.
#[allow(clippy::too_many_arguments)]
pub fn lines_intersect(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    x3: f64,
    y3: f64,
    x4: f64,
    y4: f64,
) -> bool {
    relative_ccw(x1, y1, x2, y2, x3, y3) * relative_ccw(x1, y1, x2, y2, x4, y4) <= 0
        && relative_ccw(x3, y3, x4, y4, x1, y1) * relative_ccw(x3, y3, x4, y4, x2, y2) <= 0
}

// ============================================================================
// Curve flatness
// ============================================================================

/// Squared flatness of a quadratic curve: the squared distance of the
/// control point from the chord.
#[inline]
pub fn quad_flatness_sq(c: &[f64; 6]) -> f64 {
    pt_seg_dist_sq(c[0], c[1], c[4], c[5], c[2], c[3])
}

/// Squared flatness of a cubic curve: the larger squared distance of the
/// two control points from the chord.
#[inline]
pub fn cubic_flatness_sq(c: &[f64; 8]) -> f64 {
    pt_seg_dist_sq(c[0], c[1], c[6], c[7], c[2], c[3])
        .max(pt_seg_dist_sq(c[0], c[1], c[6], c[7], c[4], c[5]))
}

/// Split a quadratic curve `[x1,y1, cx,cy, x2,y2]` at `t = 0.5`.
pub fn subdivide_quad(c: &[f64; 6]) -> ([f64; 6], [f64; 6]) {
    let ctrlx1 = (c[0] + c[2]) / 2.0;
    let ctrly1 = (c[1] + c[3]) / 2.0;
    let ctrlx2 = (c[2] + c[4]) / 2.0;
    let ctrly2 = (c[3] + c[5]) / 2.0;
    let midx = (ctrlx1 + ctrlx2) / 2.0;
    let midy = (ctrly1 + ctrly2) / 2.0;
    (
        [c[0], c[1], ctrlx1, ctrly1, midx, midy],
        [midx, midy, ctrlx2, ctrly2, c[4], c[5]],
    )
}

/// Split a cubic curve `[x1,y1, c1x,c1y, c2x,c2y, x2,y2]` at `t = 0.5`.
pub fn subdivide_cubic(c: &[f64; 8]) -> ([f64; 8], [f64; 8]) {
    let ctrlx1 = (c[0] + c[2]) / 2.0;
    let ctrly1 = (c[1] + c[3]) / 2.0;
    let cx = (c[2] + c[4]) / 2.0;
    let cy = (c[3] + c[5]) / 2.0;
    let ctrlx2 = (c[4] + c[6]) / 2.0;
    let ctrly2 = (c[5] + c[7]) / 2.0;
    let ctrlx12 = (ctrlx1 + cx) / 2.0;
    let ctrly12 = (ctrly1 + cy) / 2.0;
    let ctrlx21 = (cx + ctrlx2) / 2.0;
    let ctrly21 = (cy + ctrly2) / 2.0;
    let midx = (ctrlx12 + ctrlx21) / 2.0;
    let midy = (ctrly12 + ctrly21) / 2.0;
    (
        [c[0], c[1], ctrlx1, ctrly1, ctrlx12, ctrly12, midx, midy],
        [midx, midy, ctrlx21, ctrly21, ctrlx2, ctrly2, c[6], c[7]],
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    #[test]
    fn test_calc_distance() {
        assert!((calc_distance(0.0, 0.0, 3.0, 4.0) - 5.0).abs() < EPS);
        assert!((calc_sq_distance(0.0, 0.0, 3.0, 4.0) - 25.0).abs() < EPS);
    }

    #[test]
    fn test_pt_seg_dist() {
        // Perpendicular foot inside the segment
        assert!((pt_seg_dist(0.0, 0.0, 10.0, 0.0, 5.0, 3.0) - 3.0).abs() < EPS);
        // Beyond the end: distance to the endpoint
        assert!((pt_seg_dist(0.0, 0.0, 10.0, 0.0, 13.0, 4.0) - 5.0).abs() < EPS);
        // Behind the start
        assert!((pt_seg_dist(0.0, 0.0, 10.0, 0.0, -3.0, -4.0) - 5.0).abs() < EPS);
        // On the segment
        assert_eq!(pt_seg_dist_sq(0.0, 0.0, 10.0, 0.0, 4.0, 0.0), 0.0);
    }

    #[test]
    fn test_pt_line_dist() {
        // Beyond the end still measures to the infinite line
        assert!((pt_line_dist(0.0, 0.0, 10.0, 0.0, 13.0, 4.0) - 4.0).abs() < EPS);
        // Degenerate line falls back to point distance
        assert!((pt_line_dist(1.0, 1.0, 1.0, 1.0, 4.0, 5.0) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_relative_ccw() {
        assert_eq!(relative_ccw(0.0, 0.0, 10.0, 0.0, 5.0, 5.0), -1);
        assert_eq!(relative_ccw(0.0, 0.0, 10.0, 0.0, 5.0, -5.0), 1);
        assert_eq!(relative_ccw(0.0, 0.0, 10.0, 0.0, 5.0, 0.0), 0);
        assert_eq!(relative_ccw(0.0, 0.0, 10.0, 0.0, -5.0, 0.0), -1);
        assert_eq!(relative_ccw(0.0, 0.0, 10.0, 0.0, 15.0, 0.0), 1);
    }

    #[test]
    fn test_lines_intersect() {
        assert!(lines_intersect(0.0, 0.0, 10.0, 10.0, 0.0, 10.0, 10.0, 0.0));
        assert!(!lines_intersect(0.0, 0.0, 10.0, 0.0, 0.0, 1.0, 10.0, 1.0));
        // Touching at an endpoint counts
        assert!(lines_intersect(0.0, 0.0, 10.0, 0.0, 10.0, 0.0, 10.0, 5.0));
        // Collinear but disjoint
        assert!(!lines_intersect(0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0));
    }

    #[test]
    fn test_flatness() {
        let flat = [0.0, 0.0, 5.0, 0.0, 10.0, 0.0];
        assert_eq!(quad_flatness_sq(&flat), 0.0);
        let bent = [0.0, 0.0, 5.0, 4.0, 10.0, 0.0];
        assert!((quad_flatness_sq(&bent) - 16.0).abs() < EPS);

        let cubic = [0.0, 0.0, 3.0, 2.0, 7.0, -3.0, 10.0, 0.0];
        assert!((cubic_flatness_sq(&cubic) - 9.0).abs() < EPS);
    }

    #[test]
    fn test_subdivide_quad_midpoint() {
        let (left, right) = subdivide_quad(&[0.0, 0.0, 5.0, 10.0, 10.0, 0.0]);
        // Point at t = 0.5 of the quadratic is (5, 5)
        assert!((left[4] - 5.0).abs() < EPS && (left[5] - 5.0).abs() < EPS);
        assert_eq!(left[4], right[0]);
        assert_eq!(right[4], 10.0);
    }

    #[test]
    fn test_subdivide_cubic_midpoint() {
        let (left, right) = subdivide_cubic(&[0.0, 0.0, 0.0, 8.0, 8.0, 8.0, 8.0, 0.0]);
        // B(0.5) = (0 + 3*0 + 3*8 + 8) / 8, (0 + 3*8 + 3*8 + 0) / 8
        assert!((left[6] - 4.0).abs() < EPS);
        assert!((left[7] - 6.0).abs() < EPS);
        assert_eq!(left[6], right[0]);
        assert_eq!(right[7], 0.0);
    }
}
