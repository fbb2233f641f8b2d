//! Cross-module properties of the geometry and raster layers.

use std::f64::consts::PI;

use raster_geom::{
    AffineTransform, ColorModel, DataType, DirectColorModel, Error, Path2D, PathIterator,
    Point2DD, RasterImage, Rectangle, Rectangle2DD, Segment, Shape, TransformType, WindingRule,
};

const EPS: f64 = 1e-9;

fn near(a: Point2DD, b: Point2DD) -> bool {
    (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
}

fn sample_transforms() -> Vec<AffineTransform> {
    vec![
        AffineTransform::new(),
        AffineTransform::translation(3.0, -7.5),
        AffineTransform::scaling(2.0, 0.5),
        AffineTransform::rotation(0.3),
        AffineTransform::shearing(0.25, -1.0),
        AffineTransform::from_matrix(1.5, 0.2, -0.7, 2.0, 10.0, 4.0),
        AffineTransform::quadrant_rotation_around(3, 1.0, 2.0),
    ]
}

// ============================================================================
// Affine transforms
// ============================================================================

#[test]
fn concatenate_applies_argument_first() {
    let p = Point2DD::new(1.25, -4.0);
    for a in sample_transforms() {
        for b in sample_transforms() {
            let mut ab = a.clone();
            ab.concatenate(&b);
            assert!(near(ab.transform(&p), a.transform(&b.transform(&p))));

            let mut ba = a.clone();
            ba.pre_concatenate(&b);
            assert!(near(ba.transform(&p), b.transform(&a.transform(&p))));
        }
    }
}

#[test]
fn composition_is_not_commutative() {
    let mut ts = AffineTransform::translation(5.0, 0.0);
    ts.concatenate(&AffineTransform::scaling(2.0, 2.0));
    let mut st = AffineTransform::scaling(2.0, 2.0);
    st.concatenate(&AffineTransform::translation(5.0, 0.0));
    let p = Point2DD::new(1.0, 1.0);
    assert!(near(ts.transform(&p), Point2DD::new(7.0, 2.0)));
    assert!(near(st.transform(&p), Point2DD::new(12.0, 2.0)));
}

#[test_log::test]
fn quadrant_rotations_classify_exactly() {
    for k in 1..=3 {
        let at = AffineTransform::rotation(k as f64 * PI / 2.0);
        let ty = at.get_type();
        assert!(ty.contains(TransformType::QUADRANT_ROTATION), "{k}: {ty:?}");
        assert!(!ty.contains(TransformType::GENERAL_ROTATION));
    }
    let full = AffineTransform::rotation(2.0 * PI);
    assert_eq!(full.get_type(), TransformType::IDENTITY);
    assert!(full.is_identity());
    assert_eq!(full.to_flat_matrix(), [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    let mut acc = AffineTransform::new();
    for _ in 0..4 {
        acc.rotate(PI / 2.0);
    }
    assert!(acc.is_identity());
}

#[test]
fn inverse_round_trips_points() {
    let p = Point2DD::new(-3.5, 8.0);
    for a in sample_transforms() {
        let inv = a.create_inverse().unwrap();
        assert!(near(inv.transform(&a.transform(&p)), p));
        assert!(near(a.inverse_transform(&a.transform(&p)).unwrap(), p));
    }
}

#[test]
fn singular_transform_has_no_inverse() {
    let flat = AffineTransform::from_matrix(1.0, 2.0, 2.0, 4.0, 0.0, 0.0);
    assert_eq!(flat.determinant(), 0.0);
    assert!(matches!(
        flat.create_inverse(),
        Err(Error::NoninvertibleTransform(_))
    ));
    let mut zero = AffineTransform::scaling(0.0, 1.0);
    assert!(zero.invert().is_err());
    assert!(zero.inverse_transform_xy(1.0, 1.0).is_err());
}

// ============================================================================
// Rectangles and shapes
// ============================================================================

#[test]
fn overlapping_rectangles_intersect() {
    let a = Rectangle2DD::new(0.0, 0.0, 10.0, 10.0);
    let b = Rectangle2DD::new(5.0, 5.0, 10.0, 10.0);
    assert_eq!(a.create_intersection(&b), Rectangle2DD::new(5.0, 5.0, 5.0, 5.0));

    let i = Rectangle::new(0, 0, 10, 10).intersection(&Rectangle::new(5, 5, 10, 10));
    assert_eq!(i, Rectangle::new(5, 5, 5, 5));
}

#[test]
fn disjoint_intersection_is_empty_and_union_covers_both() {
    let a = Rectangle2DD::new(0.0, 0.0, 2.0, 2.0);
    let b = Rectangle2DD::new(5.0, -3.0, 1.0, 1.0);
    assert!(a.create_intersection(&b).is_empty());

    let u = a.create_union(&b);
    assert!(u.contains_rect(0.0, 0.0, 2.0, 2.0));
    assert!(u.contains_rect(5.0, -3.0, 1.0, 1.0));
    assert_eq!(u, Rectangle2DD::new(0.0, -3.0, 6.0, 5.0));
}

#[test]
fn rectangle_iterator_yields_five_segments() {
    let r = Rectangle2DD::new(1.0, 2.0, 3.0, 4.0);
    let mut it = r.path_iterator(None);
    assert_eq!(it.winding_rule(), WindingRule::NonZero);
    let mut coords = [0.0; 6];
    let mut ops = Vec::new();
    while !it.is_done() {
        ops.push(it.current_segment(&mut coords).unwrap());
        it.next().unwrap();
    }
    assert_eq!(
        ops,
        vec![
            Segment::MoveTo,
            Segment::LineTo,
            Segment::LineTo,
            Segment::LineTo,
            Segment::Close
        ]
    );
    assert!(matches!(
        it.current_segment(&mut coords),
        Err(Error::NoSuchElement(_))
    ));
    assert!(matches!(it.next(), Err(Error::NoSuchElement(_))));
}

#[test]
fn transformed_shape_bounds_follow_the_transform() {
    let r = Rectangle2DD::new(0.0, 0.0, 4.0, 2.0);
    let at = AffineTransform::quadrant_rotation(1);
    let path = at.create_transformed_shape(&r).unwrap();
    let b = path.bounds_2d();
    assert!((b.get_min_x() + 2.0).abs() < EPS);
    assert!((b.get_max_y() - 4.0).abs() < EPS);
    assert_eq!(path.bounds(), Rectangle::new(-2, 0, 2, 4));
}

#[test]
fn flattened_path_keeps_curve_end_points() {
    let mut p = Path2D::new();
    p.move_to(0.0, 0.0);
    p.curve_to(0.0, 10.0, 10.0, 10.0, 10.0, 0.0).unwrap();
    let flat = p.flattened_path_iterator(None, 0.01).unwrap();
    let segs: Vec<_> = flat.segments().collect();
    assert!(segs.len() > 2);
    assert!(segs.iter().skip(1).all(|(s, _)| *s == Segment::LineTo));
    let (_, last) = segs[segs.len() - 1];
    assert_eq!((last[0], last[1]), (10.0, 0.0));
}

// ============================================================================
// Rasters and color models
// ============================================================================

#[test]
fn direct_model_decodes_argb_masks() {
    let cm = DirectColorModel::new(32, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000)
        .unwrap();
    let px = 0x80ff_0000;
    assert_eq!(cm.alpha(px).unwrap(), 128);
    assert_eq!(cm.red(px).unwrap(), 255);
    assert_eq!(cm.green(px).unwrap(), 0);
    assert_eq!(cm.blue(px).unwrap(), 0);
}

#[test]
fn direct_model_round_trips_colors() {
    let cm = DirectColorModel::new(32, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000)
        .unwrap();
    for argb in [0u32, 0xffff_ffff, 0x8012_3456, 0x01fe_dcba, 0xff00_ff00] {
        let data = cm.data_elements(argb).unwrap();
        assert_eq!(data.data_type(), DataType::Int);
        assert_eq!(cm.rgb_of(&data).unwrap(), argb);
    }
}

#[test_log::test]
fn child_rasters_alias_the_image_storage() {
    let cm = DirectColorModel::new(24, 0xff0000, 0xff00, 0xff, 0).unwrap();
    let img = RasterImage::with_size(cm, 4, 4).unwrap();
    let child = img
        .raster()
        .create_writable_child(1, 1, 2, 2, 10, 10, None)
        .unwrap();
    child.set_pixel(11, 11, &[255, 128, 0]).unwrap();
    assert_eq!(img.rgb(2, 2).unwrap(), 0xffff_8000);
    assert!(child.shares_buffer_with(img.raster()));
    assert!(child.pixel(12, 10).is_err());
}
