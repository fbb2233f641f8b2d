use criterion::{black_box, criterion_group, criterion_main, Criterion};

use raster_geom::{
    AffineTransform, DirectColorModel, Path2D, PathIterator, RasterImage, Shape,
};

fn bench_transform_coords(c: &mut Criterion) {
    let mut at = AffineTransform::rotation(0.4);
    at.scale(1.5, 0.75);
    at.translate(10.0, -3.0);
    let src: Vec<f64> = (0..2048).map(|i| i as f64 * 0.25).collect();
    let mut dst = vec![0.0; src.len()];
    c.bench_function("transform_slice_1024_points", |b| {
        b.iter(|| at.transform_slice(black_box(&src), &mut dst))
    });
}

fn bench_classify(c: &mut Criterion) {
    c.bench_function("rotate_and_classify", |b| {
        b.iter(|| {
            let mut at = AffineTransform::new();
            at.rotate(black_box(std::f64::consts::FRAC_PI_2));
            at.shear(black_box(0.1), 0.0);
            at.get_type()
        })
    });
}

fn bench_flatten(c: &mut Criterion) {
    let mut path = Path2D::new();
    path.move_to(0.0, 0.0);
    for i in 0..32 {
        let x = i as f64 * 10.0;
        let _ = path.curve_to(x + 2.0, 20.0, x + 8.0, -20.0, x + 10.0, 0.0);
    }
    c.bench_function("flatten_32_cubics", |b| {
        b.iter(|| {
            let mut n = 0usize;
            if let Ok(mut it) = path.flattened_path_iterator(None, black_box(0.1)) {
                while !it.is_done() {
                    n += 1;
                    let _ = it.next();
                }
            }
            n
        })
    });
}

fn bench_set_rgb(c: &mut Criterion) {
    let cm = DirectColorModel::new(32, 0xff0000, 0xff00, 0xff, 0xff00_0000)
        .expect("argb masks");
    let img = RasterImage::with_size(cm, 64, 64).expect("64x64 image");
    c.bench_function("set_rgb_64x64", |b| {
        b.iter(|| {
            for y in 0..64 {
                for x in 0..64 {
                    let _ = img.set_rgb(x, y, black_box(0x80ff_8040));
                }
            }
        })
    });
}

criterion_group!(
    benches,
    bench_transform_coords,
    bench_classify,
    bench_flatten,
    bench_set_rgb
);
criterion_main!(benches);
