use criterion::{criterion_group, criterion_main, Criterion};

use densa::{ColMajor, Mat, RowMajor};

pub fn assign(c: &mut Criterion) {
    for n in [64, 128, 256, 512, 1024] {
        c.bench_function(&format!("densa-vectorized-assign-{n}"), |b| {
            let src = Mat::<f64, RowMajor>::from_fn(n, n, |i, j| (i + j) as f64);
            let mut dst = Mat::<f64, RowMajor>::zeros(n, n);

            b.iter(|| {
                dst.as_submatrix_mut().try_assign(&src).unwrap();
            })
        });

        c.bench_function(&format!("densa-unaligned-assign-{n}"), |b| {
            let src = Mat::<f64, RowMajor>::from_fn(n, n, |i, j| (i + j) as f64);
            let mut dst = Mat::<f64, RowMajor>::zeros(n + 1, n + 1);

            b.iter(|| {
                dst.submatrix_mut(1, 1, n, n).try_assign(&src).unwrap();
            })
        });

        c.bench_function(&format!("densa-scalar-assign-{n}"), |b| {
            let src = Mat::<u64, RowMajor>::from_fn(n, n, |i, j| (i + j) as u64);
            let mut dst = Mat::<u64, RowMajor>::zeros(n, n);

            b.iter(|| {
                dst.as_submatrix_mut().try_assign(&src).unwrap();
            })
        });

        c.bench_function(&format!("densa-blocked-assign-{n}"), |b| {
            let src = Mat::<f64, ColMajor>::from_fn(n, n, |i, j| (i + j) as f64);
            let mut dst = Mat::<f64, RowMajor>::zeros(n, n);

            b.iter(|| {
                dst.as_submatrix_mut().try_assign(&src).unwrap();
            })
        });

        c.bench_function(&format!("densa-vectorized-add-assign-{n}"), |b| {
            let src = Mat::<f64, RowMajor>::from_fn(n, n, |i, j| (i + j) as f64);
            let mut dst = Mat::<f64, RowMajor>::zeros(n, n);

            b.iter(|| {
                dst.as_submatrix_mut().try_add_assign(&src).unwrap();
            })
        });
    }
}

criterion_group!(benches, assign);
criterion_main!(benches);
