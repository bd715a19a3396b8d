//! Assignment kernels and the dispatcher that selects between them.
//!
//! Every bulk write into a dense destination goes through this module. The destination is a
//! rectangular region of an owned matrix, described by its lanes (see [`crate::order`]), and the
//! source is either a [`DenseMatrix`] or a [`SparseMatrix`]. The kernel is chosen once per call
//! from compile-time properties of the operands:
//!
//! - [`Kernel::Vectorized`]: same storage order, identical SIMD-capable element types, and the
//!   operation has a register implementation for the element type.
//! - [`Kernel::Scalar`]: same storage order, element by element, unrolled by two.
//! - [`Kernel::Blocked`]: opposite storage orders, processed in [`BLOCK_SIZE`] × [`BLOCK_SIZE`]
//!   tiles to limit cache misses on the strided side.
//! - [`Kernel::Sparse`]: sparse source, only the stored entries are visited.
//!
//! Vectors follow the same selection with [`select_vector`], minus the blocked kernel.
//!
//! The operation itself is a marker type implementing [`AssignOp`], so each kernel is
//! monomorphized per operation.

use crate::{
    debug_assert,
    mat::{DenseMatrix, ViewImpl},
    order::StorageOrder,
    simd::{stream_fence, Scalar},
    sparse::SparseMatrix,
    vector::{DenseVector, Vector},
};
use core::fmt::Debug;

/// Cache budget in bytes. Assignments writing more than a third of it use non-temporal stores.
pub const CACHE_SIZE: usize = 3 * 1024 * 1024;

/// Tile size of the opposite-order kernel.
pub const BLOCK_SIZE: usize = 16;

/// Kernel chosen by the dispatcher.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kernel {
    /// Register-width loads and stores, blocks of four registers per iteration.
    Vectorized,
    /// Element by element, unrolled by two.
    Scalar,
    /// Tiled traversal for operands of opposite storage orders.
    Blocked,
    /// Visits the stored entries of a sparse source.
    Sparse,
}

/// Plain assignment, `dst = src`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Assign;
/// Addition assignment, `dst += src`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AddAssign;
/// Subtraction assignment, `dst -= src`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SubAssign;
/// Elementwise multiplication assignment, `dst *= src`. Only used by vectors and scaling.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MulAssign;
/// Elementwise division assignment, `dst /= src`. Only used by scaling.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DivAssign;

/// Binary operation combining the current destination value with the source value.
///
/// This trait is sealed.
pub trait AssignOp: crate::seal::Seal + Copy + Debug + Default + Send + Sync + 'static {
    /// Whether the result depends on the previous destination value.
    const READS_DST: bool;
    /// Whether `apply(x, 0) == x`, so that sparse sources only need to visit stored entries.
    const ZERO_IS_NEUTRAL: bool;

    /// Combines two elements.
    fn apply<T: Scalar>(dst: T, src: T) -> T;
    /// Combines two registers.
    fn apply_reg<T: Scalar>(dst: T::Reg, src: T::Reg) -> T::Reg;
    /// Whether [`AssignOp::apply_reg`] has a vectorized implementation for `T`.
    fn simd_supported<T: Scalar>() -> bool;
}

impl AssignOp for Assign {
    const READS_DST: bool = false;
    const ZERO_IS_NEUTRAL: bool = false;

    #[inline(always)]
    fn apply<T: Scalar>(_: T, src: T) -> T {
        src
    }
    #[inline(always)]
    fn apply_reg<T: Scalar>(_: T::Reg, src: T::Reg) -> T::Reg {
        src
    }
    #[inline(always)]
    fn simd_supported<T: Scalar>() -> bool {
        T::SIMD
    }
}

impl AssignOp for AddAssign {
    const READS_DST: bool = true;
    const ZERO_IS_NEUTRAL: bool = true;

    #[inline(always)]
    fn apply<T: Scalar>(dst: T, src: T) -> T {
        dst + src
    }
    #[inline(always)]
    fn apply_reg<T: Scalar>(dst: T::Reg, src: T::Reg) -> T::Reg {
        T::add_reg(dst, src)
    }
    #[inline(always)]
    fn simd_supported<T: Scalar>() -> bool {
        T::SIMD && T::SIMD_ADD
    }
}

impl AssignOp for SubAssign {
    const READS_DST: bool = true;
    const ZERO_IS_NEUTRAL: bool = true;

    #[inline(always)]
    fn apply<T: Scalar>(dst: T, src: T) -> T {
        dst - src
    }
    #[inline(always)]
    fn apply_reg<T: Scalar>(dst: T::Reg, src: T::Reg) -> T::Reg {
        T::sub_reg(dst, src)
    }
    #[inline(always)]
    fn simd_supported<T: Scalar>() -> bool {
        T::SIMD && T::SIMD_ADD
    }
}

impl AssignOp for MulAssign {
    const READS_DST: bool = true;
    const ZERO_IS_NEUTRAL: bool = false;

    #[inline(always)]
    fn apply<T: Scalar>(dst: T, src: T) -> T {
        dst * src
    }
    #[inline(always)]
    fn apply_reg<T: Scalar>(dst: T::Reg, src: T::Reg) -> T::Reg {
        T::mul_reg(dst, src)
    }
    #[inline(always)]
    fn simd_supported<T: Scalar>() -> bool {
        T::SIMD && T::SIMD_MUL
    }
}

impl AssignOp for DivAssign {
    const READS_DST: bool = true;
    const ZERO_IS_NEUTRAL: bool = false;

    #[inline(always)]
    fn apply<T: Scalar>(dst: T, src: T) -> T {
        dst / src
    }
    #[inline(always)]
    fn apply_reg<T: Scalar>(dst: T::Reg, src: T::Reg) -> T::Reg {
        T::div_reg(dst, src)
    }
    #[inline(always)]
    fn simd_supported<T: Scalar>() -> bool {
        T::SIMD && T::SIMD_DIV
    }
}

/// Selects the kernel assigning a dense source `M` to a destination of element type `T` and
/// storage order `O` with the operation `P`.
#[inline]
pub fn select_dense<T, O, M, P>() -> Kernel
where
    T: Scalar,
    O: StorageOrder,
    M: DenseMatrix + ?Sized,
    P: AssignOp,
{
    if O::ROW_MAJOR != <M::Order as StorageOrder>::ROW_MAJOR {
        Kernel::Blocked
    } else if T::SIMD && M::SIMD && coe::is_same::<T, M::Elem>() && P::simd_supported::<T>() {
        Kernel::Vectorized
    } else {
        Kernel::Scalar
    }
}

/// Selects the kernel assigning a sparse source. Always [`Kernel::Sparse`].
#[inline]
pub fn select_sparse<S: SparseMatrix + ?Sized>() -> Kernel {
    Kernel::Sparse
}

/// Selects the kernel assigning a dense vector source `V` to a vector of element type `T` with
/// the operation `P`. Either [`Kernel::Vectorized`] or [`Kernel::Scalar`].
#[inline]
pub fn select_vector<T, V, P>() -> Kernel
where
    T: Scalar,
    V: DenseVector + ?Sized,
    P: AssignOp,
{
    if T::SIMD && V::SIMD && coe::is_same::<T, V::Elem>() && P::simd_supported::<T>() {
        Kernel::Vectorized
    } else {
        Kernel::Scalar
    }
}

/// Runs `dst op= src` for a dense source of the same shape as `dst`.
///
/// The caller is responsible for the shape check and for resolving aliasing.
pub(crate) fn assign_dense<T, O, M, P>(dst: &ViewImpl<T, O>, src: &M)
where
    T: Scalar + From<M::Elem>,
    O: StorageOrder,
    M: DenseMatrix + ?Sized,
    P: AssignOp,
{
    debug_assert!(all(dst.nrows == src.nrows(), dst.ncols == src.ncols()));
    let kernel = select_dense::<T, O, M, P>();
    log::trace!(
        "{:?} kernel for {}x{} {:?}",
        kernel,
        dst.nrows,
        dst.ncols,
        P::default()
    );

    // SAFETY: the shapes match, so every source index visited by the kernels is in range.
    unsafe {
        match kernel {
            Kernel::Vectorized => vectorized::<T, O, M, P>(dst, src),
            Kernel::Scalar => scalar::<T, O, M, P>(dst, src),
            Kernel::Blocked => {
                log::warn!(
                    target: "densa_perf",
                    "assigning a {}x{} operand with the opposite storage order, using the blocked kernel",
                    dst.nrows,
                    dst.ncols,
                );
                blocked::<T, O, M, P>(dst, src)
            }
            Kernel::Sparse => unreachable!(),
        }
    }
}

/// Runs `dst op= src` for a sparse source of the same shape as `dst`.
///
/// Plain assignment resets the destination first, then writes the stored entries.
pub(crate) fn assign_sparse<T, O, S, P>(dst: &ViewImpl<T, O>, src: &S)
where
    T: Scalar + From<S::Elem>,
    O: StorageOrder,
    S: SparseMatrix + ?Sized,
    P: AssignOp,
{
    debug_assert!(all(dst.nrows == src.nrows(), dst.ncols == src.ncols()));
    log::trace!(
        "{:?} kernel for {}x{} {:?}",
        select_sparse::<S>(),
        dst.nrows,
        dst.ncols,
        P::default()
    );

    if !P::READS_DST {
        // SAFETY: the destination is writable for the duration of the call.
        unsafe { dst.reset() };
    }

    let outer = <S::Order as StorageOrder>::outer_dim(src.nrows(), src.ncols());
    for k in 0..outer {
        let (indices, values) = src.lane(k);
        for (&idx, &value) in indices.iter().zip(values) {
            let (i, j) = <S::Order as StorageOrder>::join(k, idx);
            // SAFETY: stored indices of a sparse matrix are in range, and the shapes match.
            unsafe {
                let ptr = dst.ptr_at(i, j);
                ptr.write(P::apply(ptr.read(), T::from(value)));
            }
        }
    }
}

/// Same storage order and element type, register by register.
///
/// Whole registers cover the first `final_` elements of each lane, and the last `rest` elements
/// go through a partial store, so the padding past the region is never written.
unsafe fn vectorized<T, O, M, P>(dst: &ViewImpl<T, O>, src: &M)
where
    T: Scalar,
    O: StorageOrder,
    M: DenseMatrix + ?Sized,
    P: AssignOp,
{
    let w = T::WIDTH;
    let outer = dst.outer_len();
    let inner = dst.inner_len();
    let aligned = dst.aligned;
    let rest = dst.rest;
    let final_ = dst.final_;

    let load_src = |k: usize, j: usize| -> T::Reg {
        let (i, j) = O::join(k, j);
        coe::coerce_static::<<M::Elem as Scalar>::Reg, T::Reg>(src.load(i, j))
    };
    let load_dst = |ptr: *const T| -> T::Reg {
        if aligned {
            T::load(ptr)
        } else {
            T::loadu(ptr)
        }
    };
    let store_dst = |ptr: *mut T, value: T::Reg| {
        if aligned {
            T::store(ptr, value)
        } else {
            T::storeu(ptr, value)
        }
    };
    let store_tail = |lane: *mut T, k: usize| {
        if rest > 0 {
            let p = lane.add(final_);
            let s = load_src(k, final_);
            let value = if P::READS_DST {
                P::apply_reg::<T>(T::loadu_partial(p, rest), s)
            } else {
                s
            };
            T::storeu_partial(p, value, rest);
        }
    };

    let stream = !P::READS_DST
        && aligned
        && outer * inner > CACHE_SIZE / (3 * core::mem::size_of::<T>())
        && !src.is_aliased(dst.base);

    if stream {
        for k in 0..outer {
            let lane = dst.lane_ptr(k);
            let mut j = 0;
            while j < final_ {
                T::stream(lane.add(j), load_src(k, j));
                j += w;
            }
            store_tail(lane, k);
        }
        stream_fence();
        return;
    }

    for k in 0..outer {
        let lane = dst.lane_ptr(k);
        let mut j = 0;
        while j + 4 * w <= final_ {
            let p0 = lane.add(j);
            let p1 = lane.add(j + w);
            let p2 = lane.add(j + 2 * w);
            let p3 = lane.add(j + 3 * w);
            let (s0, s1, s2, s3) = (
                load_src(k, j),
                load_src(k, j + w),
                load_src(k, j + 2 * w),
                load_src(k, j + 3 * w),
            );
            if P::READS_DST {
                store_dst(p0, P::apply_reg::<T>(load_dst(p0), s0));
                store_dst(p1, P::apply_reg::<T>(load_dst(p1), s1));
                store_dst(p2, P::apply_reg::<T>(load_dst(p2), s2));
                store_dst(p3, P::apply_reg::<T>(load_dst(p3), s3));
            } else {
                store_dst(p0, s0);
                store_dst(p1, s1);
                store_dst(p2, s2);
                store_dst(p3, s3);
            }
            j += 4 * w;
        }
        while j < final_ {
            let p = lane.add(j);
            let s = load_src(k, j);
            if P::READS_DST {
                store_dst(p, P::apply_reg::<T>(load_dst(p), s));
            } else {
                store_dst(p, s);
            }
            j += w;
        }
        store_tail(lane, k);
    }
}

/// Same storage order, element by element, unrolled by two.
unsafe fn scalar<T, O, M, P>(dst: &ViewImpl<T, O>, src: &M)
where
    T: Scalar + From<M::Elem>,
    O: StorageOrder,
    M: DenseMatrix + ?Sized,
    P: AssignOp,
{
    let outer = dst.outer_len();
    let inner = dst.inner_len();
    let ipos = inner - inner % 2;

    let read = |k: usize, j: usize| -> T {
        let (i, j) = O::join(k, j);
        T::from(src.read_unchecked(i, j))
    };

    for k in 0..outer {
        let lane = dst.lane_ptr(k);
        let mut j = 0;
        while j < ipos {
            let p0 = lane.add(j);
            let p1 = lane.add(j + 1);
            let (s0, s1) = (read(k, j), read(k, j + 1));
            p0.write(P::apply(p0.read(), s0));
            p1.write(P::apply(p1.read(), s1));
            j += 2;
        }
        if ipos < inner {
            let p = lane.add(ipos);
            p.write(P::apply(p.read(), read(k, ipos)));
        }
    }
}

/// Opposite storage orders, tile by tile.
unsafe fn blocked<T, O, M, P>(dst: &ViewImpl<T, O>, src: &M)
where
    T: Scalar + From<M::Elem>,
    O: StorageOrder,
    M: DenseMatrix + ?Sized,
    P: AssignOp,
{
    let outer = dst.outer_len();
    let inner = dst.inner_len();

    let mut kk = 0;
    while kk < outer {
        let kend = Ord::min(kk + BLOCK_SIZE, outer);
        let mut jj = 0;
        while jj < inner {
            let jend = Ord::min(jj + BLOCK_SIZE, inner);
            for k in kk..kend {
                let lane = dst.lane_ptr(k);
                for j in jj..jend {
                    let (row, col) = O::join(k, j);
                    let p = lane.add(j);
                    p.write(P::apply(p.read(), T::from(src.read_unchecked(row, col))));
                }
            }
            jj = jend;
        }
        kk = kend;
    }
}

/// Runs `dst op= src` for a dense vector source of the same length as `dst`.
///
/// The caller is responsible for the length check. The padding of `dst` is never written.
pub(crate) fn assign_vector<T, V, P>(dst: &mut Vector<T>, src: &V)
where
    T: Scalar + From<V::Elem>,
    V: DenseVector + ?Sized,
    P: AssignOp,
{
    let len = dst.len();
    debug_assert!(len == src.len());
    let kernel = select_vector::<T, V, P>();
    log::trace!("{:?} kernel for {} elements {:?}", kernel, len, P::default());

    if kernel == Kernel::Vectorized {
        let w = T::WIDTH;
        let rest = len % w;
        let final_ = len - rest;
        let stream = !P::READS_DST && len > CACHE_SIZE / (3 * core::mem::size_of::<T>());

        // SAFETY: the lengths match, `final_` is a multiple of the width and the vector buffer
        // is aligned for registers.
        unsafe {
            let load_src =
                |i: usize| coe::coerce_static::<<V::Elem as Scalar>::Reg, T::Reg>(src.load(i));

            let mut i = 0;
            if stream {
                while i < final_ {
                    dst.stream(i, load_src(i));
                    i += w;
                }
            } else {
                while i < final_ {
                    let s = load_src(i);
                    let value = if P::READS_DST {
                        P::apply_reg::<T>(dst.load(i), s)
                    } else {
                        s
                    };
                    dst.store(i, value);
                    i += w;
                }
            }
            if rest > 0 {
                let p = dst.as_mut_ptr().add(final_);
                let s = load_src(final_);
                let value = if P::READS_DST {
                    P::apply_reg::<T>(T::loadu_partial(p, rest), s)
                } else {
                    s
                };
                T::storeu_partial(p, value, rest);
            }
            if stream {
                stream_fence();
            }
        }
    } else {
        let ipos = len - len % 2;
        let mut i = 0;
        // SAFETY: every index is smaller than the common length.
        unsafe {
            let read = |i: usize| T::from(src.read_unchecked(i));
            while i < ipos {
                let (s0, s1) = (read(i), read(i + 1));
                let x0 = dst.get_unchecked_mut(i);
                *x0 = P::apply(*x0, s0);
                let x1 = dst.get_unchecked_mut(i + 1);
                *x1 = P::apply(*x1, s1);
                i += 2;
            }
            if ipos < len {
                let x = dst.get_unchecked_mut(ipos);
                *x = P::apply(*x, read(ipos));
            }
        }
    }
}

/// Runs `dst op= src` for a sparse vector source given by its sorted `indices` and `values`.
///
/// Plain assignment resets the destination first. Operations where zero is not neutral visit
/// every element of the destination, the others only the stored entries.
pub(crate) fn assign_sparse_vector<T, U, P>(dst: &mut Vector<T>, indices: &[usize], values: &[U])
where
    T: Scalar + From<U>,
    U: Copy,
    P: AssignOp,
{
    debug_assert!(all(
        indices.len() == values.len(),
        indices.last().map_or(true, |&i| i < dst.len()),
    ));
    log::trace!(
        "{:?} kernel for {} elements {:?}",
        Kernel::Sparse,
        dst.len(),
        P::default()
    );

    if !P::READS_DST {
        dst.reset();
    }
    if P::READS_DST && !P::ZERO_IS_NEUTRAL {
        let mut stored = indices.iter().zip(values).peekable();
        for i in 0..dst.len() {
            let value = match stored.peek() {
                Some(&(&idx, &value)) if idx == i => {
                    stored.next();
                    T::from(value)
                }
                _ => T::zero(),
            };
            // SAFETY: `i < dst.len()`.
            let x = unsafe { dst.get_unchecked_mut(i) };
            *x = P::apply(*x, value);
        }
    } else {
        for (&i, &value) in indices.iter().zip(values) {
            // SAFETY: stored indices of a sparse vector are smaller than its length, which
            // matches the destination.
            let x = unsafe { dst.get_unchecked_mut(i) };
            *x = P::apply(*x, T::from(value));
        }
    }
}

/// Runs `x op= value` for the `len` elements starting at `dst`. Whole registers cover the first
/// `len - len % WIDTH` elements and the tail is processed element by element, so nothing past
/// `len` is written.
///
/// # Safety
/// `dst` must be aligned for `T::Reg` and valid for reading and writing `len` elements.
pub(crate) unsafe fn apply_scalar<T: Scalar, P: AssignOp>(dst: *mut T, len: usize, value: T) {
    let mut j = 0;
    if P::simd_supported::<T>() {
        let w = T::WIDTH;
        let end = len - len % w;
        let reg = T::splat(value);
        while j < end {
            let p = dst.add(j);
            T::store(p, P::apply_reg::<T>(T::load(p), reg));
            j += w;
        }
    }
    while j < len {
        let p = dst.add(j);
        p.write(P::apply(p.read(), value));
        j += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert,
        mat::{Mat, Submatrix},
        order::{ColMajor, RowMajor},
        sparse::SparseMat,
        Complex,
    };

    #[test]
    fn dispatch_table() {
        type S<'a, T, O> = Submatrix<'a, T, O>;

        assert!(select_dense::<f64, RowMajor, Mat<f64, ColMajor>, Assign>() == Kernel::Blocked);
        assert!(select_dense::<f64, RowMajor, Mat<f32, RowMajor>, Assign>() == Kernel::Scalar);
        assert!(
            select_dense::<Complex<f64>, ColMajor, S<'static, Complex<f64>, ColMajor>, AddAssign>()
                == Kernel::Scalar
        );
        assert!(select_sparse::<SparseMat<f64, RowMajor>>() == Kernel::Sparse);

        #[cfg(target_arch = "x86_64")]
        {
            assert!(
                select_dense::<f64, RowMajor, Mat<f64, RowMajor>, Assign>() == Kernel::Vectorized
            );
            assert!(
                select_dense::<i32, ColMajor, Mat<i32, ColMajor>, SubAssign>()
                    == Kernel::Vectorized
            );
            assert!(select_dense::<u32, RowMajor, Mat<u32, RowMajor>, Assign>() == Kernel::Scalar);
        }
    }

    #[test]
    fn vector_kernels() {
        let n = 13;
        let mut a = Vector::<f64>::from_fn(n, |i| i as f64);
        let b = Vector::<f64>::from_fn(n, |i| 2.0 * i as f64 + 1.0);

        assign_vector::<f64, _, AddAssign>(&mut a, &b);
        for i in 0..n {
            assert!(a[i] == 3.0 * i as f64 + 1.0);
        }
        assign_vector::<f64, _, MulAssign>(&mut a, &b);
        for i in 0..n {
            assert!(a[i] == (3.0 * i as f64 + 1.0) * (2.0 * i as f64 + 1.0));
        }
        assign_vector::<f64, _, Assign>(&mut a, &b);
        assert!(a == b);

        let mut c = Vector::<f64>::full(6, 2.0);
        assign_sparse_vector::<f64, f32, MulAssign>(&mut c, &[1, 4], &[3.0, -1.0]);
        assert!(c.as_slice() == &[0.0, 6.0, 0.0, 0.0, -2.0, 0.0][..]);
        assign_sparse_vector::<f64, f32, SubAssign>(&mut c, &[0], &[1.0]);
        assert!(c.as_slice() == &[-1.0, 6.0, 0.0, 0.0, -2.0, 0.0][..]);
        assign_sparse_vector::<f64, f32, Assign>(&mut c, &[5], &[7.0]);
        assert!(c.as_slice() == &[0.0, 0.0, 0.0, 0.0, 0.0, 7.0][..]);

        assert!(select_vector::<u64, Vector<u64>, Assign>() == Kernel::Scalar);
        assert!(select_vector::<f64, Vector<f32>, Assign>() == Kernel::Scalar);
        #[cfg(target_arch = "x86_64")]
        assert!(select_vector::<f64, Vector<f64>, AddAssign>() == Kernel::Vectorized);
    }

    #[test]
    fn scalar_application_stops_at_len() {
        let mut v = Vector::<f64>::full(7, 1.0);
        unsafe { apply_scalar::<f64, MulAssign>(v.as_mut_ptr(), v.len(), f64::INFINITY) };
        assert!(v.as_slice().iter().all(|&x| x == f64::INFINITY));
        let padding = unsafe {
            core::slice::from_raw_parts(v.as_ptr().add(v.len()), v.capacity() - v.len())
        };
        assert!(padding.iter().all(|&x| x == 0.0));

        unsafe { apply_scalar::<f64, DivAssign>(v.as_mut_ptr(), 3, f64::INFINITY) };
        assert!(v.as_slice()[..3].iter().all(|x| x.is_nan()));
        assert!(v.as_slice()[3..].iter().all(|&x| x == f64::INFINITY));
    }
}
