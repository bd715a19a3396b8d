use super::{
    cursor::Cursor, expr::MatDiv, expr::MatMul, expr::MatScale, slice::check_region, DenseMatrix,
    Mat, Submatrix, ViewImpl,
};
use crate::{
    assert, debug_assert,
    kernel::{self, AddAssign, Assign, AssignOp, SubAssign},
    order::{RowMajor, StorageOrder},
    simd::Scalar,
    DenseError,
};
use core::marker::PhantomData;
use reborrow::*;

/// Source of a bulk assignment into a destination of element type `T` and storage order `O`.
///
/// Implemented by every [`DenseMatrix`] whose elements convert into `T`, and by
/// [`SparseMat`](crate::sparse::SparseMat).
pub trait Assignable<T: Scalar, O: StorageOrder> {
    /// Returns `(nrows, ncols)`.
    fn shape(&self) -> (usize, usize);

    /// Returns `true` if the source may refer to the matrix at address `addr`.
    fn aliases(&self, addr: *const ()) -> bool;

    /// Runs `dst op= self` through the dispatcher.
    ///
    /// # Safety
    /// `dst` must have the shape of `self`, and `self` must not alias `dst`.
    #[doc(hidden)]
    unsafe fn assign_to<P: AssignOp>(&self, dst: &mut SubmatrixMut<'_, T, O>);

    /// Evaluates `self` into a temporary, then runs `dst op= temporary`.
    ///
    /// # Safety
    /// `dst` must have the shape of `self`.
    #[doc(hidden)]
    unsafe fn assign_through_temporary<P: AssignOp>(&self, dst: &mut SubmatrixMut<'_, T, O>);
}

impl<T, O, M> Assignable<T, O> for M
where
    T: Scalar + From<M::Elem>,
    O: StorageOrder,
    M: DenseMatrix + ?Sized,
{
    #[inline]
    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    #[inline]
    fn aliases(&self, addr: *const ()) -> bool {
        self.can_alias(addr)
    }

    #[inline]
    unsafe fn assign_to<P: AssignOp>(&self, dst: &mut SubmatrixMut<'_, T, O>) {
        kernel::assign_dense::<T, O, M, P>(&dst.inner, self)
    }

    #[inline]
    unsafe fn assign_through_temporary<P: AssignOp>(&self, dst: &mut SubmatrixMut<'_, T, O>) {
        let tmp = Mat::<M::Elem, M::Order>::from_expr(self);
        kernel::assign_dense::<T, O, Mat<M::Elem, M::Order>, P>(&dst.inner, &tmp)
    }
}

/// Mutable view over a rectangular region of a [`Mat`].
///
/// Bulk assignments into the view pick a kernel from the storage orders, the element types and
/// the operation; see [`crate::kernel`]. When the source refers to the same matrix as the view, it
/// is first evaluated into a temporary, so overlapping assignments behave as if the source had
/// been copied beforehand.
pub struct SubmatrixMut<'a, T: Scalar, O: StorageOrder = RowMajor> {
    pub(crate) inner: ViewImpl<T, O>,
    pub(super) __marker: PhantomData<&'a mut T>,
}

impl<'short, T: Scalar, O: StorageOrder> Reborrow<'short> for SubmatrixMut<'_, T, O> {
    type Target = Submatrix<'short, T, O>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        unsafe { Submatrix::from_view(self.inner) }
    }
}

impl<'short, T: Scalar, O: StorageOrder> ReborrowMut<'short> for SubmatrixMut<'_, T, O> {
    type Target = SubmatrixMut<'short, T, O>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        unsafe { SubmatrixMut::from_view(self.inner) }
    }
}

impl<'a, T: Scalar, O: StorageOrder> IntoConst for SubmatrixMut<'a, T, O> {
    type Target = Submatrix<'a, T, O>;

    #[inline]
    fn into_const(self) -> Self::Target {
        unsafe { Submatrix::from_view(self.inner) }
    }
}

impl<'a, T: Scalar, O: StorageOrder> SubmatrixMut<'a, T, O> {
    #[inline]
    pub(crate) unsafe fn from_view(inner: ViewImpl<T, O>) -> Self {
        Self {
            inner,
            __marker: PhantomData,
        }
    }

    /// Read-only view of the same region, with an unbounded lifetime. Used as the source of
    /// self-referential assignments, which always go through a temporary.
    #[inline]
    unsafe fn alias<'b>(&self) -> Submatrix<'b, T, O> {
        Submatrix::from_view(self.inner)
    }

    /// Returns the number of rows of the view.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.inner.nrows
    }

    /// Returns the number of columns of the view.
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.inner.ncols
    }

    /// Returns the row of the matrix at which the view starts.
    #[inline(always)]
    pub fn row(&self) -> usize {
        self.inner.row
    }

    /// Returns the column of the matrix at which the view starts.
    #[inline(always)]
    pub fn col(&self) -> usize {
        self.inner.col
    }

    /// Returns the number of elements of the view.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.inner.nrows * self.inner.ncols
    }

    /// Returns `true` if the lanes of the view can be processed with whole aligned registers.
    #[inline(always)]
    pub fn is_aligned(&self) -> bool {
        self.inner.aligned
    }

    /// Returns the number of lanes of the view: rows for row-major storage, columns otherwise.
    #[inline(always)]
    pub fn lane_count(&self) -> usize {
        self.inner.outer_len()
    }

    /// Reads the element at `(row, col)` of the view, without bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn read_unchecked(&self, row: usize, col: usize) -> T {
        self.rb().read_unchecked(row, col)
    }

    /// Reads the element at `(row, col)` of the view, with bound checks.
    ///
    /// # Panics
    /// The function panics if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> T {
        self.rb().read(row, col)
    }

    /// Writes `value` at `(row, col)` of the view, without bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn write_unchecked(&mut self, row: usize, col: usize, value: T) {
        debug_assert!(all(row < self.nrows(), col < self.ncols()));
        self.inner.ptr_at(row, col).write(value)
    }

    /// Writes `value` at `(row, col)` of the view, with bound checks.
    ///
    /// # Panics
    /// The function panics if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, row: usize, col: usize, value: T) {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { self.write_unchecked(row, col, value) }
    }

    /// Returns a mutable reference to the element at `(row, col)` of the view, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn get_mut(self, row: usize, col: usize) -> &'a mut T {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { &mut *self.inner.ptr_at(row, col) }
    }

    /// Returns lane `k` of the view as a slice.
    #[inline]
    #[track_caller]
    pub fn lane(&self, k: usize) -> &[T] {
        self.rb().lane(k)
    }

    /// Returns lane `k` of the view as a mutable slice.
    ///
    /// # Panics
    /// The function panics if `k >= self.lane_count()`.
    #[inline]
    #[track_caller]
    pub fn lane_mut(&mut self, k: usize) -> &mut [T] {
        assert!(k < self.lane_count());
        unsafe { core::slice::from_raw_parts_mut(self.inner.lane_ptr(k), self.inner.inner_len()) }
    }

    /// Returns a cursor to the first element of lane `k`.
    #[inline]
    #[track_caller]
    pub fn begin(&self, k: usize) -> Cursor<'_, T> {
        self.rb().begin(k)
    }

    /// Returns a cursor one past the last element of lane `k`.
    #[inline]
    #[track_caller]
    pub fn end(&self, k: usize) -> Cursor<'_, T> {
        self.rb().end(k)
    }

    /// Returns a view over the region of shape `nrows × ncols` starting at `(row, col)` of
    /// `self`, or an error if the region does not fit.
    #[inline]
    pub fn try_submatrix_mut(
        self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self, DenseError> {
        check_region(self.nrows(), self.ncols(), row, col, nrows, ncols)?;
        Ok(unsafe { Self::from_view(self.inner.sub(row, col, nrows, ncols)) })
    }

    /// Returns a view over the region of shape `nrows × ncols` starting at `(row, col)` of
    /// `self`.
    ///
    /// # Panics
    /// The function panics if the region does not fit inside `self`.
    #[inline]
    #[track_caller]
    pub fn submatrix_mut(self, row: usize, col: usize, nrows: usize, ncols: usize) -> Self {
        match self.try_submatrix_mut(row, col, nrows, ncols) {
            Ok(view) => view,
            Err(err) => panic!("{err}"),
        }
    }

    /// Sets every element of the view to `value`.
    pub fn fill(&mut self, value: T) {
        for k in 0..self.lane_count() {
            self.lane_mut(k).fill(value);
        }
    }

    /// Sets every element of the view to zero.
    #[inline]
    pub fn reset(&mut self) {
        unsafe { self.inner.reset() }
    }

    /// Sets every element of lane `k` to zero.
    #[inline]
    #[track_caller]
    pub fn reset_lane(&mut self, k: usize) {
        self.lane_mut(k).fill(T::zero());
    }

    /// Multiplies every element of the view by `factor`, in place.
    pub fn scale(&mut self, factor: T) {
        for k in 0..self.lane_count() {
            for x in self.lane_mut(k) {
                *x *= factor;
            }
        }
    }

    /// Returns the number of elements of the view that are not zero.
    #[inline]
    pub fn nonzeros(&self) -> usize {
        self.inner.nonzeros()
    }

    /// Returns the number of elements of lane `k` that are not zero.
    #[inline]
    #[track_caller]
    pub fn lane_nonzeros(&self, k: usize) -> usize {
        self.inner.lane_nonzeros(k)
    }

    /// Returns `true` if every element of the view is zero.
    #[inline]
    pub fn is_default(&self) -> bool {
        self.rb().is_default()
    }

    /// Copies the view into a new matrix.
    #[inline]
    pub fn to_owned(&self) -> Mat<T, O> {
        self.rb().to_owned()
    }

    /// Returns `true` if the view may refer to the matrix at address `addr`.
    #[inline(always)]
    pub fn can_alias(&self, addr: *const ()) -> bool {
        self.inner.base == addr
    }

    /// Returns `true` if the view refers to the matrix at address `addr`.
    #[inline(always)]
    pub fn is_aliased(&self, addr: *const ()) -> bool {
        self.inner.base == addr
    }

    #[inline]
    fn check_shape(&self, (nrows, ncols): (usize, usize)) -> Result<(), DenseError> {
        if (nrows, ncols) == (self.nrows(), self.ncols()) {
            Ok(())
        } else {
            Err(DenseError::ShapeMismatch {
                expected: (self.nrows(), self.ncols()),
                found: (nrows, ncols),
            })
        }
    }

    /// Runs `self op= src`, resolving aliasing. The shapes must already match.
    fn run<P: AssignOp, S: Assignable<T, O> + ?Sized>(&mut self, src: &S) {
        debug_assert!(src.shape() == (self.nrows(), self.ncols()));
        unsafe {
            if src.aliases(self.inner.base) {
                log::debug!(
                    target: "densa_perf",
                    "source of a {}x{} assignment aliases its destination, evaluating it into a temporary",
                    self.nrows(),
                    self.ncols(),
                );
                src.assign_through_temporary::<P>(self);
            } else {
                src.assign_to::<P>(self);
            }
        }
    }

    /// Assigns `src` to the view.
    ///
    /// Returns an error without modifying the view if the shapes differ.
    pub fn try_assign<S: Assignable<T, O> + ?Sized>(&mut self, src: &S) -> Result<(), DenseError> {
        self.check_shape(src.shape())?;
        self.run::<Assign, S>(src);
        Ok(())
    }

    /// Adds `src` to the view.
    ///
    /// Returns an error without modifying the view if the shapes differ.
    pub fn try_add_assign<S: Assignable<T, O> + ?Sized>(
        &mut self,
        src: &S,
    ) -> Result<(), DenseError> {
        self.check_shape(src.shape())?;
        self.run::<AddAssign, S>(src);
        Ok(())
    }

    /// Subtracts `src` from the view.
    ///
    /// Returns an error without modifying the view if the shapes differ.
    pub fn try_sub_assign<S: Assignable<T, O> + ?Sized>(
        &mut self,
        src: &S,
    ) -> Result<(), DenseError> {
        self.check_shape(src.shape())?;
        self.run::<SubAssign, S>(src);
        Ok(())
    }

    /// Replaces the view with its product by `rhs` on the right.
    ///
    /// The product is computed into a temporary first. Returns an error without modifying the
    /// view if `rhs` is not `ncols × ncols`.
    pub fn try_mul_assign<R: DenseMatrix<Elem = T> + ?Sized>(
        &mut self,
        rhs: &R,
    ) -> Result<(), DenseError> {
        let n = self.ncols();
        if (rhs.nrows(), rhs.ncols()) != (n, n) {
            return Err(DenseError::ShapeMismatch {
                expected: (n, n),
                found: (rhs.nrows(), rhs.ncols()),
            });
        }
        let product = Mat::<T, O>::from_expr(&MatMul::new(unsafe { self.alias() }, rhs));
        self.run::<Assign, _>(&product);
        Ok(())
    }

    /// Multiplies the view by `factor`, as an assignment from the scaled view itself.
    pub fn mul_assign_scalar(&mut self, factor: T) {
        let expr = MatScale::new(unsafe { self.alias() }, factor);
        self.run::<Assign, _>(&expr);
    }

    /// Divides the view by `divisor`, as an assignment from the scaled view itself.
    #[track_caller]
    pub fn div_assign_scalar(&mut self, divisor: T) {
        let expr = MatDiv::new(unsafe { self.alias() }, divisor);
        self.run::<Assign, _>(&expr);
    }

    /// Assigns to the view the region of the same shape starting at `(row, col)` of the
    /// underlying matrix. The regions may overlap.
    ///
    /// Returns an error without modifying the view if the source region does not fit inside the
    /// matrix.
    pub fn assign_from_region(&mut self, row: usize, col: usize) -> Result<(), DenseError> {
        check_region(
            self.inner.matrix_nrows,
            self.inner.matrix_ncols,
            row,
            col,
            self.nrows(),
            self.ncols(),
        )?;
        if (row, col) == (self.inner.row, self.inner.col) {
            return Ok(());
        }
        let src = unsafe { Submatrix::<'_, T, O>::from_view(self.inner.moved_to(row, col)) };
        self.run::<Assign, _>(&src);
        Ok(())
    }
}

impl<T: Scalar, O: StorageOrder> DenseMatrix for SubmatrixMut<'_, T, O> {
    type Elem = T;
    type Order = O;
    const SIMD: bool = T::SIMD;

    #[inline(always)]
    fn nrows(&self) -> usize {
        self.inner.nrows
    }
    #[inline(always)]
    fn ncols(&self) -> usize {
        self.inner.ncols
    }
    #[inline(always)]
    unsafe fn read_unchecked(&self, row: usize, col: usize) -> T {
        self.inner.ptr_at(row, col).read()
    }
    #[inline(always)]
    unsafe fn load(&self, row: usize, col: usize) -> T::Reg {
        self.inner.load(row, col)
    }
    #[inline(always)]
    fn can_alias(&self, addr: *const ()) -> bool {
        self.inner.base == addr
    }
    #[inline(always)]
    fn is_aliased(&self, addr: *const ()) -> bool {
        self.inner.base == addr
    }
}

impl<T: Scalar, O: StorageOrder> core::ops::Index<(usize, usize)> for SubmatrixMut<'_, T, O> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        self.rb().get(row, col)
    }
}

impl<T: Scalar, O: StorageOrder> core::ops::IndexMut<(usize, usize)> for SubmatrixMut<'_, T, O> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        self.rb_mut().get_mut(row, col)
    }
}

impl<T: Scalar, O: StorageOrder> core::fmt::Debug for SubmatrixMut<'_, T, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.rb().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        assert, mat, scale, sparse::SparseMat, ColMajor, DenseError, DenseMatrix, Mat, RowMajor,
    };
    use assert_approx_eq::assert_approx_eq;
    use rand::random;

    fn reference_region<O: crate::StorageOrder>(
        a: &Mat<f64, O>,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Mat<f64, O> {
        Mat::from_fn(nrows, ncols, |i, j| a.read(row + i, col + j))
    }

    fn check_assign<O: crate::StorageOrder>(m: usize, n: usize) {
        let src = Mat::<f64, O>::from_fn(m, n, |_, _| random());
        for row in 0..3 {
            for col in 0..5 {
                for nrows in [0, 1, m - 3] {
                    for ncols in [0, 1, 3, 4, 5, 8, 9, n - col] {
                        if ncols > n - col || nrows > m - row {
                            continue;
                        }
                        let mut dst = Mat::<f64, O>::full(m, n, -1.0);
                        let region = src.submatrix(row, col, nrows, ncols);
                        dst.submatrix_mut(row, col, nrows, ncols)
                            .try_assign(&region)
                            .unwrap();
                        for i in 0..m {
                            for j in 0..n {
                                let inside = i >= row
                                    && i < row + nrows
                                    && j >= col
                                    && j < col + ncols;
                                let expected = if inside { src.read(i, j) } else { -1.0 };
                                assert!(dst.read(i, j) == expected);
                            }
                        }
                        assert!(dst.padding_is_zero());
                    }
                }
            }
        }
    }

    #[test]
    fn assign_every_alignment() {
        check_assign::<RowMajor>(7, 19);
        check_assign::<ColMajor>(19, 7);
        check_assign::<RowMajor>(9, 9);
    }

    #[test]
    fn assign_opposite_order() {
        let src = Mat::<f64, ColMajor>::from_fn(20, 37, |i, j| (i * 100 + j) as f64);
        let mut dst = Mat::<f64, RowMajor>::zeros(22, 40);
        dst.submatrix_mut(1, 2, 20, 37).try_assign(&src).unwrap();
        for i in 0..20 {
            for j in 0..37 {
                assert!(dst.read(1 + i, 2 + j) == src.read(i, j));
            }
        }
        assert!(dst.nonzeros() == 20 * 37 - 1);
    }

    #[test]
    fn compound_assign() {
        let a = Mat::<f32>::from_fn(6, 11, |_, _| random());
        let b = Mat::<f32>::from_fn(6, 11, |_, _| random());
        let mut c = Mat::<f32>::zeros(8, 12);
        {
            let mut view = c.submatrix_mut(1, 1, 6, 11);
            view.try_assign(&a).unwrap();
            view.try_add_assign(&b).unwrap();
            view.try_sub_assign(&(&a * scale(2.0f32))).unwrap();
        }
        for i in 0..6 {
            for j in 0..11 {
                assert_approx_eq!(c.read(1 + i, 1 + j), b.read(i, j) - a.read(i, j), 1e-6);
            }
        }
        assert!(c.submatrix(0, 0, 1, 12).is_default());
    }

    #[test]
    fn integer_and_complex_views() {
        let a = Mat::<i32>::from_fn(5, 9, |i, j| (i * 9 + j) as i32);
        let mut b = Mat::<i32>::full(5, 9, 1);
        b.submatrix_mut(0, 1, 5, 7)
            .try_add_assign(&a.submatrix(0, 2, 5, 7))
            .unwrap();
        assert!(b.read(3, 1) == 1 + 29);
        assert!(b.read(3, 0) == 1);
        assert!(b.read(3, 8) == 1);

        let z = Mat::<crate::Complex<f64>, ColMajor>::from_fn(3, 3, |i, j| {
            crate::Complex::new(i as f64, j as f64)
        });
        let mut w = Mat::<crate::Complex<f64>, ColMajor>::zeros(3, 3);
        w.as_submatrix_mut().try_assign(&z).unwrap();
        assert!(w == z);
    }

    #[test]
    fn shape_mismatch_leaves_destination() {
        let a = Mat::<f64>::full(3, 3, 2.0);
        let mut b = Mat::<f64>::full(4, 4, 7.0);
        let mut view = b.submatrix_mut(0, 0, 3, 4);
        assert!(
            view.try_assign(&a)
                == Err(DenseError::ShapeMismatch {
                    expected: (3, 4),
                    found: (3, 3)
                })
        );
        assert!(view.try_mul_assign(&a).is_err());
        assert!(b.as_submatrix().nonzeros() == 16);
        assert!(b.read(0, 0) == 7.0);
    }

    #[test]
    fn overlapping_region() {
        for (row, col) in [(0, 0), (1, 2), (2, 1), (3, 3), (0, 3), (3, 0)] {
            let a = Mat::<f64>::from_fn(9, 11, |_, _| random());
            let mut b = a.clone();
            let expected = reference_region(&a, row, col, 6, 8);

            let mut view = b.submatrix_mut(1, 1, 6, 8);
            view.assign_from_region(row, col).unwrap();
            for i in 0..6 {
                for j in 0..8 {
                    assert!(view.read(i, j) == expected.read(i, j));
                }
            }
            assert!(view.assign_from_region(4, 0).is_err());
        }
    }

    #[test]
    fn scale_roundtrip() {
        let a = Mat::<f64, ColMajor>::from_fn(13, 6, |_, _| random::<f64>() + 0.5);
        let mut b = a.clone();
        let s = 3.7;
        {
            let mut view = b.submatrix_mut(2, 1, 9, 4);
            view.mul_assign_scalar(s);
            view.div_assign_scalar(s);
        }
        for i in 0..13 {
            for j in 0..6 {
                assert_approx_eq!(b.read(i, j), a.read(i, j), 1e-12);
            }
        }

        let mut view = b.submatrix_mut(0, 0, 2, 2);
        view.scale(2.0);
        assert_approx_eq!(view.read(1, 1), 2.0 * a.read(1, 1));
    }

    #[test]
    fn non_finite_scaling_keeps_padding() {
        let a = Mat::<f64>::full(5, 7, 1.0);
        let e = (&a * scale(f64::INFINITY)).eval();
        assert!(all(e.nonzeros() == 35, e.padding_is_zero()));

        let mut b = Mat::<f64>::full(6, 9, 1.0);
        b.submatrix_mut(1, 2, 4, 7).mul_assign_scalar(f64::INFINITY);
        b.submatrix_mut(0, 0, 6, 5).div_assign_scalar(f64::NAN);
        assert!(b.padding_is_zero());
        assert!(all(b.read(1, 8) == f64::INFINITY, b.read(0, 8) == 1.0, b.read(5, 0).is_nan()));
    }

    #[test]
    fn large_assignments_stream() {
        let (m, n) = (420, 417);
        assert!(
            (m - 1) * n > crate::kernel::CACHE_SIZE / (3 * core::mem::size_of::<f64>())
        );
        let src = Mat::<f64>::from_fn(m - 1, n, |i, j| (i * n + j) as f64);

        // lanes of the first view start on a register boundary
        let mut dst = Mat::<f64>::full(m, n, -1.0);
        dst.submatrix_mut(1, 0, m - 1, n).try_assign(&src).unwrap();
        for j in 0..n {
            assert!(dst.read(0, j) == -1.0);
        }
        for i in 0..m - 1 {
            for j in 0..n {
                assert!(dst.read(i + 1, j) == src.read(i, j));
            }
        }
        assert!(dst.padding_is_zero());

        let mut dst = Mat::<f64>::full(m, n, -1.0);
        let region = src.submatrix(0, 0, 400, 400);
        dst.submatrix_mut(2, 3, 400, 400).try_assign(&region).unwrap();
        for i in 0..m {
            for j in 0..n {
                let inside = (2..402).contains(&i) && (3..403).contains(&j);
                let expected = if inside { src.read(i - 2, j - 3) } else { -1.0 };
                assert!(dst.read(i, j) == expected);
            }
        }
        assert!(dst.padding_is_zero());
    }

    #[test]
    fn mul_assign_matrix() {
        let mut a = mat![[1.0, 2.0], [3.0, 4.0f64]];
        let r = mat![[0.0, 1.0], [1.0, 0.0f64]];
        a.as_submatrix_mut().try_mul_assign(&r).unwrap();
        assert!(a == mat![[2.0, 1.0], [4.0, 3.0f64]]);

        let mut b = Mat::<f64>::from_fn(4, 3, |i, j| (i + j) as f64);
        let id = Mat::<f64>::identity(3, 3);
        let before = b.clone();
        b.submatrix_mut(1, 0, 2, 3).try_mul_assign(&id).unwrap();
        assert!(b == before);
    }

    #[test]
    fn element_access_and_lanes() {
        let mut a = Mat::<u64>::zeros(4, 6);
        let mut view = a.submatrix_mut(1, 2, 3, 3);
        view.write(0, 0, 5);
        view[(2, 2)] = 9;
        view.lane_mut(1).copy_from_slice(&[1, 2, 3]);
        assert!(view.lane_nonzeros(1) == 3);
        view.reset_lane(1);
        assert!(view.nonzeros() == 2);
        view.fill(4);
        assert!(view.nonzeros() == 9);
        view.reset();
        assert!(view.is_default());
        assert!(a.nonzeros() == 0);
    }

    #[test]
    fn sparse_source() {
        let s = SparseMat::<f64, RowMajor>::try_new_from_triplets(
            4,
            4,
            &[(0, 1, 1.5), (2, 3, -2.0), (3, 0, 4.0)],
        )
        .unwrap();
        let mut a = Mat::<f64, ColMajor>::full(6, 6, 1.0);
        let mut view = a.submatrix_mut(1, 1, 4, 4);
        view.try_assign(&s).unwrap();
        assert!(view.nonzeros() == 3);
        assert!(all(
            view.read(0, 1) == 1.5,
            view.read(2, 3) == -2.0,
            view.read(3, 0) == 4.0
        ));
        view.try_add_assign(&s).unwrap();
        assert!(view.read(2, 3) == -4.0);
        assert!(a.read(0, 0) == 1.0);
        assert!(a.nonzeros() == 36 - 16 + 3);
    }

    #[test]
    fn owned_copies() {
        let mut a = Mat::<f64>::from_fn(5, 5, |i, j| (i * 5 + j) as f64);
        let mut view = a.submatrix_mut(1, 1, 3, 3);
        let copy = view.to_owned();
        assert!(copy == (&view).eval());
        view.try_add_assign(&(&copy * scale(2.0f64))).unwrap();
        assert!(view.read(0, 0) == 18.0);
        assert!(a.read(0, 0) == 0.0);
    }

    #[test]
    #[should_panic]
    fn write_out_of_bounds_should_panic() {
        let mut a = Mat::<f64>::zeros(3, 3);
        a.submatrix_mut(1, 1, 2, 2).write(2, 0, 1.0);
    }
}
