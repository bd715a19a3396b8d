use super::{cursor::Cursor, slice::check_region, DenseMatrix, Mat, ViewImpl};
use crate::{
    assert, debug_assert,
    order::{RowMajor, StorageOrder},
    simd::Scalar,
    DenseError,
};
use core::marker::PhantomData;
use reborrow::*;

/// Immutable view over a rectangular region of a [`Mat`].
///
/// Element `(i, j)` of the view is element `(row + i, col + j)` of the matrix, where `(row, col)`
/// is the top left corner given at construction. Views of views refer to the same matrix, with
/// accumulated offsets.
///
/// # Example
/// ```
/// use densa::{submatrix, Mat};
///
/// let a = Mat::<f64>::from_fn(10, 10, |i, j| (10 * i + j) as f64);
/// let view = submatrix(&a, 2, 3, 4, 4);
///
/// assert_eq!(view.read(0, 0), 23.0);
/// assert_eq!(view.read(3, 3), 56.0);
/// ```
pub struct Submatrix<'a, T: Scalar, O: StorageOrder = RowMajor> {
    pub(super) inner: ViewImpl<T, O>,
    pub(super) __marker: PhantomData<&'a T>,
}

impl<T: Scalar, O: StorageOrder> Clone for Submatrix<'_, T, O> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Scalar, O: StorageOrder> Copy for Submatrix<'_, T, O> {}

impl<'short, T: Scalar, O: StorageOrder> Reborrow<'short> for Submatrix<'_, T, O> {
    type Target = Submatrix<'short, T, O>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, T: Scalar, O: StorageOrder> ReborrowMut<'short> for Submatrix<'_, T, O> {
    type Target = Submatrix<'short, T, O>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<T: Scalar, O: StorageOrder> IntoConst for Submatrix<'_, T, O> {
    type Target = Self;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'a, T: Scalar, O: StorageOrder> Submatrix<'a, T, O> {
    #[inline]
    pub(crate) unsafe fn from_view(inner: ViewImpl<T, O>) -> Self {
        Self {
            inner,
            __marker: PhantomData,
        }
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

    /// Reads the element at `(row, col)` of the view, without bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn read_unchecked(&self, row: usize, col: usize) -> T {
        debug_assert!(all(row < self.nrows(), col < self.ncols()));
        self.inner.ptr_at(row, col).read()
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
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { self.read_unchecked(row, col) }
    }

    /// Returns a reference to the element at `(row, col)` of the view, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn get(self, row: usize, col: usize) -> &'a T {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { &*self.inner.ptr_at(row, col) }
    }

    /// Returns the number of lanes of the view: rows for row-major storage, columns otherwise.
    #[inline(always)]
    pub fn lane_count(&self) -> usize {
        self.inner.outer_len()
    }

    /// Returns lane `k` of the view as a slice.
    ///
    /// # Panics
    /// The function panics if `k >= self.lane_count()`.
    #[inline]
    #[track_caller]
    pub fn lane(self, k: usize) -> &'a [T] {
        assert!(k < self.lane_count());
        unsafe { core::slice::from_raw_parts(self.inner.lane_ptr(k), self.inner.inner_len()) }
    }

    /// Returns a cursor to the first element of lane `k`.
    #[inline]
    #[track_caller]
    pub fn begin(self, k: usize) -> Cursor<'a, T> {
        Cursor::new(self.lane(k), 0)
    }

    /// Returns a cursor one past the last element of lane `k`.
    #[inline]
    #[track_caller]
    pub fn end(self, k: usize) -> Cursor<'a, T> {
        let lane = self.lane(k);
        Cursor::new(lane, lane.len())
    }

    /// Returns a view over the region of shape `nrows × ncols` starting at `(row, col)` of
    /// `self`, or an error if the region does not fit.
    #[inline]
    pub fn try_submatrix(
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
    pub fn submatrix(self, row: usize, col: usize, nrows: usize, ncols: usize) -> Self {
        match self.try_submatrix(row, col, nrows, ncols) {
            Ok(view) => view,
            Err(err) => panic!("{err}"),
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
        (0..self.lane_count()).all(|k| self.lane(k).iter().all(|x| x.is_default()))
    }

    /// Copies the view into a new matrix.
    #[inline]
    pub fn to_owned(&self) -> Mat<T, O> {
        Mat::from_expr(self)
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
}

impl<T: Scalar, O: StorageOrder> DenseMatrix for Submatrix<'_, T, O> {
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

impl<T: Scalar, O: StorageOrder> core::ops::Index<(usize, usize)> for Submatrix<'_, T, O> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        self.get(row, col)
    }
}

impl<T: Scalar, O: StorageOrder> core::fmt::Debug for Submatrix<'_, T, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Row<'a, T: Scalar, O: StorageOrder>(Submatrix<'a, T, O>, usize);
        impl<T: Scalar, O: StorageOrder> core::fmt::Debug for Row<'_, T, O> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_list()
                    .entries((0..self.0.ncols()).map(|j| self.0.read(self.1, j)))
                    .finish()
            }
        }
        f.debug_list()
            .entries((0..self.nrows()).map(|i| Row(*self, i)))
            .finish()
    }
}
