//! Dense matrices, submatrix views and lazy matrix expressions.
//!
//! [`Mat`] owns its storage. [`Submatrix`] and [`SubmatrixMut`] are rectangular windows into a
//! matrix, with the lifetime of the borrow they were created from. Arithmetic on any of these
//! builds a lazy expression (see [`expr`]) that is only evaluated when it is assigned to a
//! destination, or materialized with [`DenseMatrix::eval`].

use crate::{
    assert, debug_assert,
    order::StorageOrder,
    simd::Scalar,
};
use core::{marker::PhantomData, ptr::NonNull};

mod cursor;
pub mod expr;
mod matown;
mod ops;
mod slice;
mod submatrix;
mod submatrix_mut;

pub use cursor::Cursor;
pub use expr::{MatAdd, MatDiv, MatMul, MatScale, MatSub, Transpose};
pub use matown::Mat;
pub use slice::{submatrix, try_submatrix, SubmatrixExpr};
pub use submatrix::Submatrix;
pub use submatrix_mut::{Assignable, SubmatrixMut};

/// Readable dense matrix operand.
///
/// Implemented by owned matrices, views, lazy expressions, and shared references to any of them.
pub trait DenseMatrix {
    /// Element type.
    type Elem: Scalar;
    /// Storage order along which [`DenseMatrix::load`] reads contiguous registers.
    type Order: StorageOrder;
    /// Whether [`DenseMatrix::load`] is implemented with registers. When `false`, the kernels
    /// only read through [`DenseMatrix::read_unchecked`].
    const SIMD: bool;

    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;

    /// Reads the element at `(row, col)`, without bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    unsafe fn read_unchecked(&self, row: usize, col: usize) -> Self::Elem;

    /// Loads `WIDTH` consecutive elements along the contiguous axis of [`DenseMatrix::Order`],
    /// starting at `(row, col)`. Lanes past the extent of the operand hold unspecified values,
    /// the kernels never store them.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    /// * the coordinate along the contiguous axis is a multiple of `WIDTH`.
    unsafe fn load(&self, row: usize, col: usize) -> <Self::Elem as Scalar>::Reg;

    /// Returns `true` if the operand may refer to the matrix at address `addr`.
    fn can_alias(&self, addr: *const ()) -> bool;
    /// Returns `true` if the operand refers to the matrix at address `addr`.
    fn is_aliased(&self, addr: *const ()) -> bool;

    /// Reads the element at `(row, col)`, with bound checks.
    ///
    /// # Panics
    /// The function panics if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[track_caller]
    #[inline]
    fn read(&self, row: usize, col: usize) -> Self::Elem {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { self.read_unchecked(row, col) }
    }

    /// Evaluates the operand into a new matrix.
    #[inline]
    fn eval(&self) -> Mat<Self::Elem, Self::Order> {
        Mat::from_expr(self)
    }

    /// Returns a lazy transpose of the operand.
    #[inline]
    fn transpose(self) -> Transpose<Self>
    where
        Self: Sized,
    {
        Transpose::new(self)
    }
}

impl<M: DenseMatrix + ?Sized> DenseMatrix for &M {
    type Elem = M::Elem;
    type Order = M::Order;
    const SIMD: bool = M::SIMD;

    #[inline(always)]
    fn nrows(&self) -> usize {
        (**self).nrows()
    }
    #[inline(always)]
    fn ncols(&self) -> usize {
        (**self).ncols()
    }
    #[inline(always)]
    unsafe fn read_unchecked(&self, row: usize, col: usize) -> Self::Elem {
        (**self).read_unchecked(row, col)
    }
    #[inline(always)]
    unsafe fn load(&self, row: usize, col: usize) -> <Self::Elem as Scalar>::Reg {
        (**self).load(row, col)
    }
    #[inline(always)]
    fn can_alias(&self, addr: *const ()) -> bool {
        (**self).can_alias(addr)
    }
    #[inline(always)]
    fn is_aliased(&self, addr: *const ()) -> bool {
        (**self).is_aliased(addr)
    }
}

/// Raw description of a rectangular region of an owned matrix.
///
/// `rest` and `final_` split the extent along the contiguous axis into whole registers and a
/// partial tail. `aligned` is set when every lane of the region starts on a register boundary and
/// either ends on one as well or ends at the edge of the matrix, where aligned loads of the tail
/// stay inside the padding.
pub(crate) struct ViewImpl<T: Scalar, O: StorageOrder> {
    pub(crate) data: NonNull<T>,
    pub(crate) base: *const (),
    pub(crate) spacing: usize,
    pub(crate) matrix_nrows: usize,
    pub(crate) matrix_ncols: usize,
    pub(crate) row: usize,
    pub(crate) col: usize,
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
    pub(crate) rest: usize,
    pub(crate) final_: usize,
    pub(crate) aligned: bool,
    pub(crate) __marker: PhantomData<O>,
}

unsafe impl<T: Scalar, O: StorageOrder> Sync for ViewImpl<T, O> {}
unsafe impl<T: Scalar, O: StorageOrder> Send for ViewImpl<T, O> {}

impl<T: Scalar, O: StorageOrder> Copy for ViewImpl<T, O> {}
impl<T: Scalar, O: StorageOrder> Clone for ViewImpl<T, O> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Scalar, O: StorageOrder> ViewImpl<T, O> {
    /// # Safety
    /// `data` must point to the padded storage of a `matrix_nrows × matrix_ncols` matrix with lane
    /// stride `spacing`, and the region must lie inside the matrix.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub(crate) unsafe fn new(
        data: NonNull<T>,
        base: *const (),
        spacing: usize,
        matrix_nrows: usize,
        matrix_ncols: usize,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Self {
        debug_assert!(all(
            row <= matrix_nrows,
            col <= matrix_ncols,
            nrows <= matrix_nrows - row,
            ncols <= matrix_ncols - col,
        ));
        let (_, inner_start) = O::split(row, col);
        let inner_len = O::inner_dim(nrows, ncols);
        let matrix_inner = O::inner_dim(matrix_nrows, matrix_ncols);

        let rest = inner_len % T::WIDTH;
        let final_ = inner_len - rest;
        let aligned =
            inner_start % T::WIDTH == 0 && (inner_start + inner_len == matrix_inner || rest == 0);

        Self {
            data,
            base,
            spacing,
            matrix_nrows,
            matrix_ncols,
            row,
            col,
            nrows,
            ncols,
            rest,
            final_,
            aligned,
            __marker: PhantomData,
        }
    }

    /// Region at `(row, col)` relative to `self`, of shape `nrows × ncols`.
    ///
    /// # Safety
    /// The region must lie inside `self`.
    #[inline]
    pub(crate) unsafe fn sub(&self, row: usize, col: usize, nrows: usize, ncols: usize) -> Self {
        debug_assert!(all(
            row <= self.nrows,
            col <= self.ncols,
            nrows <= self.nrows - row,
            ncols <= self.ncols - col,
        ));
        Self::new(
            self.data,
            self.base,
            self.spacing,
            self.matrix_nrows,
            self.matrix_ncols,
            self.row + row,
            self.col + col,
            nrows,
            ncols,
        )
    }

    /// Region of the same shape as `self`, at `(row, col)` of the underlying matrix.
    ///
    /// # Safety
    /// The region must lie inside the matrix.
    #[inline]
    pub(crate) unsafe fn moved_to(&self, row: usize, col: usize) -> Self {
        Self::new(
            self.data,
            self.base,
            self.spacing,
            self.matrix_nrows,
            self.matrix_ncols,
            row,
            col,
            self.nrows,
            self.ncols,
        )
    }

    #[inline(always)]
    pub(crate) fn outer_len(&self) -> usize {
        O::outer_dim(self.nrows, self.ncols)
    }

    #[inline(always)]
    pub(crate) fn inner_len(&self) -> usize {
        O::inner_dim(self.nrows, self.ncols)
    }

    /// Pointer to the first element of lane `k` of the region.
    ///
    /// # Safety
    /// `k < self.outer_len()`.
    #[inline(always)]
    pub(crate) unsafe fn lane_ptr(&self, k: usize) -> *mut T {
        let (outer, inner) = O::split(self.row, self.col);
        self.data.as_ptr().add((outer + k) * self.spacing + inner)
    }

    /// Pointer to the element at `(i, j)` of the region.
    ///
    /// # Safety
    /// `i < self.nrows` and `j < self.ncols`.
    #[inline(always)]
    pub(crate) unsafe fn ptr_at(&self, i: usize, j: usize) -> *mut T {
        let (outer, inner) = O::split(self.row + i, self.col + j);
        self.data.as_ptr().add(outer * self.spacing + inner)
    }

    /// Register load at `(i, j)` of the region, following the contract of [`DenseMatrix::load`].
    ///
    /// # Safety
    /// Same requirements as [`DenseMatrix::load`].
    #[inline(always)]
    pub(crate) unsafe fn load(&self, i: usize, j: usize) -> T::Reg {
        let (k, jj) = O::split(i, j);
        debug_assert!(jj % T::WIDTH == 0);
        let ptr = self.lane_ptr(k).add(jj);
        if self.aligned {
            T::load(ptr)
        } else if jj != self.final_ {
            T::loadu(ptr)
        } else {
            T::loadu_partial(ptr, self.rest)
        }
    }

    /// Sets every element of the region to zero.
    ///
    /// # Safety
    /// The caller must have write access to the region.
    pub(crate) unsafe fn reset(&self) {
        let inner = self.inner_len();
        for k in 0..self.outer_len() {
            let lane = self.lane_ptr(k);
            for j in 0..inner {
                lane.add(j).write(T::zero());
            }
        }
    }

    /// Number of elements of the region that are not zero.
    #[inline]
    pub(crate) fn nonzeros(&self) -> usize {
        (0..self.outer_len()).map(|k| self.lane_nonzeros(k)).sum()
    }

    /// Number of elements of lane `k` that are not zero.
    #[track_caller]
    #[inline]
    pub(crate) fn lane_nonzeros(&self, k: usize) -> usize {
        assert!(k < self.outer_len());
        unsafe { core::slice::from_raw_parts(self.lane_ptr(k), self.inner_len()) }
            .iter()
            .filter(|x| !x.is_default())
            .count()
    }
}
