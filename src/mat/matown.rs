use super::{
    expr::{MatMul, Transpose},
    slice::check_region,
    Assignable, DenseMatrix, Submatrix, SubmatrixMut, ViewImpl,
};
use crate::{
    assert, debug_assert,
    kernel::{self, Assign, AssignOp, DivAssign, MulAssign},
    order::{RowMajor, StorageOrder},
    simd::{padded_len, Scalar},
    vector::{raw::capacity_overflow, Vector},
    DenseError,
};
use core::{marker::PhantomData, ptr::NonNull};

/// Heap allocated resizable matrix.
///
/// # Note
///
/// The matrix is stored as a sequence of lanes along the contiguous axis of `O`: rows for
/// [`RowMajor`], columns for [`ColMajor`](crate::ColMajor). Each lane is padded to a multiple of
/// the register width of `T`, and the padding always holds zeros, so that whole registers can be
/// read past the end of a lane.
///
/// Let us consider a row-major 3×3 matrix of `f64` with a register width of 2
///
/// ```notcode
///  0 │ 1 │ 2
/// ───┼───┼───
///  3 │ 4 │ 5
/// ───┼───┼───
///  6 │ 7 │ 8
/// ```
/// The memory holds:
///
/// ```notcode
/// 0 1 2 0 3 4 5 0 6 7 8 0
/// ```
pub struct Mat<T: Scalar, O: StorageOrder = RowMajor> {
    data: Vector<T>,
    nrows: usize,
    ncols: usize,
    spacing: usize,
    __marker: PhantomData<O>,
}

impl<T: Scalar, O: StorageOrder> Mat<T, O> {
    /// Returns an empty matrix of dimension `0×0`, without allocating.
    #[inline]
    pub const fn new() -> Self {
        Self {
            data: Vector::new(),
            nrows: 0,
            ncols: 0,
            spacing: 0,
            __marker: PhantomData,
        }
    }

    #[inline]
    fn layout(nrows: usize, ncols: usize) -> (usize, usize) {
        let spacing = padded_len::<T>(O::inner_dim(nrows, ncols)).unwrap_or_else(capacity_overflow);
        let len = O::outer_dim(nrows, ncols)
            .checked_mul(spacing)
            .unwrap_or_else(capacity_overflow);
        (spacing, len)
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with zeros.
    ///
    /// # Panics
    /// The function panics if the total capacity in bytes exceeds `isize::MAX`.
    #[inline]
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        let (spacing, len) = Self::layout(nrows, ncols);
        Self {
            data: Vector::zeros(len),
            nrows,
            ncols,
            spacing,
            __marker: PhantomData,
        }
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with `value`.
    #[inline]
    pub fn full(nrows: usize, ncols: usize, value: T) -> Self {
        let mut this = Self::zeros(nrows, ncols);
        this.fill(value);
        this
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with the provided function.
    #[inline]
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut this = Self::zeros(nrows, ncols);
        for k in 0..this.lane_count() {
            for (jj, x) in this.lane_mut(k).iter_mut().enumerate() {
                let (i, j) = O::join(k, jj);
                *x = f(i, j);
            }
        }
        this
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, with ones on the diagonal and zeros
    /// elsewhere.
    #[inline]
    pub fn identity(nrows: usize, ncols: usize) -> Self {
        let mut this = Self::zeros(nrows, ncols);
        for i in 0..Ord::min(nrows, ncols) {
            this.write(i, i, T::one());
        }
        this
    }

    /// Evaluates `src` into a new matrix, converting each element.
    pub fn from_expr<M: DenseMatrix + ?Sized>(src: &M) -> Self
    where
        T: From<M::Elem>,
    {
        let this = Self::zeros(src.nrows(), src.ncols());
        kernel::assign_dense::<T, O, M, Assign>(&this.raw_view(), src);
        this
    }

    /// Returns the number of rows of the matrix.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Returns the number of columns of the matrix.
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Returns the distance between the starts of two consecutive lanes, a multiple of the
    /// register width.
    #[inline(always)]
    pub fn spacing(&self) -> usize {
        self.spacing
    }

    /// Returns the number of lanes: rows for row-major storage, columns otherwise.
    #[inline(always)]
    pub fn lane_count(&self) -> usize {
        O::outer_dim(self.nrows, self.ncols)
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr()
    }

    #[inline(always)]
    fn offset(&self, row: usize, col: usize) -> usize {
        let (k, jj) = O::split(row, col);
        k * self.spacing + jj
    }

    #[inline]
    fn raw_view(&self) -> ViewImpl<T, O> {
        unsafe {
            ViewImpl::new(
                NonNull::new_unchecked(self.data.as_ptr() as *mut T),
                self as *const Self as *const (),
                self.spacing,
                self.nrows,
                self.ncols,
                0,
                0,
                self.nrows,
                self.ncols,
            )
        }
    }

    /// Reads the element at `(row, col)`, without bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn read_unchecked(&self, row: usize, col: usize) -> T {
        debug_assert!(all(row < self.nrows(), col < self.ncols()));
        self.data.read_unchecked(self.offset(row, col))
    }

    /// Reads the element at `(row, col)`, with bound checks.
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

    /// Writes `value` at `(row, col)`, without bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn write_unchecked(&mut self, row: usize, col: usize, value: T) {
        debug_assert!(all(row < self.nrows(), col < self.ncols()));
        let offset = self.offset(row, col);
        self.data.write_unchecked(offset, value)
    }

    /// Writes `value` at `(row, col)`, with bound checks.
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

    /// Returns lane `k` as a slice, without its padding.
    ///
    /// # Panics
    /// The function panics if `k >= self.lane_count()`.
    #[inline]
    #[track_caller]
    pub fn lane(&self, k: usize) -> &[T] {
        assert!(k < self.lane_count());
        let start = k * self.spacing;
        &self.data.as_slice()[start..start + O::inner_dim(self.nrows, self.ncols)]
    }

    /// Returns lane `k` as a mutable slice, without its padding.
    ///
    /// # Panics
    /// The function panics if `k >= self.lane_count()`.
    #[inline]
    #[track_caller]
    pub fn lane_mut(&mut self, k: usize) -> &mut [T] {
        assert!(k < self.lane_count());
        let start = k * self.spacing;
        let inner = O::inner_dim(self.nrows, self.ncols);
        &mut self.data.as_mut_slice()[start..start + inner]
    }

    /// Resizes the matrix to `(nrows, ncols)`.
    ///
    /// If `preserve` is `true`, the elements of the overlap of the old and new shapes keep their
    /// values. New elements are zero. Otherwise every element is zero after the call.
    pub fn resize(&mut self, nrows: usize, ncols: usize, preserve: bool) {
        if (nrows, ncols) == (self.nrows, self.ncols) {
            return;
        }
        let (spacing, len) = Self::layout(nrows, ncols);
        if preserve {
            let mut next = Self {
                data: Vector::zeros(len),
                nrows,
                ncols,
                spacing,
                __marker: PhantomData,
            };
            let outer = Ord::min(self.lane_count(), next.lane_count());
            let inner = Ord::min(
                O::inner_dim(self.nrows, self.ncols),
                O::inner_dim(nrows, ncols),
            );
            for k in 0..outer {
                next.lane_mut(k)[..inner].copy_from_slice(&self.lane(k)[..inner]);
            }
            *self = next;
        } else {
            self.data.clear();
            self.data.resize(len, false);
            self.nrows = nrows;
            self.ncols = ncols;
            self.spacing = spacing;
        }
    }

    /// Sets every element to zero. The shape is unchanged.
    #[inline]
    pub fn reset(&mut self) {
        self.data.reset()
    }

    /// Sets every element to `value`. The padding is left untouched.
    pub fn fill(&mut self, value: T) {
        for k in 0..self.lane_count() {
            self.lane_mut(k).fill(value);
        }
    }

    /// Returns the number of elements that are not zero.
    #[inline]
    pub fn nonzeros(&self) -> usize {
        self.raw_view().nonzeros()
    }

    fn apply_scalar<P: AssignOp>(&mut self, value: T) {
        let inner = O::inner_dim(self.nrows, self.ncols);
        let ptr = self.data.as_mut_ptr();
        for k in 0..self.lane_count() {
            // SAFETY: lanes start on a register boundary and hold `inner` elements before their
            // padding.
            unsafe { kernel::apply_scalar::<T, P>(ptr.add(k * self.spacing), inner, value) };
        }
    }

    /// Multiplies every element by `factor`, in place. The padding is left untouched.
    #[inline]
    pub fn scale(&mut self, factor: T) {
        self.apply_scalar::<MulAssign>(factor)
    }

    /// Divides every element by `divisor`, in place. The padding is left untouched.
    #[inline]
    #[track_caller]
    pub fn div_scalar(&mut self, divisor: T) {
        debug_assert!(divisor != T::zero());
        self.apply_scalar::<DivAssign>(divisor)
    }

    /// Swaps the contents of two matrices, without copying elements.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other)
    }

    /// Returns a lazy transpose of the matrix.
    #[inline]
    pub fn transpose(&self) -> Transpose<&Self> {
        Transpose::new(self)
    }

    /// Returns a view over the whole matrix.
    #[inline]
    pub fn as_submatrix(&self) -> Submatrix<'_, T, O> {
        unsafe { Submatrix::from_view(self.raw_view()) }
    }

    /// Returns a mutable view over the whole matrix.
    #[inline]
    pub fn as_submatrix_mut(&mut self) -> SubmatrixMut<'_, T, O> {
        unsafe { SubmatrixMut::from_view(self.raw_view()) }
    }

    /// Returns a view over the region of shape `nrows × ncols` starting at `(row, col)`, or an
    /// error if the region does not fit inside the matrix.
    #[inline]
    pub fn try_submatrix(
        &self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Submatrix<'_, T, O>, DenseError> {
        check_region(self.nrows, self.ncols, row, col, nrows, ncols)?;
        Ok(unsafe { Submatrix::from_view(self.raw_view().sub(row, col, nrows, ncols)) })
    }

    /// Returns a view over the region of shape `nrows × ncols` starting at `(row, col)`.
    ///
    /// # Panics
    /// The function panics if the region does not fit inside the matrix.
    #[inline]
    #[track_caller]
    pub fn submatrix(&self, row: usize, col: usize, nrows: usize, ncols: usize) -> Submatrix<'_, T, O> {
        match self.try_submatrix(row, col, nrows, ncols) {
            Ok(view) => view,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns a mutable view over the region of shape `nrows × ncols` starting at
    /// `(row, col)`, or an error if the region does not fit inside the matrix.
    #[inline]
    pub fn try_submatrix_mut(
        &mut self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<SubmatrixMut<'_, T, O>, DenseError> {
        check_region(self.nrows, self.ncols, row, col, nrows, ncols)?;
        Ok(unsafe { SubmatrixMut::from_view(self.raw_view().sub(row, col, nrows, ncols)) })
    }

    /// Returns a mutable view over the region of shape `nrows × ncols` starting at `(row, col)`.
    ///
    /// # Panics
    /// The function panics if the region does not fit inside the matrix.
    #[inline]
    #[track_caller]
    pub fn submatrix_mut(
        &mut self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> SubmatrixMut<'_, T, O> {
        match self.try_submatrix_mut(row, col, nrows, ncols) {
            Ok(view) => view,
            Err(err) => panic!("{err}"),
        }
    }

    /// Assigns `src` to the matrix, resizing it to the shape of `src` first.
    pub fn try_assign<S: Assignable<T, O> + ?Sized>(&mut self, src: &S) -> Result<(), DenseError> {
        let (nrows, ncols) = src.shape();
        self.resize(nrows, ncols, false);
        self.as_submatrix_mut().try_assign(src)
    }

    /// Adds `src` to the matrix.
    ///
    /// Returns an error without modifying the matrix if the shapes differ.
    #[inline]
    pub fn try_add_assign<S: Assignable<T, O> + ?Sized>(
        &mut self,
        src: &S,
    ) -> Result<(), DenseError> {
        self.as_submatrix_mut().try_add_assign(src)
    }

    /// Subtracts `src` from the matrix.
    ///
    /// Returns an error without modifying the matrix if the shapes differ.
    #[inline]
    pub fn try_sub_assign<S: Assignable<T, O> + ?Sized>(
        &mut self,
        src: &S,
    ) -> Result<(), DenseError> {
        self.as_submatrix_mut().try_sub_assign(src)
    }

    /// Replaces the matrix with its product by `rhs` on the right. The matrix takes the shape of
    /// the product.
    ///
    /// Returns an error without modifying the matrix if `rhs.nrows() != self.ncols()`.
    pub fn try_mul_assign<R: DenseMatrix<Elem = T> + ?Sized>(
        &mut self,
        rhs: &R,
    ) -> Result<(), DenseError> {
        if rhs.nrows() != self.ncols {
            return Err(DenseError::ShapeMismatch {
                expected: (self.ncols, rhs.ncols()),
                found: (rhs.nrows(), rhs.ncols()),
            });
        }
        let product = Self::from_expr(&MatMul::new(&*self, rhs));
        *self = product;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn padding_is_zero(&self) -> bool {
        let inner = O::inner_dim(self.nrows, self.ncols);
        let data = self.data.as_slice();
        (0..self.lane_count()).all(|k| {
            data[k * self.spacing + inner..(k + 1) * self.spacing]
                .iter()
                .all(|x| x.is_default())
        })
    }
}

impl<T: Scalar, O: StorageOrder> DenseMatrix for Mat<T, O> {
    type Elem = T;
    type Order = O;
    const SIMD: bool = T::SIMD;

    #[inline(always)]
    fn nrows(&self) -> usize {
        self.nrows
    }
    #[inline(always)]
    fn ncols(&self) -> usize {
        self.ncols
    }
    #[inline(always)]
    unsafe fn read_unchecked(&self, row: usize, col: usize) -> T {
        self.data.read_unchecked(self.offset(row, col))
    }
    #[inline(always)]
    unsafe fn load(&self, row: usize, col: usize) -> T::Reg {
        let offset = self.offset(row, col);
        debug_assert!(offset % T::WIDTH == 0);
        self.data.load(offset)
    }
    #[inline(always)]
    fn can_alias(&self, addr: *const ()) -> bool {
        self as *const Self as *const () == addr
    }
    #[inline(always)]
    fn is_aliased(&self, addr: *const ()) -> bool {
        self as *const Self as *const () == addr
    }
}

impl<T: Scalar, O: StorageOrder> Default for Mat<T, O> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, O: StorageOrder> Clone for Mat<T, O> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            nrows: self.nrows,
            ncols: self.ncols,
            spacing: self.spacing,
            __marker: PhantomData,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.data.clone_from(&source.data);
        self.nrows = source.nrows;
        self.ncols = source.ncols;
        self.spacing = source.spacing;
    }
}

impl<T: Scalar, O: StorageOrder> PartialEq for Mat<T, O> {
    fn eq(&self, other: &Self) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && (0..self.lane_count()).all(|k| self.lane(k) == other.lane(k))
    }
}

impl<T: Scalar, O: StorageOrder> core::ops::Index<(usize, usize)> for Mat<T, O> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(all(row < self.nrows(), col < self.ncols()));
        &self.data[self.offset(row, col)]
    }
}

impl<T: Scalar, O: StorageOrder> core::ops::IndexMut<(usize, usize)> for Mat<T, O> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(all(row < self.nrows(), col < self.ncols()));
        let offset = self.offset(row, col);
        &mut self.data[offset]
    }
}

impl<T: Scalar, O: StorageOrder> core::fmt::Debug for Mat<T, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.as_submatrix().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use crate::{assert, mat, ColMajor, DenseError, DenseMatrix, Mat, RowMajor};
    use assert_approx_eq::assert_approx_eq;
    use rand::random;

    #[test]
    fn create() {
        let a = Mat::<f64>::zeros(3, 5);
        assert!(all(a.nrows() == 3, a.ncols() == 5, a.nonzeros() == 0));
        assert!(a.spacing() % <f64 as crate::Scalar>::WIDTH == 0);
        assert!(a.spacing() >= 5);

        let b = Mat::<i32, ColMajor>::full(4, 2, 7);
        assert!(b.nonzeros() == 8);
        assert!(b.padding_is_zero());
        assert!(b.lane(1) == &[7, 7, 7, 7][..]);

        let c = Mat::<f32>::identity(3, 4);
        assert!(c.nonzeros() == 3);
        assert!(all(c.read(2, 2) == 1.0, c.read(2, 3) == 0.0));

        let e = Mat::<u64>::new();
        assert!(all(e.nrows() == 0, e.ncols() == 0));
        assert!(e == Mat::default());
    }

    #[test]
    fn from_fn_matches_layout() {
        let a = Mat::<f64, RowMajor>::from_fn(4, 3, |i, j| (10 * i + j) as f64);
        let b = Mat::<f64, ColMajor>::from_fn(4, 3, |i, j| (10 * i + j) as f64);
        for i in 0..4 {
            for j in 0..3 {
                assert!(all(a[(i, j)] == b[(i, j)], a.read(i, j) == (10 * i + j) as f64));
            }
        }
        assert!(a.lane(1) == &[10.0, 11.0, 12.0][..]);
        assert!(b.lane(1) == &[1.0, 11.0, 21.0, 31.0][..]);
        assert!(Mat::<f64, RowMajor>::from_expr(&b) == a);
    }

    #[test]
    fn resize_preserve() {
        let mut a = Mat::<f64>::from_fn(5, 6, |i, j| (i * 6 + j) as f64 + 1.0);
        let orig = a.clone();

        a.resize(3, 4, true);
        assert!(all(a.nrows() == 3, a.ncols() == 4));
        a.resize(5, 6, true);
        for i in 0..5 {
            for j in 0..6 {
                let expected = if i < 3 && j < 4 { orig.read(i, j) } else { 0.0 };
                assert!(a.read(i, j) == expected);
            }
        }
        assert!(a.padding_is_zero());

        a.resize(7, 9, false);
        assert!(a.nonzeros() == 0);
        assert!(a.padding_is_zero());
    }

    #[test]
    fn assign_resizes() {
        let src = Mat::<f32, ColMajor>::from_fn(7, 3, |_, _| random());
        let mut dst = Mat::<f32, ColMajor>::zeros(2, 2);
        dst.try_assign(&src).unwrap();
        assert!(dst == src);

        let mut other = Mat::<f32, RowMajor>::full(1, 1, 3.0);
        other.try_assign(&src).unwrap();
        assert!(all(other.nrows() == 7, other.ncols() == 3));
        for i in 0..7 {
            for j in 0..3 {
                assert!(other.read(i, j) == src.read(i, j));
            }
        }
        assert!(other.padding_is_zero());
    }

    #[test]
    fn compound_and_product() {
        let mut a = mat![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0f64]];
        let b = Mat::<f64>::full(3, 2, 1.0);
        a.try_add_assign(&b).unwrap();
        a.try_sub_assign(&b).unwrap();
        a.try_sub_assign(&b).unwrap();
        assert!(a == mat![[0.0, 1.0], [2.0, 3.0], [4.0, 5.0f64]]);

        let r = mat![[1.0, 0.0, 2.0], [0.0, 1.0, 0.0f64]];
        a.try_mul_assign(&r).unwrap();
        assert!(a == mat![[0.0, 1.0, 0.0], [2.0, 3.0, 4.0], [4.0, 5.0, 8.0f64]]);
        assert!(
            a.try_mul_assign(&r)
                == Err(DenseError::ShapeMismatch {
                    expected: (3, 3),
                    found: (2, 3)
                })
        );
        assert!(a.try_add_assign(&r).is_err());
        assert!(a.read(2, 2) == 8.0);
    }

    #[test]
    fn scale_and_divide() {
        let a = Mat::<f64, ColMajor>::from_fn(9, 5, |_, _| random::<f64>() + 1.0);
        let mut b = a.clone();
        b.scale(0.25);
        b.div_scalar(0.25);
        for i in 0..9 {
            for j in 0..5 {
                assert_approx_eq!(a.read(i, j), b.read(i, j));
            }
        }
        assert!(b.padding_is_zero());
    }

    #[test]
    fn non_finite_scaling_keeps_padding() {
        let mut a = Mat::<f64>::full(2, 3, 1.0);
        a.scale(f64::INFINITY);
        assert!(all(a.nonzeros() == 6, a.padding_is_zero()));
        assert!(a.read(1, 2) == f64::INFINITY);

        let mut b = Mat::<f32, ColMajor>::full(5, 3, 2.0);
        b.div_scalar(f32::NAN);
        assert!(b.padding_is_zero());
        assert!(b.read(4, 2).is_nan());

        let mut c = Mat::<f64>::full(3, 3, 1.0);
        c.scale(f64::NAN);
        c.resize(3, 4, true);
        assert!(all(c.read(0, 3) == 0.0, c.read(2, 3) == 0.0));
    }

    #[test]
    fn transpose_eval() {
        let a = Mat::<i64>::from_fn(3, 5, |i, j| (i * 5 + j) as i64);
        let t = Mat::transpose(&a).eval();
        assert!(all(t.nrows() == 5, t.ncols() == 3));
        for i in 0..3 {
            for j in 0..5 {
                assert!(t.read(j, i) == a.read(i, j));
            }
        }
    }

    #[test]
    fn swap_and_clone_from() {
        let mut a = Mat::<f64>::full(2, 3, 1.0);
        let mut b = Mat::<f64>::zeros(4, 1);
        a.swap(&mut b);
        assert!(all(a.nrows() == 4, b.nrows() == 2, b.nonzeros() == 6));

        a.clone_from(&b);
        assert!(a == b);
    }

    #[test]
    fn fill_and_reset() {
        let mut a = Mat::<u32>::zeros(3, 3);
        a.fill(2);
        a[(1, 1)] = 0;
        assert!(a.nonzeros() == 8);
        a.lane_mut(0).fill(0);
        assert!(a.nonzeros() == 5);
        a.reset();
        assert!(all(a.nonzeros() == 0, a.nrows() == 3));
    }

    #[test]
    #[should_panic]
    fn reading_past_the_last_column_should_panic() {
        let a = Mat::<f64>::zeros(2, 2);
        a.read(0, 2);
    }
}
