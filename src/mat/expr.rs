//! Lazy matrix expressions.
//!
//! The arithmetic operators on matrices and views do not compute anything. They build one of the
//! types below, which implement [`DenseMatrix`] by combining their operands element by element
//! (or register by register when every operand supports it). The work happens when the
//! expression is assigned to a destination, fused into the destination's kernel.

use super::DenseMatrix;
use crate::{assert, debug_assert, order::StorageOrder, simd::Scalar};

/// Builds a register from `WIDTH` element reads along the contiguous axis of `M::Order`,
/// with zeros past the extent of `m`.
///
/// # Safety
/// Same requirements as [`DenseMatrix::load`].
#[inline]
pub(crate) unsafe fn gather<M: DenseMatrix + ?Sized>(
    m: &M,
    row: usize,
    col: usize,
) -> <M::Elem as Scalar>::Reg {
    let w = <M::Elem as Scalar>::WIDTH;
    let (outer, inner) = <M::Order as StorageOrder>::split(row, col);
    let inner_len = <M::Order as StorageOrder>::inner_dim(m.nrows(), m.ncols());
    let count = Ord::min(w, inner_len - inner);

    let mut buf = [<M::Elem as num_traits::Zero>::zero(); 8];
    debug_assert!(w <= buf.len());
    for (l, x) in buf[..count].iter_mut().enumerate() {
        let (i, j) = <M::Order as StorageOrder>::join(outer, inner + l);
        *x = m.read_unchecked(i, j);
    }
    <M::Elem as Scalar>::loadu(buf.as_ptr())
}

/// Lazy sum of two matrices of the same shape.
#[derive(Copy, Clone, Debug)]
pub struct MatAdd<A, B> {
    pub(crate) lhs: A,
    pub(crate) rhs: B,
}

/// Lazy difference of two matrices of the same shape.
#[derive(Copy, Clone, Debug)]
pub struct MatSub<A, B> {
    pub(crate) lhs: A,
    pub(crate) rhs: B,
}

/// Lazy product of a matrix and a scalar.
#[derive(Copy, Clone, Debug)]
pub struct MatScale<M, T> {
    pub(crate) inner: M,
    pub(crate) factor: T,
}

/// Lazy quotient of a matrix by a scalar.
#[derive(Copy, Clone, Debug)]
pub struct MatDiv<M, T> {
    pub(crate) inner: M,
    pub(crate) divisor: T,
}

/// Lazy matrix product.
#[derive(Copy, Clone, Debug)]
pub struct MatMul<A, B> {
    pub(crate) lhs: A,
    pub(crate) rhs: B,
}

/// Lazy transpose.
#[derive(Copy, Clone, Debug)]
pub struct Transpose<M> {
    pub(crate) inner: M,
}

macro_rules! impl_elementwise {
    ($name: ident, $op: tt, $simd_op: ident) => {
        impl<A: DenseMatrix, B: DenseMatrix<Elem = A::Elem>> $name<A, B> {
            /// Creates the expression.
            ///
            /// # Panics
            /// The function panics if the operands have different shapes.
            #[track_caller]
            #[inline]
            pub fn new(lhs: A, rhs: B) -> Self {
                assert!(all(lhs.nrows() == rhs.nrows(), lhs.ncols() == rhs.ncols()));
                Self { lhs, rhs }
            }

            #[inline]
            pub fn lhs(&self) -> &A {
                &self.lhs
            }

            #[inline]
            pub fn rhs(&self) -> &B {
                &self.rhs
            }
        }

        impl<A: DenseMatrix, B: DenseMatrix<Elem = A::Elem>> DenseMatrix for $name<A, B> {
            type Elem = A::Elem;
            type Order = A::Order;
            const SIMD: bool = A::SIMD
                && B::SIMD
                && <A::Elem as Scalar>::SIMD_ADD
                && <A::Order as StorageOrder>::ROW_MAJOR == <B::Order as StorageOrder>::ROW_MAJOR;

            #[inline(always)]
            fn nrows(&self) -> usize {
                self.lhs.nrows()
            }
            #[inline(always)]
            fn ncols(&self) -> usize {
                self.lhs.ncols()
            }
            #[inline(always)]
            unsafe fn read_unchecked(&self, row: usize, col: usize) -> Self::Elem {
                self.lhs.read_unchecked(row, col) $op self.rhs.read_unchecked(row, col)
            }
            #[inline(always)]
            unsafe fn load(&self, row: usize, col: usize) -> <Self::Elem as Scalar>::Reg {
                if Self::SIMD {
                    <A::Elem as Scalar>::$simd_op(self.lhs.load(row, col), self.rhs.load(row, col))
                } else {
                    gather(self, row, col)
                }
            }
            #[inline(always)]
            fn can_alias(&self, addr: *const ()) -> bool {
                self.lhs.can_alias(addr) || self.rhs.can_alias(addr)
            }
            #[inline(always)]
            fn is_aliased(&self, addr: *const ()) -> bool {
                self.lhs.is_aliased(addr) || self.rhs.is_aliased(addr)
            }
        }
    };
}

impl_elementwise!(MatAdd, +, add_reg);
impl_elementwise!(MatSub, -, sub_reg);

impl<M: DenseMatrix> MatScale<M, M::Elem> {
    #[inline]
    pub fn new(inner: M, factor: M::Elem) -> Self {
        Self { inner, factor }
    }

    #[inline]
    pub fn factor(&self) -> M::Elem {
        self.factor
    }
}

impl<M: DenseMatrix> DenseMatrix for MatScale<M, M::Elem> {
    type Elem = M::Elem;
    type Order = M::Order;
    const SIMD: bool = M::SIMD && <M::Elem as Scalar>::SIMD_MUL;

    #[inline(always)]
    fn nrows(&self) -> usize {
        self.inner.nrows()
    }
    #[inline(always)]
    fn ncols(&self) -> usize {
        self.inner.ncols()
    }
    #[inline(always)]
    unsafe fn read_unchecked(&self, row: usize, col: usize) -> Self::Elem {
        self.inner.read_unchecked(row, col) * self.factor
    }
    #[inline(always)]
    unsafe fn load(&self, row: usize, col: usize) -> <Self::Elem as Scalar>::Reg {
        if Self::SIMD {
            <M::Elem as Scalar>::mul_reg(
                self.inner.load(row, col),
                <M::Elem as Scalar>::splat(self.factor),
            )
        } else {
            gather(self, row, col)
        }
    }
    #[inline(always)]
    fn can_alias(&self, addr: *const ()) -> bool {
        self.inner.can_alias(addr)
    }
    #[inline(always)]
    fn is_aliased(&self, addr: *const ()) -> bool {
        self.inner.is_aliased(addr)
    }
}

impl<M: DenseMatrix> MatDiv<M, M::Elem> {
    #[track_caller]
    #[inline]
    pub fn new(inner: M, divisor: M::Elem) -> Self {
        debug_assert!(divisor != <M::Elem as num_traits::Zero>::zero());
        Self { inner, divisor }
    }

    #[inline]
    pub fn divisor(&self) -> M::Elem {
        self.divisor
    }
}

impl<M: DenseMatrix> DenseMatrix for MatDiv<M, M::Elem> {
    type Elem = M::Elem;
    type Order = M::Order;
    const SIMD: bool = M::SIMD && <M::Elem as Scalar>::SIMD_DIV;

    #[inline(always)]
    fn nrows(&self) -> usize {
        self.inner.nrows()
    }
    #[inline(always)]
    fn ncols(&self) -> usize {
        self.inner.ncols()
    }
    #[inline(always)]
    unsafe fn read_unchecked(&self, row: usize, col: usize) -> Self::Elem {
        self.inner.read_unchecked(row, col) / self.divisor
    }
    #[inline(always)]
    unsafe fn load(&self, row: usize, col: usize) -> <Self::Elem as Scalar>::Reg {
        if Self::SIMD {
            <M::Elem as Scalar>::div_reg(
                self.inner.load(row, col),
                <M::Elem as Scalar>::splat(self.divisor),
            )
        } else {
            gather(self, row, col)
        }
    }
    #[inline(always)]
    fn can_alias(&self, addr: *const ()) -> bool {
        self.inner.can_alias(addr)
    }
    #[inline(always)]
    fn is_aliased(&self, addr: *const ()) -> bool {
        self.inner.is_aliased(addr)
    }
}

impl<A: DenseMatrix, B: DenseMatrix<Elem = A::Elem>> MatMul<A, B> {
    /// Creates the product expression.
    ///
    /// # Panics
    /// The function panics if `lhs.ncols() != rhs.nrows()`.
    #[track_caller]
    #[inline]
    pub fn new(lhs: A, rhs: B) -> Self {
        assert!(lhs.ncols() == rhs.nrows());
        Self { lhs, rhs }
    }

    #[inline]
    pub fn lhs(&self) -> &A {
        &self.lhs
    }

    #[inline]
    pub fn rhs(&self) -> &B {
        &self.rhs
    }
}

impl<A: DenseMatrix, B: DenseMatrix<Elem = A::Elem>> DenseMatrix for MatMul<A, B> {
    type Elem = A::Elem;
    type Order = A::Order;
    const SIMD: bool = false;

    #[inline(always)]
    fn nrows(&self) -> usize {
        self.lhs.nrows()
    }
    #[inline(always)]
    fn ncols(&self) -> usize {
        self.rhs.ncols()
    }
    #[inline]
    unsafe fn read_unchecked(&self, row: usize, col: usize) -> Self::Elem {
        let mut acc = <A::Elem as num_traits::Zero>::zero();
        for k in 0..self.lhs.ncols() {
            acc += self.lhs.read_unchecked(row, k) * self.rhs.read_unchecked(k, col);
        }
        acc
    }
    #[inline]
    unsafe fn load(&self, row: usize, col: usize) -> <Self::Elem as Scalar>::Reg {
        gather(self, row, col)
    }
    #[inline(always)]
    fn can_alias(&self, addr: *const ()) -> bool {
        self.lhs.can_alias(addr) || self.rhs.can_alias(addr)
    }
    #[inline(always)]
    fn is_aliased(&self, addr: *const ()) -> bool {
        self.lhs.is_aliased(addr) || self.rhs.is_aliased(addr)
    }
}

impl<M: DenseMatrix> Transpose<M> {
    #[inline]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    /// Returns the transposed operand.
    #[inline]
    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: DenseMatrix> DenseMatrix for Transpose<M> {
    type Elem = M::Elem;
    type Order = <M::Order as StorageOrder>::Flip;
    const SIMD: bool = M::SIMD;

    #[inline(always)]
    fn nrows(&self) -> usize {
        self.inner.ncols()
    }
    #[inline(always)]
    fn ncols(&self) -> usize {
        self.inner.nrows()
    }
    #[inline(always)]
    unsafe fn read_unchecked(&self, row: usize, col: usize) -> Self::Elem {
        self.inner.read_unchecked(col, row)
    }
    #[inline(always)]
    unsafe fn load(&self, row: usize, col: usize) -> <Self::Elem as Scalar>::Reg {
        self.inner.load(col, row)
    }
    #[inline(always)]
    fn can_alias(&self, addr: *const ()) -> bool {
        self.inner.can_alias(addr)
    }
    #[inline(always)]
    fn is_aliased(&self, addr: *const ()) -> bool {
        self.inner.is_aliased(addr)
    }
}

#[cfg(test)]
mod tests {
    use crate::{assert, mat, scale, ColMajor, DenseMatrix, Mat};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn elementwise_expressions() {
        let a = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0f64]];
        let b = mat![[0.5, 0.5, 0.5], [1.0, 1.0, 1.0f64]];

        let sum = (&a + &b).eval();
        let diff = (&a - &b).eval();
        let scaled = (&a * scale(2.0f64)).eval();
        let halved = (&a / scale(2.0f64)).eval();
        for i in 0..2 {
            for j in 0..3 {
                assert!(sum.read(i, j) == a.read(i, j) + b.read(i, j));
                assert!(diff.read(i, j) == a.read(i, j) - b.read(i, j));
                assert!(scaled.read(i, j) == 2.0 * a.read(i, j));
                assert!(halved.read(i, j) == a.read(i, j) / 2.0);
            }
        }
    }

    #[test]
    fn product_and_transpose() {
        let a = mat![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0f64]];
        let b = mat![[1.0, 0.0, -1.0], [2.0, 1.0, 0.0f64]];

        let c = (&a * &b).eval();
        assert!(all(c.nrows() == 3, c.ncols() == 3));
        let expected = mat![[5.0, 2.0, -1.0], [11.0, 4.0, -3.0], [17.0, 6.0, -5.0f64]];
        for i in 0..3 {
            for j in 0..3 {
                assert_approx_eq!(c.read(i, j), expected.read(i, j));
            }
        }

        let t: Mat<f64, ColMajor> = (&a).transpose().eval();
        assert!(all(t.nrows() == 2, t.ncols() == 3));
        for i in 0..2 {
            for j in 0..3 {
                assert!(t.read(i, j) == a.read(j, i));
            }
        }
    }

    #[test]
    fn integer_product_uses_gather() {
        let a = Mat::<i64>::from_fn(3, 5, |i, j| (i * 5 + j) as i64);
        let id = Mat::<i64>::identity(5, 5);
        let c = (&a * &id).eval();
        assert!(c == a);

        let scaled = (&a * scale(3i64)).eval();
        assert!(scaled.read(2, 4) == 42);
    }

    #[test]
    #[should_panic]
    fn test_adding_matrices_of_different_sizes_should_panic() {
        let a = mat![[1.0, 2.0], [3.0, 4.0f64]];
        let b = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0f64]];
        _ = &a + &b;
    }

    #[test]
    #[should_panic]
    fn test_multiplying_incompatible_matrices_should_panic() {
        let a = mat![[1.0, 2.0], [3.0, 4.0f64]];
        let b = mat![[1.0, 2.0, 3.0f64]];
        _ = &a * &b;
    }
}
