//! Region selection on matrices, views and expressions.
//!
//! Taking a region of an expression yields the same expression built over regions of its
//! operands, so only the selected elements are ever computed.

use super::{
    expr::{MatAdd, MatDiv, MatMul, MatScale, MatSub, Transpose},
    DenseMatrix, Mat, Submatrix, SubmatrixMut,
};
use crate::{order::StorageOrder, simd::Scalar, DenseError};

/// Checks that the region of shape `nrows × ncols` at `(row, col)` lies inside a
/// `matrix_nrows × matrix_ncols` matrix.
#[inline]
pub(crate) fn check_region(
    matrix_nrows: usize,
    matrix_ncols: usize,
    row: usize,
    col: usize,
    nrows: usize,
    ncols: usize,
) -> Result<(), DenseError> {
    if row <= matrix_nrows
        && nrows <= matrix_nrows - row
        && col <= matrix_ncols
        && ncols <= matrix_ncols - col
    {
        Ok(())
    } else {
        Err(DenseError::InvalidSubmatrix {
            row,
            col,
            nrows,
            ncols,
            matrix_nrows,
            matrix_ncols,
        })
    }
}

/// Operand from which a rectangular region can be selected.
pub trait SubmatrixExpr: Sized {
    /// Type of the selected region.
    type Output;

    /// Selects the region of shape `nrows × ncols` starting at `(row, col)`, or returns an error
    /// if it does not fit.
    fn try_submatrix(
        self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self::Output, DenseError>;
}

/// Selects the region of shape `nrows × ncols` starting at `(row, col)` of `expr`, or returns an
/// error if it does not fit.
#[inline]
pub fn try_submatrix<E: SubmatrixExpr>(
    expr: E,
    row: usize,
    col: usize,
    nrows: usize,
    ncols: usize,
) -> Result<E::Output, DenseError> {
    expr.try_submatrix(row, col, nrows, ncols)
}

/// Selects the region of shape `nrows × ncols` starting at `(row, col)` of `expr`.
///
/// # Panics
/// The function panics if the region does not fit inside `expr`.
///
/// # Example
/// ```
/// use densa::{mat, submatrix, DenseMatrix};
///
/// let a = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0f64]];
/// let b = mat![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0f64]];
///
/// let s = submatrix(&a + &b, 1, 1, 1, 2);
/// assert_eq!(s.eval(), mat![[6.0, 7.0f64]]);
/// ```
#[inline]
#[track_caller]
pub fn submatrix<E: SubmatrixExpr>(
    expr: E,
    row: usize,
    col: usize,
    nrows: usize,
    ncols: usize,
) -> E::Output {
    match expr.try_submatrix(row, col, nrows, ncols) {
        Ok(out) => out,
        Err(err) => panic!("{err}"),
    }
}

impl<'a, T: Scalar, O: StorageOrder> SubmatrixExpr for &'a Mat<T, O> {
    type Output = Submatrix<'a, T, O>;

    #[inline]
    fn try_submatrix(
        self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self::Output, DenseError> {
        Mat::try_submatrix(self, row, col, nrows, ncols)
    }
}

impl<'a, T: Scalar, O: StorageOrder> SubmatrixExpr for &'a mut Mat<T, O> {
    type Output = SubmatrixMut<'a, T, O>;

    #[inline]
    fn try_submatrix(
        self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self::Output, DenseError> {
        self.try_submatrix_mut(row, col, nrows, ncols)
    }
}

impl<'a, T: Scalar, O: StorageOrder> SubmatrixExpr for Submatrix<'a, T, O> {
    type Output = Submatrix<'a, T, O>;

    #[inline]
    fn try_submatrix(
        self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self::Output, DenseError> {
        Submatrix::try_submatrix(self, row, col, nrows, ncols)
    }
}

impl<'a, T: Scalar, O: StorageOrder> SubmatrixExpr for SubmatrixMut<'a, T, O> {
    type Output = SubmatrixMut<'a, T, O>;

    #[inline]
    fn try_submatrix(
        self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self::Output, DenseError> {
        self.try_submatrix_mut(row, col, nrows, ncols)
    }
}

macro_rules! impl_elementwise_slice {
    ($name: ident) => {
        impl<A, B> SubmatrixExpr for $name<A, B>
        where
            A: DenseMatrix + SubmatrixExpr,
            B: DenseMatrix<Elem = A::Elem> + SubmatrixExpr,
            A::Output: DenseMatrix,
            B::Output: DenseMatrix<Elem = <A::Output as DenseMatrix>::Elem>,
        {
            type Output = $name<A::Output, B::Output>;

            #[inline]
            fn try_submatrix(
                self,
                row: usize,
                col: usize,
                nrows: usize,
                ncols: usize,
            ) -> Result<Self::Output, DenseError> {
                check_region(self.nrows(), self.ncols(), row, col, nrows, ncols)?;
                let lhs = self.lhs.try_submatrix(row, col, nrows, ncols)?;
                let rhs = self.rhs.try_submatrix(row, col, nrows, ncols)?;
                Ok($name::new(lhs, rhs))
            }
        }
    };
}

impl_elementwise_slice!(MatAdd);
impl_elementwise_slice!(MatSub);

impl<M> SubmatrixExpr for MatScale<M, M::Elem>
where
    M: DenseMatrix + SubmatrixExpr,
    M::Output: DenseMatrix<Elem = M::Elem>,
{
    type Output = MatScale<M::Output, M::Elem>;

    #[inline]
    fn try_submatrix(
        self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self::Output, DenseError> {
        let factor = self.factor;
        Ok(MatScale::new(
            self.inner.try_submatrix(row, col, nrows, ncols)?,
            factor,
        ))
    }
}

impl<M> SubmatrixExpr for MatDiv<M, M::Elem>
where
    M: DenseMatrix + SubmatrixExpr,
    M::Output: DenseMatrix<Elem = M::Elem>,
{
    type Output = MatDiv<M::Output, M::Elem>;

    #[inline]
    fn try_submatrix(
        self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self::Output, DenseError> {
        let divisor = self.divisor;
        Ok(MatDiv {
            inner: self.inner.try_submatrix(row, col, nrows, ncols)?,
            divisor,
        })
    }
}

impl<A, B> SubmatrixExpr for MatMul<A, B>
where
    A: DenseMatrix + SubmatrixExpr,
    B: DenseMatrix<Elem = A::Elem> + SubmatrixExpr,
    A::Output: DenseMatrix,
    B::Output: DenseMatrix<Elem = <A::Output as DenseMatrix>::Elem>,
{
    type Output = MatMul<A::Output, B::Output>;

    #[inline]
    fn try_submatrix(
        self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self::Output, DenseError> {
        check_region(self.nrows(), self.ncols(), row, col, nrows, ncols)?;
        let inner = self.lhs.ncols();
        let lhs = self.lhs.try_submatrix(row, 0, nrows, inner)?;
        let rhs = self.rhs.try_submatrix(0, col, inner, ncols)?;
        Ok(MatMul::new(lhs, rhs))
    }
}

impl<M> SubmatrixExpr for Transpose<M>
where
    M: DenseMatrix + SubmatrixExpr,
    M::Output: DenseMatrix,
{
    type Output = Transpose<M::Output>;

    #[inline]
    fn try_submatrix(
        self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self::Output, DenseError> {
        check_region(self.nrows(), self.ncols(), row, col, nrows, ncols)
            .and_then(|()| self.inner.try_submatrix(col, row, ncols, nrows))
            .map(Transpose::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, mat, scale, ColMajor};

    #[test]
    fn region_checks() {
        assert!(check_region(3, 4, 0, 0, 3, 4).is_ok());
        assert!(check_region(3, 4, 3, 4, 0, 0).is_ok());
        assert!(check_region(3, 4, 1, 0, 3, 1).is_err());
        assert!(check_region(3, 4, 4, 0, 0, 0).is_err());
        assert!(check_region(3, 4, 1, 1, usize::MAX, 1).is_err());
        assert!(
            check_region(2, 2, 1, 1, 2, 1)
                == Err(DenseError::InvalidSubmatrix {
                    row: 1,
                    col: 1,
                    nrows: 2,
                    ncols: 1,
                    matrix_nrows: 2,
                    matrix_ncols: 2,
                })
        );
    }

    #[test]
    fn regions_of_expressions() {
        let a = Mat::<f64>::from_fn(6, 7, |i, j| (i * 7 + j) as f64);
        let b = Mat::<f64>::from_fn(6, 7, |i, j| (i + j) as f64 * 0.5);
        let full = (&a - &b * scale(2.0f64)).eval();

        let region = submatrix(&a - &b * scale(2.0f64), 2, 3, 3, 4).eval();
        assert!(region == full.submatrix(2, 3, 3, 4).to_owned());

        let halved = submatrix(&a / scale(2.0f64), 1, 1, 2, 2).eval();
        assert!(halved.read(0, 0) == a.read(1, 1) / 2.0);

        assert!(try_submatrix(&a + &b, 5, 0, 2, 1).is_err());
        assert!(try_submatrix(&a + &b, 0, 0, 6, 7).is_ok());
    }

    #[test]
    fn regions_of_products_and_transposes() {
        let a = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0f64]];
        let b = mat![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0f64]];
        let product = (&a * &b).eval();
        assert!(product == mat![[4.0, 5.0], [10.0, 11.0f64]]);

        let corner = submatrix(&a * &b, 1, 1, 1, 1).eval();
        assert!(corner.read(0, 0) == 11.0);

        let t = submatrix((&a).transpose(), 1, 0, 2, 2).eval();
        assert!(t == Mat::<f64, ColMajor>::from_fn(2, 2, |i, j| a.read(j, i + 1)));
        assert!(try_submatrix((&a).transpose(), 0, 0, 2, 3).is_err());
    }

    #[test]
    fn mutable_region_of_matrix() {
        let mut a = Mat::<i64>::zeros(4, 4);
        let mut view = submatrix(&mut a, 1, 1, 2, 2);
        view.fill(3);
        let inner = submatrix(view, 1, 1, 1, 1);
        assert!(inner.read(0, 0) == 3);
        assert!(a.nonzeros() == 4);
    }

    #[test]
    #[should_panic]
    fn selecting_region_past_the_end_should_panic() {
        let a = Mat::<f32>::zeros(2, 2);
        submatrix(&a, 1, 1, 2, 1);
    }
}
