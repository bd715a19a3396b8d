use super::{
    expr::{MatAdd, MatDiv, MatMul, MatScale, MatSub, Transpose},
    Assignable, DenseMatrix, Mat, Submatrix, SubmatrixMut,
};
use crate::{order::StorageOrder, simd::Scalar, Scale};
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

macro_rules! impl_expr_ops {
    ({$($gen: tt)*} $lhs: ty => $elem: ty) => {
        impl<$($gen)*, Rhs: DenseMatrix<Elem = $elem>> Add<Rhs> for $lhs {
            type Output = MatAdd<Self, Rhs>;

            #[track_caller]
            #[inline]
            fn add(self, rhs: Rhs) -> Self::Output {
                MatAdd::new(self, rhs)
            }
        }

        impl<$($gen)*, Rhs: DenseMatrix<Elem = $elem>> Sub<Rhs> for $lhs {
            type Output = MatSub<Self, Rhs>;

            #[track_caller]
            #[inline]
            fn sub(self, rhs: Rhs) -> Self::Output {
                MatSub::new(self, rhs)
            }
        }

        impl<$($gen)*, Rhs: DenseMatrix<Elem = $elem>> Mul<Rhs> for $lhs {
            type Output = MatMul<Self, Rhs>;

            #[track_caller]
            #[inline]
            fn mul(self, rhs: Rhs) -> Self::Output {
                MatMul::new(self, rhs)
            }
        }

        impl<$($gen)*> Mul<Scale<$elem>> for $lhs {
            type Output = MatScale<Self, $elem>;

            #[inline]
            fn mul(self, rhs: Scale<$elem>) -> Self::Output {
                MatScale::new(self, rhs.value())
            }
        }

        impl<$($gen)*> Div<Scale<$elem>> for $lhs {
            type Output = MatDiv<Self, $elem>;

            #[track_caller]
            #[inline]
            fn div(self, rhs: Scale<$elem>) -> Self::Output {
                MatDiv::new(self, rhs.value())
            }
        }
    };
}

impl_expr_ops!({'a, T: Scalar, O: StorageOrder} &'a Mat<T, O> => T);
impl_expr_ops!({'a, T: Scalar, O: StorageOrder} Submatrix<'a, T, O> => T);
impl_expr_ops!({'a, 'b, T: Scalar, O: StorageOrder} &'a SubmatrixMut<'b, T, O> => T);
impl_expr_ops!({A: DenseMatrix, B: DenseMatrix<Elem = A::Elem>} MatAdd<A, B> => A::Elem);
impl_expr_ops!({A: DenseMatrix, B: DenseMatrix<Elem = A::Elem>} MatSub<A, B> => A::Elem);
impl_expr_ops!({A: DenseMatrix, B: DenseMatrix<Elem = A::Elem>} MatMul<A, B> => A::Elem);
impl_expr_ops!({M: DenseMatrix} MatScale<M, M::Elem> => M::Elem);
impl_expr_ops!({M: DenseMatrix} MatDiv<M, M::Elem> => M::Elem);
impl_expr_ops!({M: DenseMatrix} Transpose<M> => M::Elem);

macro_rules! impl_assign_ops {
    ({$($gen: tt)*} $dst: ty => $elem: ty, $order: ty) => {
        impl<$($gen)*, S: Assignable<$elem, $order> + ?Sized> AddAssign<&S> for $dst {
            #[track_caller]
            fn add_assign(&mut self, rhs: &S) {
                if let Err(err) = self.try_add_assign(rhs) {
                    panic!("{err}");
                }
            }
        }

        impl<$($gen)*, S: Assignable<$elem, $order> + ?Sized> SubAssign<&S> for $dst {
            #[track_caller]
            fn sub_assign(&mut self, rhs: &S) {
                if let Err(err) = self.try_sub_assign(rhs) {
                    panic!("{err}");
                }
            }
        }

        impl<$($gen)*, R: DenseMatrix<Elem = $elem> + ?Sized> MulAssign<&R> for $dst {
            #[track_caller]
            fn mul_assign(&mut self, rhs: &R) {
                if let Err(err) = self.try_mul_assign(rhs) {
                    panic!("{err}");
                }
            }
        }
    };
}

impl_assign_ops!({T: Scalar, O: StorageOrder} Mat<T, O> => T, O);
impl_assign_ops!({'a, T: Scalar, O: StorageOrder} SubmatrixMut<'a, T, O> => T, O);

impl<T: Scalar, O: StorageOrder> MulAssign<Scale<T>> for Mat<T, O> {
    #[inline]
    fn mul_assign(&mut self, rhs: Scale<T>) {
        self.scale(rhs.value())
    }
}

impl<T: Scalar, O: StorageOrder> DivAssign<Scale<T>> for Mat<T, O> {
    #[inline]
    #[track_caller]
    fn div_assign(&mut self, rhs: Scale<T>) {
        self.div_scalar(rhs.value())
    }
}

impl<T: Scalar, O: StorageOrder> MulAssign<Scale<T>> for SubmatrixMut<'_, T, O> {
    #[inline]
    fn mul_assign(&mut self, rhs: Scale<T>) {
        self.mul_assign_scalar(rhs.value())
    }
}

impl<T: Scalar, O: StorageOrder> DivAssign<Scale<T>> for SubmatrixMut<'_, T, O> {
    #[inline]
    #[track_caller]
    fn div_assign(&mut self, rhs: Scale<T>) {
        self.div_assign_scalar(rhs.value())
    }
}
