use super::{DenseVector, VecAdd, VecScale, VecSub, Vector, VectorAssignable};
use crate::{simd::Scalar, Scale};
use core::ops::{Add, AddAssign, DivAssign, Mul, MulAssign, Sub, SubAssign};

macro_rules! impl_assign_op {
    ($trait: ident, $method: ident, $try_method: ident) => {
        impl<T: Scalar, S: VectorAssignable<T> + ?Sized> $trait<&S> for Vector<T> {
            #[track_caller]
            fn $method(&mut self, other: &S) {
                if let Err(err) = self.$try_method(other) {
                    panic!("{err}");
                }
            }
        }

        impl<T: Scalar> $trait<Vector<T>> for Vector<T> {
            #[track_caller]
            fn $method(&mut self, other: Vector<T>) {
                self.$method(&other)
            }
        }
    };
}

impl_assign_op!(AddAssign, add_assign, try_add_assign);
impl_assign_op!(SubAssign, sub_assign, try_sub_assign);
impl_assign_op!(MulAssign, mul_assign, try_mul_assign);

impl<T: Scalar> Add<Vector<T>> for Vector<T> {
    type Output = Vector<T>;
    #[track_caller]
    fn add(mut self, other: Vector<T>) -> Vector<T> {
        self += &other;
        self
    }
}

impl<T: Scalar> Sub<Vector<T>> for Vector<T> {
    type Output = Vector<T>;
    #[track_caller]
    fn sub(mut self, other: Vector<T>) -> Vector<T> {
        self -= &other;
        self
    }
}

// arithmetic on borrowed vectors and on expressions stays lazy
macro_rules! impl_expr_ops {
    ({$($gen: tt)*} $lhs: ty => $elem: ty) => {
        impl<$($gen)*, Rhs: DenseVector<Elem = $elem>> Add<Rhs> for $lhs {
            type Output = VecAdd<Self, Rhs>;
            #[track_caller]
            #[inline]
            fn add(self, rhs: Rhs) -> Self::Output {
                VecAdd::new(self, rhs)
            }
        }

        impl<$($gen)*, Rhs: DenseVector<Elem = $elem>> Sub<Rhs> for $lhs {
            type Output = VecSub<Self, Rhs>;
            #[track_caller]
            #[inline]
            fn sub(self, rhs: Rhs) -> Self::Output {
                VecSub::new(self, rhs)
            }
        }

        impl<$($gen)*> Mul<Scale<$elem>> for $lhs {
            type Output = VecScale<Self, $elem>;
            #[inline]
            fn mul(self, rhs: Scale<$elem>) -> Self::Output {
                VecScale::new(self, rhs.value())
            }
        }
    };
}

impl_expr_ops!({'a, T: Scalar} &'a Vector<T> => T);
impl_expr_ops!({A: DenseVector, B: DenseVector<Elem = A::Elem>} VecAdd<A, B> => A::Elem);
impl_expr_ops!({A: DenseVector, B: DenseVector<Elem = A::Elem>} VecSub<A, B> => A::Elem);
impl_expr_ops!({V: DenseVector} VecScale<V, V::Elem> => V::Elem);

impl<T: Scalar> MulAssign<Scale<T>> for Vector<T> {
    #[inline]
    fn mul_assign(&mut self, rhs: Scale<T>) {
        self.scale(rhs.value())
    }
}

impl<T: Scalar> DivAssign<Scale<T>> for Vector<T> {
    #[inline]
    #[track_caller]
    fn div_assign(&mut self, rhs: Scale<T>) {
        self.div_scalar(rhs.value())
    }
}

#[cfg(test)]
mod tests {
    use crate::{assert, scale, sparse::SparseVector, DenseVector, Vector};

    #[test]
    fn test_operators() {
        let a = Vector::from_slice(&[1.0f64, 2.0, 3.0]);
        let b = Vector::from_slice(&[0.5f64, -1.0, 4.0]);

        assert!((&a + &b).eval() == Vector::from_slice(&[1.5, 1.0, 7.0]));
        assert!((&a - &b).eval() == Vector::from_slice(&[0.5, 3.0, -1.0]));
        assert!((&a * scale(2.0f64)).eval() == Vector::from_slice(&[2.0, 4.0, 6.0]));
        assert!(
            ((&a + &b) * scale(2.0f64) - &a).eval() == Vector::from_slice(&[2.0, 0.0, 11.0])
        );
        assert!(a.clone() + b.clone() == Vector::from_slice(&[1.5, 1.0, 7.0]));

        let mut c = a.clone();
        c *= &b;
        assert!(c == Vector::from_slice(&[0.5, -2.0, 12.0]));
        c /= scale(0.5f64);
        assert!(c == Vector::from_slice(&[1.0, -4.0, 24.0]));
        c += &(&a * scale(-1.0f64));
        assert!(c == Vector::from_slice(&[0.0, -6.0, 21.0]));
        c -= c.clone();
        assert!(c.nonzeros() == 0);
    }

    #[test]
    fn test_sparse_operand() {
        let s = SparseVector::<f64>::try_new_from_pairs(4, &[(1, 2.0), (3, -1.0)]).unwrap();
        let mut a = Vector::from_slice(&[1.0f64, 1.0, 1.0, 1.0]);
        a += &s;
        assert!(a == Vector::from_slice(&[1.0, 3.0, 1.0, 0.0]));
        a *= &s;
        assert!(a == Vector::from_slice(&[0.0, 6.0, 0.0, 0.0]));
    }

    #[test]
    #[should_panic]
    fn test_adding_vectors_of_different_lengths_should_panic() {
        let mut a = Vector::<i32>::zeros(3);
        a += Vector::zeros(4);
    }

    #[test]
    #[should_panic]
    fn test_lazy_sum_of_different_lengths_should_panic() {
        let a = Vector::<f64>::zeros(3);
        let b = Vector::<f64>::zeros(4);
        let _ = &a + &b;
    }
}
