//! Lazy vector expressions.
//!
//! Adding, subtracting or scaling borrowed vectors builds one of the types below. Nothing is
//! computed until the expression is assigned to a [`Vector`] or evaluated with
//! [`DenseVector::eval`].

use super::Vector;
use crate::{assert, simd::Scalar};

/// Readable dense vector operand.
///
/// Implemented by [`Vector`], the lazy vector expressions, and shared references to any of them.
pub trait DenseVector {
    /// Element type.
    type Elem: Scalar;
    /// Whether [`DenseVector::load`] is implemented with registers.
    const SIMD: bool;

    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if the operand has no elements.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the element at index `i`, without bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if `i >= self.len()`.
    unsafe fn read_unchecked(&self, i: usize) -> Self::Elem;

    /// Loads `WIDTH` consecutive elements starting at `i`. Lanes past the length hold
    /// unspecified values, the kernels never store them.
    ///
    /// # Safety
    /// `i` must be a multiple of `WIDTH` and smaller than `self.len()`.
    unsafe fn load(&self, i: usize) -> <Self::Elem as Scalar>::Reg;

    /// Returns `true` if the operand may refer to the vector at address `addr`.
    fn can_alias(&self, addr: *const ()) -> bool;
    /// Returns `true` if the operand refers to the vector at address `addr`.
    fn is_aliased(&self, addr: *const ()) -> bool;

    /// Reads the element at index `i`, with bound checks.
    ///
    /// # Panics
    /// The function panics if `i >= self.len()`.
    #[track_caller]
    #[inline]
    fn read(&self, i: usize) -> Self::Elem {
        assert!(i < self.len());
        unsafe { self.read_unchecked(i) }
    }

    /// Evaluates the operand into a new vector.
    #[inline]
    fn eval(&self) -> Vector<Self::Elem> {
        Vector::from_expr(self)
    }
}

impl<V: DenseVector + ?Sized> DenseVector for &V {
    type Elem = V::Elem;
    const SIMD: bool = V::SIMD;

    #[inline(always)]
    fn len(&self) -> usize {
        (**self).len()
    }
    #[inline(always)]
    unsafe fn read_unchecked(&self, i: usize) -> Self::Elem {
        (**self).read_unchecked(i)
    }
    #[inline(always)]
    unsafe fn load(&self, i: usize) -> <Self::Elem as Scalar>::Reg {
        (**self).load(i)
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

impl<T: Scalar> DenseVector for Vector<T> {
    type Elem = T;
    const SIMD: bool = T::SIMD;

    #[inline(always)]
    fn len(&self) -> usize {
        Vector::len(self)
    }
    #[inline(always)]
    unsafe fn read_unchecked(&self, i: usize) -> T {
        Vector::read_unchecked(self, i)
    }
    #[inline(always)]
    unsafe fn load(&self, i: usize) -> T::Reg {
        Vector::load(self, i)
    }
    #[inline(always)]
    fn can_alias(&self, addr: *const ()) -> bool {
        Vector::can_alias(self, addr)
    }
    #[inline(always)]
    fn is_aliased(&self, addr: *const ()) -> bool {
        Vector::is_aliased(self, addr)
    }
}

/// Builds a register from element reads starting at `i`, with zeros past the length of `v`.
///
/// # Safety
/// Same requirements as [`DenseVector::load`].
#[inline]
unsafe fn gather<V: DenseVector + ?Sized>(v: &V, i: usize) -> <V::Elem as Scalar>::Reg {
    let w = <V::Elem as Scalar>::WIDTH;
    let count = Ord::min(w, v.len() - i);
    let mut buf = [<V::Elem as num_traits::Zero>::zero(); 8];
    for (l, x) in buf[..count].iter_mut().enumerate() {
        *x = v.read_unchecked(i + l);
    }
    <V::Elem as Scalar>::loadu(buf.as_ptr())
}

/// Lazy sum of two vectors of the same length.
#[derive(Copy, Clone, Debug)]
pub struct VecAdd<A, B> {
    lhs: A,
    rhs: B,
}

/// Lazy difference of two vectors of the same length.
#[derive(Copy, Clone, Debug)]
pub struct VecSub<A, B> {
    lhs: A,
    rhs: B,
}

/// Lazy product of a vector and a scalar.
#[derive(Copy, Clone, Debug)]
pub struct VecScale<V, T> {
    inner: V,
    factor: T,
}

macro_rules! impl_elementwise {
    ($name: ident, $op: tt, $simd_op: ident) => {
        impl<A: DenseVector, B: DenseVector<Elem = A::Elem>> $name<A, B> {
            /// Creates the expression.
            ///
            /// # Panics
            /// The function panics if the operands have different lengths.
            #[track_caller]
            #[inline]
            pub fn new(lhs: A, rhs: B) -> Self {
                assert!(lhs.len() == rhs.len());
                Self { lhs, rhs }
            }
        }

        impl<A: DenseVector, B: DenseVector<Elem = A::Elem>> DenseVector for $name<A, B> {
            type Elem = A::Elem;
            const SIMD: bool = A::SIMD && B::SIMD && <A::Elem as Scalar>::SIMD_ADD;

            #[inline(always)]
            fn len(&self) -> usize {
                self.lhs.len()
            }
            #[inline(always)]
            unsafe fn read_unchecked(&self, i: usize) -> Self::Elem {
                self.lhs.read_unchecked(i) $op self.rhs.read_unchecked(i)
            }
            #[inline(always)]
            unsafe fn load(&self, i: usize) -> <Self::Elem as Scalar>::Reg {
                if Self::SIMD {
                    <A::Elem as Scalar>::$simd_op(self.lhs.load(i), self.rhs.load(i))
                } else {
                    gather(self, i)
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

impl_elementwise!(VecAdd, +, add_reg);
impl_elementwise!(VecSub, -, sub_reg);

impl<V: DenseVector> VecScale<V, V::Elem> {
    #[inline]
    pub fn new(inner: V, factor: V::Elem) -> Self {
        Self { inner, factor }
    }
}

impl<V: DenseVector> DenseVector for VecScale<V, V::Elem> {
    type Elem = V::Elem;
    const SIMD: bool = V::SIMD && <V::Elem as Scalar>::SIMD_MUL;

    #[inline(always)]
    fn len(&self) -> usize {
        self.inner.len()
    }
    #[inline(always)]
    unsafe fn read_unchecked(&self, i: usize) -> Self::Elem {
        self.inner.read_unchecked(i) * self.factor
    }
    #[inline(always)]
    unsafe fn load(&self, i: usize) -> <Self::Elem as Scalar>::Reg {
        if Self::SIMD {
            <V::Elem as Scalar>::mul_reg(self.inner.load(i), <V::Elem as Scalar>::splat(self.factor))
        } else {
            gather(self, i)
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
