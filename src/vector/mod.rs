//! Growable, padded numeric buffer.
//!
//! A [`Vector`] stores its elements in a single heap allocation whose capacity is always a
//! multiple of the register width of the element type, and whose start is aligned for register
//! loads. The slots between the length and the capacity always hold zero. Kernels may load whole
//! registers past the logical end, but only ever store up to it.

use crate::{
    assert, debug_assert,
    kernel::{self, AddAssign, Assign, AssignOp, DivAssign, MulAssign, SubAssign},
    simd::{padded_len, reduce_sum, Scalar},
    DenseError,
};
use raw::{capacity_overflow, RawVector};

mod expr;
mod ops;
pub(crate) mod raw;

pub use expr::{DenseVector, VecAdd, VecScale, VecSub};

/// Source of a bulk assignment into a [`Vector`] of element type `T`.
///
/// Implemented by every [`DenseVector`] whose elements convert into `T`, and by
/// [`SparseVector`](crate::sparse::SparseVector).
pub trait VectorAssignable<T: Scalar> {
    /// Number of elements.
    fn size(&self) -> usize;

    /// Returns `true` if the source may refer to the vector at address `addr`.
    fn aliases(&self, addr: *const ()) -> bool;

    /// Runs `dst op= self` through the dispatcher.
    ///
    /// # Safety
    /// `dst` must have the length of `self`, and `self` must not alias `dst`.
    #[doc(hidden)]
    unsafe fn assign_to<P: AssignOp>(&self, dst: &mut Vector<T>);

    /// Evaluates `self` into a temporary, then runs `dst op= temporary`.
    ///
    /// # Safety
    /// `dst` must have the length of `self`.
    #[doc(hidden)]
    unsafe fn assign_through_temporary<P: AssignOp>(&self, dst: &mut Vector<T>);
}

impl<T, V> VectorAssignable<T> for V
where
    T: Scalar + From<V::Elem>,
    V: DenseVector + ?Sized,
{
    #[inline]
    fn size(&self) -> usize {
        self.len()
    }

    #[inline]
    fn aliases(&self, addr: *const ()) -> bool {
        self.can_alias(addr)
    }

    #[inline]
    unsafe fn assign_to<P: AssignOp>(&self, dst: &mut Vector<T>) {
        kernel::assign_vector::<T, V, P>(dst, self)
    }

    #[inline]
    unsafe fn assign_through_temporary<P: AssignOp>(&self, dst: &mut Vector<T>) {
        let tmp = self.eval();
        kernel::assign_vector::<T, Vector<V::Elem>, P>(dst, &tmp)
    }
}

/// Heap-allocated vector of numeric elements, padded to a multiple of the register width.
///
/// # Example
/// ```
/// use densa::Vector;
///
/// let mut v = Vector::<f64>::zeros(5);
/// v.write(1, 3.0);
/// v.resize(3, true);
/// v.resize(5, true);
///
/// assert_eq!(v.as_slice(), &[0.0, 3.0, 0.0, 0.0, 0.0]);
/// ```
pub struct Vector<T: Scalar> {
    raw: RawVector<T>,
    len: usize,
}

impl<T: Scalar> Default for Vector<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Vector<T> {
    /// Returns an empty vector, without allocating.
    #[inline]
    pub const fn new() -> Self {
        Self {
            raw: RawVector::empty(),
            len: 0,
        }
    }

    /// Returns a vector of length `len`, filled with zeros.
    #[inline]
    pub fn zeros(len: usize) -> Self {
        Self {
            raw: RawVector::zeroed(padded_len::<T>(len).unwrap_or_else(capacity_overflow)),
            len,
        }
    }

    /// Returns a vector of length `len`, filled with `value`.
    #[inline]
    pub fn full(len: usize, value: T) -> Self {
        let mut this = Self::zeros(len);
        this.as_mut_slice().fill(value);
        this
    }

    /// Returns a vector of length `len`, whose `i`-th element is `f(i)`.
    #[inline]
    pub fn from_fn(len: usize, mut f: impl FnMut(usize) -> T) -> Self {
        let mut this = Self::zeros(len);
        for (i, x) in this.as_mut_slice().iter_mut().enumerate() {
            *x = f(i);
        }
        this
    }

    /// Returns a vector holding a copy of `values`.
    #[inline]
    pub fn from_slice(values: &[T]) -> Self {
        let mut this = Self::zeros(values.len());
        this.as_mut_slice().copy_from_slice(values);
        this
    }

    /// Evaluates `src` into a new vector, converting each element.
    pub fn from_expr<V: DenseVector + ?Sized>(src: &V) -> Self
    where
        T: From<V::Elem>,
    {
        let mut this = Self::zeros(src.len());
        kernel::assign_vector::<T, V, Assign>(&mut this, src);
        this
    }

    /// Returns the number of elements.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector holds no elements.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the vector can hold without reallocating. Always a
    /// multiple of the register width of `T`.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.raw.capacity
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.raw.ptr.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.raw.ptr.as_ptr()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        unsafe { core::slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        unsafe { core::slice::from_raw_parts_mut(self.as_mut_ptr(), len) }
    }

    /// Returns a reference to the element at index `i`, without bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if `i >= self.len()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn get_unchecked(&self, i: usize) -> &T {
        debug_assert!(i < self.len);
        &*self.as_ptr().add(i)
    }

    /// Returns a mutable reference to the element at index `i`, without bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if `i >= self.len()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn get_unchecked_mut(&mut self, i: usize) -> &mut T {
        debug_assert!(i < self.len);
        &mut *self.as_mut_ptr().add(i)
    }

    /// Reads the element at index `i`, without bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if `i >= self.len()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn read_unchecked(&self, i: usize) -> T {
        *self.get_unchecked(i)
    }

    /// Writes `value` at index `i`, without bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if `i >= self.len()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn write_unchecked(&mut self, i: usize, value: T) {
        *self.get_unchecked_mut(i) = value;
    }

    /// Reads the element at index `i`, with bound checks.
    ///
    /// # Panics
    /// The function panics if `i >= self.len()`.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, i: usize) -> T {
        assert!(i < self.len());
        unsafe { self.read_unchecked(i) }
    }

    /// Writes `value` at index `i`, with bound checks.
    ///
    /// # Panics
    /// The function panics if `i >= self.len()`.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, i: usize, value: T) {
        assert!(i < self.len());
        unsafe { self.write_unchecked(i, value) }
    }

    /// Changes the length of the vector to `len`.
    ///
    /// When `len` exceeds the capacity, a new buffer is allocated and the old contents are copied
    /// over if `preserve` is `true`. Otherwise the buffer is reused. New elements are zero, and
    /// elements abandoned when shrinking are reset to zero.
    pub fn resize(&mut self, len: usize, preserve: bool) {
        if len > self.capacity() {
            let mut raw =
                RawVector::<T>::zeroed(padded_len::<T>(len).unwrap_or_else(capacity_overflow));
            if preserve {
                // SAFETY: the buffers are distinct and both hold at least `self.len` elements.
                unsafe {
                    core::ptr::copy_nonoverlapping(self.as_ptr(), raw.ptr.as_ptr(), self.len)
                };
            }
            core::mem::swap(&mut self.raw, &mut raw);
        } else if len < self.len {
            self.as_mut_slice()[len..].fill(T::zero());
        }
        self.len = len;
    }

    /// Grows the vector by `n` elements. See [`Vector::resize`].
    #[inline]
    pub fn extend(&mut self, n: usize, preserve: bool) {
        let len = self.len.checked_add(n).unwrap_or_else(capacity_overflow);
        self.resize(len, preserve);
    }

    /// Makes sure the vector can hold `capacity` elements without reallocating. The contents and
    /// the length are unchanged.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.capacity() {
            let mut raw =
                RawVector::<T>::zeroed(padded_len::<T>(capacity).unwrap_or_else(capacity_overflow));
            // SAFETY: the buffers are distinct and both hold at least `self.len` elements.
            unsafe { core::ptr::copy_nonoverlapping(self.as_ptr(), raw.ptr.as_ptr(), self.len) };
            core::mem::swap(&mut self.raw, &mut raw);
        }
    }

    /// Removes every element. The capacity is unchanged.
    #[inline]
    pub fn clear(&mut self) {
        self.reset();
        self.len = 0;
    }

    /// Sets every element to zero.
    #[inline]
    pub fn reset(&mut self) {
        self.as_mut_slice().fill(T::zero());
    }

    /// Returns the number of elements that are not zero.
    #[inline]
    pub fn nonzeros(&self) -> usize {
        self.as_slice().iter().filter(|x| !x.is_default()).count()
    }

    /// Multiplies every element by `factor`, in place. The padding is left untouched.
    #[inline]
    pub fn scale(&mut self, factor: T) {
        let len = self.len;
        // SAFETY: the buffer is aligned for registers and holds `len` elements.
        unsafe { kernel::apply_scalar::<T, MulAssign>(self.as_mut_ptr(), len, factor) }
    }

    /// Divides every element by `divisor`, in place. The padding is left untouched.
    #[inline]
    #[track_caller]
    pub(crate) fn div_scalar(&mut self, divisor: T) {
        debug_assert!(divisor != T::zero());
        let len = self.len;
        // SAFETY: see `scale`.
        unsafe { kernel::apply_scalar::<T, DivAssign>(self.as_mut_ptr(), len, divisor) }
    }

    /// Swaps the contents of `self` and `other` without reallocating.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    #[inline(always)]
    pub(crate) fn addr(&self) -> *const () {
        self as *const Self as *const ()
    }

    /// Returns `true` if the vector may be the object at address `addr`.
    #[inline(always)]
    pub fn can_alias(&self, addr: *const ()) -> bool {
        self.addr() == addr
    }

    /// Returns `true` if the vector is the object at address `addr`.
    #[inline(always)]
    pub fn is_aliased(&self, addr: *const ()) -> bool {
        self.addr() == addr
    }

    /// Loads the register starting at index `i` from aligned storage.
    ///
    /// # Safety
    /// `i` must be a multiple of `T::WIDTH` and less than the length.
    #[inline(always)]
    pub(crate) unsafe fn load(&self, i: usize) -> T::Reg {
        debug_assert!(all(i % T::WIDTH == 0, i < self.len));
        T::load(self.as_ptr().add(i))
    }

    /// Stores a register at index `i`, which must be a multiple of `T::WIDTH`.
    #[inline(always)]
    pub(crate) unsafe fn store(&mut self, i: usize, value: T::Reg) {
        debug_assert!(all(i % T::WIDTH == 0, i < self.len));
        T::store(self.as_mut_ptr().add(i), value)
    }

    /// Non-temporal variant of [`Vector::store`]. Callers issue
    /// [`stream_fence`](crate::simd::stream_fence) once they are done streaming.
    #[inline(always)]
    pub(crate) unsafe fn stream(&mut self, i: usize, value: T::Reg) {
        debug_assert!(all(i % T::WIDTH == 0, i < self.len));
        T::stream(self.as_mut_ptr().add(i), value)
    }

    #[inline]
    fn check_len(&self, len: usize) -> Result<(), DenseError> {
        if self.len == len {
            Ok(())
        } else {
            Err(DenseError::ShapeMismatch {
                expected: (self.len, 1),
                found: (len, 1),
            })
        }
    }

    fn run<P: AssignOp, S: VectorAssignable<T> + ?Sized>(&mut self, src: &S) {
        debug_assert!(src.size() == self.len);
        unsafe {
            if src.aliases(self.addr()) {
                log::debug!(
                    target: "densa_perf",
                    "source of a {}-element assignment aliases its destination, evaluating it into a temporary",
                    self.len,
                );
                src.assign_through_temporary::<P>(self);
            } else {
                src.assign_to::<P>(self);
            }
        }
    }

    /// Assigns `src` to the vector, resizing it to the length of `src` first.
    ///
    /// A source that refers to the vector is evaluated into a new buffer, which then replaces
    /// the storage of the vector.
    pub fn assign<S: VectorAssignable<T> + ?Sized>(&mut self, src: &S) {
        let len = src.size();
        if src.aliases(self.addr()) {
            let mut tmp = Self::zeros(len);
            // SAFETY: `tmp` is a fresh vector of the length of `src`.
            unsafe { src.assign_to::<Assign>(&mut tmp) };
            self.swap(&mut tmp);
        } else {
            self.resize(len, false);
            // SAFETY: the length now matches, and `src` does not alias `self`.
            unsafe { src.assign_to::<Assign>(self) };
        }
    }

    /// Copies the elements of `src` into `self`.
    ///
    /// Returns an error without modifying the vector if the lengths differ.
    #[inline]
    pub fn try_copy_from<S: VectorAssignable<T> + ?Sized>(
        &mut self,
        src: &S,
    ) -> Result<(), DenseError> {
        self.check_len(src.size())?;
        self.run::<Assign, S>(src);
        Ok(())
    }

    /// Adds `src` to `self` elementwise.
    ///
    /// Returns an error without modifying the vector if the lengths differ.
    #[inline]
    pub fn try_add_assign<S: VectorAssignable<T> + ?Sized>(
        &mut self,
        src: &S,
    ) -> Result<(), DenseError> {
        self.check_len(src.size())?;
        self.run::<AddAssign, S>(src);
        Ok(())
    }

    /// Subtracts `src` from `self` elementwise.
    ///
    /// Returns an error without modifying the vector if the lengths differ.
    #[inline]
    pub fn try_sub_assign<S: VectorAssignable<T> + ?Sized>(
        &mut self,
        src: &S,
    ) -> Result<(), DenseError> {
        self.check_len(src.size())?;
        self.run::<SubAssign, S>(src);
        Ok(())
    }

    /// Multiplies `self` by `src` elementwise. Elements not stored by a sparse source become zero.
    ///
    /// Returns an error without modifying the vector if the lengths differ.
    #[inline]
    pub fn try_mul_assign<S: VectorAssignable<T> + ?Sized>(
        &mut self,
        src: &S,
    ) -> Result<(), DenseError> {
        self.check_len(src.size())?;
        self.run::<MulAssign, S>(src);
        Ok(())
    }

    /// Returns the inner product of `self` and `other`.
    ///
    /// # Panics
    /// The function panics if the lengths differ.
    #[track_caller]
    pub fn dot(&self, other: &Self) -> T {
        assert!(self.len() == other.len());
        if T::SIMD && T::SIMD_ADD && T::SIMD_MUL {
            let mut acc = T::splat(T::zero());
            let mut i = 0;
            while i < self.len {
                // SAFETY: padded lanes are zero on both sides.
                unsafe { acc = T::add_reg(acc, T::mul_reg(self.load(i), other.load(i))) };
                i += T::WIDTH;
            }
            reduce_sum::<T>(acc)
        } else {
            self.as_slice()
                .iter()
                .zip(other.as_slice())
                .fold(T::zero(), |acc, (&x, &y)| acc + x * y)
        }
    }

    /// Returns the sum of the elements.
    pub fn sum(&self) -> T {
        if T::SIMD && T::SIMD_ADD {
            let mut acc = T::splat(T::zero());
            let mut i = 0;
            while i < self.len {
                // SAFETY: padded lanes are zero.
                unsafe { acc = T::add_reg(acc, self.load(i)) };
                i += T::WIDTH;
            }
            reduce_sum::<T>(acc)
        } else {
            self.as_slice().iter().fold(T::zero(), |acc, &x| acc + x)
        }
    }
}

impl<T: Scalar> Clone for Vector<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }

    fn clone_from(&mut self, source: &Self) {
        self.resize(0, false);
        self.resize(source.len, false);
        self.as_mut_slice().copy_from_slice(source.as_slice());
    }
}

impl<T: Scalar> core::fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: Scalar> PartialEq for Vector<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Scalar> core::ops::Index<usize> for Vector<T> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, i: usize) -> &T {
        assert!(i < self.len());
        unsafe { self.get_unchecked(i) }
    }
}

impl<T: Scalar> core::ops::IndexMut<usize> for Vector<T> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, i: usize) -> &mut T {
        assert!(i < self.len());
        unsafe { self.get_unchecked_mut(i) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, Complex};
    use assert_approx_eq::assert_approx_eq;
    use rand::random;

    fn assert_padding_zero<T: Scalar>(v: &Vector<T>) {
        let padding = unsafe {
            core::slice::from_raw_parts(v.as_ptr().add(v.len()), v.capacity() - v.len())
        };
        assert!(padding.iter().all(|x| x.is_default()));
    }

    #[test]
    fn create() {
        let v = Vector::<f64>::zeros(5);
        assert!(v.len() == 5);
        assert!(v.capacity() >= 5);
        assert!(v.capacity() % <f64 as Scalar>::WIDTH == 0);
        assert!(v.as_ptr() as usize % crate::simd::align_for::<f64>() == 0);
        assert!(v.nonzeros() == 0);

        let v = Vector::full(7, 2.5f32);
        assert!(v.as_slice().iter().all(|&x| x == 2.5));
        assert_padding_zero(&v);

        let v = Vector::<i64>::new();
        assert!(all(v.len() == 0, v.capacity() == 0, v.is_empty()));
    }

    #[test]
    fn resize_preserves_prefix() {
        let mut v = Vector::<f64>::zeros(5);
        for i in 0..5 {
            v.write(i, (i + 1) as f64);
        }
        v.resize(3, true);
        assert!(v.as_slice() == &[1.0, 2.0, 3.0][..]);
        assert_padding_zero(&v);

        v.resize(5, true);
        assert!(v.as_slice() == &[1.0, 2.0, 3.0, 0.0, 0.0][..]);

        let cap = v.capacity();
        v.resize(cap + 1, true);
        assert!(v.capacity() > cap);
        assert!(&v.as_slice()[..3] == &[1.0, 2.0, 3.0][..]);
        assert!(v.as_slice()[3..].iter().all(|&x| x == 0.0));
        assert_padding_zero(&v);

        v.resize(2 * cap + 1, false);
        assert!(v.nonzeros() == 0);
    }

    #[test]
    fn extend_reserve_clear() {
        let mut v = Vector::from_slice(&[1u32, 2, 3]);
        v.extend(2, true);
        assert!(v.as_slice() == &[1, 2, 3, 0, 0][..]);

        v.reserve(100);
        assert!(v.capacity() >= 100);
        assert!(v.as_slice() == &[1, 2, 3, 0, 0][..]);

        let cap = v.capacity();
        v.clear();
        assert!(all(v.is_empty(), v.capacity() == cap));
        v.resize(3, true);
        assert!(v.nonzeros() == 0);
    }

    #[test]
    fn swap_moves_storage() {
        let mut a = Vector::from_slice(&[1.0f64, 2.0]);
        let mut b = Vector::from_slice(&[3.0f64, 4.0, 5.0]);
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        a.swap(&mut b);
        assert!(all(a.as_ptr() == pb, b.as_ptr() == pa));
        assert!(a.as_slice() == &[3.0, 4.0, 5.0][..]);
        assert!(b.as_slice() == &[1.0, 2.0][..]);
    }

    #[test]
    fn elementwise() {
        let n = 37;
        let a = Vector::<f64>::from_fn(n, |_| random());
        let b = Vector::<f64>::from_fn(n, |_| random::<f64>() + 1.0);

        let mut c = Vector::<f64>::zeros(n);
        c.try_copy_from(&a).unwrap();
        c.try_add_assign(&b).unwrap();
        for i in 0..n {
            assert_approx_eq!(c[i], a[i] + b[i]);
        }
        c.try_sub_assign(&a).unwrap();
        for i in 0..n {
            assert_approx_eq!(c[i], b[i]);
        }
        c.try_mul_assign(&a).unwrap();
        for i in 0..n {
            assert_approx_eq!(c[i], a[i] * b[i]);
        }
        assert_padding_zero(&c);

        let expected: f64 = (0..n).map(|i| a[i] * b[i]).sum();
        assert_approx_eq!(a.dot(&b), expected);
        assert_approx_eq!(a.sum(), a.as_slice().iter().sum::<f64>());

        assert!(
            c.try_add_assign(&Vector::<f64>::zeros(n + 1))
                == Err(DenseError::ShapeMismatch {
                    expected: (n, 1),
                    found: (n + 1, 1)
                })
        );
    }

    #[test]
    fn scale_and_inverse() {
        let n = 19;
        let a = Vector::<f32>::from_fn(n, |_| random());
        let mut b = a.clone();
        b.scale(3.0);
        b.div_scalar(3.0);
        for i in 0..n {
            assert_approx_eq!(a[i], b[i], 1e-5);
        }

        let mut z = Vector::from_fn(4, |i| Complex::new(i as f64, 1.0));
        z.scale(Complex::new(0.0, 1.0));
        assert!(z[2] == Complex::new(-1.0, 2.0));
    }

    #[test]
    fn integer_sum_and_dot() {
        let v = Vector::<i32>::from_fn(11, |i| i as i32 - 5);
        assert!(v.sum() == 0);
        assert!(v.dot(&v) == 110);
        assert!(v.nonzeros() == 10);
    }

    #[test]
    fn register_access() {
        let w = <f64 as Scalar>::WIDTH;
        let a = Vector::<f64>::from_fn(2 * w + 1, |i| i as f64 + 1.0);
        let mut b = Vector::<f64>::zeros(2 * w + 1);
        unsafe {
            b.stream(0, a.load(0));
            crate::simd::stream_fence();
            b.store(w, a.load(w));
        }
        for i in 0..2 * w + 1 {
            let expected = if i < 2 * w { a[i] } else { 0.0 };
            assert!(b[i] == expected);
        }
    }

    #[test]
    fn non_finite_scaling_keeps_padding() {
        let mut v = Vector::<f64>::full(3, 1.0);
        v.scale(f64::INFINITY);
        assert_padding_zero(&v);
        assert!(v.sum() == f64::INFINITY);
        v.resize(4, true);
        assert!(all(v.read(2) == f64::INFINITY, v.read(3) == 0.0));

        let mut v = Vector::<f32>::full(5, 2.0);
        v.scale(f32::NAN);
        assert_padding_zero(&v);
        assert!(v.nonzeros() == 5);

        let mut v = Vector::<f64>::full(7, 1.0);
        v.div_scalar(f64::NAN);
        assert_padding_zero(&v);
        v.resize(8, true);
        assert!(v.read(7) == 0.0);
    }

    #[test]
    fn expression_sources() {
        let n = 23;
        let a = Vector::<f64>::from_fn(n, |_| random());
        let b = Vector::<f64>::from_fn(n, |_| random());

        let mut c = Vector::<f64>::zeros(n);
        c.try_copy_from(&(&a + &b)).unwrap();
        c.try_sub_assign(&(&b * crate::scale(2.0f64))).unwrap();
        for i in 0..n {
            assert_approx_eq!(c[i], a[i] - b[i]);
        }

        c.try_copy_from(&VecScale::new(&a, f64::INFINITY)).unwrap();
        assert_padding_zero(&c);

        let mut d = Vector::<f64>::full(2, 1.0);
        d.assign(&(&a - &b));
        assert!(d.len() == n);
        for i in 0..n {
            assert!(d[i] == a[i] - b[i]);
        }

        let f = Vector::<f32>::from_fn(n, |i| i as f32);
        let mut g = Vector::<f64>::zeros(n);
        g.try_add_assign(&f).unwrap();
        assert!(g[n - 1] == (n - 1) as f64);

        assert!(c.try_copy_from(&Vector::<f64>::zeros(n - 1)).is_err());
    }

    #[test]
    fn aliased_sources_use_a_temporary() {
        let a = Vector::<f64>::from_fn(9, |i| i as f64);
        let b = Vector::<f64>::from_fn(9, |i| 1.0 + i as f64);
        let sum = &a + &b;
        fn aliases<S: VectorAssignable<f64> + ?Sized>(src: &S, v: &Vector<f64>) -> bool {
            src.aliases(v.addr())
        }
        assert!(all(aliases(&sum, &a), aliases(&sum, &b)));
        assert!(!aliases(&(&b * crate::scale(2.0f64)), &a));

        let mut c = Vector::<f64>::full(9, 1.0);
        unsafe { sum.assign_through_temporary::<AddAssign>(&mut c) };
        for i in 0..9 {
            assert!(c[i] == 2.0 + 2.0 * i as f64);
        }
        assert_padding_zero(&c);
    }

    #[test]
    fn large_assignments_stream() {
        let n = 300_001;
        assert!(n > kernel::CACHE_SIZE / (3 * core::mem::size_of::<f32>()));
        let a = Vector::<f32>::from_fn(n, |i| (i % 1024) as f32 - 512.0);

        let mut b = Vector::<f32>::full(n, 7.0);
        b.try_copy_from(&a).unwrap();
        assert!(b == a);
        assert_padding_zero(&b);

        b.try_copy_from(&(&a * crate::scale(-2.0f32))).unwrap();
        for i in 0..n {
            assert!(b[i] == -2.0 * a[i]);
        }
        assert_padding_zero(&b);
    }

    #[test]
    #[should_panic]
    fn read_out_of_bounds() {
        let v = Vector::<f64>::zeros(3);
        v.read(3);
    }
}
