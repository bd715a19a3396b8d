//! Register-level operations for the element types supported by the crate.
//!
//! Each element type advertises whether it can be processed in SIMD registers, how many lanes a
//! register holds, and which arithmetic primitives have a vectorized implementation. Types without
//! a vector implementation use a register of width one, so the same kernel code compiles for every
//! element type; the dispatcher only enters the vectorized kernels when the capability constants
//! allow it.
//!
//! # Target support
//!
//! Vector implementations exist for `x86_64` only, selected at compile time from the enabled
//! target features: AVX when enabled, SSE2 otherwise. On every other architecture `f32`, `f64`,
//! `i32` and `i64` fall back to the width-one registers above, with `SIMD` set to `false`, and
//! every assignment goes through the scalar kernels.

use crate::debug_assert;
use core::fmt::Debug;
use num_complex::Complex;
use num_traits::{Num, NumAssignOps};

#[cfg(target_arch = "x86_64")]
mod x86;

/// Element type of vectors and matrices.
///
/// This trait is sealed. It is implemented for `f32`, `f64`, `i32`, `i64`, `u32`, `u64`,
/// `Complex<f32>` and `Complex<f64>`.
pub trait Scalar:
    crate::seal::Seal + Copy + PartialEq + Debug + Send + Sync + 'static + Num + NumAssignOps
{
    /// Whether the type can be loaded and stored in SIMD registers.
    const SIMD: bool;
    /// Whether vectorized addition and subtraction are available.
    const SIMD_ADD: bool;
    /// Whether vectorized multiplication is available.
    const SIMD_MUL: bool;
    /// Whether vectorized division is available.
    const SIMD_DIV: bool;
    /// Number of lanes in [`Scalar::Reg`].
    const WIDTH: usize;

    /// Register holding [`Scalar::WIDTH`] values.
    type Reg: Copy + 'static;

    /// Loads a register from an address aligned for [`Scalar::Reg`].
    ///
    /// # Safety
    /// `ptr` must be valid for reading `WIDTH` elements and suitably aligned.
    unsafe fn load(ptr: *const Self) -> Self::Reg;
    /// Loads a register from an arbitrary address.
    ///
    /// # Safety
    /// `ptr` must be valid for reading `WIDTH` elements.
    unsafe fn loadu(ptr: *const Self) -> Self::Reg;
    /// Stores a register to an address aligned for [`Scalar::Reg`].
    ///
    /// # Safety
    /// `ptr` must be valid for writing `WIDTH` elements and suitably aligned.
    unsafe fn store(ptr: *mut Self, value: Self::Reg);
    /// Stores a register to an arbitrary address.
    ///
    /// # Safety
    /// `ptr` must be valid for writing `WIDTH` elements.
    unsafe fn storeu(ptr: *mut Self, value: Self::Reg);
    /// Non-temporal store that bypasses the cache where the target supports it.
    ///
    /// Callers must issue [`stream_fence`] once they are done streaming.
    ///
    /// # Safety
    /// Same requirements as [`Scalar::store`].
    #[inline(always)]
    unsafe fn stream(ptr: *mut Self, value: Self::Reg) {
        Self::store(ptr, value)
    }
    /// Loads the first `count` lanes from `ptr`, the remaining lanes are zero.
    ///
    /// # Safety
    /// `ptr` must be valid for reading `count` elements, and `count <= WIDTH`.
    unsafe fn loadu_partial(ptr: *const Self, count: usize) -> Self::Reg;
    /// Stores the first `count` lanes of `value` to `ptr`.
    ///
    /// # Safety
    /// `ptr` must be valid for writing `count` elements, and `count <= WIDTH`.
    unsafe fn storeu_partial(ptr: *mut Self, value: Self::Reg, count: usize);

    /// Broadcasts `value` to every lane.
    fn splat(value: Self) -> Self::Reg;
    /// Lanewise `a + b`.
    fn add_reg(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// Lanewise `a - b`.
    fn sub_reg(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// Lanewise `a * b`.
    fn mul_reg(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// Lanewise `a / b`.
    fn div_reg(a: Self::Reg, b: Self::Reg) -> Self::Reg;

    /// Returns `true` if the value equals the default (zero) value.
    #[inline(always)]
    fn is_default(&self) -> bool {
        self.is_zero()
    }
}

macro_rules! impl_unit_scalar {
    ($($ty: ty),* $(,)?) => {$(
        impl Scalar for $ty {
            const SIMD: bool = false;
            const SIMD_ADD: bool = false;
            const SIMD_MUL: bool = false;
            const SIMD_DIV: bool = false;
            const WIDTH: usize = 1;

            type Reg = Self;

            #[inline(always)]
            unsafe fn load(ptr: *const Self) -> Self {
                ptr.read()
            }
            #[inline(always)]
            unsafe fn loadu(ptr: *const Self) -> Self {
                ptr.read()
            }
            #[inline(always)]
            unsafe fn store(ptr: *mut Self, value: Self) {
                ptr.write(value)
            }
            #[inline(always)]
            unsafe fn storeu(ptr: *mut Self, value: Self) {
                ptr.write(value)
            }
            #[inline(always)]
            unsafe fn loadu_partial(ptr: *const Self, count: usize) -> Self {
                debug_assert!(count <= 1);
                if count == 0 {
                    <$ty as num_traits::Zero>::zero()
                } else {
                    ptr.read()
                }
            }
            #[inline(always)]
            unsafe fn storeu_partial(ptr: *mut Self, value: Self, count: usize) {
                debug_assert!(count <= 1);
                if count == 1 {
                    ptr.write(value)
                }
            }

            #[inline(always)]
            fn splat(value: Self) -> Self {
                value
            }
            #[inline(always)]
            fn add_reg(a: Self, b: Self) -> Self {
                a + b
            }
            #[inline(always)]
            fn sub_reg(a: Self, b: Self) -> Self {
                a - b
            }
            #[inline(always)]
            fn mul_reg(a: Self, b: Self) -> Self {
                a * b
            }
            #[inline(always)]
            fn div_reg(a: Self, b: Self) -> Self {
                a / b
            }
        }
    )*};
}

impl_unit_scalar!(u32, u64, Complex<f32>, Complex<f64>);

#[cfg(not(target_arch = "x86_64"))]
impl_unit_scalar!(f32, f64, i32, i64);

/// Orders the non-temporal stores issued so far before any later store.
#[inline(always)]
pub fn stream_fence() {
    #[cfg(target_arch = "x86_64")]
    // SAFETY: sse is part of the x86_64 baseline.
    unsafe {
        core::arch::x86_64::_mm_sfence()
    }
}

// https://rust-lang.github.io/hashbrown/src/crossbeam_utils/cache_padded.rs.html#128-130
pub(crate) const CACHELINE_ALIGN: usize = {
    #[cfg(any(
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "powerpc64",
    ))]
    {
        128
    }
    #[cfg(any(
        target_arch = "arm",
        target_arch = "mips",
        target_arch = "mips64",
        target_arch = "riscv64",
    ))]
    {
        32
    }
    #[cfg(target_arch = "s390x")]
    {
        256
    }
    #[cfg(not(any(
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "powerpc64",
        target_arch = "arm",
        target_arch = "mips",
        target_arch = "mips64",
        target_arch = "riscv64",
        target_arch = "s390x",
    )))]
    {
        64
    }
};

/// Alignment of heap buffers holding `T`.
#[inline(always)]
pub(crate) fn align_for<T: Scalar>() -> usize {
    if T::SIMD {
        Ord::max(
            core::mem::size_of::<T::Reg>(),
            Ord::max(core::mem::align_of::<T>(), CACHELINE_ALIGN),
        )
    } else {
        core::mem::align_of::<T>()
    }
}

const MAX_WIDTH: usize = 8;

/// Sum of the lanes of `value`.
#[inline]
pub(crate) fn reduce_sum<T: Scalar>(value: T::Reg) -> T {
    debug_assert!(T::WIDTH <= MAX_WIDTH);
    let mut buf = [T::zero(); MAX_WIDTH];
    // SAFETY: `buf` holds at least `T::WIDTH` elements.
    unsafe { T::storeu(buf.as_mut_ptr(), value) };
    buf[..T::WIDTH].iter().fold(T::zero(), |acc, &x| acc + x)
}

/// Smallest multiple of `T::WIDTH` that is not less than `n`, or `None` on overflow.
#[inline]
pub(crate) fn padded_len<T: Scalar>(n: usize) -> Option<usize> {
    n.checked_add((T::WIDTH - n % T::WIDTH) % T::WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_len_rounds_to_width() {
        let w = <f64 as Scalar>::WIDTH;
        assert_eq!(padded_len::<f64>(0), Some(0));
        assert_eq!(padded_len::<f64>(1), Some(w));
        assert_eq!(padded_len::<f64>(w), Some(w));
        assert_eq!(padded_len::<f64>(w + 1), Some(2 * w));
        assert_eq!(padded_len::<Complex<f64>>(7), Some(7));
        if w > 1 {
            assert_eq!(padded_len::<f64>(usize::MAX), None);
        }
    }

    #[test]
    fn target_support() {
        let vectorized = cfg!(target_arch = "x86_64");
        assert_eq!(<f64 as Scalar>::SIMD, vectorized);
        assert_eq!(<i32 as Scalar>::SIMD, vectorized);
        assert_eq!(<f32 as Scalar>::WIDTH > 1, vectorized);
        assert!(!<Complex<f64> as Scalar>::SIMD);
        assert_eq!(<u64 as Scalar>::WIDTH, 1);
    }

    #[test]
    fn partial_load_store() {
        let w = <f32 as Scalar>::WIDTH;
        let src: Vec<f32> = (1..=w as i32).map(|x| x as f32).collect();
        let mut dst = vec![-1.0f32; w];
        let count = w - w / 2;
        unsafe {
            let reg = f32::loadu_partial(src.as_ptr(), count);
            f32::storeu_partial(dst.as_mut_ptr(), reg, count);
        }
        for k in 0..w {
            if k < count {
                assert_eq!(dst[k], src[k]);
            } else {
                assert_eq!(dst[k], -1.0);
            }
        }
    }

    #[test]
    fn register_arithmetic_matches_scalar() {
        let w = <f64 as Scalar>::WIDTH;
        let a: Vec<f64> = (0..w).map(|k| k as f64 + 0.5).collect();
        let b: Vec<f64> = (0..w).map(|k| 2.0 * k as f64 + 1.0).collect();
        let mut out = vec![0.0f64; w];
        unsafe {
            let ra = f64::loadu(a.as_ptr());
            let rb = f64::loadu(b.as_ptr());

            f64::storeu(out.as_mut_ptr(), f64::add_reg(ra, rb));
            for k in 0..w {
                assert_eq!(out[k], a[k] + b[k]);
            }
            f64::storeu(out.as_mut_ptr(), f64::sub_reg(ra, rb));
            for k in 0..w {
                assert_eq!(out[k], a[k] - b[k]);
            }
            f64::storeu(out.as_mut_ptr(), f64::mul_reg(ra, f64::splat(3.0)));
            for k in 0..w {
                assert_eq!(out[k], a[k] * 3.0);
            }
            f64::storeu(out.as_mut_ptr(), f64::div_reg(ra, rb));
            for k in 0..w {
                assert_eq!(out[k], a[k] / b[k]);
            }
        }

        let wi = <i32 as Scalar>::WIDTH;
        let x: Vec<i32> = (0..wi as i32).collect();
        let mut y = vec![0i32; wi];
        unsafe {
            let r = i32::loadu(x.as_ptr());
            i32::storeu(y.as_mut_ptr(), i32::mul_reg(r, i32::splat(-2)));
        }
        for k in 0..wi {
            assert_eq!(y[k], -2 * x[k]);
        }
    }
}
