use super::Scalar;
use crate::debug_assert;
use core::arch::x86_64::*;

macro_rules! impl_float_scalar {
    (
        $ty: ty, $reg: ty, $width: expr,
        $load: ident, $loadu: ident, $store: ident, $storeu: ident, $stream: ident,
        $set1: ident, $add: ident, $sub: ident, $mul: ident, $div: ident $(,)?
    ) => {
        impl Scalar for $ty {
            const SIMD: bool = true;
            const SIMD_ADD: bool = true;
            const SIMD_MUL: bool = true;
            const SIMD_DIV: bool = true;
            const WIDTH: usize = $width;

            type Reg = $reg;

            #[inline(always)]
            unsafe fn load(ptr: *const Self) -> $reg {
                $load(ptr)
            }
            #[inline(always)]
            unsafe fn loadu(ptr: *const Self) -> $reg {
                $loadu(ptr)
            }
            #[inline(always)]
            unsafe fn store(ptr: *mut Self, value: $reg) {
                $store(ptr, value)
            }
            #[inline(always)]
            unsafe fn storeu(ptr: *mut Self, value: $reg) {
                $storeu(ptr, value)
            }
            #[inline(always)]
            unsafe fn stream(ptr: *mut Self, value: $reg) {
                $stream(ptr, value)
            }
            #[inline(always)]
            unsafe fn loadu_partial(ptr: *const Self, count: usize) -> $reg {
                debug_assert!(count <= $width);
                let mut buf = [0.0 as $ty; $width];
                core::ptr::copy_nonoverlapping(ptr, buf.as_mut_ptr(), count);
                $loadu(buf.as_ptr())
            }
            #[inline(always)]
            unsafe fn storeu_partial(ptr: *mut Self, value: $reg, count: usize) {
                debug_assert!(count <= $width);
                let mut buf = [0.0 as $ty; $width];
                $storeu(buf.as_mut_ptr(), value);
                core::ptr::copy_nonoverlapping(buf.as_ptr(), ptr, count);
            }

            #[inline(always)]
            fn splat(value: Self) -> $reg {
                unsafe { $set1(value) }
            }
            #[inline(always)]
            fn add_reg(a: $reg, b: $reg) -> $reg {
                unsafe { $add(a, b) }
            }
            #[inline(always)]
            fn sub_reg(a: $reg, b: $reg) -> $reg {
                unsafe { $sub(a, b) }
            }
            #[inline(always)]
            fn mul_reg(a: $reg, b: $reg) -> $reg {
                unsafe { $mul(a, b) }
            }
            #[inline(always)]
            fn div_reg(a: $reg, b: $reg) -> $reg {
                unsafe { $div(a, b) }
            }
        }
    };
}

#[cfg(target_feature = "avx")]
impl_float_scalar!(
    f32, __m256, 8,
    _mm256_load_ps, _mm256_loadu_ps, _mm256_store_ps, _mm256_storeu_ps, _mm256_stream_ps,
    _mm256_set1_ps, _mm256_add_ps, _mm256_sub_ps, _mm256_mul_ps, _mm256_div_ps,
);
#[cfg(target_feature = "avx")]
impl_float_scalar!(
    f64, __m256d, 4,
    _mm256_load_pd, _mm256_loadu_pd, _mm256_store_pd, _mm256_storeu_pd, _mm256_stream_pd,
    _mm256_set1_pd, _mm256_add_pd, _mm256_sub_pd, _mm256_mul_pd, _mm256_div_pd,
);

#[cfg(not(target_feature = "avx"))]
impl_float_scalar!(
    f32, __m128, 4,
    _mm_load_ps, _mm_loadu_ps, _mm_store_ps, _mm_storeu_ps, _mm_stream_ps,
    _mm_set1_ps, _mm_add_ps, _mm_sub_ps, _mm_mul_ps, _mm_div_ps,
);
#[cfg(not(target_feature = "avx"))]
impl_float_scalar!(
    f64, __m128d, 2,
    _mm_load_pd, _mm_loadu_pd, _mm_store_pd, _mm_storeu_pd, _mm_stream_pd,
    _mm_set1_pd, _mm_add_pd, _mm_sub_pd, _mm_mul_pd, _mm_div_pd,
);

// sse2 has no lanewise integer multiply or divide for these widths, the kernels
// only vectorize addition and subtraction.
macro_rules! impl_int_scalar {
    ($ty: ty, $width: expr, $set1: ident, $add: ident, $sub: ident $(,)?) => {
        impl Scalar for $ty {
            const SIMD: bool = true;
            const SIMD_ADD: bool = true;
            const SIMD_MUL: bool = false;
            const SIMD_DIV: bool = false;
            const WIDTH: usize = $width;

            type Reg = __m128i;

            #[inline(always)]
            unsafe fn load(ptr: *const Self) -> __m128i {
                _mm_load_si128(ptr as *const __m128i)
            }
            #[inline(always)]
            unsafe fn loadu(ptr: *const Self) -> __m128i {
                _mm_loadu_si128(ptr as *const __m128i)
            }
            #[inline(always)]
            unsafe fn store(ptr: *mut Self, value: __m128i) {
                _mm_store_si128(ptr as *mut __m128i, value)
            }
            #[inline(always)]
            unsafe fn storeu(ptr: *mut Self, value: __m128i) {
                _mm_storeu_si128(ptr as *mut __m128i, value)
            }
            #[inline(always)]
            unsafe fn stream(ptr: *mut Self, value: __m128i) {
                _mm_stream_si128(ptr as *mut __m128i, value)
            }
            #[inline(always)]
            unsafe fn loadu_partial(ptr: *const Self, count: usize) -> __m128i {
                debug_assert!(count <= $width);
                let mut buf = [0 as $ty; $width];
                core::ptr::copy_nonoverlapping(ptr, buf.as_mut_ptr(), count);
                Self::loadu(buf.as_ptr())
            }
            #[inline(always)]
            unsafe fn storeu_partial(ptr: *mut Self, value: __m128i, count: usize) {
                debug_assert!(count <= $width);
                let mut buf = [0 as $ty; $width];
                Self::storeu(buf.as_mut_ptr(), value);
                core::ptr::copy_nonoverlapping(buf.as_ptr(), ptr, count);
            }

            #[inline(always)]
            fn splat(value: Self) -> __m128i {
                unsafe { $set1(value) }
            }
            #[inline(always)]
            fn add_reg(a: __m128i, b: __m128i) -> __m128i {
                unsafe { $add(a, b) }
            }
            #[inline(always)]
            fn sub_reg(a: __m128i, b: __m128i) -> __m128i {
                unsafe { $sub(a, b) }
            }
            #[inline(always)]
            fn mul_reg(a: __m128i, b: __m128i) -> __m128i {
                lanewise::<$ty, $width>(a, b, |x, y| x * y)
            }
            #[inline(always)]
            fn div_reg(a: __m128i, b: __m128i) -> __m128i {
                lanewise::<$ty, $width>(a, b, |x, y| x / y)
            }
        }
    };
}

impl_int_scalar!(i32, 4, _mm_set1_epi32, _mm_add_epi32, _mm_sub_epi32);
impl_int_scalar!(i64, 2, _mm_set1_epi64x, _mm_add_epi64, _mm_sub_epi64);

#[inline(always)]
fn lanewise<T: Copy + Default, const N: usize>(
    a: __m128i,
    b: __m128i,
    f: impl Fn(T, T) -> T,
) -> __m128i {
    let mut x = [T::default(); N];
    let mut y = [T::default(); N];
    // SAFETY: both buffers span 16 bytes.
    unsafe {
        _mm_storeu_si128(x.as_mut_ptr() as *mut __m128i, a);
        _mm_storeu_si128(y.as_mut_ptr() as *mut __m128i, b);
    }
    for (x, y) in x.iter_mut().zip(y.iter()) {
        *x = f(*x, *y);
    }
    unsafe { _mm_loadu_si128(x.as_ptr() as *const __m128i) }
}
