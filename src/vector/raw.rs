use crate::simd::{align_for, Scalar};
use core::ptr::NonNull;

/// Owned, zero-initialized, width-aligned allocation of `capacity` elements.
pub(crate) struct RawVector<T: Scalar> {
    pub(crate) ptr: NonNull<T>,
    pub(crate) capacity: usize,
}

unsafe impl<T: Scalar> Send for RawVector<T> {}
unsafe impl<T: Scalar> Sync for RawVector<T> {}

impl<T: Scalar> RawVector<T> {
    #[inline]
    pub(crate) const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
        }
    }

    /// Allocates `capacity` elements and sets all of them to zero.
    pub(crate) fn zeroed(capacity: usize) -> Self {
        let cap_bytes = capacity
            .checked_mul(core::mem::size_of::<T>())
            .unwrap_or_else(capacity_overflow);
        if cap_bytes > isize::MAX as usize {
            capacity_overflow::<()>();
        }

        use std::alloc::{alloc, handle_alloc_error, Layout};

        let layout = Layout::from_size_align(cap_bytes, align_for::<T>())
            .ok()
            .unwrap_or_else(capacity_overflow);

        if layout.size() == 0 {
            return Self {
                ptr: NonNull::dangling(),
                capacity,
            };
        }

        // SAFETY: we checked that layout has non zero size
        let ptr = unsafe { alloc(layout) } as *mut T;
        if ptr.is_null() {
            handle_alloc_error(layout)
        }
        for k in 0..capacity {
            // SAFETY: the allocation holds `capacity` elements
            unsafe { ptr.add(k).write(T::zero()) };
        }

        Self {
            // SAFETY: we checked that the pointer is not null
            ptr: unsafe { NonNull::new_unchecked(ptr) },
            capacity,
        }
    }
}

impl<T: Scalar> Drop for RawVector<T> {
    fn drop(&mut self) {
        use std::alloc::{dealloc, Layout};
        // this cannot overflow because we already allocated this much memory
        let alloc_size = self.capacity * core::mem::size_of::<T>();
        if alloc_size != 0 {
            // SAFETY: pointer was allocated with std::alloc::alloc
            unsafe {
                dealloc(
                    self.ptr.as_ptr() as *mut u8,
                    Layout::from_size_align_unchecked(alloc_size, align_for::<T>()),
                );
            }
        }
    }
}

#[cold]
fn capacity_overflow_impl() -> ! {
    panic!("capacity overflow")
}

#[inline(always)]
pub(crate) fn capacity_overflow<T>() -> T {
    capacity_overflow_impl();
}
